//! Inner-product argument with a public inner product `c = <a, b>`.
//!
//! The statement `P = <a, g> + <b, h>` is bound into the seed together with
//! `c`; a fresh generator `u` is then hashed from the seed and the proof is a
//! [`p2`](super::p2) proof of `P + c·u`.

#![allow(missing_docs)]

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use super::p2;
use crate::misc::{self, inner_product};
use crate::pc::hash_to_g1;
use crate::transcript::{FsLabel, Seed};
use crate::{G1Affine, F, G1};

#[derive(Clone, Copy, Debug)]
pub struct ProveInput<'a> {
    pub g: &'a [G1Affine],
    pub h: &'a [G1Affine],
    pub a: &'a [F],
    pub b: &'a [F],
}

/// Statement `(P, c)` with the underlying [`p2::Proof`].
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    /// `<a, g> + <b, h>`.
    pub p: G1,
    /// `<a, b>`.
    pub c: F,
    pub p2: p2::Proof,
}

fn bind(seed: &mut Seed, p: &G1, c: &F, n: usize) -> G1Affine {
    seed.absorb(FsLabel::IpaPublic, |t| {
        t.point(p).scalar(c).counter(n as u64);
    });
    hash_to_g1(b"ipa.u", seed.as_bytes())
}

pub fn prove(mut seed: Seed, input: &ProveInput<'_>) -> Proof {
    let n = input.a.len();
    let p = misc::msm(input.g, input.a) + misc::msm(input.h, input.b);
    let c = inner_product(input.a, input.b);
    let u = bind(&mut seed, &p, &c, n);

    let p2 = p2::prove(
        seed,
        p + u * c,
        &p2::ProveInput {
            g: input.g,
            h: input.h,
            u,
            a: input.a,
            b: input.b,
        },
    );
    Proof { p, c, p2 }
}

/// Check that `proof.p` opens to a pair whose inner product is `proof.c`.
///
/// Callers that hold their own statement compare it with `proof.p`.
pub fn verify(mut seed: Seed, g: &[G1Affine], h: &[G1Affine], proof: &Proof) -> bool {
    let u = bind(&mut seed, &proof.p, &proof.c, g.len());
    p2::verify(
        seed,
        proof.p + u * proof.c,
        &p2::VerifyInput { g, h, u },
        &proof.p2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pc::test_pool;
    use ark_ff::One;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn public_product_roundtrip_and_tamper() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(21);
        let a = misc::random_vec(&mut rng, 7);
        let b = misc::random_vec(&mut rng, 7);
        let (g, h) = (pool.bases(0, 7), pool.bases(7, 7));
        let seed = Seed::new("p1");

        let proof = prove(seed, &ProveInput { g, h, a: &a, b: &b });
        assert_eq!(proof.c, inner_product(&a, &b));
        assert!(verify(seed, g, h, &proof));

        let mut bad = proof.clone();
        bad.c += F::one();
        assert!(!verify(seed, g, h, &bad));

        let mut bad = proof.clone();
        bad.p += G1::from(pool.h());
        assert!(!verify(seed, g, h, &bad));
    }
}
