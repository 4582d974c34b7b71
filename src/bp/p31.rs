//! Zero-knowledge inner-product argument.
//!
//! Public: `P = α·H + <a, g1> + <b, g2>` and `Q = β·H + c·u`. The prover
//! shows `c = <a, b>` without revealing `a`, `b` or `c`: it masks the
//! witness with random `da, db`, commits to the cross terms, and after one
//! challenge `x` hands the masked pair `a + x·da, b + x·db` to
//! [`p1`](super::p1).

#![allow(missing_docs)]

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::p1;
use crate::misc::{self, inner_product};
use crate::transcript::{FsLabel, Seed};
use crate::{G1Affine, F, G1, STRICT_CHECKS};

#[derive(Clone, Copy, Debug)]
pub struct ProveInput<'a> {
    pub g1: &'a [G1Affine],
    pub g2: &'a [G1Affine],
    /// Blinding generator.
    pub h: G1Affine,
    pub u: G1Affine,
    pub a: &'a [F],
    pub b: &'a [F],
    pub c: F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    pub p: G1,
    pub q: G1,
}

#[derive(Clone, Copy, Debug)]
pub struct CommitmentSec {
    pub alpha: F,
    pub beta: F,
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    pub g1: &'a [G1Affine],
    pub g2: &'a [G1Affine],
    pub h: G1Affine,
    pub u: G1Affine,
    pub com_pub: &'a CommitmentPub,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentExtPub {
    pub r: G1,
    pub t1: G1,
    pub t2: G1,
}

/// Masking commitments, blinded responses and the [`p1::Proof`] over the masked pair.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub com_ext_pub: CommitmentExtPub,
    pub mu: F,
    pub tau: F,
    /// Proof for the masked pair; `p1.c` is the masked inner product.
    pub p1: p1::Proof,
}

/// Fresh commitments `(P, Q)` to `input` with random blindings.
pub fn commit<R: Rng>(input: &ProveInput<'_>, rng: &mut R) -> (CommitmentPub, CommitmentSec) {
    let alpha = F::rand(rng);
    let beta = F::rand(rng);
    let p = input.h * alpha + misc::msm(input.g1, input.a) + misc::msm(input.g2, input.b);
    let q = input.h * beta + input.u * input.c;
    (CommitmentPub { p, q }, CommitmentSec { alpha, beta })
}

fn bind(seed: &mut Seed, com_pub: &CommitmentPub, ext: &CommitmentExtPub, n: usize) -> F {
    seed.absorb(FsLabel::IpaHiding, |t| {
        t.point(&com_pub.p)
            .point(&com_pub.q)
            .point(&ext.r)
            .point(&ext.t1)
            .point(&ext.t2)
            .counter(n as u64);
    });
    seed.challenge(FsLabel::IpaHiding)
}

pub fn prove<R: Rng>(
    mut seed: Seed,
    input: &ProveInput<'_>,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
    rng: &mut R,
) -> Proof {
    let n = input.a.len();
    assert!(
        input.b.len() == n && input.g1.len() == n && input.g2.len() == n,
        "hiding ipa length mismatch"
    );
    let _span = tracing::debug_span!("ipa_hiding_prove", n).entered();
    if STRICT_CHECKS {
        assert_eq!(input.c, inner_product(input.a, input.b));
        let (h, u) = (input.h, input.u);
        assert_eq!(
            com_pub.p,
            h * com_sec.alpha + misc::msm(input.g1, input.a) + misc::msm(input.g2, input.b)
        );
        assert_eq!(com_pub.q, h * com_sec.beta + u * input.c);
    }

    let da = misc::random_vec(rng, n);
    let db = misc::random_vec(rng, n);
    let rho = F::rand(rng);
    let tau1 = F::rand(rng);
    let tau2 = F::rand(rng);

    let r = input.h * rho + misc::msm(input.g1, &da) + misc::msm(input.g2, &db);
    let cross = inner_product(input.a, &db) + inner_product(&da, input.b);
    let t1 = input.h * tau1 + input.u * cross;
    let t2 = input.h * tau2 + input.u * inner_product(&da, &db);
    let ext = CommitmentExtPub { r, t1, t2 };

    let x = bind(&mut seed, com_pub, &ext, n);
    let a2 = misc::combine(input.a, F::from(1u64), &da, x);
    let b2 = misc::combine(input.b, F::from(1u64), &db, x);
    let mu = com_sec.alpha + x * rho;
    let tau = com_sec.beta + x * tau1 + x * x * tau2;

    let p1 = p1::prove(
        seed,
        &p1::ProveInput {
            g: input.g1,
            h: input.g2,
            a: &a2,
            b: &b2,
        },
    );
    Proof {
        com_ext_pub: ext,
        mu,
        tau,
        p1,
    }
}

pub fn verify(mut seed: Seed, input: &VerifyInput<'_>, proof: &Proof) -> bool {
    let n = input.g1.len();
    let _span = tracing::debug_span!("ipa_hiding_verify", n).entered();
    if input.g2.len() != n {
        tracing::debug!("ipa hiding: generator length mismatch");
        return false;
    }
    let ext = &proof.com_ext_pub;
    let x = bind(&mut seed, input.com_pub, ext, n);

    let q_side = input.com_pub.q + ext.t1 * x + ext.t2 * (x * x);
    if q_side != input.h * proof.tau + input.u * proof.p1.c {
        tracing::debug!("ipa hiding: inner product commitment check failed");
        return false;
    }
    if input.com_pub.p + ext.r * x - input.h * proof.mu != proof.p1.p {
        tracing::debug!("ipa hiding: masked statement check failed");
        return false;
    }
    p1::verify(seed, input.g1, input.g2, &proof.p1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pc::test_pool;
    use ark_ff::One;
    use rand::{rngs::StdRng, SeedableRng};

    struct Fixture {
        a: Vec<F>,
        b: Vec<F>,
        c: F,
    }

    fn fixture(n: usize, seed: u64) -> Fixture {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = misc::random_vec(&mut rng, n);
        let b = misc::random_vec(&mut rng, n);
        let c = inner_product(&a, &b);
        Fixture { a, b, c }
    }

    #[test]
    fn hiding_ipa_roundtrip() {
        let pool = test_pool();
        let f = fixture(6, 31);
        let mut rng = StdRng::seed_from_u64(32);
        let input = ProveInput {
            g1: pool.bases(0, 6),
            g2: pool.bases(10, 6),
            h: pool.h(),
            u: pool.u(),
            a: &f.a,
            b: &f.b,
            c: f.c,
        };
        let (com_pub, com_sec) = commit(&input, &mut rng);
        let seed = Seed::new("p31");
        let proof = prove(seed, &input, &com_pub, &com_sec, &mut rng);

        let vin = VerifyInput {
            g1: input.g1,
            g2: input.g2,
            h: input.h,
            u: input.u,
            com_pub: &com_pub,
        };
        assert!(verify(seed, &vin, &proof));

        let mut bad = proof.clone();
        bad.tau += F::one();
        assert!(!verify(seed, &vin, &bad));

        let mut bad = proof.clone();
        bad.mu += F::one();
        assert!(!verify(seed, &vin, &bad));

        let wrong_q = CommitmentPub {
            p: com_pub.p,
            q: com_pub.q + G1::from(pool.u()),
        };
        assert!(!verify(seed, &VerifyInput { com_pub: &wrong_q, ..vin }, &proof));
    }

    #[test]
    fn hiding_ipa_is_deterministic_under_fixed_rng() {
        let pool = test_pool();
        let f = fixture(4, 40);
        let input = ProveInput {
            g1: pool.bases(0, 4),
            g2: pool.bases(4, 4),
            h: pool.h(),
            u: pool.g(9),
            a: &f.a,
            b: &f.b,
            c: f.c,
        };
        let run = || {
            let mut rng = StdRng::seed_from_u64(41);
            let (com_pub, com_sec) = commit(&input, &mut rng);
            prove(Seed::new("det"), &input, &com_pub, &com_sec, &mut rng)
        };
        assert_eq!(run(), run());
    }
}
