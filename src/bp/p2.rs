//! Inner-product argument, statement `P = <a, g> + <b, h> + <a, b>·u`.

#![allow(missing_docs)]

use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::misc::{self, challenge_products, inner_product, log2_ub};
use crate::transcript::{FsLabel, RoundX, Seed};
use crate::{parallel, G1Affine, F, G1, STRICT_CHECKS};

/// Prover witness together with the generators it is committed under.
#[derive(Clone, Copy, Debug)]
pub struct ProveInput<'a> {
    pub g: &'a [G1Affine],
    pub h: &'a [G1Affine],
    pub u: G1Affine,
    pub a: &'a [F],
    pub b: &'a [F],
}

/// Public generators.
#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    pub g: &'a [G1Affine],
    pub h: &'a [G1Affine],
    pub u: G1Affine,
}

/// Round messages `(L, R)` and the final folded scalars.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub left: Vec<G1>,
    pub right: Vec<G1>,
    pub a: F,
    pub b: F,
}

impl<'a> ProveInput<'a> {
    fn statement(&self) -> G1 {
        misc::msm(self.g, self.a)
            + misc::msm(self.h, self.b)
            + self.u * inner_product(self.a, self.b)
    }
}

fn absorb_statement(seed: &mut Seed, p: &G1, u: &G1Affine, n: usize) {
    seed.absorb(FsLabel::IpaStatement, |t| {
        t.point(p).point(&u.into_group()).counter(n as u64);
    });
}

/// Prove knowledge of `input.a, input.b` opening `p`.
///
/// Panics if `n == 0` or the lengths disagree.
pub fn prove(mut seed: Seed, p: G1, input: &ProveInput<'_>) -> Proof {
    let n = input.a.len();
    assert!(n > 0, "inner-product argument over an empty vector");
    assert!(
        input.b.len() == n && input.g.len() == n && input.h.len() == n,
        "inner-product argument length mismatch"
    );
    let _span = tracing::debug_span!("ipa_prove", n).entered();
    if STRICT_CHECKS {
        assert_eq!(p, input.statement(), "ipa statement does not open");
    }
    absorb_statement(&mut seed, &p, &input.u, n);

    let len = misc::pow2_ub(n);
    let mut g = input.g.to_vec();
    let mut h = input.h.to_vec();
    let mut a = input.a.to_vec();
    let mut b = input.b.to_vec();
    misc::pad_bases(&mut g, len);
    misc::pad_bases(&mut h, len);
    misc::pad_scalars(&mut a, len);
    misc::pad_scalars(&mut b, len);

    let u = input.u;
    let rounds = log2_ub(n);
    let mut left = Vec::with_capacity(rounds);
    let mut right = Vec::with_capacity(rounds);
    let mut p = p;

    while a.len() > 1 {
        let half = a.len() / 2;
        let (a_lo, a_hi) = a.split_at(half);
        let (b_lo, b_hi) = b.split_at(half);
        let (g_lo, g_hi) = g.split_at(half);
        let (h_lo, h_hi) = h.split_at(half);

        let (l, r) = parallel::invoke(
            || misc::msm(g_hi, a_lo) + misc::msm(h_lo, b_hi) + u * inner_product(a_lo, b_hi),
            || misc::msm(g_lo, a_hi) + misc::msm(h_hi, b_lo) + u * inner_product(a_hi, b_lo),
        );
        seed.absorb(FsLabel::IpaRound, |t| {
            t.point(&l).point(&r);
        });
        let x = seed.round_challenge(FsLabel::IpaRound);

        let (g2, h2) = parallel::invoke(
            || misc::fold_bases(&g, x.inv, x.x),
            || misc::fold_bases(&h, x.x, x.inv),
        );
        g = g2;
        h = h2;
        a = misc::fold_scalars(&a, x.x, x.inv);
        b = misc::fold_scalars(&b, x.inv, x.x);

        if STRICT_CHECKS {
            p += l * x.square + r * x.square_inv;
            let folded = ProveInput { g: &g, h: &h, u, a: &a, b: &b };
            assert_eq!(p, folded.statement(), "ipa fold broke the statement");
        }
        left.push(l);
        right.push(r);
    }

    Proof {
        left,
        right,
        a: a[0],
        b: b[0],
    }
}

/// Verify `proof` against the statement `p`.
///
/// Panics if `n == 0`.
pub fn verify(mut seed: Seed, p: G1, input: &VerifyInput<'_>, proof: &Proof) -> bool {
    let n = input.g.len();
    assert!(n > 0, "inner-product argument over an empty vector");
    assert_eq!(input.h.len(), n, "inner-product argument length mismatch");
    let _span = tracing::debug_span!("ipa_verify", n).entered();

    let rounds = log2_ub(n);
    if proof.left.len() != rounds || proof.right.len() != rounds {
        tracing::debug!(
            expected = rounds,
            left = proof.left.len(),
            right = proof.right.len(),
            "ipa: wrong round count"
        );
        return false;
    }

    absorb_statement(&mut seed, &p, &input.u, n);
    let xs: Vec<RoundX> = proof
        .left
        .iter()
        .zip(&proof.right)
        .map(|(l, r)| {
            seed.absorb(FsLabel::IpaRound, |t| {
                t.point(l).point(r);
            });
            seed.round_challenge(FsLabel::IpaRound)
        })
        .collect();

    let (s, s_inv) = challenge_products(&xs, n);
    let sa = misc::scale(&s, proof.a);
    let sb = misc::scale(&s_inv, proof.b);
    let squares: Vec<F> = xs.iter().map(|x| x.square).collect();
    let squares_inv: Vec<F> = xs.iter().map(|x| x.square_inv).collect();

    let ((gs, hs), (ls, rs)) = parallel::invoke(
        || parallel::invoke(|| misc::msm(input.g, &sa), || misc::msm(input.h, &sb)),
        || {
            (
                misc::msm_proj(&proof.left, &squares),
                misc::msm_proj(&proof.right, &squares_inv),
            )
        },
    );
    let lhs = gs + hs + input.u * (proof.a * proof.b);
    if lhs != p + ls + rs {
        tracing::debug!("ipa: final equation failed");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pc::{test_pool, U_OFFSET};
    use ark_ff::One;
    use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
    use rand::{rngs::StdRng, SeedableRng};

    fn statement(g: &[G1Affine], h: &[G1Affine], u: G1Affine, a: &[F], b: &[F]) -> G1 {
        ProveInput { g, h, u, a, b }.statement()
    }

    #[test]
    fn eight_element_scenario() {
        let pool = test_pool();
        let a: Vec<F> = (1..=8u64).map(F::from).collect();
        let b: Vec<F> = (1..=8u64).rev().map(F::from).collect();
        assert_eq!(inner_product(&a, &b), F::from(120u64));

        let g = pool.bases(0, 8);
        let h = pool.bases(8, 8);
        let u = pool.g(U_OFFSET);
        let p = statement(g, h, u, &a, &b);
        let seed = Seed::new("ipa-test");

        let proof = prove(seed, p, &ProveInput { g, h, u, a: &a, b: &b });
        assert_eq!(proof.left.len(), 3);
        let vin = VerifyInput { g, h, u };
        assert!(verify(seed, p, &vin, &proof));

        let mut bad = proof.clone();
        bad.a += F::one();
        assert!(!verify(seed, p, &vin, &bad));
    }

    #[test]
    fn non_power_of_two_lengths_verify() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(5);
        for n in [1usize, 3, 5, 13] {
            let a = misc::random_vec(&mut rng, n);
            let b = misc::random_vec(&mut rng, n);
            let (g, h, u) = (pool.bases(0, n), pool.bases(32, n), pool.u());
            let p = statement(g, h, u, &a, &b);
            let seed = Seed::new("pad");
            let proof = prove(seed, p, &ProveInput { g, h, u, a: &a, b: &b });
            assert_eq!(proof.left.len(), log2_ub(n));
            assert!(verify(seed, p, &VerifyInput { g, h, u }, &proof), "n = {n}");
        }
    }

    #[test]
    fn rejects_wrong_statement_seed_and_rounds() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(6);
        let a = misc::random_vec(&mut rng, 6);
        let b = misc::random_vec(&mut rng, 6);
        let (g, h, u) = (pool.bases(0, 6), pool.bases(6, 6), pool.u());
        let p = statement(g, h, u, &a, &b);
        let seed = Seed::new("neg");
        let proof = prove(seed, p, &ProveInput { g, h, u, a: &a, b: &b });
        let vin = VerifyInput { g, h, u };

        assert!(!verify(seed, p + G1::from(pool.h()), &vin, &proof));
        assert!(!verify(Seed::new("other"), p, &vin, &proof));

        let mut short = proof.clone();
        short.left.pop();
        short.right.pop();
        assert!(!verify(seed, p, &vin, &short));

        let mut swapped = proof.clone();
        swapped.left.swap(0, 1);
        assert!(!verify(seed, p, &vin, &swapped));
    }

    #[test]
    fn proof_serialization_roundtrip() {
        let pool = test_pool();
        let a: Vec<F> = (1..=4u64).map(F::from).collect();
        let (g, h, u) = (pool.bases(0, 4), pool.bases(4, 4), pool.u());
        let p = statement(g, h, u, &a, &a);
        let proof = prove(Seed::new("ser"), p, &ProveInput { g, h, u, a: &a, b: &a });

        let mut bytes = Vec::new();
        proof.serialize_compressed(&mut bytes).unwrap();
        let back = Proof::deserialize_compressed(&bytes[..]).unwrap();
        assert_eq!(back, proof);
    }

    #[test]
    #[should_panic]
    fn empty_input_panics() {
        let pool = test_pool();
        prove(
            Seed::new("empty"),
            G1::default(),
            &ProveInput {
                g: &[],
                h: &[],
                u: pool.u(),
                a: &[],
                b: &[],
            },
        );
    }
}
