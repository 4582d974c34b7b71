//! Hyrax logarithmic argument.
//!
//! The combined commitment `γ = xi + tau` opens to
//! `γ = r·H + y·gy + <x, g>` with `y = <x, a>`. Each round halves `x`, `a`
//! and `g` under a challenge `c` while `γ` absorbs the two cross terms; once
//! a single entry remains, a Schnorr-style step proves knowledge of it.
//!
//! ```text
//! round:  γ₋ = r₋·H + <x₁, a₂>·gy + <x₁, g₂>
//!         γ₊ = r₊·H + <x₂, a₁>·gy + <x₂, g₁>
//!         γ' = γ + c²·γ₋ + c⁻²·γ₊
//!         x' = c·x₁ + c⁻¹·x₂    a' = c⁻¹·a₁ + c·a₂    g' = c⁻¹·g₁ + c·g₂
//! final:  (γ·c + β)·a + δ == (g + a·gy)·z1 + z2·H
//! ```

#![allow(missing_docs)]

use ark_ec::AffineRepr;
use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::{check_commitments, CommitmentPub, CommitmentSec, HyraxArgument, ProveInput, VerifyInput};
use crate::misc::{self, challenge_products, inner_product, log2_ub};
use crate::pc::GeneratorPool;
use crate::transcript::{FsLabel, RoundX, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

/// Marker for the logarithmic variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct A3;

/// Per-round cross terms and the final opening of the folded entry.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub gamma_neg_1: Vec<G1>,
    pub gamma_pos_1: Vec<G1>,
    pub delta: G1,
    pub beta: G1,
    pub z1: F,
    pub z2: F,
}

impl Proof {
    /// Padded witness length the proof was produced for, `None` when the
    /// round count does not fit a `usize`.
    pub fn aligned_n(&self) -> Option<usize> {
        u32::try_from(self.gamma_neg_1.len())
            .ok()
            .and_then(|rounds| 1usize.checked_shl(rounds))
    }
}

fn bind_statement(seed: &mut Seed, a: &[F], com_pub: &CommitmentPub) {
    seed.absorb(FsLabel::HyraxA3, |t| {
        t.scalars(a).point(&com_pub.xi).point(&com_pub.tau);
    });
}

fn bind_round(seed: &mut Seed, neg: &G1, pos: &G1) -> RoundX {
    seed.absorb(FsLabel::HyraxA3Round, |t| {
        t.point(neg).point(pos);
    });
    seed.round_challenge(FsLabel::HyraxA3Round)
}

fn bind_final(seed: &mut Seed, delta: &G1, beta: &G1) -> F {
    seed.absorb(FsLabel::HyraxA3Final, |t| {
        t.point(delta).point(beta);
    });
    seed.challenge(FsLabel::HyraxA3Final)
}

impl HyraxArgument for A3 {
    type Proof = Proof;

    const NAME: &'static str = "hyrax-a3";

    fn prove<R: Rng>(
        pool: &GeneratorPool,
        mut seed: Seed,
        input: &ProveInput<'_>,
        com_pub: &CommitmentPub,
        com_sec: &CommitmentSec,
        rng: &mut R,
    ) -> Proof {
        let n = input.x.len();
        assert!(n > 0, "hyrax a3 over an empty vector");
        assert_eq!(input.a.len(), n, "hyrax a3: length mismatch");
        let _span = tracing::debug_span!("hyrax_a3_prove", n).entered();
        if STRICT_CHECKS {
            check_commitments(pool, input, com_pub, com_sec);
        }
        bind_statement(&mut seed, input.a, com_pub);

        let len = misc::pow2_ub(n);
        let mut x = input.x.to_vec();
        let mut a = input.a.to_vec();
        let mut g = pool.bases(input.x_offset, n).to_vec();
        misc::pad_scalars(&mut x, len);
        misc::pad_scalars(&mut a, len);
        misc::pad_bases(&mut g, len);

        let h = pool.h();
        let gy = pool.g(input.y_offset);
        let mut y = input.y;
        let mut gamma = com_pub.xi + com_pub.tau;
        let mut r_gamma = com_sec.r_xi + com_sec.r_tau;

        let rounds = log2_ub(n);
        let mut gamma_neg_1 = Vec::with_capacity(rounds);
        let mut gamma_pos_1 = Vec::with_capacity(rounds);

        while x.len() > 1 {
            let half = x.len() / 2;
            let (x1, x2) = x.split_at(half);
            let (a1, a2) = a.split_at(half);
            let (g1, g2) = g.split_at(half);

            let y_neg = inner_product(x1, a2);
            let y_pos = inner_product(x2, a1);
            let r_neg = F::rand(rng);
            let r_pos = F::rand(rng);
            let (neg, pos) = parallel::invoke(
                || h * r_neg + gy * y_neg + misc::msm(g2, x1),
                || h * r_pos + gy * y_pos + misc::msm(g1, x2),
            );
            let c = bind_round(&mut seed, &neg, &pos);

            gamma += neg * c.square + pos * c.square_inv;
            r_gamma += r_neg * c.square + r_pos * c.square_inv;
            y += y_neg * c.square + y_pos * c.square_inv;
            let g_next = misc::fold_bases(&g, c.inv, c.x);
            a = misc::fold_scalars(&a, c.inv, c.x);
            x = misc::fold_scalars(&x, c.x, c.inv);
            g = g_next;

            if STRICT_CHECKS {
                assert_eq!(y, inner_product(&x, &a), "hyrax a3: folded y");
                assert_eq!(
                    gamma,
                    h * r_gamma + gy * y + misc::msm(&g, &x),
                    "hyrax a3: folded gamma"
                );
            }
            gamma_neg_1.push(neg);
            gamma_pos_1.push(pos);
        }

        let (a0, g0) = (a[0], g[0]);
        let d = F::rand(rng);
        let r_delta = F::rand(rng);
        let r_beta = F::rand(rng);
        let delta = g0 * d + h * r_delta;
        let beta = gy * d + h * r_beta;
        let c = bind_final(&mut seed, &delta, &beta);

        Proof {
            gamma_neg_1,
            gamma_pos_1,
            delta,
            beta,
            z1: d + c * y,
            z2: a0 * (c * r_gamma + r_beta) + r_delta,
        }
    }

    fn verify(pool: &GeneratorPool, mut seed: Seed, input: &VerifyInput<'_>, proof: &Proof) -> bool {
        let n = input.a.len();
        let _span = tracing::debug_span!("hyrax_a3_verify", n).entered();
        if n == 0
            || proof.gamma_neg_1.len() != log2_ub(n)
            || proof.gamma_pos_1.len() != proof.gamma_neg_1.len()
        {
            tracing::debug!(
                n,
                rounds = proof.gamma_neg_1.len(),
                "hyrax a3: round count does not match the input length"
            );
            return false;
        }
        let com_pub = input.com_pub;
        bind_statement(&mut seed, input.a, com_pub);

        let mut gamma = com_pub.xi + com_pub.tau;
        let mut rounds = Vec::with_capacity(proof.gamma_neg_1.len());
        for (neg, pos) in proof.gamma_neg_1.iter().zip(&proof.gamma_pos_1) {
            let c = bind_round(&mut seed, neg, pos);
            gamma += *neg * c.square + *pos * c.square_inv;
            rounds.push(c);
        }

        let (s, _) = challenge_products(&rounds, n);
        let g = misc::msm(pool.bases(input.x_offset, n), &s);
        let a = inner_product(input.a, &s);
        let c = bind_final(&mut seed, &proof.delta, &proof.beta);

        let gy = pool.g(input.y_offset).into_group();
        let lhs = (gamma * c + proof.beta) * a + proof.delta;
        let rhs = (g + gy * a) * proof.z1 + pool.h() * proof.z2;
        if lhs != rhs {
            tracing::debug!("hyrax a3: final equation failed");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyrax::commit;
    use crate::pc::{test_pool, U_OFFSET};
    use ark_ff::One;
    use rand::{rngs::StdRng, SeedableRng};

    fn setup(n: usize, seed: u64) -> (Vec<F>, Vec<F>, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let x = misc::random_vec(&mut rng, n);
        let a = misc::random_vec(&mut rng, n);
        (x, a, rng)
    }

    #[test]
    fn a3_pads_to_log_rounds() {
        let pool = test_pool();
        for n in [1usize, 3, 6, 9] {
            let (x, a, mut rng) = setup(n, 300 + n as u64);
            let input = ProveInput::new(&x, &a, 2, U_OFFSET);
            let (com_pub, com_sec) = commit(pool, &input, &mut rng);
            let seed = Seed::new("a3");
            let proof = A3::prove(pool, seed, &input, &com_pub, &com_sec, &mut rng);
            assert_eq!(proof.gamma_neg_1.len(), log2_ub(n));
            assert_eq!(proof.aligned_n(), Some(misc::pow2_ub(n)));
            let vin = VerifyInput {
                a: &a,
                com_pub: &com_pub,
                x_offset: 2,
                y_offset: U_OFFSET,
            };
            assert!(A3::verify(pool, seed, &vin, &proof), "n = {n}");
        }
    }

    #[test]
    fn a3_rejects_tampering() {
        let pool = test_pool();
        let (x, a, mut rng) = setup(5, 310);
        let input = ProveInput::new(&x, &a, 0, 7);
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let seed = Seed::new("a3-neg");
        let proof = A3::prove(pool, seed, &input, &com_pub, &com_sec, &mut rng);
        let vin = VerifyInput {
            a: &a,
            com_pub: &com_pub,
            x_offset: 0,
            y_offset: 7,
        };
        assert!(A3::verify(pool, seed, &vin, &proof));

        let mut bad = proof.clone();
        bad.z1 += F::one();
        assert!(!A3::verify(pool, seed, &vin, &bad));

        let mut bad = proof.clone();
        bad.gamma_pos_1[1] = bad.gamma_neg_1[1];
        assert!(!A3::verify(pool, seed, &vin, &bad));

        let mut bad = proof.clone();
        bad.gamma_neg_1.push(proof.delta);
        bad.gamma_pos_1.push(proof.beta);
        assert!(!A3::verify(pool, seed, &vin, &bad));

        let mut bad = proof.clone();
        bad.gamma_neg_1 = vec![proof.delta; 64];
        bad.gamma_pos_1 = vec![proof.beta; 64];
        assert_eq!(bad.aligned_n(), None);
        assert!(!A3::verify(pool, seed, &vin, &bad));

        let wrong_xi = CommitmentPub {
            xi: com_pub.xi + G1::from(pool.g(0)),
            ..com_pub
        };
        assert!(!A3::verify(pool, seed, &VerifyInput { com_pub: &wrong_xi, ..vin }, &proof));
    }
}
