//! Sec51, linear variant: one sigma round revealing masked `x`, `y`.
//!
//! Verify cost is one MSM of length `n` when `x` and `y` share generators,
//! two otherwise.

#![allow(missing_docs)]

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::sec51::{check_commitments, CommitmentPub, CommitmentSec, ProveInput, Sec51Argument, VerifyInput};
use crate::misc::{self, hadamard, inner_product};
use crate::pc::GeneratorPool;
use crate::transcript::{FsLabel, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

/// Marker for the linear Sec51 argument.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sec51b;

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentExtPub {
    pub ad: G1,
    pub bd: G1,
    pub c1: G1,
    pub c0: G1,
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SubProof {
    pub fx: Vec<F>,
    pub fy: Vec<F>,
    pub rx: F,
    pub sy: F,
    pub tz: F,
}

/// One-round sigma proof.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub com_ext_pub: CommitmentExtPub,
    pub sub_proof: SubProof,
}

fn challenge(seed: &mut Seed, com_pub: &CommitmentPub, ext: &CommitmentExtPub) -> F {
    seed.absorb(FsLabel::Sec51b, |t| {
        t.point(&com_pub.a)
            .point(&com_pub.b)
            .point(&com_pub.c)
            .point(&ext.ad)
            .point(&ext.bd)
            .point(&ext.c1)
            .point(&ext.c0);
    });
    seed.challenge(FsLabel::Sec51b)
}

impl Sec51Argument for Sec51b {
    type Proof = Proof;

    const NAME: &'static str = "sec51b";

    fn prove<R: Rng>(
        pool: &GeneratorPool,
        mut seed: Seed,
        input: &ProveInput<'_>,
        com_pub: &CommitmentPub,
        com_sec: &CommitmentSec,
        rng: &mut R,
    ) -> Proof {
        let n = input.n();
        let _span = tracing::debug_span!("sec51b_prove", n).entered();
        if STRICT_CHECKS {
            check_commitments(pool, input, com_pub, com_sec);
        }

        let dx = misc::random_vec(rng, n);
        let dy = misc::random_vec(rng, n);
        let dyt = hadamard(&dy, input.t);
        let dz = inner_product(&dx, &dyt);
        let rd = F::rand(rng);
        let sd = F::rand(rng);
        let t1 = F::rand(rng);
        let t0 = F::rand(rng);
        let cross = inner_product(input.x, &dyt) + inner_product(&dx, input.yt);

        let (ad, bd, (c1, c0)) = parallel::invoke3(
            || pool.commit(input.x_offset, &dx, rd),
            || pool.commit(input.y_offset, &dy, sd),
            || {
                (
                    pool.commit_scalar(input.z_offset, cross, t1),
                    pool.commit_scalar(input.z_offset, dz, t0),
                )
            },
        );
        let ext = CommitmentExtPub { ad, bd, c1, c0 };
        let e = challenge(&mut seed, com_pub, &ext);

        let one = F::from(1u64);
        let sub_proof = SubProof {
            fx: misc::combine(input.x, e, &dx, one),
            fy: misc::combine(input.y, e, &dy, one),
            rx: e * com_sec.r + rd,
            sy: e * com_sec.s + sd,
            tz: e * e * com_sec.t + e * t1 + t0,
        };
        Proof {
            com_ext_pub: ext,
            sub_proof,
        }
    }

    fn verify(pool: &GeneratorPool, mut seed: Seed, input: &VerifyInput<'_>, proof: &Proof) -> bool {
        let sub = &proof.sub_proof;
        let n = input.t.len();
        let _span = tracing::debug_span!("sec51b_verify", n).entered();
        if sub.fx.len() != n || sub.fy.len() != n {
            tracing::debug!(
                n,
                fx = sub.fx.len(),
                fy = sub.fy.len(),
                "sec51b: response length mismatch"
            );
            return false;
        }
        let com_pub = input.com_pub;
        let ext = &proof.com_ext_pub;
        let e = challenge(&mut seed, com_pub, ext);

        let openings = || {
            if input.x_offset == input.y_offset {
                // One MSM: fold both openings with a fresh random weight.
                let alpha = F::rand(&mut rand::thread_rng());
                let left = (com_pub.a * e + ext.ad) * alpha + (com_pub.b * e + ext.bd);
                let merged = misc::combine(&sub.fx, alpha, &sub.fy, F::from(1u64));
                let right = pool.commit(input.x_offset, &merged, alpha * sub.rx + sub.sy);
                left == right
            } else {
                let (ok_a, ok_b) = parallel::invoke(
                    || com_pub.a * e + ext.ad == pool.commit(input.x_offset, &sub.fx, sub.rx),
                    || com_pub.b * e + ext.bd == pool.commit(input.y_offset, &sub.fy, sub.sy),
                );
                ok_a && ok_b
            }
        };
        let product = || {
            let left = com_pub.c * (e * e) + ext.c1 * e + ext.c0;
            let fz = inner_product(&sub.fx, &hadamard(&sub.fy, input.t));
            left == pool.commit_scalar(input.z_offset, fz, sub.tz)
        };
        let (ok_open, ok_product) = parallel::invoke(openings, product);
        if !ok_open {
            tracing::debug!("sec51b: opening check failed");
        }
        if !ok_product {
            tracing::debug!("sec51b: product check failed");
        }
        ok_open && ok_product
    }
}
