//! Hyrax linear argument: one sigma round, proof size linear in `n`.

#![allow(missing_docs)]

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::{check_commitments, CommitmentPub, CommitmentSec, HyraxArgument, ProveInput, VerifyInput};
use crate::misc::{self, inner_product};
use crate::pc::GeneratorPool;
use crate::transcript::{FsLabel, Seed};
use crate::{F, G1, STRICT_CHECKS};

/// Marker for the linear variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct A2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentExtPub {
    pub delta: G1,
    pub beta: G1,
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SubProof {
    pub z: Vec<F>,
    pub z_delta: F,
    pub z_beta: F,
}

/// Masking commitments and the linear-size response.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub com_ext_pub: CommitmentExtPub,
    pub sub_proof: SubProof,
}

fn challenge(seed: &mut Seed, a: &[F], com_pub: &CommitmentPub, ext: &CommitmentExtPub) -> F {
    seed.absorb(FsLabel::HyraxA2, |t| {
        t.scalars(a)
            .point(&com_pub.xi)
            .point(&com_pub.tau)
            .point(&ext.delta)
            .point(&ext.beta);
    });
    seed.challenge(FsLabel::HyraxA2)
}

impl HyraxArgument for A2 {
    type Proof = Proof;

    const NAME: &'static str = "hyrax-a2";

    fn prove<R: Rng>(
        pool: &GeneratorPool,
        mut seed: Seed,
        input: &ProveInput<'_>,
        com_pub: &CommitmentPub,
        com_sec: &CommitmentSec,
        rng: &mut R,
    ) -> Proof {
        let n = input.x.len();
        assert_eq!(input.a.len(), n, "hyrax a2: length mismatch");
        let _span = tracing::debug_span!("hyrax_a2_prove", n).entered();
        if STRICT_CHECKS {
            check_commitments(pool, input, com_pub, com_sec);
        }

        let d = misc::random_vec(rng, n);
        let r_delta = F::rand(rng);
        let r_beta = F::rand(rng);
        let delta = pool.commit(input.x_offset, &d, r_delta);
        let beta = pool.commit_scalar(input.y_offset, inner_product(input.a, &d), r_beta);
        let ext = CommitmentExtPub { delta, beta };

        let c = challenge(&mut seed, input.a, com_pub, &ext);
        let z = misc::combine(input.x, c, &d, F::from(1u64));
        let sub_proof = SubProof {
            z,
            z_delta: c * com_sec.r_xi + r_delta,
            z_beta: c * com_sec.r_tau + r_beta,
        };
        Proof {
            com_ext_pub: ext,
            sub_proof,
        }
    }

    fn verify(pool: &GeneratorPool, mut seed: Seed, input: &VerifyInput<'_>, proof: &Proof) -> bool {
        let n = input.a.len();
        let _span = tracing::debug_span!("hyrax_a2_verify", n).entered();
        let sub = &proof.sub_proof;
        if sub.z.len() != n {
            tracing::debug!(n, z = sub.z.len(), "hyrax a2: response length mismatch");
            return false;
        }
        let ext = &proof.com_ext_pub;
        let com_pub = input.com_pub;
        let c = challenge(&mut seed, input.a, com_pub, ext);

        if com_pub.xi * c + ext.delta != pool.commit(input.x_offset, &sub.z, sub.z_delta) {
            tracing::debug!("hyrax a2: vector commitment check failed");
            return false;
        }
        let za = inner_product(&sub.z, input.a);
        if com_pub.tau * c + ext.beta != pool.commit_scalar(input.y_offset, za, sub.z_beta) {
            tracing::debug!("hyrax a2: inner product check failed");
            return false;
        }
        true
    }
}
