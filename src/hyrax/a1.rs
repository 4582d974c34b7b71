//! Hyrax product argument over committed scalars: `z = x·y`.
//!
//! ```text
//! X = x·gx + r_x·H    Y = y·gy + r_y·H    Z = z·gx + r_z·H
//! ```
//!
//! `Z` shares `gx` with `X`, which lets the prover open `Z` as a multiple of
//! `X` (`Z = y·X + (r_z - r_x·y)·H`). One sigma round answers all three
//! openings with the same challenge.

#![allow(missing_docs)]

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use crate::pc::GeneratorPool;
use crate::transcript::{FsLabel, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

#[derive(Clone, Copy, Debug)]
pub struct ProveInput {
    pub x: F,
    pub y: F,
    /// `x·y`.
    pub z: F,
    pub x_offset: i64,
    pub y_offset: i64,
}

impl ProveInput {
    pub fn new(x: F, y: F, x_offset: i64, y_offset: i64) -> Self {
        Self {
            x,
            y,
            z: x * y,
            x_offset,
            y_offset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    pub x: G1,
    pub y: G1,
    /// Committed under the `x` generator.
    pub z: G1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitmentSec {
    pub r_x: F,
    pub r_y: F,
    pub r_z: F,
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    pub com_pub: &'a CommitmentPub,
    pub x_offset: i64,
    pub y_offset: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentExtPub {
    /// `b1·gx + b2·H`.
    pub alpha: G1,
    /// `b3·gy + b4·H`.
    pub beta: G1,
    /// `b3·X + b5·H`.
    pub delta: G1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SubProof {
    pub z1: F,
    pub z2: F,
    pub z3: F,
    pub z4: F,
    pub z5: F,
}

/// Three masking commitments and five responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub com_ext_pub: CommitmentExtPub,
    pub sub_proof: SubProof,
}

/// Commit to `x`, `y` and `z` with fresh blindings.
pub fn commit<R: Rng>(
    pool: &GeneratorPool,
    input: &ProveInput,
    rng: &mut R,
) -> (CommitmentPub, CommitmentSec) {
    let com_sec = CommitmentSec {
        r_x: F::rand(rng),
        r_y: F::rand(rng),
        r_z: F::rand(rng),
    };
    let com_pub = CommitmentPub {
        x: pool.commit_scalar(input.x_offset, input.x, com_sec.r_x),
        y: pool.commit_scalar(input.y_offset, input.y, com_sec.r_y),
        z: pool.commit_scalar(input.x_offset, input.z, com_sec.r_z),
    };
    (com_pub, com_sec)
}

fn check_commitments(
    pool: &GeneratorPool,
    input: &ProveInput,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
) {
    assert_eq!(input.z, input.x * input.y, "hyrax a1: z != x·y");
    assert_eq!(com_pub.x, pool.commit_scalar(input.x_offset, input.x, com_sec.r_x));
    assert_eq!(com_pub.y, pool.commit_scalar(input.y_offset, input.y, com_sec.r_y));
    assert_eq!(com_pub.z, pool.commit_scalar(input.x_offset, input.z, com_sec.r_z));
}

fn challenge(seed: &mut Seed, com_pub: &CommitmentPub, ext: &CommitmentExtPub) -> F {
    seed.absorb(FsLabel::HyraxA1, |t| {
        t.point(&com_pub.x)
            .point(&com_pub.y)
            .point(&com_pub.z)
            .point(&ext.alpha)
            .point(&ext.beta)
            .point(&ext.delta);
    });
    seed.challenge(FsLabel::HyraxA1)
}

pub fn prove<R: Rng>(
    pool: &GeneratorPool,
    mut seed: Seed,
    input: &ProveInput,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
    rng: &mut R,
) -> Proof {
    let _span = tracing::debug_span!("hyrax_a1_prove").entered();
    if STRICT_CHECKS {
        check_commitments(pool, input, com_pub, com_sec);
    }

    let b: [F; 5] = std::array::from_fn(|_| F::rand(rng));
    let ext = CommitmentExtPub {
        alpha: pool.commit_scalar(input.x_offset, b[0], b[1]),
        beta: pool.commit_scalar(input.y_offset, b[2], b[3]),
        delta: com_pub.x * b[2] + pool.h() * b[4],
    };
    let c = challenge(&mut seed, com_pub, &ext);

    let sub_proof = SubProof {
        z1: b[0] + c * input.x,
        z2: b[1] + c * com_sec.r_x,
        z3: b[2] + c * input.y,
        z4: b[3] + c * com_sec.r_y,
        z5: b[4] + c * (com_sec.r_z - com_sec.r_x * input.y),
    };
    Proof {
        com_ext_pub: ext,
        sub_proof,
    }
}

pub fn verify(pool: &GeneratorPool, mut seed: Seed, input: &VerifyInput<'_>, proof: &Proof) -> bool {
    let _span = tracing::debug_span!("hyrax_a1_verify").entered();
    let com_pub = input.com_pub;
    let ext = &proof.com_ext_pub;
    let sub = &proof.sub_proof;
    let c = challenge(&mut seed, com_pub, ext);

    let (ok_x, ok_y, ok_z) = parallel::invoke3(
        || ext.alpha + com_pub.x * c == pool.commit_scalar(input.x_offset, sub.z1, sub.z2),
        || ext.beta + com_pub.y * c == pool.commit_scalar(input.y_offset, sub.z3, sub.z4),
        || ext.delta + com_pub.z * c == com_pub.x * sub.z3 + pool.h() * sub.z5,
    );
    if !(ok_x && ok_y && ok_z) {
        tracing::debug!(ok_x, ok_y, ok_z, "hyrax a1: opening rejected");
        return false;
    }
    true
}
