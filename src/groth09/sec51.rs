//! Shared types for the single-row Hadamard inner-product relation
//!
//! ```text
//! z = <x, y ∘ t>
//! a = Com_gx(x, r)    b = Com_gy(y, s)    c = z·gz + t_z·H
//! ```
//!
//! `t` is public. The prover also carries `yt = y ∘ t` so that callers that
//! already hold it (Sec53 keeps it folded) do not recompute it.

#![allow(missing_docs)]

use std::fmt::Debug;

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use crate::misc::{hadamard, inner_product};
use crate::pc::GeneratorPool;
use crate::transcript::Seed;
use crate::{F, G1};

#[derive(Clone, Copy, Debug)]
pub struct ProveInput<'a> {
    pub x: &'a [F],
    pub y: &'a [F],
    pub t: &'a [F],
    /// `y ∘ t`.
    pub yt: &'a [F],
    /// `<x, yt>`.
    pub z: F,
    pub x_offset: i64,
    pub y_offset: i64,
    pub z_offset: i64,
}

impl<'a> ProveInput<'a> {
    pub fn n(&self) -> usize {
        self.x.len()
    }

    pub(crate) fn check_relation(&self) {
        let n = self.n();
        assert!(
            self.y.len() == n && self.t.len() == n && self.yt.len() == n,
            "sec51: length mismatch"
        );
        assert_eq!(self.yt, &hadamard(self.y, self.t)[..], "sec51: yt != y ∘ t");
        assert_eq!(self.z, inner_product(self.x, self.yt), "sec51: z != <x, yt>");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    pub a: G1,
    pub b: G1,
    pub c: G1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitmentSec {
    pub r: F,
    pub s: F,
    pub t: F,
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    pub t: &'a [F],
    pub com_pub: &'a CommitmentPub,
    pub x_offset: i64,
    pub y_offset: i64,
    pub z_offset: i64,
}

pub fn commit<R: Rng>(
    pool: &GeneratorPool,
    input: &ProveInput<'_>,
    rng: &mut R,
) -> (CommitmentPub, CommitmentSec) {
    let sec = CommitmentSec {
        r: F::rand(rng),
        s: F::rand(rng),
        t: F::rand(rng),
    };
    let com = CommitmentPub {
        a: pool.commit(input.x_offset, input.x, sec.r),
        b: pool.commit(input.y_offset, input.y, sec.s),
        c: pool.commit_scalar(input.z_offset, input.z, sec.t),
    };
    (com, sec)
}

pub(crate) fn check_commitments(
    pool: &GeneratorPool,
    input: &ProveInput<'_>,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
) {
    input.check_relation();
    assert_eq!(com_pub.a, pool.commit(input.x_offset, input.x, com_sec.r), "sec51: a");
    assert_eq!(com_pub.b, pool.commit(input.y_offset, input.y, com_sec.s), "sec51: b");
    assert_eq!(
        com_pub.c,
        pool.commit_scalar(input.z_offset, input.z, com_sec.t),
        "sec51: c"
    );
}

/// A proof of `z = <x, y ∘ t>` under the commitments above.
pub trait Sec51Argument: Send + Sync + 'static {
    /// Serialized proof.
    type Proof: Clone
        + Debug
        + PartialEq
        + Send
        + Sync
        + CanonicalSerialize
        + CanonicalDeserialize;

    /// Name used in tracing spans.
    const NAME: &'static str;

    /// Prove the relation for `input`. Panics on malformed input.
    fn prove<R: Rng>(
        pool: &GeneratorPool,
        seed: Seed,
        input: &ProveInput<'_>,
        com_pub: &CommitmentPub,
        com_sec: &CommitmentSec,
        rng: &mut R,
    ) -> Self::Proof;

    /// `true` iff `proof` is accepted; never panics on a malformed proof.
    fn verify(
        pool: &GeneratorPool,
        seed: Seed,
        input: &VerifyInput<'_>,
        proof: &Self::Proof,
    ) -> bool;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Owned witness for one Sec51 instance.
    pub struct Witness {
        pub x: Vec<F>,
        pub y: Vec<F>,
        pub t: Vec<F>,
        pub yt: Vec<F>,
        pub z: F,
    }

    impl Witness {
        pub fn new(x: Vec<F>, y: Vec<F>, t: Vec<F>) -> Self {
            let yt = hadamard(&y, &t);
            let z = inner_product(&x, &yt);
            Self { x, y, t, yt, z }
        }

        pub fn input(&self, x_offset: i64, y_offset: i64, z_offset: i64) -> ProveInput<'_> {
            ProveInput {
                x: &self.x,
                y: &self.y,
                t: &self.t,
                yt: &self.yt,
                z: self.z,
                x_offset,
                y_offset,
                z_offset,
            }
        }
    }

    pub fn small(values: &[u64]) -> Vec<F> {
        values.iter().copied().map(F::from).collect()
    }
}
