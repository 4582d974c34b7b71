//! Hyrax proofs that a committed scalar is a public linear form of a
//! committed vector.
//!
//! Statement, for public `a`:
//!
//! ```text
//! xi  = Com_gx(x, r_xi)         = r_xi·H + Σ x[i]·G[x_offset + i]
//! tau = y·G[y_offset] + r_tau·H,  y = <x, a>
//! ```
//!
//! Two arguments share these types and are interchangeable behind
//! [`HyraxArgument`]: [`a2::A2`] (linear proof size, one round) and
//! [`a3::A3`] (logarithmic proof size).
//!
//! Alongside them: [`a1`] proves `z = x·y` for committed scalars, and [`a4`]
//! batches [`a3::A3`] over rows of different lengths.

use std::fmt::Debug;

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use crate::misc::inner_product;
use crate::pc::GeneratorPool;
use crate::transcript::Seed;
use crate::{F, G1};

pub mod a1;
pub mod a2;
pub mod a3;
pub mod a4;
pub mod equal_ip;

pub use a2::A2;
pub use a3::A3;

/// Prover side of the statement.
#[derive(Clone, Copy, Debug)]
pub struct ProveInput<'a> {
    /// Secret vector.
    pub x: &'a [F],
    /// Public vector, same length as `x`.
    pub a: &'a [F],
    /// `<x, a>`.
    pub y: F,
    /// First generator of `x`.
    pub x_offset: i64,
    /// Generator of `y`.
    pub y_offset: i64,
}

impl<'a> ProveInput<'a> {
    /// Build the input, computing `y`.
    pub fn new(x: &'a [F], a: &'a [F], x_offset: i64, y_offset: i64) -> Self {
        Self {
            x,
            a,
            y: inner_product(x, a),
            x_offset,
            y_offset,
        }
    }
}

/// Public commitments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    /// Commitment to `x`.
    pub xi: G1,
    /// Commitment to `y`.
    pub tau: G1,
}

/// Blindings of [`CommitmentPub`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitmentSec {
    /// Blinding of `xi`.
    pub r_xi: F,
    /// Blinding of `tau`.
    pub r_tau: F,
}

/// Verifier side of the statement.
#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    /// Public vector.
    pub a: &'a [F],
    /// Commitments under test.
    pub com_pub: &'a CommitmentPub,
    /// First generator of `x`.
    pub x_offset: i64,
    /// Generator of `y`.
    pub y_offset: i64,
}

/// Commit to `x` and `y` with fresh blindings.
pub fn commit<R: Rng>(
    pool: &GeneratorPool,
    input: &ProveInput<'_>,
    rng: &mut R,
) -> (CommitmentPub, CommitmentSec) {
    let r_xi = F::rand(rng);
    let r_tau = F::rand(rng);
    let xi = pool.commit(input.x_offset, input.x, r_xi);
    let tau = pool.commit_scalar(input.y_offset, input.y, r_tau);
    (CommitmentPub { xi, tau }, CommitmentSec { r_xi, r_tau })
}

pub(crate) fn check_commitments(
    pool: &GeneratorPool,
    input: &ProveInput<'_>,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
) {
    assert_eq!(input.y, inner_product(input.x, input.a), "hyrax: y != <x, a>");
    assert_eq!(com_pub.xi, pool.commit(input.x_offset, input.x, com_sec.r_xi));
    assert_eq!(
        com_pub.tau,
        pool.commit_scalar(input.y_offset, input.y, com_sec.r_tau)
    );
}

/// A proof of `y = <x, a>` under the commitments above.
pub trait HyraxArgument: Send + Sync + 'static {
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

    /// Prove `y = <x, a>`. Panics on malformed input.
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
mod tests {
    use super::*;
    use crate::misc::random_vec;
    use crate::pc::{test_pool, U_OFFSET};
    use rand::{rngs::StdRng, SeedableRng};

    fn prove_and_verify<H: HyraxArgument>(
        input: &ProveInput<'_>,
        com_pub: &CommitmentPub,
        com_sec: &CommitmentSec,
    ) -> bool {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(99);
        let seed = Seed::new("hyrax-shared");
        let proof = H::prove(pool, seed, input, com_pub, com_sec, &mut rng);
        let vin = VerifyInput {
            a: input.a,
            com_pub,
            x_offset: input.x_offset,
            y_offset: input.y_offset,
        };
        H::verify(pool, seed, &vin, &proof)
    }

    #[test]
    fn a2_and_a3_accept_the_same_commitments() {
        let pool = test_pool();
        for n in [1usize, 2, 7, 16] {
            let mut rng = StdRng::seed_from_u64(n as u64);
            let x = random_vec(&mut rng, n);
            let a = random_vec(&mut rng, n);
            let input = ProveInput::new(&x, &a, 3, U_OFFSET);
            let (com_pub, com_sec) = commit(pool, &input, &mut rng);
            assert!(prove_and_verify::<A2>(&input, &com_pub, &com_sec), "A2 n = {n}");
            assert!(prove_and_verify::<A3>(&input, &com_pub, &com_sec), "A3 n = {n}");
        }
    }
}
