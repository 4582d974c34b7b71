//! Crate root: public surface, core aliases, and protocol-wide invariants
//!
//! This crate implements transparent zero-knowledge arguments over Pedersen
//! vector commitments on BN254: the logarithmic inner-product argument, the
//! Hyrax linear-relation proofs, and the Groth09 Hadamard-product family,
//! made non-interactive with a BLAKE3 Fiat–Shamir transcript.
//!
//! ## Invariants
//!
//! - **Field & Curve.** The scalar field is `ark_bn254::Fr` (`F`). Commitments
//!   live in `G1` (BN254). There is no pairing and no trusted setup: every
//!   generator is hashed to the curve. We **forbid unsafe** throughout the
//!   crate.
//!
//! - **Commitments.** `Com(x, r) = r·H + Σ x[i]·G[offset + i]` over a shared,
//!   read-only [`pc::GeneratorPool`]. Offset `-1` selects the auxiliary
//!   generator `U`.
//!
//! - **Fiat–Shamir (FS).** Each protocol run threads one
//!   [`transcript::Seed`]. The prover and verifier absorb the exact same
//!   sequence of public messages, so challenges agree.
//!
//! - **Composition.** Sec43 reduces a Hadamard relation to one Sec53 batch
//!   and one Hyrax proof; Sec53 folds rows down to one Sec51 proof. The
//!   pairing of sub-protocols is fixed at compile time by a
//!   [`groth09::Policy`].
//!
//! Verification never panics on a bad proof; it returns `false` and logs the
//! failing equation at `debug` level.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// Fork-join task substrate (fixed worker pool, serial fallback).
pub mod parallel;
/// Scalar-vector and MSM helpers shared by the protocols.
pub mod misc;
/// Generator pool and Pedersen vector commitment.
pub mod pc;
/// Fiat–Shamir transcript (seed chaining, hash→field).
pub mod transcript;
/// Inner-product arguments.
pub mod bp;
/// Hyrax proofs of `y = <x, a>` for committed `x`, `y`.
pub mod hyrax;
/// Groth09 Sec51 / Sec53 / Sec43.
pub mod groth09;
/// Validated prover/verifier builders and bundle I/O.
pub mod api;

// ============================================================================
// Canonical aliases
// ============================================================================

/// Scalar field used across the crate.
pub type F = ark_bn254::Fr;

/// G1 element in projective form (arithmetic and proof elements).
pub type G1 = ark_bn254::G1Projective;

/// G1 element in affine form (pool storage and MSM bases).
pub type G1Affine = ark_bn254::G1Affine;

/// Recompute-and-compare assertions inside the provers.
///
/// On in debug builds and with the `strict-checks` feature.
pub(crate) const STRICT_CHECKS: bool = cfg!(any(debug_assertions, feature = "strict-checks"));

pub use crate::api::{HadamardBundle, HadamardProver, HadamardVerifier, Offsets};
pub use crate::groth09::{Ordinary, Policy, Succinct};
pub use crate::pc::GeneratorPool;
pub use crate::transcript::Seed;
