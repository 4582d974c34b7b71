//! Compile-time pairing of the Hyrax and Sec51 arguments used by Sec43.

use super::sec43;
use super::sec51::Sec51Argument;
use super::sec53;
use super::{Sec51b, Sec51c};
use crate::hyrax::{HyraxArgument, A2, A3};

/// Which sub-arguments a Sec43 proof is built from.
///
/// Prover and verifier must agree on the policy; it is never chosen at
/// runtime inside one prove/verify pair.
pub trait Policy: Send + Sync + 'static {
    /// Proves the column combination `zk` in Sec43.
    type HyraxA: HyraxArgument;
    /// Closes the Sec53 folding.
    type Sec51: Sec51Argument;

    /// Name used in logs and reports.
    const NAME: &'static str;
    /// Tag written into proof bundles.
    const TAG: u8;
    /// The last `n` pool generators are taken by the Sec51 argument and must
    /// not overlap the row generators.
    const RESERVED_TAIL: bool;
}

/// Linear-size proofs, cheapest to produce and check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ordinary;

/// Logarithmic-size proofs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Succinct;

impl Policy for Ordinary {
    type HyraxA = A2;
    type Sec51 = Sec51b;

    const NAME: &'static str = "ordinary";
    const TAG: u8 = 0;
    const RESERVED_TAIL: bool = false;
}

impl Policy for Succinct {
    type HyraxA = A3;
    type Sec51 = Sec51c;

    const NAME: &'static str = "succinct";
    const TAG: u8 = 1;
    const RESERVED_TAIL: bool = true;
}

/// Sec51 proof under policy `P`.
pub type Sec51Proof<P> = <<P as Policy>::Sec51 as Sec51Argument>::Proof;

/// Hyrax proof under policy `P`.
pub type HyraxProof<P> = <<P as Policy>::HyraxA as HyraxArgument>::Proof;

/// Sec53 proof under policy `P`.
pub type Sec53Proof<P> = sec53::Proof<Sec51Proof<P>>;

/// Sec43 proof under policy `P`.
pub type Sec43Proof<P> = sec43::Proof<Sec53Proof<P>, HyraxProof<P>>;
