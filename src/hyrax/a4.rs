//! Hyrax batched argument: `z = Σ_i <x_i, a_i>` over `m` committed rows.
//!
//! Rows may have different lengths; every row is committed from the same
//! first generator, so zero padding to the longest row leaves the
//! commitments unchanged. Rows are folded pairwise under a challenge `e`
//! until one remains, which is handed to [`A3`]:
//!
//! ```text
//! σ₁ = Σ <x_{2i+1}, a_{2i}>      σ₂ = Σ <x_{2i}, a_{2i+1}>
//! x'_i = e·x_{2i+1} + x_{2i}       a'_i = e·a_{2i} + a_{2i+1}
//! z'   = e²·σ₁ + e·z + σ₂          cx'_i = cx_{2i} + e·cx_{2i+1}
//! ```

#![allow(missing_docs)]

use ark_ff::{UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::{a3, HyraxArgument, A3};
use crate::misc::{self, inner_product};
use crate::pc::GeneratorPool;
use crate::transcript::{FsLabel, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

/// Prover rows. Folding replaces them, so the input is owned.
#[derive(Clone, Debug)]
pub struct ProveInput {
    pub x: Vec<Vec<F>>,
    pub a: Vec<Vec<F>>,
    /// `Σ <x_i, a_i>`.
    pub z: F,
    pub x_offset: i64,
    pub z_offset: i64,
}

impl ProveInput {
    /// Build the input, deriving `z`.
    ///
    /// Panics on `m == 0` or when some `x_i` and `a_i` differ in length.
    pub fn new(x: Vec<Vec<F>>, a: Vec<Vec<F>>, x_offset: i64, z_offset: i64) -> Self {
        assert!(!x.is_empty(), "hyrax a4 needs at least one row");
        assert_eq!(x.len(), a.len(), "hyrax a4: row count mismatch");
        let z = x
            .iter()
            .zip(&a)
            .fold(F::zero(), |acc, (xi, ai)| acc + inner_product(xi, ai));
        Self {
            x,
            a,
            z,
            x_offset,
            z_offset,
        }
    }

    pub fn m(&self) -> usize {
        self.x.len()
    }

    /// Longest row.
    pub fn n(&self) -> usize {
        self.x.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Zero-pad every row to the longest one and the row count to a power
    /// of two.
    pub fn align(&mut self) {
        let n = self.n();
        for row in self.x.iter_mut().chain(self.a.iter_mut()) {
            row.resize(n, F::zero());
        }
        let m = misc::pow2_ub(self.m());
        self.x.resize(m, vec![F::zero(); n]);
        self.a.resize(m, vec![F::zero(); n]);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    /// One commitment per row.
    pub cx: Vec<G1>,
    pub cz: G1,
}

impl CommitmentPub {
    /// Pad with identity commitments up to the next power of two.
    pub fn align(&mut self) {
        self.cx.resize(misc::pow2_ub(self.cx.len()), G1::zero());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentSec {
    pub r: Vec<F>,
    pub t: F,
}

impl CommitmentSec {
    /// Pad with zero blindings up to the next power of two.
    pub fn align(&mut self) {
        self.r.resize(misc::pow2_ub(self.r.len()), F::zero());
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    /// Public rows, one per commitment, lengths as committed.
    pub a: &'a [Vec<F>],
    pub com_pub: &'a CommitmentPub,
    pub x_offset: i64,
    pub z_offset: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentExtPub {
    pub cl: Vec<G1>,
    pub cu: Vec<G1>,
}

/// Per-round cross commitments and the [`A3`] proof for the last row.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub com_ext_pub: CommitmentExtPub,
    pub proof_a3: a3::Proof,
}

impl Proof {
    /// Padded row count the proof was produced for, `None` when the round
    /// count does not fit a `usize`.
    pub fn m(&self) -> Option<usize> {
        u32::try_from(self.com_ext_pub.cl.len())
            .ok()
            .and_then(|rounds| 1usize.checked_shl(rounds))
    }
}

/// Row-wise commitments with fresh blindings.
pub fn commit<R: Rng>(
    pool: &GeneratorPool,
    input: &ProveInput,
    rng: &mut R,
) -> (CommitmentPub, CommitmentSec) {
    let r = misc::random_vec(rng, input.m());
    let t = F::rand(rng);
    let cx = parallel::map(input.m(), 1, |i| pool.commit(input.x_offset, &input.x[i], r[i]));
    let cz = pool.commit_scalar(input.z_offset, input.z, t);
    (CommitmentPub { cx, cz }, CommitmentSec { r, t })
}

fn check_commitments(
    pool: &GeneratorPool,
    input: &ProveInput,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
) {
    let z = input
        .x
        .iter()
        .zip(&input.a)
        .fold(F::zero(), |acc, (xi, ai)| acc + inner_product(xi, ai));
    assert_eq!(input.z, z, "hyrax a4: z != Σ <x_i, a_i>");
    for i in 0..input.m() {
        assert_eq!(com_pub.cx[i], pool.commit(input.x_offset, &input.x[i], com_sec.r[i]));
    }
    assert_eq!(com_pub.cz, pool.commit_scalar(input.z_offset, input.z, com_sec.t));
}

fn round_challenge(seed: &mut Seed, com_pub: &CommitmentPub, cl: &G1, cu: &G1) -> F {
    seed.absorb(FsLabel::HyraxA4Round, |t| {
        t.point(cl).point(cu).points(&com_pub.cx).point(&com_pub.cz);
    });
    seed.challenge(FsLabel::HyraxA4Round)
}

fn fold_commitments(com_pub: &CommitmentPub, cl: G1, cu: G1, e: F) -> CommitmentPub {
    let half = com_pub.cx.len() / 2;
    CommitmentPub {
        cx: (0..half)
            .map(|i| com_pub.cx[2 * i] + com_pub.cx[2 * i + 1] * e)
            .collect(),
        cz: cl * (e * e) + com_pub.cz * e + cu,
    }
}

fn fold_rows(rows: &[Vec<F>], e: F, odd_first: bool) -> Vec<Vec<F>> {
    let one = F::from(1u64);
    parallel::map(rows.len() / 2, 1, |i| {
        let (lo, hi) = (&rows[2 * i], &rows[2 * i + 1]);
        if odd_first {
            misc::combine(hi, e, lo, one)
        } else {
            misc::combine(lo, e, hi, one)
        }
    })
}

/// Prove the batched relation. Rows and commitments are aligned internally.
pub fn prove<R: Rng>(
    pool: &GeneratorPool,
    mut seed: Seed,
    mut input: ProveInput,
    mut com_pub: CommitmentPub,
    mut com_sec: CommitmentSec,
    rng: &mut R,
) -> Proof {
    let _span = tracing::debug_span!("hyrax_a4_prove", m = input.m(), n = input.n()).entered();
    assert!(input.m() > 0, "hyrax a4 needs at least one row");
    assert!(input.n() > 0, "hyrax a4 over empty rows");
    if STRICT_CHECKS {
        check_commitments(pool, &input, &com_pub, &com_sec);
    }
    input.align();
    com_pub.align();
    com_sec.align();

    let mut ext = CommitmentExtPub::default();
    while input.m() > 1 {
        let half = input.m() / 2;
        let sums = parallel::map(half, 1, |i| {
            (
                inner_product(&input.x[2 * i + 1], &input.a[2 * i]),
                inner_product(&input.x[2 * i], &input.a[2 * i + 1]),
            )
        });
        let (sigma1, sigma2) = sums
            .into_iter()
            .fold((F::zero(), F::zero()), |acc, s| (acc.0 + s.0, acc.1 + s.1));

        let tl = F::rand(rng);
        let tu = F::rand(rng);
        let cl = pool.commit_scalar(input.z_offset, sigma1, tl);
        let cu = pool.commit_scalar(input.z_offset, sigma2, tu);
        let e = round_challenge(&mut seed, &com_pub, &cl, &cu);
        let ee = e * e;

        input.x = fold_rows(&input.x, e, true);
        input.a = fold_rows(&input.a, e, false);
        input.z = sigma1 * ee + input.z * e + sigma2;

        com_pub = fold_commitments(&com_pub, cl, cu, e);
        com_sec = CommitmentSec {
            r: (0..half)
                .map(|i| com_sec.r[2 * i] + com_sec.r[2 * i + 1] * e)
                .collect(),
            t: tl * ee + com_sec.t * e + tu,
        };

        if STRICT_CHECKS {
            check_commitments(pool, &input, &com_pub, &com_sec);
        }
        ext.cl.push(cl);
        ext.cu.push(cu);
    }

    let input_a3 = super::ProveInput {
        x: &input.x[0],
        a: &input.a[0],
        y: input.z,
        x_offset: input.x_offset,
        y_offset: input.z_offset,
    };
    let pub_a3 = super::CommitmentPub {
        xi: com_pub.cx[0],
        tau: com_pub.cz,
    };
    let sec_a3 = super::CommitmentSec {
        r_xi: com_sec.r[0],
        r_tau: com_sec.t,
    };
    let proof_a3 = A3::prove(pool, seed, &input_a3, &pub_a3, &sec_a3, rng);
    Proof {
        com_ext_pub: ext,
        proof_a3,
    }
}

pub fn verify(pool: &GeneratorPool, mut seed: Seed, input: &VerifyInput<'_>, proof: &Proof) -> bool {
    let m = input.com_pub.cx.len();
    let n = input.a.iter().map(Vec::len).max().unwrap_or(0);
    let _span = tracing::debug_span!("hyrax_a4_verify", m, n).entered();
    if m == 0 || n == 0 || input.a.len() != m {
        tracing::debug!(m, n, rows = input.a.len(), "hyrax a4: malformed statement");
        return false;
    }
    let ext = &proof.com_ext_pub;
    if ext.cl.len() != ext.cu.len() || ext.cl.len() != misc::log2_ub(m) {
        tracing::debug!(
            m,
            cl = ext.cl.len(),
            cu = ext.cu.len(),
            "hyrax a4: round count does not match the row count"
        );
        return false;
    }

    let mut a: Vec<Vec<F>> = input
        .a
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.resize(n, F::zero());
            row
        })
        .collect();
    a.resize(misc::pow2_ub(m), vec![F::zero(); n]);
    let mut com_pub = input.com_pub.clone();
    com_pub.align();
    for (cl, cu) in ext.cl.iter().zip(&ext.cu) {
        let e = round_challenge(&mut seed, &com_pub, cl, cu);
        a = fold_rows(&a, e, false);
        com_pub = fold_commitments(&com_pub, *cl, *cu, e);
    }

    let pub_a3 = super::CommitmentPub {
        xi: com_pub.cx[0],
        tau: com_pub.cz,
    };
    let vin = super::VerifyInput {
        a: &a[0],
        com_pub: &pub_a3,
        x_offset: input.x_offset,
        y_offset: input.z_offset,
    };
    if !A3::verify(pool, seed, &vin, &proof.proof_a3) {
        tracing::debug!("hyrax a4: final row rejected");
        return false;
    }
    true
}
