//! Sec53: batched Hadamard inner product over `m` rows
//!
//! ```text
//! z = Σ_i <x_i, y_i ∘ t>
//! a_i = Com_gx(x_i, r_i)    b_i = Com_gy(y_i, s_i)    c = z·gz + t_z·H
//! ```
//!
//! Every round pairs rows `(2i, 2i+1)` and folds them into one under a
//! challenge `e`, after committing to the two cross sums:
//!
//! ```text
//! σ₁ = Σ <x_{2i+1}, yt_{2i}>      σ₂ = Σ <x_{2i}, yt_{2i+1}>
//! x'_i = e·x_{2i+1} + x_{2i}       y'_i = e·y_{2i} + y_{2i+1}
//! z'   = e²·σ₁ + e·z + σ₂
//! ```
//!
//! Commitments fold the same way, so the verifier follows along without the
//! witness. At `m == 1` the single remaining row is handed to a Sec51
//! argument with the running seed.

#![allow(missing_docs)]

use ark_ff::{UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::sec51::{self, Sec51Argument};
use crate::misc::{self, hadamard, inner_product};
use crate::pc::GeneratorPool;
use crate::transcript::{FsLabel, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

/// Prover rows. Folding produces new owned rows, so the input is owned.
#[derive(Clone, Debug)]
pub struct ProveInput {
    pub x: Vec<Vec<F>>,
    pub y: Vec<Vec<F>>,
    pub t: Vec<F>,
    /// `yt[i] = y[i] ∘ t`.
    pub yt: Vec<Vec<F>>,
    pub z: F,
    pub x_offset: i64,
    pub y_offset: i64,
    pub z_offset: i64,
}

impl ProveInput {
    /// Build the input, deriving `yt` and `z`.
    ///
    /// Panics on `m == 0` or ragged rows.
    pub fn new(
        x: Vec<Vec<F>>,
        y: Vec<Vec<F>>,
        t: Vec<F>,
        x_offset: i64,
        y_offset: i64,
        z_offset: i64,
    ) -> Self {
        assert!(!x.is_empty(), "sec53 needs at least one row");
        assert_eq!(x.len(), y.len(), "sec53: row count mismatch");
        let n = t.len();
        assert!(
            x.iter().chain(&y).all(|row| row.len() == n),
            "sec53: every row must have length {n}"
        );
        let yt = parallel::map(y.len(), 1, |i| hadamard(&y[i], &t));
        let z = x
            .iter()
            .zip(&yt)
            .fold(F::zero(), |acc, (xi, yti)| acc + inner_product(xi, yti));
        Self {
            x,
            y,
            t,
            yt,
            z,
            x_offset,
            y_offset,
            z_offset,
        }
    }

    pub fn m(&self) -> usize {
        self.x.len()
    }

    pub fn n(&self) -> usize {
        self.t.len()
    }

    /// Pad with zero rows up to the next power of two.
    pub fn align(&mut self) {
        let m = misc::pow2_ub(self.m());
        let zero = vec![F::zero(); self.n()];
        self.x.resize(m, zero.clone());
        self.y.resize(m, zero.clone());
        self.yt.resize(m, zero);
    }

    fn check_relation(&self) {
        let z = self
            .x
            .iter()
            .zip(&self.yt)
            .fold(F::zero(), |acc, (xi, yti)| acc + inner_product(xi, yti));
        assert_eq!(self.z, z, "sec53: z != Σ <x_i, y_i ∘ t>");
        for (y, yt) in self.y.iter().zip(&self.yt) {
            assert_eq!(yt, &hadamard(y, &self.t), "sec53: yt != y ∘ t");
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    pub a: Vec<G1>,
    pub b: Vec<G1>,
    pub c: G1,
}

impl CommitmentPub {
    /// Pad with identity commitments up to the next power of two.
    pub fn align(&mut self) {
        let m = misc::pow2_ub(self.a.len());
        self.a.resize(m, G1::zero());
        self.b.resize(m, G1::zero());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentSec {
    pub r: Vec<F>,
    pub s: Vec<F>,
    pub t: F,
}

impl CommitmentSec {
    /// Pad with zero blindings up to the next power of two.
    pub fn align(&mut self) {
        let m = misc::pow2_ub(self.r.len());
        self.r.resize(m, F::zero());
        self.s.resize(m, F::zero());
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    pub t: &'a [F],
    pub com_pub: &'a CommitmentPub,
    pub x_offset: i64,
    pub y_offset: i64,
    pub z_offset: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentExtPub {
    pub cl: Vec<G1>,
    pub cu: Vec<G1>,
}

/// Per-round cross commitments and the final single-row proof.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof<P: CanonicalSerialize + CanonicalDeserialize> {
    pub com_ext_pub: CommitmentExtPub,
    pub proof_51: P,
}

impl<P: CanonicalSerialize + CanonicalDeserialize> Proof<P> {
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
    let m = input.m();
    let r = misc::random_vec(rng, m);
    let s = misc::random_vec(rng, m);
    let t = F::rand(rng);
    let (a, b) = parallel::invoke(
        || parallel::map(m, 1, |i| pool.commit(input.x_offset, &input.x[i], r[i])),
        || parallel::map(m, 1, |i| pool.commit(input.y_offset, &input.y[i], s[i])),
    );
    let c = pool.commit_scalar(input.z_offset, input.z, t);
    (CommitmentPub { a, b, c }, CommitmentSec { r, s, t })
}

fn check_commitments(
    pool: &GeneratorPool,
    input: &ProveInput,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
) {
    input.check_relation();
    for i in 0..input.m() {
        assert_eq!(com_pub.a[i], pool.commit(input.x_offset, &input.x[i], com_sec.r[i]));
        assert_eq!(com_pub.b[i], pool.commit(input.y_offset, &input.y[i], com_sec.s[i]));
    }
    assert_eq!(com_pub.c, pool.commit_scalar(input.z_offset, input.z, com_sec.t));
}

fn round_challenge(seed: &mut Seed, com_pub: &CommitmentPub, cl: &G1, cu: &G1) -> F {
    seed.absorb(FsLabel::Sec53Round, |t| {
        t.point(cl)
            .point(cu)
            .points(&com_pub.a)
            .points(&com_pub.b)
            .point(&com_pub.c);
    });
    seed.challenge(FsLabel::Sec53Round)
}

fn fold_commitments(com_pub: &CommitmentPub, cl: G1, cu: G1, e: F) -> CommitmentPub {
    let half = com_pub.a.len() / 2;
    let a = (0..half)
        .map(|i| com_pub.a[2 * i] + com_pub.a[2 * i + 1] * e)
        .collect();
    let b = (0..half)
        .map(|i| com_pub.b[2 * i] * e + com_pub.b[2 * i + 1])
        .collect();
    CommitmentPub {
        a,
        b,
        c: cl * (e * e) + com_pub.c * e + cu,
    }
}

/// Prove the batched relation. Rows and commitments are aligned internally.
pub fn prove<S: Sec51Argument, R: Rng>(
    pool: &GeneratorPool,
    mut seed: Seed,
    mut input: ProveInput,
    mut com_pub: CommitmentPub,
    mut com_sec: CommitmentSec,
    rng: &mut R,
) -> Proof<S::Proof> {
    let _span = tracing::debug_span!("sec53_prove", m = input.m(), n = input.n(), inner = S::NAME)
        .entered();
    assert!(input.m() > 0, "sec53 needs at least one row");
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
                inner_product(&input.x[2 * i + 1], &input.yt[2 * i]),
                inner_product(&input.x[2 * i], &input.yt[2 * i + 1]),
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

        let one = F::from(1u64);
        let rows = parallel::map(half, 1, |i| {
            let x = misc::combine(&input.x[2 * i + 1], e, &input.x[2 * i], one);
            let y = misc::combine(&input.y[2 * i], e, &input.y[2 * i + 1], one);
            let yt = hadamard(&y, &input.t);
            (x, y, yt)
        });
        input.x.clear();
        input.y.clear();
        input.yt.clear();
        for (x, y, yt) in rows {
            input.x.push(x);
            input.y.push(y);
            input.yt.push(yt);
        }
        input.z = sigma1 * ee + input.z * e + sigma2;

        com_pub = fold_commitments(&com_pub, cl, cu, e);
        com_sec = CommitmentSec {
            r: (0..half)
                .map(|i| com_sec.r[2 * i] + com_sec.r[2 * i + 1] * e)
                .collect(),
            s: (0..half)
                .map(|i| com_sec.s[2 * i] * e + com_sec.s[2 * i + 1])
                .collect(),
            t: tl * ee + com_sec.t * e + tu,
        };

        if STRICT_CHECKS {
            check_commitments(pool, &input, &com_pub, &com_sec);
        }
        ext.cl.push(cl);
        ext.cu.push(cu);
    }

    let input51 = sec51::ProveInput {
        x: &input.x[0],
        y: &input.y[0],
        t: &input.t,
        yt: &input.yt[0],
        z: input.z,
        x_offset: input.x_offset,
        y_offset: input.y_offset,
        z_offset: input.z_offset,
    };
    let pub51 = sec51::CommitmentPub {
        a: com_pub.a[0],
        b: com_pub.b[0],
        c: com_pub.c,
    };
    let sec51 = sec51::CommitmentSec {
        r: com_sec.r[0],
        s: com_sec.s[0],
        t: com_sec.t,
    };
    let proof_51 = S::prove(pool, seed, &input51, &pub51, &sec51, rng);
    Proof {
        com_ext_pub: ext,
        proof_51,
    }
}

pub fn verify<S: Sec51Argument>(
    pool: &GeneratorPool,
    mut seed: Seed,
    input: &VerifyInput<'_>,
    proof: &Proof<S::Proof>,
) -> bool {
    let m = input.com_pub.a.len();
    let _span = tracing::debug_span!("sec53_verify", m, n = input.t.len(), inner = S::NAME)
        .entered();
    let ext = &proof.com_ext_pub;
    if m == 0 || input.com_pub.b.len() != m {
        tracing::debug!(m, b = input.com_pub.b.len(), "sec53: malformed commitments");
        return false;
    }
    if input.t.is_empty() {
        tracing::debug!(m, "sec53: empty column mask");
        return false;
    }
    if ext.cl.len() != ext.cu.len() || ext.cl.len() != misc::log2_ub(m) {
        tracing::debug!(
            m,
            cl = ext.cl.len(),
            cu = ext.cu.len(),
            "sec53: round count does not match the row count"
        );
        return false;
    }

    let mut com_pub = input.com_pub.clone();
    com_pub.align();
    for (cl, cu) in ext.cl.iter().zip(&ext.cu) {
        let e = round_challenge(&mut seed, &com_pub, cl, cu);
        com_pub = fold_commitments(&com_pub, *cl, *cu, e);
    }

    let pub51 = sec51::CommitmentPub {
        a: com_pub.a[0],
        b: com_pub.b[0],
        c: com_pub.c,
    };
    let vin = sec51::VerifyInput {
        t: input.t,
        com_pub: &pub51,
        x_offset: input.x_offset,
        y_offset: input.y_offset,
        z_offset: input.z_offset,
    };
    if !S::verify(pool, seed, &vin, &proof.proof_51) {
        tracing::debug!(inner = S::NAME, "sec53: final row rejected");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groth09::{Sec51b, Sec51c};
    use crate::pc::{test_pool, U_OFFSET};
    use ark_ff::One;
    use rand::{rngs::StdRng, SeedableRng};

    fn random_input(m: usize, n: usize, rng: &mut StdRng) -> ProveInput {
        let x = (0..m).map(|_| misc::random_vec(rng, n)).collect();
        let y = (0..m).map(|_| misc::random_vec(rng, n)).collect();
        let t = misc::random_vec(rng, n);
        ProveInput::new(x, y, t, 0, 0, U_OFFSET)
    }

    fn roundtrip<S: Sec51Argument>(m: usize, n: usize) -> bool {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64((m * 100 + n) as u64);
        let input = random_input(m, n, &mut rng);
        let t = input.t.clone();
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let seed = Seed::new("sec53");
        let proof = prove::<S, _>(pool, seed, input, com_pub.clone(), com_sec, &mut rng);
        assert_eq!(proof.com_ext_pub.cl.len(), misc::log2_ub(m));
        let vin = VerifyInput {
            t: &t,
            com_pub: &com_pub,
            x_offset: 0,
            y_offset: 0,
            z_offset: U_OFFSET,
        };
        verify::<S>(pool, seed, &vin, &proof)
    }

    #[test]
    fn non_power_of_two_rows_verify() {
        for m in [1usize, 2, 3, 5, 8] {
            assert!(roundtrip::<Sec51b>(m, 4), "sec51b m = {m}");
        }
        assert!(roundtrip::<Sec51c>(3, 5));
        assert!(roundtrip::<Sec51c>(4, 2));
    }

    #[test]
    fn align_pads_rows_and_commitments() {
        let mut rng = StdRng::seed_from_u64(530);
        let mut input = random_input(3, 2, &mut rng);
        let z = input.z;
        input.align();
        assert_eq!(input.m(), 4);
        assert_eq!(input.x[3], vec![F::zero(); 2]);
        assert_eq!(input.z, z);

        let (mut com_pub, mut com_sec) = commit(test_pool(), &random_input(5, 2, &mut rng), &mut rng);
        com_pub.align();
        com_sec.align();
        assert_eq!(com_pub.a.len(), 8);
        assert_eq!(com_pub.b[7], G1::zero());
        assert_eq!(com_sec.r.len(), 8);
    }

    #[test]
    fn tampered_rounds_reject() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(531);
        let input = random_input(4, 3, &mut rng);
        let t = input.t.clone();
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let seed = Seed::new("sec53-neg");
        let proof = prove::<Sec51b, _>(pool, seed, input, com_pub.clone(), com_sec, &mut rng);
        let vin = VerifyInput {
            t: &t,
            com_pub: &com_pub,
            x_offset: 0,
            y_offset: 0,
            z_offset: U_OFFSET,
        };
        assert!(verify::<Sec51b>(pool, seed, &vin, &proof));

        let mut bad = proof.clone();
        bad.com_ext_pub.cl.swap(0, 1);
        assert!(!verify::<Sec51b>(pool, seed, &vin, &bad));

        let mut bad = proof.clone();
        bad.com_ext_pub.cu.pop();
        assert!(!verify::<Sec51b>(pool, seed, &vin, &bad));

        let mut bad = proof.clone();
        bad.proof_51.sub_proof.tz += F::one();
        assert!(!verify::<Sec51b>(pool, seed, &vin, &bad));

        let mut wrong = com_pub.clone();
        wrong.a[2] = wrong.a[1];
        assert!(!verify::<Sec51b>(pool, seed, &VerifyInput { com_pub: &wrong, ..vin }, &proof));

        let mut fewer = com_pub.clone();
        fewer.a.truncate(2);
        fewer.b.truncate(2);
        assert!(!verify::<Sec51b>(pool, seed, &VerifyInput { com_pub: &fewer, ..vin }, &proof));
    }

    #[test]
    fn proof_serialization_roundtrip() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(532);
        let input = random_input(2, 2, &mut rng);
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let proof = prove::<Sec51b, _>(pool, Seed::new("ser"), input, com_pub, com_sec, &mut rng);

        let mut bytes = Vec::new();
        proof.serialize_compressed(&mut bytes).unwrap();
        let back = Proof::<crate::groth09::sec51b::Proof>::deserialize_compressed(&bytes[..]).unwrap();
        assert_eq!(back, proof);
    }

    #[test]
    fn oversized_round_vectors_reject() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(533);
        let input = random_input(1, 3, &mut rng);
        let t = input.t.clone();
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let seed = Seed::new("sec53-rounds");
        let proof = prove::<Sec51b, _>(pool, seed, input, com_pub.clone(), com_sec, &mut rng);
        let vin = VerifyInput {
            t: &t,
            com_pub: &com_pub,
            x_offset: 0,
            y_offset: 0,
            z_offset: U_OFFSET,
        };
        assert!(verify::<Sec51b>(pool, seed, &vin, &proof));
        assert_eq!(proof.m(), Some(1));

        let mut bad = proof.clone();
        bad.com_ext_pub.cl = vec![G1::zero(); 64];
        bad.com_ext_pub.cu = vec![G1::zero(); 64];
        assert_eq!(bad.m(), None);
        assert!(!verify::<Sec51b>(pool, seed, &vin, &bad));

        bad.com_ext_pub.cl.truncate(63);
        bad.com_ext_pub.cu.truncate(63);
        assert!(!verify::<Sec51b>(pool, seed, &vin, &bad));
    }

    #[test]
    fn empty_column_mask_rejects() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(534);
        let input = random_input(2, 2, &mut rng);
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let seed = Seed::new("sec53-empty");
        let b = prove::<Sec51b, _>(pool, seed, input.clone(), com_pub.clone(), com_sec.clone(), &mut rng);
        let c = prove::<Sec51c, _>(pool, seed, input, com_pub.clone(), com_sec, &mut rng);
        let vin = VerifyInput {
            t: &[],
            com_pub: &com_pub,
            x_offset: 0,
            y_offset: 0,
            z_offset: U_OFFSET,
        };
        assert!(!verify::<Sec51b>(pool, seed, &vin, &b));
        assert!(!verify::<Sec51c>(pool, seed, &vin, &c));
    }

    #[test]
    #[should_panic]
    fn zero_rows_panic() {
        ProveInput::new(Vec::new(), Vec::new(), vec![F::one()], 0, 0, U_OFFSET);
    }
}
