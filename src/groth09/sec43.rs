//! Sec43: row-wise Hadamard product `Z = X ∘ Y` over an `m × n` matrix
//!
//! ```text
//! a_i = Com_gx(x_i, r_i)    b_i = Com_gy(y_i, s_i)    c_i = Com_gz(z_i, t_i)
//! ```
//!
//! After binding all commitments the verifier's random row weights `k` and
//! column mask `t` collapse the `m·n` product constraints into one scalar
//! `z53 = Σ_i <k_i·x_i, y_i ∘ t>`, committed as `c53 = z53·U + t53·H`. Two
//! sub-proofs then run in parallel on the same seed:
//!
//! - Sec53 over rows `(k_i·x_i, y_i)` proves `c53` opens to that sum;
//! - Hyrax over `zk = Σ_i k_i·z_i` (committed in `Σ_i k_i·c_i`) proves
//!   `<zk, t> = z53`.
//!
//! Together they give `Σ_i k_i <x_i ∘ y_i − z_i, t> = 0` for random `k`, `t`.

#![allow(missing_docs)]

use ark_ff::{UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::policy::{Policy, Sec43Proof};
use super::sec53;
use crate::hyrax::{self, HyraxArgument};
use crate::misc::{self, hadamard, inner_product};
use crate::pc::{GeneratorPool, U_OFFSET};
use crate::transcript::{FsLabel, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

/// Rows of `X`, `Y` and `Z = X ∘ Y`.
#[derive(Clone, Debug)]
pub struct ProveInput {
    pub x: Vec<Vec<F>>,
    pub y: Vec<Vec<F>>,
    pub z: Vec<Vec<F>>,
    pub x_offset: i64,
    pub y_offset: i64,
    pub z_offset: i64,
}

impl ProveInput {
    /// Build the input, deriving `z`.
    ///
    /// Panics on `m == 0`, `n == 0` or ragged rows.
    pub fn new(x: Vec<Vec<F>>, y: Vec<Vec<F>>, x_offset: i64, y_offset: i64, z_offset: i64) -> Self {
        assert!(!x.is_empty(), "sec43 needs at least one row");
        assert_eq!(x.len(), y.len(), "sec43: row count mismatch");
        let n = x[0].len();
        assert!(n > 0, "sec43 needs non-empty rows");
        assert!(
            x.iter().chain(&y).all(|row| row.len() == n),
            "sec43: every row must have length {n}"
        );
        let z = parallel::map(x.len(), 1, |i| hadamard(&x[i], &y[i]));
        Self {
            x,
            y,
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
        self.x.first().map_or(0, Vec::len)
    }

    /// Pad with zero rows up to the next power of two.
    pub fn align(&mut self) {
        let m = misc::pow2_ub(self.m());
        let zero = vec![F::zero(); self.n()];
        self.x.resize(m, zero.clone());
        self.y.resize(m, zero.clone());
        self.z.resize(m, zero);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    pub a: Vec<G1>,
    pub b: Vec<G1>,
    pub c: Vec<G1>,
}

impl CommitmentPub {
    pub fn m(&self) -> usize {
        self.a.len()
    }

    /// Pad with identity commitments up to the next power of two.
    pub fn align(&mut self) {
        let m = misc::pow2_ub(self.a.len());
        self.a.resize(m, G1::zero());
        self.b.resize(m, G1::zero());
        self.c.resize(m, G1::zero());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentSec {
    pub r: Vec<F>,
    pub s: Vec<F>,
    pub t: Vec<F>,
}

impl CommitmentSec {
    pub fn align(&mut self) {
        let m = misc::pow2_ub(self.r.len());
        self.r.resize(m, F::zero());
        self.s.resize(m, F::zero());
        self.t.resize(m, F::zero());
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    pub com_pub: &'a CommitmentPub,
    /// Row length.
    pub n: usize,
    pub x_offset: i64,
    pub y_offset: i64,
    pub z_offset: i64,
}

/// Sec53 proof over the combined rows plus the Hyrax proof over `zk`.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof<P53, PA>
where
    P53: CanonicalSerialize + CanonicalDeserialize,
    PA: CanonicalSerialize + CanonicalDeserialize,
{
    /// `c53 = z53·U + t53·H`.
    pub c: G1,
    pub proof_53: P53,
    pub proof_a: PA,
}

/// Row-wise commitments to `X`, `Y`, `Z` with fresh blindings.
pub fn commit<R: Rng>(
    pool: &GeneratorPool,
    input: &ProveInput,
    rng: &mut R,
) -> (CommitmentPub, CommitmentSec) {
    let m = input.m();
    let r = misc::random_vec(rng, m);
    let s = misc::random_vec(rng, m);
    let t = misc::random_vec(rng, m);
    let (a, b, c) = parallel::invoke3(
        || parallel::map(m, 1, |i| pool.commit(input.x_offset, &input.x[i], r[i])),
        || parallel::map(m, 1, |i| pool.commit(input.y_offset, &input.y[i], s[i])),
        || parallel::map(m, 1, |i| pool.commit(input.z_offset, &input.z[i], t[i])),
    );
    (CommitmentPub { a, b, c }, CommitmentSec { r, s, t })
}

/// Row weights `k` and column mask `t` after binding the statement.
fn bind(seed: &mut Seed, com_pub: &CommitmentPub, n: usize) -> (Vec<F>, Vec<F>) {
    let m = com_pub.m();
    seed.absorb(FsLabel::Sec43, |t| {
        t.points(&com_pub.a)
            .points(&com_pub.b)
            .points(&com_pub.c)
            .counter(m as u64)
            .counter(n as u64);
    });
    (
        seed.challenges(FsLabel::Sec43Rows, m),
        seed.challenges(FsLabel::Sec43Cols, n),
    )
}

pub fn prove<P: Policy, R: Rng>(
    pool: &GeneratorPool,
    mut seed: Seed,
    mut input: ProveInput,
    mut com_pub: CommitmentPub,
    mut com_sec: CommitmentSec,
    rng: &mut R,
) -> Sec43Proof<P> {
    let (m, n) = (input.m(), input.n());
    let _span = tracing::debug_span!("sec43_prove", m, n, policy = P::NAME).entered();
    assert!(m > 0 && n > 0, "sec43 over an empty matrix");
    if STRICT_CHECKS {
        for i in 0..m {
            assert_eq!(input.z[i], hadamard(&input.x[i], &input.y[i]), "sec43: z != x ∘ y");
            assert_eq!(com_pub.a[i], pool.commit(input.x_offset, &input.x[i], com_sec.r[i]));
            assert_eq!(com_pub.b[i], pool.commit(input.y_offset, &input.y[i], com_sec.s[i]));
            assert_eq!(com_pub.c[i], pool.commit(input.z_offset, &input.z[i], com_sec.t[i]));
        }
    }
    input.align();
    com_pub.align();
    com_sec.align();
    let m = input.m();

    let (k, t) = bind(&mut seed, &com_pub, n);

    // Sec53 instance over rows (k_i·x_i, y_i).
    let kx: Vec<Vec<F>> = parallel::map(m, 1, |i| misc::scale(&input.x[i], k[i]));
    let input53 = sec53::ProveInput::new(
        kx,
        std::mem::take(&mut input.y),
        t.clone(),
        input.x_offset,
        input.y_offset,
        U_OFFSET,
    );
    let z53 = input53.z;
    let t53 = F::rand(rng);
    let c53 = pool.commit_scalar(U_OFFSET, z53, t53);
    let pub53 = sec53::CommitmentPub {
        a: (0..m).map(|i| com_pub.a[i] * k[i]).collect(),
        b: std::mem::take(&mut com_pub.b),
        c: c53,
    };
    let com_sec53 = sec53::CommitmentSec {
        r: (0..m).map(|i| com_sec.r[i] * k[i]).collect(),
        s: std::mem::take(&mut com_sec.s),
        t: t53,
    };

    // Hyrax instance over zk = Σ_i k_i·z_i.
    let mut zk = vec![F::zero(); n];
    parallel::for_each(&mut zk, parallel::FIELD_GRAIN, |j, slot| {
        *slot = (0..m).fold(F::zero(), |acc, i| acc + input.z[i][j] * k[i]);
    });
    if STRICT_CHECKS {
        assert_eq!(inner_product(&zk, &t), z53, "sec43: <zk, t> != z53");
    }
    let pub_a = hyrax::CommitmentPub {
        xi: misc::msm_proj(&com_pub.c, &k),
        tau: c53,
    };
    let sec_a = hyrax::CommitmentSec {
        r_xi: inner_product(&com_sec.t, &k),
        r_tau: t53,
    };
    let input_a = hyrax::ProveInput {
        x: &zk,
        a: &t,
        y: z53,
        x_offset: input.z_offset,
        y_offset: U_OFFSET,
    };

    let mut rng53 = misc::child_rng(rng);
    let mut rng_a = misc::child_rng(rng);
    let (proof_53, proof_a) = parallel::invoke(
        || sec53::prove::<P::Sec51, _>(pool, seed, input53, pub53, com_sec53, &mut rng53),
        || P::HyraxA::prove(pool, seed, &input_a, &pub_a, &sec_a, &mut rng_a),
    );
    Proof {
        c: c53,
        proof_53,
        proof_a,
    }
}

pub fn verify<P: Policy>(
    pool: &GeneratorPool,
    mut seed: Seed,
    input: &VerifyInput<'_>,
    proof: &Sec43Proof<P>,
) -> bool {
    let m = input.com_pub.m();
    let n = input.n;
    let _span = tracing::debug_span!("sec43_verify", m, n, policy = P::NAME).entered();
    if m == 0 || n == 0 || input.com_pub.b.len() != m || input.com_pub.c.len() != m {
        tracing::debug!(m, n, "sec43: malformed commitments");
        return false;
    }
    let mut com_pub = input.com_pub.clone();
    com_pub.align();
    let m = com_pub.m();
    let (k, t) = bind(&mut seed, &com_pub, n);

    let pub53 = sec53::CommitmentPub {
        a: (0..m).map(|i| com_pub.a[i] * k[i]).collect(),
        b: com_pub.b.clone(),
        c: proof.c,
    };
    let pub_a = hyrax::CommitmentPub {
        xi: misc::msm_proj(&com_pub.c, &k),
        tau: proof.c,
    };

    let (ok53, ok_a) = parallel::invoke(
        || {
            let vin = sec53::VerifyInput {
                t: &t,
                com_pub: &pub53,
                x_offset: input.x_offset,
                y_offset: input.y_offset,
                z_offset: U_OFFSET,
            };
            sec53::verify::<P::Sec51>(pool, seed, &vin, &proof.proof_53)
        },
        || {
            let vin = hyrax::VerifyInput {
                a: &t,
                com_pub: &pub_a,
                x_offset: input.z_offset,
                y_offset: U_OFFSET,
            };
            P::HyraxA::verify(pool, seed, &vin, &proof.proof_a)
        },
    );
    if !(ok53 && ok_a) {
        tracing::debug!(ok53, ok_a, "sec43: sub-proof rejected");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groth09::{Ordinary, Succinct};
    use ark_ff::One;
    use rand::{rngs::StdRng, SeedableRng};

    struct Case {
        input: ProveInput,
        com_pub: CommitmentPub,
        com_sec: CommitmentSec,
    }

    fn case(m: usize, n: usize, seed: u64) -> Case {
        let pool = crate::pc::test_pool();
        let mut rng = StdRng::seed_from_u64(seed);
        let x = (0..m).map(|_| misc::random_vec(&mut rng, n)).collect();
        let y = (0..m).map(|_| misc::random_vec(&mut rng, n)).collect();
        let input = ProveInput::new(x, y, 0, 0, 0);
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        Case {
            input,
            com_pub,
            com_sec,
        }
    }

    fn verify_input(c: &Case) -> VerifyInput<'_> {
        VerifyInput {
            com_pub: &c.com_pub,
            n: c.input.n(),
            x_offset: 0,
            y_offset: 0,
            z_offset: 0,
        }
    }

    fn prove_case<P: Policy>(c: &Case, rng_seed: u64) -> Sec43Proof<P> {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        prove::<P, _>(
            crate::pc::test_pool(),
            Seed::new("sec43"),
            c.input.clone(),
            c.com_pub.clone(),
            c.com_sec.clone(),
            &mut rng,
        )
    }

    #[test]
    fn both_policies_verify_the_same_commitments() {
        let pool = crate::pc::test_pool();
        let c = case(3, 5, 430);
        let seed = Seed::new("sec43");

        let ordinary = prove_case::<Ordinary>(&c, 1);
        assert!(verify::<Ordinary>(pool, seed, &verify_input(&c), &ordinary));

        let succinct = prove_case::<Succinct>(&c, 2);
        assert!(verify::<Succinct>(pool, seed, &verify_input(&c), &succinct));
    }

    #[test]
    fn padded_row_counts_verify() {
        let pool = crate::pc::test_pool();
        for (m, n) in [(1usize, 1usize), (2, 3), (5, 2), (7, 4)] {
            let c = case(m, n, 431 + m as u64);
            let proof = prove_case::<Ordinary>(&c, 3);
            assert_eq!(proof.proof_53.com_ext_pub.cl.len(), misc::log2_ub(m));
            assert!(
                verify::<Ordinary>(pool, Seed::new("sec43"), &verify_input(&c), &proof),
                "m = {m}, n = {n}"
            );
        }
    }

    #[test]
    fn wrong_product_commitment_rejects() {
        let pool = crate::pc::test_pool();
        let c = case(4, 3, 440);
        let seed = Seed::new("sec43");
        let proof = prove_case::<Succinct>(&c, 4);

        // Commit to a z row that is not x ∘ y.
        let mut forged = c.com_pub.clone();
        forged.c[1] += G1::from(pool.g(0));
        let vin = VerifyInput {
            com_pub: &forged,
            ..verify_input(&c)
        };
        assert!(!verify::<Succinct>(pool, seed, &vin, &proof));

        let mut bad = proof.clone();
        bad.c += G1::from(pool.u());
        assert!(!verify::<Succinct>(pool, seed, &verify_input(&c), &bad));

        let mut bad = proof.clone();
        bad.proof_a.z1 += F::one();
        assert!(!verify::<Succinct>(pool, seed, &verify_input(&c), &bad));

        let vin = VerifyInput {
            n: 4,
            ..verify_input(&c)
        };
        assert!(!verify::<Succinct>(pool, seed, &vin, &proof));
    }

    #[test]
    fn proving_is_deterministic_and_serializable() {
        let c = case(2, 4, 450);
        let proof = prove_case::<Ordinary>(&c, 9);
        assert_eq!(proof, prove_case::<Ordinary>(&c, 9));

        let mut bytes = Vec::new();
        proof.serialize_compressed(&mut bytes).unwrap();
        let back = Sec43Proof::<Ordinary>::deserialize_compressed(&bytes[..]).unwrap();
        assert_eq!(back, proof);
    }
}
