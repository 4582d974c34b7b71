//! Equal inner products: `<x, a> = <y, b>` for committed `x`, `y` and public
//! `a`, `b`.
//!
//! The prover commits to the common value `z` once (`com_z = z·U + r_z·H`)
//! and runs two Hyrax proofs against it, `z = <x, a>` and `z = <y, b>`.

#![allow(missing_docs)]

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::{CommitmentPub as HyraxPub, CommitmentSec as HyraxSec, HyraxArgument};
use crate::misc::{self, inner_product};
use crate::pc::{GeneratorPool, U_OFFSET};
use crate::transcript::{FsLabel, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

#[derive(Clone, Copy, Debug)]
pub struct ProveInput<'a> {
    pub x: &'a [F],
    pub a: &'a [F],
    pub x_offset: i64,
    pub y: &'a [F],
    pub b: &'a [F],
    pub y_offset: i64,
    /// Common inner product.
    pub z: F,
}

impl<'a> ProveInput<'a> {
    pub fn new(
        x: &'a [F],
        a: &'a [F],
        x_offset: i64,
        y: &'a [F],
        b: &'a [F],
        y_offset: i64,
    ) -> Self {
        Self {
            x,
            a,
            x_offset,
            y,
            b,
            y_offset,
            z: inner_product(x, a),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentPub {
    pub com_x: G1,
    pub com_y: G1,
}

#[derive(Clone, Copy, Debug)]
pub struct CommitmentSec {
    pub r_x: F,
    pub r_y: F,
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyInput<'a> {
    pub a: &'a [F],
    pub x_offset: i64,
    pub b: &'a [F],
    pub y_offset: i64,
    pub com_pub: &'a CommitmentPub,
}

/// Two inner Hyrax proofs and the commitment to their shared value.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof<P: CanonicalSerialize + CanonicalDeserialize> {
    pub p1: P,
    pub p2: P,
    pub com_z: G1,
}

/// Seeds for the two sub-proofs, after binding the three commitments.
fn bind(mut seed: Seed, com_pub: &CommitmentPub, com_z: &G1) -> (Seed, Seed) {
    seed.absorb(FsLabel::EqualIp, |t| {
        t.point(&com_pub.com_x).point(&com_pub.com_y).point(com_z);
    });
    let fork = |i: u64| {
        let mut s = seed;
        s.absorb(FsLabel::EqualIp, |t| {
            t.counter(i);
        });
        s
    };
    (fork(0), fork(1))
}

pub fn commit<R: Rng>(
    pool: &GeneratorPool,
    input: &ProveInput<'_>,
    rng: &mut R,
) -> (CommitmentPub, CommitmentSec) {
    let r_x = F::rand(rng);
    let r_y = F::rand(rng);
    let com_pub = CommitmentPub {
        com_x: pool.commit(input.x_offset, input.x, r_x),
        com_y: pool.commit(input.y_offset, input.y, r_y),
    };
    (com_pub, CommitmentSec { r_x, r_y })
}

pub fn prove<H: HyraxArgument, R: Rng>(
    pool: &GeneratorPool,
    seed: Seed,
    input: &ProveInput<'_>,
    com_pub: &CommitmentPub,
    com_sec: &CommitmentSec,
    rng: &mut R,
) -> Proof<H::Proof> {
    let _span = tracing::debug_span!("equal_ip_prove", n = input.x.len(), m = input.y.len())
        .entered();
    if STRICT_CHECKS {
        assert_eq!(input.z, inner_product(input.x, input.a), "equal ip: <x, a> != z");
        assert_eq!(input.z, inner_product(input.y, input.b), "equal ip: <y, b> != z");
    }
    let r_z = F::rand(rng);
    let com_z = pool.commit_scalar(U_OFFSET, input.z, r_z);
    let (seed1, seed2) = bind(seed, com_pub, &com_z);

    let x_side = super::ProveInput {
        x: input.x,
        a: input.a,
        y: input.z,
        x_offset: input.x_offset,
        y_offset: U_OFFSET,
    };
    let y_side = super::ProveInput {
        x: input.y,
        a: input.b,
        y: input.z,
        x_offset: input.y_offset,
        y_offset: U_OFFSET,
    };
    let pub1 = HyraxPub { xi: com_pub.com_x, tau: com_z };
    let sec1 = HyraxSec { r_xi: com_sec.r_x, r_tau: r_z };
    let pub2 = HyraxPub { xi: com_pub.com_y, tau: com_z };
    let sec2 = HyraxSec { r_xi: com_sec.r_y, r_tau: r_z };

    let mut rng1 = misc::child_rng(rng);
    let mut rng2 = misc::child_rng(rng);
    let (p1, p2) = parallel::invoke(
        || H::prove(pool, seed1, &x_side, &pub1, &sec1, &mut rng1),
        || H::prove(pool, seed2, &y_side, &pub2, &sec2, &mut rng2),
    );
    Proof { p1, p2, com_z }
}

pub fn verify<H: HyraxArgument>(
    pool: &GeneratorPool,
    seed: Seed,
    input: &VerifyInput<'_>,
    proof: &Proof<H::Proof>,
) -> bool {
    let _span = tracing::debug_span!("equal_ip_verify", n = input.a.len(), m = input.b.len())
        .entered();
    let (seed1, seed2) = bind(seed, input.com_pub, &proof.com_z);
    let pub1 = HyraxPub { xi: input.com_pub.com_x, tau: proof.com_z };
    let pub2 = HyraxPub { xi: input.com_pub.com_y, tau: proof.com_z };
    let (ok1, ok2) = parallel::invoke(
        || {
            let vin = super::VerifyInput {
                a: input.a,
                com_pub: &pub1,
                x_offset: input.x_offset,
                y_offset: U_OFFSET,
            };
            H::verify(pool, seed1, &vin, &proof.p1)
        },
        || {
            let vin = super::VerifyInput {
                a: input.b,
                com_pub: &pub2,
                x_offset: input.y_offset,
                y_offset: U_OFFSET,
            };
            H::verify(pool, seed2, &vin, &proof.p2)
        },
    );
    if !(ok1 && ok2) {
        tracing::debug!(ok1, ok2, "equal ip: sub-proof rejected");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyrax::{A2, A3};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn equal_products_verify_for_both_variants() {
        let pool = crate::pc::test_pool();
        let mut rng = StdRng::seed_from_u64(500);
        let x = misc::random_vec(&mut rng, 6);
        let a = misc::random_vec(&mut rng, 6);
        let y: Vec<F> = x.iter().map(|v| *v * F::from(3u64)).collect();
        let b: Vec<F> = a.iter().map(|v| *v / F::from(3u64)).collect();
        let input = ProveInput::new(&x, &a, 0, &y, &b, 16);
        assert_eq!(input.z, inner_product(&y, &b));

        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let seed = Seed::new("eip");
        let vin = VerifyInput {
            a: &a,
            x_offset: 0,
            b: &b,
            y_offset: 16,
            com_pub: &com_pub,
        };

        let proof = prove::<A3, _>(pool, seed, &input, &com_pub, &com_sec, &mut rng);
        assert!(verify::<A3>(pool, seed, &vin, &proof));
        let proof = prove::<A2, _>(pool, seed, &input, &com_pub, &com_sec, &mut rng);
        assert!(verify::<A2>(pool, seed, &vin, &proof));

        let mut bad = proof.clone();
        bad.com_z += G1::from(pool.u());
        assert!(!verify::<A2>(pool, seed, &vin, &bad));
    }

    #[test]
    fn unequal_products_reject() {
        let pool = crate::pc::test_pool();
        let mut rng = StdRng::seed_from_u64(501);
        let x = misc::random_vec(&mut rng, 4);
        let a = misc::random_vec(&mut rng, 4);
        let y = misc::random_vec(&mut rng, 4);
        let b = misc::random_vec(&mut rng, 4);
        // z is taken from the x side, so the y side cannot open com_z.
        let input = ProveInput::new(&x, &a, 0, &y, &b, 8);
        let (com_pub, com_sec) = commit(pool, &input, &mut rng);
        let seed = Seed::new("eip-neg");

        let r_z = F::rand(&mut rng);
        let com_z = pool.commit_scalar(U_OFFSET, input.z, r_z);
        let (seed1, seed2) = bind(seed, &com_pub, &com_z);
        let pub1 = HyraxPub { xi: com_pub.com_x, tau: com_z };
        let pub2 = HyraxPub { xi: com_pub.com_y, tau: com_z };
        let forged_y = crate::hyrax::ProveInput {
            x: &y,
            a: &b,
            y: input.z,
            x_offset: 8,
            y_offset: U_OFFSET,
        };
        let p1 = A2::prove(
            pool,
            seed1,
            &crate::hyrax::ProveInput::new(&x, &a, 0, U_OFFSET),
            &pub1,
            &HyraxSec { r_xi: com_sec.r_x, r_tau: r_z },
            &mut rng,
        );
        let p2 = forge_without_checks(pool, seed2, &forged_y, &pub2, com_sec.r_y, r_z, &mut rng);
        let proof = Proof { p1, p2, com_z };
        let vin = VerifyInput {
            a: &a,
            x_offset: 0,
            b: &b,
            y_offset: 8,
            com_pub: &com_pub,
        };
        assert!(!verify::<A2>(pool, seed, &vin, &proof));
    }

    /// A2 transcript for a false statement, bypassing the prover's assertions.
    fn forge_without_checks(
        pool: &GeneratorPool,
        mut seed: Seed,
        input: &crate::hyrax::ProveInput<'_>,
        com_pub: &HyraxPub,
        r_xi: F,
        r_tau: F,
        rng: &mut StdRng,
    ) -> crate::hyrax::a2::Proof {
        use crate::hyrax::a2::{CommitmentExtPub, Proof, SubProof};
        let n = input.x.len();
        let d = misc::random_vec(rng, n);
        let (r_delta, r_beta) = (F::rand(rng), F::rand(rng));
        let ext = CommitmentExtPub {
            delta: pool.commit(input.x_offset, &d, r_delta),
            beta: pool.commit_scalar(input.y_offset, inner_product(input.a, &d), r_beta),
        };
        seed.absorb(FsLabel::HyraxA2, |t| {
            t.scalars(input.a)
                .point(&com_pub.xi)
                .point(&com_pub.tau)
                .point(&ext.delta)
                .point(&ext.beta);
        });
        let c = seed.challenge(FsLabel::HyraxA2);
        Proof {
            com_ext_pub: ext,
            sub_proof: SubProof {
                z: misc::combine(input.x, c, &d, F::from(1u64)),
                z_delta: c * r_xi + r_delta,
                z_beta: c * r_tau + r_beta,
            },
        }
    }
}
