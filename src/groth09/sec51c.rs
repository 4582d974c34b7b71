//! Sec51, succinct variant: proof size logarithmic in `n`.
//!
//! The prover commits to `yt = y ∘ t` under the last `n` generators of the
//! pool (`gyt`, which must not overlap `gy`) and then proves two things in
//! parallel:
//!
//! - `com_yt` really holds `y ∘ t`: for a random public `e`,
//!   `<yt, e> == <y, e ∘ t>` ([`equal_ip`] over [`A3`]);
//! - `z = <x, yt>`: a hiding inner-product argument over
//!   `P = a + com_yt` and `Q = c` ([`p31`]).

#![allow(missing_docs)]

use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;

use super::sec51::{check_commitments, CommitmentPub, CommitmentSec, ProveInput, Sec51Argument, VerifyInput};
use crate::bp::p31;
use crate::hyrax::{equal_ip, A3};
use crate::misc::{self, hadamard};
use crate::pc::GeneratorPool;
use crate::transcript::{FsLabel, Seed};
use crate::{parallel, F, G1, STRICT_CHECKS};

/// Marker for the succinct Sec51 argument.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sec51c;

/// `com_yt` with its equality and inner-product proofs.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub com_yt: G1,
    pub proof_eip: equal_ip::Proof<crate::hyrax::a3::Proof>,
    pub proof_bp: p31::Proof,
}

/// Offset of `gyt`, or `None` when the pool is too small.
fn gyt_offset(pool: &GeneratorPool, n: usize) -> Option<i64> {
    pool.size().checked_sub(n).map(|o| o as i64)
}

fn bind_statement(seed: &mut Seed, com_pub: &CommitmentPub, t: &[F]) {
    seed.absorb(FsLabel::Sec51c, |s| {
        s.point(&com_pub.a)
            .point(&com_pub.b)
            .point(&com_pub.c)
            .scalars(t);
    });
}

fn bind_com_yt(seed: &mut Seed, com_yt: &G1) {
    seed.absorb(FsLabel::Sec51c, |s| {
        s.point(com_yt);
    });
}

impl Sec51Argument for Sec51c {
    type Proof = Proof;

    const NAME: &'static str = "sec51c";

    fn prove<R: Rng>(
        pool: &GeneratorPool,
        mut seed: Seed,
        input: &ProveInput<'_>,
        com_pub: &CommitmentPub,
        com_sec: &CommitmentSec,
        rng: &mut R,
    ) -> Proof {
        let n = input.n();
        let _span = tracing::debug_span!("sec51c_prove", n).entered();
        if STRICT_CHECKS {
            check_commitments(pool, input, com_pub, com_sec);
        }
        let Some(gyt) = gyt_offset(pool, n) else {
            panic!("generator pool of size {} cannot hold gyt for n = {n}", pool.size());
        };

        bind_statement(&mut seed, com_pub, input.t);
        let r_yt = F::rand(rng);
        let com_yt = pool.commit(gyt, input.yt, r_yt);
        bind_com_yt(&mut seed, &com_yt);
        let e = seed.challenges(FsLabel::Sec51cMask, n);
        let et = hadamard(&e, input.t);

        let eip_input = equal_ip::ProveInput::new(input.yt, &e, gyt, input.y, &et, input.y_offset);
        let eip_pub = equal_ip::CommitmentPub {
            com_x: com_yt,
            com_y: com_pub.b,
        };
        let eip_sec = equal_ip::CommitmentSec {
            r_x: r_yt,
            r_y: com_sec.s,
        };

        let bp_input = p31::ProveInput {
            g1: pool.bases(input.x_offset, n),
            g2: pool.bases(gyt, n),
            h: pool.h(),
            u: pool.g(input.z_offset),
            a: input.x,
            b: input.yt,
            c: input.z,
        };
        let bp_pub = p31::CommitmentPub {
            p: com_pub.a + com_yt,
            q: com_pub.c,
        };
        let bp_sec = p31::CommitmentSec {
            alpha: com_sec.r + r_yt,
            beta: com_sec.t,
        };

        let mut rng_eip = misc::child_rng(rng);
        let mut rng_bp = misc::child_rng(rng);
        let (proof_eip, proof_bp) = parallel::invoke(
            || equal_ip::prove::<A3, _>(pool, seed, &eip_input, &eip_pub, &eip_sec, &mut rng_eip),
            || p31::prove(seed, &bp_input, &bp_pub, &bp_sec, &mut rng_bp),
        );
        Proof {
            com_yt,
            proof_eip,
            proof_bp,
        }
    }

    fn verify(pool: &GeneratorPool, mut seed: Seed, input: &VerifyInput<'_>, proof: &Proof) -> bool {
        let n = input.t.len();
        let _span = tracing::debug_span!("sec51c_verify", n).entered();
        if n == 0 {
            tracing::debug!("sec51c: empty column mask");
            return false;
        }
        let Some(gyt) = gyt_offset(pool, n) else {
            tracing::debug!(n, size = pool.size(), "sec51c: pool too small");
            return false;
        };
        let com_pub = input.com_pub;
        bind_statement(&mut seed, com_pub, input.t);
        bind_com_yt(&mut seed, &proof.com_yt);
        let e = seed.challenges(FsLabel::Sec51cMask, n);
        let et = hadamard(&e, input.t);

        let eip_pub = equal_ip::CommitmentPub {
            com_x: proof.com_yt,
            com_y: com_pub.b,
        };
        let bp_pub = p31::CommitmentPub {
            p: com_pub.a + proof.com_yt,
            q: com_pub.c,
        };
        let (ok_eip, ok_bp) = parallel::invoke(
            || {
                let vin = equal_ip::VerifyInput {
                    a: &e,
                    x_offset: gyt,
                    b: &et,
                    y_offset: input.y_offset,
                    com_pub: &eip_pub,
                };
                equal_ip::verify::<A3>(pool, seed, &vin, &proof.proof_eip)
            },
            || {
                let vin = p31::VerifyInput {
                    g1: pool.bases(input.x_offset, n),
                    g2: pool.bases(gyt, n),
                    h: pool.h(),
                    u: pool.g(input.z_offset),
                    com_pub: &bp_pub,
                };
                p31::verify(seed, &vin, &proof.proof_bp)
            },
        );
        if !(ok_eip && ok_bp) {
            tracing::debug!(ok_eip, ok_bp, "sec51c: sub-proof rejected");
            return false;
        }
        true
    }
}
