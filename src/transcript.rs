//! Fiat–Shamir transcript with domain separation
//!
//! The transcript is a 32-byte running [`Seed`]. Every protocol step folds
//! its public messages into the seed (`seed' = H(DST, seed, label, items)`)
//! and then derives challenges from the new seed. Prover and verifier replay
//! the exact same absorb schedule, so the challenges agree.
//!
//! ### Framing
//! - **Stable DSTs.** Every seed update is prefixed by a fixed domain
//!   separation tag and the step label ([`FsLabel`]).
//! - **Length-delimited items.** Each absorbed item carries a type tag and an
//!   explicit byte length, so no two absorb schedules share a byte encoding.
//! - **Pure challenges.** Deriving a challenge hashes the current seed with a
//!   label and counter through the BLAKE3 XOF; it never mutates the seed.
//!
//! ```
//! use groth09zk::transcript::{FsLabel, Seed};
//! use groth09zk::F;
//!
//! let mut s1 = Seed::new("example");
//! s1.absorb(FsLabel::Sec51b, |t| {
//!     t.counter(42);
//! });
//! let mut s2 = Seed::new("example");
//! s2.absorb(FsLabel::Sec51b, |t| {
//!     t.counter(42);
//! });
//! assert_eq!(s1.challenge(FsLabel::Sec51b), s2.challenge(FsLabel::Sec51b));
//! assert_ne!(s1.challenge(FsLabel::Sec51b), F::from(0u64));
//! ```

#![forbid(unsafe_code)]

use ark_ec::CurveGroup;
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use blake3::Hasher;
use rand::Rng;

use crate::{misc, F, G1};

const SEED_DST: &[u8] = b"G09ZK.seed.v1";
const ABSORB_DST: &[u8] = b"G09ZK.absorb.v1";
const CHALLENGE_DST: &[u8] = b"G09ZK.challenge.v1";

/// Canonical step labels shared by prover and verifier.
///
/// The strings are part of the transcript's stable domain separation: adding
/// variants is backward-compatible, renaming existing ones is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsLabel {
    /// IPA statement `(P, u, n)`.
    IpaStatement,
    /// IPA round messages `(L, R)` and the round challenge.
    IpaRound,
    /// IPA with public inner product, statement `(P, c, n)`.
    IpaPublic,
    /// Zero-knowledge IPA statement and extension.
    IpaHiding,
    /// Hyrax scalar product of committed scalars.
    HyraxA1,
    /// Hyrax linear variant.
    HyraxA2,
    /// Hyrax logarithmic variant, statement.
    HyraxA3,
    /// Hyrax logarithmic variant, per-round messages.
    HyraxA3Round,
    /// Hyrax logarithmic variant, final messages.
    HyraxA3Final,
    /// Hyrax batched logarithmic variant, per-round row folding.
    HyraxA4Round,
    /// Equal inner product statement.
    EqualIp,
    /// Sec51 (linear).
    Sec51b,
    /// Sec51 (succinct), statement and `com_yt`.
    Sec51c,
    /// Sec51 (succinct), mask vector.
    Sec51cMask,
    /// Sec53 per-round messages.
    Sec53Round,
    /// Sec43 statement.
    Sec43,
    /// Sec43 row combiners `k`.
    Sec43Rows,
    /// Sec43 column mask `t`.
    Sec43Cols,
}

impl FsLabel {
    /// Stable string absorbed ahead of every item of the step.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            FsLabel::IpaStatement => "ipa.statement",
            FsLabel::IpaRound => "ipa.round",
            FsLabel::IpaPublic => "ipa.public",
            FsLabel::IpaHiding => "ipa.hiding",
            FsLabel::HyraxA1 => "hyrax.a1",
            FsLabel::HyraxA2 => "hyrax.a2",
            FsLabel::HyraxA3 => "hyrax.a3",
            FsLabel::HyraxA3Round => "hyrax.a3.round",
            FsLabel::HyraxA3Final => "hyrax.a3.final",
            FsLabel::HyraxA4Round => "hyrax.a4.round",
            FsLabel::EqualIp => "equal_ip",
            FsLabel::Sec51b => "sec51b",
            FsLabel::Sec51c => "sec51c",
            FsLabel::Sec51cMask => "sec51c.mask",
            FsLabel::Sec53Round => "sec53.round",
            FsLabel::Sec43 => "sec43",
            FsLabel::Sec43Rows => "sec43.k",
            FsLabel::Sec43Cols => "sec43.t",
        }
    }
}

/// Running transcript state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, CanonicalSerialize, CanonicalDeserialize,
)]
pub struct Seed([u8; 32]);

/// Challenge together with its inverse and squares, as every halving round
/// needs all four.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundX {
    /// The challenge.
    pub x: F,
    /// `x⁻¹`
    pub inv: F,
    /// `x²`
    pub square: F,
    /// `x⁻²`
    pub square_inv: F,
}

impl Seed {
    /// Initial seed for an application domain.
    pub fn new(domain: &str) -> Self {
        let mut h = Hasher::new();
        h.update(SEED_DST);
        h.update(&(domain.len() as u64).to_be_bytes());
        h.update(domain.as_bytes());
        Seed(*h.finalize().as_bytes())
    }

    /// Resume from a previously exported seed.
    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Seed(bytes)
    }

    /// Raw seed bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Fresh uniformly random seed.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Seed(rng.gen())
    }

    /// Fold the items written by `f` into the seed.
    pub fn absorb(&mut self, label: FsLabel, f: impl FnOnce(&mut Absorber)) {
        let mut h = Hasher::new();
        h.update(ABSORB_DST);
        h.update(&self.0);
        h.update(label.as_str().as_bytes());
        let mut absorber = Absorber { hasher: h };
        f(&mut absorber);
        self.0 = *absorber.hasher.finalize().as_bytes();
    }

    /// Single challenge bound to the current seed and `label`.
    pub fn challenge(&self, label: FsLabel) -> F {
        derive(&self.0, label, "one", 0)
    }

    /// Non-zero challenge with its inverse and squares.
    ///
    /// In the negligible case of a zero output the counter is bumped and the
    /// challenge re-derived, identically on both sides.
    pub fn round_challenge(&self, label: FsLabel) -> RoundX {
        let mut ctr = 0u64;
        loop {
            let x = derive(&self.0, label, "round", ctr);
            if let Some(round) = misc::round_of(x) {
                return round;
            }
            ctr += 1;
        }
    }

    /// `count` independent challenges `c[i] = H(seed, label, i)`.
    pub fn challenges(&self, label: FsLabel, count: usize) -> Vec<F> {
        (0..count as u64)
            .map(|i| derive(&self.0, label, "many", i))
            .collect()
    }
}

fn derive(seed: &[u8; 32], label: FsLabel, kind: &str, ctr: u64) -> F {
    let mut h = Hasher::new();
    h.update(CHALLENGE_DST);
    h.update(seed);
    h.update(b":label:");
    h.update(label.as_str().as_bytes());
    h.update(b":kind:");
    h.update(kind.as_bytes());
    h.update(b":ctr:");
    h.update(&ctr.to_be_bytes());

    // XOF → 64 bytes, then reduce to field (little-endian).
    let mut buf = [0u8; 64];
    h.finalize_xof().fill(&mut buf);
    F::from_le_bytes_mod_order(&buf)
}

/// Item writer handed to [`Seed::absorb`].
pub struct Absorber {
    hasher: Hasher,
}

impl Absorber {
    fn item(&mut self, tag: &str, data: &[u8]) -> &mut Self {
        self.hasher.update(b"item:");
        self.hasher.update(tag.as_bytes());
        self.hasher.update(b":len:");
        self.hasher.update(&(data.len() as u64).to_be_bytes());
        self.hasher.update(b":data:");
        self.hasher.update(data);
        self
    }

    /// Group element, compressed affine encoding.
    pub fn point(&mut self, p: &G1) -> &mut Self {
        let mut bytes = Vec::with_capacity(32);
        p.into_affine()
            .serialize_compressed(&mut bytes)
            .expect("serialize G1");
        self.item("point", &bytes)
    }

    /// Sequence of group elements as one item: `u64(len) || Σ compressed_i`.
    pub fn points(&mut self, ps: &[G1]) -> &mut Self {
        let mut bytes = Vec::with_capacity(8 + ps.len() * 32);
        bytes.extend_from_slice(&(ps.len() as u64).to_be_bytes());
        for p in G1::normalize_batch(ps) {
            p.serialize_compressed(&mut bytes).expect("serialize G1");
        }
        self.item("points", &bytes)
    }

    /// One field element, compressed.
    pub fn scalar(&mut self, f: &F) -> &mut Self {
        let mut bytes = Vec::with_capacity(32);
        f.serialize_compressed(&mut bytes).expect("serialize field");
        self.item("scalar", &bytes)
    }

    /// Length-prefixed field elements.
    pub fn scalars(&mut self, fs: &[F]) -> &mut Self {
        let mut bytes = Vec::with_capacity(8 + fs.len() * 32);
        bytes.extend_from_slice(&(fs.len() as u64).to_be_bytes());
        for f in fs {
            f.serialize_compressed(&mut bytes).expect("serialize field");
        }
        self.item("scalars", &bytes)
    }

    /// Sizes and indices, big-endian.
    pub fn counter(&mut self, ctr: u64) -> &mut Self {
        self.item("counter", &ctr.to_be_bytes())
    }

    /// Opaque bytes.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.item("bytes", data)
    }
}

impl RoundX {
    /// `true` when the stored values are consistent with `x`.
    pub fn is_consistent(&self) -> bool {
        !self.x.is_zero()
            && self.x * self.inv == F::from(1u64)
            && self.square == self.x * self.x
            && self.square_inv == self.inv * self.inv
    }
}
