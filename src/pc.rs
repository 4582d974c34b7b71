//! Generator pool and Pedersen vector commitment on BN254
//!
//! A [`GeneratorPool`] holds the blinding generator `H`, the auxiliary
//! generator `U` and `N` indexed commitment generators `G[0..N)`. All of them
//! are derived by hashing to the curve, so nobody knows a discrete-log
//! relation between any two of them and there is no trusted setup.
//!
//! # Offset addressing
//! Commitments pick their generators by an `i64` offset into `G`. The offset
//! [`U_OFFSET`] (`-1`) selects `U` instead, for single-scalar commitments such
//! as `c = U·z + H·t`.
//!
//! ```text
//! Com(x, r) = r·H + Σ_i x[i]·G[offset + i]
//! ```
//!
//! # Lifetime
//! The pool is built once ([`GeneratorPool::new`] or [`GeneratorPool::load`])
//! and is read-only afterwards. Library code takes it by reference; the
//! command-line drivers may [`install`] one process-wide instance.
//!
//! # File format
//! ```text
//! b"G09POOL\0" || u16 version (LE) || compressed (H, U, Vec<G>)
//! ```

#![forbid(unsafe_code)]

use std::path::Path;
use std::sync::OnceLock;

use ark_bn254::Fq;
use ark_ec::AffineRepr;
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use blake3::Hasher;

use crate::{misc, parallel, G1Affine, F, G1};

/// Offset that selects the auxiliary generator `U`.
pub const U_OFFSET: i64 = -1;

const H2C_DST: &[u8] = b"G09ZK.h2c.v1";
const POOL_MAGIC: &[u8; 8] = b"G09POOL\0";
const POOL_VERSION: u16 = 1;

/// Index fed to the hash for `H`.
const H_INDEX: u64 = u64::MAX;
/// Index fed to the hash for `U`.
const U_INDEX: u64 = u64::MAX - 1;

/// Errors from building, persisting or installing a pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// File I/O error (file not found, permissions, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed pool bytes
    #[error("deserialization error: {0}")]
    Deserialize(String),

    /// Pool failed structural validation
    #[error("pool validation failed: {0}")]
    Invalid(String),

    /// A process-wide pool is already installed
    #[error("a generator pool is already installed")]
    AlreadyInstalled,
}

/// Hash `(domain, msg)` to a point of G1 by try-and-increment on `x`.
///
/// BN254 G1 has cofactor 1, so any curve point found lies in the prime-order
/// subgroup.
pub fn hash_to_g1(domain: &[u8], msg: &[u8]) -> G1Affine {
    let mut ctr = 0u64;
    loop {
        let mut h = Hasher::new();
        h.update(H2C_DST);
        h.update(&(domain.len() as u64).to_be_bytes());
        h.update(domain);
        h.update(&(msg.len() as u64).to_be_bytes());
        h.update(msg);
        h.update(b":ctr:");
        h.update(&ctr.to_be_bytes());

        let mut buf = [0u8; 64];
        h.finalize_xof().fill(&mut buf);
        let x = Fq::from_le_bytes_mod_order(&buf[..48]);
        let greatest = buf[63] & 1 == 1;
        if let Some(p) = G1Affine::get_point_from_x_unchecked(x, greatest) {
            if !p.is_zero() {
                return p;
            }
        }
        ctr += 1;
    }
}

fn indexed_generator(index: u64) -> G1Affine {
    hash_to_g1(b"pool", &index.to_be_bytes())
}

/// Read-only set of commitment generators.
#[derive(Debug)]
pub struct GeneratorPool {
    h: G1Affine,
    u: G1Affine,
    g: Vec<G1Affine>,
    /// `prefix[i] = Σ_{j<i} G[j]`, built on first use.
    prefix: OnceLock<Vec<G1>>,
}

impl GeneratorPool {
    /// Derive a pool with `size` indexed generators.
    pub fn new(size: usize) -> Self {
        let _span = tracing::info_span!("pool_new", size).entered();
        let g = parallel::map(size, 64, |i| indexed_generator(i as u64));
        tracing::info!(size, "generator pool derived");
        Self::from_parts(indexed_generator(H_INDEX), indexed_generator(U_INDEX), g)
    }

    fn from_parts(h: G1Affine, u: G1Affine, g: Vec<G1Affine>) -> Self {
        Self {
            h,
            u,
            g,
            prefix: OnceLock::new(),
        }
    }

    /// Number of indexed generators.
    #[inline]
    pub fn size(&self) -> usize {
        self.g.len()
    }

    /// Blinding generator.
    #[inline]
    pub fn h(&self) -> G1Affine {
        self.h
    }

    /// Auxiliary generator, also reachable as `g(U_OFFSET)`.
    #[inline]
    pub fn u(&self) -> G1Affine {
        self.u
    }

    /// Generator at `offset` (`U` for [`U_OFFSET`]).
    pub fn g(&self, offset: i64) -> G1Affine {
        self.bases(offset, 1)[0]
    }

    /// The `n` generators starting at `offset`.
    ///
    /// Panics unless `offset + n <= size`, or `offset == -1` with `n <= 1`.
    pub fn bases(&self, offset: i64, n: usize) -> &[G1Affine] {
        if offset == U_OFFSET {
            assert!(n <= 1, "offset -1 addresses a single generator, asked for {n}");
            return &std::slice::from_ref(&self.u)[..n];
        }
        assert!(offset >= 0, "invalid generator offset {offset}");
        let lo = offset as usize;
        assert!(
            lo + n <= self.g.len(),
            "generators [{lo}, {}) out of pool range {}",
            lo + n,
            self.g.len()
        );
        &self.g[lo..lo + n]
    }

    /// `blinding·H + Σ values[i]·G[offset + i]`.
    pub fn commit(&self, offset: i64, values: &[F], blinding: F) -> G1 {
        self.h * blinding + misc::msm(self.bases(offset, values.len()), values)
    }

    /// `blinding·H + value·G[offset]`.
    pub fn commit_scalar(&self, offset: i64, value: F, blinding: F) -> G1 {
        self.h * blinding + self.g(offset) * value
    }

    /// Commitment to `n` copies of `value`.
    pub fn commit_const(&self, offset: i64, n: usize, value: F, blinding: F) -> G1 {
        if offset == U_OFFSET || n == 0 {
            let sum: G1 = self.bases(offset, n).iter().map(|g| g.into_group()).sum();
            return self.h * blinding + sum * value;
        }
        self.bases(offset, n);
        let prefix = self.prefix();
        let lo = offset as usize;
        self.h * blinding + (prefix[lo + n] - prefix[lo]) * value
    }

    /// `blinding·H + Σ values[i]·bases[i]` over arbitrary (e.g. folded) bases.
    pub fn commit_with(&self, bases: &[G1Affine], values: &[F], blinding: F) -> G1 {
        self.h * blinding + misc::msm(bases, values)
    }

    fn prefix(&self) -> &[G1] {
        self.prefix.get_or_init(|| {
            let mut acc = G1::zero();
            let mut out = Vec::with_capacity(self.g.len() + 1);
            out.push(acc);
            for g in &self.g {
                acc += g;
                out.push(acc);
            }
            out
        })
    }

    /// BLAKE3 digest of the compressed generators.
    pub fn digest(&self) -> [u8; 32] {
        let mut h = Hasher::new();
        h.update(b"G09ZK.pool.v1");
        h.update(&(self.g.len() as u64).to_be_bytes());
        let mut tmp = Vec::with_capacity(32);
        for p in [&self.h, &self.u].into_iter().chain(self.g.iter()) {
            tmp.clear();
            p.serialize_compressed(&mut tmp).expect("serialize G1");
            h.update(&tmp);
        }
        *h.finalize().as_bytes()
    }

    /// Write the pool to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PoolError> {
        let mut bytes = Vec::with_capacity(16 + 32 * (self.g.len() + 2));
        bytes.extend_from_slice(POOL_MAGIC);
        bytes.extend_from_slice(&POOL_VERSION.to_le_bytes());
        self.h
            .serialize_compressed(&mut bytes)
            .and_then(|_| self.u.serialize_compressed(&mut bytes))
            .and_then(|_| self.g.serialize_compressed(&mut bytes))
            .map_err(|e| PoolError::Deserialize(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read and validate a pool written by [`GeneratorPool::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoolError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse and validate pool bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PoolError> {
        if bytes.len() < POOL_MAGIC.len() + 2 || &bytes[..8] != POOL_MAGIC {
            return Err(PoolError::Deserialize("bad magic".into()));
        }
        let version = u16::from_le_bytes([bytes[8], bytes[9]]);
        if version != POOL_VERSION {
            return Err(PoolError::Deserialize(format!(
                "unsupported pool version {version}"
            )));
        }
        let mut slice = &bytes[10..];
        let bad = |e: ark_serialize::SerializationError| PoolError::Deserialize(format!("pool: {e}"));
        let h = G1Affine::deserialize_compressed(&mut slice).map_err(bad)?;
        let u = G1Affine::deserialize_compressed(&mut slice).map_err(bad)?;
        let g = Vec::<G1Affine>::deserialize_compressed(&mut slice).map_err(bad)?;

        if h.is_zero() || u.is_zero() {
            return Err(PoolError::Invalid("H or U is the identity".into()));
        }
        if h == u {
            return Err(PoolError::Invalid("H and U coincide".into()));
        }
        if let Some(i) = g.iter().position(|p| p.is_zero()) {
            return Err(PoolError::Invalid(format!("G[{i}] is the identity")));
        }
        tracing::info!(size = g.len(), "generator pool loaded");
        Ok(Self::from_parts(h, u, g))
    }
}

static INSTALLED: OnceLock<GeneratorPool> = OnceLock::new();

/// Install the process-wide pool. Fails if one is already installed.
pub fn install(pool: GeneratorPool) -> Result<&'static GeneratorPool, PoolError> {
    INSTALLED
        .set(pool)
        .map_err(|_| PoolError::AlreadyInstalled)?;
    INSTALLED.get().ok_or(PoolError::AlreadyInstalled)
}

/// The process-wide pool, if one was installed.
pub fn installed() -> Option<&'static GeneratorPool> {
    INSTALLED.get()
}

/// Shared pool for unit tests.
#[cfg(test)]
pub(crate) fn test_pool() -> &'static GeneratorPool {
    static POOL: OnceLock<GeneratorPool> = OnceLock::new();
    POOL.get_or_init(|| GeneratorPool::new(256))
}
