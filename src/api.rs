//! Validated entry point for row-wise Hadamard proofs
//!
//! The protocol modules trust their callers: shapes are asserted, not
//! checked. This module wraps [`groth09::sec43`] with a small surface that
//! validates everything coming from outside:
//!
//! - `HadamardProver` / `HadamardVerifier` builders (seed, generator layout);
//! - one-shot `prove` producing a self-describing [`HadamardBundle`];
//! - bundle I/O: `io::write_bundle` / `io::read_bundle`.
//!
//! Errors are [`ApiError`] values surfaced through `anyhow::Result`.

use std::marker::PhantomData;

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::groth09::{sec43, Policy, Sec43Proof};
use crate::pc::GeneratorPool;
use crate::transcript::Seed;
use crate::F;

/// Seed domain used when the caller does not pick one.
pub const DEFAULT_DOMAIN: &str = "G09ZK.hadamard";

/// Validation failures at the API surface.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// No rows or no columns.
    #[error("empty witness: m = {m}, n = {n}")]
    Empty {
        /// Row count.
        m: usize,
        /// Column count.
        n: usize,
    },
    /// `x` and `y` disagree on the row count.
    #[error("x has {x} rows but y has {y}")]
    RowCount {
        /// Rows of `x`.
        x: usize,
        /// Rows of `y`.
        y: usize,
    },
    /// A row whose length differs from the first row of `x`.
    #[error("row {row} of {which} has length {len}, expected {n}")]
    Ragged {
        /// `"x"` or `"y"`.
        which: &'static str,
        /// Index of the offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// Expected length.
        n: usize,
    },
    /// Bundle commitment vectors disagree with its declared `m`.
    #[error("bundle commits to {found} rows but declares m = {m}")]
    Shape {
        /// Declared row count.
        m: usize,
        /// Length of a commitment vector.
        found: usize,
    },
    /// Generator offsets or `n` overflow the pool layout.
    #[error("generator layout {offsets:?} with n = {n} is out of range")]
    OffsetRange {
        /// Requested layout.
        offsets: Offsets,
        /// Column count.
        n: u64,
    },
    /// The pool ends before the last generator the layout needs.
    #[error("{policy} proofs with n = {n} need a pool of {need} generators, have {size}")]
    PoolTooSmall {
        /// [`Policy::NAME`].
        policy: &'static str,
        /// Column count.
        n: usize,
        /// Required pool size.
        need: usize,
        /// Actual pool size.
        size: usize,
    },
    /// Bundle was written under another policy.
    #[error("policy mismatch: bundle tag {found}, expected {expected}")]
    PolicyMismatch {
        /// Tag of the decoding policy.
        expected: u8,
        /// Tag in the bundle header.
        found: u8,
    },
    /// Bundle was proved against a different generator pool.
    #[error("generator pool digest mismatch")]
    PoolDigest,
    /// Bundle seed differs from [`HadamardVerifier::expect_seed`].
    #[error("bundle seed differs from the expected seed")]
    SeedMismatch,
    /// Well-formed bundle whose proof does not verify.
    #[error("proof rejected")]
    Rejected,
}

/// Where `X`, `Y` and `Z` rows sit in the generator pool.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    CanonicalSerialize,
    CanonicalDeserialize,
)]
pub struct Offsets {
    /// First generator of every `X` row.
    pub x: u64,
    /// First generator of every `Y` row.
    pub y: u64,
    /// First generator of every `Z` row.
    pub z: u64,
}

impl Offsets {
    fn max(&self) -> u64 {
        self.x.max(self.y).max(self.z)
    }

    /// Offsets as pool indices; fails on values past `i64::MAX`.
    fn signed(&self, n: usize) -> Result<(i64, i64, i64), ApiError> {
        let cast = |v: u64| {
            i64::try_from(v).map_err(|_| ApiError::OffsetRange {
                offsets: *self,
                n: n as u64,
            })
        };
        Ok((cast(self.x)?, cast(self.y)?, cast(self.z)?))
    }
}

/// Smallest pool that holds an `n`-column instance under policy `P`, or
/// `None` when the layout overflows.
pub fn required_pool_size<P: Policy>(n: usize, offsets: &Offsets) -> Option<usize> {
    let n = u64::try_from(n).ok()?;
    let rows = offsets.max().checked_add(n)?;
    let need = if P::RESERVED_TAIL {
        // x and y rows must stay clear of the reserved tail.
        let tail = offsets.x.max(offsets.y).checked_add(n.checked_mul(2)?)?;
        rows.max(tail)
    } else {
        rows
    };
    usize::try_from(need).ok()
}

/// Pool bounds check, returning the layout as signed pool offsets.
fn check_pool<P: Policy>(
    pool: &GeneratorPool,
    n: usize,
    offsets: &Offsets,
) -> Result<(i64, i64, i64), ApiError> {
    let signed = offsets.signed(n)?;
    let need = required_pool_size::<P>(n, offsets).ok_or(ApiError::OffsetRange {
        offsets: *offsets,
        n: n as u64,
    })?;
    if pool.size() < need {
        return Err(ApiError::PoolTooSmall {
            policy: P::NAME,
            n,
            need,
            size: pool.size(),
        });
    }
    Ok(signed)
}

fn check_rows(which: &'static str, rows: &[Vec<F>], n: usize) -> Result<(), ApiError> {
    match rows.iter().position(|r| r.len() != n) {
        Some(row) => Err(ApiError::Ragged {
            which,
            row,
            len: rows[row].len(),
            n,
        }),
        None => Ok(()),
    }
}

/// Everything a verifier needs: dimensions, layout, pool identity, seed,
/// public commitments and the proof itself.
#[derive(Clone, Debug, PartialEq)]
pub struct HadamardBundle<P: Policy> {
    /// Rows before padding.
    pub m: u64,
    /// Columns.
    pub n: u64,
    /// Generator layout of the rows.
    pub offsets: Offsets,
    /// [`GeneratorPool::digest`] of the proving pool.
    pub pool_digest: [u8; 32],
    /// Transcript start.
    pub seed: Seed,
    /// Row commitments to `X`, `Y` and `Z`.
    pub com_pub: sec43::CommitmentPub,
    /// Sec43 proof under policy `P`.
    pub proof: Sec43Proof<P>,
}

impl<P: Policy> HadamardBundle<P> {
    /// Compressed size of the proof part alone.
    pub fn proof_size(&self) -> usize {
        self.proof.compressed_size()
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Prover for `Z = X ∘ Y` under policy `P`.
///
/// Defaults: seed domain [`DEFAULT_DOMAIN`], all rows at offset 0.
pub struct HadamardProver<'a, P: Policy> {
    pool: &'a GeneratorPool,
    seed: Seed,
    offsets: Offsets,
    _policy: PhantomData<P>,
}

impl<'a, P: Policy> HadamardProver<'a, P> {
    /// Prover over `pool` with the defaults above.
    pub fn new(pool: &'a GeneratorPool) -> Self {
        Self {
            pool,
            seed: Seed::new(DEFAULT_DOMAIN),
            offsets: Offsets::default(),
            _policy: PhantomData,
        }
    }

    /// Start the transcript from `seed` instead of the default domain.
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Place the rows at `offsets` instead of 0.
    pub fn offsets(mut self, offsets: Offsets) -> Self {
        self.offsets = offsets;
        self
    }

    /// Commit to `x`, `y` and `x ∘ y` row by row and prove the relation.
    pub fn prove<R: Rng>(
        &self,
        x: Vec<Vec<F>>,
        y: Vec<Vec<F>>,
        rng: &mut R,
    ) -> anyhow::Result<HadamardBundle<P>> {
        let m = x.len();
        let n = x.first().map_or(0, Vec::len);
        if m == 0 || n == 0 {
            return Err(ApiError::Empty { m, n }.into());
        }
        if y.len() != m {
            return Err(ApiError::RowCount { x: m, y: y.len() }.into());
        }
        check_rows("x", &x, n)?;
        check_rows("y", &y, n)?;
        let (x_offset, y_offset, z_offset) = check_pool::<P>(self.pool, n, &self.offsets)?;

        let _span = tracing::info_span!("hadamard_prove", m, n, policy = P::NAME).entered();
        let input = sec43::ProveInput::new(x, y, x_offset, y_offset, z_offset);
        let (com_pub, com_sec) = sec43::commit(self.pool, &input, rng);
        let proof = sec43::prove::<P, _>(
            self.pool,
            self.seed,
            input,
            com_pub.clone(),
            com_sec,
            rng,
        );
        tracing::info!(m, n, bytes = proof.compressed_size(), "proof generated");
        Ok(HadamardBundle {
            m: m as u64,
            n: n as u64,
            offsets: self.offsets,
            pool_digest: self.pool.digest(),
            seed: self.seed,
            com_pub,
            proof,
        })
    }
}

/// Verifier for bundles produced by [`HadamardProver`].
pub struct HadamardVerifier<'a, P: Policy> {
    pool: &'a GeneratorPool,
    expected_seed: Option<Seed>,
    _policy: PhantomData<P>,
}

impl<'a, P: Policy> HadamardVerifier<'a, P> {
    /// Verifier over `pool`, accepting any seed.
    pub fn new(pool: &'a GeneratorPool) -> Self {
        Self {
            pool,
            expected_seed: None,
            _policy: PhantomData,
        }
    }

    /// Reject bundles whose transcript does not start from `seed`.
    pub fn expect_seed(mut self, seed: Seed) -> Self {
        self.expected_seed = Some(seed);
        self
    }

    /// Check the bundle against this verifier's pool and run Sec43 verify.
    pub fn verify(&self, bundle: &HadamardBundle<P>) -> anyhow::Result<()> {
        let m = bundle.m as usize;
        let n = bundle.n as usize;
        if m == 0 || n == 0 {
            return Err(ApiError::Empty { m, n }.into());
        }
        let com = &bundle.com_pub;
        for found in [com.a.len(), com.b.len(), com.c.len()] {
            if found != m {
                return Err(ApiError::Shape { m, found }.into());
            }
        }
        if bundle.pool_digest != self.pool.digest() {
            return Err(ApiError::PoolDigest.into());
        }
        if self.expected_seed.is_some_and(|s| s != bundle.seed) {
            return Err(ApiError::SeedMismatch.into());
        }
        let (x_offset, y_offset, z_offset) = check_pool::<P>(self.pool, n, &bundle.offsets)?;

        let _span = tracing::info_span!("hadamard_verify", m, n, policy = P::NAME).entered();
        let input = sec43::VerifyInput {
            com_pub: com,
            n,
            x_offset,
            y_offset,
            z_offset,
        };
        if !sec43::verify::<P>(self.pool, bundle.seed, &input, &bundle.proof) {
            return Err(ApiError::Rejected.into());
        }
        tracing::info!(m, n, "proof accepted");
        Ok(())
    }
}

// ============================================================================
// Bundle I/O (magic + version + policy tag + ark-compressed fields)
// ============================================================================

/// Versioned bundle encoding.
pub mod io {
    use std::{fs, path::Path};

    use super::*;

    /// 8-byte magic used by the `prover` / `verifier` binaries.
    pub const FILE_MAGIC: &[u8; 8] = b"G09ZKv1\0";
    /// Current bundle format version.
    pub const FILE_VERSION: u16 = 1;
    const HEADER_LEN: usize = FILE_MAGIC.len() + 2 + 1;

    /// Serialize a bundle with its header.
    pub fn encode_bundle<P: Policy>(bundle: &HadamardBundle<P>) -> anyhow::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_LEN + bundle.proof.compressed_size());
        out.extend_from_slice(FILE_MAGIC);
        out.extend_from_slice(&FILE_VERSION.to_be_bytes());
        out.push(P::TAG);
        let ser = |r: Result<(), ark_serialize::SerializationError>| {
            r.map_err(|e| anyhow::anyhow!("serialize bundle: {e}"))
        };
        ser(bundle.m.serialize_compressed(&mut out))?;
        ser(bundle.n.serialize_compressed(&mut out))?;
        ser(bundle.offsets.serialize_compressed(&mut out))?;
        ser(bundle.pool_digest.serialize_compressed(&mut out))?;
        ser(bundle.seed.serialize_compressed(&mut out))?;
        ser(bundle.com_pub.serialize_compressed(&mut out))?;
        ser(bundle.proof.serialize_compressed(&mut out))?;
        Ok(out)
    }

    /// Policy tag of an encoded bundle, after checking magic and version.
    pub fn policy_tag(bytes: &[u8]) -> anyhow::Result<u8> {
        if bytes.len() < HEADER_LEN || &bytes[..8] != FILE_MAGIC {
            return Err(anyhow::anyhow!("bad bundle magic (expected G09ZKv1)"));
        }
        let version = u16::from_be_bytes([bytes[8], bytes[9]]);
        if version != FILE_VERSION {
            return Err(anyhow::anyhow!("unsupported bundle version: {version}"));
        }
        Ok(bytes[10])
    }

    /// Parse a bundle written for policy `P`.
    pub fn decode_bundle<P: Policy>(bytes: &[u8]) -> anyhow::Result<HadamardBundle<P>> {
        let tag = policy_tag(bytes)?;
        if tag != P::TAG {
            return Err(ApiError::PolicyMismatch {
                expected: P::TAG,
                found: tag,
            }
            .into());
        }
        let mut slice = &bytes[HEADER_LEN..];
        let bad = |e: ark_serialize::SerializationError| anyhow::anyhow!("deserialize bundle: {e}");
        let bundle = HadamardBundle {
            m: u64::deserialize_compressed(&mut slice).map_err(bad)?,
            n: u64::deserialize_compressed(&mut slice).map_err(bad)?,
            offsets: Offsets::deserialize_compressed(&mut slice).map_err(bad)?,
            pool_digest: <[u8; 32]>::deserialize_compressed(&mut slice).map_err(bad)?,
            seed: Seed::deserialize_compressed(&mut slice).map_err(bad)?,
            com_pub: sec43::CommitmentPub::deserialize_compressed(&mut slice).map_err(bad)?,
            proof: Sec43Proof::<P>::deserialize_compressed(&mut slice).map_err(bad)?,
        };
        if !slice.is_empty() {
            return Err(anyhow::anyhow!("{} trailing bytes after bundle", slice.len()));
        }
        Ok(bundle)
    }

    /// Write a bundle file at `path`.
    pub fn write_bundle<P: Policy>(path: &Path, bundle: &HadamardBundle<P>) -> anyhow::Result<()> {
        let bytes = encode_bundle(bundle)?;
        fs::write(path, bytes).map_err(|e| anyhow::anyhow!("write {}: {e}", path.display()))
    }

    /// Read a bundle file from `path`.
    pub fn read_bundle<P: Policy>(path: &Path) -> anyhow::Result<HadamardBundle<P>> {
        let bytes = fs::read(path).map_err(|e| anyhow::anyhow!("open {}: {e}", path.display()))?;
        decode_bundle(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groth09::{Ordinary, Succinct};
    use crate::misc::random_vec;
    use crate::pc::test_pool;
    use ark_ff::One;
    use rand::{rngs::StdRng, SeedableRng};

    fn witness(m: usize, n: usize, rng: &mut StdRng) -> (Vec<Vec<F>>, Vec<Vec<F>>) {
        let x = (0..m).map(|_| random_vec(rng, n)).collect();
        let y = (0..m).map(|_| random_vec(rng, n)).collect();
        (x, y)
    }

    fn api_error(err: anyhow::Error) -> ApiError {
        err.downcast::<ApiError>().unwrap()
    }

    #[test]
    fn prove_verify_both_policies() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(900);

        let (x, y) = witness(3, 6, &mut rng);
        let bundle = HadamardProver::<Ordinary>::new(pool)
            .prove(x, y, &mut rng)
            .unwrap();
        HadamardVerifier::<Ordinary>::new(pool).verify(&bundle).unwrap();

        let (x, y) = witness(5, 4, &mut rng);
        let offsets = Offsets { x: 0, y: 8, z: 16 };
        let bundle = HadamardProver::<Succinct>::new(pool)
            .offsets(offsets)
            .prove(x, y, &mut rng)
            .unwrap();
        assert_eq!(bundle.offsets, offsets);
        HadamardVerifier::<Succinct>::new(pool).verify(&bundle).unwrap();
    }

    #[test]
    fn malformed_witness_is_rejected_before_proving() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(901);
        let prover = HadamardProver::<Ordinary>::new(pool);

        let err = prover.prove(Vec::new(), Vec::new(), &mut rng).unwrap_err();
        assert_eq!(api_error(err), ApiError::Empty { m: 0, n: 0 });

        let (x, mut y) = witness(2, 3, &mut rng);
        y.pop();
        let err = prover.prove(x, y, &mut rng).unwrap_err();
        assert_eq!(api_error(err), ApiError::RowCount { x: 2, y: 1 });

        let (x, mut y) = witness(2, 3, &mut rng);
        y[1].push(F::one());
        let err = prover.prove(x, y, &mut rng).unwrap_err();
        assert_eq!(
            api_error(err),
            ApiError::Ragged {
                which: "y",
                row: 1,
                len: 4,
                n: 3
            }
        );
    }

    #[test]
    fn succinct_pool_must_leave_room_for_the_tail() {
        let offsets = Offsets { x: 0, y: 10, z: 4 };
        assert_eq!(required_pool_size::<Ordinary>(8, &offsets), Some(18));
        assert_eq!(required_pool_size::<Succinct>(8, &offsets), Some(26));

        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(902);
        let (x, y) = witness(1, 200, &mut rng);
        let err = HadamardProver::<Succinct>::new(pool)
            .prove(x, y, &mut rng)
            .unwrap_err();
        assert!(matches!(api_error(err), ApiError::PoolTooSmall { need: 400, .. }));
    }

    #[test]
    fn verifier_checks_bundle_metadata() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(903);
        let (x, y) = witness(2, 3, &mut rng);
        let bundle = HadamardProver::<Ordinary>::new(pool)
            .seed(Seed::new("app"))
            .prove(x, y, &mut rng)
            .unwrap();
        let verifier = HadamardVerifier::<Ordinary>::new(pool);

        let mut bad = bundle.clone();
        bad.pool_digest[0] ^= 1;
        assert_eq!(api_error(verifier.verify(&bad).unwrap_err()), ApiError::PoolDigest);

        let mut bad = bundle.clone();
        bad.m = 3;
        assert_eq!(
            api_error(verifier.verify(&bad).unwrap_err()),
            ApiError::Shape { m: 3, found: 2 }
        );

        let mut bad = bundle.clone();
        bad.seed = Seed::new("other");
        assert_eq!(api_error(verifier.verify(&bad).unwrap_err()), ApiError::Rejected);

        let strict = HadamardVerifier::<Ordinary>::new(pool).expect_seed(Seed::new("other"));
        assert_eq!(api_error(strict.verify(&bundle).unwrap_err()), ApiError::SeedMismatch);
        HadamardVerifier::<Ordinary>::new(pool)
            .expect_seed(Seed::new("app"))
            .verify(&bundle)
            .unwrap();
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        let far = Offsets { x: u64::MAX, y: 0, z: 0 };
        assert_eq!(required_pool_size::<Ordinary>(3, &far), None);
        assert_eq!(required_pool_size::<Succinct>(usize::MAX / 2 + 1, &Offsets::default()), None);

        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(906);
        let (x, y) = witness(2, 3, &mut rng);
        let err = HadamardProver::<Ordinary>::new(pool)
            .offsets(far)
            .prove(x.clone(), y.clone(), &mut rng)
            .unwrap_err();
        assert_eq!(api_error(err), ApiError::OffsetRange { offsets: far, n: 3 });

        let bundle = HadamardProver::<Ordinary>::new(pool)
            .prove(x, y, &mut rng)
            .unwrap();
        let verifier = HadamardVerifier::<Ordinary>::new(pool);
        for offsets in [far, Offsets { x: 0, y: 0, z: u64::MAX }, Offsets { x: 1 << 63, y: 0, z: 0 }] {
            let mut bad = bundle.clone();
            bad.offsets = offsets;
            let bytes = io::encode_bundle(&bad).unwrap();
            let back = io::decode_bundle::<Ordinary>(&bytes).unwrap();
            let err = verifier.verify(&back).unwrap_err();
            assert!(
                matches!(api_error(err), ApiError::OffsetRange { .. }),
                "offsets {offsets:?}"
            );
        }

        let mut past_end = bundle.clone();
        past_end.offsets.y = pool.size() as u64;
        assert!(matches!(
            api_error(verifier.verify(&past_end).unwrap_err()),
            ApiError::PoolTooSmall { .. }
        ));

        let mut huge_n = bundle;
        huge_n.n = u64::MAX;
        assert!(verifier.verify(&huge_n).is_err());
    }

    #[test]
    fn bundle_bytes_roundtrip_and_policy_tag() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(904);
        let (x, y) = witness(3, 5, &mut rng);
        let bundle = HadamardProver::<Succinct>::new(pool)
            .prove(x, y, &mut rng)
            .unwrap();

        let bytes = io::encode_bundle(&bundle).unwrap();
        assert_eq!(&bytes[..8], io::FILE_MAGIC);
        assert_eq!(io::policy_tag(&bytes).unwrap(), Succinct::TAG);
        let back = io::decode_bundle::<Succinct>(&bytes).unwrap();
        assert_eq!(back, bundle);
        HadamardVerifier::<Succinct>::new(pool).verify(&back).unwrap();

        let err = io::decode_bundle::<Ordinary>(&bytes).unwrap_err();
        assert_eq!(
            api_error(err),
            ApiError::PolicyMismatch {
                expected: Ordinary::TAG,
                found: Succinct::TAG
            }
        );

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(io::decode_bundle::<Succinct>(&trailing).is_err());
        assert!(io::policy_tag(&bytes[..5]).is_err());
    }

    #[test]
    fn bundle_file_roundtrip() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(905);
        let (x, y) = witness(2, 2, &mut rng);
        let bundle = HadamardProver::<Ordinary>::new(pool)
            .prove(x, y, &mut rng)
            .unwrap();

        let path = std::env::temp_dir().join(format!("g09zk-bundle-{}.bin", std::process::id()));
        io::write_bundle(&path, &bundle).unwrap();
        let back = io::read_bundle::<Ordinary>(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, bundle);
    }
}
