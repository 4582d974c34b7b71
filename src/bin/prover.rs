//! Minimal CLI prover (bundle format v1)
//!
//! Proves `Z = X ∘ Y` for an `m × n` witness and writes a versioned bundle:
//!   magic: b"G09ZKv1\0" (8 bytes) + u16 version + policy tag + ark-compressed bundle
//!
//! Flags:
//! - `--m`, `--n`: witness shape for the deterministic demo witness;
//! - `--x`, `--y`: CSV files (one row per line) replacing the demo witness;
//! - `--policy ordinary|succinct`;
//! - `--pool <file>` or `--pool-size <k>` (derived on the fly, default 1024);
//! - `--out <file>` (default `bundle.bin`), `--rng-seed <u64>`, `--json`.

#![forbid(unsafe_code)]

use std::{env, fs, path::Path, time::Instant};

use groth09zk::{
    api::{io, Offsets},
    GeneratorPool, HadamardProver, Ordinary, Policy, Succinct, F,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

const DEFAULT_POOL_SIZE: usize = 1024;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn parse_num<T: std::str::FromStr>(args: &[String], key: &str, default: T) -> anyhow::Result<T> {
    match parse_flag(args, key) {
        Some(s) => s
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a non-negative integer (got `{s}`)")),
        None => Ok(default),
    }
}

/// Load a row-major matrix from a CSV-ish file.
///
/// - Splits on commas **or** whitespace.
/// - Ignores empty lines and inline comments after `#`.
/// - Ragged rows are an error.
fn load_matrix_csv(path: &Path) -> anyhow::Result<Vec<Vec<F>>> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read witness file {}: {e}", path.display()))?;

    let mut rows: Vec<Vec<F>> = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for (colno, tok) in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .enumerate()
        {
            let v = tok.parse::<u64>().map_err(|e| {
                anyhow::anyhow!(
                    "{}: parse error at line {}, column {}: token `{}` ({})",
                    path.display(),
                    lineno + 1,
                    colno + 1,
                    tok,
                    e
                )
            })?;
            row.push(F::from(v));
        }
        rows.push(row);
    }

    if let Some(first) = rows.first() {
        let n = first.len();
        if let Some(i) = rows.iter().position(|r| r.len() != n) {
            return Err(anyhow::anyhow!(
                "{} is ragged: row 1 has {} column(s), but row {} has {}",
                path.display(),
                n,
                i + 1,
                rows[i].len()
            ));
        }
    }
    Ok(rows)
}

/// Deterministic demo witness: `x[i][j] = i·n + j + 1`, `y[i][j] = (x[i][j])²`.
fn demo_witness(m: usize, n: usize) -> (Vec<Vec<F>>, Vec<Vec<F>>) {
    let x: Vec<Vec<F>> = (0..m)
        .map(|i| (0..n).map(|j| F::from((i * n + j + 1) as u64)).collect())
        .collect();
    let y = x
        .iter()
        .map(|row| row.iter().map(|v| *v * v).collect())
        .collect();
    (x, y)
}

#[derive(Serialize)]
struct Report {
    policy: &'static str,
    m: u64,
    n: u64,
    offsets: Offsets,
    pool_size: usize,
    pool_digest: String,
    proof_bytes: usize,
    bundle_bytes: usize,
    prove_ms: u128,
    out: String,
}

fn run<P: Policy>(
    pool: &GeneratorPool,
    x: Vec<Vec<F>>,
    y: Vec<Vec<F>>,
    rng: &mut StdRng,
    out: &Path,
) -> anyhow::Result<Report> {
    let start = Instant::now();
    let bundle = HadamardProver::<P>::new(pool).prove(x, y, rng)?;
    let prove_ms = start.elapsed().as_millis();

    let bytes = io::encode_bundle(&bundle)?;
    fs::write(out, &bytes).map_err(|e| anyhow::anyhow!("create {}: {e}", out.display()))?;

    Ok(Report {
        policy: P::NAME,
        m: bundle.m,
        n: bundle.n,
        offsets: bundle.offsets,
        pool_size: pool.size(),
        pool_digest: hex::encode(bundle.pool_digest),
        proof_bytes: bundle.proof_size(),
        bundle_bytes: bytes.len(),
        prove_ms,
        out: out.display().to_string(),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    let json = has_flag(&args, "--json");
    let policy = parse_flag(&args, "--policy").unwrap_or_else(|| Ordinary::NAME.to_string());
    let out = parse_flag(&args, "--out").unwrap_or_else(|| "bundle.bin".to_string());

    let mut rng = match parse_flag(&args, "--rng-seed") {
        Some(s) => StdRng::seed_from_u64(
            s.parse()
                .map_err(|_| anyhow::anyhow!("--rng-seed must be a u64 (got `{s}`)"))?,
        ),
        None => StdRng::from_entropy(),
    };

    let (x, y) = match (parse_flag(&args, "--x"), parse_flag(&args, "--y")) {
        (Some(px), Some(py)) => (load_matrix_csv(Path::new(&px))?, load_matrix_csv(Path::new(&py))?),
        (None, None) => {
            let m: usize = parse_num(&args, "--m", 4)?;
            let n: usize = parse_num(&args, "--n", 16)?;
            demo_witness(m, n)
        }
        _ => return Err(anyhow::anyhow!("--x and --y must be given together")),
    };

    let pool = match parse_flag(&args, "--pool") {
        Some(p) => GeneratorPool::load(&p).map_err(|e| anyhow::anyhow!("load pool {p}: {e}"))?,
        None => GeneratorPool::new(parse_num(&args, "--pool-size", DEFAULT_POOL_SIZE)?),
    };

    let out = Path::new(&out);
    let report = match policy.as_str() {
        "ordinary" => run::<Ordinary>(&pool, x, y, &mut rng, out)?,
        "succinct" => run::<Succinct>(&pool, x, y, &mut rng, out)?,
        other => return Err(anyhow::anyhow!("unknown --policy `{other}` (ordinary|succinct)")),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!(
            "✓ Proof generated: policy={}, m={}, n={}, {} bytes proof in {} ms",
            report.policy, report.m, report.n, report.proof_bytes, report.prove_ms
        );
        eprintln!("  Pool: {} generators, digest {}", report.pool_size, report.pool_digest);
        eprintln!("✓ Wrote {} ({} bytes)", report.out, report.bundle_bytes);
        eprintln!();
        eprintln!("To verify this bundle, run:");
        eprintln!("  cargo run --bin verifier -- --in {} --pool-size {}", report.out, report.pool_size);
    }
    Ok(())
}
