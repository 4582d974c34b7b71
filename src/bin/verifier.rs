//! Minimal CLI verifier (bundle format v1)
//!
//! Reads a bundle written by `prover`, dispatches on its policy tag and
//! verifies it against a generator pool:
//! - `--in <file>` (default `bundle.bin`);
//! - `--pool <file>` or `--pool-size <k>` (default 1024). The pool digest
//!   recorded in the bundle must match;
//! - `--policy ordinary|succinct` (optional; must agree with the bundle tag);
//! - `--json` for a machine-readable report.
//!
//! Exit status is non-zero when the bundle is malformed or rejected.

#![forbid(unsafe_code)]

use std::{env, fs, time::Instant};

use groth09zk::{
    api::io, GeneratorPool, HadamardVerifier, Ordinary, Policy, Succinct,
};
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

#[derive(Serialize)]
struct Report {
    policy: &'static str,
    m: u64,
    n: u64,
    pool_digest: String,
    proof_bytes: usize,
    verify_ms: u128,
    accepted: bool,
}

fn run<P: Policy>(pool: &GeneratorPool, bytes: &[u8]) -> anyhow::Result<Report> {
    let bundle = io::decode_bundle::<P>(bytes)?;
    let start = Instant::now();
    HadamardVerifier::<P>::new(pool).verify(&bundle)?;
    Ok(Report {
        policy: P::NAME,
        m: bundle.m,
        n: bundle.n,
        pool_digest: hex::encode(bundle.pool_digest),
        proof_bytes: bundle.proof_size(),
        verify_ms: start.elapsed().as_millis(),
        accepted: true,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    let json = args.iter().any(|a| a == "--json");
    let path = parse_flag(&args, "--in").unwrap_or_else(|| "bundle.bin".to_string());

    let bytes = fs::read(&path).map_err(|e| anyhow::anyhow!("open {path}: {e}"))?;
    let tag = io::policy_tag(&bytes)?;
    if let Some(cli) = parse_flag(&args, "--policy") {
        let expected = match cli.as_str() {
            "ordinary" => Ordinary::TAG,
            "succinct" => Succinct::TAG,
            other => return Err(anyhow::anyhow!("unknown --policy `{other}` (ordinary|succinct)")),
        };
        if expected != tag {
            return Err(anyhow::anyhow!(
                "bundle was produced under policy tag {tag}, but --policy {cli} was requested"
            ));
        }
    }

    let pool = match parse_flag(&args, "--pool") {
        Some(p) => GeneratorPool::load(&p).map_err(|e| anyhow::anyhow!("load pool {p}: {e}"))?,
        None => {
            let size = match parse_flag(&args, "--pool-size") {
                Some(s) => s
                    .parse()
                    .map_err(|_| anyhow::anyhow!("--pool-size must be an integer (got `{s}`)"))?,
                None => DEFAULT_POOL_SIZE,
            };
            GeneratorPool::new(size)
        }
    };

    let report = match tag {
        t if t == Ordinary::TAG => run::<Ordinary>(&pool, &bytes)?,
        t if t == Succinct::TAG => run::<Succinct>(&pool, &bytes)?,
        other => return Err(anyhow::anyhow!("unknown policy tag {other} in {path}")),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!(
            "✓ Verified {path}: policy={}, m={}, n={}, {} bytes proof in {} ms",
            report.policy, report.m, report.n, report.proof_bytes, report.verify_ms
        );
    }
    Ok(())
}
