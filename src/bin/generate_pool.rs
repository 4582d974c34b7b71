//! Derive a generator pool and write it to disk
//!
//! Every generator is hashed to the curve from a fixed domain and its index,
//! so there is no secret to protect: anyone can re-derive the same pool and
//! compare digests.
//!
//! Flags: `--size <k>` (default 1024), `--out <file>` (default `pool.bin`),
//! `--json`.

#![forbid(unsafe_code)]

use std::{env, time::Instant};

use groth09zk::GeneratorPool;
use serde::Serialize;

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
    size: usize,
    out: String,
    bytes: u64,
    digest: String,
    derive_ms: u128,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    let size: usize = match parse_flag(&args, "--size") {
        Some(s) => s
            .parse()
            .map_err(|_| anyhow::anyhow!("--size must be an integer (got `{s}`)"))?,
        None => 1024,
    };
    if size == 0 {
        return Err(anyhow::anyhow!("--size must be positive"));
    }
    let out = parse_flag(&args, "--out").unwrap_or_else(|| "pool.bin".to_string());

    let start = Instant::now();
    let pool = GeneratorPool::new(size);
    let derive_ms = start.elapsed().as_millis();
    pool.save(&out)
        .map_err(|e| anyhow::anyhow!("write {out}: {e}"))?;
    let bytes = std::fs::metadata(&out)?.len();

    let report = Report {
        size,
        out,
        bytes,
        digest: hex::encode(pool.digest()),
        derive_ms,
    };
    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✓ Derived {} generators in {} ms", report.size, report.derive_ms);
        println!("✓ Wrote {} ({} bytes)", report.out, report.bytes);
        println!("   Digest: {}", report.digest);
    }
    Ok(())
}
