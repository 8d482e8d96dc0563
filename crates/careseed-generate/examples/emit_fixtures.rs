use std::env;
use std::path::PathBuf;

use careseed_core::ManifestStore;
use careseed_generate::{FixtureEmitter, GenerateOptions, Stage, WriteMode, write_script};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut manifest: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--manifest" => manifest = args.next().map(PathBuf::from),
            "--out" => out = args.next().map(PathBuf::from),
            "--seed" => seed = args.next().map(|value| value.parse()).transpose()?,
            _ => return Err(format!("unexpected argument: {arg}").into()),
        }
    }

    let manifest = manifest.unwrap_or_else(|| PathBuf::from("SEED_DATA_MANIFEST.json"));
    let out = out.unwrap_or_else(|| PathBuf::from("seed_data.sql"));

    let options = GenerateOptions {
        seed,
        ..GenerateOptions::default()
    };
    let (mut registry, writer) = ManifestStore::new(manifest).start_empty();
    let result = FixtureEmitter::new(options).run(&mut registry, Stage::All)?;
    let bytes = write_script(&out, &result.script, WriteMode::Truncate)?;
    writer.persist(&registry)?;

    println!(
        "script={} statements={} bytes={bytes}",
        out.display(),
        result.report.statements
    );
    Ok(())
}
