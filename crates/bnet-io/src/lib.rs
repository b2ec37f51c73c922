use bnet_core::F;
use bnet_sampler::{Algorithm, EngineConfig};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub mod cli;
pub mod loader;

pub use loader::{load_model, load_queries, FileFormat};

/// Run manifest written next to every result file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub seed: u64,
    pub algorithm: Algorithm,
    pub steps: usize,
    pub workers: usize,
    pub n_queries: usize,
    pub model_path: String,
    pub queries_path: String,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

impl RunManifest {
    pub fn new(
        algorithm: Algorithm,
        config: &EngineConfig,
        steps: usize,
        model_path: &Path,
        queries_path: &Path,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            seed: config.seed,
            algorithm,
            steps,
            workers: config.workers,
            n_queries: 0, // set when results are written
            model_path: model_path.display().to_string(),
            queries_path: queries_path.display().to_string(),
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

/// `<output>.manifest.json`
pub fn manifest_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".manifest.json");
    PathBuf::from(name)
}

/// One probability per line, in query order.
pub fn format_results(results: &[F]) -> String {
    let mut out = String::with_capacity(results.len() * 20);
    for p in results {
        let _ = writeln!(out, "{p}");
    }
    out
}

pub fn write_results(path: &Path, results: &[F]) -> anyhow::Result<()> {
    std::fs::write(path, format_results(results))?;
    Ok(())
}

/// Write results and the manifest next to them
pub fn write_results_with_manifest(
    results: &[F],
    manifest: &RunManifest,
    output: &Path,
) -> anyhow::Result<PathBuf> {
    write_results(output, results)?;

    let mut manifest = manifest.clone();
    manifest.n_queries = results.len();
    let manifest_path = manifest_path(output);
    manifest.save_to_file(&manifest_path)?;

    println!("Wrote {} results to {}", results.len(), output.display());
    println!("Wrote manifest to {}", manifest_path.display());

    Ok(manifest_path)
}

/// Get git commit hash for reproducibility
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
}

fn get_rust_version() -> String {
    std::process::Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
