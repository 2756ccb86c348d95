//! Run the generator over fixture documents and check that output is stable
//! and that the sync routine reaches every binding.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use json_osc::inference::InferOptions;
use json_osc::{generate, path_de, Model, Settings};

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures"));

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
        .with_context(|| format!("cannot list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut failures = 0;
    for path in &paths {
        match check(path) {
            Ok(bindings) => eprintln!("✅ {} ({bindings} bindings)", path.display().to_string().green()),
            Err(error) => {
                failures += 1;
                eprintln!("❌ {}: {error:#}", path.display().to_string().red());
            }
        }
    }

    eprintln!("—— {} checked, {} failed ——", paths.len(), failures);
    if failures > 0 {
        anyhow::bail!("{failures} fixture(s) failed");
    }
    Ok(())
}

fn check(path: &Path) -> Result<usize> {
    let source = std::fs::read_to_string(path)?;
    let document = path_de::parse_document(&source)?;
    let settings = Settings::default();

    let first = generate(&document, &settings)?;
    let second = generate(&document, &settings)?;
    anyhow::ensure!(first == second, "two runs produced different output");

    let model = Model::build(&document, &InferOptions::default())?;
    let sync_fn = &settings.codegen.sync_fn;
    let sync = first
        .find(&format!("void {sync_fn}("))
        .map(|at| &first[at..])
        .context("no sync routine in output")?;
    for binding in &model.bindings {
        let call = format!("get_{}(buf, len", binding.name());
        anyhow::ensure!(sync.contains(&call), "binding `{}` is never synced", binding.name());
    }
    Ok(model.bindings.len())
}
