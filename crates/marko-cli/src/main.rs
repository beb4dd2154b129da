//! Command-line front end for the marko compiler.
//!
//! Compiles template files, directories, or globs to JavaScript modules,
//! optionally emitting metadata sidecars and re-compiling on change. Watch
//! mode watches both the templates themselves and every watch file their
//! metadata reports (taglib definitions, plugin modules).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use notify::{RecursiveMode, Watcher};
use rayon::prelude::*;
use tracing::{error, info};

use marko_core::config::{CompileConfig, ModuleFormat};
use marko_core::defaults;
use marko_core::{compile_file, CompileResult, Translator};

#[derive(Parser)]
#[command(name = "markoc", about = "Compile .marko templates to JavaScript")]
struct Cli {
    /// Template files, directories, or globs
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory for generated files (defaults to alongside each input)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Use short hashed component ids
    #[arg(long)]
    optimize: bool,

    /// Output format passed to the translator
    #[arg(long, default_value = "html")]
    output: String,

    /// Module format of the generated code
    #[arg(long, value_enum, default_value_t = ModulesArg::Esm)]
    modules: ModulesArg,

    /// Emit .js.map source maps
    #[arg(long)]
    source_maps: bool,

    /// Emit a .meta.json sidecar per compiled template
    #[arg(long)]
    emit_meta: bool,

    /// Project root for component ids (defaults to the nearest package root)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Recompile when templates or their watch files change
    #[arg(long)]
    watch: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModulesArg {
    Esm,
    Cjs,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli);
    let files = collect_files(&cli.inputs)?;
    if files.is_empty() {
        bail!("no .marko templates matched the given inputs");
    }

    let results = compile_all(&files, &config, &cli)?;
    if cli.watch {
        watch_loop(&files, &results, &config, &cli)?;
    }
    Ok(())
}

fn build_config(cli: &Cli) -> CompileConfig {
    CompileConfig {
        translator: Some(Translator::html()),
        optimize: if cli.optimize { Some(true) } else { None },
        output: cli.output.clone(),
        modules: match cli.modules {
            ModulesArg::Esm => ModuleFormat::Esm,
            ModulesArg::Cjs => ModuleFormat::Cjs,
        },
        source_maps: cli.source_maps,
        root: cli.root.clone(),
        ..CompileConfig::default()
    }
}

fn collect_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for input in inputs {
        let path = Path::new(input);
        if input.contains('*') || input.contains('?') {
            for entry in glob::glob(input).with_context(|| format!("bad glob: {input}"))? {
                let entry = entry?;
                if is_template(&entry) {
                    files.insert(entry);
                }
            }
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path) {
                let entry = entry?;
                if entry.file_type().is_file() && is_template(entry.path()) {
                    files.insert(entry.path().to_path_buf());
                }
            }
        } else {
            files.insert(path.to_path_buf());
        }
    }
    Ok(files.into_iter().collect())
}

fn is_template(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "marko")
}

/// Compile every file, in parallel, returning successful results. Individual
/// failures are reported and counted; any failure fails the batch.
fn compile_all(
    files: &[PathBuf],
    config: &CompileConfig,
    cli: &Cli,
) -> Result<Vec<CompileResult>> {
    let outcomes: Vec<(PathBuf, Result<CompileResult>)> = files
        .par_iter()
        .map(|file| {
            let outcome = compile_file(file, config)
                .map_err(anyhow::Error::from)
                .and_then(|result| {
                    write_outputs(file, &result, cli)?;
                    Ok(result)
                });
            (file.clone(), outcome)
        })
        .collect();
    defaults::flush_scheduled_defaults();

    let mut results = Vec::new();
    let mut failures = 0usize;
    for (file, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                info!(file = %file.display(), id = %result.meta.id, "compiled");
                results.push(result);
            }
            Err(err) => {
                failures += 1;
                error!(file = %file.display(), "{err}");
            }
        }
    }
    if failures > 0 {
        bail!("{failures} template(s) failed to compile");
    }
    Ok(results)
}

fn write_outputs(file: &Path, result: &CompileResult, cli: &Cli) -> Result<()> {
    let out_path = output_path(file, cli)?;
    std::fs::write(&out_path, &result.code)
        .with_context(|| format!("writing {}", out_path.display()))?;

    if let Some(map) = &result.map {
        let map_path = out_path.with_extension("js.map");
        std::fs::write(&map_path, serde_json::to_string(map)?)?;
    }
    if cli.emit_meta {
        let meta_path = out_path.with_extension("meta.json");
        std::fs::write(&meta_path, serde_json::to_string_pretty(&result.meta)?)?;
    }
    Ok(())
}

fn output_path(file: &Path, cli: &Cli) -> Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("not a file: {}", file.display()))?;
    let mut out = match &cli.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.join(name)
        }
        None => file.to_path_buf(),
    };
    out.set_extension("js");
    Ok(out)
}

/// Re-run the batch whenever a template or one of its watch files changes.
fn watch_loop(
    files: &[PathBuf],
    initial: &[CompileResult],
    config: &CompileConfig,
    cli: &Cli,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if event.is_ok() {
            let _ = tx.send(());
        }
    })?;

    let mut watched = BTreeSet::new();
    for path in watch_set(files, initial) {
        if watched.insert(path.clone()) {
            let target = if path.is_dir() { path.clone() } else { path.parent().map(Path::to_path_buf).unwrap_or(path) };
            let _ = watcher.watch(&target, RecursiveMode::NonRecursive);
        }
    }

    info!("watching {} path(s) for changes", watched.len());
    loop {
        if rx.recv().is_err() {
            return Ok(());
        }
        // Coalesce bursts of events into one rebuild.
        while rx.recv_timeout(Duration::from_millis(50)).is_ok() {}
        if let Err(err) = compile_all(files, config, cli) {
            error!("{err}");
        }
    }
}

fn watch_set(files: &[PathBuf], results: &[CompileResult]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = files.to_vec();
    for result in results {
        paths.extend(result.meta.watch_files.iter().cloned());
    }
    paths
}
