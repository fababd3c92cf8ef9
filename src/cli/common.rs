//! Shared helpers for command handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use linkprobe::android::{Decompiler, OutputDir};
use linkprobe::config::Config;
use linkprobe::manifest::{load_manifest, ManifestModel};

use super::{DecodeArgs, PackageSource};

/// Directory name used when output is kept without an explicit location.
const DEFAULT_KEPT_OUTPUT: &str = "apk_output";

/// Build the manifest model from either a package or a decoded manifest.
///
/// Decoded output is released before returning; the model is self-contained.
pub(crate) async fn load_model(
    source: &PackageSource,
    decode: &DecodeArgs,
    config: &Config,
) -> Result<ManifestModel> {
    if let Some(manifest) = &source.manifest {
        return load_manifest(manifest)
            .with_context(|| format!("Failed to load manifest {}", manifest.display()));
    }
    let apk = source
        .apk
        .as_ref()
        .context("Provide a package with --apk or a decoded manifest with --manifest")?;

    let out = output_dir(decode, config)?;
    let decompiler = Decompiler::new(&config.tools.apktool);
    let result = decode_and_parse(&decompiler, apk, out.path()).await;
    out.finish();
    result.with_context(|| format!("Failed to analyze {}", apk.display()))
}

async fn decode_and_parse(
    decompiler: &Decompiler,
    apk: &Path,
    out_dir: &Path,
) -> linkprobe::Result<ManifestModel> {
    let manifest = decompiler.decompile(apk, out_dir).await?;
    let model = load_manifest(&manifest)?;
    info!(
        package = %model.package_name,
        activities = model.activities.len(),
        "Manifest loaded"
    );
    Ok(model)
}

fn output_dir(decode: &DecodeArgs, config: &Config) -> Result<OutputDir> {
    let keep = decode.keep_output || config.workspace.keep_output;
    let fixed = decode
        .output_dir
        .clone()
        .or_else(|| config.workspace.output_dir.clone())
        .or_else(|| keep.then(|| PathBuf::from(DEFAULT_KEPT_OUTPUT)));
    match fixed {
        Some(path) => Ok(OutputDir::fixed(path, keep)),
        None => OutputDir::temp().context("Failed to create temporary output directory"),
    }
}
