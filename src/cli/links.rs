//! `linkprobe links`: classify the links a package declares.

use anyhow::{Context, Result};
use serde::Serialize;

use linkprobe::config::Config;
use linkprobe::links::{classify, LinkSet};
use linkprobe::manifest::{Activity, IntentFilter};
use linkprobe::ui::{colors_enabled, format_link_summary};

use super::common::load_model;
use super::{DecodeArgs, PackageSource};

#[derive(Debug, Serialize)]
struct LinksReport<'a> {
    package: &'a str,
    links: &'a LinkSet,
    /// Raw filters, including the filter-level `autoVerify` flag.
    intent_filters: &'a [IntentFilter],
    activities: &'a [Activity],
}

pub(crate) async fn cmd_links(
    source: PackageSource,
    decode: DecodeArgs,
    json: bool,
    config: &Config,
) -> Result<()> {
    let model = load_model(&source, &decode, config).await?;
    let links = classify(&model);

    if json {
        let report = LinksReport {
            package: &model.package_name,
            links: &links,
            intent_filters: &model.intent_filters,
            activities: &model.activities,
        };
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize links")?;
        println!("{}", out);
    } else {
        println!("{}", format_link_summary(&links, colors_enabled()));
    }
    Ok(())
}
