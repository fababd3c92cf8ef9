//! `linkprobe fuzz`: send generated URIs to a device.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use linkprobe::android::AdbBridge;
use linkprobe::candidates::{activity_candidates, read_wordlist, wordlist_candidates};
use linkprobe::config::Config;
use linkprobe::links::classify;
use linkprobe::manifest::{Activity, ManifestModel};
use linkprobe::mutate::Mutator;
use linkprobe::orchestrator::{FuzzSession, SessionOutcome, SessionReport};
use linkprobe::runner::ProcessRunner;
use linkprobe::ui::{colors_enabled, format_activities, format_link_summary, paint, Color};

use super::common::load_model;
use super::FuzzArgs;

pub(crate) async fn cmd_fuzz(args: FuzzArgs, config: &Config) -> Result<()> {
    if !args.list && args.url.is_none() && args.wordlist.is_none() && args.mutations == 0 {
        bail!("Nothing to send: pass --wordlist, --mutations, or --url (or --list to inspect)");
    }
    let color = colors_enabled();

    let model = load_model(&args.source, &args.decode, config).await?;

    if args.list {
        let activities = select_activities(&model, args.exported_only);
        println!("{}", format_activities(&activities, color));
        return Ok(());
    }

    let links = classify(&model);
    println!("{}", format_link_summary(&links, color));

    let candidates = match args.url.as_deref() {
        Some(url) => activity_candidates(url, &select_activities(&model, args.exported_only)),
        None => {
            let words = collect_words(&args, config).await?;
            wordlist_candidates(&links.deep_links, &words)
        }
    };
    if links.deep_links.is_empty() && args.url.is_none() {
        warn!("No deep links declared; wordlist mode has nothing to expand");
    }

    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.fuzz.command_timeout());
    let serial = args.device.clone().or_else(|| config.fuzz.device_serial.clone());
    let bridge = AdbBridge::new(&config.tools.adb).with_serial(serial);

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received; stopping after the current command");
                cancel.cancel();
            }
        })
    };

    let runner = ProcessRunner;
    let session = FuzzSession::new(&runner, &bridge, &model.package_name)
        .with_timeout(timeout)
        .with_cancellation(cancel);
    let result = session.run(candidates).await;
    watcher.abort();

    match result {
        Ok(report) => {
            println!("{}", format_report(&report, color));
            Ok(())
        }
        Err(e) if !e.is_fatal() => {
            println!("{}", paint(&e.to_string(), Color::Yellow, color));
            Ok(())
        }
        Err(e) => Err(e).context("Fuzz session failed"),
    }
}

fn select_activities(model: &ManifestModel, exported_only: bool) -> Vec<Activity> {
    if exported_only {
        model.exported_activities().cloned().collect()
    } else {
        model.activities.clone()
    }
}

async fn collect_words(args: &FuzzArgs, config: &Config) -> Result<Vec<String>> {
    let mut words = match &args.wordlist {
        Some(path) => read_wordlist(path)
            .with_context(|| format!("Failed to read wordlist {}", path.display()))?,
        None => Vec::new(),
    };
    if args.mutations > 0 {
        let mutator = Mutator::new(&config.tools.radamsa, config.fuzz.mutation_timeout());
        let generated = mutator
            .generate(&config.fuzz.mutation_seed, args.mutations)
            .await
            .context("Failed to generate mutated words")?;
        info!(requested = args.mutations, generated = generated.len(), "Mutated words ready");
        words.extend(generated);
    }
    Ok(words)
}

fn format_report(report: &SessionReport, color: bool) -> String {
    let headline = match report.outcome {
        SessionOutcome::Completed => paint("Fuzzing complete", Color::Green, color),
        SessionOutcome::Cancelled => paint("Fuzzing cancelled", Color::Yellow, color),
    };
    format!(
        "{}: {}/{} sent, {} ok, {} timed out, {} failed",
        headline,
        report.processed,
        report.generated,
        report.succeeded,
        report.timed_out,
        report.failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkprobe::manifest::parse_manifest;

    fn model() -> ManifestModel {
        parse_manifest(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example">
                <application>
                    <activity android:name=".Main" android:exported="true"/>
                    <activity android:name=".Hidden"/>
                </application>
            </manifest>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_select_activities_exported_only() {
        let model = model();
        assert_eq!(select_activities(&model, false).len(), 2);
        let exported = select_activities(&model, true);
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].qualified_name, "com.example.Main");
    }

    #[test]
    fn test_format_report_plain() {
        let report = SessionReport {
            generated: 4,
            processed: 3,
            succeeded: 1,
            timed_out: 1,
            failed: 1,
            outcome: SessionOutcome::Cancelled,
            states: vec![],
        };
        assert_eq!(
            format_report(&report, false),
            "Fuzzing cancelled: 3/4 sent, 1 ok, 1 timed out, 1 failed"
        );
    }
}
