//! Decoded-manifest reader built on quick-xml's event API.
//!
//! Walks the document once, tracking the open-element path by local name:
//! - `application/activity` yields an [`Activity`]
//! - `application/activity/intent-filter` yields an [`IntentFilter`]
//! - `application/activity/intent-filter/data` yields a [`DataSpec`]
//!
//! Paths are relative to the root element, whose name is not checked. The
//! root's `package` attribute becomes the model's package name. Reading
//! stops when the first root element closes.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{LinkProbeError, Result};

use super::{literal_true, Activity, DataSpec, IntentFilter, ManifestModel};

const ACTIVITY_PATH: &[&str] = &["application"];
const FILTER_PATH: &[&str] = &["application", "activity"];
const DATA_PATH: &[&str] = &["application", "activity", "intent-filter"];

/// Parse decoded manifest text into a [`ManifestModel`].
///
/// Well-formed markup that lacks activities or intent filters yields a model
/// with empty sequences. Scheme and host strings are taken verbatim.
pub fn parse_manifest(text: &str) -> Result<ManifestModel> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut model = ManifestModel::default();
    let mut open: Vec<String> = Vec::new();
    let mut saw_root = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(LinkProbeError::MalformedManifest(format!(
                    "{} at byte {}",
                    e,
                    reader.error_position()
                )));
            }
        };

        match event {
            Event::Start(ref e) => {
                visit_element(&mut model, &open, e)?;
                open.push(local_name(e));
                saw_root = true;
            }
            Event::Empty(ref e) => {
                visit_element(&mut model, &open, e)?;
                saw_root = true;
                if open.is_empty() {
                    break;
                }
            }
            Event::End(ref e) => {
                if open.pop().is_none() {
                    return Err(LinkProbeError::MalformedManifest(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.local_name().as_ref())
                    )));
                }
                // Only the first top-level element is the manifest.
                if open.is_empty() {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(LinkProbeError::MalformedManifest(format!(
            "unexpected end of document inside <{}>",
            unclosed
        )));
    }
    if !saw_root {
        return Err(LinkProbeError::MalformedManifest(
            "document has no root element".into(),
        ));
    }

    let package = model.package_name.clone();
    for activity in &mut model.activities {
        activity.qualified_name = qualify_activity_name(&package, &activity.qualified_name);
    }

    tracing::debug!(
        package = %model.package_name,
        intent_filters = model.intent_filters.len(),
        activities = model.activities.len(),
        "parsed manifest"
    );
    Ok(model)
}

fn visit_element(model: &mut ManifestModel, open: &[String], e: &BytesStart<'_>) -> Result<()> {
    let Some((_root, path)) = open.split_first() else {
        model.package_name = attribute(e, "package")?.unwrap_or_default();
        return Ok(());
    };

    let name = local_name(e);
    if path_is(path, ACTIVITY_PATH) && name == "activity" {
        model.activities.push(Activity {
            qualified_name: attribute(e, "name")?.unwrap_or_default(),
            exported: literal_true(attribute(e, "exported")?.as_deref()),
        });
    } else if path_is(path, FILTER_PATH) && name == "intent-filter" {
        model.intent_filters.push(IntentFilter {
            auto_verify: literal_true(attribute(e, "autoVerify")?.as_deref()),
            data_entries: Vec::new(),
        });
    } else if path_is(path, DATA_PATH) && name == "data" {
        let data = DataSpec {
            scheme: attribute(e, "scheme")?.unwrap_or_default(),
            host: attribute(e, "host")?.unwrap_or_default(),
            auto_verify: literal_true(attribute(e, "autoVerify")?.as_deref()),
        };
        // A <data> can only sit inside the filter opened last.
        if let Some(filter) = model.intent_filters.last_mut() {
            filter.data_entries.push(data);
        }
    }
    Ok(())
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Look up an attribute by local name, so `android:scheme` matches `scheme`.
fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            LinkProbeError::MalformedManifest(format!(
                "invalid attribute on <{}>: {}",
                local_name(e),
                err
            ))
        })?;
        if attr.key.local_name().as_ref() != key.as_bytes() {
            continue;
        }
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw).map_err(|err| {
            LinkProbeError::MalformedManifest(format!("invalid value for '{}': {}", key, err))
        })?;
        return Ok(Some(value.into_owned()));
    }
    Ok(None)
}

/// Expand `.Main` or `Main` against the package, as the platform does.
fn qualify_activity_name(package: &str, name: &str) -> String {
    if package.is_empty() || name.is_empty() {
        return name.to_string();
    }
    if name.starts_with('.') {
        format!("{}{}", package, name)
    } else if !name.contains('.') {
        format!("{}.{}", package, name)
    } else {
        name.to_string()
    }
}
