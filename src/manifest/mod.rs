//! In-memory model of the routing-relevant subset of an Android manifest.
//!
//! The model is built once per run from the decoded `AndroidManifest.xml`
//! (see [`parse`]) and is read-only afterwards.

pub mod parse;

use std::path::Path;

use serde::Serialize;

use crate::error::{LinkProbeError, Result};

pub use parse::parse_manifest;

/// A single `<data>` declaration inside an intent filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataSpec {
    /// URI scheme, possibly empty.
    pub scheme: String,
    /// URI host, possibly empty.
    pub host: String,
    /// `autoVerify` attribute on the `<data>` element itself.
    pub auto_verify: bool,
}

impl DataSpec {
    pub fn new(scheme: &str, host: &str, auto_verify: bool) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            auto_verify,
        }
    }

    /// `scheme://host` template for this declaration.
    pub fn uri_template(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// An `<intent-filter>` under an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntentFilter {
    /// `autoVerify` attribute on the `<intent-filter>` element. Reported
    /// only; link classification reads [`DataSpec::auto_verify`].
    pub auto_verify: bool,
    pub data_entries: Vec<DataSpec>,
}

/// An `<activity>` declared under `<application>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub qualified_name: String,
    pub exported: bool,
}

impl Activity {
    pub fn new(qualified_name: &str, exported: bool) -> Self {
        Self {
            qualified_name: qualified_name.to_string(),
            exported,
        }
    }
}

/// Routing-relevant view of a decoded manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestModel {
    pub package_name: String,
    /// All intent filters, in document order across activities.
    pub intent_filters: Vec<IntentFilter>,
    /// All activities, in document order.
    pub activities: Vec<Activity>,
}

impl ManifestModel {
    /// Activities reachable from outside the application.
    pub fn exported_activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(|a| a.exported)
    }
}

/// Read and parse the manifest at `path`.
///
/// An unreadable file maps to [`LinkProbeError::MissingManifest`]; invalid
/// markup maps to [`LinkProbeError::MalformedManifest`].
pub fn load_manifest(path: &Path) -> Result<ManifestModel> {
    let bytes = std::fs::read(path).map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "manifest unreadable");
        LinkProbeError::MissingManifest(path.to_path_buf())
    })?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| LinkProbeError::MalformedManifest(format!("not valid UTF-8: {}", e)))?;
    parse_manifest(text)
}

/// Manifest boolean attributes are true only for the literal `"true"`.
pub(crate) fn literal_true(value: Option<&str>) -> bool {
    value == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_literal_true_only() {
        assert!(literal_true(Some("true")));
        assert!(!literal_true(Some("True")));
        assert!(!literal_true(Some("1")));
        assert!(!literal_true(Some("")));
        assert!(!literal_true(None));
    }

    #[test]
    fn test_uri_template_keeps_empty_host() {
        assert_eq!(DataSpec::new("myapp", "", false).uri_template(), "myapp://");
        assert_eq!(
            DataSpec::new("https", "example.com", true).uri_template(),
            "https://example.com"
        );
    }

    #[test]
    fn test_exported_activities_filter() {
        let model = ManifestModel {
            package_name: "com.example".into(),
            intent_filters: vec![],
            activities: vec![
                Activity::new("com.example.Main", true),
                Activity::new("com.example.Hidden", false),
            ],
        };
        let names: Vec<_> = model
            .exported_activities()
            .map(|a| a.qualified_name.as_str())
            .collect();
        assert_eq!(names, vec!["com.example.Main"]);
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("AndroidManifest.xml");
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, LinkProbeError::MissingManifest(p) if p == path));
    }

    #[test]
    fn test_load_manifest_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("AndroidManifest.xml");
        std::fs::write(
            &path,
            r#"<manifest package="com.example"><application>
                 <activity android:name=".Main" android:exported="true"/>
               </application></manifest>"#,
        )
        .unwrap();
        let model = load_manifest(&path).unwrap();
        assert_eq!(model.package_name, "com.example");
        assert_eq!(model.activities, vec![Activity::new("com.example.Main", true)]);
    }

    #[test]
    fn test_load_manifest_rejects_binary_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("AndroidManifest.xml");
        std::fs::write(&path, [0x03u8, 0x00, 0x08, 0x00, 0xff, 0xfe]).unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, LinkProbeError::MalformedManifest(_)));
    }
}
