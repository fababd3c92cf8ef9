//! Link classification.
//!
//! Partitions every `<data>` declaration in a [`ManifestModel`] into deep
//! links, web links, and app links. Classification preserves declaration
//! order and does not deduplicate.

use serde::Serialize;

use crate::manifest::{DataSpec, ManifestModel};

/// Category a declared URI template falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Custom (non-http/https) scheme.
    Deep,
    /// http/https without verified ownership.
    Web,
    /// http/https with `autoVerify="true"`.
    App,
}

/// The three disjoint link sequences found in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSet {
    pub deep_links: Vec<String>,
    pub web_links: Vec<String>,
    pub app_links: Vec<String>,
}

impl LinkSet {
    pub fn len(&self) -> usize {
        self.deep_links.len() + self.web_links.len() + self.app_links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, kind: LinkKind, uri: String) {
        match kind {
            LinkKind::Deep => self.deep_links.push(uri),
            LinkKind::Web => self.web_links.push(uri),
            LinkKind::App => self.app_links.push(uri),
        }
    }
}

/// Classify one data declaration.
///
/// Returns `None` for an empty scheme. Scheme comparison is exact, so
/// `HTTP` counts as a custom scheme. Only the declaration's own
/// `autoVerify` counts; the enclosing filter's flag is kept on
/// [`IntentFilter`](crate::manifest::IntentFilter) for reporting.
pub fn classify_data(data: &DataSpec) -> Option<LinkKind> {
    match data.scheme.as_str() {
        "" => None,
        "http" | "https" if data.auto_verify => Some(LinkKind::App),
        "http" | "https" => Some(LinkKind::Web),
        _ => Some(LinkKind::Deep),
    }
}

/// Classify every data declaration in document order.
pub fn classify(model: &ManifestModel) -> LinkSet {
    let mut links = LinkSet::default();
    for filter in &model.intent_filters {
        for data in &filter.data_entries {
            if let Some(kind) = classify_data(data) {
                links.push(kind, data.uri_template());
            }
        }
    }
    tracing::debug!(
        deep = links.deep_links.len(),
        web = links.web_links.len(),
        app = links.app_links.len(),
        "classified manifest links"
    );
    links
}
