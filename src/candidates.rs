//! Candidate URI generation and wordlist loading.
//!
//! Two modes:
//! - wordlist mode: every `(word, deep link)` pair, words outer, links inner,
//!   each URI being `link + "/" + word`, not bound to an activity
//! - activity-targeted mode: one candidate per activity, all sharing one URI
//!
//! Both return a `Vec` that the orchestrator consumes once.

use std::path::Path;

use crate::error::{LinkProbeError, Result};
use crate::manifest::Activity;

/// One URI to send to the device, optionally aimed at a specific activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub target: Option<Activity>,
    pub uri: String,
}

impl Candidate {
    pub fn routed(uri: String) -> Self {
        Self { target: None, uri }
    }

    pub fn targeted(activity: Activity, uri: String) -> Self {
        Self {
            target: Some(activity),
            uri,
        }
    }
}

/// Combine deep links with words. Empty inputs produce no candidates.
pub fn wordlist_candidates(deep_links: &[String], words: &[String]) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(words.len() * deep_links.len());
    for word in words {
        for link in deep_links {
            candidates.push(Candidate::routed(format!("{}/{}", link, word)));
        }
    }
    candidates
}

/// Aim `url` at each activity in order.
pub fn activity_candidates(url: &str, activities: &[Activity]) -> Vec<Candidate> {
    activities
        .iter()
        .map(|activity| Candidate::targeted(activity.clone(), url.to_string()))
        .collect()
}

/// Read a newline-delimited wordlist. Blank lines are kept as empty words.
pub fn read_wordlist(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| {
        LinkProbeError::Wordlist(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(parse_wordlist(&String::from_utf8_lossy(&bytes)))
}

pub(crate) fn parse_wordlist(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wordlist_example_order() {
        let c = wordlist_candidates(&strings(&["myapp://open"]), &strings(&["admin", "x"]));
        let uris: Vec<_> = c.iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(uris, vec!["myapp://open/admin", "myapp://open/x"]);
        assert!(c.iter().all(|c| c.target.is_none()));
    }

    #[test]
    fn test_wordlist_words_outer_links_inner() {
        let c = wordlist_candidates(&strings(&["a://1", "b://2"]), &strings(&["x", "y"]));
        let uris: Vec<_> = c.iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(uris, vec!["a://1/x", "b://2/x", "a://1/y", "b://2/y"]);
    }

    #[test]
    fn test_wordlist_count_is_product() {
        let links = strings(&["a://1", "b://2", "c://3"]);
        let words = strings(&["w1", "", "w3", "w4"]);
        assert_eq!(wordlist_candidates(&links, &words).len(), 12);
    }

    #[test]
    fn test_blank_word_yields_trailing_slash() {
        let c = wordlist_candidates(&strings(&["myapp://open"]), &strings(&[""]));
        assert_eq!(c[0].uri, "myapp://open/");
    }

    #[test]
    fn test_empty_inputs_yield_nothing() {
        assert!(wordlist_candidates(&[], &strings(&["a"])).is_empty());
        assert!(wordlist_candidates(&strings(&["a://b"]), &[]).is_empty());
        assert!(activity_candidates("myapp://x", &[]).is_empty());
    }

    #[test]
    fn test_activity_candidates_share_url() {
        let activities = vec![
            Activity::new("com.a.One", true),
            Activity::new("com.a.Two", false),
        ];
        let c = activity_candidates("myapp://open/../admin", &activities);
        assert_eq!(c.len(), 2);
        assert!(c.iter().all(|c| c.uri == "myapp://open/../admin"));
        assert_eq!(c[0].target.as_ref().unwrap().qualified_name, "com.a.One");
        assert_eq!(c[1].target.as_ref().unwrap().qualified_name, "com.a.Two");
    }

    #[test]
    fn test_parse_wordlist_keeps_blank_lines() {
        assert_eq!(parse_wordlist("a\n\nb\n"), strings(&["a", "", "b"]));
        assert_eq!(parse_wordlist("a\r\nb"), strings(&["a", "b"]));
        assert!(parse_wordlist("").is_empty());
    }

    #[test]
    fn test_read_wordlist_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("words.txt");
        std::fs::write(&path, "admin\n\n../etc\n").unwrap();
        assert_eq!(read_wordlist(&path).unwrap(), strings(&["admin", "", "../etc"]));
    }

    #[test]
    fn test_read_wordlist_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_wordlist(&tmp.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, LinkProbeError::Wordlist(_)));
        assert!(err.to_string().contains("nope.txt"));
    }
}
