//! Terminal presentation: banner, colors, and link summaries.
//!
//! Colors are plain ANSI escapes and are suppressed when `NO_COLOR` is set.

use crate::links::LinkSet;
use crate::manifest::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
            Color::Cyan => "\x1b[36m",
        }
    }
}

const RESET: &str = "\x1b[0m";

pub const BANNER: &str = "
 ┬  ┬┌┐┌┬┌─┌─┐┬─┐┌─┐┌┐ ┌─┐
 │  ││││├┴┐├─┘├┬┘│ │├┴┐├┤
 ┴─┘┴┘└┘┴ ┴┴  ┴└─└─┘└─┘└─┘
";

/// Whether escapes should be emitted (`NO_COLOR` unset).
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Wrap `text` in `color` when `enabled`.
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", color.code(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Three-line summary of discovered links.
pub fn format_link_summary(links: &LinkSet, color: bool) -> String {
    let rows = [
        ("Deep links", &links.deep_links),
        ("Web links", &links.web_links),
        ("App links", &links.app_links),
    ];
    rows.iter()
        .map(|(label, items)| {
            format!(
                "{} {}",
                paint(&format!("{} found:", label), Color::Blue, color),
                paint(&format_list(items), Color::Green, color)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Activity listing for list-only mode, one per line.
pub fn format_activities(activities: &[Activity], color: bool) -> String {
    if activities.is_empty() {
        return paint("No activities declared.", Color::Yellow, color);
    }
    let mut out = paint("Activities:", Color::Blue, color);
    for activity in activities {
        let flag = if activity.exported {
            paint("exported", Color::Red, color)
        } else {
            "internal".to_string()
        };
        out.push_str(&format!("\n  - {} ({})", activity.qualified_name, flag));
    }
    out
}

fn format_list(items: &[String]) -> String {
    format!("[{}]", items.join(" "))
}

/// `Uri` accessors worth grepping for in link handlers.
pub const URI_HANDLING_TIPS: &[(&str, &str, &str)] = &[
    ("getPath()", "Returns the path part of the URI.", "String path = uri.getPath();"),
    ("getScheme()", "Returns the URI scheme (http, https, myapp, ...).", "String scheme = uri.getScheme();"),
    ("getHost()", "Returns the URI host.", "String host = uri.getHost();"),
    ("getQueryParameter(String key)", "Returns the value of one query parameter.", "String value = uri.getQueryParameter(\"id\");"),
    ("getFragment()", "Returns the fragment (the part after '#').", "String fragment = uri.getFragment();"),
    ("getAuthority()", "Returns the authority, usually host plus port.", "String authority = uri.getAuthority();"),
    ("getLastPathSegment()", "Returns the last path segment.", "String lastSegment = uri.getLastPathSegment();"),
    ("getPathSegments()", "Returns the list of path segments.", "List<String> segments = uri.getPathSegments();"),
    ("startsWith(String prefix)", "Checks a string prefix; often used for naive path allow-lists.", "boolean isWeb = uri.getPath().startsWith(\"/web\");"),
    ("Intent.getData()", "Returns the URI that started the intent.", "Uri uri = intent.getData();"),
];

pub fn format_tips() -> String {
    let mut out = String::from("Common functions for handling web links, deep links, and app links:");
    for (i, (name, what, example)) in URI_HANDLING_TIPS.iter().enumerate() {
        out.push_str(&format!("\n{}. {} - {}\n   Example: {}", i + 1, name, what, example));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_disabled_is_plain() {
        assert_eq!(paint("x", Color::Red, false), "x");
        assert_eq!(paint("x", Color::Red, true), "\x1b[31mx\x1b[0m");
    }

    #[test]
    fn test_link_summary_plain() {
        let links = LinkSet {
            deep_links: vec!["myapp://open".into(), "myapp://cart".into()],
            web_links: vec![],
            app_links: vec!["https://example.com".into()],
        };
        assert_eq!(
            format_link_summary(&links, false),
            "Deep links found: [myapp://open myapp://cart]\n\
             Web links found: []\n\
             App links found: [https://example.com]"
        );
    }

    #[test]
    fn test_format_activities() {
        let out = format_activities(
            &[
                Activity::new("com.a.Main", true),
                Activity::new("com.a.Internal", false),
            ],
            false,
        );
        assert_eq!(
            out,
            "Activities:\n  - com.a.Main (exported)\n  - com.a.Internal (internal)"
        );
        assert_eq!(format_activities(&[], false), "No activities declared.");
    }

    #[test]
    fn test_tips_are_numbered() {
        let tips = format_tips();
        assert!(tips.contains("1. getPath()"));
        assert!(tips.contains("10. Intent.getData()"));
    }
}
