use std::sync::LazyLock;

use regex::Regex;

use crate::model::Snapshot;

/// Anchor tag followed by the listing's `DD-Mon-YYYY HH:MM` modification
/// token. Anything that doesn't match is unrelated markup and is skipped.
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="([^"]+)">.*?</a>\s+(\d{2}-[A-Za-z]{3}-\d{4} \d{2}:\d{2})"#)
        .expect("entry pattern compiles")
});

/// Parent-directory link emitted by the listing; never a real entry.
const PARENT_LINK: &str = "../";

/// Extracts a name -> timestamp mapping from a raw directory-listing page.
///
/// The scan is global, left-to-right, and non-overlapping. Malformed or
/// truncated anchor/timestamp pairs simply don't match; a page with zero
/// entries parses to an empty snapshot, not an error. Names that collapse
/// after the trailing-slash strip keep the last timestamp seen.
pub fn parse(raw: &str) -> Snapshot {
    let mut entries = Snapshot::new();
    for caps in ENTRY_RE.captures_iter(raw) {
        let target = &caps[1];
        if target == PARENT_LINK {
            continue;
        }
        let name = target.strip_suffix('/').unwrap_or(target);
        entries.insert(name.to_string(), caps[2].to_string());
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn strips_one_trailing_separator_only() {
        let raw = r#"<a href="a//">a//</a>  01-Jan-2024 00:00"#;
        let snap = parse(raw);
        assert_eq!(snap.get("a/").map(String::as_str), Some("01-Jan-2024 00:00"));
    }

    #[test]
    fn last_match_wins_for_colliding_names() {
        let raw = concat!(
            r#"<a href="pkg/">pkg/</a>  01-Jan-2024 00:00"#,
            "\n",
            r#"<a href="pkg">pkg</a>  02-Feb-2024 10:30"#,
        );
        let snap = parse(raw);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get("pkg").map(String::as_str), Some("02-Feb-2024 10:30"));
    }
}
