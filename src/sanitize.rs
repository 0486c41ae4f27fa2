//! Filesystem-safe names

use regex::Regex;
use std::sync::LazyLock;

/// Runs of characters that are not allowed in file names on common platforms.
static FORBIDDEN_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\\/:"*?<>|]+"#).expect("forbidden character pattern is valid")
});

const REPLACEMENT: &str = "_";

/// Turn a raw metadata value into a name safe to create on disk.
///
/// Line breaks are removed, surrounding whitespace trimmed, each run of
/// forbidden characters collapsed to `_`, and trailing dots dropped. Applying
/// it twice gives the same result as applying it once.
pub fn clean_filename(name: &str) -> String {
    let name: String = name.chars().filter(|&c| c != '\r' && c != '\n').collect();
    let name = FORBIDDEN_RUN_REGEX.replace_all(name.trim(), REPLACEMENT);
    // Whitespace exposed by dropping dots must go too, or a second pass would trim it
    name.trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_filename() {
        let dirty = "some:/weird\\file*name?.txt";
        assert_eq!(clean_filename(dirty), "some_weird_file_name_.txt");
    }

    #[test]
    fn test_clean_filename_strips_line_breaks_and_whitespace() {
        assert_eq!(clean_filename("  photo\r\n.jpg  "), "photo.jpg");
        assert_eq!(clean_filename("a\nb"), "ab");
    }

    #[test]
    fn test_clean_filename_collapses_runs() {
        assert_eq!(clean_filename("a<>|b"), "a_b");
        assert_eq!(clean_filename("\"quoted\""), "_quoted_");
    }

    #[test]
    fn test_clean_filename_trailing_dots() {
        assert_eq!(clean_filename("report..."), "report");
        assert_eq!(clean_filename("abc ."), "abc");
        assert_eq!(clean_filename(".hidden"), ".hidden");
    }

    #[test]
    fn test_clean_filename_plain_name_unchanged() {
        assert_eq!(clean_filename("pic.jpg"), "pic.jpg");
        assert_eq!(clean_filename("{1234-ABCD}"), "{1234-ABCD}");
    }

    #[test]
    fn test_clean_filename_degenerate_inputs() {
        assert_eq!(clean_filename(""), "");
        assert_eq!(clean_filename("..."), "");
        assert_eq!(clean_filename("***"), "_");
        assert_eq!(clean_filename("\r\n"), "");
    }

    proptest! {
        #[test]
        fn prop_clean_filename_idempotent(name in ".*") {
            let once = clean_filename(&name);
            prop_assert_eq!(clean_filename(&once), once.clone());
        }

        #[test]
        fn prop_clean_filename_has_no_forbidden_chars(name in ".*") {
            let cleaned = clean_filename(&name);
            prop_assert!(!cleaned.contains(['\\', '/', ':', '"', '*', '?', '<', '>', '|', '\r', '\n']));
        }
    }
}
