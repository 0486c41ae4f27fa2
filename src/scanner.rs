//! Tag scanning
//!
//! Two independent passes over the raw archive bytes:
//!
//! - [`find_tag_positions`] locates the recognized tags that drive record
//!   assembly and appends an end-of-buffer sentinel.
//! - [`extract_all_tags`] lists every token shaped like a tag, recognized or
//!   not. It is purely diagnostic and never feeds assembly.

use crate::archive::{Marker, Tag, TagOccurrence};
use regex::bytes::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Alternation over every recognized marker, longest first so that no marker
/// can shadow a longer one sharing its prefix.
static RECOGNIZED_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let mut tags = Tag::ALL.to_vec();
    tags.sort_by_key(|tag| std::cmp::Reverse(tag.marker().len()));
    let pattern = tags
        .iter()
        .map(|tag| regex::escape(tag.as_str()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).expect("recognized tag pattern is valid")
});

/// Any run of 2-32 uppercase letters, digits or underscores ending in `/`.
static GENERIC_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z0-9_]{2,32}/").expect("generic tag pattern is valid")
});

/// Find recognized tags in order, followed by an EOF sentinel at `data.len()`.
///
/// Matches never overlap: scanning resumes after the end of each match.
pub fn find_tag_positions(data: &[u8]) -> Vec<TagOccurrence> {
    let mut positions: Vec<TagOccurrence> = RECOGNIZED_TAG_REGEX
        .find_iter(data)
        .filter_map(|m| {
            Tag::from_marker(m.as_bytes()).map(|tag| TagOccurrence::new(m.start(), Marker::Tag(tag)))
        })
        .collect();
    positions.push(TagOccurrence::new(data.len(), Marker::Eof));
    positions
}

/// Every distinct tag-shaped token in the buffer, sorted lexicographically.
pub fn extract_all_tags(data: &[u8]) -> Vec<String> {
    GENERIC_TAG_REGEX
        .find_iter(data)
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
