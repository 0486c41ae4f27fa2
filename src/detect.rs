//! Payload type detection
//!
//! A declared extension or type hint wins when it names a known type.
//! Otherwise the payload is sniffed; first matching rule wins:
//!
//! 1. `FF D8 FF` prefix → JPEG
//! 2. `89 50 4E 47` prefix → PNG
//! 3. `RIFF` prefix with `WEBP` in the first 20 bytes → WEBP
//! 4. `<?xml` after leading whitespace, or `</` in the first 200 bytes → XML
//! 5. `PK 03 04` prefix → ZIP
//! 6. `content` (any case) in the first 300 bytes → TEXT
//! 7. Otherwise → Unknown
//!
//! The XML and TEXT rules are loose and can misfire on binary data. The order
//! is kept as is for output compatibility.

use crate::archive::trim_start_bytes;

// Magic numbers
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_FOURCC: &[u8] = b"WEBP";
const ZIP_MAGIC: &[u8] = &[b'P', b'K', 0x03, 0x04];
const XML_DECLARATION: &[u8] = b"<?xml";
const XML_CLOSING_TAG: &[u8] = b"</";
const TEXT_KEYWORD: &[u8] = b"content";

// Sniffing windows
const WEBP_WINDOW: usize = 20;
const XML_WINDOW: usize = 200;
const TEXT_WINDOW: usize = 300;

/// Classified payload type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Jpeg,
    Png,
    Webp,
    Xml,
    Zip,
    Text,
    Unknown,
}

impl FileKind {
    /// Canonical extension, lowercase, without a leading dot
    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Jpeg => "jpg",
            FileKind::Png => "png",
            FileKind::Webp => "webp",
            FileKind::Xml => "xml",
            FileKind::Zip => "zip",
            FileKind::Text => "txt",
            FileKind::Unknown => "bin",
        }
    }

    /// Human-readable label used in the manifest
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Jpeg => "JPEG",
            FileKind::Png => "PNG",
            FileKind::Webp => "WEBP",
            FileKind::Xml => "XML",
            FileKind::Zip => "ZIP",
            FileKind::Text => "TEXT",
            FileKind::Unknown => "Unknown",
        }
    }

    /// Map a declared extension or type name to a kind
    ///
    /// Case-insensitive, surrounding whitespace and one leading `.` ignored.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_ascii_lowercase();
        let hint = hint.strip_prefix('.').unwrap_or(&hint);
        match hint {
            "jpg" | "jpeg" => Some(FileKind::Jpeg),
            "png" => Some(FileKind::Png),
            "webp" => Some(FileKind::Webp),
            "xml" => Some(FileKind::Xml),
            "zip" => Some(FileKind::Zip),
            "txt" | "text" => Some(FileKind::Text),
            _ => None,
        }
    }

    /// Sniff the payload bytes
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(JPEG_MAGIC) {
            FileKind::Jpeg
        } else if data.starts_with(PNG_MAGIC) {
            FileKind::Png
        } else if data.starts_with(RIFF_MAGIC) && contains(window(data, WEBP_WINDOW), WEBP_FOURCC) {
            FileKind::Webp
        } else if trim_start_bytes(data).starts_with(XML_DECLARATION)
            || contains(window(data, XML_WINDOW), XML_CLOSING_TAG)
        {
            FileKind::Xml
        } else if data.starts_with(ZIP_MAGIC) {
            FileKind::Zip
        } else if contains(&window(data, TEXT_WINDOW).to_ascii_lowercase(), TEXT_KEYWORD) {
            FileKind::Text
        } else {
            FileKind::Unknown
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a payload, trusting a recognized hint over the content
pub fn detect_file_type(data: &[u8], hint: Option<&str>) -> FileKind {
    hint.and_then(FileKind::from_hint)
        .unwrap_or_else(|| FileKind::sniff(data))
}

fn window(data: &[u8], len: usize) -> &[u8] {
    &data[..data.len().min(len)]
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detect_file_type_by_ext() {
        assert_eq!(detect_file_type(b"", Some("jpg")), FileKind::Jpeg);
        assert_eq!(detect_file_type(b"", Some(".JPEG")), FileKind::Jpeg);
        assert_eq!(detect_file_type(b"", Some(" png ")), FileKind::Png);
        assert_eq!(detect_file_type(b"", Some(".webp")), FileKind::Webp);
        assert_eq!(detect_file_type(b"", Some("XML")), FileKind::Xml);
        assert_eq!(detect_file_type(b"", Some("zip")), FileKind::Zip);
        assert_eq!(detect_file_type(b"", Some("text")), FileKind::Text);
        assert_eq!(detect_file_type(b"", Some(".txt")), FileKind::Text);
    }

    #[test]
    fn test_detect_file_type_hint_beats_content() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A];
        assert_eq!(detect_file_type(&png, Some("jpg")), FileKind::Jpeg);
    }

    #[test]
    fn test_detect_file_type_unknown_hint_falls_back() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detect_file_type(&jpeg, Some("gif")), FileKind::Jpeg);
        assert_eq!(detect_file_type(&jpeg, Some("")), FileKind::Jpeg);
        assert_eq!(detect_file_type(&jpeg, Some("..jpg")), FileKind::Jpeg);
    }

    #[test]
    fn test_detect_file_type_by_blob() {
        assert_eq!(detect_file_type(b"\xFF\xD8\xFFextra_data_here", None), FileKind::Jpeg);
        assert_eq!(detect_file_type(b"\x89PNG\r\n\x1a\n", None), FileKind::Png);
        assert_eq!(detect_file_type(b"RIFF\x10\x00\x00\x00WEBPVP8 ", None), FileKind::Webp);
        assert_eq!(detect_file_type(b"PK\x03\x04\x14\x00", None), FileKind::Zip);
    }

    #[test]
    fn test_detect_file_type_riff_without_webp() {
        assert_eq!(detect_file_type(b"RIFF\x10\x00\x00\x00WAVEfmt ", None), FileKind::Unknown);
    }

    #[test]
    fn test_detect_file_type_webp_before_xml() {
        let mut data = b"RIFF\x00\x00\x00\x00WEBP".to_vec();
        data.extend_from_slice(b"</x>");
        assert_eq!(detect_file_type(&data, None), FileKind::Webp);
    }

    #[test]
    fn test_detect_file_type_xml() {
        assert_eq!(detect_file_type(b"  \n<?xml version=\"1.0\"?>", None), FileKind::Xml);
        assert_eq!(detect_file_type(b"<root><a/></root>", None), FileKind::Xml);
    }

    #[test]
    fn test_detect_file_type_xml_after_vertical_tab() {
        assert_eq!(detect_file_type(b"\x0b<?xml version", None), FileKind::Xml);
        assert_eq!(detect_file_type(b"\x0c\x0b\n<?xml", None), FileKind::Xml);
    }

    #[test]
    fn test_detect_file_type_xml_closing_tag_window() {
        let mut data = vec![b'a'; 199];
        data.extend_from_slice(b"</");
        // "</" straddles byte 200
        assert_eq!(detect_file_type(&data, None), FileKind::Unknown);

        let mut data = vec![b'a'; 198];
        data.extend_from_slice(b"</");
        assert_eq!(detect_file_type(&data, None), FileKind::Xml);
    }

    #[test]
    fn test_detect_file_type_zip_with_closing_tag_is_xml() {
        let mut data = b"PK\x03\x04".to_vec();
        data.extend_from_slice(b"</");
        assert_eq!(detect_file_type(&data, None), FileKind::Xml);
    }

    #[test]
    fn test_detect_file_type_text_content() {
        let blob = b"This file contains some content that is readable.";
        assert_eq!(detect_file_type(blob, None), FileKind::Text);
        assert_eq!(detect_file_type(b"CONTENT-TYPE", None), FileKind::Text);
    }

    #[test]
    fn test_detect_file_type_text_window() {
        let mut data = vec![b'x'; 295];
        data.extend_from_slice(b"content");
        assert_eq!(detect_file_type(&data, None), FileKind::Unknown);
    }

    #[test]
    fn test_detect_file_type_unknown() {
        let blob = b"randombinarydatawithnorecognizableheaders";
        assert_eq!(detect_file_type(blob, None), FileKind::Unknown);
        assert_eq!(detect_file_type(b"", None), FileKind::Unknown);
    }

    #[test]
    fn test_file_kind_extension_and_label() {
        assert_eq!(FileKind::Jpeg.extension(), "jpg");
        assert_eq!(FileKind::Text.extension(), "txt");
        assert_eq!(FileKind::Unknown.extension(), "bin");
        assert_eq!(FileKind::Unknown.label(), "Unknown");
        assert_eq!(FileKind::Webp.to_string(), "WEBP");
    }

    proptest! {
        #[test]
        fn prop_detect_is_total_and_deterministic(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            hint in proptest::option::of(".*"),
        ) {
            let copy = data.clone();
            let first = detect_file_type(&data, hint.as_deref());
            let second = detect_file_type(&data, hint.as_deref());
            prop_assert_eq!(first, second);
            prop_assert_eq!(&data, &copy);
            prop_assert!(!first.extension().is_empty());
        }

        #[test]
        fn prop_known_hint_ignores_payload(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(detect_file_type(&data, Some("jpg")), FileKind::Jpeg);
            prop_assert_eq!(detect_file_type(&data, Some(".zip")), FileKind::Zip);
        }
    }
}
