//! Archive data structures

use serde::Serialize;

// Archive format constants
pub const TAG_TERMINATOR: u8 = b'/';
pub const METADATA_VALUE_LIMIT: usize = 1000;
pub const EOF_MARKER: &str = "EOF";
pub const UNLABELED_PREFIX: &str = "unlabeled_";
pub const FALLBACK_PREFIX: &str = "file_";

// Bytes stripped from both ends of metadata values and before XML sniffing
pub const WHITESPACE_BYTES: &[u8] = b" \t\n\r\x0b\x0c";

// Output file defaults
pub const DEFAULT_MANIFEST_FILE: &str = "metadata.json";
pub const DEFAULT_CATALOG_FILE: &str = "all_tags.txt";

/// Strip leading whitespace bytes, vertical tab and form feed included
pub fn trim_start_bytes(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !WHITESPACE_BYTES.contains(b))
        .unwrap_or(data.len());
    &data[start..]
}

/// Strip whitespace bytes from both ends
pub fn trim_bytes(data: &[u8]) -> &[u8] {
    let data = trim_start_bytes(data);
    let end = data
        .iter()
        .rposition(|b| !WHITESPACE_BYTES.contains(b))
        .map_or(0, |i| i + 1);
    &data[..end]
}

/// Behavioral class of a recognized tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Short textual value stored in the record metadata
    Metadata(MetaField),
    /// Raw bytes appended to the record payload
    Payload,
    /// Recognized by the scanner but inert for record assembly
    Inert,
}

/// A metadata field a record can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaField {
    Guid,
    Filename,
    Ext,
    Type,
    Sha1,
    DocType,
}

/// The closed set of tags the scanner recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Guid,
    Filename,
    Ext,
    Type,
    Sha1,
    Docu,
    Sig,
    DocType,
    EnvGuid,
    Form,
    Image,
    Oadi,
    Sup,
    Xsl,
    Id,
    Qu,
}

impl Tag {
    /// Every recognized tag
    pub const ALL: [Tag; 16] = [
        Tag::Guid,
        Tag::Filename,
        Tag::Ext,
        Tag::Type,
        Tag::Sha1,
        Tag::Docu,
        Tag::Sig,
        Tag::DocType,
        Tag::EnvGuid,
        Tag::Form,
        Tag::Image,
        Tag::Oadi,
        Tag::Sup,
        Tag::Xsl,
        Tag::Id,
        Tag::Qu,
    ];

    /// Marker as text, including the trailing `/`
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Guid => "GUID/",
            Tag::Filename => "FILENAME/",
            Tag::Ext => "EXT/",
            Tag::Type => "TYPE/",
            Tag::Sha1 => "SHA1/",
            Tag::Docu => "DOCU/",
            Tag::Sig => "_SIG/",
            Tag::DocType => "DOCTYPE/",
            Tag::EnvGuid => "ENV_GUID/",
            Tag::Form => "FORM/",
            Tag::Image => "IMAGE/",
            Tag::Oadi => "OADI/",
            Tag::Sup => "SUP/",
            Tag::Xsl => "XSL/",
            Tag::Id => "ID/",
            Tag::Qu => "QU/",
        }
    }

    /// Look up a tag by its exact marker bytes
    pub fn from_marker(marker: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.marker() == marker)
    }

    pub fn kind(self) -> TagKind {
        match self {
            Tag::Guid => TagKind::Metadata(MetaField::Guid),
            Tag::Filename => TagKind::Metadata(MetaField::Filename),
            Tag::Ext => TagKind::Metadata(MetaField::Ext),
            Tag::Type => TagKind::Metadata(MetaField::Type),
            Tag::Sha1 => TagKind::Metadata(MetaField::Sha1),
            Tag::DocType => TagKind::Metadata(MetaField::DocType),
            Tag::Docu | Tag::Sig | Tag::Image | Tag::Oadi => TagKind::Payload,
            Tag::EnvGuid | Tag::Form | Tag::Sup | Tag::Xsl | Tag::Id | Tag::Qu => TagKind::Inert,
        }
    }

    /// The marker bytes as they appear in the archive
    pub fn marker(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What sits at a scanned position: a recognized tag or the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Tag(Tag),
    Eof,
}

impl Marker {
    /// Number of marker bytes occupying the buffer at this position
    pub fn len(self) -> usize {
        match self {
            Marker::Tag(tag) => tag.marker().len(),
            Marker::Eof => 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Tag(tag) => tag.as_str(),
            Marker::Eof => EOF_MARKER,
        }
    }
}

/// A position in the buffer where a marker starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOccurrence {
    /// Byte offset of the first marker byte
    pub offset: usize,
    pub marker: Marker,
}

impl TagOccurrence {
    pub fn new(offset: usize, marker: Marker) -> Self {
        Self { offset, marker }
    }

    /// Offset of the first byte after the marker
    pub fn value_start(&self) -> usize {
        self.offset + self.marker.len()
    }
}

/// The value carried by one tag's segment, split by segment kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentValue<'a> {
    /// Decoded, line-limited, trimmed text for a metadata tag
    Meta { field: MetaField, text: String },
    /// Raw segment bytes for a payload tag
    Payload(&'a [u8]),
    /// Segment of a recognized tag that does not take part in assembly
    Inert,
}

/// Fixed-field metadata for one record
///
/// A `None` field was never seen; `Some("")` was seen with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub guid: Option<String>,
    pub filename: Option<String>,
    pub ext: Option<String>,
    pub file_type: Option<String>,
    pub sha1: Option<String>,
    pub doc_type: Option<String>,
}

impl Metadata {
    /// Metadata holding only an identifier
    pub fn with_guid(guid: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            ..Default::default()
        }
    }

    /// True when no field has been set
    pub fn is_empty(&self) -> bool {
        self.guid.is_none()
            && self.filename.is_none()
            && self.ext.is_none()
            && self.file_type.is_none()
            && self.sha1.is_none()
            && self.doc_type.is_none()
    }

    /// Set a field, replacing any earlier value
    pub fn set(&mut self, field: MetaField, value: String) {
        let slot = match field {
            MetaField::Guid => &mut self.guid,
            MetaField::Filename => &mut self.filename,
            MetaField::Ext => &mut self.ext,
            MetaField::Type => &mut self.file_type,
            MetaField::Sha1 => &mut self.sha1,
            MetaField::DocType => &mut self.doc_type,
        };
        *slot = Some(value);
    }

    pub fn get(&self, field: MetaField) -> Option<&str> {
        match field {
            MetaField::Guid => self.guid.as_deref(),
            MetaField::Filename => self.filename.as_deref(),
            MetaField::Ext => self.ext.as_deref(),
            MetaField::Type => self.file_type.as_deref(),
            MetaField::Sha1 => self.sha1.as_deref(),
            MetaField::DocType => self.doc_type.as_deref(),
        }
    }

    /// A field's value if it is present and not blank
    pub fn non_empty(&self, field: MetaField) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    /// Hint for type classification: `EXT` first, then `TYPE`
    pub fn type_hint(&self) -> Option<&str> {
        self.non_empty(MetaField::Ext)
            .or_else(|| self.non_empty(MetaField::Type))
    }
}

/// One embedded file recovered from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub metadata: Metadata,
    /// Concatenated payload segments in encounter order
    pub payload: Vec<u8>,
}

/// One manifest line describing an emitted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub guid: Option<String>,
    pub size_bytes: usize,
    /// Lowercase hex SHA-1 of the payload
    pub sha1: String,
}

/// Configuration for an extraction run
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Manifest file name inside the output directory
    pub manifest_file: String,
    /// Diagnostic tag catalog file name, `None` to skip writing it
    pub catalog_file: Option<String>,
    /// Append the classified extension to names that have none
    pub append_extension: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            catalog_file: Some(DEFAULT_CATALOG_FILE.to_string()),
            append_extension: false,
        }
    }
}
