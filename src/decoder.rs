//! Record assembly
//!
//! Walks the scanned tag positions, cuts the buffer into tag-to-next-tag
//! segments and folds them into records. Metadata tags update the open
//! record's fields; payload tags append raw bytes to it; a new `GUID/` closes
//! the open record.

use crate::archive::{
    trim_bytes, Marker, MetaField, Metadata, Record, SegmentValue, Tag, TagKind, TagOccurrence,
    METADATA_VALUE_LIMIT, UNLABELED_PREFIX,
};
use crate::scanner::find_tag_positions;
use tracing::debug;

// Line terminators that end a metadata value
const CARRIAGE_RETURN: u8 = b'\r';
const NEWLINE: u8 = b'\n';

/// Decodes the records of an archive buffer
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Maximum bytes of a metadata line kept before decoding
    value_limit: usize,
}

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self {
            value_limit: METADATA_VALUE_LIMIT,
        }
    }

    /// Override the metadata value byte limit
    pub fn with_value_limit(mut self, limit: usize) -> Self {
        self.value_limit = limit;
        self
    }

    /// Decode every complete record in the buffer
    pub fn decode(&self, data: &[u8]) -> Vec<Record> {
        self.records(data).collect()
    }

    /// Lazily yield records as each one closes
    pub fn records<'a>(&'a self, data: &'a [u8]) -> Records<'a> {
        Records {
            decoder: self,
            data,
            positions: find_tag_positions(data),
            index: 0,
            assembler: Assembler::new(),
            finished: false,
        }
    }

    /// Interpret one segment according to its tag's kind
    pub fn segment_value<'a>(&self, tag: Tag, raw: &'a [u8]) -> SegmentValue<'a> {
        match tag.kind() {
            TagKind::Metadata(field) => SegmentValue::Meta {
                field,
                text: decode_metadata_value(raw, self.value_limit),
            },
            TagKind::Payload => SegmentValue::Payload(raw),
            TagKind::Inert => SegmentValue::Inert,
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a metadata segment: first line only, at most `limit` bytes,
/// surrounding whitespace trimmed, invalid UTF-8 replaced.
pub fn decode_metadata_value(raw: &[u8], limit: usize) -> String {
    let line_end = raw
        .iter()
        .position(|&b| b == CARRIAGE_RETURN || b == NEWLINE)
        .unwrap_or(raw.len());
    let line = &raw[..line_end.min(limit)];
    String::from_utf8_lossy(trim_bytes(line)).into_owned()
}

/// Iterator over the records of one buffer, see [`Decoder::records`]
pub struct Records<'a> {
    decoder: &'a Decoder,
    data: &'a [u8],
    positions: Vec<TagOccurrence>,
    index: usize,
    assembler: Assembler,
    finished: bool,
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        while let Some(&[current, next]) = self.positions.get(self.index..self.index + 2) {
            self.index += 1;

            let Marker::Tag(tag) = current.marker else {
                continue;
            };
            let raw = &self.data[current.value_start()..next.offset];
            let value = self.decoder.segment_value(tag, raw);
            debug!(offset = current.offset, tag = %tag, len = raw.len(), "segment");

            if let Some(record) = self.assembler.step(value) {
                return Some(record);
            }
        }

        if self.finished {
            return None;
        }
        self.finished = true;
        self.assembler.finish()
    }
}

#[derive(Debug, Default)]
enum State {
    /// No record open
    #[default]
    Idle,
    /// Record open with at least one metadata field
    Open { metadata: Metadata, payload: Vec<u8> },
}

/// Record assembly state machine
///
/// Fed one segment value at a time; returns a record whenever one closes.
#[derive(Debug, Default)]
pub struct Assembler {
    state: State,
    /// Records closed so far, used for placeholder identifiers
    emitted: usize,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Apply one segment, returning the record it closed, if any
    pub fn step(&mut self, value: SegmentValue<'_>) -> Option<Record> {
        match value {
            SegmentValue::Meta {
                field: MetaField::Guid,
                text,
            } => {
                let closed = self.close();
                self.state = State::Open {
                    metadata: Metadata::with_guid(text),
                    payload: Vec::new(),
                };
                closed
            }
            SegmentValue::Meta { field, text } => {
                match &mut self.state {
                    State::Open { metadata, .. } => metadata.set(field, text),
                    State::Idle => {
                        let mut metadata = Metadata::default();
                        metadata.set(field, text);
                        self.state = State::Open {
                            metadata,
                            payload: Vec::new(),
                        };
                    }
                }
                None
            }
            SegmentValue::Payload(bytes) => {
                match &mut self.state {
                    State::Open { payload, .. } => payload.extend_from_slice(bytes),
                    State::Idle => {
                        let guid = format!("{}{}", UNLABELED_PREFIX, self.emitted);
                        debug!(guid = %guid, "payload without metadata");
                        self.state = State::Open {
                            metadata: Metadata::with_guid(guid),
                            payload: bytes.to_vec(),
                        };
                    }
                }
                None
            }
            SegmentValue::Inert => None,
        }
    }

    /// Flush the open record at end of buffer
    pub fn finish(&mut self) -> Option<Record> {
        self.close()
    }

    /// Take the open record, leaving the machine idle
    ///
    /// Only a record with payload is returned; metadata-only records are
    /// discarded.
    fn close(&mut self) -> Option<Record> {
        match std::mem::take(&mut self.state) {
            State::Open { metadata, payload } if !payload.is_empty() => {
                self.emitted += 1;
                Some(Record { metadata, payload })
            }
            State::Open { metadata, .. } => {
                debug!(guid = ?metadata.guid, "dropping record without payload");
                None
            }
            State::Idle => None,
        }
    }
}
