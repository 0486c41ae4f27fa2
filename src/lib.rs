//! # hvenv
//!
//! Extraction of embedded files from HomeVision `.env` archives.
//!
//! ## Archive Format
//!
//! An `.env` archive is a flat byte stream of uppercase ASCII tags ending in
//! `/`, each followed by its value. A value runs until the next recognized tag
//! or the end of the buffer:
//!
//! ```text
//! GUID/{8F3A...}
//! FILENAME/front_door.jpg
//! EXT/jpg
//! DOCU/<raw JPEG bytes>
//! GUID/{91C2...}
//! ...
//! ```
//!
//! ## Tag Classes
//!
//! - **Metadata tags** (`GUID/`, `FILENAME/`, `EXT/`, `TYPE/`, `SHA1/`,
//!   `DOCTYPE/`): the first line of the value, trimmed, is stored on the
//!   current record.
//! - **Payload tags** (`DOCU/`, `_SIG/`, `IMAGE/`, `OADI/`): the raw value
//!   bytes are appended to the current record's payload.
//! - **Inert tags** (`ENV_GUID/`, `FORM/`, `SUP/`, `XSL/`, `ID/`, `QU/`):
//!   recognized so they end the previous value, otherwise ignored.
//!
//! Any other tag-shaped token is plain data inside the surrounding value.
//!
//! ## Record Rules
//!
//! 1. `GUID/` starts a new record and closes the previous one
//! 2. A payload with no open record gets the identifier `unlabeled_<n>`
//! 3. Records without payload are dropped
//!
//! ## Output
//!
//! [`Extractor`] writes each payload through a [`Sink`], lists every tag-shaped
//! token in `all_tags.txt` and records one [`ManifestEntry`] per file in
//! `metadata.json`.
//!
//! ```rust
//! use hvenv::{Extractor, MemorySink};
//!
//! let mut extractor = Extractor::new(MemorySink::new());
//! extractor.extract(b"GUID/abc\nFILENAME/note.txt\nDOCU/some content")?;
//!
//! assert_eq!(extractor.manifest()[0].filename, "note.txt");
//! assert_eq!(extractor.manifest()[0].file_type, "TEXT");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod archive;
pub mod decoder;
pub mod detect;
pub mod extract;
pub mod sanitize;
pub mod scanner;

pub use archive::{
    ExtractConfig, ManifestEntry, Marker, MetaField, Metadata, Record, SegmentValue, Tag,
    TagKind, TagOccurrence,
};
pub use decoder::{Assembler, Decoder, Records};
pub use detect::{detect_file_type, FileKind};
pub use extract::{DirSink, Extractor, MemorySink, RunReport, Sink};
pub use sanitize::clean_filename;
pub use scanner::{extract_all_tags, find_tag_positions};
