//! Example demonstrating payload type detection
//!
//! A recognized EXT/TYPE hint wins; otherwise the payload bytes are sniffed.

use hvenv::{detect_file_type, FileKind};

fn main() -> anyhow::Result<()> {
    println!("=== Payload Type Detection Example ===\n");

    let samples: Vec<(&str, Vec<u8>, Option<&str>, FileKind)> = vec![
        ("jpeg magic", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10], None, FileKind::Jpeg),
        ("png magic", b"\x89PNG\r\n\x1a\n".to_vec(), None, FileKind::Png),
        ("riff webp", b"RIFF\x10\x00\x00\x00WEBPVP8 ".to_vec(), None, FileKind::Webp),
        ("xml declaration", b"\x0b\n<?xml version=\"1.0\"?>".to_vec(), None, FileKind::Xml),
        ("closing tag", b"<a>b</a>".to_vec(), None, FileKind::Xml),
        ("zip magic", b"PK\x03\x04\x14\x00".to_vec(), None, FileKind::Zip),
        ("text keyword", b"Some Content here".to_vec(), None, FileKind::Text),
        ("hint beats bytes", b"\x89PNG".to_vec(), Some(".jpg"), FileKind::Jpeg),
        ("unknown hint", vec![0xFF, 0xD8, 0xFF], Some("gif"), FileKind::Jpeg),
        ("nothing matches", b"random bytes".to_vec(), None, FileKind::Unknown),
    ];

    println!("Detection Results:");
    println!("-----------------");
    for (i, (name, data, hint, expected)) in samples.iter().enumerate() {
        let kind = detect_file_type(data, *hint);
        println!(
            "{}. {:<17} hint: {:<5} -> {} (.{})",
            i + 1,
            name,
            hint.unwrap_or("-"),
            kind,
            kind.extension()
        );
        assert_eq!(kind, *expected, "{}", name);
    }

    println!("\n✓ All payloads classified as expected!");

    Ok(())
}
