//! Basic example of decoding a HomeVision .env archive and extracting its records

use hvenv::{extract_all_tags, Decoder, Extractor, MemorySink};

fn main() -> anyhow::Result<()> {
    println!("=== hvenv Basic Example ===\n");

    // Build a small archive: a JPEG with an explicit name, then an XML document
    let mut data = b"GUID/{A1}\nFILENAME/photo.jpg\nEXT/jpg\nDOCU/".to_vec();
    data.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    data.extend_from_slice(b"GUID/{B2}\nTYPE/xml\nDOCU/<?xml version=\"1.0\"?><root/>");

    println!("Archive ({} bytes)\n", data.len());

    // Tag catalog
    println!("Tags found:");
    for tag in extract_all_tags(&data) {
        println!("  {}", tag);
    }
    println!();

    // Decode records without writing anything
    let records = Decoder::new().decode(&data);
    println!("Decoded {} records:", records.len());
    for record in &records {
        println!(
            "  guid: {:<6} filename: {:<10} payload: {} bytes",
            record.metadata.guid.as_deref().unwrap_or("-"),
            record.metadata.filename.as_deref().unwrap_or("-"),
            record.payload.len()
        );
    }
    println!();
    assert_eq!(records.len(), 2);

    // Extract into memory and build the manifest
    let mut extractor = Extractor::new(MemorySink::new());
    extractor.extract(&data)?;
    extractor.finish()?;

    println!("Manifest:");
    for entry in extractor.manifest() {
        println!("  {} [{}] {} bytes sha1={}", entry.filename, entry.file_type, entry.size_bytes, entry.sha1);
    }
    println!();

    let manifest = extractor.manifest();
    assert_eq!(manifest[0].filename, "photo.jpg");
    assert_eq!(manifest[0].file_type, "JPEG");
    assert_eq!(manifest[1].filename, "{B2}");
    assert_eq!(manifest[1].file_type, "XML");
    assert_eq!(extractor.sink().get("photo.jpg"), Some(&[0xFF, 0xD8, 0xFF, 0xE0][..]));
    assert!(extractor.sink().get("metadata.json").is_some());

    println!("✓ Archive extracted successfully!");

    Ok(())
}
