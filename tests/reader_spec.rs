mod common;

use std::fs;
use std::io::Cursor;

use common::{body, ext_text, BlockBuilder, ContainerBuilder, ENCRYPTED};
use pdic_reader::export::{write_entries, OutputEncoding, OutputFormat};
use pdic_reader::{bocu1, Entry, PdicError, PdicReader};

fn open(bytes: Vec<u8>) -> PdicReader<Cursor<Vec<u8>>> {
    PdicReader::from_reader(Cursor::new(bytes)).expect("open container")
}

fn words(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.word.as_str()).collect()
}

#[test]
fn single_entry_dictionary() {
    let bytes = ContainerBuilder::new()
        .block(BlockBuilder::new().entry("cat", "neko"))
        .build();
    let mut reader = open(bytes);
    assert_eq!(reader.header().title, "PDIC Unicode test");
    assert_eq!(reader.num_blocks(), 1);

    let entries = reader.collect_entries().expect("entries ok");
    assert_eq!(
        entries,
        vec![Entry {
            keyword: "cat".to_string(),
            word: "cat".to_string(),
            trans: "neko".to_string(),
            ..Default::default()
        }]
    );
}

#[test]
fn encrypted_dictionary_is_rejected_on_open() {
    let bytes = ContainerBuilder::new()
        .dictype(common::BOCU1 | ENCRYPTED)
        .block(BlockBuilder::new().entry("cat", "neko"))
        .build();
    let err = PdicReader::from_reader(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, PdicError::Encrypted), "got {:?}", err);
}

#[test]
fn old_versions_are_rejected_on_open() {
    let bytes = ContainerBuilder::new()
        .version(0x0500)
        .block(BlockBuilder::new().entry("cat", "neko"))
        .build();
    let err = PdicReader::from_reader(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, PdicError::UnsupportedVersion(0x0500)), "got {:?}", err);
}

#[test]
fn blocks_are_read_in_index_order_and_empty_blocks_skipped() {
    let bytes = ContainerBuilder::new()
        .block(BlockBuilder::new().entry("apple", "りんご").entry("bear", "熊"))
        .empty_block()
        .block(BlockBuilder::wide().entry("cat", "猫"))
        .empty_block()
        .block(BlockBuilder::new().entry("dog", "犬"))
        .build();
    let mut reader = open(bytes);
    assert_eq!(reader.num_blocks(), 5);

    let entries = reader.collect_entries().expect("entries ok");
    assert_eq!(words(&entries), vec!["apple", "bear", "cat", "dog"]);
    assert_eq!(entries[2].trans, "猫");

    assert!(reader.read_block(1).expect("empty block").is_empty());
    assert_eq!(words(&reader.read_block(4).expect("last block")), vec!["dog"]);
    assert!(reader.read_block(5).is_err());
}

#[test]
fn wide_index_and_extended_header() {
    let bytes = ContainerBuilder::new()
        .wide_index()
        .extheader(0x300)
        .block(BlockBuilder::new().entry("x", "y"))
        .block(BlockBuilder::new().entry("z", "w"))
        .build();
    let mut reader = open(bytes);
    assert_eq!(reader.header().extheader, 0x300);
    assert_eq!(reader.block_ids(), &[0, 1]);
    let entries = reader.collect_entries().expect("entries ok");
    assert_eq!(words(&entries), vec!["x", "z"]);
}

#[test]
fn prefix_compression_and_reference_records() {
    let block = BlockBuilder::new()
        .record(0, 0, body(&bocu1::encode("test"), "試験", &[]))
        // Reference-only: not emitted, but still the prefix source.
        .record(4, 0xff, body(&bocu1::encode("er"), "", &[]))
        .record(6, 0, body(&bocu1::encode("s"), "テスター達", &[]));
    let bytes = ContainerBuilder::new().block(block).build();
    let entries = open(bytes).collect_entries().expect("entries ok");
    assert_eq!(words(&entries), vec!["test", "testers"]);
    assert_eq!(entries[1].trans, "テスター達");
}

#[test]
fn keyword_split_flags_and_extensions() {
    let mut ext = ext_text(0x01, "I have a cat.");
    ext.extend(ext_text(0x02, "kæt"));
    ext.push(0x80);
    let block = BlockBuilder::new().record(
        0,
        0x10 | 0x20 | 0x05,
        body(&bocu1::encode("cat\tCat"), "猫", &ext),
    );
    let bytes = ContainerBuilder::new().block(block).build();
    let entries = open(bytes).collect_entries().expect("entries ok");

    let entry = &entries[0];
    assert_eq!(entry.keyword, "cat");
    assert_eq!(entry.word, "Cat");
    assert_eq!(entry.exp.as_deref(), Some("I have a cat."));
    assert_eq!(entry.pron.as_deref(), Some("kæt"));
    assert_eq!(entry.level, 5);
    assert!(entry.memory);
    assert!(!entry.modify);
}

#[test]
fn bad_text_does_not_stop_iteration() {
    // 0xd0 followed by a non-trail byte is not valid BOCU-1.
    let block = BlockBuilder::new()
        .record(0, 0, body(&bocu1::encode("ok"), "fine", &[]))
        .record(0, 0, body(&[0xd0, 0x0a], "broken headword", &[]))
        .entry("after", "still read");
    let bytes = ContainerBuilder::new().block(block).build();
    let entries = open(bytes).collect_entries().expect("entries ok");
    assert_eq!(words(&entries), vec!["ok", "", "after"]);
    assert_eq!(entries[1].trans, "broken headword");
}

#[test]
fn structural_error_ends_iteration() {
    let block = BlockBuilder::new()
        .entry("first", "1")
        .record(200, 0, body(b"x", "2", &[]))
        .entry("third", "3");
    let bytes = ContainerBuilder::new()
        .block(block)
        .block(BlockBuilder::new().entry("next", "4"))
        .build();
    let mut reader = open(bytes);

    let results: Vec<_> = reader.entries().collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().expect("first ok").word, "first");
    assert!(matches!(results[1], Err(PdicError::InvalidFormat(_))));
}

#[test]
fn truncated_data_block_is_reported() {
    let mut bytes = ContainerBuilder::new()
        .block(BlockBuilder::new().entry("cat", "neko"))
        .build();
    let data_offset = 1024 + 1024;
    bytes.truncate(data_offset + 5);
    let mut reader = open(bytes);
    let err = reader.collect_entries().unwrap_err();
    assert!(matches!(err, PdicError::Truncated { .. }), "got {:?}", err);
}

#[test]
fn opens_files_from_disk_and_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("sample.dic");
    let bytes = ContainerBuilder::new()
        .block(BlockBuilder::new().entry("cat", "猫").entry("dog", "犬"))
        .build();
    fs::write(&path, bytes).expect("write fixture");

    let mut reader = PdicReader::open(&path).expect("open file");
    let out_path = dir.path().join("sample.csv");
    let out = fs::File::create(&out_path).expect("create output");
    let count = write_entries(out, reader.entries(), OutputFormat::Csv, OutputEncoding::Utf8)
        .expect("export ok");
    assert_eq!(count, 2);

    let text = fs::read_to_string(&out_path).expect("read output");
    assert_eq!(
        text,
        "word,trans,exp,level,memory,modify,pron\r\n\"cat\",\"猫\",\"\",0,0,0,\"\"\r\n\"dog\",\"犬\",\"\",0,0,0,\"\""
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = PdicReader::open(dir.path().join("nope.dic")).unwrap_err();
    assert!(matches!(err, PdicError::Io(_)), "got {:?}", err);
}
