//! Round-trip integration tests: decode then encode must reproduce every
//! byte of a class file that the rewrite does not touch.

mod common;

use classbridge::prelude::*;
use common::ClassBuilder;

#[test]
fn decode_encode_is_byte_identical() {
    let data = ClassBuilder::new("com/example/Widget")
        .long_constant(0x7FF0_1234_5678_9ABC)
        .string_constant("hello world")
        .field("count", "I")
        .field("label", "Ljava/lang/String;")
        .method("render", "()V", &[0xB1])
        .method_with_handlers(
            "tryRender",
            "()V",
            &[0x00, 0x00, 0xB1],
            vec![ExceptionTableEntry {
                start_pc: 0,
                end_pc: 2,
                handler_pc: 2,
                catch_type: 0,
            }],
        )
        .raw_attribute("SourceFile", &[0x00, 0x01])
        .raw_attribute("Deprecated", &[])
        .build_bytes();

    let class = ClassFile::from_bytes(&data).unwrap();
    let encoded = class.to_bytes().unwrap();

    assert_eq!(encoded, data);
}

#[test]
fn rewrite_without_markers_is_identity() {
    let (builder, call_index) = ClassBuilder::new("Sample").method_ref("Sample", "helper", "()V");
    let data = builder
        .method("helper", "()V", &[0xB1])
        .method(
            "caller",
            "()V",
            &[0x2A, 0xB6, (call_index >> 8) as u8, call_index as u8, 0xB1],
        )
        .build_bytes();

    let rewriter = BridgeRewriter::new();
    let output = rewriter.rewrite(&data).unwrap();

    assert_eq!(output, data);
    assert_eq!(rewriter.members_rewritten(), 0);
    assert_eq!(rewriter.call_sites_rewritten(), 0);
}

#[test]
fn long_and_double_slots_survive_the_trip() {
    let mut class = ClassBuilder::new("Numbers").build();
    let long_index = class.constant_pool.push(ConstantEntry::Long(u64::MAX)).unwrap();
    let double_index = class
        .constant_pool
        .push(ConstantEntry::Double(0x7FF8_0000_0000_0001)) // a quiet NaN payload
        .unwrap();

    let data = class.to_bytes().unwrap();
    let reparsed = ClassFile::from_bytes(&data).unwrap();

    assert!(matches!(
        reparsed.constant_pool.get(long_index).unwrap(),
        ConstantEntry::Long(u64::MAX)
    ));
    assert!(matches!(
        reparsed.constant_pool.get(double_index).unwrap(),
        ConstantEntry::Double(0x7FF8_0000_0000_0001)
    ));
    // The hidden second slots stay unusable
    assert!(reparsed.constant_pool.get(long_index + 1).is_err());
    assert!(reparsed.constant_pool.get(double_index + 1).is_err());

    assert_eq!(reparsed.to_bytes().unwrap(), data);
}

#[test]
fn out_of_range_pool_index_fails_decode() {
    let mut class = ClassBuilder::new("Broken").build();
    class.this_class = 4321;
    let data = class.to_bytes().unwrap();

    assert!(matches!(
        ClassFile::from_bytes(&data),
        Err(Error::Malformed { .. })
    ));
}

#[test]
fn kind_mismatched_reference_fails_decode() {
    let mut class = ClassBuilder::new("Broken").build();
    // Point this_class at a Utf8 entry instead of a Class entry
    let utf8_index = class.constant_pool.find_or_add_utf8(b"oops").unwrap();
    class.this_class = utf8_index;
    let data = class.to_bytes().unwrap();

    assert!(matches!(
        ClassFile::from_bytes(&data),
        Err(Error::ReferenceKind { .. })
    ));
}

#[test]
fn truncated_input_fails_decode() {
    let data = ClassBuilder::new("Sample")
        .method("render", "()V", &[0xB1])
        .build_bytes();

    for cut in [3, 9, data.len() / 2, data.len() - 1] {
        assert!(
            ClassFile::from_bytes(&data[..cut]).is_err(),
            "truncation at {cut} must not decode"
        );
    }
}

#[test]
fn failed_in_place_rewrite_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Broken.class");

    let mut class = ClassBuilder::new("Broken").build();
    class.this_class = 4321;
    let corrupt = class.to_bytes().unwrap();
    std::fs::write(&path, &corrupt).unwrap();

    let rewriter = BridgeRewriter::new();
    assert!(rewriter.rewrite_file(&path).is_err());

    assert_eq!(std::fs::read(&path).unwrap(), corrupt);
    assert_eq!(rewriter.members_rewritten(), 0);
}
