use d2i_core::error::RecordError;
use d2i_core::writer::{
    MAGIC_BITS, align_to_byte_boundary, bit_position, insert_bits, remove_bits, replace_value,
};
use d2i_core::{BitString, ReverseBitReader};

#[test]
fn reader_consumes_from_the_top_down() {
    let bits = BitString::from_payload(&[0xA5, 0x3C]);
    let mut reader = ReverseBitReader::new(&bits);

    assert_eq!(reader.position(), 16);
    assert_eq!(reader.read_number(8).expect("first byte"), 0xA5);
    assert_eq!(reader.read_number(8).expect("second byte"), 0x3C);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn reader_reads_booleans_and_skips() {
    // 0x80 -> sequence 10000000, topmost bit set.
    let bits = BitString::from_payload(&[0x80]);
    let mut reader = ReverseBitReader::new(&bits);

    assert!(reader.read_bool().expect("top bit"));
    reader.skip(3).expect("skip");
    assert_eq!(reader.read_number(4).expect("low nibble"), 0);
}

#[test]
fn reader_rejects_reads_past_the_start() {
    let bits = BitString::from_payload(&[0xFF]);
    let mut reader = ReverseBitReader::new(&bits);
    reader.skip(6).expect("skip");

    let err = reader.read_number(4).expect_err("only 2 bits left");
    assert_eq!(
        err,
        RecordError::ReadPastStart {
            wanted: 4,
            available: 2
        }
    );
    // A failed read leaves the cursor alone.
    assert_eq!(reader.remaining(), 2);
    assert_eq!(reader.read_number(2).expect("exact remainder"), 0b11);
}

#[test]
fn reader_rejects_oversized_widths() {
    let bits = BitString::from_payload(&[0; 8]);
    let mut reader = ReverseBitReader::new(&bits);
    assert!(reader.read_number(33).is_err());
}

#[test]
fn bit_position_translates_file_offsets() {
    // A field at file offset 16 with width 8 in a 16-bit sequence sits at
    // the very top: position 8.
    assert_eq!(bit_position(16, 16, 8).expect("valid"), 8);
    assert_eq!(bit_position(16, 24, 8).expect("valid"), 0);
}

#[test]
fn bit_position_rejects_offsets_inside_the_magic() {
    assert!(bit_position(16, 10, 1).is_err());
}

#[test]
fn bit_position_rejects_fields_past_the_sequence() {
    assert!(bit_position(16, 32, 1).is_err());
}

#[test]
fn replace_value_patches_a_field_in_place() {
    let mut bits = BitString::from_payload(&[0xA5, 0x3C]);
    replace_value(&mut bits, 16, 8, 0x7E).expect("in range");
    assert_eq!(bits.to_payload().expect("aligned"), vec![0x7E, 0x3C]);
}

#[test]
fn replace_value_rejects_values_that_do_not_fit() {
    let mut bits = BitString::from_payload(&[0xA5, 0x3C]);
    let err = replace_value(&mut bits, 16, 4, 16).expect_err("needs 5 bits");
    assert_eq!(err, RecordError::OutOfRange { value: 16, bits: 4 });
    // Rejected edits leave the sequence untouched.
    assert_eq!(bits.to_payload().expect("aligned"), vec![0xA5, 0x3C]);
}

#[test]
fn insert_preserves_offsets_below_the_splice_point() {
    let mut bits = BitString::from_payload(&[0xA5, 0x3C]);
    insert_bits(&mut bits, 24, &BitString::from_group(0xFF, 8)).expect("valid offset");

    assert_eq!(bits.len(), 24);
    // The byte at offset 16 still decodes at offset 16.
    assert_eq!(
        bits.read_group(bit_position(24, 16, 8).expect("valid"), 8),
        0xA5
    );
    // The inserted byte landed at offset 24, pushing the old tail later.
    assert_eq!(
        bits.read_group(bit_position(24, 24, 8).expect("valid"), 8),
        0xFF
    );
    assert_eq!(
        bits.read_group(bit_position(24, 32, 8).expect("valid"), 8),
        0x3C
    );
}

#[test]
fn remove_undoes_insert() {
    let mut bits = BitString::from_payload(&[0xA5, 0x3C]);
    let original = bits.clone();
    insert_bits(&mut bits, 24, &BitString::from_group(0x1F, 5)).expect("insert");
    remove_bits(&mut bits, 24, 5).expect("remove");
    assert_eq!(bits, original);
}

#[test]
fn alignment_pads_the_tail_with_zeros() {
    let mut bits = BitString::from_payload(&[0xA5]);
    insert_bits(&mut bits, 24, &BitString::from_group(0b101, 3)).expect("insert");
    assert_eq!(bits.len(), 11);

    align_to_byte_boundary(&mut bits);
    assert_eq!(bits.len(), 16);

    // Padding went below the content: offset-16 decode is unchanged and
    // the five lowest positions are zero.
    assert_eq!(
        bits.read_group(bit_position(16, 16, 8).expect("valid"), 8),
        0xA5
    );
    assert_eq!(bits.read_group(0, 5), 0);
}

#[test]
fn alignment_is_a_no_op_on_aligned_sequences() {
    let mut bits = BitString::from_payload(&[0xA5, 0x3C]);
    let before = bits.len();
    align_to_byte_boundary(&mut bits);
    assert_eq!(bits.len(), before);
}

#[test]
fn magic_width_matches_the_offset_convention() {
    // File offsets start counting at the magic, so the first addressable
    // field offset equals the magic width.
    assert_eq!(MAGIC_BITS, 16);
    assert_eq!(bit_position(8, MAGIC_BITS, 8).expect("valid"), 0);
}
