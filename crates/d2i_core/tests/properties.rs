use d2i_core::error::RecordError;
use d2i_core::props::{
    END_MARKER, PROPERTY_ID_BITS, decode_properties, encode_properties, encode_property,
    sentinel_group,
};
use d2i_core::{BitString, PropertyDef, PropertyEntry, PropertyTable, ReverseBitReader};

fn test_table() -> PropertyTable {
    PropertyTable::from_defs([
        (
            80,
            PropertyDef {
                param_bits: 0,
                bits: 9,
                add: 100,
            },
        ),
        (
            97,
            PropertyDef {
                param_bits: 6,
                bits: 10,
                add: 0,
            },
        ),
        (
            7,
            PropertyDef {
                param_bits: 0,
                bits: 8,
                add: 0,
            },
        ),
    ])
}

#[test]
fn empty_list_is_just_the_sentinel() {
    let table = test_table();
    let bits = encode_properties(&[], &table).expect("encode");
    assert_eq!(bits.len(), PROPERTY_ID_BITS);

    let mut reader = ReverseBitReader::new(&bits);
    let entries = decode_properties(&mut reader, &table).expect("decode");
    assert!(entries.is_empty());
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn biased_value_round_trips() {
    let table = test_table();
    let entries = vec![PropertyEntry {
        id: 80,
        param: None,
        value: 50,
    }];
    let bits = encode_properties(&entries, &table).expect("encode");

    // On disk the value carries the +100 bias: id 80 at the top, then the
    // raw group 150.
    let mut reader = ReverseBitReader::new(&bits);
    assert_eq!(
        reader.read_number(PROPERTY_ID_BITS).expect("id group"),
        80
    );
    assert_eq!(reader.read_number(9).expect("raw group"), 150);
    assert_eq!(
        reader.read_number(PROPERTY_ID_BITS).expect("sentinel"),
        u32::from(END_MARKER)
    );

    let mut reader = ReverseBitReader::new(&bits);
    let decoded = decode_properties(&mut reader, &table).expect("decode");
    assert_eq!(decoded, entries);
}

#[test]
fn negative_values_fit_when_the_bias_covers_them() {
    let table = test_table();
    let entries = vec![PropertyEntry {
        id: 80,
        param: None,
        value: -40,
    }];
    let bits = encode_properties(&entries, &table).expect("encode");
    let mut reader = ReverseBitReader::new(&bits);
    let decoded = decode_properties(&mut reader, &table).expect("decode");
    assert_eq!(decoded[0].value, -40);
}

#[test]
fn parameterized_entries_round_trip_in_list_order() {
    let table = test_table();
    let entries = vec![
        PropertyEntry {
            id: 97,
            param: Some(54),
            value: 3,
        },
        PropertyEntry {
            id: 7,
            param: None,
            value: 255,
        },
        PropertyEntry {
            id: 80,
            param: None,
            value: 0,
        },
    ];
    let bits = encode_properties(&entries, &table).expect("encode");
    let mut reader = ReverseBitReader::new(&bits);
    let decoded = decode_properties(&mut reader, &table).expect("decode");
    assert_eq!(decoded, entries);
}

#[test]
fn duplicate_ids_are_preserved() {
    let table = test_table();
    let entries = vec![
        PropertyEntry {
            id: 7,
            param: None,
            value: 10,
        },
        PropertyEntry {
            id: 7,
            param: None,
            value: 20,
        },
    ];
    let bits = encode_properties(&entries, &table).expect("encode");
    let mut reader = ReverseBitReader::new(&bits);
    let decoded = decode_properties(&mut reader, &table).expect("decode");
    assert_eq!(decoded, entries);
}

#[test]
fn unknown_id_aborts_the_decode() {
    let table = test_table();
    let mut bits = sentinel_group();
    // An id the table does not know, with some bits that would have been
    // its payload.
    bits.extend(&BitString::from_group(0, 9));
    bits.extend(&BitString::from_group(300, PROPERTY_ID_BITS));

    let mut reader = ReverseBitReader::new(&bits);
    let err = decode_properties(&mut reader, &table).expect_err("unknown id");
    assert_eq!(err, RecordError::UnknownPropertyId { id: 300 });
}

#[test]
fn missing_sentinel_aborts_the_decode() {
    let table = test_table();
    // A single well-formed entry with no sentinel below it: the decoder
    // runs out of bits and reports the underflow.
    let def = table.lookup(7).expect("def");
    let bits = encode_property(&def, 7, 42, None).expect("encode entry");
    let mut reader = ReverseBitReader::new(&bits);
    let err = decode_properties(&mut reader, &table).expect_err("no sentinel");
    assert!(matches!(err, RecordError::ReadPastStart { .. }));
}

#[test]
fn encode_rejects_values_outside_the_field() {
    let table = test_table();
    let def = table.lookup(80).expect("def");

    // Raw value 50 + 100 fits 9 bits; 450 + 100 does not.
    assert!(encode_property(&def, 80, 50, None).is_ok());
    let err = encode_property(&def, 80, 450, None).expect_err("raw 550");
    assert_eq!(err, RecordError::OutOfRange { value: 550, bits: 9 });

    // The bias can push small negatives below zero.
    let err = encode_property(&def, 80, -101, None).expect_err("raw -1");
    assert_eq!(err, RecordError::OutOfRange { value: -1, bits: 9 });
}

#[test]
fn encode_rejects_parameter_mismatches() {
    let table = test_table();

    let plain = table.lookup(7).expect("def");
    assert!(encode_property(&plain, 7, 1, Some(3)).is_err());

    let parameterized = table.lookup(97).expect("def");
    assert!(encode_property(&parameterized, 97, 1, Some(64)).is_err());
    // Omitting the parameter encodes it as zero.
    let bits = encode_property(&parameterized, 97, 1, None).expect("encode");
    let mut reader = ReverseBitReader::new(&bits);
    assert_eq!(reader.read_number(PROPERTY_ID_BITS).expect("id"), 97);
    assert_eq!(reader.read_number(6).expect("param"), 0);
}
