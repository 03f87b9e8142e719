//! Tests for the typed value codec: parse, render, and compare.

use macmem_core::{CompareOp, MacmemError, ValueType};

#[test]
fn test_parse_render_round_trips()
{
    // render(parse(v)) must give back the canonical form of v.
    let cases = [
        (ValueType::Byte, "0", "0"),
        (ValueType::Byte, "200", "200"),
        (ValueType::Short, "-1234", "-1234"),
        (ValueType::Int, "100", "100"),
        (ValueType::Int, "-2147483648", "-2147483648"),
        (ValueType::Long, "123456789012", "123456789012"),
        (ValueType::Float, "3.5", "3.5"),
        (ValueType::Float, "-0.25", "-0.25"),
        (ValueType::Double, "2.25", "2.25"),
        (ValueType::String, "HELLO", "HELLO"),
    ];

    for (ty, input, canonical) in cases {
        let bytes = ty.parse(input).unwrap();
        assert_eq!(ty.render(&bytes), canonical, "round trip for {ty} '{input}'");
    }
}

#[test]
fn test_parse_widths()
{
    assert_eq!(ValueType::Byte.parse("1").unwrap().len(), 1);
    assert_eq!(ValueType::Short.parse("1").unwrap().len(), 2);
    assert_eq!(ValueType::Int.parse("1").unwrap().len(), 4);
    assert_eq!(ValueType::Long.parse("1").unwrap().len(), 8);
    assert_eq!(ValueType::Float.parse("1").unwrap().len(), 4);
    assert_eq!(ValueType::Double.parse("1").unwrap().len(), 8);
    // A string pattern's width is the literal's length, no trailing NUL.
    assert_eq!(ValueType::String.parse("HELLO").unwrap().len(), 5);
}

#[test]
fn test_parse_hex_integers()
{
    assert_eq!(ValueType::Int.parse("0x64").unwrap(), ValueType::Int.parse("100").unwrap());
    assert_eq!(ValueType::Long.parse("0X10").unwrap(), ValueType::Long.parse("16").unwrap());

    // Hex is a raw bit pattern of the type's width, reinterpreted as
    // two's-complement.
    let bytes = ValueType::Short.parse("0xffff").unwrap();
    assert_eq!(ValueType::Short.render(&bytes), "-1");
}

#[test]
fn test_parse_overflow_is_out_of_range()
{
    let overflowing = [
        (ValueType::Byte, "256"),
        (ValueType::Byte, "-1"), // Byte is unsigned
        (ValueType::Short, "40000"),
        (ValueType::Int, "2147483648"),
        (ValueType::Long, "9223372036854775808"),
        (ValueType::Short, "0x10000"),
    ];

    for (ty, input) in overflowing {
        assert!(
            matches!(ty.parse(input), Err(MacmemError::OutOfRange(_))),
            "{ty} '{input}' should be out of range"
        );
    }
}

#[test]
fn test_parse_malformed_literals()
{
    let malformed = [
        (ValueType::Int, "abc"),
        (ValueType::Int, ""),
        (ValueType::Int, "1.5"),
        (ValueType::Byte, "0x"),
        (ValueType::Float, "fast"),
        (ValueType::Double, ""),
    ];

    for (ty, input) in malformed {
        assert!(
            matches!(ty.parse(input), Err(MacmemError::MalformedLiteral(_))),
            "{ty} '{input}' should be malformed"
        );
    }

    assert!(matches!(
        ValueType::String.parse(""),
        Err(MacmemError::MalformedLiteral(_))
    ));
}

#[test]
fn test_compare_eq_matches_canonical_equality()
{
    let a = ValueType::Int.parse("100").unwrap();
    let b = ValueType::Int.parse("100").unwrap();
    let c = ValueType::Int.parse("101").unwrap();

    assert!(ValueType::Int.compare(&a, &b, CompareOp::Eq).unwrap());
    assert!(!ValueType::Int.compare(&a, &c, CompareOp::Eq).unwrap());
}

#[test]
fn test_compare_ordered_is_signed()
{
    // Bytewise comparison would order -5 above 3; typed comparison must not.
    let neg = ValueType::Int.parse("-5").unwrap();
    let pos = ValueType::Int.parse("3").unwrap();

    assert!(ValueType::Int.compare(&neg, &pos, CompareOp::Lt).unwrap());
    assert!(!ValueType::Int.compare(&neg, &pos, CompareOp::Gt).unwrap());
    assert!(ValueType::Int.compare(&pos, &neg, CompareOp::Gt).unwrap());
}

#[test]
fn test_compare_ordered_floats()
{
    let small = ValueType::Float.parse("1.5").unwrap();
    let large = ValueType::Float.parse("2.5").unwrap();

    assert!(ValueType::Float.compare(&large, &small, CompareOp::Gt).unwrap());
    assert!(ValueType::Float.compare(&small, &large, CompareOp::Lt).unwrap());
}

#[test]
fn test_nan_comparisons_are_false()
{
    let nan = f32::NAN.to_ne_bytes().to_vec();
    let one = ValueType::Float.parse("1").unwrap();

    assert!(!ValueType::Float.compare(&nan, &one, CompareOp::Gt).unwrap());
    assert!(!ValueType::Float.compare(&nan, &one, CompareOp::Lt).unwrap());
    assert!(!ValueType::Float.compare(&one, &nan, CompareOp::Gt).unwrap());
    assert!(!ValueType::Float.compare(&one, &nan, CompareOp::Lt).unwrap());
}

#[test]
fn test_ordered_comparison_unsupported_for_strings()
{
    let a = ValueType::String.parse("aa").unwrap();
    let b = ValueType::String.parse("ab").unwrap();

    assert!(matches!(
        ValueType::String.compare(&a, &b, CompareOp::Gt),
        Err(MacmemError::UnsupportedOp { .. })
    ));
    assert!(matches!(
        ValueType::String.compare(&a, &b, CompareOp::Lt),
        Err(MacmemError::UnsupportedOp { .. })
    ));
}

#[test]
fn test_changed_unchanged_are_bytewise_on_all_types()
{
    let a = ValueType::String.parse("HELLO").unwrap();
    let b = ValueType::String.parse("WORLD").unwrap();

    assert!(ValueType::String.compare(&a, &b, CompareOp::Changed).unwrap());
    assert!(!ValueType::String.compare(&a, &a, CompareOp::Changed).unwrap());
    assert!(ValueType::String.compare(&a, &a, CompareOp::Unchanged).unwrap());
    assert!(!ValueType::String.compare(&a, &b, CompareOp::Unchanged).unwrap());
}

#[test]
fn test_ordinals_round_trip()
{
    for ty in ValueType::ALL {
        assert_eq!(ValueType::from_ordinal(ty.ordinal()), Some(ty));
    }
    assert_eq!(ValueType::from_ordinal(7), None);
}

#[test]
fn test_type_tokens()
{
    assert_eq!("int".parse::<ValueType>().unwrap(), ValueType::Int);
    assert_eq!("INT".parse::<ValueType>().unwrap(), ValueType::Int); // case-insensitive
    assert_eq!("byte".parse::<ValueType>().unwrap(), ValueType::Byte);
    assert_eq!("string".parse::<ValueType>().unwrap(), ValueType::String);
    assert!(matches!(
        "pointer".parse::<ValueType>(),
        Err(MacmemError::UnknownType(_))
    ));

    // Display and FromStr agree.
    for ty in ValueType::ALL {
        assert_eq!(ty.to_string().parse::<ValueType>().unwrap(), ty);
    }
}

#[test]
fn test_op_tokens()
{
    assert_eq!("exact".parse::<CompareOp>().unwrap(), CompareOp::Eq);
    assert_eq!("greater".parse::<CompareOp>().unwrap(), CompareOp::Gt);
    assert_eq!("less".parse::<CompareOp>().unwrap(), CompareOp::Lt);
    assert_eq!("changed".parse::<CompareOp>().unwrap(), CompareOp::Changed);
    assert_eq!("UNCHANGED".parse::<CompareOp>().unwrap(), CompareOp::Unchanged);
    assert!(matches!("between".parse::<CompareOp>(), Err(MacmemError::UnknownOp(_))));
}
