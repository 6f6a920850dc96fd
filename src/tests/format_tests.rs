// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use num_bigint::BigInt;
use num_traits::One;

use crate::tests::{lit, q};
use crate::{FixedPoint, FixedPointError, Options, StrBase};

#[test]
fn test_display_bases() {
    let mut x = lit("0b1111101", false, 5, 2);
    assert_eq!(x.to_string(), "7d");

    x.set_str_base(StrBase::Bin);
    assert_eq!(x.to_string(), "1111101");
    x.set_str_base(StrBase::Oct);
    assert_eq!(x.to_string(), "175");
    x.set_str_base(StrBase::Dec);
    assert_eq!(x.to_string(), "125");

    // Power-of-two bases are padded to the word
    let y = lit("0x3", false, 8, 4);
    assert_eq!(y.to_string(), "003");

    // Negative values print their two's-complement bits
    let z = q(-1.25, true, 4, 2);
    assert_eq!(z.to_string(), "3b");
}

#[test]
fn test_debug_repr() {
    let x = lit("0b1111101", false, 5, 2);
    assert_eq!(
        format!("{:?}", x),
        "FixedPoint('0x7d', signed=0, m=5, n=2, overflow='clamp', rounding='nearest', \
         overflow_alert='error', mismatch_alert='warning', implicit_cast_alert='warning', \
         str_base=16)"
    );

    let options = Options::new().format(true, 4, 2).str_base(StrBase::Dec);
    let y = FixedPoint::new(-1.25, options).unwrap();
    let repr = format!("{:?}", y);
    assert!(repr.starts_with("FixedPoint('59', signed=1, m=4, n=2, overflow='clamp'"));
    assert!(repr.contains("rounding='convergent'"));
}

#[test]
fn test_radix_formatting() {
    let x = lit("0b1111101", false, 5, 2);
    assert_eq!(format!("{:x}", x), "7d");
    assert_eq!(format!("{:#x}", x), "0x7d");
    assert_eq!(format!("{:X}", x), "7D");
    assert_eq!(format!("{:b}", x), "1111101");
    assert_eq!(format!("{:o}", x), "175");
}

#[test]
fn test_numeric_conversion() {
    let x = lit("0b1111101", false, 5, 2);
    assert_eq!(x.to_f64(), 31.25);
    assert_eq!(f64::from(&x), 31.25);
    assert_eq!(x.to_int(), BigInt::from(31));

    // Integer conversion floors
    let y = q(-2.5, true, 8, 8);
    assert_eq!(y.to_int(), BigInt::from(-3));
    assert!(!y.is_zero());
    assert!(q(0.0, true, 8, 8).is_zero());

    // Out-of-range values saturate
    let huge = FixedPoint::new(BigInt::one() << 2000usize, Options::new()).unwrap();
    assert_eq!(huge.to_f64(), f64::INFINITY);
    let tiny = FixedPoint::new("0x1", Options::new().format(false, 0, 1200)).unwrap();
    assert_eq!(tiny.to_f64(), 0.0);
}

#[test]
fn test_format_field() {
    let x = lit("0b1111101", false, 5, 2);

    // 1. Raw bits
    assert_eq!(x.format_field("").unwrap(), "125");
    assert_eq!(x.format_field("x").unwrap(), "7d");
    assert_eq!(x.format_field("#x").unwrap(), "0x7d");
    assert_eq!(x.format_field("08b").unwrap(), "01111101");
    assert_eq!(x.format_field("6d").unwrap(), "   125");

    // 2. Integer and fractional bits
    assert_eq!(x.format_field("m").unwrap(), "31");
    assert_eq!(x.format_field("bm").unwrap(), "11111");
    assert_eq!(x.format_field("#xm").unwrap(), "0x1f");
    assert_eq!(x.format_field("n").unwrap(), "1");
    assert_eq!(x.format_field("02bn").unwrap(), "01");

    // 3. Display string and Q format
    assert_eq!(x.format_field("s").unwrap(), "7d");
    assert_eq!(x.format_field("q").unwrap(), "UQ5.2");
    assert_eq!(x.format_field("7q").unwrap(), "UQ5.2  ");
    assert_eq!(x.format_field(".2q").unwrap(), "UQ");
}

#[test]
fn test_format_field_floats() {
    let x = lit("0b1111101", false, 5, 2);
    assert_eq!(x.format_field("f").unwrap(), "31.250000");
    assert_eq!(x.format_field(".3f").unwrap(), "31.250");
    assert_eq!(x.format_field("e").unwrap(), "3.125000e+01");
    assert_eq!(x.format_field(".1E").unwrap(), "3.1E+01");
    assert_eq!(x.format_field("g").unwrap(), "31.25");
    assert_eq!(x.format_field(".0%").unwrap(), "3125%");

    let y = q(-1.25, true, 4, 2);
    assert_eq!(y.format_field("08.3f").unwrap(), "-001.250");
    assert_eq!(y.format_field("8.3f").unwrap(), "  -1.250");

    let tiny = lit("0x1", false, 0, 20);
    assert_eq!(tiny.format_field("g").unwrap(), "9.53674e-07");
}

#[test]
fn test_format_field_errors() {
    let x = lit("0b1111101", false, 5, 2);
    assert_eq!(
        x.format_field("Z").unwrap_err(),
        FixedPointError::InvalidValue("Unknown format code 'Z'.".into())
    );
    for bad in [".2x", "fm", "#q", "5.q", "x2d"] {
        assert!(matches!(x.format_field(bad), Err(FixedPointError::InvalidValue(_))), "{bad}");
    }
}
