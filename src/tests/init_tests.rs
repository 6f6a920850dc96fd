// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use num_bigint::BigInt;

use crate::tests::lit;
use crate::{Alert, FixedPoint, FixedPointError, Options, Overflow, Rounding};

fn deduced(init: f64) -> FixedPoint {
    FixedPoint::new(init, Options::new()).unwrap()
}

#[test]
fn test_integer_deduction() {
    let x = FixedPoint::new(3, Options::new()).unwrap();
    assert_eq!(x.qformat(), "UQ2.0");
    assert_eq!(x.to_f64(), 3.0);

    let x = FixedPoint::new(-3, Options::new()).unwrap();
    assert_eq!(x.qformat(), "Q3.0");
    assert_eq!(x.raw_bits(), &BigInt::from(0b101));
    assert_eq!(x.to_f64(), -3.0);

    // Zero still gets one bit
    let x = FixedPoint::new(0, Options::new()).unwrap();
    assert_eq!(x.qformat(), "UQ1.0");

    // Big integers keep every bit
    let big = BigInt::from(1) << 200usize;
    let x = FixedPoint::new(big.clone(), Options::new()).unwrap();
    assert_eq!(x.qformat(), "UQ201.0");
    assert_eq!(x.to_int(), big);
}

#[test]
fn test_float_deduction() {
    assert_eq!(deduced(0.5).qformat(), "UQ0.1");
    assert_eq!(deduced(1.5).qformat(), "UQ1.1");
    assert_eq!(deduced(-2.5).qformat(), "Q3.1");
    assert_eq!(deduced(-2.5).to_f64(), -2.5);
    assert_eq!(deduced(0.1).n(), 55);
    assert_eq!(deduced(0.1).to_f64(), 0.1);
}

#[test]
fn test_partial_deduction() {
    // 1. Explicit n is kept even with trailing zeros
    let x = FixedPoint::new(1.5, Options::new().n(4)).unwrap();
    assert_eq!(x.qformat(), "UQ1.4");

    // 2. Explicit m is kept even with leading zeros
    let x = FixedPoint::new(1.5, Options::new().m(6)).unwrap();
    assert_eq!(x.qformat(), "UQ6.1");

    // 3. Explicit signedness
    let x = FixedPoint::new(1.5, Options::new().signed(true)).unwrap();
    assert_eq!(x.qformat(), "Q2.1");
}

#[test]
fn test_width_helpers() {
    assert_eq!(FixedPoint::min_n(3.0), 0);
    assert_eq!(FixedPoint::min_n(0.75), 2);
    assert_eq!(FixedPoint::min_n(0.1), 55);
    assert_eq!(FixedPoint::min_m(2.5, false), 2);
    assert_eq!(FixedPoint::min_m(-1.0, true), 1);
    assert_eq!(FixedPoint::min_m(0.0, false), 1);
    assert_eq!(FixedPoint::min_m_int(&BigInt::from(127), true), 8);
    assert_eq!(FixedPoint::min_m_int(&BigInt::from(-128), true), 8);
    assert_eq!(FixedPoint::min_m_int(&BigInt::from(255), false), 8);
}

#[test]
fn test_tiny_floats_keep_every_bit() {
    // 1. Smallest subnormal
    let tiny = f64::from_bits(1);
    assert_eq!(FixedPoint::min_n(tiny), 1074);
    let x = FixedPoint::new(tiny, Options::new()).unwrap();
    assert_eq!(x.qformat(), "UQ0.1074");
    assert_eq!(x.to_f64(), tiny);

    // 2. Full mantissa below 2^-971: (2^53 - 1) * 2^-1052
    let full = f64::from_bits((23u64 << 52) | ((1u64 << 52) - 1));
    assert_eq!(FixedPoint::min_n(full), 1052);
    let x = FixedPoint::new(-full, Options::new()).unwrap();
    assert_eq!(x.n(), 1052);
    assert_eq!(x.to_f64(), -full);
}

#[test]
fn test_string_literals() {
    let x = lit("0b1111101", false, 5, 2);
    assert_eq!(x.qformat(), "UQ5.2");
    assert_eq!(x.to_f64(), 31.25);

    assert_eq!(lit("0x7d", false, 5, 2), x);
    assert_eq!(lit("0o175", false, 5, 2), x);
    assert_eq!(lit("125", false, 5, 2), x);
    assert_eq!(lit("0b111_1101", false, 5, 2), x);

    // Raw bits, so a set MSb is negative when signed
    assert_eq!(lit("0xF", true, 2, 2).to_f64(), -0.25);
}

#[test]
fn test_string_literal_errors() {
    let err = FixedPoint::new("0b1", Options::new().m(1)).unwrap_err();
    assert_eq!(
        err,
        FixedPointError::InvalidValue(
            "String literal initialization Q format must be fully constrained.".into(),
        )
    );

    let err = FixedPoint::new("0x100", Options::new().format(false, 4, 4)).unwrap_err();
    assert!(err.to_string().contains("Superfluous bits"));

    for bad in ["0b", "0x_", "1__0", "_1", "0b102", "007", "abc"] {
        let ret = FixedPoint::new(bad, Options::new().format(false, 8, 0));
        assert!(matches!(ret, Err(FixedPointError::InvalidValue(_))), "{bad}");
    }
}

#[test]
fn test_format_validation() {
    let err = FixedPoint::new(1, Options::new().format(true, 0, 4)).unwrap_err();
    assert_eq!(
        err,
        FixedPointError::InvalidValue(
            "Number of integer bits must be at least 1 for signed numbers.".into(),
        )
    );

    let err = FixedPoint::new(0, Options::new().format(false, 0, 0)).unwrap_err();
    assert_eq!(
        err,
        FixedPointError::InvalidValue("Word size (integer and fractional) must be positive.".into())
    );

    for bad in [f64::NAN, f64::INFINITY] {
        let ret = FixedPoint::new(bad, Options::new());
        assert!(matches!(ret, Err(FixedPointError::InvalidValue(_))), "{bad}");
    }
}

#[test]
fn test_integer_overflow() {
    let options = Options::new().format(false, 8, 0);

    // 1. Default alert is an error
    let err = FixedPoint::new(300, options).unwrap_err();
    assert!(matches!(err, FixedPointError::Overflow(_)));
    assert!(err.to_string().contains("Integer 300 overflows in UQ8.0 format."));

    // 2. Clamp and wrap
    let quiet = options.overflow_alert(Alert::Ignore);
    assert_eq!(FixedPoint::new(300, quiet).unwrap().to_f64(), 255.0);
    assert_eq!(FixedPoint::new(300, quiet.overflow(Overflow::Wrap)).unwrap().to_f64(), 44.0);
    assert_eq!(FixedPoint::new(-1, quiet).unwrap().to_f64(), 0.0);
}

#[test]
fn test_float_rounding_on_construction() {
    // 1. Above half
    let x = FixedPoint::new(0.3, Options::new().format(false, 0, 4)).unwrap();
    assert_eq!(x.to_f64(), 0.3125);

    // 2. Negative values round on the two's-complement view
    let x = FixedPoint::new(-0.3, Options::new().format(true, 1, 4)).unwrap();
    assert_eq!(x.to_f64(), -0.3125);

    // 3. Ties follow the configured mode
    let tie = Options::new().format(false, 0, 2);
    assert_eq!(FixedPoint::new(0.125, tie).unwrap().to_f64(), 0.25);
    let tie = tie.rounding(Rounding::Convergent);
    assert_eq!(FixedPoint::new(0.125, tie).unwrap().to_f64(), 0.0);
    assert_eq!(FixedPoint::new(0.375, tie).unwrap().to_f64(), 0.5);
    let tie = tie.rounding(Rounding::Down);
    assert_eq!(FixedPoint::new(0.375, tie).unwrap().to_f64(), 0.25);
}

#[test]
fn test_float_overflow() {
    let options = Options::new().format(false, 1, 5).overflow_alert(Alert::Ignore);
    assert_eq!(FixedPoint::new(2.23, options).unwrap().raw_bits(), &BigInt::from(0b111111));
    let options = options.overflow(Overflow::Wrap);
    assert_eq!(FixedPoint::new(2.23, options).unwrap().raw_bits(), &BigInt::from(0b000111));

    // Rounding up into the maximum is not an overflow on construction
    let options = Options::new().format(true, 2, 2);
    assert_eq!(FixedPoint::new(1.75, options).unwrap().to_f64(), 1.75);
    assert!(FixedPoint::new(1.8, options).is_err());
    assert_eq!(FixedPoint::new(-2.0, options).unwrap().to_f64(), -2.0);
    assert!(FixedPoint::new(-2.01, options).is_err());
}

#[test]
fn test_copy_construction() {
    let x = FixedPoint::new(-2.5, Options::new().rounding(Rounding::Up)).unwrap();
    let y = FixedPoint::new(&x, Options::new().format(false, 9, 9)).unwrap();
    assert_eq!(y.qformat(), x.qformat());
    assert_eq!(y.raw_bits(), x.raw_bits());
    assert_eq!(y.config(), x.config());
    assert_ne!(y.serial(), x.serial());

    let z = x.clone();
    assert_ne!(z.serial(), x.serial());
    assert_eq!(z, x);
}
