// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use num_bigint::BigInt;

use crate::functions;
use crate::tests::{lit, q};
use crate::{Alert, FixedPointError, Overflow, ResizeOptions};

#[test]
fn test_rounding_copies() {
    let x = q(-0.625, true, 1, 3);

    let cases = [
        (functions::convergent(&x, 2).unwrap(), -0.5),
        (functions::round_nearest(&x, 2).unwrap(), -0.5),
        (functions::round_in(&x, 2).unwrap(), -0.5),
        (functions::round_out(&x, 2).unwrap(), -0.75),
        (functions::round_up(&x, 2).unwrap(), -0.5),
        (functions::round_down(&x, 2).unwrap(), -0.75),
    ];
    for (y, want) in cases {
        assert_eq!((y.qformat(), y.to_f64()), ("Q1.2".to_owned(), want));
        assert_ne!(y.serial(), x.serial());
    }

    // The argument is untouched
    assert_eq!((x.qformat(), x.to_f64()), ("Q1.3".to_owned(), -0.625));
}

#[test]
fn test_sizing_copies() {
    let x = q(5.5, true, 4, 2);

    let y = functions::resize(&x, 8, 4, ResizeOptions::new()).unwrap();
    assert_eq!((y.qformat(), y.to_f64()), ("Q8.4".to_owned(), 5.5));

    let y = functions::clamp(&x, 2, Some(Alert::Ignore)).unwrap();
    assert_eq!(y.to_f64(), 1.75);

    let y = functions::wrap(&x, 2, Some(Alert::Ignore)).unwrap();
    assert_eq!(y.to_f64(), 1.5);

    let y = functions::trim(&q(2.5, false, 8, 8), None, None);
    assert_eq!(y.qformat(), "UQ2.1");

    assert_eq!((x.qformat(), x.to_f64()), ("Q4.2".to_owned(), 5.5));
}

#[test]
fn test_keep_copies() {
    let x = lit("0b0011_0101", false, 4, 4);

    let y = functions::keep_msbs(&x, 4, 2, ResizeOptions::new()).unwrap();
    assert_eq!((y.qformat(), y.to_f64()), ("UQ4.2".to_owned(), 3.25));

    let opts = ResizeOptions::new().overflow(Overflow::Wrap).alert(Alert::Ignore);
    let y = functions::keep_lsbs(&x, 2, 2, opts).unwrap();
    assert_eq!(y.raw_bits(), &BigInt::from(0b0101));

    assert_eq!(x.raw_bits(), &BigInt::from(0b0011_0101));
}

#[test]
fn test_errors_propagate() {
    let x = q(5.5, true, 4, 2);
    assert!(matches!(functions::clamp(&x, 2, None), Err(FixedPointError::Overflow(_))));
    assert!(matches!(functions::round_up(&x, 2), Err(FixedPointError::InvalidValue(_))));
    assert!(functions::resize(&x, 0, 2, ResizeOptions::new()).is_err());
    assert_eq!(x.to_f64(), 5.5);
}
