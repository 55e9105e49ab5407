// tests/size_units.rs
use news_digest::config::size::{convert_size, parse_ceiling, parse_size, SizeBase};
use news_digest::UnitConversionError;

#[test]
fn default_ceiling_is_decimal() {
    assert_eq!(parse_ceiling("100KB").unwrap(), 100_000);
    assert_eq!(parse_ceiling("1MB").unwrap(), 1_000_000);
}

#[test]
fn binary_base_for_conversions() {
    assert_eq!(parse_size("100KB", SizeBase::Binary).unwrap(), 102_400);
    assert_eq!(
        convert_size(1.0, "MB", "KB", SizeBase::default()).unwrap(),
        1024.0
    );
    assert_eq!(
        convert_size(2048.0, "B", "KB", SizeBase::Binary).unwrap(),
        2.0
    );
}

#[test]
fn unknown_unit_is_typed_error() {
    let err = parse_ceiling("100XB").unwrap_err();
    assert_eq!(
        err,
        UnitConversionError::UnknownUnit {
            unit: "XB".to_string()
        }
    );
    assert!(err.to_string().contains("XB"));
}

#[test]
fn garbage_number_is_rejected() {
    assert!(matches!(
        parse_ceiling("KB"),
        Err(UnitConversionError::BadNumber { .. })
    ));
}
