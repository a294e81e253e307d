use calamine::Data;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::ScalarValue;
use crate::profiling::values::parse_timestamp;

/// Largest serial Excel can display (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Converts an Excel serial date (days since 1899-12-30) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .map(|naive| naive.and_utc())
}

/// Maps a worksheet cell onto the profiling scalar model.
pub fn cell_to_scalar(cell: &Data) -> ScalarValue {
    match cell {
        Data::Int(i) => ScalarValue::Number(*i as f64),
        Data::Float(f) => ScalarValue::Number(*f),
        Data::String(s) if s.is_empty() => ScalarValue::Null,
        Data::String(s) => ScalarValue::String(s.clone()),
        Data::Bool(b) => ScalarValue::Bool(*b),
        Data::DateTime(d) => excel_serial_to_datetime(d.as_f64())
            .map(ScalarValue::Timestamp)
            .unwrap_or(ScalarValue::Null),
        Data::DateTimeIso(s) => parse_timestamp(s)
            .map(ScalarValue::Timestamp)
            .unwrap_or_else(|| ScalarValue::String(s.clone())),
        Data::DurationIso(s) => ScalarValue::String(s.clone()),
        Data::Error(_) | Data::Empty => ScalarValue::Null,
    }
}

pub fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_serial_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(|n| n.and_utc());
        assert_eq!(excel_serial_to_datetime(45292.5), expected);
        assert_eq!(excel_serial_to_datetime(-1.0), None);
        assert_eq!(excel_serial_to_datetime(f64::NAN), None);
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_to_scalar(&Data::Int(7)), ScalarValue::Number(7.0));
        assert_eq!(cell_to_scalar(&Data::Float(2.5)), ScalarValue::Number(2.5));
        assert_eq!(cell_to_scalar(&Data::Bool(true)), ScalarValue::Bool(true));
        assert_eq!(cell_to_scalar(&Data::String(String::new())), ScalarValue::Null);
        assert_eq!(
            cell_to_scalar(&Data::String("north".to_string())),
            ScalarValue::String("north".to_string())
        );
        assert_eq!(cell_to_scalar(&Data::Empty), ScalarValue::Null);
        assert_eq!(cell_to_scalar(&Data::Error(CellErrorType::Div0)), ScalarValue::Null);
        assert!(matches!(
            cell_to_scalar(&Data::DateTimeIso("2024-05-01T08:00:00".to_string())),
            ScalarValue::Timestamp(_)
        ));
    }
}
