//! Conversion between calendar values and spreadsheet serial numbers
//!
//! Uses the 1900 date system. Serial 1 is 1900-01-01 and serial 60 is the
//! nonexistent 1900-02-29 that Excel keeps for Lotus compatibility, so every
//! date from 1900-03-01 on is one day "late".

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

const MS_PER_DAY: f64 = 86_400_000.0;

fn epoch() -> NaiveDateTime {
    // 1899-12-30 is always a valid date
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
}

fn first_valid_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
}

fn leap_bug_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 3, 1).unwrap_or_default()
}

/// Convert a date and time to a serial number
pub fn datetime_to_serial(value: NaiveDateTime) -> Result<f64> {
    if value.date() < first_valid_day() {
        return Err(Error::DateOutOfRange(value.to_string()));
    }

    let elapsed = value - epoch();
    let mut serial = elapsed.num_milliseconds() as f64 / MS_PER_DAY;
    if value.date() < leap_bug_cutoff() {
        serial -= 1.0;
    }
    Ok(serial)
}

/// Convert a date to a serial number (no time fraction)
pub fn date_to_serial(value: NaiveDate) -> Result<f64> {
    datetime_to_serial(value.and_time(NaiveTime::MIN))
}

/// Convert a serial number back to a date and time
///
/// The time part is rounded to the nearest millisecond. Serial 60 maps to
/// 1900-02-28, since 1900-02-29 does not exist.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let mut days = serial.trunc();
    let ms = ((serial - days) * MS_PER_DAY).round() as i64;
    if days < 61.0 {
        // before the phantom leap day the epoch is one day later
        days += if days == 60.0 { 0.0 } else { 1.0 };
    }

    epoch()
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::milliseconds(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_known_serials() {
        assert_eq!(datetime_to_serial(dt(1900, 1, 1, 0, 0, 0)).unwrap(), 1.0);
        assert_eq!(datetime_to_serial(dt(1900, 2, 28, 0, 0, 0)).unwrap(), 59.0);
        assert_eq!(datetime_to_serial(dt(1900, 3, 1, 0, 0, 0)).unwrap(), 61.0);
        assert_eq!(
            date_to_serial(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).unwrap(),
            45306.0
        );
        assert_eq!(datetime_to_serial(dt(2024, 1, 15, 12, 0, 0)).unwrap(), 45306.5);
    }

    #[test]
    fn test_out_of_range() {
        assert!(datetime_to_serial(dt(1899, 12, 31, 0, 0, 0)).is_err());
        assert_eq!(serial_to_datetime(0.5), None);
        assert_eq!(serial_to_datetime(f64::NAN), None);
    }

    #[test]
    fn test_serial_back_to_datetime() {
        assert_eq!(serial_to_datetime(1.0), Some(dt(1900, 1, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(59.0), Some(dt(1900, 2, 28, 0, 0, 0)));
        assert_eq!(serial_to_datetime(61.0), Some(dt(1900, 3, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(45306.75), Some(dt(2024, 1, 15, 18, 0, 0)));

        let original = dt(2019, 7, 4, 9, 30, 15);
        let serial = datetime_to_serial(original).unwrap();
        assert_eq!(serial_to_datetime(serial), Some(original));
    }
}
