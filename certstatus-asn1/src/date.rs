//! UTCTime and GeneralizedTime content octets.
//!
//! Only the forms DER allows are understood: UTC designator `Z`, seconds always present, and for
//! GeneralizedTime an optional fraction of up to nanosecond precision.

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

trait DateDigitReader {
    fn read_digit(&self, idx: usize) -> Option<u8>;

    #[inline]
    fn read_and_merge_with_next(&self, idx: usize) -> Option<u8> {
        Some(self.read_digit(idx)? * 10 + self.read_digit(idx + 1)?)
    }
}

impl DateDigitReader for [u8] {
    #[inline]
    fn read_digit(&self, idx: usize) -> Option<u8> {
        self.get(idx).filter(|b| b.is_ascii_digit()).map(|b| b & 0x0F)
    }
}

/// `YYMMDDHHMMSSZ`, two-digit years 50..=99 in the 1900s and 00..=49 in the 2000s.
pub fn parse_utc_time(content: &[u8]) -> Option<OffsetDateTime> {
    if content.len() != 13 || content[12] != b'Z' {
        return None;
    }

    let yy = i32::from(content.read_and_merge_with_next(0)?);
    let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };

    assemble(year, &content[2..12], 0)
}

/// `YYYYMMDDHHMMSS[.f+]Z`
pub fn parse_generalized_time(content: &[u8]) -> Option<OffsetDateTime> {
    let (last, content) = content.split_last()?;
    if *last != b'Z' || content.len() < 14 {
        return None;
    }

    let year = i32::from(content.read_and_merge_with_next(0)?) * 100 + i32::from(content.read_and_merge_with_next(2)?);

    let nanosecond = match &content[14..] {
        [] => 0,
        [b'.', fraction @ ..] if !fraction.is_empty() && fraction.len() <= 9 => {
            let mut nanosecond = 0u32;
            for idx in 0..9 {
                let digit = if idx < fraction.len() { fraction.read_digit(idx)? } else { 0 };
                nanosecond = nanosecond * 10 + u32::from(digit);
            }
            nanosecond
        }
        _ => return None,
    };

    assemble(year, &content[4..14], nanosecond)
}

/// `digits` holds MMDDHHMMSS.
fn assemble(year: i32, digits: &[u8], nanosecond: u32) -> Option<OffsetDateTime> {
    let month = Month::try_from(digits.read_and_merge_with_next(0)?).ok()?;
    let day = digits.read_and_merge_with_next(2)?;
    let hour = digits.read_and_merge_with_next(4)?;
    let minute = digits.read_and_merge_with_next(6)?;
    let second = digits.read_and_merge_with_next(8)?;

    let date = Date::from_calendar_date(year, month, day).ok()?;
    let time = Time::from_hms_nano(hour, minute, second, nanosecond).ok()?;

    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

/// `None` outside the 1950..=2049 window UTCTime can express.
pub fn format_utc_time(instant: &OffsetDateTime) -> Option<String> {
    let instant = instant.to_offset(UtcOffset::UTC);
    if !(1950..=2049).contains(&instant.year()) {
        return None;
    }

    Some(format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}Z",
        instant.year() % 100,
        u8::from(instant.month()),
        instant.day(),
        instant.hour(),
        instant.minute(),
        instant.second()
    ))
}

/// `None` for years that don't fit four digits. The fraction has no trailing zeros and is omitted when zero.
pub fn format_generalized_time(instant: &OffsetDateTime) -> Option<String> {
    let instant = instant.to_offset(UtcOffset::UTC);
    if !(0..=9999).contains(&instant.year()) {
        return None;
    }

    let mut encoded = format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        instant.year(),
        u8::from(instant.month()),
        instant.day(),
        instant.hour(),
        instant.minute(),
        instant.second()
    );

    if instant.nanosecond() != 0 {
        let fraction = format!("{:09}", instant.nanosecond());
        encoded.push('.');
        encoded.push_str(fraction.trim_end_matches('0'));
    }

    encoded.push('Z');
    Some(encoded)
}
