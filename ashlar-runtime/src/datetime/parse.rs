use std::cell::RefCell;

use chrono::NaiveDate;

use crate::datetime::tokenize::{tokenize, Token};

/// The bias added to epoch milliseconds so every representable date maps
/// to a non-negative timestamp: the span of the representable range.
pub const EPOCH_BIAS_MILLIS: u64 = 8_640_000_000_000_000;

thread_local! {
    // reusable token buffer
    static TOKEN_SCRATCH: RefCell<Vec<Token>> = const { RefCell::new(Vec::new()) };
}

/// Parse a date string into a biased, non-negative millisecond timestamp.
pub fn try_parse(input: &str) -> Option<u64> {
    let millis = epoch_millis(input)?;
    if millis.unsigned_abs() > EPOCH_BIAS_MILLIS {
        return None;
    }
    Some((millis + EPOCH_BIAS_MILLIS as i64) as u64)
}

/// Parse a date string into signed milliseconds since the Unix epoch.
/// Inputs without a zone designator are taken as UTC.
pub fn epoch_millis(input: &str) -> Option<i64> {
    TOKEN_SCRATCH.with(|scratch| {
        let mut tokens = scratch.borrow_mut();
        tokens.clear();
        if !tokenize(input, &mut tokens) {
            return None;
        }
        let components = process(&tokens)?;
        compute(&components)
    })
}

#[derive(Debug, Default)]
struct Components {
    year: Option<u32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    offset_minutes: Option<i32>,
    utc: bool,
}

// assign a component exactly once
fn set(slot: &mut Option<u32>, value: u32) -> Option<()> {
    if slot.is_some() {
        return None;
    }
    *slot = Some(value);
    Some(())
}

fn process(tokens: &[Token]) -> Option<Components> {
    let mut c = Components::default();
    for token in tokens {
        match token {
            Token::Month(month) => set(&mut c.month, *month)?,
            Token::Weekday | Token::TimeMarker => {}
            Token::Utc => c.utc = true,
            Token::AmPm(pm) => {
                // meaningless unless an hour is already assigned
                let hour = c.hour?;
                if hour > 12 {
                    return None;
                }
                if *pm && hour < 12 {
                    c.hour = Some(hour + 12);
                } else if !*pm && hour == 12 {
                    c.hour = Some(0);
                }
            }
            Token::Group { parts, separator } => group(&mut c, parts, *separator)?,
            Token::Number {
                value,
                digits,
                sign: Some(sign),
            } => {
                // a signed number is a timezone offset, and only valid
                // next to a zone designator or after hour and minute
                if !(c.utc || (c.hour.is_some() && c.minute.is_some())) {
                    return None;
                }
                if c.offset_minutes.is_some() {
                    return None;
                }
                let value = *value as i32;
                let minutes = if *digits <= 2 {
                    value * 60
                } else {
                    (value / 100) * 60 + value % 100
                };
                c.offset_minutes = Some(sign * minutes);
            }
            Token::Number {
                value,
                digits,
                sign: None,
            } => bare_number(&mut c, *value, *digits)?,
        }
    }
    Some(c)
}

fn bare_number(c: &mut Components, value: u32, digits: usize) -> Option<()> {
    if digits > 6 {
        return set(&mut c.year, value);
    }
    if digits >= 3 {
        if c.year.is_none() {
            return set(&mut c.year, value);
        }
        if digits >= 5 {
            // HHMMSS
            set(&mut c.hour, value / 10_000)?;
            set(&mut c.minute, (value / 100) % 100)?;
            set(&mut c.second, value % 100)
        } else {
            // HHMM
            set(&mut c.hour, value / 100)?;
            set(&mut c.minute, value % 100)
        }
    } else if c.day.is_none() {
        set(&mut c.day, value)
    } else if c.year.is_none() {
        // a small trailing number is a two-digit year
        set(&mut c.year, value + 1900)
    } else {
        None
    }
}

fn group(c: &mut Components, parts: &[(u32, usize)], separator: char) -> Option<()> {
    if separator == ':' {
        set(&mut c.hour, parts[0].0)?;
        set(&mut c.minute, parts.get(1)?.0)?;
        if let Some(second) = parts.get(2) {
            set(&mut c.second, second.0)?;
        }
        return Some(());
    }
    if parts.len() == 3 {
        let (first, second, third) = (parts[0], parts[1], parts[2]);
        if first.1 > 2 {
            // YYYY-MM-DD
            set(&mut c.year, first.0)?;
            set(&mut c.month, second.0)?;
            set(&mut c.day, third.0)
        } else {
            // MM-DD-YYYY, two-digit years offset by 1900
            set(&mut c.month, first.0)?;
            set(&mut c.day, second.0)?;
            let year = if third.1 <= 2 { third.0 + 1900 } else { third.0 };
            set(&mut c.year, year)
        }
    } else {
        // two numbers: a time once the date is complete, month/day before
        if c.year.is_some() && c.month.is_some() && c.day.is_some() {
            set(&mut c.hour, parts[0].0)?;
            set(&mut c.minute, parts[1].0)
        } else {
            set(&mut c.month, parts[0].0)?;
            set(&mut c.day, parts[1].0)
        }
    }
}

fn compute(c: &Components) -> Option<i64> {
    let year = c.year?;
    let date = NaiveDate::from_ymd_opt(year as i32, c.month.unwrap_or(1), c.day.unwrap_or(1))?;
    let time = date.and_hms_opt(
        c.hour.unwrap_or(0),
        c.minute.unwrap_or(0),
        c.second.unwrap_or(0),
    )?;
    let mut millis = time.and_utc().timestamp_millis();
    if let Some(offset) = c.offset_minutes {
        millis -= offset as i64 * 60_000;
    }
    Some(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc_millis(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_rfc_like() {
        assert_eq!(
            epoch_millis("Wed, 15 Jun 2022 13:45:30 GMT"),
            Some(utc_millis(2022, 6, 15, 13, 45, 30))
        );
    }

    #[test]
    fn test_iso_like_with_offset() {
        assert_eq!(
            epoch_millis("2022-06-15T13:45:30-0500"),
            epoch_millis("2022-06-15T18:45:30Z")
        );
        assert_eq!(
            epoch_millis("2022-06-15T13:45:30+0130"),
            Some(utc_millis(2022, 6, 15, 12, 15, 30))
        );
    }

    #[test]
    fn test_ambiguous_group_is_month_day_year() {
        assert_eq!(
            epoch_millis("01-02-03"),
            Some(utc_millis(1903, 1, 2, 0, 0, 0))
        );
    }

    #[test]
    fn test_four_digit_first_is_year_month_day() {
        assert_eq!(
            epoch_millis("2003-01-02"),
            Some(utc_millis(2003, 1, 2, 0, 0, 0))
        );
    }

    #[test]
    fn test_slash_time_after_full_date() {
        assert_eq!(
            epoch_millis("2022-06-15 13/45"),
            Some(utc_millis(2022, 6, 15, 13, 45, 0))
        );
    }

    #[test]
    fn test_bare_numbers() {
        assert_eq!(
            epoch_millis("June 15 2022 1345"),
            Some(utc_millis(2022, 6, 15, 13, 45, 0))
        );
        assert_eq!(
            epoch_millis("June 15 2022 134530"),
            Some(utc_millis(2022, 6, 15, 13, 45, 30))
        );
    }

    #[test]
    fn test_two_digit_year_after_day() {
        assert_eq!(
            epoch_millis("June 15 99"),
            Some(utc_millis(1999, 6, 15, 0, 0, 0))
        );
    }

    #[test]
    fn test_am_pm() {
        assert_eq!(
            epoch_millis("June 15 2022 1:30 PM"),
            Some(utc_millis(2022, 6, 15, 13, 30, 0))
        );
        assert_eq!(
            epoch_millis("June 15 2022 12:00 AM"),
            Some(utc_millis(2022, 6, 15, 0, 0, 0))
        );
        // PM with no hour assigned yet
        assert_eq!(epoch_millis("PM June 15 2022"), None);
        assert_eq!(epoch_millis("June 15 2022 13:30 PM"), None);
    }

    #[test]
    fn test_duplicate_components_rejected() {
        assert_eq!(epoch_millis("June July 2022 15"), None);
        assert_eq!(epoch_millis("June 15 2022 1345 1400"), None);
        assert_eq!(epoch_millis("13:30 14:30 June 15 2022"), None);
    }

    #[test]
    fn test_impossible_dates_rejected() {
        assert_eq!(epoch_millis("2022-02-30"), None);
        assert_eq!(epoch_millis("June 15 2022 25:00"), None);
        assert_eq!(epoch_millis("15 June"), None);
    }

    #[test]
    fn test_offset_requires_context() {
        assert_eq!(epoch_millis("-0500 June 15 2022"), None);
    }

    #[test]
    fn test_try_parse_is_biased() {
        assert_eq!(try_parse("Jan 1 1970"), Some(EPOCH_BIAS_MILLIS));
        let earlier = try_parse("Jan 1 1912").unwrap();
        assert!(earlier < EPOCH_BIAS_MILLIS);
    }
}
