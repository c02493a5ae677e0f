//! Wall-clock helpers shared by the countdown and the view.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Date format the timings API expects in its `date` parameter.
pub const API_DATE_FORMAT: &str = "%d-%m-%Y";

pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

pub fn parse_api_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), API_DATE_FORMAT).ok()
}

/// Finds the first `H:MM` / `HH:MM` in `value` and places it on `date`.
///
/// The API may append a zone label (`"05:12 (EET)"`), so anything around the
/// time is ignored. Out-of-range times yield `None`.
pub fn parse_time_on(value: &str, date: NaiveDate) -> Option<NaiveDateTime> {
    let bytes = value.as_bytes();

    for (colon, _) in value.match_indices(':') {
        let minutes = bytes.get(colon + 1..colon + 3)?;
        if !minutes.iter().all(u8::is_ascii_digit) {
            continue;
        }

        let hour_start = if colon >= 2 && bytes[colon - 2].is_ascii_digit() {
            colon - 2
        } else {
            colon.saturating_sub(1)
        };
        let hours = &bytes[hour_start..colon];
        if hours.is_empty() || !hours.iter().all(u8::is_ascii_digit) {
            continue;
        }

        let hour = digits_value(hours);
        let minute = digits_value(minutes);
        return NaiveTime::from_hms_opt(hour, minute, 0).map(|time| date.and_time(time));
    }

    None
}

fn digits_value(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, digit| acc * 10 + u32::from(digit - b'0'))
}

/// `HH:MM:SS`; anything at or below zero renders as `00:00:00`.
pub fn format_hhmmss(total_seconds: i64) -> String {
    if total_seconds <= 0 {
        return "00:00:00".to_string();
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn day_label(target: NaiveDate, today: NaiveDate) -> String {
    if target == today {
        return "today".to_string();
    }

    if today.succ_opt() == Some(target) {
        return "tomorrow".to_string();
    }

    target.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_countdown_components() {
        assert_eq!(format_hhmmss(3661), "01:01:01");
        assert_eq!(format_hhmmss(59), "00:00:59");
        assert_eq!(format_hhmmss(0), "00:00:00");
        assert_eq!(format_hhmmss(-42), "00:00:00");
    }

    #[test]
    fn parses_time_with_trailing_zone_label() {
        let parsed = parse_time_on("05:12 (EET)", date(2024, 3, 1)).unwrap();
        assert_eq!(parsed, date(2024, 3, 1).and_hms_opt(5, 12, 0).unwrap());
    }

    #[test]
    fn parses_single_digit_hour() {
        let parsed = parse_time_on("5:07", date(2024, 3, 1)).unwrap();
        assert_eq!(parsed, date(2024, 3, 1).and_hms_opt(5, 7, 0).unwrap());
    }

    #[test]
    fn rejects_unparseable_and_out_of_range_times() {
        assert_eq!(parse_time_on("soon", date(2024, 3, 1)), None);
        assert_eq!(parse_time_on("", date(2024, 3, 1)), None);
        assert_eq!(parse_time_on("25:00", date(2024, 3, 1)), None);
        assert_eq!(parse_time_on("12:7", date(2024, 3, 1)), None);
    }

    #[test]
    fn labels_today_tomorrow_and_absolute_dates() {
        let today = date(2024, 2, 28);
        assert_eq!(day_label(today, today), "today");
        assert_eq!(day_label(date(2024, 2, 29), today), "tomorrow");
        assert_eq!(day_label(date(2024, 3, 5), today), "05/03/2024");
    }

    #[test]
    fn api_date_uses_day_month_year() {
        assert_eq!(format_api_date(date(2024, 3, 1)), "01-03-2024");
        assert_eq!(parse_api_date("01-03-2024"), Some(date(2024, 3, 1)));
        assert_eq!(parse_api_date("2024-03-01"), None);
    }
}
