use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{NextPrayer, Prayer, Timings};
use crate::time::parse_time_on;

/// Ticker period for the countdown display.
pub const TICK_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);

/// Earliest of today's prayers strictly after `now`.
///
/// Entries that are missing or do not contain a readable time are skipped.
/// `None` means every prayer of the day has passed and the caller has to roll
/// over to tomorrow's Fajr.
pub fn find_next_prayer(timings: &Timings, now: NaiveDateTime) -> Option<NextPrayer> {
    let today = now.date();

    Prayer::ALL.iter().find_map(|&prayer| {
        let time_str = timings.get(prayer)?;
        let at = parse_time_on(time_str, today)?;
        (at > now).then(|| NextPrayer {
            name: prayer,
            time_str: time_str.to_string(),
            next_date: at,
        })
    })
}

/// Fajr from a timings set fetched for `date`.
pub fn fajr_on(timings: &Timings, date: NaiveDate) -> Option<NextPrayer> {
    let time_str = timings.get(Prayer::Fajr)?;
    let at = parse_time_on(time_str, date)?;
    Some(NextPrayer {
        name: Prayer::Fajr,
        time_str: time_str.to_string(),
        next_date: at,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    Running { remaining_seconds: i64 },
    Expired,
}

pub fn countdown_status(record: &NextPrayer, now: NaiveDateTime) -> CountdownStatus {
    let remaining_seconds = (record.next_date - now).num_seconds();
    if remaining_seconds <= 0 {
        CountdownStatus::Expired
    } else {
        CountdownStatus::Running { remaining_seconds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn sample() -> Timings {
        [
            ("Fajr", "05:00"),
            ("Dhuhr", "12:30"),
            ("Asr", "16:00"),
            ("Maghrib", "18:45"),
            ("Isha", "20:15"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn picks_maghrib_in_the_late_afternoon() {
        let next = find_next_prayer(&sample(), at(17, 0)).unwrap();
        assert_eq!(next.name, Prayer::Maghrib);
        assert_eq!(next.time_str, "18:45");
        assert_eq!(next.next_date, at(18, 45));
    }

    #[test]
    fn exact_prayer_time_is_not_upcoming() {
        let next = find_next_prayer(&sample(), at(12, 30)).unwrap();
        assert_eq!(next.name, Prayer::Asr);
    }

    #[test]
    fn nothing_left_after_isha() {
        assert_eq!(find_next_prayer(&sample(), at(21, 0)), None);
    }

    #[test]
    fn skips_missing_and_garbled_entries() {
        let timings: Timings = [("Fajr", "05:00"), ("Dhuhr", "noon"), ("Isha", "20:15")]
            .into_iter()
            .collect();
        let next = find_next_prayer(&timings, at(6, 0)).unwrap();
        assert_eq!(next.name, Prayer::Isha);
    }

    #[test]
    fn scan_follows_fixed_order_not_map_order() {
        // BTreeMap orders "Asr" before "Fajr"; the scan must still start at Fajr.
        let next = find_next_prayer(&sample(), at(4, 0)).unwrap();
        assert_eq!(next.name, Prayer::Fajr);
    }

    #[test]
    fn fajr_is_placed_on_the_requested_date() {
        let tomorrow = day().succ_opt().unwrap();
        let next = fajr_on(&sample(), tomorrow).unwrap();
        assert_eq!(next.next_date, tomorrow.and_hms_opt(5, 0, 0).unwrap());
    }

    #[test]
    fn countdown_expires_at_target() {
        let record = NextPrayer {
            name: Prayer::Asr,
            time_str: "16:00".to_string(),
            next_date: at(16, 0),
        };
        assert_eq!(
            countdown_status(&record, at(14, 59)),
            CountdownStatus::Running {
                remaining_seconds: 3660
            }
        );
        assert_eq!(countdown_status(&record, at(16, 0)), CountdownStatus::Expired);
        assert_eq!(countdown_status(&record, at(16, 1)), CountdownStatus::Expired);
    }
}
