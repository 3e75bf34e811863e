//! Calendar rules for the diary service.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Timelike};

/// The diary day a run at `now` should target.
///
/// A diary day does not roll over at midnight: entries logged in the small
/// hours belong to the previous date, so a run shortly after midnight still
/// targets "yesterday". `boundary_hour` is the local hour (0..=23) at which
/// the switch to the current date happens.
#[must_use]
pub fn effective_date<Tz: TimeZone>(now: DateTime<Tz>, boundary_hour: u32) -> NaiveDate {
    let today = now.date_naive();
    if now.hour() < boundary_hour {
        today.checked_sub_days(Days::new(1)).unwrap_or(today)
    } else {
        today
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn tokyo(y: i32, m: u32, d: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, hour, min, 0)
            .unwrap()
    }

    #[test]
    fn small_hours_belong_to_previous_day() {
        let date = effective_date(tokyo(2026, 8, 25, 0, 30), 3);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
    }

    #[test]
    fn boundary_hour_itself_is_the_new_day() {
        let date = effective_date(tokyo(2026, 8, 25, 3, 0), 3);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
    }

    #[test]
    fn daytime_is_the_current_day() {
        let date = effective_date(tokyo(2026, 8, 25, 12, 0), 3);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
    }

    #[test]
    fn zero_boundary_never_shifts() {
        let date = effective_date(tokyo(2026, 8, 25, 0, 0), 0);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
    }

    #[test]
    fn month_rollover_shifts_into_previous_month() {
        let date = effective_date(tokyo(2026, 9, 1, 1, 0), 3);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());
    }
}
