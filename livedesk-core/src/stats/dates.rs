// src/stats/dates.rs

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use livedesk_common::models::SessionWindow;

use crate::Error;
use crate::codec::DateSelector;

/// Current window plus the window it is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindows {
    pub current: SessionWindow,
    /// `None` for all-time, which is never diffed.
    pub previous: Option<SessionWindow>,
}

fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // midnight fell into a DST gap
        None => Utc.from_utc_datetime(&naive),
    }
}

fn shift_months(date: NaiveDate, months: i32) -> Result<NaiveDate, Error> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(|| Error::Parse(format!("date {date} shifted by {months} months is out of range")))
}

/// Resolves a date selector relative to `now` in `tz`. Weeks start on Monday.
/// Month and year windows are compared with the previous calendar month or
/// year rather than a window of identical length.
pub fn resolve(selector: DateSelector, now: DateTime<Utc>, tz: Tz) -> Result<DateWindows, Error> {
    let today = now.with_timezone(&tz).date_naive();
    let week = today - TimeDelta::days(today.weekday().num_days_from_monday() as i64);
    let month = today.with_day(1).ok_or_else(|| Error::Parse(format!("no first day for {today}")))?;
    let year = NaiveDate::from_ymd_opt(today.year(), 1, 1)
        .ok_or_else(|| Error::Parse(format!("no first day of year for {today}")))?;
    let day = TimeDelta::days(1);
    let week_len = TimeDelta::days(7);

    let (cur_from, cur_to, prev_from, prev_to) = match selector {
        DateSelector::Today => (today, today + day, today - day, today),
        DateSelector::Yesterday => (today - day, today, today - day * 2, today - day),
        DateSelector::ThisWeek => (week, week + week_len, week - week_len, week),
        DateSelector::LastWeek => (week - week_len, week, week - week_len * 2, week - week_len),
        DateSelector::ThisMonth => (
            month,
            shift_months(month, 1)?,
            shift_months(month, -1)?,
            month,
        ),
        DateSelector::LastMonth => (
            shift_months(month, -1)?,
            month,
            shift_months(month, -2)?,
            shift_months(month, -1)?,
        ),
        DateSelector::ThisYear => (
            year,
            shift_months(year, 12)?,
            shift_months(year, -12)?,
            year,
        ),
        DateSelector::LastYear => (
            shift_months(year, -12)?,
            year,
            shift_months(year, -24)?,
            shift_months(year, -12)?,
        ),
        DateSelector::AllTime => {
            return Ok(DateWindows {
                current: SessionWindow::unbounded(),
                previous: None,
            });
        }
    };

    Ok(DateWindows {
        current: SessionWindow::new(local_midnight(tz, cur_from), local_midnight(tz, cur_to)),
        previous: Some(SessionWindow::new(
            local_midnight(tz, prev_from),
            local_midnight(tz, prev_to),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn ist(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Kolkata
            .with_ymd_and_hms(y, m, d, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    // Wednesday 2024-03-13, 01:30 in Kolkata but still the 12th in UTC.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 12, 20, 0, 0).unwrap()
    }

    #[test]
    fn test_today_uses_local_calendar_day() {
        let w = resolve(DateSelector::Today, now(), Kolkata).unwrap();
        assert_eq!(w.current, SessionWindow::new(ist(2024, 3, 13), ist(2024, 3, 14)));
        assert_eq!(w.previous, Some(SessionWindow::new(ist(2024, 3, 12), ist(2024, 3, 13))));
    }

    #[test]
    fn test_weeks_start_monday() {
        let w = resolve(DateSelector::ThisWeek, now(), Kolkata).unwrap();
        assert_eq!(w.current, SessionWindow::new(ist(2024, 3, 11), ist(2024, 3, 18)));

        let last = resolve(DateSelector::LastWeek, now(), Kolkata).unwrap();
        assert_eq!(last.current, SessionWindow::new(ist(2024, 3, 4), ist(2024, 3, 11)));
        assert_eq!(last.previous, Some(SessionWindow::new(ist(2024, 2, 26), ist(2024, 3, 4))));
    }

    #[test]
    fn test_months_and_years_are_calendar_aligned() {
        let m = resolve(DateSelector::LastMonth, now(), Kolkata).unwrap();
        assert_eq!(m.current, SessionWindow::new(ist(2024, 2, 1), ist(2024, 3, 1)));
        assert_eq!(m.previous, Some(SessionWindow::new(ist(2024, 1, 1), ist(2024, 2, 1))));

        let y = resolve(DateSelector::ThisYear, now(), Kolkata).unwrap();
        assert_eq!(y.current, SessionWindow::new(ist(2024, 1, 1), ist(2025, 1, 1)));
        assert_eq!(y.previous, Some(SessionWindow::new(ist(2023, 1, 1), ist(2024, 1, 1))));
    }

    #[test]
    fn test_all_time_is_unbounded_without_previous() {
        let w = resolve(DateSelector::AllTime, now(), Kolkata).unwrap();
        assert!(!w.current.is_bounded());
        assert!(w.previous.is_none());
    }
}
