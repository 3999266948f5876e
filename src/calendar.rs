//! Month calendar aggregation: one bucket per day of the month, each holding the
//! titles of the activities that start on that UTC date.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::db::{MAX_TS_YEAR, MIN_TS_YEAR};
use crate::validation::ValidationError;

pub const MIN_YEAR: i32 = MIN_TS_YEAR;
pub const MAX_YEAR: i32 = MAX_TS_YEAR;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarEntry {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub activities: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub count: usize,
}

/// Parses the raw `year` / `month` query values.
pub fn parse_year_month(year: Option<&str>, month: Option<&str>) -> Result<(i32, u32), ValidationError> {
    let (year, month) = match (year.map(str::trim), month.map(str::trim)) {
        (Some(y), Some(m)) if !y.is_empty() && !m.is_empty() => (y, m),
        _ => return Err(ValidationError("year and month are required".to_string())),
    };
    let year = year
        .parse::<i32>()
        .ok()
        .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
        .ok_or_else(|| ValidationError("invalid year".to_string()))?;
    let month = month
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| ValidationError("invalid month".to_string()))?;
    Ok((year, month))
}

/// Half-open `[first of month, first of next month)` in UTC.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = Utc.with_ymd_and_hms(ny, nm, 1, 0, 0, 0).single()?;
    Some((start, end))
}

/// Day-of-month of the last instant before the next month starts.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (_, end) = month_bounds(year, month)?;
    Some((end - Duration::nanoseconds(1)).day())
}

/// Buckets `(time_start, title)` pairs by UTC date. Pairs outside the month are dropped.
pub fn build_month_calendar<I>(year: i32, month: u32, activities: I) -> Option<MonthCalendar>
where
    I: IntoIterator<Item = (DateTime<Utc>, String)>,
{
    let n = days_in_month(year, month)?;
    let mut buckets: Vec<Vec<CalendarEntry>> = vec![Vec::new(); n as usize];

    for (start, title) in activities {
        let date = start.date_naive();
        if date.year() != year || date.month() != month {
            continue;
        }
        if let Some(bucket) = buckets.get_mut(date.day0() as usize) {
            bucket.push(CalendarEntry { title });
        }
    }

    let mut days = Vec::with_capacity(n as usize);
    for (i, activities) in buckets.into_iter().enumerate() {
        let date = NaiveDate::from_ymd_opt(year, month, i as u32 + 1)?;
        days.push(CalendarDay { date: date.format("%Y-%m-%d").to_string(), activities });
    }

    Some(MonthCalendar { year, month, count: days.len(), days })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn month_lengths_respect_leap_years() {
        assert_eq!(days_in_month(2025, 9), Some(30));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(9999, 12), Some(31));
    }

    #[test]
    fn calendar_has_one_ordered_bucket_per_day() {
        let cal = build_month_calendar(2025, 9, Vec::new()).unwrap();
        assert_eq!(cal.count, 30);
        assert_eq!(cal.days.len(), 30);
        assert_eq!(cal.days[0].date, "2025-09-01");
        assert_eq!(cal.days[29].date, "2025-09-30");
        assert!(cal.days.windows(2).all(|w| w[0].date < w[1].date));
        assert!(cal.days.iter().all(|d| d.activities.is_empty()));
    }

    #[test]
    fn activities_land_in_their_utc_day() {
        let acts = vec![
            (at("2025-09-15T10:00:00Z"), "Prune".to_string()),
            (at("2025-09-15T23:30:00-02:00"), "Late water".to_string()),
            (at("2025-09-01T00:00:00Z"), "Seed".to_string()),
            (at("2025-10-01T00:00:00Z"), "Out of range".to_string()),
        ];
        let cal = build_month_calendar(2025, 9, acts).unwrap();

        assert_eq!(cal.days[14].date, "2025-09-15");
        assert_eq!(cal.days[14].activities, vec![CalendarEntry { title: "Prune".into() }]);
        // 23:30 at UTC-2 is the 16th in UTC
        assert_eq!(cal.days[15].activities, vec![CalendarEntry { title: "Late water".into() }]);
        assert_eq!(cal.days[0].activities.len(), 1);
        let total: usize = cal.days.iter().map(|d| d.activities.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn february_leap_bucket_count() {
        let cal = build_month_calendar(2024, 2, Vec::new()).unwrap();
        assert_eq!(cal.count, 29);
        assert_eq!(cal.days.last().unwrap().date, "2024-02-29");
    }

    #[test]
    fn month_bounds_are_half_open() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, at("2025-12-01T00:00:00Z"));
        assert_eq!(end, at("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn parse_year_month_rejects_bad_input() {
        assert_eq!(parse_year_month(Some("2025"), Some("9")), Ok((2025, 9)));
        assert_eq!(parse_year_month(None, Some("9")).unwrap_err().0, "year and month are required");
        assert_eq!(parse_year_month(Some("2025"), Some("")).unwrap_err().0, "year and month are required");
        assert_eq!(parse_year_month(Some("0"), Some("9")).unwrap_err().0, "invalid year");
        assert_eq!(parse_year_month(Some("10000"), Some("9")).unwrap_err().0, "invalid year");
        assert_eq!(parse_year_month(Some("abc"), Some("9")).unwrap_err().0, "invalid year");
        assert_eq!(parse_year_month(Some("2025"), Some("13")).unwrap_err().0, "invalid month");
        assert_eq!(parse_year_month(Some("2025"), Some("0")).unwrap_err().0, "invalid month");
    }
}
