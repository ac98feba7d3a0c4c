//! Human readable durations and ages shown next to member and leader records

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;
const MONTH: i64 = 2_419_200;
const YEAR: i64 = 29_030_400;

/// East Africa Time, UTC+3 with no daylight saving
const EAT_OFFSET_HOURS: i64 = 3;

/// Current calendar date in East Africa Time
pub fn local_today(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(EAT_OFFSET_HOURS)).date_naive()
}

fn plural(count: i64, unit: &str) -> String {
    if count > 1 {
        format!("Since {} {}s ago", count, unit)
    } else {
        format!("Since {} {} ago", count, unit)
    }
}

/// "Just now", "Since 5 minutes ago", ... "Since 2 years ago".
///
/// Months are four weeks and years twelve such months.
pub fn format_time_since(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "N/A".to_string();
    };

    let seconds = (now - created).num_seconds();
    if seconds < MINUTE {
        "Just now".to_string()
    } else if seconds < HOUR {
        plural(seconds / MINUTE, "minute")
    } else if seconds < DAY {
        plural(seconds / HOUR, "hour")
    } else if seconds < WEEK {
        plural(seconds / DAY, "day")
    } else if seconds < MONTH {
        plural(seconds / WEEK, "week")
    } else if seconds < YEAR {
        plural(seconds / MONTH, "month")
    } else {
        plural(seconds / YEAR, "year")
    }
}

/// Shorter variant used on member detail pages ("3 week(s) ago").
pub fn since_created(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - created;
    let days = delta.num_days();
    let seconds = delta.num_seconds();

    if days < 1 {
        if seconds < MINUTE {
            "Just now".to_string()
        } else if seconds < HOUR {
            format!("{} minute(s) ago", seconds / MINUTE)
        } else {
            format!("{} hour(s) ago", seconds / HOUR)
        }
    } else if days == 1 {
        "1 day ago".to_string()
    } else if days < 7 {
        format!("{} day(s) ago", days)
    } else if days < 30 {
        format!("{} week(s) ago", days / 7)
    } else if days < 365 {
        format!("{} month(s) ago", days / 30)
    } else {
        format!("{} year(s) ago", days / 365)
    }
}

/// Whole years between `date_of_birth` and `today`
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let had_birthday = (today.month(), today.day()) >= (date_of_birth.month(), date_of_birth.day());
    today.year() - date_of_birth.year() - if had_birthday { 0 } else { 1 }
}

/// "34 years old", or "----" when the birth date is unknown
pub fn age_label(date_of_birth: Option<NaiveDate>, today: NaiveDate) -> String {
    match date_of_birth {
        Some(dob) => format!("{} years old", age_in_years(dob, today)),
        None => "----".to_string(),
    }
}

/// "Y years, M months, D days" since `start_date`, borrowing 30 days per month.
pub fn time_in_service(start_date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(start) = start_date else {
        return String::new();
    };

    let mut years = today.year() - start.year();
    let mut months = today.month() as i32 - start.month() as i32;
    let mut days = today.day() as i32 - start.day() as i32;

    if days < 0 {
        months -= 1;
        days += 30;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }

    format!("{} years, {} months, {} days", years, months, days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs_ago: i64) -> (Option<DateTime<Utc>>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        (Some(now - Duration::seconds(secs_ago)), now)
    }

    #[test]
    fn test_time_since_buckets() {
        let cases = [
            (0, "Just now"),
            (59, "Just now"),
            (60, "Since 1 minute ago"),
            (150, "Since 2 minutes ago"),
            (3_600, "Since 1 hour ago"),
            (86_399, "Since 23 hours ago"),
            (2 * DAY, "Since 2 days ago"),
            (WEEK, "Since 1 week ago"),
            (3 * WEEK, "Since 3 weeks ago"),
            (MONTH, "Since 1 month ago"),
            (11 * MONTH, "Since 11 months ago"),
            (YEAR, "Since 1 year ago"),
            (3 * YEAR + 5, "Since 3 years ago"),
        ];

        for (secs, expected) in cases {
            let (created, now) = at(secs);
            assert_eq!(format_time_since(created, now), expected, "{} seconds", secs);
        }
    }

    #[test]
    fn test_time_since_missing_date() {
        assert_eq!(format_time_since(None, Utc::now()), "N/A");
    }

    #[test]
    fn test_since_created() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(since_created(now - Duration::minutes(5), now), "5 minute(s) ago");
        assert_eq!(since_created(now - Duration::days(1), now), "1 day ago");
        assert_eq!(since_created(now - Duration::days(20), now), "2 week(s) ago");
        assert_eq!(since_created(now - Duration::days(400), now), "1 year(s) ago");
    }

    #[test]
    fn test_age_label() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let dob = NaiveDate::from_ymd_opt(1990, 6, 2).unwrap();
        assert_eq!(age_label(Some(dob), today), "33 years old");

        let dob = NaiveDate::from_ymd_opt(1990, 6, 1).unwrap();
        assert_eq!(age_label(Some(dob), today), "34 years old");
        assert_eq!(age_label(None, today), "----");
    }

    #[test]
    fn test_time_in_service_borrows() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let start = NaiveDate::from_ymd_opt(2021, 5, 20).unwrap();
        assert_eq!(time_in_service(Some(start), today), "2 years, 9 months, 15 days");
        assert_eq!(time_in_service(None, today), "");
    }

    #[test]
    fn test_local_today_crosses_midnight() {
        let late_utc = Utc.with_ymd_and_hms(2024, 12, 31, 22, 30, 0).unwrap();
        assert_eq!(local_today(late_utc), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
