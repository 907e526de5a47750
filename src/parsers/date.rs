//! Listing timestamp parsing shared by the Unix and NetWare dialects
//! (spec §4.6 "Date heuristics")

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::config::ParserConfig;

const DEFAULT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_table(config: &ParserConfig) -> Vec<String> {
    if let Some(months) = &config.short_month_names {
        months.split('|').map(str::to_string).collect()
    } else {
        DEFAULT_MONTHS.iter().map(|m| m.to_string()).collect()
    }
}

fn month_index(config: &ParserConfig, token: &str) -> Option<u32> {
    let table = month_table(config);
    table
        .iter()
        .position(|m| m.eq_ignore_ascii_case(token))
        .map(|i| i as u32 + 1)
}

/// Parse a Unix `ls -l` style date field: either `"Mon d HH:mm"` (recent,
/// year omitted) or `"Mon d yyyy"` (older than ~6 months).
///
/// `now` is injected by the caller (never read from the system clock inside
/// a parser) so detection stays deterministic and testable.
pub(crate) fn parse_unix_style_date(
    config: &ParserConfig,
    month_token: &str,
    day: u32,
    year_or_time: &str,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let month = month_index(config, month_token)?;
    let offset = config.server_time_zone.unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());

    if let Some((hour, minute)) = year_or_time.split_once(':') {
        let hour: u32 = hour.parse().ok()?;
        let minute: u32 = minute.parse().ok()?;
        let mut year = now.year();
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        let mut naive = NaiveDateTime::new(date, time);

        let local = offset.from_local_datetime(&naive).single()?;
        if config.lenient_future_dates && local.with_timezone(&Utc) > now + chrono::Duration::days(1) {
            year -= 1;
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            naive = NaiveDateTime::new(date, time);
        }
        let local = offset.from_local_datetime(&naive).single()?;
        Some(local.with_timezone(&Utc))
    } else {
        let year: i32 = year_or_time.parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let naive = NaiveDateTime::new(date, NaiveTime::MIN);
        let local = offset.from_local_datetime(&naive).single()?;
        Some(local.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn default_config() -> ParserConfig {
        ParserConfig { lenient_future_dates: true, ..ParserConfig::default() }
    }

    #[test]
    fn parses_year_form() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let parsed = parse_unix_style_date(&default_config(), "Jan", 15, "2023", now).unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
    }

    #[test]
    fn parses_recent_time_form_in_current_year() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let parsed = parse_unix_style_date(&default_config(), "May", 20, "14:30", now).unwrap();
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 5);
    }

    #[test]
    fn rolls_back_a_year_for_future_recent_dates_when_lenient() {
        // "now" is early January; a December entry without a year must be
        // last December, not a date in the future.
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let parsed = parse_unix_style_date(&default_config(), "Dec", 20, "09:00", now).unwrap();
        assert_eq!(parsed.year(), 2023);
    }

    #[test]
    fn unknown_month_token_returns_none() {
        assert!(parse_unix_style_date(&default_config(), "Xyz", 1, "2023", Utc::now()).is_none());
    }
}
