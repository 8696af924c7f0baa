use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Human-readable byte size: whole bytes below 1 KB, two decimals above
pub fn human_bytes(bytes: Option<i64>) -> String {
    let Some(bytes) = bytes else {
        return "-".to_string();
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{:.0} {}", value, SIZE_UNITS[unit])
    } else {
        format!("{:.2} {}", value, SIZE_UNITS[unit])
    }
}

/// Parse a `YYYY-MM-DD` filter value; blank or malformed input yields `None`
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// First instant of `date` in UTC
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Last millisecond of `date` in UTC
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + chrono::Duration::days(1) - chrono::Duration::milliseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(None), "-");
        assert_eq!(human_bytes(Some(0)), "0 B");
        assert_eq!(human_bytes(Some(1023)), "1023 B");
        assert_eq!(human_bytes(Some(1024)), "1.00 KB");
        assert_eq!(human_bytes(Some(1536)), "1.50 KB");
        assert_eq!(human_bytes(Some(5 * 1024 * 1024)), "5.00 MB");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2024-03-01")),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date(Some(" 2024-03-01 ")), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("01/03/2024")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(start_of_day(date).to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(
            end_of_day(date).to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2024-03-01T23:59:59.999Z"
        );
    }
}
