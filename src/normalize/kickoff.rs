use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Naive timestamp layouts accepted after RFC 3339; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a kickoff timestamp from a `datetime` attribute.
pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn format_kickoff(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_offset_timestamps() {
        let dt = parse_kickoff("2026-03-07T18:30:00+10:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 7, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_naive_and_date_only_are_utc() {
        assert_eq!(
            parse_kickoff("2026-03-07T18:30").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 7, 18, 30, 0).unwrap()
        );
        assert_eq!(
            parse_kickoff("2026-03-07").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(parse_kickoff("TBC").is_none());
        assert!(parse_kickoff("   ").is_none());
    }

    #[test]
    fn test_formats_with_zulu_suffix() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 7, 8, 30, 0).unwrap();
        assert_eq!(format_kickoff(&dt), "2026-03-07T08:30:00Z");
    }
}
