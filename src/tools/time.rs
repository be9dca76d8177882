//! Time Tool
//!
//! Current time and date, locally, in an IANA zone or at a fixed UTC
//! offset.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};

use super::{Tool, ToolOutput};
use crate::error::AgentResult;

const FORMATS: &[&str] = &["time", "date", "datetime", "timestamp", "timezone"];

#[derive(Default)]
pub struct TimeTool;

/// Resolve a timezone argument to the offset in force at `at` and a
/// display label.
///
/// Accepts `""` (local), `UTC`/`Z`, IANA names such as
/// `America/New_York`, and `±HH:MM`, `±HHMM` or `±HH` optionally prefixed
/// with `UTC`.
pub fn parse_timezone(input: &str, at: DateTime<Utc>) -> Option<(FixedOffset, String)> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        let offset = at.with_timezone(&Local).offset().fix();
        return Some((offset, format!("Local (UTC{})", offset)));
    }

    let upper = trimmed.to_ascii_uppercase();
    if upper == "UTC" || upper == "Z" || upper == "GMT" {
        return Some((Utc.fix(), "UTC".to_string()));
    }

    if let Ok(zone) = trimmed.parse::<Tz>() {
        let offset = zone.offset_from_utc_datetime(&at.naive_utc()).fix();
        return Some((offset, format!("{} (UTC{})", zone.name(), offset)));
    }

    parse_fixed_offset(&upper)
}

fn parse_fixed_offset(upper: &str) -> Option<(FixedOffset, String)> {

    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(upper);

    let (sign, digits) = match rest.chars().next()? {
        '+' => (1, &rest[1..]),
        '-' => (-1, &rest[1..]),
        _ => return None,
    };

    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        3 => (digits[..1].parse::<i32>().ok()?, digits[1..].parse::<i32>().ok()?),
        _ => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
    };
    if hours > 14 || minutes > 59 {
        return None;
    }

    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
    Some((offset, format!("UTC{}", offset)))
}

/// Render `now` in one of the supported formats
pub fn format_time(now: &DateTime<FixedOffset>, format: &str, zone_label: &str) -> String {
    match format {
        "time" => format!("Current time: {}", now.format("%-I:%M:%S %p")),
        "date" => format!("Current date: {}", now.format("%-m/%-d/%Y")),
        "timestamp" => format!("Unix timestamp: {}", now.timestamp()),
        "timezone" => format!("Current timezone: {}", zone_label),
        _ => format!(
            "Current date and time: {}",
            now.format("%-m/%-d/%Y, %-I:%M:%S %p")
        ),
    }
}

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> String {
        "get_time".to_string()
    }

    fn description(&self) -> String {
        "Get current time, date, or timezone information".to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "enum": FORMATS,
                    "description": "The time format to return"
                },
                "timezone": {
                    "type": "string",
                    "default": "",
                    "description": "Timezone (e.g., \"America/New_York\", \"UTC\" or \"+05:30\"), leave empty for local timezone"
                }
            },
            "required": ["format"]
        })
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let format = params["format"].as_str().unwrap_or("datetime");
        let timezone = params["timezone"].as_str().unwrap_or("");

        let instant = Utc::now();
        let (offset, label) = match parse_timezone(timezone, instant) {
            Some(zone) => zone,
            None => {
                return Ok(ToolOutput::failure(format!(
                    "Unknown timezone \"{}\": use an IANA name, UTC or an offset such as +05:30",
                    timezone
                )))
            }
        };

        let now = instant.with_timezone(&offset);
        let text = format_time(&now, format, &label);
        Ok(ToolOutput::success(
            json!({
                "iso": now.to_rfc3339(),
                "timestamp": now.timestamp(),
                "timezone": label,
            }),
            text,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(secs: i32) -> FixedOffset {
        FixedOffset::east_opt(secs).unwrap()
    }

    fn zone(input: &str) -> Option<(FixedOffset, String)> {
        parse_timezone(input, Utc::now())
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(zone("UTC").unwrap().0, fixed(0));
        assert_eq!(zone("utc").unwrap().1, "UTC");
        assert_eq!(zone("+05:30").unwrap().0, fixed(5 * 3600 + 1800));
        assert_eq!(zone("UTC-08:00").unwrap().0, fixed(-8 * 3600));
        assert_eq!(zone("-0330").unwrap().0, fixed(-(3 * 3600 + 1800)));
        assert_eq!(zone("+9").unwrap().0, fixed(9 * 3600));
        assert_eq!(zone("+05:30").unwrap().1, "UTC+05:30");
        assert!(zone("").is_some());

        assert!(zone("Mars/Olympus").is_none());
        assert!(zone("+25:00").is_none());
        assert!(zone("+05:75").is_none());
        assert!(zone("+").is_none());
    }

    #[test]
    fn test_parse_iana_timezone() {
        let summer = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

        let (offset, label) = parse_timezone("America/New_York", summer).unwrap();
        assert_eq!(offset, fixed(-4 * 3600));
        assert_eq!(label, "America/New_York (UTC-04:00)");
        assert_eq!(parse_timezone("America/New_York", winter).unwrap().0, fixed(-5 * 3600));

        assert_eq!(parse_timezone("Asia/Kolkata", winter).unwrap().0, fixed(5 * 3600 + 1800));
        assert_eq!(parse_timezone("Europe/London", summer).unwrap().0, fixed(3600));
    }

    #[test]
    fn test_format_time() {
        let now = fixed(3600).with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(format_time(&now, "time", "x"), "Current time: 2:05:09 PM");
        assert_eq!(format_time(&now, "date", "x"), "Current date: 3/7/2024");
        assert_eq!(
            format_time(&now, "datetime", "x"),
            "Current date and time: 3/7/2024, 2:05:09 PM"
        );
        assert_eq!(
            format_time(&now, "timestamp", "x"),
            format!("Unix timestamp: {}", now.timestamp())
        );
        assert_eq!(
            format_time(&now, "timezone", "UTC+01:00"),
            "Current timezone: UTC+01:00"
        );
    }

    #[tokio::test]
    async fn test_time_tool() {
        let tool = TimeTool;
        let res = tool
            .execute(json!({"format": "timezone", "timezone": "+02:00"}))
            .await
            .unwrap();
        assert!(res.success);
        assert_eq!(res.summary, "Current timezone: UTC+02:00");

        let named = tool
            .execute(json!({"format": "timezone", "timezone": "America/New_York"}))
            .await
            .unwrap();
        assert!(named.success);
        assert!(named.summary.starts_with("Current timezone: America/New_York (UTC-0"));

        let bad = tool
            .execute(json!({"format": "time", "timezone": "Mars/Olympus"}))
            .await
            .unwrap();
        assert!(!bad.success);
        assert!(!tool.cacheable());
    }
}
