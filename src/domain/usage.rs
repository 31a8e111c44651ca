// Daily usage series for the calendar heat-map
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyUsagePoint {
    pub day: NaiveDate,
    pub value: f64,
}

impl DailyUsagePoint {
    pub fn new(day: NaiveDate, value: f64) -> Self {
        Self { day, value }
    }

    /// Canonical `YYYY-MM-DD` form of the day
    pub fn day_key(&self) -> String {
        self.day.format(DAY_FORMAT).to_string()
    }
}

/// Bounds consumed by the calendar renderer. Only exists for a non-empty series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_value: f64,
    pub max_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UsageSeries {
    points: Vec<DailyUsagePoint>,
}

impl UsageSeries {
    /// Build a series from the backend's `date -> total` mapping.
    ///
    /// Entries keep input order. Keys that parse neither as ISO-8601 nor as a
    /// `YYYY-MM-DD` pattern are dropped, as are non-numeric or negative values;
    /// none of these aborts the batch.
    pub fn from_daily_totals(totals: &Map<String, Value>) -> Self {
        let mut seen = HashSet::with_capacity(totals.len());
        let mut points = Vec::with_capacity(totals.len());

        for (key, raw) in totals {
            let Some(day) = parse_usage_day(key) else {
                tracing::warn!("Skipping usage entry with unparseable date key: {:?}", key);
                continue;
            };

            let Some(value) = raw.as_f64() else {
                tracing::warn!("Skipping usage entry {} with non-numeric value: {}", key, raw);
                continue;
            };

            if value < 0.0 {
                tracing::warn!("Skipping usage entry {} with negative total: {}", key, value);
                continue;
            }

            if !seen.insert(day) {
                tracing::warn!("Skipping duplicate usage entry for day {} (key {:?})", day, key);
                continue;
            }

            points.push(DailyUsagePoint::new(day, value));
        }

        Self { points }
    }

    pub fn points(&self) -> &[DailyUsagePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points ordered by day
    pub fn sorted(&self) -> Vec<DailyUsagePoint> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.day);
        points
    }

    /// Date and value bounds, or `None` when there is nothing to plot
    pub fn range(&self) -> Option<UsageRange> {
        let first = self.points.first()?;
        let mut range = UsageRange {
            start_date: first.day,
            end_date: first.day,
            min_value: first.value,
            max_value: first.value,
        };

        for point in &self.points[1..] {
            range.start_date = range.start_date.min(point.day);
            range.end_date = range.end_date.max(point.day);
            range.min_value = range.min_value.min(point.value);
            range.max_value = range.max_value.max(point.value);
        }

        Some(range)
    }
}

/// What the calendar widget is handed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CalendarView {
    NoData,
    #[serde(rename_all = "camelCase")]
    Calendar {
        from: NaiveDate,
        to: NaiveDate,
        min_value: f64,
        max_value: f64,
        data: Vec<DailyUsagePoint>,
    },
}

impl From<&UsageSeries> for CalendarView {
    fn from(series: &UsageSeries) -> Self {
        match series.range() {
            Some(range) => CalendarView::Calendar {
                from: range.start_date,
                to: range.end_date,
                min_value: range.min_value,
                max_value: range.max_value,
                data: series.sorted(),
            },
            None => CalendarView::NoData,
        }
    }
}

/// Parse a usage key, trying ISO-8601 first and the looser `YYYY-MM-DD` pattern second
pub fn parse_usage_day(key: &str) -> Option<NaiveDate> {
    parse_iso_date(key).or_else(|| parse_day_pattern(key))
}

fn parse_iso_date(key: &str) -> Option<NaiveDate> {
    let (date, time) = match key.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (key, None),
    };
    let date = parse_calendar_date(date)?;

    match time {
        None => Some(date),
        // Date-time in any offset: keep the calendar date as written
        Some(time) => is_iso_time(time).then_some(date),
    }
}

/// Calendar date, extended (`YYYY-MM-DD`) and basic (`YYYYMMDD`) forms
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    match s.len() {
        10 => NaiveDate::parse_from_str(s, DAY_FORMAT).ok(),
        8 if s.bytes().all(|b| b.is_ascii_digit()) => NaiveDate::parse_from_str(s, "%Y%m%d").ok(),
        _ => None,
    }
}

fn is_iso_time(time: &str) -> bool {
    let Some(clock) = strip_offset(time) else {
        return false;
    };
    is_hour(clock)
        || TIME_FORMATS
            .iter()
            .any(|format| NaiveTime::parse_from_str(clock, format).is_ok())
}

/// Drop a trailing `Z`, `±HH`, `±HHMM` or `±HH:MM`. `None` if the offset is malformed.
fn strip_offset(time: &str) -> Option<&str> {
    if let Some(clock) = time.strip_suffix('Z') {
        return Some(clock);
    }
    let Some(at) = time.rfind(['+', '-']) else {
        return Some(time);
    };

    let offset = &time[at + 1..];
    let valid = is_hour(offset)
        || (offset.len() >= 4
            && ["%H%M", "%H:%M"]
                .iter()
                .any(|format| NaiveTime::parse_from_str(offset, format).is_ok()));
    valid.then_some(&time[..at])
}

fn is_hour(s: &str) -> bool {
    s.len() == 2 && s.parse::<u8>().is_ok_and(|hour| hour < 24)
}

fn parse_day_pattern(key: &str) -> Option<NaiveDate> {
    let (date, rest) = NaiveDate::parse_and_remainder(key.trim(), DAY_FORMAT).ok()?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(date)
    } else {
        None
    }
}
