//! Service time handling.
//!
//! Timetables express times relative to the start of a service day. Services
//! that run past midnight keep counting, so a departure at 00:30 on the
//! following morning is `24:30` here. This module provides a compact minute
//! based time and an inclusive time window.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Latest representable time: the end of the following service day.
const MAX_MINUTES: u32 = 2 * MINUTES_PER_DAY - 1;

/// Minutes since the start of the service day.
///
/// # Examples
///
/// ```
/// use interchange_planner::domain::ServiceTime;
///
/// let t = ServiceTime::parse_hhmm("23:50").unwrap();
/// let later = t.plus_minutes(20).unwrap();
/// assert!(later.is_next_day());
/// assert_eq!(later.to_string(), "00:10+1");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: ServiceTime = ServiceTime(0);

    /// Create a time from hour and minute, where `hour` may be 24..=47 for
    /// the following day.
    pub fn of(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        match hour.checked_mul(60).and_then(|h| h.checked_add(minute)) {
            Some(total) if total <= MAX_MINUTES => Ok(Self(total)),
            _ => Err(TimeError::new("hour must be 0-47")),
        }
    }

    /// Create a time from minutes since the start of the service day.
    pub fn from_minutes(minutes: u32) -> Result<Self, TimeError> {
        if minutes > MAX_MINUTES {
            return Err(TimeError::new("beyond end of following day"));
        }
        Ok(Self(minutes))
    }

    /// Parse a time from "HH:MM" format, where hours 24-47 denote the next day.
    ///
    /// # Examples
    ///
    /// ```
    /// use interchange_planner::domain::ServiceTime;
    ///
    /// assert!(ServiceTime::parse_hhmm("00:00").is_ok());
    /// assert!(ServiceTime::parse_hhmm("25:15").unwrap().is_next_day());
    /// assert!(ServiceTime::parse_hhmm("1430").is_err());
    /// assert!(ServiceTime::parse_hhmm("14:60").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::of(hour, minute)
    }

    /// Minutes since the start of the service day.
    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Hour of the service day, 24 and above for the following day.
    pub fn hour(&self) -> u32 {
        self.0 / 60
    }

    /// Minute within the hour.
    pub fn minute(&self) -> u32 {
        self.0 % 60
    }

    /// Returns true if the time falls on the following calendar day.
    pub fn is_next_day(&self) -> bool {
        self.0 >= MINUTES_PER_DAY
    }

    /// Add minutes, returning `None` past the end of the following day.
    pub fn plus_minutes(&self, minutes: u32) -> Option<Self> {
        let total = self.0.checked_add(minutes)?;
        (total <= MAX_MINUTES).then_some(Self(total))
    }

    /// Minutes from `earlier` until `self`, or `None` if `earlier` is later.
    pub fn minutes_since(&self, earlier: ServiceTime) -> Option<u32> {
        self.0.checked_sub(earlier.0)
    }
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
        return None;
    }
    Some(u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0'))
}

impl Add<u32> for ServiceTime {
    type Output = Self;

    /// Saturates at the end of the following day.
    fn add(self, rhs: u32) -> Self::Output {
        Self(self.0.saturating_add(rhs).min(MAX_MINUTES))
    }
}

impl Sub for ServiceTime {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        i64::from(self.0) - i64::from(rhs.0)
    }
}

impl TryFrom<String> for ServiceTime {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse_hhmm(&s)
    }
}

impl From<ServiceTime> for String {
    fn from(t: ServiceTime) -> String {
        format!("{:02}:{:02}", t.hour(), t.minute())
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_next_day() {
            write!(f, "{:02}:{:02}+1", self.hour() - 24, self.minute())
        } else {
            write!(f, "{:02}:{:02}", self.hour(), self.minute())
        }
    }
}

/// An inclusive window of service times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    start: ServiceTime,
    end: ServiceTime,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    start: ServiceTime,
    end: ServiceTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = TimeError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Create a window, rejecting windows that end before they start.
    pub fn new(start: ServiceTime, end: ServiceTime) -> Result<Self, TimeError> {
        if end < start {
            return Err(TimeError::new("window ends before it starts"));
        }
        Ok(Self { start, end })
    }

    /// A window starting at `start` lasting `minutes`, clipped to the end of
    /// the following day.
    pub fn starting_at(start: ServiceTime, minutes: u32) -> Self {
        Self {
            start,
            end: start + minutes,
        }
    }

    /// The whole of the service day and the following one.
    pub fn all_day() -> Self {
        Self {
            start: ServiceTime::MIDNIGHT,
            end: ServiceTime(MAX_MINUTES),
        }
    }

    pub fn start(&self) -> ServiceTime {
        self.start
    }

    pub fn end(&self) -> ServiceTime {
        self.end
    }

    pub fn contains(&self, time: ServiceTime) -> bool {
        self.start <= time && time <= self.end
    }

    /// Returns true if the two windows share at least one minute.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ServiceTime {
        ServiceTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid() {
        assert_eq!(t("00:00").minutes(), 0);
        assert_eq!(t("14:30").minutes(), 14 * 60 + 30);
        assert_eq!(t("24:05").minutes(), 24 * 60 + 5);
        assert_eq!(t("47:59").minutes(), MAX_MINUTES);
    }

    #[test]
    fn parse_invalid() {
        assert!(ServiceTime::parse_hhmm("48:00").is_err());
        assert!(ServiceTime::parse_hhmm("12:60").is_err());
        assert!(ServiceTime::parse_hhmm("12-30").is_err());
        assert!(ServiceTime::parse_hhmm("1:30").is_err());
        assert!(ServiceTime::parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn display_marks_next_day() {
        assert_eq!(t("09:05").to_string(), "09:05");
        assert_eq!(t("25:40").to_string(), "01:40+1");
        assert_eq!(format!("{:?}", t("25:40")), "ServiceTime(25:40)");
    }

    #[test]
    fn arithmetic() {
        let start = t("23:45");
        assert_eq!(start.plus_minutes(30), Some(t("24:15")));
        assert_eq!(t("47:50").plus_minutes(20), None);
        assert_eq!(t("47:50") + 20, t("47:59"));
        assert_eq!(t("10:15").minutes_since(t("10:00")), Some(15));
        assert_eq!(t("10:00").minutes_since(t("10:15")), None);
        assert_eq!(t("10:00") - t("10:15"), -15);
    }

    #[test]
    fn window_contains_and_overlaps() {
        let morning = TimeWindow::new(t("08:00"), t("09:00")).unwrap();
        assert!(morning.contains(t("08:00")));
        assert!(morning.contains(t("09:00")));
        assert!(!morning.contains(t("09:01")));

        let later = TimeWindow::starting_at(t("08:59"), 60);
        assert!(morning.overlaps(&later));
        assert!(!morning.overlaps(&TimeWindow::starting_at(t("09:01"), 5)));

        assert!(TimeWindow::new(t("09:00"), t("08:00")).is_err());
        assert!(TimeWindow::all_day().contains(t("30:00")));
    }

    #[test]
    fn serde_as_hhmm() {
        let json = serde_json::to_string(&t("25:00")).unwrap();
        assert_eq!(json, "\"25:00\"");
        let back: ServiceTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("25:00"));
    }
}
