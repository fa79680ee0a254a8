//! Operating calendars for routes and services.
//!
//! A calendar combines a set of weekdays with a validity date range, plus
//! explicit additional and excluded dates (bank holidays, engineering works).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::DomainError;

/// A set of weekdays, stored as a 7-bit mask (Monday = bit 0).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub const NONE: DaysOfWeek = DaysOfWeek(0);
    pub const ALL: DaysOfWeek = DaysOfWeek(0b111_1111);
    pub const WEEKDAYS: DaysOfWeek = DaysOfWeek(0b001_1111);
    pub const WEEKEND: DaysOfWeek = DaysOfWeek(0b110_0000);

    /// Build a set from individual days.
    pub fn of(days: &[Weekday]) -> Self {
        days.iter().fold(Self::NONE, |acc, day| acc.with(*day))
    }

    /// Returns a copy of this set with `day` added.
    pub fn with(self, day: Weekday) -> Self {
        DaysOfWeek(self.0 | (1 << day.num_days_from_monday()))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Returns true if the two sets share at least one day.
    pub fn intersects(&self, other: &DaysOfWeek) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the days in the set, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7u8)
            .filter(|bit| self.0 & (1 << bit) != 0)
            .filter_map(|bit| Weekday::try_from(bit).ok())
    }
}

impl From<Vec<Weekday>> for DaysOfWeek {
    fn from(days: Vec<Weekday>) -> Self {
        DaysOfWeek::of(&days)
    }
}

impl From<DaysOfWeek> for Vec<Weekday> {
    fn from(days: DaysOfWeek) -> Self {
        days.iter().collect()
    }
}

impl fmt::Debug for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DomainError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a range, rejecting ranges that end before they start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns true if the two ranges share at least one date.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// The days on which a route or service operates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub days: DaysOfWeek,
    pub range: DateRange,
    #[serde(default)]
    pub additional: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub excluded: BTreeSet<NaiveDate>,
}

impl Calendar {
    pub fn new(days: DaysOfWeek, range: DateRange) -> Self {
        Self {
            days,
            range,
            additional: BTreeSet::new(),
            excluded: BTreeSet::new(),
        }
    }

    /// Add a date the calendar runs on regardless of weekday and range.
    pub fn with_additional(mut self, date: NaiveDate) -> Self {
        self.additional.insert(date);
        self
    }

    /// Add a date the calendar does not run on.
    pub fn with_excluded(mut self, date: NaiveDate) -> Self {
        self.excluded.insert(date);
        self
    }

    /// Returns true if the calendar operates on `date`.
    ///
    /// Exclusions win over additions.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if self.excluded.contains(&date) {
            return false;
        }
        if self.additional.contains(&date) {
            return true;
        }
        self.range.contains(date) && self.days.contains(date.weekday())
    }

    /// Returns true if both calendars share an operating weekday and their
    /// date ranges intersect.
    pub fn overlaps(&self, other: &Calendar) -> bool {
        self.days.intersects(&other.days) && self.range.overlaps(&other.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    #[test]
    fn days_of_week_membership() {
        let days = DaysOfWeek::of(&[Weekday::Mon, Weekday::Wed]);
        assert!(days.contains(Weekday::Mon));
        assert!(!days.contains(Weekday::Tue));
        assert!(DaysOfWeek::WEEKDAYS.contains(Weekday::Fri));
        assert!(!DaysOfWeek::WEEKDAYS.contains(Weekday::Sat));
        assert!(!DaysOfWeek::WEEKDAYS.intersects(&DaysOfWeek::WEEKEND));
        assert_eq!(DaysOfWeek::ALL.iter().count(), 7);
    }

    #[test]
    fn date_range_rejects_reversed() {
        let err = DateRange::new(date(2024, 3, 2), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDateRange { .. }));
    }

    #[test]
    fn date_range_overlap() {
        let march = range(date(2024, 3, 1), date(2024, 3, 31));
        let april = range(date(2024, 4, 1), date(2024, 4, 30));
        let spanning = range(date(2024, 3, 31), date(2024, 4, 1));

        assert!(!march.overlaps(&april));
        assert!(march.overlaps(&spanning));
        assert!(april.overlaps(&spanning));
        assert!(march.contains(date(2024, 3, 31)));
    }

    #[test]
    fn runs_on_respects_days_and_exceptions() {
        // 2024-03-15 is a Friday, 2024-03-16 a Saturday.
        let calendar = Calendar::new(
            DaysOfWeek::WEEKDAYS,
            range(date(2024, 3, 1), date(2024, 3, 31)),
        )
        .with_excluded(date(2024, 3, 15))
        .with_additional(date(2024, 3, 16));

        assert!(calendar.runs_on(date(2024, 3, 14)));
        assert!(!calendar.runs_on(date(2024, 3, 15)));
        assert!(calendar.runs_on(date(2024, 3, 16)));
        assert!(!calendar.runs_on(date(2024, 3, 17)));
        assert!(!calendar.runs_on(date(2024, 4, 1)));
    }

    #[test]
    fn weekday_and_weekend_calendars_never_overlap() {
        let all_year = range(date(2024, 1, 1), date(2024, 12, 31));
        let weekdays = Calendar::new(DaysOfWeek::WEEKDAYS, all_year);
        let weekend = Calendar::new(DaysOfWeek::WEEKEND, all_year);

        assert!(!weekdays.overlaps(&weekend));
        assert!(weekdays.overlaps(&Calendar::new(DaysOfWeek::ALL, all_year)));
    }

    #[test]
    fn days_serialize_as_weekday_list() {
        let days = DaysOfWeek::of(&[Weekday::Sat, Weekday::Sun]);
        let json = serde_json::to_string(&days).unwrap();
        assert_eq!(json, "[\"Sat\",\"Sun\"]");
        let back: DaysOfWeek = serde_json::from_str(&json).unwrap();
        assert_eq!(back, days);
    }
}
