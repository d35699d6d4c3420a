// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-offset local-time helpers.
//!
//! The bot operates in a single fixed local timezone (configured as a
//! UTC offset). All user-facing dates, day-rollover checks, and
//! reschedule parsing go through [`LocalZone`] so the offset is applied
//! in exactly one place.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// A fixed UTC offset standing in for the bot's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalZone(FixedOffset);

impl LocalZone {
    /// Builds a zone from whole hours east of UTC (negative = west).
    ///
    /// Falls back to UTC if the offset is out of range.
    pub fn from_offset_hours(hours: i32) -> LocalZone {
        let offset = FixedOffset::east_opt(hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        LocalZone(offset)
    }

    /// The local calendar date of a UTC instant.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.0).date_naive()
    }

    /// Interprets a naive local datetime as an instant in this zone.
    pub fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.0
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Combines today's local date with an `HH:MM` wall-clock time.
    ///
    /// Returns `None` for nonexistent local datetimes.
    pub fn today_at(&self, now: DateTime<Utc>, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        let date = self.local_date(now);
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        self.from_local(NaiveDateTime::new(date, time))
    }

    /// Parses a `dd-mm-yyyy HH:MM` local wall-clock string into UTC.
    pub fn parse_dmy_hm(&self, text: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(text, "%d-%m-%Y %H:%M").ok()?;
        self.from_local(naive)
    }

    /// Formats a UTC instant as local `dd-mm-yyyy HH:MM`.
    pub fn format_dmy_hm(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.0).format("%d-%m-%Y %H:%M").to_string()
    }

    /// Formats a UTC instant as local `HH:MM`.
    pub fn format_hm(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.0).format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn local_date_shifts_across_midnight() {
        let zone = LocalZone::from_offset_hours(-3);
        // 01:30 UTC is still the previous day at UTC-3.
        let date = zone.local_date(utc("2026-03-10T01:30:00Z"));
        assert_eq!(date.to_string(), "2026-03-09");
    }

    #[test]
    fn today_at_combines_local_date_and_time() {
        let zone = LocalZone::from_offset_hours(-3);
        let now = utc("2026-03-10T15:00:00Z"); // 12:00 local
        let at = zone.today_at(now, 10, 30).unwrap();
        assert_eq!(zone.format_dmy_hm(at), "10-03-2026 10:30");
    }

    #[test]
    fn parse_and_format_roundtrip() {
        let zone = LocalZone::from_offset_hours(-3);
        let parsed = zone.parse_dmy_hm("15-08-2026 18:45").unwrap();
        assert_eq!(zone.format_dmy_hm(parsed), "15-08-2026 18:45");
        assert_eq!(zone.format_hm(parsed), "18:45");
    }

    #[test]
    fn parse_rejects_garbage() {
        let zone = LocalZone::from_offset_hours(-3);
        assert!(zone.parse_dmy_hm("mañana a las 10").is_none());
        assert!(zone.parse_dmy_hm("32-01-2026 10:00").is_none());
    }
}
