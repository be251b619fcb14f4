//! Clinic opening hours and one-hour appointment slots.
//!
//! Slots are laid out in the clinic's local time (so "9 o'clock" stays 9
//! o'clock across DST changes) and handed out as UTC instants.
//!
//! # Usage
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use mindwell_core::schedule::{ClinicHours, generate_slots};
//!
//! let hours = ClinicHours::default();
//! let monday = NaiveDate::from_ymd_opt(2030, 3, 4).unwrap();
//! let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
//!
//! let slots = generate_slots(&hours, monday, monday, &[], now).unwrap();
//! assert_eq!(slots.len(), 8); // 09:00 .. 16:00
//! assert!(slots.iter().all(|s| s.available));
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Length of every appointment.
pub fn slot_length() -> Duration {
    Duration::hours(1)
}

/// When the clinic takes appointments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicHours {
    /// IANA timezone the hours are expressed in.
    pub timezone: Tz,
    /// First bookable hour (local, 0-23).
    pub open_hour: u32,
    /// Hour at which the last slot ends (local, 1-24).
    pub close_hour: u32,
    /// Days of the week with opening hours.
    pub working_days: Vec<Weekday>,
    /// Longest date range a slot query may span, in days.
    pub max_range_days: u32,
}

impl Default for ClinicHours {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            open_hour: 9,
            close_hour: 17,
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            max_range_days: 31,
        }
    }
}

impl ClinicHours {
    /// Check that the hours describe a usable schedule.
    pub fn validate(&self) -> Result<()> {
        if self.close_hour > 24 || self.open_hour >= self.close_hour {
            return Err(Error::validation(format!(
                "opening hours {}-{} are not a valid range",
                self.open_hour, self.close_hour
            )));
        }
        if self.max_range_days == 0 {
            return Err(Error::validation("max_range_days must be positive"));
        }
        Ok(())
    }

    /// Whether the clinic opens on `day`.
    pub fn is_working_day(&self, day: Weekday) -> bool {
        self.working_days.contains(&day)
    }

    /// UTC instant of `hour:00` local time on `date`.
    ///
    /// `None` when that local time does not exist (DST gap). Ambiguous
    /// local times resolve to the earlier instant.
    pub fn local_start(&self, date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Format an instant in clinic time, e.g. "Mon 04 Mar 2030 10:00 (Europe/Istanbul)".
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        let local = instant.with_timezone(&self.timezone);
        format!("{} ({})", local.format("%a %d %b %Y %H:%M"), self.timezone.name())
    }
}

/// A bookable hour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant (start + 1h).
    pub end: DateTime<Utc>,
    /// False when the slot is in the past or already taken.
    pub available: bool,
}

/// All slots between `from` and `to` (inclusive, local dates), ordered by start.
///
/// A slot is available when it starts after `now` and its start is not in
/// `booked`.
pub fn generate_slots(
    hours: &ClinicHours,
    from: NaiveDate,
    to: NaiveDate,
    booked: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> Result<Vec<Slot>> {
    hours.validate()?;
    if from > to {
        return Err(Error::validation_field("from", "must not be after 'to'"));
    }
    let days = (to - from).num_days() + 1;
    if days > i64::from(hours.max_range_days) {
        return Err(Error::validation(format!(
            "date range spans {days} days; at most {} allowed",
            hours.max_range_days
        )));
    }

    let booked: HashSet<DateTime<Utc>> = booked.iter().copied().collect();
    let mut slots = Vec::new();
    for date in from.iter_days().take(days as usize) {
        if !hours.is_working_day(date.weekday()) {
            continue;
        }
        for hour in hours.open_hour..hours.close_hour {
            let Some(start) = hours.local_start(date, hour) else {
                log::debug!("Skipping non-existent local time {date} {hour}:00");
                continue;
            };
            slots.push(Slot {
                start,
                end: start + slot_length(),
                available: start > now && !booked.contains(&start),
            });
        }
    }
    slots.sort_by_key(|s| s.start);
    Ok(slots)
}

/// Check that `start` is a slot the clinic could hand out.
pub fn validate_slot(hours: &ClinicHours, start: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    let local = start.with_timezone(&hours.timezone);
    if local.minute() != 0 || local.second() != 0 || local.nanosecond() != 0 {
        return Err(Error::validation_field("start", "must be on the hour"));
    }
    if !hours.is_working_day(local.weekday()) {
        return Err(Error::validation_field(
            "start",
            format!("the clinic is closed on {}", local.weekday()),
        ));
    }
    if local.hour() < hours.open_hour || local.hour() >= hours.close_hour {
        return Err(Error::validation_field(
            "start",
            format!(
                "must be between {:02}:00 and {:02}:00 clinic time",
                hours.open_hour,
                hours.close_hour - 1
            ),
        ));
    }
    if start <= now {
        return Err(Error::validation_field("start", "must be in the future"));
    }
    Ok(())
}
