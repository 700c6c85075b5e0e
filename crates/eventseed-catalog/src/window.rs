//! Start-time sampling windows for past and future events.
//!
//! A window covers whole calendar years. Sampling draws the year, month
//! (1-12), day (1-27) and hour (1-23) independently and uniformly, with
//! minutes and seconds fixed at zero.
//!
//! The day is capped at 27 so every (year, month, day) combination is a
//! real calendar date without per-month length logic.

use chrono::{NaiveDate, NaiveDateTime};
use eventseed_types::Bucket;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Highest day of month that is valid in every month.
pub const MAX_SAMPLED_DAY: u32 = 27;

/// Earliest hour sampled.
pub const MIN_SAMPLED_HOUR: u32 = 1;

/// Latest hour sampled.
pub const MAX_SAMPLED_HOUR: u32 = 23;

/// An inclusive range of calendar years to draw start times from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First year that can be drawn.
    pub first_year: i32,
    /// Last year that can be drawn.
    pub last_year: i32,
}

impl DateWindow {
    /// Default historical window: 2020 through 2024.
    pub const PAST: Self = Self {
        first_year: 2020,
        last_year: 2024,
    };

    /// Default forward window: 2026 through 2030.
    pub const FUTURE: Self = Self {
        first_year: 2026,
        last_year: 2030,
    };

    /// Create a window, rejecting inverted year ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvertedWindow`] if `last_year < first_year`.
    pub const fn new(first_year: i32, last_year: i32) -> Result<Self, CatalogError> {
        if last_year < first_year {
            return Err(CatalogError::InvertedWindow {
                first_year,
                last_year,
            });
        }
        Ok(Self {
            first_year,
            last_year,
        })
    }

    /// Draw a start time uniformly from this window.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvertedWindow`] if the window is inverted,
    /// or [`CatalogError::InvalidDate`] if the year lies outside the range
    /// chrono can represent.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NaiveDateTime, CatalogError> {
        let window = Self::new(self.first_year, self.last_year)?;
        let year = rng.random_range(window.first_year..=window.last_year);
        let month = rng.random_range(1..=12_u32);
        let day = rng.random_range(1..=MAX_SAMPLED_DAY);
        let hour = rng.random_range(MIN_SAMPLED_HOUR..=MAX_SAMPLED_HOUR);

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .ok_or(CatalogError::InvalidDate {
                year,
                month,
                day,
                hour,
            })
    }
}

/// The pair of windows used by the catalog builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWindows {
    past: DateWindow,
    future: DateWindow,
}

impl BucketWindows {
    /// Pair a past and a future window.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvertedWindow`] if either window is
    /// inverted, or [`CatalogError::OverlappingWindows`] unless the past
    /// window ends strictly before the future window begins.
    pub const fn new(past: DateWindow, future: DateWindow) -> Result<Self, CatalogError> {
        if past.last_year < past.first_year {
            return Err(CatalogError::InvertedWindow {
                first_year: past.first_year,
                last_year: past.last_year,
            });
        }
        if future.last_year < future.first_year {
            return Err(CatalogError::InvertedWindow {
                first_year: future.first_year,
                last_year: future.last_year,
            });
        }
        if past.last_year >= future.first_year {
            return Err(CatalogError::OverlappingWindows {
                past_last: past.last_year,
                future_first: future.first_year,
            });
        }
        Ok(Self { past, future })
    }

    /// The window for the given bucket.
    pub const fn for_bucket(&self, bucket: Bucket) -> DateWindow {
        match bucket {
            Bucket::Past => self.past,
            Bucket::Future => self.future,
        }
    }
}

impl Default for BucketWindows {
    fn default() -> Self {
        Self {
            past: DateWindow::PAST,
            future: DateWindow::FUTURE,
        }
    }
}
