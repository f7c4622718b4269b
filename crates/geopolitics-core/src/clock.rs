//! Simulated calendar for the Geopolitics 2025 simulation.
//!
//! The calendar is independent of wall-clock time: it only moves when the
//! scheduler completes a tick, and every tick is exactly one day. Speed
//! changes how often ticks happen, never how many days a tick covers.
//!
//! Dates are shown to observers as `"January 1, 2025"`. Parsing also
//! accepts ISO `2025-01-01`, the form the cache collaborator stores.

use chrono::{Datelike, Days, NaiveDate};

/// Display format for calendar dates (`"January 2, 2025"`).
pub const DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// ISO format accepted as an alternative on input.
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Advancing would move past the last date chrono can represent.
    #[error("calendar overflow: cannot advance beyond {date}")]
    DateOverflow {
        /// The date the clock is stuck on.
        date: NaiveDate,
    },

    /// A date string could not be parsed in either accepted format.
    #[error("invalid calendar date: {input:?}")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },
}

/// The simulation calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    date: NaiveDate,
}

impl GameClock {
    /// Create a clock starting on `date`.
    pub const fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Create a clock from a display or ISO date string.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDate`] if the string is not a date.
    pub fn parse(input: &str) -> Result<Self, ClockError> {
        parse_date(input).map(Self::new)
    }

    /// Advance by exactly one day. Returns the new date.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::DateOverflow`] at the end of chrono's range.
    pub fn advance(&mut self) -> Result<NaiveDate, ClockError> {
        self.date = self
            .date
            .checked_add_days(Days::new(1))
            .ok_or(ClockError::DateOverflow { date: self.date })?;
        Ok(self.date)
    }

    /// The current date.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The current date in display form.
    pub fn display(&self) -> String {
        format_date(self.date)
    }

    /// The current year.
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Format a date the way observers see it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parse a date in display form (`"January 2, 2025"`) or ISO form.
///
/// # Errors
///
/// Returns [`ClockError::InvalidDate`] if neither format matches.
pub fn parse_date(input: &str) -> Result<NaiveDate, ClockError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_FORMAT))
        .map_err(|_err| ClockError::InvalidDate {
            input: input.to_owned(),
        })
}
