//! Run configuration values and the errors raised while validating them.
//!
//! Everything here is checked before any sampling or fetching starts, so a
//! bad option combination fails fast instead of aborting a half-finished run.

use crate::technology::Technology;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use thiserror::Error;

/// Default grid resolution in degrees.
pub const DEFAULT_STEP_DEGREES: f64 = 0.04;

/// An inclusive span of projection years.
///
/// # Examples
///
/// ```
/// use sitecast::YearWindow;
///
/// let window = YearWindow::new(2021, 2030).unwrap();
/// assert_eq!(window.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    start: u32,
    end: u32,
}

impl YearWindow {
    pub fn new(start: u32, end: u32) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// A single projection year.
    pub fn single(year: u32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn years(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }
}

/// Invalid or missing configuration, reported before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid step must be a positive number of degrees, got {step}")]
    NonPositiveStep { step: f64 },

    #[error("rectangle bounds are inverted (lat {min_lat}..{max_lat}, lon {min_lon}..{max_lon})")]
    InvalidRectangle {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },

    #[error("named-boundary region requested but no boundary set was supplied")]
    MissingBoundaries,

    #[error("named-boundary region requested with an empty code set")]
    EmptyRegionCodes,

    #[error("projection window is empty ({start}..{end})")]
    EmptyWindow { start: u32, end: u32 },

    #[error("failed to read table '{path}'")]
    TableRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("threshold table is empty")]
    EmptyThresholds,

    #[error("threshold min_value {min_value} appears more than once")]
    DuplicateThreshold { min_value: f64 },

    #[error("threshold min_value must be finite, got {min_value}")]
    NonFiniteThreshold { min_value: f64 },

    #[error("cost table has no rows for technology {technology}")]
    EmptyCostTable { technology: Technology },

    #[error("cost table lists {technology} year {year} more than once")]
    DuplicateCostYear { technology: Technology, year: u32 },

    #[error("cost table is for {found}, but the run targets {expected}")]
    TechnologyMismatch {
        expected: Technology,
        found: Technology,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_inverted_span() {
        assert!(matches!(
            YearWindow::new(2025, 2021),
            Err(ConfigError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn window_years_are_inclusive() {
        let window = YearWindow::new(2021, 2023).unwrap();
        let years: Vec<u32> = window.years().collect();
        assert_eq!(years, [2021, 2022, 2023]);
        assert_eq!(YearWindow::single(2021).len(), 1);
    }
}
