//! Mapping a summary statistic to a discrete resource class.

use crate::config::ConfigError;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// One classification bucket: every statistic at or above `min_value` that
/// no higher bucket claimed falls into `class`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ThresholdEntry {
    pub min_value: f64,
    pub class: u32,
}

/// Ordered classification thresholds, sorted descending by `min_value`.
///
/// The table is exhaustive by contract: the lowest entry accepts every
/// remaining value, so classification is total over finite statistics and no
/// sentinel "no class" value exists.
///
/// # Examples
///
/// ```
/// use sitecast::ThresholdTable;
///
/// let table = ThresholdTable::new([(9.0, 1), (8.8, 2), (8.6, 3)]).unwrap();
/// assert_eq!(table.classify(9.4), 1);
/// assert_eq!(table.classify(8.8), 2); // exact hits belong to their threshold
/// assert_eq!(table.classify(1.0), 3); // lowest bucket catches the rest
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    entries: Vec<ThresholdEntry>,
}

impl ThresholdTable {
    /// Builds a table from `(min_value, class)` pairs, sorting them
    /// descending by `min_value`.
    pub fn new<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (f64, u32)>,
    {
        let entries = entries
            .into_iter()
            .map(|(min_value, class)| ThresholdEntry { min_value, class })
            .collect();
        Self::from_entries(entries)
    }

    /// Loads a table from a CSV file with `min_value,class` columns.
    pub fn from_csv_file(path: &Path) -> Result<Self, ConfigError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ConfigError::TableRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut entries = Vec::new();
        for result in reader.deserialize() {
            let entry: ThresholdEntry = result.map_err(|e| ConfigError::TableRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            entries.push(entry);
        }
        debug!("loaded {} threshold entries from {}", entries.len(), path.display());
        Self::from_entries(entries)
    }

    fn from_entries(mut entries: Vec<ThresholdEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyThresholds);
        }
        for entry in &entries {
            if !entry.min_value.is_finite() {
                return Err(ConfigError::NonFiniteThreshold {
                    min_value: entry.min_value,
                });
            }
        }
        entries.sort_by(|a, b| b.min_value.total_cmp(&a.min_value));
        for pair in entries.windows(2) {
            if pair[0].min_value == pair[1].min_value {
                return Err(ConfigError::DuplicateThreshold {
                    min_value: pair[0].min_value,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Entries in descending `min_value` order.
    pub fn entries(&self) -> &[ThresholdEntry] {
        &self.entries
    }

    /// Assigns the class of the first entry whose `min_value` does not
    /// exceed `statistic`; the lowest entry catches everything below it.
    pub fn classify(&self, statistic: f64) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.min_value <= statistic)
            .unwrap_or(&self.entries[self.entries.len() - 1])
            .class
    }
}
