//! Year-indexed cost tables and the projection join.

use crate::config::{ConfigError, YearWindow};
use crate::technology::Technology;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Capital and fixed operating expenditure for one technology-year, in
/// dollars per MW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostRate {
    pub capex: f64,
    pub fopex: f64,
}

#[derive(Debug, Deserialize)]
struct CostRow {
    tech: String,
    year: u32,
    capex: f64,
    fopex: f64,
}

/// External reference data mapping projection years to [`CostRate`]s for one
/// technology.
///
/// Cost values are a flat, technology-wide constant joined by year alone:
/// they do not depend on coordinate or resource class. That is a limitation
/// of the upstream cost model, preserved here deliberately.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    technology: Technology,
    rates: BTreeMap<u32, CostRate>,
}

impl CostTable {
    pub fn new<I>(technology: Technology, rates: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (u32, CostRate)>,
    {
        let mut table = BTreeMap::new();
        for (year, rate) in rates {
            if table.insert(year, rate).is_some() {
                return Err(ConfigError::DuplicateCostYear { technology, year });
            }
        }
        if table.is_empty() {
            return Err(ConfigError::EmptyCostTable { technology });
        }
        Ok(Self {
            technology,
            rates: table,
        })
    }

    /// Loads the rows for `technology` from a CSV file with
    /// `tech,year,capex,fopex` columns; rows for other technologies are
    /// ignored.
    pub fn from_csv_file(path: &Path, technology: Technology) -> Result<Self, ConfigError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ConfigError::TableRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut rates = Vec::new();
        for result in reader.deserialize() {
            let row: CostRow = result.map_err(|e| ConfigError::TableRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            if row.tech == technology.label() {
                rates.push((
                    row.year,
                    CostRate {
                        capex: row.capex,
                        fopex: row.fopex,
                    },
                ));
            }
        }
        debug!(
            "loaded {} cost years for {technology} from {}",
            rates.len(),
            path.display()
        );
        Self::new(technology, rates)
    }

    pub fn technology(&self) -> Technology {
        self.technology
    }

    /// Years the table covers, ascending.
    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.rates.keys().copied()
    }

    /// Copies the `(capex, fopex)` pair for every year in `window`, in year
    /// order. The table must be contiguous over the window.
    pub fn project(&self, window: &YearWindow) -> Result<Vec<(u32, CostRate)>, ProjectionError> {
        window
            .years()
            .map(|year| {
                self.rates
                    .get(&year)
                    .map(|rate| (year, *rate))
                    .ok_or(ProjectionError::MissingYear {
                        technology: self.technology,
                        year,
                    })
            })
            .collect()
    }
}

/// A gap in the cost table over the requested projection window.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("cost table for {technology} has no entry for year {year}")]
    MissingYear { technology: Technology, year: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn decade_table() -> CostTable {
        CostTable::new(
            Technology::Wind,
            (2021..=2030).map(|year| {
                (
                    year,
                    CostRate {
                        capex: 1000.0 + f64::from(year - 2021),
                        fopex: 100.0,
                    },
                )
            }),
        )
        .unwrap()
    }

    #[test]
    fn projects_exactly_the_window() {
        let table = decade_table();
        let window = YearWindow::new(2021, 2025).unwrap();
        let projected = table.project(&window).unwrap();
        assert_eq!(projected.len(), 5);
        let years: Vec<u32> = projected.iter().map(|(year, _)| *year).collect();
        assert_eq!(years, [2021, 2022, 2023, 2024, 2025]);
        assert_eq!(projected[3].1.capex, 1003.0);
    }

    #[test]
    fn gap_in_window_is_an_error() {
        let table = decade_table();
        let window = YearWindow::new(2028, 2032).unwrap();
        let err = table.project(&window).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::MissingYear { year: 2031, .. }
        ));
    }

    #[test]
    fn duplicate_years_are_rejected() {
        let rate = CostRate {
            capex: 1.0,
            fopex: 1.0,
        };
        assert!(matches!(
            CostTable::new(Technology::Wind, [(2021, rate), (2021, rate)]),
            Err(ConfigError::DuplicateCostYear { year: 2021, .. })
        ));
    }

    #[test]
    fn csv_rows_are_filtered_by_technology() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tech,year,capex,fopex").unwrap();
        writeln!(file, "Wind,2021,1100000,40000").unwrap();
        writeln!(file, "Solar,2021,900000,20000").unwrap();
        writeln!(file, "Wind,2022,1080000,39000").unwrap();
        file.flush().unwrap();

        let table = CostTable::from_csv_file(file.path(), Technology::Wind).unwrap();
        assert_eq!(table.years().collect::<Vec<u32>>(), [2021, 2022]);
        let projected = table.project(&YearWindow::single(2021)).unwrap();
        assert_eq!(projected[0].1.capex, 1_100_000.0);

        let solar = CostTable::from_csv_file(file.path(), Technology::Solar).unwrap();
        assert_eq!(solar.years().collect::<Vec<u32>>(), [2021]);
    }

    #[test]
    fn table_without_matching_rows_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tech,year,capex,fopex").unwrap();
        writeln!(file, "Coal,2021,500000,60000").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            CostTable::from_csv_file(file.path(), Technology::Wind),
            Err(ConfigError::EmptyCostTable { .. })
        ));
    }
}
