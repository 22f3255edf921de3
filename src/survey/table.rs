//! The wide per-coordinate, per-year output table.

use crate::config::YearWindow;
use crate::coordinate::Coordinate;
use crate::cost::CostRate;
use crate::technology::Technology;
use log::info;
use polars::error::PolarsError;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One classified, cost-projected coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRow {
    /// The coordinate that was requested from the grid.
    pub coordinate: Coordinate,
    /// The coordinate the provider actually served, when reported.
    pub provider_coordinate: Option<Coordinate>,
    /// Site elevation in meters, when reported.
    pub elevation: Option<f64>,
    /// Median of the resource series' target field.
    pub summary: f64,
    /// Resource class assigned from the threshold table.
    pub class: u32,
    /// `(year, rate)` pairs covering the projection window, in year order.
    pub costs: Vec<(u32, CostRate)>,
}

/// All rows of one run, with enough context to emit the wide CSV layout.
#[derive(Debug, Clone)]
pub struct SurveyTable {
    technology: Technology,
    window: YearWindow,
    rows: Vec<SurveyRow>,
}

impl SurveyTable {
    pub(crate) fn new(technology: Technology, window: YearWindow, rows: Vec<SurveyRow>) -> Self {
        Self {
            technology,
            window,
            rows,
        }
    }

    pub fn technology(&self) -> Technology {
        self.technology
    }

    pub fn window(&self) -> YearWindow {
        self.window
    }

    pub fn rows(&self) -> &[SurveyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Builds the wide output frame: one row per coordinate, one
    /// `capex_<year>`/`fopex_<year>` column pair per window year.
    pub fn to_dataframe(&self) -> Result<DataFrame, OutputError> {
        let mut columns = vec![
            Column::new(
                "lat".into(),
                self.rows.iter().map(|r| r.coordinate.lat).collect::<Vec<f64>>(),
            ),
            Column::new(
                "lon".into(),
                self.rows.iter().map(|r| r.coordinate.lon).collect::<Vec<f64>>(),
            ),
            Column::new(
                "provider_lat".into(),
                self.rows
                    .iter()
                    .map(|r| r.provider_coordinate.map(|c| c.lat))
                    .collect::<Vec<Option<f64>>>(),
            ),
            Column::new(
                "provider_lon".into(),
                self.rows
                    .iter()
                    .map(|r| r.provider_coordinate.map(|c| c.lon))
                    .collect::<Vec<Option<f64>>>(),
            ),
            Column::new(
                "elevation".into(),
                self.rows.iter().map(|r| r.elevation).collect::<Vec<Option<f64>>>(),
            ),
            Column::new(
                "resource_median".into(),
                self.rows.iter().map(|r| r.summary).collect::<Vec<f64>>(),
            ),
            Column::new(
                "class".into(),
                self.rows.iter().map(|r| r.class).collect::<Vec<u32>>(),
            ),
        ];

        // Emit the cost pairs by looping over the window; no per-year
        // branching, and a gap would already have failed projection.
        for (index, year) in self.window.years().enumerate() {
            columns.push(Column::new(
                format!("capex_{year}").into(),
                self.rows
                    .iter()
                    .map(|r| r.costs.get(index).map(|(_, rate)| rate.capex))
                    .collect::<Vec<Option<f64>>>(),
            ));
            columns.push(Column::new(
                format!("fopex_{year}").into(),
                self.rows
                    .iter()
                    .map(|r| r.costs.get(index).map(|(_, rate)| rate.fopex))
                    .collect::<Vec<Option<f64>>>(),
            ));
        }

        DataFrame::new(columns).map_err(OutputError::Frame)
    }

    /// Writes the table as a flat CSV file, once, at the end of a run.
    pub fn write_csv(&self, path: &Path) -> Result<(), OutputError> {
        let mut df = self.to_dataframe()?;
        let mut file = std::fs::File::create(path)
            .map_err(|e| OutputError::Io(path.to_path_buf(), e))?;
        CsvWriter::new(&mut file)
            .finish(&mut df)
            .map_err(|e| OutputError::Csv(path.to_path_buf(), e))?;
        info!(
            "wrote {} rows for {} to {}",
            self.rows.len(),
            self.technology,
            path.display()
        );
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to assemble output table")]
    Frame(#[source] PolarsError),

    #[error("failed to create output file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to write output table to '{0}'")]
    Csv(PathBuf, #[source] PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lat: f64, lon: f64, class: u32) -> SurveyRow {
        SurveyRow {
            coordinate: Coordinate::new(lat, lon),
            provider_coordinate: Some(Coordinate::new(lat + 0.001, lon - 0.001)),
            elevation: Some(624.0),
            summary: 9.5,
            class,
            costs: vec![
                (
                    2021,
                    CostRate {
                        capex: 100.0,
                        fopex: 10.0,
                    },
                ),
                (
                    2022,
                    CostRate {
                        capex: 95.0,
                        fopex: 9.0,
                    },
                ),
            ],
        }
    }

    #[test]
    fn frame_has_one_column_pair_per_year() {
        let table = SurveyTable::new(
            Technology::Wind,
            YearWindow::new(2021, 2022).unwrap(),
            vec![row(39.0, -80.0, 1), row(39.0, -79.0, 2)],
        );
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 11));
        assert_eq!(
            df.get_column_names(),
            [
                "lat",
                "lon",
                "provider_lat",
                "provider_lon",
                "elevation",
                "resource_median",
                "class",
                "capex_2021",
                "fopex_2021",
                "capex_2022",
                "fopex_2022",
            ]
        );
    }

    #[test]
    fn csv_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("wind_costs.csv");
        let table = SurveyTable::new(
            Technology::Wind,
            YearWindow::new(2021, 2022).unwrap(),
            vec![row(39.0, -80.0, 1)],
        );
        table.write_csv(&out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "lat,lon,provider_lat,provider_lon,elevation,resource_median,class,\
             capex_2021,fopex_2021,capex_2022,fopex_2022"
        );
        assert!(lines.next().unwrap().starts_with("39.0,-80.0,"));
    }
}
