//! Parsing of raw provider payloads into a [`SiteSeries`].
//!
//! The wire format mirrors the provider's SRW-style layout:
//!
//! ```text
//! SiteID,Latitude,Longitude,Elevation,TimeZone      <- metadata names
//! 124608,39.0012,-79.9887,624.0,0                   <- metadata values
//! Temperature,Pressure,Speed,Direction              <- sample column names
//! C,atm,m/s,degrees                                 <- units (ignored)
//! 10.4,0.95,9.52,180.0                              <- one sample per line
//! ...
//! ```
//!
//! The technology's target field is extracted as the series; the provider's
//! own coordinate and elevation come from the metadata block, since providers
//! snap requests to their native grid.

use crate::coordinate::Coordinate;
use crate::resource::error::ParseError;
use crate::resource::key::ResourceKey;
use log::debug;
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::task;

const METADATA_LAT: &str = "Latitude";
const METADATA_LON: &str = "Longitude";
const METADATA_ELEVATION: &str = "Elevation";

/// Minimum payload: metadata names, metadata values, column names, units,
/// and at least one sample row.
const MIN_LINES: usize = 5;

/// One parsed resource series for a `(technology, year, coordinate)` key.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSeries {
    /// Coordinate the provider actually served, when reported.
    pub provider_coordinate: Option<Coordinate>,
    /// Site elevation in meters, when reported.
    pub elevation: Option<f64>,
    /// Target-field samples in file order, nulls dropped.
    pub samples: Vec<f64>,
}

impl SiteSeries {
    /// Median of the samples, the series' summary statistic.
    pub fn median(&self) -> Option<f64> {
        Float64Chunked::from_vec(PlSmallStr::EMPTY, self.samples.clone()).median()
    }
}

/// Parses a raw payload for `key`, extracting the technology's target field.
pub(crate) async fn parse_series(raw: &[u8], key: &ResourceKey) -> Result<SiteSeries, ParseError> {
    let key_label = key.to_string();
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::NotUtf8 {
        key: key_label.clone(),
    })?;

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < MIN_LINES {
        return Err(ParseError::TruncatedPayload {
            key: key_label,
            lines: lines.len(),
        });
    }

    let metadata = parse_metadata(lines[0], lines[1], &key_label)?;
    let provider_lat = metadata_number(&metadata, METADATA_LAT, &key_label)?;
    let provider_lon = metadata_number(&metadata, METADATA_LON, &key_label)?;
    let elevation = metadata_number(&metadata, METADATA_ELEVATION, &key_label)?;
    let provider_coordinate = match (provider_lat, provider_lon) {
        (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
        _ => None,
    };

    // Header line plus samples; the units line is dropped.
    let mut data = String::with_capacity(text.len());
    data.push_str(lines[2]);
    for line in &lines[4..] {
        if line.trim().is_empty() {
            continue;
        }
        data.push('\n');
        data.push_str(line);
    }

    let field = key.technology.target_field();
    let samples = extract_samples(data, field, key_label.clone()).await?;
    debug!("parsed {} samples of '{field}' for {key_label}", samples.len());

    Ok(SiteSeries {
        provider_coordinate,
        elevation,
        samples,
    })
}

fn parse_metadata(
    names: &str,
    values: &str,
    key: &str,
) -> Result<HashMap<String, String>, ParseError> {
    let names: Vec<&str> = names.split(',').map(str::trim).collect();
    let values: Vec<&str> = values.split(',').map(str::trim).collect();
    if names.len() != values.len() {
        return Err(ParseError::MetadataMismatch {
            key: key.to_owned(),
            names: names.len(),
            values: values.len(),
        });
    }
    Ok(names
        .into_iter()
        .zip(values)
        .map(|(n, v)| (n.to_owned(), v.to_owned()))
        .collect())
}

fn metadata_number(
    metadata: &HashMap<String, String>,
    field: &str,
    key: &str,
) -> Result<Option<f64>, ParseError> {
    match metadata.get(field) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ParseError::BadMetadataNumber {
                key: key.to_owned(),
                field: field.to_owned(),
            }),
    }
}

/// Reads the sample block with polars in a blocking task and pulls out the
/// target column as `f64` samples.
async fn extract_samples(
    data: String,
    field: &'static str,
    key: String,
) -> Result<Vec<f64>, ParseError> {
    task::spawn_blocking(move || {
        let mut temp_file = NamedTempFile::new().map_err(|e| ParseError::CsvReadIo {
            key: key.clone(),
            source: e,
        })?;
        temp_file
            .write_all(data.as_bytes())
            .map_err(|e| ParseError::CsvReadIo {
                key: key.clone(),
                source: e,
            })?;
        temp_file.flush().map_err(|e| ParseError::CsvReadIo {
            key: key.clone(),
            source: e,
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
            .map_err(|e| ParseError::CsvReadPolars {
                key: key.clone(),
                source: e,
            })?
            .finish()
            .map_err(|e| ParseError::CsvReadPolars {
                key: key.clone(),
                source: e,
            })?;

        let column = df
            .column(field)
            .map_err(|_| ParseError::MissingField {
                key: key.clone(),
                field: field.to_owned(),
            })?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| ParseError::ColumnType {
                key: key.clone(),
                field: field.to_owned(),
                source: e,
            })?;
        let samples: Vec<f64> = column
            .f64()
            .map_err(|e| ParseError::ColumnType {
                key: key.clone(),
                field: field.to_owned(),
                source: e,
            })?
            .into_iter()
            .flatten()
            .collect();

        if samples.is_empty() {
            return Err(ParseError::EmptySeries {
                key,
                field: field.to_owned(),
            });
        }
        Ok(samples)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technology::Technology;

    fn wind_key() -> ResourceKey {
        ResourceKey::new(Technology::Wind, 2012, Coordinate::new(39.0, -79.99))
    }

    fn wind_payload(speeds: &[f64]) -> Vec<u8> {
        let mut payload = String::from(
            "SiteID,Latitude,Longitude,Elevation,TimeZone\n\
             124608,39.0012,-79.9887,624.0,0\n\
             Temperature,Pressure,Speed,Direction\n\
             C,atm,m/s,degrees\n",
        );
        for speed in speeds {
            payload.push_str(&format!("10.4,0.95,{speed},180.0\n"));
        }
        payload.into_bytes()
    }

    #[tokio::test]
    async fn parses_metadata_and_target_field() {
        let series = parse_series(&wind_payload(&[9.5, 8.1, 9.0]), &wind_key())
            .await
            .unwrap();
        let provider = series.provider_coordinate.unwrap();
        assert!((provider.lat - 39.0012).abs() < 1e-9);
        assert!((provider.lon + 79.9887).abs() < 1e-9);
        assert_eq!(series.elevation, Some(624.0));
        assert_eq!(series.samples, [9.5, 8.1, 9.0]);
        assert_eq!(series.median(), Some(9.0));
    }

    #[tokio::test]
    async fn median_of_even_count_is_midpoint() {
        let series = parse_series(&wind_payload(&[8.0, 9.0, 10.0, 11.0]), &wind_key())
            .await
            .unwrap();
        assert_eq!(series.median(), Some(9.5));
    }

    #[tokio::test]
    async fn truncated_payload_is_rejected() {
        let err = parse_series(b"a,b\n1,2\n", &wind_key()).await.unwrap_err();
        assert!(matches!(err, ParseError::TruncatedPayload { lines: 2, .. }));
    }

    #[tokio::test]
    async fn missing_target_field_is_rejected() {
        let payload = b"SiteID,Latitude,Longitude,Elevation\n\
                        1,39.0,-79.0,100.0\n\
                        Temperature,Pressure\n\
                        C,atm\n\
                        10.4,0.95\n";
        let err = parse_series(payload, &wind_key()).await.unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "Speed"));
    }

    #[tokio::test]
    async fn metadata_shape_mismatch_is_rejected() {
        let payload = b"SiteID,Latitude\n\
                        1,39.0,-79.0\n\
                        Speed\n\
                        m/s\n\
                        9.5\n";
        let err = parse_series(payload, &wind_key()).await.unwrap_err();
        assert!(matches!(
            err,
            ParseError::MetadataMismatch {
                names: 2,
                values: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn absent_optional_metadata_is_tolerated() {
        let payload = b"SiteID,TimeZone\n\
                        1,0\n\
                        Speed,Direction\n\
                        m/s,degrees\n\
                        9.5,180.0\n\
                        8.5,181.0\n";
        let series = parse_series(payload, &wind_key()).await.unwrap();
        assert_eq!(series.provider_coordinate, None);
        assert_eq!(series.elevation, None);
        assert_eq!(series.samples, [9.5, 8.5]);
    }
}
