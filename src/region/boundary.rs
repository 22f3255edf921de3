//! Named political boundaries loaded from GeoJSON.
//!
//! Each feature in the file carries a region code property (default `code`)
//! and a Polygon or MultiPolygon geometry. The set is loaded once per run and
//! queried read-only afterwards.

use crate::coordinate::Coordinate;
use crate::region::error::BoundaryError;
use crate::region::{ALL_REGIONS, CONTINENTAL, CONTINENTAL_CODES};
use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};
use geojson::{FeatureCollection, GeoJson, JsonValue};
use log::debug;
use std::collections::BTreeSet;
use std::path::Path;

/// Property name holding the region code on each boundary feature.
const REGION_CODE_PROPERTY: &str = "code";

#[derive(Debug)]
struct BoundaryRegion {
    code: String,
    geometry: MultiPolygon<f64>,
}

/// A set of named boundary polygons, e.g. one feature per state.
#[derive(Debug)]
pub struct BoundarySet {
    regions: Vec<BoundaryRegion>,
}

impl BoundarySet {
    /// Loads a boundary set from a GeoJSON file on disk.
    pub async fn from_geojson_file(path: &Path) -> Result<Self, BoundaryError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BoundaryError::Read(path.to_path_buf(), e))?;
        Self::from_geojson_str(&raw, path)
    }

    /// Parses a boundary set from GeoJSON text. `path` is only used in error
    /// messages.
    pub fn from_geojson_str(raw: &str, path: &Path) -> Result<Self, BoundaryError> {
        let geojson: GeoJson = raw
            .parse()
            .map_err(|e| BoundaryError::Parse(path.to_path_buf(), Box::new(e)))?;
        let collection = FeatureCollection::try_from(geojson)
            .map_err(|_| BoundaryError::NotFeatureCollection(path.to_path_buf()))?;

        let mut regions = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let code = feature
                .property(REGION_CODE_PROPERTY)
                .and_then(JsonValue::as_str)
                .map(str::to_owned)
                .ok_or_else(|| BoundaryError::MissingCode {
                    index,
                    property: REGION_CODE_PROPERTY.to_owned(),
                })?;
            let geometry = feature
                .geometry
                .ok_or_else(|| BoundaryError::MissingGeometry { code: code.clone() })?;
            let geometry: geo::Geometry<f64> =
                geometry
                    .try_into()
                    .map_err(|e| BoundaryError::GeometryConversion {
                        code: code.clone(),
                        source: Box::new(e),
                    })?;
            let geometry = match geometry {
                geo::Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                geo::Geometry::MultiPolygon(multi) => multi,
                _ => return Err(BoundaryError::UnsupportedGeometry { code }),
            };
            regions.push(BoundaryRegion { code, geometry });
        }

        debug!("loaded {} boundary regions", regions.len());
        Ok(Self { regions })
    }

    /// Codes of every region in the set, in file order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.code.as_str())
    }

    /// Selects the union of the named regions.
    ///
    /// The reserved codes [`ALL_REGIONS`] and [`CONTINENTAL`] expand to the
    /// fixed continental enumeration. Codes with no matching region select
    /// nothing; the resulting selection may be empty.
    pub fn select(&self, codes: &BTreeSet<String>) -> BoundarySelection {
        let expanded: BTreeSet<&str> = if codes
            .iter()
            .any(|c| c == ALL_REGIONS || c == CONTINENTAL)
        {
            CONTINENTAL_CODES.iter().copied().collect()
        } else {
            codes.iter().map(String::as_str).collect()
        };

        let polygons = self
            .regions
            .iter()
            .filter(|r| expanded.contains(r.code.as_str()))
            .map(|r| r.geometry.clone())
            .collect();
        BoundarySelection { polygons }
    }
}

/// The polygon union selected from a [`BoundarySet`].
#[derive(Debug, Clone)]
pub struct BoundarySelection {
    polygons: Vec<MultiPolygon<f64>>,
}

impl BoundarySelection {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Bounding box of the union as `(min_lat, max_lat, min_lon, max_lon)`,
    /// snapped to two decimals. `None` when the selection is empty.
    pub(crate) fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<Rect<f64>> = None;
        for polygon in &self.polygons {
            let rect = polygon.bounding_rect()?;
            bounds = Some(match bounds {
                None => rect,
                Some(acc) => Rect::new(
                    geo::coord! { x: acc.min().x.min(rect.min().x), y: acc.min().y.min(rect.min().y) },
                    geo::coord! { x: acc.max().x.max(rect.max().x), y: acc.max().y.max(rect.max().y) },
                ),
            });
        }
        bounds.map(|rect| {
            (
                round2(rect.min().y),
                round2(rect.max().y),
                round2(rect.min().x),
                round2(rect.max().x),
            )
        })
    }

    /// Point-in-polygon containment against the union. O(boundary
    /// complexity) per call.
    pub(crate) fn contains(&self, coordinate: Coordinate) -> bool {
        let point = Point::new(coordinate.lon, coordinate.lat);
        self.polygons.iter().any(|p| p.contains(&point))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
