//! Region specification and resolution.
//!
//! A [`RegionSpec`] names the area of interest either as an explicit
//! rectangle or as a union of political boundaries; resolution turns it into
//! the concrete geometry the grid sampler sweeps.

pub mod boundary;
pub mod error;

use crate::config::ConfigError;
use crate::region::boundary::{BoundarySelection, BoundarySet};
use std::collections::BTreeSet;

/// Reserved code expanding to every covered region.
pub const ALL_REGIONS: &str = "ALL";

/// Legacy spelling of [`ALL_REGIONS`], kept for parity with the continental
/// US datasets this tool grew up on.
pub const CONTINENTAL: &str = "CONTINENTAL";

/// The fixed enumeration that [`ALL_REGIONS`] expands to: the continental US
/// states plus DC.
pub(crate) const CONTINENTAL_CODES: &[&str] = &[
    "AL", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA",
    "WA", "WV", "WI", "WY",
];

/// A user-specified geographic area.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionSpec {
    /// An explicit bounding rectangle in degrees.
    Rectangle {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },
    /// The union of named political boundaries, selected by region code.
    NamedBoundary { codes: BTreeSet<String> },
}

impl RegionSpec {
    pub fn rectangle(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        RegionSpec::Rectangle {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// A named-boundary region from any collection of region codes.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitecast::RegionSpec;
    ///
    /// let appalachia = RegionSpec::named(["PA", "OH", "WV"]);
    /// let everything = RegionSpec::named(["ALL"]);
    /// # let _ = (appalachia, everything);
    /// ```
    pub fn named<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RegionSpec::NamedBoundary {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }
}

/// A [`RegionSpec`] resolved against loaded boundary data, ready to sweep.
#[derive(Debug, Clone)]
pub(crate) enum ResolvedRegion {
    Rectangle {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },
    Boundary(BoundarySelection),
}

/// Resolves a region spec, failing fast on invalid option combinations.
///
/// Unknown region codes select nothing (an empty grid later on); a boundary
/// spec without any codes, or without a boundary set to look them up in, is a
/// configuration error.
pub(crate) fn resolve_region(
    spec: &RegionSpec,
    boundaries: Option<&BoundarySet>,
) -> Result<ResolvedRegion, ConfigError> {
    match spec {
        RegionSpec::Rectangle {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        } => {
            if min_lat > max_lat || min_lon > max_lon {
                return Err(ConfigError::InvalidRectangle {
                    min_lat: *min_lat,
                    max_lat: *max_lat,
                    min_lon: *min_lon,
                    max_lon: *max_lon,
                });
            }
            Ok(ResolvedRegion::Rectangle {
                min_lat: *min_lat,
                max_lat: *max_lat,
                min_lon: *min_lon,
                max_lon: *max_lon,
            })
        }
        RegionSpec::NamedBoundary { codes } => {
            if codes.is_empty() {
                return Err(ConfigError::EmptyRegionCodes);
            }
            let boundaries = boundaries.ok_or(ConfigError::MissingBoundaries)?;
            Ok(ResolvedRegion::Boundary(boundaries.select(codes)))
        }
    }
}
