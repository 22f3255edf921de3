//! Geographic coordinates and the single rounding precision used for cache
//! keys and grid deduplication.

use ordered_float::OrderedFloat;
use std::fmt;

/// Number of decimal places kept when a coordinate is used as a cache key.
///
/// Applied uniformly everywhere a key is formed, so floating-point-adjacent
/// coordinates collapse onto one cache entry. Three decimals is roughly 110 m
/// of latitude, well below the default grid step.
pub const KEY_DECIMALS: u32 = 3;

const KEY_SCALE: f64 = 1_000.0;

/// A `(latitude, longitude)` pair identifying a candidate sample point.
///
/// Equality is by value; [`Coordinate::rounded`] produces the canonical form
/// used as a cache key and join key.
///
/// # Examples
///
/// ```
/// use sitecast::Coordinate;
///
/// let site = Coordinate::new(39.0012, -79.9887);
/// assert_eq!(site.rounded(), Coordinate::new(39.001, -79.989));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Rounds both components to [`KEY_DECIMALS`] decimal places.
    pub fn rounded(self) -> Self {
        Self {
            lat: round_key(self.lat),
            lon: round_key(self.lon),
        }
    }

    /// Hashable form of the rounded coordinate, for grid deduplication.
    pub(crate) fn key(self) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        let r = self.rounded();
        (OrderedFloat(r.lat), OrderedFloat(r.lon))
    }

    /// The `lat_lon` filename fragment used in cache artifact paths.
    pub(crate) fn key_label(self) -> String {
        let r = self.rounded();
        format!("{:.3}_{:.3}", r.lat, r.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

fn round_key(value: f64) -> f64 {
    let rounded = (value * KEY_SCALE).round() / KEY_SCALE;
    // Normalize -0.0 so key labels are stable around the equator/meridian.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_collapses_adjacent_values() {
        let a = Coordinate::new(39.00049, -79.99951);
        let b = Coordinate::new(39.00051, -79.99949);
        // Within half a key step of each other, but they straddle the
        // rounding boundary, so they stay distinct keys.
        assert_ne!(a.key(), b.key());

        let c = Coordinate::new(39.0010001, -79.9990002);
        let d = Coordinate::new(39.0009999, -79.9989998);
        assert_eq!(c.key(), d.key());
    }

    #[test]
    fn key_label_has_fixed_precision() {
        let c = Coordinate::new(39.0, -79.98874);
        assert_eq!(c.key_label(), "39.000_-79.989");
    }

    #[test]
    fn negative_zero_is_normalized() {
        let c = Coordinate::new(-0.0001, -0.0004);
        assert_eq!(c.key_label(), "0.000_0.000");
    }
}
