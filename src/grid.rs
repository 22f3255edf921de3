//! Candidate coordinate grids over a resolved region.

use crate::config::ConfigError;
use crate::coordinate::Coordinate;
use crate::region::ResolvedRegion;
use ordered_float::OrderedFloat;
use std::collections::HashSet;

/// Tolerance for landing exactly on the max boundary of an axis sweep.
const STEP_EPSILON: f64 = 1e-9;

/// Produces an ordered, deduplicated sequence of [`Coordinate`]s covering a
/// region at a fixed step.
///
/// Positions are computed as `index * step + min` rather than by repeated
/// accumulation, so long sweeps cannot drift past the max boundary.
///
/// # Examples
///
/// ```
/// use sitecast::GridSampler;
///
/// let sampler = GridSampler::new(0.5).unwrap();
/// # let _ = sampler;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GridSampler {
    step: f64,
}

impl GridSampler {
    pub fn new(step: f64) -> Result<Self, ConfigError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::NonPositiveStep { step });
        }
        Ok(Self { step })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Sweeps the region lat-major and returns the retained coordinates.
    ///
    /// Rectangle regions keep every grid point; boundary regions sweep the
    /// union bounding box and keep only points inside one of the polygons.
    /// An empty selection yields an empty vector.
    pub(crate) fn sample(&self, region: &ResolvedRegion) -> Vec<Coordinate> {
        match region {
            ResolvedRegion::Rectangle {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => self.sweep(*min_lat, *max_lat, *min_lon, *max_lon, |_| true),
            ResolvedRegion::Boundary(selection) => match selection.bounding_box() {
                None => Vec::new(),
                Some((min_lat, max_lat, min_lon, max_lon)) => {
                    self.sweep(min_lat, max_lat, min_lon, max_lon, |c| {
                        selection.contains(c)
                    })
                }
            },
        }
    }

    fn sweep<F>(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
        retain: F,
    ) -> Vec<Coordinate>
    where
        F: Fn(Coordinate) -> bool,
    {
        let lat_steps = axis_steps(min_lat, max_lat, self.step);
        let lon_steps = axis_steps(min_lon, max_lon, self.step);

        let mut seen: HashSet<(OrderedFloat<f64>, OrderedFloat<f64>)> = HashSet::new();
        let mut coordinates = Vec::new();
        for i in 0..=lat_steps {
            let lat = min_lat + i as f64 * self.step;
            for j in 0..=lon_steps {
                let lon = min_lon + j as f64 * self.step;
                let candidate = Coordinate::new(lat, lon);
                if retain(candidate) && seen.insert(candidate.key()) {
                    coordinates.push(candidate);
                }
            }
        }
        coordinates
    }
}

/// Number of whole steps that fit on one axis, inclusive of the max boundary
/// when it is landed on exactly.
fn axis_steps(min: f64, max: f64, step: f64) -> u64 {
    let span = max - min;
    if span < 0.0 {
        return 0;
    }
    (span / step + STEP_EPSILON).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::boundary::BoundarySet;
    use crate::region::{resolve_region, RegionSpec};
    use std::path::PathBuf;

    fn rect(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> ResolvedRegion {
        ResolvedRegion::Rectangle {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    #[test]
    fn unit_square_at_half_degree_yields_nine_points() {
        let sampler = GridSampler::new(0.5).unwrap();
        let points = sampler.sample(&rect(0.0, 1.0, 0.0, 1.0));
        assert_eq!(points.len(), 9);
        let expected: Vec<(f64, f64)> = [0.0, 0.5, 1.0]
            .iter()
            .flat_map(|lat| [0.0, 0.5, 1.0].iter().map(move |lon| (*lat, *lon)))
            .collect();
        let got: Vec<(f64, f64)> = points.iter().map(|c| (c.lat, c.lon)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn order_is_stable_across_runs() {
        let sampler = GridSampler::new(0.5).unwrap();
        let a = sampler.sample(&rect(0.0, 1.0, 0.0, 1.0));
        let b = sampler.sample(&rect(0.0, 1.0, 0.0, 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn max_boundary_is_inclusive_only_when_landed_on() {
        let sampler = GridSampler::new(0.4).unwrap();
        let points = sampler.sample(&rect(0.0, 1.0, 0.0, 0.0));
        // 0.0, 0.4, 0.8; 1.2 overshoots.
        let lats: Vec<f64> = points.iter().map(|c| c.lat).collect();
        assert_eq!(lats.len(), 3);
        assert!((lats[2] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn drift_prone_span_still_reaches_the_boundary() {
        // 0.1 is not exactly representable; index*step + min must still land
        // on 1.0 within tolerance.
        let sampler = GridSampler::new(0.1).unwrap();
        let points = sampler.sample(&rect(0.0, 1.0, 0.0, 0.0));
        assert_eq!(points.len(), 11);
    }

    #[test]
    fn nonpositive_step_is_rejected() {
        assert!(matches!(
            GridSampler::new(0.0),
            Err(ConfigError::NonPositiveStep { .. })
        ));
        assert!(matches!(
            GridSampler::new(-0.5),
            Err(ConfigError::NonPositiveStep { .. })
        ));
    }

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "code": "SQ" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                }
            }
        ]
    }"#;

    #[test]
    fn boundary_sweep_drops_points_outside_the_polygon() {
        let set = BoundarySet::from_geojson_str(SQUARE, &PathBuf::from("sq.geojson")).unwrap();
        let spec = RegionSpec::named(["SQ"]);
        let region = resolve_region(&spec, Some(&set)).unwrap();
        let sampler = GridSampler::new(0.25).unwrap();
        let points = sampler.sample(&region);
        assert!(!points.is_empty());
        // Strictly interior points only; the sweep corners sit on the
        // polygon edge, which `contains` treats as outside.
        for point in &points {
            assert!(point.lat > 0.0 && point.lat < 1.0);
            assert!(point.lon > 0.0 && point.lon < 1.0);
        }
    }

    #[test]
    fn empty_selection_yields_empty_grid() {
        let set = BoundarySet::from_geojson_str(SQUARE, &PathBuf::from("sq.geojson")).unwrap();
        let spec = RegionSpec::named(["NOPE"]);
        let region = resolve_region(&spec, Some(&set)).unwrap();
        let sampler = GridSampler::new(0.25).unwrap();
        assert!(sampler.sample(&region).is_empty());
    }
}
