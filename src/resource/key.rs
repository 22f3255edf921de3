use crate::coordinate::Coordinate;
use crate::technology::Technology;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of one cached series: `(technology, data year, coordinate)`.
///
/// The coordinate is rounded to the key precision at construction, so every
/// path and equality check downstream sees the canonical form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceKey {
    pub technology: Technology,
    pub year: u32,
    pub coordinate: Coordinate,
}

impl ResourceKey {
    pub fn new(technology: Technology, year: u32, coordinate: Coordinate) -> Self {
        Self {
            technology,
            year,
            coordinate: coordinate.rounded(),
        }
    }

    /// Deterministic artifact location below the cache root:
    /// `<cache_dir>/<technology>/<year>/<lat>_<lon>.csv`.
    pub(crate) fn artifact_path(&self, cache_dir: &Path) -> PathBuf {
        cache_dir
            .join(self.technology.cache_segment())
            .join(self.year.to_string())
            .join(format!("{}.csv", self.coordinate.key_label()))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.technology.cache_segment(),
            self.year,
            self.coordinate.key_label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_coordinates_share_an_artifact_path() {
        let dir = Path::new("/tmp/cache");
        let a = ResourceKey::new(
            Technology::Wind,
            2012,
            Coordinate::new(39.0001, -79.99899),
        );
        let b = ResourceKey::new(
            Technology::Wind,
            2012,
            Coordinate::new(39.00009, -79.99901),
        );
        assert_eq!(a.artifact_path(dir), b.artifact_path(dir));
        assert_eq!(
            a.artifact_path(dir),
            PathBuf::from("/tmp/cache/wind/2012/39.000_-79.999.csv")
        );
    }

    #[test]
    fn technologies_do_not_collide() {
        let dir = Path::new("/tmp/cache");
        let coordinate = Coordinate::new(39.0, -79.0);
        let wind = ResourceKey::new(Technology::Wind, 2012, coordinate);
        let solar = ResourceKey::new(Technology::Solar, 2012, coordinate);
        assert_ne!(wind.artifact_path(dir), solar.artifact_path(dir));
    }
}
