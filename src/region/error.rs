use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("failed to read boundary file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse boundary file '{0}' as GeoJSON")]
    Parse(PathBuf, #[source] Box<geojson::Error>),

    #[error("boundary file '{0}' is not a GeoJSON FeatureCollection")]
    NotFeatureCollection(PathBuf),

    #[error("boundary feature #{index} has no '{property}' code property")]
    MissingCode { index: usize, property: String },

    #[error("boundary region '{code}' has no geometry")]
    MissingGeometry { code: String },

    #[error("failed to convert geometry for boundary region '{code}'")]
    GeometryConversion {
        code: String,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("boundary region '{code}' is not a polygon or multipolygon")]
    UnsupportedGeometry { code: String },
}
