use crate::config::ConfigError;
use crate::cost::ProjectionError;
use crate::region::error::BoundaryError;
use crate::resource::error::ResourceDataError;
use crate::survey::table::OutputError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteCastError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Resource(#[from] ResourceDataError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution,
}
