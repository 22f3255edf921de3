//! Site-quality and cost-projection surveys for renewable technologies.
//!
//! `sitecast` sweeps a geographic region with a regular coordinate grid,
//! downloads (and durably caches) a resource time series per coordinate,
//! summarizes each series into a discrete resource class, joins a per-year
//! cost projection, and emits one wide table per run.
//!
//! ```no_run
//! use sitecast::{
//!     CostTable, ProviderConfig, RegionSpec, SiteCast, SiteCastError, Technology,
//!     ThresholdTable, YearWindow,
//! };
//!
//! # async fn run() -> Result<(), SiteCastError> {
//! let client = SiteCast::new(
//!     ProviderConfig::builder()
//!         .api_key("DEMO_KEY")
//!         .email("user@example.com")
//!         .build(),
//! )
//! .await?;
//!
//! let thresholds = ThresholdTable::from_csv_file("wind_classes.csv".as_ref())?;
//! let costs = CostTable::from_csv_file("atb_costs.csv".as_ref(), Technology::Wind)?;
//!
//! let outcome = client
//!     .survey()
//!     .region(RegionSpec::rectangle(39.0, 40.0, -80.0, -79.0))
//!     .data_year(2012)
//!     .technology(Technology::Wind)
//!     .thresholds(&thresholds)
//!     .costs(&costs)
//!     .window(YearWindow::new(2021, 2030)?)
//!     .call()
//!     .await?;
//!
//! outcome.table.write_csv("wind_costs.csv".as_ref())?;
//! # Ok(())
//! # }
//! ```

mod classify;
mod config;
mod coordinate;
mod cost;
mod error;
mod grid;
mod region;
mod resource;
mod sitecast;
mod survey;
mod technology;
mod utils;

pub use error::SiteCastError;
pub use sitecast::{SiteCast, SurveyFailure, SurveyOutcome};

pub use classify::{ThresholdEntry, ThresholdTable};
pub use config::{ConfigError, YearWindow, DEFAULT_STEP_DEGREES};
pub use coordinate::{Coordinate, KEY_DECIMALS};
pub use cost::{CostRate, CostTable, ProjectionError};
pub use grid::GridSampler;
pub use region::boundary::BoundarySet;
pub use region::{RegionSpec, ALL_REGIONS, CONTINENTAL};
pub use technology::Technology;

pub use region::error::BoundaryError;
pub use resource::cache::ResourceCache;
pub use resource::error::{CacheError, FetchError, ParseError, ResourceDataError};
pub use resource::fetcher::{HttpResourceFetcher, ProviderConfig, ResourceProvider};
pub use resource::key::ResourceKey;
pub use resource::parser::SiteSeries;
pub use survey::table::{OutputError, SurveyRow, SurveyTable};
