//! The main entry point for running site surveys.
//!
//! A [`SiteCast`] client owns the resource cache and the provider connection;
//! [`SiteCast::survey`] sequences grid sampling, fetch-or-reuse,
//! classification, and cost projection into one output table.

use crate::classify::ThresholdTable;
use crate::config::{ConfigError, YearWindow, DEFAULT_STEP_DEGREES};
use crate::coordinate::Coordinate;
use crate::cost::{CostRate, CostTable};
use crate::error::SiteCastError;
use crate::grid::GridSampler;
use crate::region::boundary::BoundarySet;
use crate::region::{resolve_region, RegionSpec};
use crate::resource::cache::ResourceCache;
use crate::resource::error::{ParseError, ResourceDataError};
use crate::resource::fetcher::{HttpResourceFetcher, ProviderConfig, ResourceProvider};
use crate::resource::key::ResourceKey;
use crate::resource::parser::SiteSeries;
use crate::survey::table::{SurveyRow, SurveyTable};
use crate::technology::Technology;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use futures_util::{stream, StreamExt};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_FETCH_RETRIES: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Client for estimating resource quality and projected costs at candidate
/// sites.
///
/// Create one with [`SiteCast::new`] (default cache directory) or
/// [`SiteCast::with_cache_folder`]; tests and custom providers can use
/// [`SiteCast::with_provider`].
///
/// # Examples
///
/// ```no_run
/// # use sitecast::{ProviderConfig, SiteCast, SiteCastError};
/// # async fn run() -> Result<(), SiteCastError> {
/// let client = SiteCast::new(
///     ProviderConfig::builder()
///         .api_key("DEMO_KEY")
///         .email("user@example.com")
///         .build(),
/// )
/// .await?;
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
pub struct SiteCast<P = HttpResourceFetcher> {
    cache: ResourceCache<P>,
}

/// The result of one survey run.
#[derive(Debug)]
pub struct SurveyOutcome {
    /// One row per successfully processed coordinate, in grid order.
    pub table: SurveyTable,
    /// Coordinates skipped because their fetch or parse failed.
    pub failures: Vec<SurveyFailure>,
    /// True when the run was cancelled before the grid was exhausted.
    pub cancelled: bool,
}

/// A coordinate-scoped failure recorded by the skip-and-continue policy.
#[derive(Debug)]
pub struct SurveyFailure {
    pub coordinate: Coordinate,
    pub error: ResourceDataError,
}

enum Processed {
    Row(Box<SurveyRow>),
    Skipped {
        coordinate: Coordinate,
        error: ResourceDataError,
    },
    Cancelled,
}

impl SiteCast<HttpResourceFetcher> {
    /// Creates a client using the default cache directory.
    pub async fn new(provider: ProviderConfig) -> Result<Self, SiteCastError> {
        let cache_folder = get_cache_dir().ok_or(SiteCastError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder, provider).await
    }

    /// Creates a client caching under `cache_folder`, created if missing.
    pub async fn with_cache_folder(
        cache_folder: PathBuf,
        provider: ProviderConfig,
    ) -> Result<Self, SiteCastError> {
        let fetcher = HttpResourceFetcher::new(provider).map_err(ResourceDataError::from)?;
        Self::with_provider(cache_folder, fetcher).await
    }
}

#[bon]
impl<P: ResourceProvider> SiteCast<P> {
    /// Creates a client backed by an arbitrary [`ResourceProvider`].
    pub async fn with_provider(cache_folder: PathBuf, provider: P) -> Result<Self, SiteCastError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| SiteCastError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            cache: ResourceCache::new(&cache_folder, provider),
        })
    }

    /// Runs a full survey: sample the region, fetch-or-reuse each
    /// coordinate's series, classify it, and join the cost projection.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.region(RegionSpec)`: **Required.** Area of interest.
    /// * `.data_year(u32)`: **Required.** Year of resource data to fetch.
    /// * `.technology(Technology)`: **Required.** Technology under study.
    /// * `.thresholds(&ThresholdTable)`: **Required.** Classification buckets.
    /// * `.costs(&CostTable)`: **Required.** Cost table for the technology.
    /// * `.window(YearWindow)`: **Required.** Projection years.
    /// * `.boundaries(&BoundarySet)`: Optional. Needed for named-boundary regions.
    /// * `.step_degrees(f64)`: Optional. Grid resolution, default 0.04.
    /// * `.max_concurrency(usize)`: Optional. Worker bound, default 4.
    /// * `.fetch_retries(u32)`: Optional. Retries after a fetch failure, default 2.
    /// * `.cancel(CancellationToken)`: Optional. Cooperative cancellation,
    ///   observed between coordinates.
    ///
    /// # Errors
    ///
    /// Invalid configuration surfaces as [`ConfigError`] before any sampling
    /// or fetching starts, and a cost-table gap as
    /// [`crate::ProjectionError`]. Fetch and parse failures are coordinate-
    /// scoped and recorded in [`SurveyOutcome::failures`]; only cache I/O
    /// failures abort a running survey.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use sitecast::*;
    /// # async fn run() -> Result<(), SiteCastError> {
    /// # let client = SiteCast::new(
    /// #     ProviderConfig::builder().api_key("k").email("e").build(),
    /// # ).await?;
    /// let thresholds = ThresholdTable::new([(9.0, 1), (8.0, 2), (0.0, 3)])?;
    /// let costs = CostTable::new(
    ///     Technology::Wind,
    ///     [(2021, CostRate { capex: 1_100_000.0, fopex: 40_000.0 })],
    /// )?;
    ///
    /// let outcome = client
    ///     .survey()
    ///     .region(RegionSpec::rectangle(39.0, 40.0, -80.0, -79.0))
    ///     .step_degrees(0.25)
    ///     .data_year(2012)
    ///     .technology(Technology::Wind)
    ///     .thresholds(&thresholds)
    ///     .costs(&costs)
    ///     .window(YearWindow::single(2021))
    ///     .call()
    ///     .await?;
    ///
    /// outcome.table.write_csv("wind_costs.csv".as_ref())?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn survey(
        &self,
        region: RegionSpec,
        boundaries: Option<&BoundarySet>,
        step_degrees: Option<f64>,
        data_year: u32,
        technology: Technology,
        thresholds: &ThresholdTable,
        costs: &CostTable,
        window: YearWindow,
        max_concurrency: Option<usize>,
        fetch_retries: Option<u32>,
        cancel: Option<CancellationToken>,
    ) -> Result<SurveyOutcome, SiteCastError> {
        let step = step_degrees.unwrap_or(DEFAULT_STEP_DEGREES);
        let concurrency = max_concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1);
        let retries = fetch_retries.unwrap_or(DEFAULT_FETCH_RETRIES);
        let cancel = cancel.unwrap_or_default();

        // Everything that can fail from configuration fails here, before a
        // single coordinate is sampled or fetched.
        if costs.technology() != technology {
            return Err(ConfigError::TechnologyMismatch {
                expected: technology,
                found: costs.technology(),
            }
            .into());
        }
        let sampler = GridSampler::new(step)?;
        let resolved = resolve_region(&region, boundaries)?;
        // Costs are technology-wide and coordinate-independent; project the
        // window once and copy the pairs into every row.
        let projected = costs.project(&window)?;

        let coordinates = sampler.sample(&resolved);
        info!(
            "surveying {} coordinates for {technology} at step {step}",
            coordinates.len()
        );

        let tasks = coordinates.into_iter().map(|coordinate| {
            let cancel = cancel.clone();
            let projected = projected.as_slice();
            async move {
                self.process(
                    coordinate,
                    technology,
                    data_year,
                    thresholds,
                    projected,
                    retries,
                    cancel,
                )
                .await
            }
        });

        let mut rows = Vec::new();
        let mut failures = Vec::new();
        let mut outcomes = stream::iter(tasks).buffered(concurrency);
        while let Some(outcome) = outcomes.next().await {
            match outcome? {
                Processed::Row(row) => rows.push(*row),
                Processed::Skipped { coordinate, error } => {
                    warn!("skipping {coordinate}: {error}");
                    failures.push(SurveyFailure { coordinate, error });
                }
                Processed::Cancelled => {}
            }
            if cancel.is_cancelled() {
                info!("survey cancelled, returning {} finished rows", rows.len());
                break;
            }
        }
        drop(outcomes);

        Ok(SurveyOutcome {
            table: SurveyTable::new(technology, window, rows),
            failures,
            cancelled: cancel.is_cancelled(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn process(
        &self,
        coordinate: Coordinate,
        technology: Technology,
        data_year: u32,
        thresholds: &ThresholdTable,
        projected: &[(u32, CostRate)],
        retries: u32,
        cancel: CancellationToken,
    ) -> Result<Processed, SiteCastError> {
        if cancel.is_cancelled() {
            return Ok(Processed::Cancelled);
        }

        let key = ResourceKey::new(technology, data_year, coordinate);
        let series = match self.fetch_with_retry(&key, retries).await {
            Ok(series) => series,
            // A broken backing store invalidates the whole run.
            Err(error @ ResourceDataError::Cache(_)) => return Err(error.into()),
            Err(error) => return Ok(Processed::Skipped { coordinate, error }),
        };

        let summary = match series.median() {
            Some(summary) => summary,
            None => {
                let error = ParseError::EmptySeries {
                    key: key.to_string(),
                    field: technology.target_field().to_owned(),
                };
                return Ok(Processed::Skipped {
                    coordinate,
                    error: error.into(),
                });
            }
        };
        let class = thresholds.classify(summary);

        Ok(Processed::Row(Box::new(SurveyRow {
            coordinate,
            provider_coordinate: series.provider_coordinate,
            elevation: series.elevation,
            summary,
            class,
            costs: projected.to_vec(),
        })))
    }

    /// Retries fetch failures with exponential backoff. Parse failures mean
    /// a permanent format mismatch and cache failures are fatal, so neither
    /// is retried.
    async fn fetch_with_retry(
        &self,
        key: &ResourceKey,
        retries: u32,
    ) -> Result<SiteSeries, ResourceDataError> {
        let mut attempt: u32 = 0;
        loop {
            match self.cache.get_or_fetch(key).await {
                Err(ResourceDataError::Fetch(error)) if attempt < retries => {
                    attempt += 1;
                    warn!("fetch attempt {attempt} failed for {key}, retrying: {error}");
                    tokio::time::sleep(RETRY_BACKOFF * (1 << (attempt - 1))).await;
                }
                other => return other,
            }
        }
    }
}
