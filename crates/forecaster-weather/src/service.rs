//! Forecast orchestration: cache-aside lookups of locations and periods,
//! and selection of the today / +1 / +2 periods for each requested city.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::cache::ForecastCache;
use crate::calendar::{match_periods, TargetDays, TARGET_DAY_COUNT};
use crate::gateway::{ForecastSource, LocationResolver};
use crate::types::{CacheSnapshot, CityForecast, ForecastError, Location, Period, WeatherForecast};

/// Source of "now" for computing the target days
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Why a city was left out of a forecast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    LocationLookupFailed(String),
    LocationNotFound,
    ForecastFetchFailed(String),
    NoMatchingPeriods,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LocationLookupFailed(e) => write!(f, "unable to retrieve location: {}", e),
            SkipReason::LocationNotFound => write!(f, "location not found"),
            SkipReason::ForecastFetchFailed(e) => write!(f, "unable to retrieve forecast: {}", e),
            SkipReason::NoMatchingPeriods => {
                write!(f, "no forecast period matches today or the next two days")
            }
        }
    }
}

/// Result of processing a single city
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityOutcome {
    Resolved(CityForecast),
    Skipped(SkipReason),
}

/// Cancellation observed while processing a city
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

enum Interrupt {
    Skip(SkipReason),
    Cancelled,
}

impl From<SkipReason> for Interrupt {
    fn from(reason: SkipReason) -> Self {
        Interrupt::Skip(reason)
    }
}

/// Coordinates the geocoder, the forecast API and the shared cache.
#[derive(Clone)]
pub struct ForecastService {
    resolver: Arc<dyn LocationResolver>,
    source: Arc<dyn ForecastSource>,
    cache: Arc<ForecastCache>,
    clock: Clock,
}

impl ForecastService {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        source: Arc<dyn ForecastSource>,
        cache: Arc<ForecastCache>,
    ) -> Self {
        Self {
            resolver,
            source,
            cache,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, e.g. with a fixed instant in tests.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Dump of the cache contents. Debug affordance only.
    pub fn cache_snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }

    /// Forecast for today and the next two days (UTC) for each city.
    ///
    /// Cities whose location or periods cannot be resolved are left out of
    /// the result; the call as a whole only fails when `cancel` fires, in
    /// which case the error carries the cities finished so far.
    #[instrument(skip(self, cities, cancel), fields(cities = cities.len()))]
    pub async fn get_forecast<S: AsRef<str>>(
        &self,
        cities: &[S],
        cancel: &CancellationToken,
    ) -> Result<WeatherForecast, ForecastError> {
        let days = TargetDays::starting((self.clock)());
        let mut result = WeatherForecast::default();

        for (processed, city) in cities.iter().enumerate() {
            let city = city.as_ref();

            let outcome = if cancel.is_cancelled() {
                Err(Cancelled)
            } else {
                self.forecast_city(city, &days, cancel).await
            };

            match outcome {
                Ok(CityOutcome::Resolved(forecast)) => result.forecast.push(forecast),
                Ok(CityOutcome::Skipped(reason)) => {
                    warn!(city, %reason, "skipping city");
                }
                Err(Cancelled) => {
                    warn!(processed, "forecast cancelled");
                    return Err(ForecastError::Cancelled {
                        partial: result,
                        processed,
                        requested: cities.len(),
                    });
                }
            }
        }

        Ok(result)
    }

    /// Resolve one city against the given target days.
    pub async fn forecast_city(
        &self,
        city: &str,
        days: &TargetDays,
        cancel: &CancellationToken,
    ) -> Result<CityOutcome, Cancelled> {
        match self.try_forecast_city(city, days, cancel).await {
            Ok(forecast) => Ok(CityOutcome::Resolved(forecast)),
            Err(Interrupt::Skip(reason)) => Ok(CityOutcome::Skipped(reason)),
            Err(Interrupt::Cancelled) => Err(Cancelled),
        }
    }

    async fn try_forecast_city(
        &self,
        city: &str,
        days: &TargetDays,
        cancel: &CancellationToken,
    ) -> Result<CityForecast, Interrupt> {
        let location = self.resolve_location(city, cancel).await?;
        let periods = self.resolve_periods(city, &location, days, cancel).await?;

        debug!(city, %days, periods = periods.len(), "finding forecast details");
        let detail = match_periods(&periods, days);
        if detail.is_empty() {
            return Err(SkipReason::NoMatchingPeriods.into());
        }

        Ok(CityForecast {
            name: city.to_string(),
            detail,
        })
    }

    async fn resolve_location(
        &self,
        city: &str,
        cancel: &CancellationToken,
    ) -> Result<Location, Interrupt> {
        if let Some(location) = self.cache.get_location(city) {
            return Ok(location);
        }

        info!(city, "location not found in cache, calling geocoder");
        let candidates = until_cancelled(cancel, self.resolver.resolve(city))
            .await?
            .map_err(|e| {
                if e.is_not_found() {
                    SkipReason::LocationNotFound
                } else {
                    SkipReason::LocationLookupFailed(e.to_string())
                }
            })?;

        // The geocoder ranks candidates; the first one is taken as the city.
        let location = candidates
            .into_iter()
            .next()
            .ok_or(SkipReason::LocationNotFound)?;

        self.cache.put_location(city, location.clone());
        Ok(location)
    }

    async fn resolve_periods(
        &self,
        city: &str,
        location: &Location,
        days: &TargetDays,
        cancel: &CancellationToken,
    ) -> Result<Vec<Period>, Interrupt> {
        let cached: Vec<Period> = days
            .iter()
            .filter_map(|day| self.cache.get_period(city, day))
            .collect();

        if cached.len() == TARGET_DAY_COUNT {
            return Ok(cached);
        }

        info!(
            city,
            cached = cached.len(),
            %days,
            "periods not found in cache, calling forecast API"
        );
        let periods = until_cancelled(cancel, self.source.fetch(&location.lat, &location.lon))
            .await?
            .map_err(|e| {
                warn!(city, lat = %location.lat, lon = %location.lon, "forecast lookup failed");
                SkipReason::ForecastFetchFailed(e.to_string())
            })?;

        for period in &periods {
            self.cache.put_period(city, period.calendar_day(), period.clone());
        }

        Ok(periods)
    }
}

/// Run an upstream call unless `cancel` fires first; on cancellation the
/// call's future is dropped, aborting the request.
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    call: F,
) -> Result<F::Output, Interrupt> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupt::Cancelled),
        output = call => Ok(output),
    }
}
