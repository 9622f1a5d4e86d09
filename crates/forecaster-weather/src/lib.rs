//! Weather forecasts for batches of city names.
//!
//! Cities are geocoded via Nominatim, forecasts come from the National
//! Weather Service, and both are cached in memory for the life of the
//! process.

pub mod cache;
pub mod calendar;
pub mod gateway;
pub mod geocode;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::ForecastCache;
pub use calendar::{match_periods, CalendarDay, TargetDays};
pub use gateway::{ForecastSource, LocationResolver};
pub use geocode::NominatimClient;
pub use provider::NwsClient;
pub use service::{CityOutcome, ForecastService, SkipReason};
pub use types::*;
