//! In-memory forecast cache shared by every forecast request.
//!
//! Two independent maps: city → location and (city, day) → period. Entries
//! are never evicted and the last write for a key wins.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::calendar::CalendarDay;
use crate::types::{CacheSnapshot, Location, Period};

#[derive(Debug, Default)]
pub struct ForecastCache {
    locations: RwLock<HashMap<String, Location>>,
    periods: RwLock<HashMap<String, HashMap<CalendarDay, Period>>>,
}

impl ForecastCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_location(&self, city: &str) -> Option<Location> {
        self.locations.read().get(city).cloned()
    }

    pub fn put_location(&self, city: &str, location: Location) {
        self.locations.write().insert(city.to_string(), location);
    }

    pub fn get_period(&self, city: &str, day: CalendarDay) -> Option<Period> {
        self.periods
            .read()
            .get(city)
            .and_then(|days| days.get(&day))
            .cloned()
    }

    pub fn put_period(&self, city: &str, day: CalendarDay, period: Period) {
        self.periods
            .write()
            .entry(city.to_string())
            .or_default()
            .insert(day, period);
    }

    /// Copy of both maps. Each map is read under its own lock, so a
    /// concurrent writer may land between the two reads.
    pub fn snapshot(&self) -> CacheSnapshot {
        let locations = self
            .locations
            .read()
            .iter()
            .map(|(city, location)| (city.clone(), location.clone()))
            .collect();

        let periods = self
            .periods
            .read()
            .iter()
            .map(|(city, days)| {
                let days = days.iter().map(|(day, period)| (*day, period.clone())).collect();
                (city.clone(), days)
            })
            .collect();

        CacheSnapshot { locations, periods }
    }
}
