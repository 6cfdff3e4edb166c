//! Search history and favorites.
//!
//! Both lists are newest-first and stored under the same keys the browser
//! front-end used, so a store file can be seeded from a `localStorage` dump.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{KeyValueStore, StoreError};
use crate::models::{Coordinates, LocationQuery};

pub const HISTORY_KEY: &str = "weatherHistory";
pub const FAVORITES_KEY: &str = "weatherFavorites";
pub const DARK_MODE_KEY: &str = "darkMode";

/// A searched or bookmarked location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// City name, empty for coordinate searches
    pub city: String,
    pub coords: Option<Coordinates>,
    /// When the record was created, milliseconds since the Unix epoch.
    /// Doubles as the favorite's removal key.
    pub timestamp: i64,
}

impl SearchRecord {
    pub fn new(query: &LocationQuery, timestamp: i64) -> Self {
        match query {
            LocationQuery::City(city) => Self {
                city: city.clone(),
                coords: None,
                timestamp,
            },
            LocationQuery::Coordinates(c) => Self {
                city: String::new(),
                coords: Some(*c),
                timestamp,
            },
        }
    }

    /// The query to replay. The city wins when a record carries both.
    pub fn query(&self) -> Option<LocationQuery> {
        if !self.city.is_empty() {
            Some(LocationQuery::City(self.city.clone()))
        } else {
            self.coords.map(LocationQuery::Coordinates)
        }
    }

    fn same_location(&self, other: &SearchRecord) -> bool {
        self.city == other.city && self.coords == other.coords
    }
}

impl fmt::Display for SearchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.city, &self.coords) {
            (city, _) if !city.is_empty() => write!(f, "City: {}", city),
            (_, Some(c)) => write!(f, "Position: ({:.2}, {:.2})", c.lat, c.lon),
            _ => f.write_str("(empty)"),
        }
    }
}

/// History, favorites and the theme flag, loaded once from a backend and
/// written back in full on every mutation.
#[derive(Debug)]
pub struct SearchStore<S> {
    backend: S,
    history: Vec<SearchRecord>,
    favorites: Vec<SearchRecord>,
    dark_mode: bool,
}

impl<S: KeyValueStore> SearchStore<S> {
    /// Read all persisted state from `backend`. Absent keys mean empty lists
    /// and the light theme; unparseable values are errors.
    pub fn load(backend: S) -> Result<Self, StoreError> {
        let history = read_list(&backend, HISTORY_KEY)?;
        let favorites = read_list(&backend, FAVORITES_KEY)?;
        let dark_mode = backend.get(DARK_MODE_KEY)?.as_deref() == Some("true");

        tracing::debug!(
            "Loaded {} history records and {} favorites",
            history.len(),
            favorites.len()
        );

        Ok(Self {
            backend,
            history,
            favorites,
            dark_mode,
        })
    }

    pub fn history(&self) -> &[SearchRecord] {
        &self.history
    }

    pub fn favorites(&self) -> &[SearchRecord] {
        &self.favorites
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Prepend a search to the history. No cap, no deduplication.
    pub fn record_search(&mut self, query: &LocationQuery) -> Result<(), StoreError> {
        self.record_search_at(query, now_millis())
    }

    pub fn record_search_at(
        &mut self,
        query: &LocationQuery,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.history.insert(0, SearchRecord::new(query, timestamp));
        write_list(&mut self.backend, HISTORY_KEY, &self.history)
    }

    /// Prepend a favorite unless the same location is already saved.
    ///
    /// Returns `false` (and writes nothing) for a duplicate.
    pub fn add_favorite(&mut self, query: &LocationQuery) -> Result<bool, StoreError> {
        self.add_favorite_at(query, now_millis())
    }

    pub fn add_favorite_at(
        &mut self,
        query: &LocationQuery,
        timestamp: i64,
    ) -> Result<bool, StoreError> {
        let record = SearchRecord::new(query, timestamp);
        if self.favorites.iter().any(|f| f.same_location(&record)) {
            return Ok(false);
        }
        self.favorites.insert(0, record);
        write_list(&mut self.backend, FAVORITES_KEY, &self.favorites)?;
        Ok(true)
    }

    /// Remove the favorite created at `timestamp`. Returns `false` if none matched.
    pub fn remove_favorite(&mut self, timestamp: i64) -> Result<bool, StoreError> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.timestamp != timestamp);
        if self.favorites.len() == before {
            return Ok(false);
        }
        write_list(&mut self.backend, FAVORITES_KEY, &self.favorites)?;
        Ok(true)
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.dark_mode = enabled;
        self.backend
            .set(DARK_MODE_KEY, if enabled { "true" } else { "false" })
    }

    /// Flip the theme and return the new value.
    pub fn toggle_dark_mode(&mut self) -> Result<bool, StoreError> {
        self.set_dark_mode(!self.dark_mode)?;
        Ok(self.dark_mode)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn read_list<S: KeyValueStore>(backend: &S, key: &str) -> Result<Vec<SearchRecord>, StoreError> {
    match backend.get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

fn write_list<S: KeyValueStore>(
    backend: &mut S,
    key: &str,
    records: &[SearchRecord],
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(records)?;
    backend.set(key, &raw)
}
