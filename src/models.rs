//! Location query types shared by the proxy routes, the proxy client and the
//! persisted search records.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// A WGS84 coordinate pair.
///
/// Persisted records use the `lng` key of the browser front-end; `lon` is
/// accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    #[serde(rename = "lng", alias = "lon")]
    pub lon: f64,
}

/// A user-specified location: a free-text city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Please provide a city or coordinates (lat and lon).")]
    Missing,
    #[error("Invalid value for '{field}': {value}")]
    InvalidCoordinate { field: &'static str, value: String },
}

impl LocationQuery {
    /// Build a query from raw request parameters.
    ///
    /// Blank values count as absent. A complete `lat`/`lon` pair wins over
    /// `city`; a lone `lat` or `lon` is ignored.
    pub fn from_parts(
        city: Option<&str>,
        lat: Option<&str>,
        lon: Option<&str>,
    ) -> Result<Self, QueryError> {
        let city = non_blank(city);
        let lat = non_blank(lat);
        let lon = non_blank(lon);

        match (lat, lon, city) {
            (Some(lat), Some(lon), _) => Ok(LocationQuery::Coordinates(Coordinates {
                lat: parse_coordinate("lat", lat, 90.0)?,
                lon: parse_coordinate("lon", lon, 180.0)?,
            })),
            (_, _, Some(city)) => Ok(LocationQuery::City(city.to_string())),
            _ => Err(QueryError::Missing),
        }
    }

    /// Location parameters for an OpenWeatherMap request.
    pub fn provider_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::City(city) => vec![("q", city.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
            }
        }
    }

    /// Parameters for a request to the proxy's own `/weather` and `/forecast`.
    pub fn proxy_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::City(city) => vec![("city", city.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
            }
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(city) => f.write_str(city),
            LocationQuery::Coordinates(c) => write!(f, "({:.2}, {:.2})", c.lat, c.lon),
        }
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_coordinate(field: &'static str, raw: &str, bound: f64) -> Result<f64, QueryError> {
    let invalid = || QueryError::InvalidCoordinate {
        field,
        value: raw.to_string(),
    };
    let v: f64 = raw.parse().map_err(|_| invalid())?;
    if !v.is_finite() || v.abs() > bound {
        return Err(invalid());
    }
    Ok(v)
}
