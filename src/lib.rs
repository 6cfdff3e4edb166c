//! Weather lookup: an OpenWeatherMap proxy service and the client-side pieces
//! that consume it (daily forecast aggregation, search history and favorites).

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
