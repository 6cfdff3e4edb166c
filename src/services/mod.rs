pub mod aggregate;
pub mod openweather;
