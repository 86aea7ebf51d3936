// Adapters layer: concrete clients for the external services behind the domain ports.

pub mod chart_api;
pub mod http;
pub mod open_meteo;
