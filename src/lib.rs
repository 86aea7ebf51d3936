pub mod adapters;
pub mod astro;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::{AppConfig, SourceStrategy};
pub use core::{ephemeris::EphemerisAggregator, natal::NatalChartResolver};
pub use domain::model::{BirthMoment, CalendarSource, ChartSource, DayRecord, MonthCalendar, NatalChart};
pub use utils::error::{CelestiaError, Result};
