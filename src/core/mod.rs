pub mod calendar;
pub mod ephemeris;
pub mod export;
pub mod mock_chart;
pub mod moment;
pub mod natal;

pub use crate::domain::model::{BirthMoment, DayRecord, MonthCalendar, NatalChart};
pub use crate::domain::ports::{ChartProvider, EphemerisRangeSource, GeoLookup, TimezoneLookup};
pub use crate::utils::error::Result;
