pub mod calendar;
pub mod config;
pub mod error;
pub mod grid;
pub mod month;
pub mod tz;
pub mod view;

pub use calendar::{CalendarSystem, Gregorian, IntoCalendarDay};
pub use error::{Error, ErrorKind, Result};
pub use grid::{Coordinate, GridBuilder, GridModel, GridOptions};
pub use month::MonthPage;
pub use view::{CalendarView, DataSource, DateFormatting, Dated, Delegate};
