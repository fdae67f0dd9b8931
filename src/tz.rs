use chrono::{DateTime, NaiveDate, TimeZone};
use serde_with::DeserializeFromStr;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// Zone used to reduce instants to calendar days.
///
/// Grid computations never see this; it only matters when a caller hands a
/// `DateTime` to a constructor and the model has to decide which day it falls on.
#[derive(Clone, Copy, Debug, DeserializeFromStr, PartialEq, Eq)]
pub enum Tz {
    Local,
    Iana(chrono_tz::Tz),
}

impl Default for Tz {
    fn default() -> Self {
        Self::utc()
    }
}

impl Tz {
    const LOCAL_ID: &'static str = "Localtime";

    pub fn utc() -> Self {
        Self::Iana(chrono_tz::UTC)
    }

    pub fn id(&self) -> &str {
        match self {
            Tz::Local => Self::LOCAL_ID,
            Tz::Iana(tz) => tz.name(),
        }
    }

    /// The calendar day `datetime` falls on in this zone.
    pub fn calendar_day<T: TimeZone>(&self, datetime: &DateTime<T>) -> NaiveDate {
        match self {
            Tz::Local => datetime.with_timezone(&chrono::Local).date_naive(),
            Tz::Iana(tz) => datetime.with_timezone(tz).date_naive(),
        }
    }
}

impl Display for Tz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Tz {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowercase = s.to_lowercase();

        if matches!(lowercase.as_str(), "localtime" | "local") {
            Ok(Tz::Local)
        } else if let Ok(tz) = s.parse::<chrono_tz::Tz>() {
            Ok(Tz::Iana(tz))
        } else {
            Err(Error::new(
                ErrorKind::ParseError,
                &format!("Timezone '{}' not recognized", s),
            ))
        }
    }
}
