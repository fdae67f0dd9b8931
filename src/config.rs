use chrono::Weekday;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::Gregorian;
use crate::error::{Error, Result};
use crate::grid::GridOptions;
use crate::tz::Tz;

const CONFIG_PATH_ENV_VAR: &str = "CALGRID_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("calgrid").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".calgrid.toml"));
    }

    locations
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarSpec {
    #[serde_as(as = "DisplayFromStr")]
    pub week_start: Weekday,
    pub timezone: Tz,
}

impl Default for CalendarSpec {
    fn default() -> Self {
        CalendarSpec {
            week_start: Weekday::Sun,
            timezone: Tz::utc(),
        }
    }
}

impl From<&CalendarSpec> for Gregorian {
    fn from(spec: &CalendarSpec) -> Self {
        Gregorian::new(spec.week_start, spec.timezone)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub grid: GridOptions,
    pub calendar: CalendarSpec,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|err| {
            let msg = format!(
                "{}: {}",
                path.display(),
                err.message.as_deref().unwrap_or_default()
            );
            err.with_msg(&msg)
        })
    }

    pub fn calendar(&self) -> Gregorian {
        Gregorian::from(&self.calendar)
    }
}

/// Load the config at `path`, or the first one found in the usual locations.
/// Without any config file the defaults apply.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        log::info!("Loading config from '{}'", path.display());
        return Config::from_file(path);
    }

    for location in find_configfile_locations() {
        if location.is_file() {
            log::info!("Loading config from '{}'", location.display());
            return Config::from_file(&location);
        }
        log::debug!("No config at '{}'", location.display());
    }

    log::info!("No config file found, using defaults");
    Ok(Config::default())
}

impl std::str::FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Config::from_toml(s)
    }
}
