//! Configuration for umbrawatch.
//!
//! Settings live in `umbrawatch.toml`, searched in
//! `$XDG_CONFIG_HOME/umbrawatch/` unless a directory is given with
//! `--config`. A commented default file is written on first use.
//!
//! ```toml
//! #[Shadow dataset]
//! dataset = "umbra_hi.geojson"  # GeoJSON export of the umbra shapefile
//! layer = "umbra_hi"            # Layer name inside the export
//! time_field = "UTCSec"         # Attribute holding seconds since UTC midnight
//! center_lon_field = "CenterLon"
//! center_lat_field = "CenterLat"
//!
//! #[Observer]
//! latitude = 37.7
//! longitude = -89.2
//! gpsd = "localhost:2947"       # Track the observer with a GPS receiver
//! offset_latitude = 0.0         # Shift applied to every GPS position
//! offset_longitude = 0.0
//!
//! #[Alerts]
//! buzzer = "/sys/class/gpio/gpio17"
//! time_offset = 0               # Shift the scheduler clock for rehearsals
//! verbose = false
//! ```
//!
//! Every field is optional. Relative dataset paths are resolved against the
//! directory holding the configuration file.

pub mod builder;
pub mod loading;
pub mod validation;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::geo::Location;
use crate::umbra::DatasetFields;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the GeoJSON shadow dataset.
    pub dataset: Option<PathBuf>,
    pub layer: Option<String>,
    pub time_field: Option<String>,
    pub center_lon_field: Option<String>,
    pub center_lat_field: Option<String>,
    /// Sysfs GPIO directory of the buzzer line, e.g. `/sys/class/gpio/gpio17`.
    pub buzzer: Option<PathBuf>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `host:port` of a gpsd daemon; `watch` follows its fixes.
    pub gpsd: Option<String>,
    pub offset_latitude: Option<f64>,
    pub offset_longitude: Option<f64>,
    /// Seconds added to the clock before scheduling.
    pub time_offset: Option<i64>,
    /// Log every feature the locator visits.
    pub verbose: Option<bool>,
}

impl Config {
    /// Attribute names used to read the dataset.
    pub fn dataset_fields(&self) -> DatasetFields {
        DatasetFields {
            layer: self.layer.clone().unwrap_or_else(|| DEFAULT_LAYER.to_string()),
            time: self
                .time_field
                .clone()
                .unwrap_or_else(|| DEFAULT_TIME_FIELD.to_string()),
            center_lon: self
                .center_lon_field
                .clone()
                .unwrap_or_else(|| DEFAULT_CENTER_LON_FIELD.to_string()),
            center_lat: self
                .center_lat_field
                .clone()
                .unwrap_or_else(|| DEFAULT_CENTER_LAT_FIELD.to_string()),
        }
    }

    /// Dataset path, with relative paths taken from `base_dir`.
    pub fn dataset_path(&self, base_dir: &Path) -> PathBuf {
        let dataset = self
            .dataset
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET));
        if dataset.is_absolute() {
            dataset
        } else {
            base_dir.join(dataset)
        }
    }

    /// Configured observer position, if both coordinates are set.
    pub fn location(&self) -> Option<Location> {
        Some(Location::new(self.longitude?, self.latitude?))
    }

    /// Shift added to GPS positions before they are checked.
    pub fn position_offset(&self) -> Location {
        Location::new(
            self.offset_longitude.unwrap_or(0.0),
            self.offset_latitude.unwrap_or(0.0),
        )
    }

    pub fn time_offset(&self) -> i64 {
        self.time_offset.unwrap_or(0)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn log_config(&self, base_dir: &Path) {
        log_block_start!("Loaded configuration");
        log_indented!(
            "Dataset: {}",
            private_path(&self.dataset_path(base_dir))
        );
        let fields = self.dataset_fields();
        log_indented!(
            "Layer: {} (time {}, center {}/{})",
            fields.layer,
            fields.time,
            fields.center_lon,
            fields.center_lat
        );

        if let Some(location) = self.location() {
            log_indented!(
                "Location: {:.4}°{}, {:.4}°{}",
                location.lat.abs(),
                if location.lat >= 0.0 { "N" } else { "S" },
                location.lon.abs(),
                if location.lon >= 0.0 { "E" } else { "W" }
            );
        }

        if let Some(address) = &self.gpsd {
            log_indented!("GPS: gpsd at {address}");
            let offset = self.position_offset();
            if offset != Location::default() {
                log_indented!(
                    "Position offset: {:+.4}° lat, {:+.4}° lon",
                    offset.lat,
                    offset.lon
                );
            }
        }

        match &self.buzzer {
            Some(path) => log_indented!("Buzzer: {}", private_path(path)),
            None => log_indented!("Buzzer: none (silent alerts)"),
        }

        if self.time_offset() != 0 {
            log_indented!("Time offset: {}s", self.time_offset());
        }
    }
}
