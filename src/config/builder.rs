//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::private_path;

/// Write a commented default configuration to `path`.
///
/// Optional settings without a sensible default (location, gpsd, buzzer) are
/// written commented out.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = default_config_content();
    fs::write(path, content)
        .with_context(|| format!("Failed to write default config to {}", private_path(path)))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", private_path(path));
    Ok(())
}

pub(crate) fn default_config_content() -> String {
    let quoted = |s: &str| format!("\"{s}\"");

    let mut content = ConfigBuilder::new()
        .add_section("Shadow dataset")
        .add_setting(
            "dataset",
            &quoted(DEFAULT_DATASET),
            "GeoJSON export of the umbra shapefile (relative to this file)",
        )
        .add_setting("layer", &quoted(DEFAULT_LAYER), "Layer name inside the export")
        .add_setting(
            "time_field",
            &quoted(DEFAULT_TIME_FIELD),
            "Attribute with seconds since UTC midnight",
        )
        .add_setting(
            "center_lon_field",
            &quoted(DEFAULT_CENTER_LON_FIELD),
            "Attribute with the shadow center longitude",
        )
        .add_setting(
            "center_lat_field",
            &quoted(DEFAULT_CENTER_LAT_FIELD),
            "Attribute with the shadow center latitude",
        )
        .add_section("Observer")
        .add_commented_setting("latitude", "37.700000", "Degrees north (-90 to 90)")
        .add_commented_setting("longitude", "-89.200000", "Degrees east (-180 to 180)")
        .add_commented_setting(
            "gpsd",
            &quoted(DEFAULT_GPSD_ADDRESS),
            "Follow a GPS receiver through gpsd in 'watch'",
        )
        .add_setting("offset_latitude", "0.0", "Shift added to GPS latitudes")
        .add_setting("offset_longitude", "0.0", "Shift added to GPS longitudes")
        .add_section("Alerts")
        .add_commented_setting(
            "buzzer",
            "\"/sys/class/gpio/gpio17\"",
            "Sysfs GPIO directory of the buzzer output",
        )
        .add_setting(
            "time_offset",
            "0",
            &format!("Clock shift in seconds for rehearsals (±{MAXIMUM_TIME_OFFSET})"),
        )
        .add_setting("verbose", "false", "Log every shadow shape the locator visits")
        .build();
    content.push('\n');
    content
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_commented_setting(self, key: &str, value: &str, comment: &str) -> Self {
        self.add_setting(&format!("# {key}"), value, comment)
    }

    fn build(self) -> String {
        // one space between the widest setting and its comment
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !result.is_empty() {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
