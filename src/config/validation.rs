//! Configuration validation.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;

/// Reject values the scheduler or locator cannot work with.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    let offsets = [
        ("offset_latitude", config.offset_latitude, 90.0),
        ("offset_longitude", config.offset_longitude, 180.0),
    ];
    for (key, value, limit) in offsets {
        if let Some(value) = value
            && !(-limit..=limit).contains(&value)
        {
            anyhow::bail!(
                "{} must be between -{} and {} degrees (got {})",
                key,
                limit,
                limit,
                value
            );
        }
    }

    if let Some(address) = &config.gpsd
        && address.trim().is_empty()
    {
        anyhow::bail!("gpsd must be a host:port address, not empty");
    }

    if config.latitude.is_some() != config.longitude.is_some() {
        anyhow::bail!("latitude and longitude must be set together");
    }

    if let Some(offset) = config.time_offset
        && !(-MAXIMUM_TIME_OFFSET..=MAXIMUM_TIME_OFFSET).contains(&offset)
    {
        anyhow::bail!(
            "time_offset ({}s) must be between -{} and {} seconds",
            offset,
            MAXIMUM_TIME_OFFSET,
            MAXIMUM_TIME_OFFSET
        );
    }

    let names = [
        ("layer", &config.layer),
        ("time_field", &config.time_field),
        ("center_lon_field", &config.center_lon_field),
        ("center_lat_field", &config.center_lat_field),
    ];
    for (key, value) in names {
        if let Some(value) = value
            && value.trim().is_empty()
        {
            anyhow::bail!("{} must not be empty", key);
        }
    }

    if let Some(dataset) = &config.dataset
        && dataset.as_os_str().is_empty()
    {
        anyhow::bail!("dataset must not be an empty path");
    }

    Ok(())
}
