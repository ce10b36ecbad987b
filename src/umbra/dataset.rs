//! Read-only access to the shadow footprint features.
//!
//! Features are addressed by their position in the dataset, which is also
//! their chronological order. [`GeoJsonDataset`] loads a GeoJSON export of
//! the NASA umbra shapefile (`ogr2ogr -f GeoJSON umbra_hi.geojson
//! umbra_hi.shp`), keeping every polygon in memory.

use geo::{Contains, MultiPolygon, Point};
use geojson::GeoJson;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

use super::error::UmbraError;
use crate::common::constants::*;
use crate::common::utils::private_path;

/// One sampled shadow footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowFeature {
    /// Position in the dataset.
    pub id: usize,
    /// Seconds since UTC midnight.
    pub time: i64,
    pub center_lon: f64,
    pub center_lat: f64,
    /// `None` when the source feature carried no polygon.
    pub polygon: Option<MultiPolygon<f64>>,
}

impl ShadowFeature {
    /// Build a feature not yet placed in a dataset. Its `id` stays 0 until
    /// [`GeoJsonDataset::from_features`] numbers it by position.
    pub fn new(time: i64, center_lon: f64, center_lat: f64, polygon: Option<MultiPolygon<f64>>) -> Self {
        Self {
            id: 0,
            time,
            center_lon,
            center_lat,
            polygon,
        }
    }

    /// Strict interior test; an absent polygon contains nothing.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygon
            .as_ref()
            .is_some_and(|polygon| polygon.contains(&Point::new(lon, lat)))
    }
}

/// Ordered, randomly seekable source of shadow features.
///
/// Implementations must be safe for concurrent reads so that independent
/// locators can share one dataset.
pub trait ShadowDataset: Send + Sync {
    fn feature_count(&self) -> usize;

    fn feature(&self, id: usize) -> Option<&ShadowFeature>;

    /// Features from `start` onward, in id order.
    fn features_from(&self, start: usize) -> Box<dyn Iterator<Item = &ShadowFeature> + '_> {
        Box::new((start..self.feature_count()).map_while(move |id| self.feature(id)))
    }
}

/// Attribute names used to read a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFields {
    pub layer: String,
    pub time: String,
    pub center_lon: String,
    pub center_lat: String,
}

impl Default for DatasetFields {
    fn default() -> Self {
        Self {
            layer: DEFAULT_LAYER.to_string(),
            time: DEFAULT_TIME_FIELD.to_string(),
            center_lon: DEFAULT_CENTER_LON_FIELD.to_string(),
            center_lat: DEFAULT_CENTER_LAT_FIELD.to_string(),
        }
    }
}

/// In-memory dataset, loaded from GeoJSON or built directly.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonDataset {
    features: Vec<ShadowFeature>,
}

impl GeoJsonDataset {
    /// Load the layer named by `fields.layer` from a GeoJSON file.
    ///
    /// GDAL records the source layer name in the collection's `name`
    /// member; a file without one is taken to be the requested layer.
    pub fn open(path: &Path, fields: &DatasetFields) -> Result<Self, UmbraError> {
        let open_error = |source: Box<dyn std::error::Error + Send + Sync>| UmbraError::Open {
            path: path.to_path_buf(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| open_error(Box::new(e)))?;
        let geojson: GeoJson = content.parse().map_err(|e: geojson::Error| open_error(Box::new(e)))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(UmbraError::LayerMissing {
                path: path.to_path_buf(),
                layer: fields.layer.clone(),
            });
        };

        let layer_name = collection
            .foreign_members
            .as_ref()
            .and_then(|members| members.get("name"))
            .and_then(JsonValue::as_str);
        if layer_name.is_some_and(|name| name != fields.layer) {
            return Err(UmbraError::LayerMissing {
                path: path.to_path_buf(),
                layer: fields.layer.clone(),
            });
        }

        let mut features = Vec::with_capacity(collection.features.len());
        let mut without_polygon = 0usize;
        for (index, feature) in collection.features.into_iter().enumerate() {
            let number = |field: &str| {
                feature
                    .property(field)
                    .and_then(JsonValue::as_f64)
                    .ok_or_else(|| UmbraError::Attribute {
                        index,
                        field: field.to_string(),
                    })
            };
            let time = number(&fields.time)? as i64;
            let center_lon = number(&fields.center_lon)?;
            let center_lat = number(&fields.center_lat)?;

            let polygon = feature.geometry.and_then(to_multi_polygon);
            if polygon.is_none() {
                without_polygon += 1;
            }
            features.push(ShadowFeature::new(time, center_lon, center_lat, polygon));
        }

        let dataset = Self::from_features(features);

        if without_polygon > 0 {
            log_warning!(
                "{} of {} shadow features in {} have no polygon",
                without_polygon,
                dataset.feature_count(),
                private_path(path)
            );
        }
        if !dataset.is_time_ordered() {
            log_warning!(
                "Shadow features in {} are not in time order; totality search may miss",
                private_path(path)
            );
        }

        Ok(dataset)
    }

    /// Build a dataset from features already in chronological order.
    /// Ids are reassigned to match positions.
    pub fn from_features(mut features: Vec<ShadowFeature>) -> Self {
        for (id, feature) in features.iter_mut().enumerate() {
            feature.id = id;
        }
        Self { features }
    }

    /// Whether timestamps never decrease with id. The locator's search
    /// relies on this.
    pub fn is_time_ordered(&self) -> bool {
        self.features.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }

    /// Earliest and latest timestamps in the dataset.
    pub fn time_span(&self) -> Option<(i64, i64)> {
        let min = self.features.iter().map(|f| f.time).min()?;
        let max = self.features.iter().map(|f| f.time).max()?;
        Some((min, max))
    }
}

impl ShadowDataset for GeoJsonDataset {
    fn feature_count(&self) -> usize {
        self.features.len()
    }

    fn feature(&self, id: usize) -> Option<&ShadowFeature> {
        self.features.get(id)
    }
}

fn to_multi_polygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    match geo_types::Geometry::<f64>::try_from(geometry.value).ok()? {
        geo_types::Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        geo_types::Geometry::MultiPolygon(multi) => Some(multi),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::logger::Log;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_geojson(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "name": "umbra_hi",
        "features": [
            {
                "type": "Feature",
                "properties": { "UTCSec": 65000, "CenterLon": -90.5, "CenterLat": 37.0 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-91.0, 36.5], [-90.0, 36.5], [-90.0, 37.5], [-91.0, 37.5], [-91.0, 36.5]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "UTCSec": 65001.0, "CenterLon": -90.4, "CenterLat": 37.0 },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_open_reads_features_in_order() {
        Log::set_enabled(false);
        let file = write_geojson(COLLECTION);
        let dataset = GeoJsonDataset::open(file.path(), &DatasetFields::default()).unwrap();

        assert_eq!(dataset.feature_count(), 2);
        let first = dataset.feature(0).unwrap();
        assert_eq!((first.id, first.time), (0, 65_000));
        assert!(first.contains(-90.5, 37.0));
        assert!(!first.contains(-89.0, 37.0));

        let second = dataset.feature(1).unwrap();
        assert_eq!((second.id, second.time), (1, 65_001));
        assert!(second.polygon.is_none());
        assert!(!second.contains(-90.5, 37.0));

        assert!(dataset.is_time_ordered());
        assert_eq!(dataset.time_span(), Some((65_000, 65_001)));
    }

    #[test]
    fn test_from_features_numbers_by_position() {
        let mut stray = ShadowFeature::new(300, 1.0, 1.0, None);
        stray.id = 42;
        let dataset = GeoJsonDataset::from_features(vec![
            ShadowFeature::new(100, 0.0, 0.0, None),
            ShadowFeature::new(200, 0.5, 0.0, None),
            stray,
        ]);

        let ids: Vec<usize> = dataset.features_from(0).map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(dataset.feature(2).map(|f| f.time), Some(300));
    }

    #[test]
    fn test_open_missing_file() {
        let err = GeoJsonDataset::open(Path::new("/nonexistent/umbra.geojson"), &DatasetFields::default())
            .unwrap_err();
        assert!(matches!(err, UmbraError::Open { .. }));
    }

    #[test]
    fn test_open_invalid_json() {
        let file = write_geojson("{ not geojson");
        let err = GeoJsonDataset::open(file.path(), &DatasetFields::default()).unwrap_err();
        assert!(matches!(err, UmbraError::Open { .. }));
    }

    #[test]
    fn test_open_wrong_layer() {
        let file = write_geojson(COLLECTION);
        let fields = DatasetFields {
            layer: "penumbra".to_string(),
            ..DatasetFields::default()
        };
        let err = GeoJsonDataset::open(file.path(), &fields).unwrap_err();
        match err {
            UmbraError::LayerMissing { layer, .. } => assert_eq!(layer, "penumbra"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_missing_attribute() {
        let file = write_geojson(COLLECTION);
        let fields = DatasetFields {
            time: "Seconds".to_string(),
            ..DatasetFields::default()
        };
        let err = GeoJsonDataset::open(file.path(), &fields).unwrap_err();
        match err {
            UmbraError::Attribute { index, field } => {
                assert_eq!(index, 0);
                assert_eq!(field, "Seconds");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_features_from_iterates_forward() {
        let dataset = GeoJsonDataset::from_features(
            (0..5).map(|i| ShadowFeature::new(100 + i, 0.0, 0.0, None)).collect(),
        );
        let ids: Vec<usize> = dataset.features_from(2).map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(dataset.features_from(5).count(), 0);
    }

    #[test]
    fn test_time_order_detection() {
        let dataset = GeoJsonDataset::from_features(vec![
            ShadowFeature::new(10, 0.0, 0.0, None),
            ShadowFeature::new(9, 0.0, 0.0, None),
        ]);
        assert!(!dataset.is_time_ordered());
    }
}
