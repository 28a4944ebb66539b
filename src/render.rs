use crate::config::AppConfig;
use crate::data::IngestOutcome;
use crate::types::Dataset;
use geojson::{Feature, FeatureCollection};
use rand::Rng;
use serde::Serialize;

/// One drawable layer: a dataset serialized to GeoJSON plus its style inputs.
#[derive(Debug, Clone, Serialize)]
pub struct LayerView {
    pub name: String,
    /// Fill color, drawn once per layer and reused for every feature in it.
    pub color: String,
    pub tooltip_fields: Vec<String>,
    pub features: FeatureCollection,
}

/// The full map payload rebuilt on every render cycle.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    /// [lat, lon]
    pub center: [f64; 2],
    pub zoom: u8,
    pub outline_color: String,
    pub outline_weight: f64,
    pub fill_opacity: f64,
    pub layers: Vec<LayerView>,
}

/// Build the map for the current selection. Selected names with no matching
/// dataset are stale leftovers from an earlier upload set and draw nothing.
pub fn build_map(config: &AppConfig, outcome: &IngestOutcome, selection: &[String]) -> MapView {
    let mut rng = rand::thread_rng();
    let mut layers = Vec::new();

    for name in selection {
        let dataset = match outcome.get(name) {
            Some(d) => d,
            None => continue, // stale selection from an earlier upload set
        };
        if dataset.records.is_empty() {
            continue;
        }
        layers.push(LayerView {
            name: dataset.name.clone(),
            color: random_fill_color(&mut rng),
            tooltip_fields: dataset.columns.clone(),
            features: to_feature_collection(dataset),
        });
    }

    MapView {
        center: [config.map.center_lat, config.map.center_lon],
        zoom: config.map.zoom,
        outline_color: config.style.outline_color.clone(),
        outline_weight: config.style.outline_weight,
        fill_opacity: config.style.fill_opacity,
        layers,
    }
}

/// Serialize a dataset to a GeoJSON FeatureCollection; attributes become
/// feature properties.
pub fn to_feature_collection(dataset: &Dataset) -> FeatureCollection {
    let features = dataset
        .records
        .iter()
        .map(|record| Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(
                &record.geometry,
            ))),
            id: None,
            properties: Some(record.attributes.clone()),
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Uniform random color over the full RGB space, six hex digits.
pub fn random_fill_color(rng: &mut impl Rng) -> String {
    format!("#{:06x}", rng.gen_range(0..=0xFFFFFFu32))
}
