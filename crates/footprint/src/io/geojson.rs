use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::Number;

use crate::{error::Result, types::Footprint};

fn number(value: f64) -> serde_json::Value {
    serde_json::Value::Number(Number::from_f64(value).unwrap_or_else(|| Number::from(0)))
}

impl Footprint {
    /// Geometry for the footprint: a closed polygon ring, or a line string or
    /// point for degenerate footprints. Empty footprints have no geometry.
    pub fn to_geojson_geometry(&self) -> Option<Geometry> {
        let positions: Vec<Vec<f64>> = self
            .integer_vertices()
            .into_iter()
            .map(|[x, y]| vec![x as f64, y as f64])
            .collect();

        let value = match positions.len() {
            0 => return None,
            1 => Value::Point(positions[0].clone()),
            _ if self.degenerate || positions.len() < 3 => Value::LineString(positions),
            _ => {
                let mut ring = positions;
                // GeoJSON rings repeat their first position at the end
                if ring.first() != ring.last() {
                    ring.push(ring[0].clone());
                }
                Value::Polygon(vec![ring])
            }
        };
        Some(Geometry::new(value))
    }

    /// Export as a single GeoJSON feature tagged with `name`
    pub fn to_geojson_feature(&self, name: &str) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), serde_json::Value::String(name.to_string()));
        properties.insert("area".to_string(), number(self.area()));
        properties.insert("perimeter".to_string(), number(self.perimeter()));
        properties.insert("vertex_count".to_string(), self.vertex_count().into());
        properties.insert("outline_points".to_string(), self.outline_points.into());
        properties.insert("degenerate".to_string(), self.degenerate.into());
        properties.insert("image_width".to_string(), self.image_width.into());
        properties.insert("image_height".to_string(), self.image_height.into());

        Feature {
            bbox: None,
            geometry: self.to_geojson_geometry(),
            id: Some(geojson::feature::Id::String(name.to_string())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Collect named footprints into one feature collection, in the given order
pub fn footprints_to_geojson(footprints: &[(String, Footprint)]) -> FeatureCollection {
    let features = footprints
        .iter()
        .map(|(name, footprint)| footprint.to_geojson_feature(name))
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("footprint_count".to_string(), footprints.len().into());

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Export to GeoJSON and serialize to a pretty-printed JSON string
pub fn to_geojson_string(footprints: &[(String, Footprint)]) -> Result<String> {
    let collection = footprints_to_geojson(footprints);
    Ok(serde_json::to_string_pretty(&collection)?)
}

/// Save a GeoJSON feature collection to file
pub fn save_geojson(footprints: &[(String, Footprint)], path: impl AsRef<std::path::Path>) -> Result<()> {
    std::fs::write(path, to_geojson_string(footprints)?)?;
    Ok(())
}
