//! Shape payloads submitted by the map client.
//!
//! `layerType` and `coordinates` travel together on the wire, so they are
//! modelled as one adjacently tagged enum. Records flatten it back into
//! their top-level fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A single `(latitude, longitude)` position, always written as a `[lat, lng]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "LatLngRepr", into = "(f64, f64)")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Accepted input forms: `[lat, lng]` or a Leaflet-style `{ "lat", "lng" }` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum LatLngRepr {
    Pair(f64, f64),
    Object { lat: f64, lng: f64 },
}

impl From<LatLngRepr> for LatLng {
    fn from(repr: LatLngRepr) -> Self {
        match repr {
            LatLngRepr::Pair(lat, lng) | LatLngRepr::Object { lat, lng } => Self { lat, lng },
        }
    }
}

impl From<LatLng> for (f64, f64) {
    fn from(p: LatLng) -> Self { (p.lat, p.lng) }
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self { Self { lat, lng } }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(ModelError::invalid(format!("latitude {} out of range", self.lat)));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(ModelError::invalid(format!("longitude {} out of range", self.lng)));
        }
        Ok(())
    }
}

/// Closed outline of a polygon or rectangle.
pub type Ring = Vec<LatLng>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Polygon,
    Rectangle,
    Polyline,
    Marker,
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayerType::Polygon => "polygon",
            LayerType::Rectangle => "rectangle",
            LayerType::Polyline => "polyline",
            LayerType::Marker => "marker",
        };
        f.write_str(s)
    }
}

/// Geometry of a map object, keyed by `layerType`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layerType", content = "coordinates", rename_all = "lowercase")]
pub enum Shape {
    Polygon(Vec<Ring>),
    Rectangle(Vec<Ring>),
    Polyline(Vec<LatLng>),
    Marker(LatLng),
}

impl Shape {
    pub fn layer_type(&self) -> LayerType {
        match self {
            Shape::Polygon(_) => LayerType::Polygon,
            Shape::Rectangle(_) => LayerType::Rectangle,
            Shape::Polyline(_) => LayerType::Polyline,
            Shape::Marker(_) => LayerType::Marker,
        }
    }

    pub fn points(&self) -> Box<dyn Iterator<Item = &LatLng> + '_> {
        match self {
            Shape::Polygon(rings) | Shape::Rectangle(rings) => Box::new(rings.iter().flatten()),
            Shape::Polyline(line) => Box::new(line.iter()),
            Shape::Marker(p) => Box::new(std::iter::once(p)),
        }
    }

    /// Check point ranges and the minimum vertex count of each layer type.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Shape::Marker(_) => {}
            Shape::Polyline(line) => {
                if line.len() < 2 {
                    return Err(ModelError::invalid("polyline needs at least 2 points"));
                }
            }
            Shape::Polygon(rings) => {
                if rings.is_empty() {
                    return Err(ModelError::invalid("polygon needs at least one ring"));
                }
                if rings.iter().any(|r| r.len() < 3) {
                    return Err(ModelError::invalid("polygon ring needs at least 3 points"));
                }
            }
            Shape::Rectangle(rings) => {
                if rings.len() != 1 || rings[0].len() != 4 {
                    return Err(ModelError::invalid("rectangle must be a single ring of 4 corners"));
                }
            }
        }
        self.points().try_for_each(LatLng::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_pairs_and_leaflet_objects() {
        let pair: LatLng = serde_json::from_value(json!([58.38, 33.91])).unwrap();
        let obj: LatLng = serde_json::from_value(json!({"lat": 58.38, "lng": 33.91})).unwrap();
        assert_eq!(pair, obj);
        assert_eq!(serde_json::to_value(obj).unwrap(), json!([58.38, 33.91]));
    }

    #[test]
    fn leaflet_object_ignores_altitude() {
        let p: LatLng = serde_json::from_value(json!({"lat": 1.5, "lng": 2.5, "alt": 100.0})).unwrap();
        assert_eq!(p, LatLng::new(1.5, 2.5));
    }

    #[test]
    fn shape_is_tagged_by_layer_type() {
        let shape: Shape = serde_json::from_value(json!({
            "layerType": "polyline",
            "coordinates": [[1.0, 2.0], [3.0, 4.0]]
        }))
        .unwrap();
        assert_eq!(shape.layer_type(), LayerType::Polyline);
        assert_eq!(
            serde_json::to_string(&shape).unwrap(),
            r#"{"layerType":"polyline","coordinates":[[1.0,2.0],[3.0,4.0]]}"#
        );
    }

    #[test]
    fn unknown_layer_type_is_rejected() {
        let res = serde_json::from_value::<Shape>(json!({"layerType": "circle", "coordinates": [1.0, 2.0]}));
        assert!(res.is_err());
    }

    #[test]
    fn marker_with_ring_payload_is_rejected() {
        let res = serde_json::from_value::<Shape>(json!({"layerType": "marker", "coordinates": [[1.0, 2.0]]}));
        assert!(res.is_err());
    }

    #[test]
    fn validation_rules() {
        let p = LatLng::new;
        assert!(Shape::Marker(p(10.0, 20.0)).validate().is_ok());
        assert!(Shape::Marker(p(91.0, 20.0)).validate().is_err());
        assert!(Shape::Marker(p(10.0, -181.0)).validate().is_err());
        assert!(Shape::Marker(p(f64::NAN, 0.0)).validate().is_err());

        assert!(Shape::Polyline(vec![p(0.0, 0.0)]).validate().is_err());
        assert!(Shape::Polyline(vec![p(0.0, 0.0), p(1.0, 1.0)]).validate().is_ok());

        assert!(Shape::Polygon(vec![]).validate().is_err());
        assert!(Shape::Polygon(vec![vec![p(0.0, 0.0), p(1.0, 0.0)]]).validate().is_err());
        assert!(Shape::Polygon(vec![vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]]).validate().is_ok());

        let corners = vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)];
        assert!(Shape::Rectangle(vec![corners.clone()]).validate().is_ok());
        assert!(Shape::Rectangle(vec![corners[..3].to_vec()]).validate().is_err());
        assert!(Shape::Rectangle(vec![corners.clone(), corners]).validate().is_err());
    }
}
