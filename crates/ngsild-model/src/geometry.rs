//! GeoJSON geometries held by GeoProperty attributes.
//!
//! Geometries are encoded as standard GeoJSON objects (RFC 7946), tagged by
//! their `type` member. `GeometryCollection` can be represented so it can be
//! recognized and rejected: NGSI-LD does not allow it as a GeoProperty value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position: longitude, latitude and optional altitude.
pub type Position = Vec<f64>;

/// A GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position
    Point {
        /// Position of the point
        coordinates: Position,
    },
    /// A line through two or more positions
    LineString {
        /// Positions along the line
        coordinates: Vec<Position>,
    },
    /// A polygon made of linear rings, exterior ring first
    Polygon {
        /// Linear rings
        coordinates: Vec<Vec<Position>>,
    },
    /// Several points
    MultiPoint {
        /// Positions of the points
        coordinates: Vec<Position>,
    },
    /// Several lines
    MultiLineString {
        /// Lines
        coordinates: Vec<Vec<Position>>,
    },
    /// Several polygons
    MultiPolygon {
        /// Polygons
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    /// Heterogeneous collection of geometries
    GeometryCollection {
        /// Member geometries
        #[serde(default)]
        geometries: Vec<Geometry>,
    },
}

/// Kind of a [`Geometry`], equal to its GeoJSON `type` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// `Point`
    Point,
    /// `LineString`
    LineString,
    /// `Polygon`
    Polygon,
    /// `MultiPoint`
    MultiPoint,
    /// `MultiLineString`
    MultiLineString,
    /// `MultiPolygon`
    MultiPolygon,
    /// `GeometryCollection`
    GeometryCollection,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        };
        f.write_str(name)
    }
}

impl Geometry {
    /// Create a point from longitude and latitude.
    #[must_use]
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Geometry::Point {
            coordinates: vec![longitude, latitude],
        }
    }

    /// The GeoJSON kind of this geometry.
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
            Geometry::MultiPoint { .. } => GeometryKind::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryKind::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection { .. } => GeometryKind::GeometryCollection,
        }
    }

    /// Whether this geometry may be the value of a GeoProperty.
    #[must_use]
    pub fn is_valid_geoproperty_value(&self) -> bool {
        self.kind() != GeometryKind::GeometryCollection
    }

    /// Whether every coordinate is a finite number.
    ///
    /// JSON has no representation for NaN or infinities.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let line = |l: &[Position]| l.iter().flatten().all(|c| c.is_finite());
        match self {
            Geometry::Point { coordinates } => coordinates.iter().all(|c| c.is_finite()),
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                line(coordinates)
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                coordinates.iter().all(|l| line(l))
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().all(|l| line(l))
            }
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().all(Geometry::is_finite)
            }
        }
    }

    /// Check coordinates against WGS 84 ranges and GeoJSON shape rules.
    ///
    /// # Errors
    ///
    /// Returns a description of the first implausible coordinate or shape.
    pub fn check_plausible(&self) -> Result<(), String> {
        match self {
            Geometry::Point { coordinates } => check_position(coordinates),
            Geometry::LineString { coordinates } => check_line(coordinates),
            Geometry::MultiPoint { coordinates } => {
                coordinates.iter().try_for_each(|p| check_position(p))
            }
            Geometry::Polygon { coordinates } => check_polygon(coordinates),
            Geometry::MultiLineString { coordinates } => {
                coordinates.iter().try_for_each(|l| check_line(l))
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().try_for_each(|p| check_polygon(p))
            }
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().try_for_each(Geometry::check_plausible)
            }
        }
    }
}

fn check_position(position: &[f64]) -> Result<(), String> {
    if !(2..=3).contains(&position.len()) {
        return Err(format!(
            "positions must have 2 or 3 coordinates, found {}",
            position.len()
        ));
    }
    if let Some(c) = position.iter().find(|c| !c.is_finite()) {
        return Err(format!("coordinate {c} is not finite"));
    }
    let (longitude, latitude) = (position[0], position[1]);
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {longitude} out of range"));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {latitude} out of range"));
    }
    Ok(())
}

fn check_line(line: &[Position]) -> Result<(), String> {
    if line.len() < 2 {
        return Err(format!(
            "line strings need at least 2 positions, found {}",
            line.len()
        ));
    }
    line.iter().try_for_each(|p| check_position(p))
}

fn check_polygon(rings: &[Vec<Position>]) -> Result<(), String> {
    for ring in rings {
        if ring.len() < 4 {
            return Err(format!(
                "linear rings need at least 4 positions, found {}",
                ring.len()
            ));
        }
        if ring.first() != ring.last() {
            return Err("linear rings must be closed".to_string());
        }
        ring.iter().try_for_each(|p| check_position(p))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Vec<Position> {
        vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]
    }

    #[test]
    fn point_wire_shape() {
        let value = serde_json::to_value(Geometry::point(11.25, 43.77)).unwrap();
        assert_eq!(value, json!({"type": "Point", "coordinates": [11.25, 43.77]}));
    }

    #[test]
    fn collection_is_parsed_but_not_a_geoproperty_value() {
        let g: Geometry = serde_json::from_value(json!({
            "type": "GeometryCollection",
            "geometries": [{"type": "Point", "coordinates": [1.0, 2.0]}]
        }))
        .unwrap();
        assert_eq!(g.kind(), GeometryKind::GeometryCollection);
        assert!(!g.is_valid_geoproperty_value());
    }

    #[test]
    fn every_simple_kind_is_accepted() {
        let docs = [
            json!({"type": "Point", "coordinates": [1.0, 2.0]}),
            json!({"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}),
            json!({"type": "Polygon", "coordinates": [square()]}),
            json!({"type": "MultiPoint", "coordinates": [[1.0, 2.0]]}),
            json!({"type": "MultiLineString", "coordinates": [[[1.0, 2.0], [3.0, 4.0]]]}),
            json!({"type": "MultiPolygon", "coordinates": [[square()]]}),
        ];
        for doc in docs {
            let g: Geometry = serde_json::from_value(doc.clone()).unwrap();
            assert!(g.is_valid_geoproperty_value(), "{doc}");
            assert!(g.check_plausible().is_ok(), "{doc}");
        }
    }

    #[test]
    fn finiteness_covers_nested_positions() {
        assert!(Geometry::point(1.0, 2.0).is_finite());
        assert!(!Geometry::point(f64::NAN, 2.0).is_finite());
        let mut ring = square();
        ring[2] = vec![f64::NEG_INFINITY, 1.0];
        assert!(!Geometry::MultiPolygon {
            coordinates: vec![vec![ring]]
        }
        .is_finite());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let res: Result<Geometry, _> =
            serde_json::from_value(json!({"type": "Circle", "coordinates": [1.0, 2.0]}));
        assert!(res.is_err());
    }

    #[test]
    fn plausibility_rejects_out_of_range() {
        assert!(Geometry::point(181.0, 0.0).check_plausible().is_err());
        assert!(Geometry::point(0.0, -90.5).check_plausible().is_err());
        let short = Geometry::Point {
            coordinates: vec![1.0],
        };
        assert!(short.check_plausible().is_err());
    }

    #[test]
    fn plausibility_rejects_open_ring() {
        let mut ring = square();
        ring.pop();
        ring.push(vec![0.5, 0.5]);
        let polygon = Geometry::Polygon {
            coordinates: vec![ring],
        };
        let reason = polygon.check_plausible().unwrap_err();
        assert!(reason.contains("closed"), "{reason}");
    }
}
