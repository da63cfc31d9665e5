//! Geometric primitives for PCF element definitions.
//!
//! PCF coordinates are absolute positions in the design's coordinate system,
//! in the unit declared by the file header (`UNITS-CO-ORDS`). Pipewright does
//! not convert units; values pass through to the host as read.
//!
//! - [`Point3`] - a 3D coordinate
//! - [`EndPoint`] - a connection point: position plus optional bore and
//!   end-preparation token

use serde::{Deserialize, Serialize};

/// A 3D point in the design coordinate space.
///
/// # Examples
///
/// ```
/// # use pipewright_core::geometry::Point3;
/// let p = Point3::new(1200.0, 450.5, 0.0);
/// assert_eq!(p.x(), 1200.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Point3 {
    /// Creates a new point with the specified coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the x-coordinate.
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate.
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns the z-coordinate.
    pub fn z(self) -> f64 {
        self.z
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A connection point of a piping component.
///
/// Carries the position from an `END-POINT` (or `CENTRE-POINT`,
/// `BRANCH1-POINT`, `ANGLE-POINT`) record, plus the optional nominal bore
/// and end-preparation token (`BW`, `FL`, `PL`, ...) that may follow the
/// coordinates on the same line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndPoint {
    position: Point3,
    bore: Option<f64>,
    end_prep: Option<String>,
}

impl EndPoint {
    /// Creates an end point at the given position with no bore or
    /// end-preparation data.
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            bore: None,
            end_prep: None,
        }
    }

    /// Sets the nominal bore.
    pub fn with_bore(mut self, bore: f64) -> Self {
        self.bore = Some(bore);
        self
    }

    /// Sets the end-preparation token.
    pub fn with_end_prep(mut self, end_prep: impl Into<String>) -> Self {
        self.end_prep = Some(end_prep.into());
        self
    }

    /// Returns the position.
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Returns the nominal bore, if declared.
    pub fn bore(&self) -> Option<f64> {
        self.bore
    }

    /// Returns the end-preparation token, if declared.
    pub fn end_prep(&self) -> Option<&str> {
        self.end_prep.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn distance_between_points() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!(approx_eq!(f64, a.distance(b), 5.0));
    }

    #[test]
    fn end_point_builder() {
        let ep = EndPoint::new(Point3::new(1.0, 2.0, 3.0))
            .with_bore(50.0)
            .with_end_prep("BW");
        assert_eq!(ep.bore(), Some(50.0));
        assert_eq!(ep.end_prep(), Some("BW"));
    }
}
