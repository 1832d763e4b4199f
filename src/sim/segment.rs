//! Line segment geometry for boundary walls
//!
//! A segment is a capsule: the line from `start` to `end` thickened by
//! `radius`. It has infinite mass and never moves on its own, but its
//! endpoints can be dragged with the pointer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point_in_circle;

/// Which end of a segment is grabbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentEnd {
    Start,
    End,
}

/// A thickened line segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
    /// Thickness radius
    pub radius: f32,
}

impl LineSegment {
    pub fn new(start: Vec2, end: Vec2, radius: f32) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::InvalidRadius(radius));
        }
        if start.distance_squared(end) < crate::consts::EPSILON {
            return Err(Error::DegenerateSegment {
                x: start.x,
                y: start.y,
            });
        }
        Ok(Self { start, end, radius })
    }

    /// Segment direction (not normalized)
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Closest point on the segment to `p` (projection clamped to the ends)
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let line = self.direction();
        let len_sq = line.length_squared();
        if len_sq < crate::consts::EPSILON {
            // Endpoints dragged on top of each other
            return self.start;
        }
        let t = (line.dot(p - self.start) / len_sq).clamp(0.0, 1.0);
        self.start + line * t
    }

    /// Unit normal of the segment on the side of `p`
    pub fn normal_toward(&self, p: Vec2) -> Vec2 {
        let perp = self.direction().perp().normalize_or_zero();
        if perp.dot(p - self.start) < 0.0 {
            -perp
        } else {
            perp
        }
    }

    /// Endpoint under the pointer, if any (start wins ties)
    pub fn endpoint_at(&self, point: Vec2) -> Option<SegmentEnd> {
        if point_in_circle(self.start, self.radius, point) {
            Some(SegmentEnd::Start)
        } else if point_in_circle(self.end, self.radius, point) {
            Some(SegmentEnd::End)
        } else {
            None
        }
    }

    /// Move one endpoint
    pub fn move_end(&mut self, which: SegmentEnd, to: Vec2) {
        match which {
            SegmentEnd::Start => self.start = to,
            SegmentEnd::End => self.end = to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate() {
        assert!(LineSegment::new(Vec2::ZERO, Vec2::ZERO, 5.0).is_err());
        assert!(LineSegment::new(Vec2::ZERO, Vec2::X, 0.0).is_err());
        assert!(LineSegment::new(Vec2::ZERO, Vec2::X, 5.0).is_ok());
    }

    #[test]
    fn test_closest_point_interior() {
        let seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 5.0).unwrap();
        let c = seg.closest_point(Vec2::new(40.0, 30.0));
        assert!((c - Vec2::new(40.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_closest_point_clamped() {
        let seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 5.0).unwrap();
        assert!((seg.closest_point(Vec2::new(-50.0, 10.0)) - seg.start).length() < 0.001);
        assert!((seg.closest_point(Vec2::new(150.0, -10.0)) - seg.end).length() < 0.001);
    }

    #[test]
    fn test_normal_toward() {
        let seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 5.0).unwrap();
        assert!(seg.normal_toward(Vec2::new(50.0, 10.0)).y > 0.99);
        assert!(seg.normal_toward(Vec2::new(50.0, -10.0)).y < -0.99);
    }

    #[test]
    fn test_endpoint_drag() {
        let mut seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 5.0).unwrap();
        assert_eq!(seg.endpoint_at(Vec2::new(1.0, 1.0)), Some(SegmentEnd::Start));
        assert_eq!(seg.endpoint_at(Vec2::new(99.0, 0.0)), Some(SegmentEnd::End));
        assert_eq!(seg.endpoint_at(Vec2::new(50.0, 0.0)), None);

        seg.move_end(SegmentEnd::End, Vec2::new(100.0, 50.0));
        assert!((seg.end - Vec2::new(100.0, 50.0)).length() < 0.001);
    }
}
