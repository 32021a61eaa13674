//! Planar primitives shared by the style model and the datasource seam.
use serde::{Deserialize, Serialize};
use std::ops::{Mul, MulAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Mul<f64> for Coord {
    type Output = Coord;

    fn mul(self, k: f64) -> Coord {
        Coord::new(self.x * k, self.y * k)
    }
}

impl MulAssign<f64> for Coord {
    fn mul_assign(&mut self, k: f64) {
        self.x *= k;
        self.y *= k;
    }
}

/// An axis-aligned rectangle. Construction normalizes the corners so that
/// `minx <= maxx` and `miny <= maxy` always hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Box2d {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Box2d {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            minx: x0.min(x1),
            miny: y0.min(y1),
            maxx: x0.max(x1),
            maxy: y0.max(y1),
        }
    }

    pub fn from_corners(a: Coord, b: Coord) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// A degenerate box covering a single point.
    pub fn from_point(p: Coord) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn center(&self) -> Coord {
        Coord::new((self.minx + self.maxx) * 0.5, (self.miny + self.maxy) * 0.5)
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }

    pub fn contains_coord(&self, c: &Coord) -> bool {
        self.contains(c.x, c.y)
    }

    pub fn contains_box(&self, other: &Box2d) -> bool {
        other.minx >= self.minx
            && other.maxx <= self.maxx
            && other.miny >= self.miny
            && other.maxy <= self.maxy
    }

    pub fn intersects(&self, other: &Box2d) -> bool {
        !(other.minx > self.maxx
            || other.maxx < self.minx
            || other.miny > self.maxy
            || other.maxy < self.miny)
    }

    pub fn intersection(&self, other: &Box2d) -> Option<Box2d> {
        if !self.intersects(other) {
            return None;
        }
        Some(Box2d {
            minx: self.minx.max(other.minx),
            miny: self.miny.max(other.miny),
            maxx: self.maxx.min(other.maxx),
            maxy: self.maxy.min(other.maxy),
        })
    }

    pub fn expand_to_include(&mut self, other: &Box2d) {
        self.minx = self.minx.min(other.minx);
        self.miny = self.miny.min(other.miny);
        self.maxx = self.maxx.max(other.maxx);
        self.maxy = self.maxy.max(other.maxy);
    }

    /// Recenters the box on `c`, keeping its size.
    pub fn re_center(&mut self, c: Coord) {
        let half_w = self.width() * 0.5;
        let half_h = self.height() * 0.5;
        self.minx = c.x - half_w;
        self.maxx = c.x + half_w;
        self.miny = c.y - half_h;
        self.maxy = c.y + half_h;
    }

    /// Resizes the box about its center.
    pub fn set_size(&mut self, width: f64, height: f64) {
        let c = self.center();
        self.minx = c.x - width * 0.5;
        self.maxx = c.x + width * 0.5;
        self.miny = c.y - height * 0.5;
        self.maxy = c.y + height * 0.5;
    }
}

impl MulAssign<f64> for Box2d {
    /// Scales the extent about the center; the center stays put.
    fn mul_assign(&mut self, k: f64) {
        let (w, h) = (self.width() * k, self.height() * k);
        self.set_size(w.abs(), h.abs());
    }
}

impl Mul<f64> for Box2d {
    type Output = Box2d;

    fn mul(mut self, k: f64) -> Box2d {
        self *= k;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_scaling() {
        let mut c = Coord::new(100.0, 100.0);
        c *= 2.0;
        assert_eq!(c, Coord::new(200.0, 200.0));
        assert_eq!(Coord::new(1.5, -2.0) * 2.0, Coord::new(3.0, -4.0));
    }

    #[test]
    fn box_contains_is_inclusive() {
        let e = Box2d::new(100.0, 100.0, 200.0, 200.0);
        assert!(e.contains(100.0, 100.0));
        assert!(e.contains(100.0, 200.0));
        assert!(e.contains(200.0, 200.0));
        assert!(e.contains(200.0, 100.0));
        assert!(e.contains_coord(&e.center()));

        assert!(!e.contains(99.9, 99.9));
        assert!(!e.contains(99.9, 200.1));
        assert!(!e.contains(200.1, 200.1));
        assert!(!e.contains(200.1, 99.9));

        assert_eq!(e.width(), 100.0);
        assert_eq!(e.height(), 100.0);
        assert_eq!(e.center(), Coord::new(150.0, 150.0));
    }

    #[test]
    fn box_normalizes_corners() {
        let e = Box2d::new(200.0, 50.0, 100.0, -50.0);
        assert_eq!(e, Box2d::new(100.0, -50.0, 200.0, 50.0));
        assert_eq!(e.minx, 100.0);
        assert_eq!(e.maxy, 50.0);
    }

    #[test]
    fn box_multiplication_expands_about_center() {
        let mut e = Box2d::new(100.0, 100.0, 200.0, 200.0);
        e *= 2.0;
        assert_eq!(e, Box2d::new(50.0, 50.0, 250.0, 250.0));
        assert!(e.contains(50.0, 250.0));
        assert!(!e.contains(49.9, 49.9));
        assert!(!e.contains(250.1, 250.1));
        assert_eq!(e.width(), 200.0);
        assert_eq!(e.center(), Coord::new(150.0, 150.0));

        let shrunk = Box2d::new(0.0, 0.0, 10.0, 10.0) * 0.5;
        assert_eq!(shrunk, Box2d::new(2.5, 2.5, 7.5, 7.5));
    }

    #[test]
    fn intersection_and_union() {
        let a = Box2d::new(0.0, 0.0, 10.0, 10.0);
        let b = Box2d::new(5.0, 5.0, 15.0, 15.0);
        assert!(a.intersects(&b));
        assert_eq!(a.intersection(&b), Some(Box2d::new(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(a.intersection(&Box2d::new(20.0, 20.0, 30.0, 30.0)), None);

        let mut u = a;
        u.expand_to_include(&b);
        assert_eq!(u, Box2d::new(0.0, 0.0, 15.0, 15.0));
        assert!(u.contains_box(&a));
    }
}
