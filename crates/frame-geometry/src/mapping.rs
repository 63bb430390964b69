//! Affine frame-to-display mapping

use serde::{Deserialize, Serialize};

use crate::rect::Rect;

const SINGULAR_EPSILON: f32 = 1e-9;

/// 2x3 affine matrix:
///
/// ```text
/// x' = a * x + b * y + tx
/// y' = c * x + d * y + ty
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Mapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mapping {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::identity()
        }
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// Clockwise rotation in screen coordinates (y down).
    ///
    /// Quarter turns use exact coefficients so mapped rectangles stay axis aligned.
    pub fn rotation(degrees: i32) -> Self {
        let (cos, sin) = match degrees.rem_euclid(360) {
            0 => (1.0, 0.0),
            90 => (0.0, 1.0),
            180 => (-1.0, 0.0),
            270 => (0.0, -1.0),
            other => {
                let rad = (other as f32).to_radians();
                (rad.cos(), rad.sin())
            }
        };
        Self {
            a: cos,
            b: -sin,
            c: sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &Mapping) -> Mapping {
        Mapping {
            a: next.a * self.a + next.b * self.c,
            b: next.a * self.b + next.b * self.d,
            c: next.c * self.a + next.d * self.c,
            d: next.c * self.b + next.d * self.d,
            tx: next.a * self.tx + next.b * self.ty + next.tx,
            ty: next.c * self.tx + next.d * self.ty + next.ty,
        }
    }

    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.b * y + self.tx,
            self.c * x + self.d * y + self.ty,
        )
    }

    /// Bounding box of the four mapped corners
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        let corners = rect.corners().map(|(x, y)| self.map_point(x, y));
        Rect::bounding(&corners)
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse mapping, `None` when singular
    pub fn invert(&self) -> Option<Mapping> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Mapping {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + b * self.ty),
            ty: -(c * self.tx + d * self.ty),
        })
    }

    /// Uniform scale factor (length of the mapped unit x vector)
    pub fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn test_rotation_is_clockwise() {
        let rot = Mapping::rotation(90);
        // +x axis turns towards +y (down the screen)
        assert!(approx(rot.map_point(1.0, 0.0), (0.0, 1.0)));
        assert!(approx(rot.map_point(0.0, 1.0), (-1.0, 0.0)));
    }

    #[test]
    fn test_composition_order() {
        let m = Mapping::translation(10.0, 0.0).then(&Mapping::scaling(2.0, 2.0));
        assert!(approx(m.map_point(0.0, 0.0), (20.0, 0.0)));
    }

    #[test]
    fn test_invert() {
        let m = Mapping::translation(-5.0, 3.0)
            .then(&Mapping::rotation(270))
            .then(&Mapping::scaling(1.5, 1.5));
        let inv = m.invert().unwrap();
        let p = m.map_point(7.0, -2.0);
        assert!(approx(inv.map_point(p.0, p.1), (7.0, -2.0)));
    }

    #[test]
    fn test_singular() {
        assert!(Mapping::scaling(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_map_rect_rotated() {
        let r = Rect::new(0.0, 0.0, 4.0, 2.0);
        let mapped = Mapping::rotation(90).map_rect(&r);
        assert_eq!(mapped.width(), 2.0);
        assert_eq!(mapped.height(), 4.0);
    }
}
