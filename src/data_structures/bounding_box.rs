//! Axis-aligned bounding boxes over cgmath points.

use cgmath::{Array, EuclideanSpace, Point3, Vector3};

/// Axis-aligned box spanned by `min` and `max`.
///
/// A box without any contributing point is the zero point-box at the
/// origin rather than an inverted or infinite box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// The zero point-box `min = max = (0, 0, 0)`.
    pub fn zero() -> Self {
        Self::point(Point3::origin())
    }

    pub fn point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Seed for min/max folds. Never handed out on its own.
    fn inverted() -> Self {
        Self {
            min: Point3::from_value(f32::INFINITY),
            max: Point3::from_value(f32::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point, or [`zero`](Self::zero) if
    /// there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Self {
        let mut points = points.into_iter().peekable();
        if points.peek().is_none() {
            return Self::zero();
        }
        points.fold(Self::inverted(), |mut bbox, point| {
            bbox.extend(point);
            bbox
        })
    }

    /// Smallest box containing every box, or [`zero`](Self::zero) if there
    /// are none.
    pub fn enclosing<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Self {
        let mut boxes = boxes.into_iter().peekable();
        if boxes.peek().is_none() {
            return Self::zero();
        }
        boxes.fold(Self::inverted(), |bbox, other| bbox.union(other))
    }

    pub fn extend(&mut self, point: Point3<f32>) {
        self.min = min_point(self.min, point);
        self.max = max_point(self.max, point);
    }

    pub fn union(self, other: &BoundingBox) -> Self {
        Self {
            min: min_point(self.min, other.min),
            max: max_point(self.max, other.max),
        }
    }

    pub fn contains(&self, point: Point3<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

fn min_point(a: Point3<f32>, b: Point3<f32>) -> Point3<f32> {
    Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

fn max_point(a: Point3<f32>, b: Point3<f32>) -> Point3<f32> {
    Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}
