//! Core traits for mbviewer

use crate::{point::*, point_cloud::*, mesh::*};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

fn bounds_of<'a, I>(mut points: I) -> (Point3f, Point3f)
where
    I: Iterator<Item = &'a Point3f>,
{
    let first = match points.next() {
        Some(p) => *p,
        None => return (Point3f::origin(), Point3f::origin()),
    };

    let mut min = first;
    let mut max = first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }

    (min, max)
}

impl Drawable for PointCloud<Point3f> {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.points.iter())
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.vertices.iter())
    }
}
