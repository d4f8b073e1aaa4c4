//! Level-of-detail groups

use crate::render_prep::RenderablePointCloud;

/// One detail level, shown from `distance` onwards
#[derive(Debug, Clone, PartialEq)]
pub struct LodLevel {
    pub distance: f32,
    pub object: RenderablePointCloud,
}

/// Detail levels of one file, ordered by ascending distance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodGroup {
    levels: Vec<LodLevel>,
}

impl LodGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group where the i-th object becomes visible at `i * distance_step`
    pub fn from_objects(objects: Vec<RenderablePointCloud>, distance_step: f32) -> Self {
        let mut group = Self::new();
        for (i, object) in objects.into_iter().enumerate() {
            group.add_level(object, i as f32 * distance_step);
        }
        group
    }

    /// Insert a level, keeping levels sorted by distance
    pub fn add_level(&mut self, object: RenderablePointCloud, distance: f32) {
        let distance = distance.abs();
        let index = self
            .levels
            .iter()
            .position(|level| distance < level.distance)
            .unwrap_or(self.levels.len());
        self.levels.insert(index, LodLevel { distance, object });
    }

    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level to draw for a camera at `distance`: the farthest level whose
    /// threshold has been reached, or the first level when none has
    pub fn level_for_distance(&self, distance: f32) -> Option<&LodLevel> {
        let reached = self
            .levels
            .iter()
            .skip(1)
            .take_while(|level| distance >= level.distance)
            .count();
        self.levels.get(reached)
    }

    /// Total number of points over all levels
    pub fn point_count(&self) -> usize {
        self.levels.iter().map(|level| level.object.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_prep::prepare_point_cloud;
    use mbviewer_core::{Point3f, PointCloud};

    fn object(name: &str, points: usize) -> RenderablePointCloud {
        let cloud: PointCloud<Point3f> = (0..points).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect();
        prepare_point_cloud(&cloud, name)
    }

    #[test]
    fn test_from_objects_uses_distance_steps() {
        let group = LodGroup::from_objects(vec![object("a", 3), object("b", 2), object("c", 1)], 300.0);
        let distances: Vec<f32> = group.levels().iter().map(|l| l.distance).collect();

        assert_eq!(distances, vec![0.0, 300.0, 600.0]);
        assert_eq!(group.point_count(), 6);
    }

    #[test]
    fn test_add_level_keeps_order() {
        let mut group = LodGroup::new();
        group.add_level(object("far", 1), 500.0);
        group.add_level(object("near", 1), 0.0);
        group.add_level(object("mid", 1), 300.0);

        let names: Vec<&str> = group.levels().iter().map(|l| l.object.name.as_str()).collect();
        assert_eq!(names, vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_level_for_distance() {
        let group = LodGroup::from_objects(vec![object("a", 1), object("b", 1), object("c", 1)], 300.0);

        assert_eq!(group.level_for_distance(10.0).unwrap().object.name, "a");
        assert_eq!(group.level_for_distance(300.0).unwrap().object.name, "b");
        assert_eq!(group.level_for_distance(5_000.0).unwrap().object.name, "c");
        assert!(LodGroup::new().level_for_distance(10.0).is_none());
    }
}
