use ramoso_core::{
    ArenaTree, ArenaTreeBuilder, LeafEntry, MetricSpace, ObjectId, RoutingEntry, SpaceError,
};

/// Points on the real line; object `i` sits at `points[i]`.
#[derive(Clone, Debug)]
pub struct Line {
    points: Vec<f64>,
}

impl Line {
    #[must_use]
    pub fn new(points: Vec<f64>) -> Self {
        Self { points }
    }
}

impl MetricSpace for Line {
    type Object = f64;
    type Distance = f64;

    fn distance(&self, left: ObjectId, right: ObjectId) -> Result<f64, SpaceError> {
        let left = self.resolve(left)?;
        self.distance_to(&left, right)
    }

    fn distance_to(&self, query: &f64, id: ObjectId) -> Result<f64, SpaceError> {
        Ok((query - self.resolve(id)?).abs())
    }

    fn resolve(&self, id: ObjectId) -> Result<f64, SpaceError> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.points.get(index).copied())
            .ok_or(SpaceError::UnknownObject { id })
    }
}

/// Objects at `{0, 1, 2, 3, 10}` in a two-leaf tree: the first four routed by
/// object 1 with radius 2, the outlier alone under itself.
#[must_use]
pub fn scenario() -> (ArenaTree<f64>, Line) {
    let line = Line::new(vec![0.0, 1.0, 2.0, 3.0, 10.0]);
    let mut builder = ArenaTreeBuilder::new("scenario");
    let cluster = builder.push_leaf(
        [(0, 1.0), (1, 0.0), (2, 1.0), (3, 2.0)]
            .into_iter()
            .map(|(id, to_parent)| LeafEntry::new(ObjectId::new(id)).with_parent_distance(to_parent))
            .collect(),
    );
    let outlier = builder.push_leaf(vec![LeafEntry::new(ObjectId::new(4))]);
    let root = builder.push_directory(vec![
        RoutingEntry::new(ObjectId::new(1), 2.0, cluster),
        RoutingEntry::new(ObjectId::new(4), 0.0, outlier),
    ]);
    let tree = builder.build(root).expect("scenario tree must assemble");
    (tree, line)
}
