//! Shared test utilities for `ramoso-core`.

use std::{
    collections::HashMap,
    env, fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use proptest::test_runner::Config as ProptestConfig;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

use crate::{
    distance::DistanceValue,
    error::SpaceError,
    index::{ArenaTree, ArenaTreeBuilder, LeafEntry, MetricSpace, NodeRef, ObjectId, RoutingEntry},
    knn::DistancePair,
};

const PBT_CASES_ENV: &str = "RAMOSO_PBT_CASES";

/// Builds a proptest configuration honouring the `RAMOSO_PBT_CASES` override.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let cases = env::var(PBT_CASES_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|cases| *cases > 0)
        .unwrap_or(default_cases);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn position(id: ObjectId, len: usize) -> Result<usize, SpaceError> {
    usize::try_from(id.get())
        .ok()
        .filter(|index| *index < len)
        .ok_or(SpaceError::UnknownObject { id })
}

/// Points on the real line; object `i` sits at `points[i]`.
#[derive(Clone, Debug)]
pub(crate) struct LineSpace {
    points: Vec<f64>,
}

impl LineSpace {
    pub(crate) fn new(points: Vec<f64>) -> Self {
        Self { points }
    }

    pub(crate) fn ids(&self) -> Vec<ObjectId> {
        (0..self.points.len() as u64).map(ObjectId::new).collect()
    }
}

impl MetricSpace for LineSpace {
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
        let index = position(id, self.points.len())?;
        self.points
            .get(index)
            .copied()
            .ok_or(SpaceError::UnknownObject { id })
    }
}

/// Dense vectors under the Euclidean metric.
#[derive(Clone, Debug)]
pub(crate) struct VectorSpace {
    vectors: Vec<Vec<f64>>,
}

impl VectorSpace {
    pub(crate) fn new(vectors: Vec<Vec<f64>>) -> Self {
        Self { vectors }
    }

    pub(crate) fn ids(&self) -> Vec<ObjectId> {
        (0..self.vectors.len() as u64).map(ObjectId::new).collect()
    }
}

impl MetricSpace for VectorSpace {
    type Object = Vec<f64>;
    type Distance = f64;

    fn distance(&self, left: ObjectId, right: ObjectId) -> Result<f64, SpaceError> {
        let left = self.resolve(left)?;
        self.distance_to(&left, right)
    }

    fn distance_to(&self, query: &Vec<f64>, id: ObjectId) -> Result<f64, SpaceError> {
        let index = position(id, self.vectors.len())?;
        let stored = self
            .vectors
            .get(index)
            .ok_or(SpaceError::UnknownObject { id })?;
        if stored.len() != query.len() {
            return Err(SpaceError::DimensionMismatch {
                left: query.len(),
                right: stored.len(),
            });
        }
        Ok(query
            .iter()
            .zip(stored)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt())
    }

    fn resolve(&self, id: ObjectId) -> Result<Vec<f64>, SpaceError> {
        let index = position(id, self.vectors.len())?;
        self.vectors
            .get(index)
            .cloned()
            .ok_or(SpaceError::UnknownObject { id })
    }
}

/// Integer grid cells under the Manhattan metric.
///
/// Distances are exact, so ties at the `k`-th distance are common and never
/// blurred by rounding.
#[derive(Clone, Debug)]
pub(crate) struct GridSpace {
    cells: Vec<[i64; 2]>,
}

impl GridSpace {
    pub(crate) fn new(cells: Vec<[i64; 2]>) -> Self {
        Self { cells }
    }
}

impl MetricSpace for GridSpace {
    type Object = [i64; 2];
    type Distance = u64;

    fn distance(&self, left: ObjectId, right: ObjectId) -> Result<u64, SpaceError> {
        let left = self.resolve(left)?;
        self.distance_to(&left, right)
    }

    fn distance_to(&self, query: &[i64; 2], id: ObjectId) -> Result<u64, SpaceError> {
        let [x, y] = self.resolve(id)?;
        Ok(query[0].abs_diff(x) + query[1].abs_diff(y))
    }

    fn resolve(&self, id: ObjectId) -> Result<[i64; 2], SpaceError> {
        let index = position(id, self.cells.len())?;
        self.cells
            .get(index)
            .copied()
            .ok_or(SpaceError::UnknownObject { id })
    }
}

/// [`MetricSpace`] wrapper that records which objects the query was compared
/// against.
#[derive(Debug)]
pub(crate) struct CountingSpace<S> {
    inner: S,
    calls: AtomicUsize,
    evaluated: Mutex<Vec<ObjectId>>,
}

impl<S> CountingSpace<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            evaluated: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub(crate) fn evaluations_of(&self, id: ObjectId) -> usize {
        self.evaluated
            .lock()
            .expect("evaluation log lock poisoned")
            .iter()
            .filter(|seen| **seen == id)
            .count()
    }
}

impl<S: MetricSpace> MetricSpace for CountingSpace<S> {
    type Object = S::Object;
    type Distance = S::Distance;

    fn distance(&self, left: ObjectId, right: ObjectId) -> Result<S::Distance, SpaceError> {
        self.inner.distance(left, right)
    }

    fn distance_to(&self, query: &S::Object, id: ObjectId) -> Result<S::Distance, SpaceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.evaluated
            .lock()
            .expect("evaluation log lock poisoned")
            .push(id);
        self.inner.distance_to(query, id)
    }

    fn resolve(&self, id: ObjectId) -> Result<S::Object, SpaceError> {
        self.inner.resolve(id)
    }
}

/// Packs `ids` into a tree with at most `fanout` entries per node.
///
/// Consecutive identifiers share a subtree; the first of each group routes
/// it. Covering radii are exact and every entry caches its distance to the
/// enclosing routing object, so both pruning stages are exercised.
pub(crate) fn bulk_load<S: MetricSpace>(
    name: &str,
    space: &S,
    ids: &[ObjectId],
    fanout: usize,
) -> Result<ArenaTree<S::Distance>, SpaceError> {
    assert!(fanout >= 2, "fanout must allow splitting");
    assert!(!ids.is_empty(), "trees need at least one object");
    let mut builder = ArenaTreeBuilder::new(name);
    let root = pack(&mut builder, space, ids, None, fanout)?;
    Ok(builder.build(root).expect("bulk-loaded tree must be valid"))
}

fn pack<S: MetricSpace>(
    builder: &mut ArenaTreeBuilder<S::Distance>,
    space: &S,
    ids: &[ObjectId],
    parent: Option<ObjectId>,
    fanout: usize,
) -> Result<NodeRef, SpaceError> {
    if ids.len() <= fanout {
        let entries = ids
            .iter()
            .map(|&id| {
                let entry = LeafEntry::new(id);
                Ok(match parent {
                    Some(parent) => entry.with_parent_distance(space.distance(id, parent)?),
                    None => entry,
                })
            })
            .collect::<Result<_, SpaceError>>()?;
        return Ok(builder.push_leaf(entries));
    }

    let group = ids.len().div_ceil(fanout);
    let mut entries = Vec::new();
    for chunk in ids.chunks(group) {
        let routing = chunk[0];
        let mut radius = S::Distance::identity();
        for &member in chunk {
            radius = radius.max_with(&space.distance(routing, member)?);
        }
        let child = pack(builder, space, chunk, Some(routing), fanout)?;
        let entry = RoutingEntry::new(routing, radius, child);
        entries.push(match parent {
            Some(parent) => entry.with_parent_distance(space.distance(routing, parent)?),
            None => entry,
        });
    }
    Ok(builder.push_directory(entries))
}

/// Exhaustive oracle: every object's distance, sorted, cut at `k` and
/// extended over the boundary tie group.
pub(crate) fn brute_force<S: MetricSpace>(
    space: &S,
    ids: &[ObjectId],
    query: &S::Object,
    k: usize,
) -> Vec<DistancePair<S::Distance>> {
    let mut pairs: Vec<_> = ids
        .iter()
        .map(|&id| {
            let distance = space
                .distance_to(query, id)
                .expect("oracle distance must evaluate");
            DistancePair::new(distance, id)
        })
        .collect();
    pairs.sort_unstable();
    let cut = k.min(pairs.len());
    let Some(boundary) = cut.checked_sub(1).and_then(|last| pairs.get(last)).cloned() else {
        return Vec::new();
    };
    pairs
        .into_iter()
        .enumerate()
        .take_while(|(index, pair)| *index < cut || pair.compare_by_distance(&boundary).is_eq())
        .map(|(_, pair)| pair)
        .collect()
}

/// Captures closed spans and emitted events for assertions on
/// instrumentation.
#[derive(Clone, Default)]
pub(crate) struct RecordingLayer {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
    events: Arc<Mutex<Vec<EventRecord>>>,
}

impl RecordingLayer {
    /// Closed spans in completion order.
    pub(crate) fn spans(&self) -> Vec<SpanRecord> {
        self.spans.lock().expect("lock poisoned").clone()
    }

    /// Events in emission order.
    pub(crate) fn events(&self) -> Vec<EventRecord> {
        self.events.lock().expect("lock poisoned").clone()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SpanRecord {
    pub(crate) name: String,
    pub(crate) fields: HashMap<String, String>,
}

#[derive(Clone, Debug)]
pub(crate) struct EventRecord {
    pub(crate) level: Level,
    pub(crate) fields: HashMap<String, String>,
}

impl EventRecord {
    pub(crate) fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }
}

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut record = SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldRecorder(&mut record.fields));
            span.extensions_mut().insert(record);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(record) = span.extensions_mut().get_mut::<SpanRecord>() {
            values.record(&mut FieldRecorder(&mut record.fields));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        if let Some(record) = span.extensions_mut().remove::<SpanRecord>() {
            self.spans.lock().expect("lock poisoned").push(record);
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldRecorder(&mut fields));
        self.events.lock().expect("lock poisoned").push(EventRecord {
            level: *event.metadata().level(),
            fields,
        });
    }
}

struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}
