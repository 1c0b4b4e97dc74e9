//! A bulk-loaded bounding-rectangle tree with best-first nearest-neighbor
//! search over great-circle distances.
//!
//! The tree is packed once from a complete collection of entries (STR-style:
//! sort by longitude, slice, sort each slice by latitude, group into leaves,
//! then group each level until a single root remains) and never mutated
//! afterwards. Queries take `&self` only, so an index behind an `Arc` can be
//! searched from any number of threads without locking.
//!
//! Candidate subtrees are ranked by a lower bound on the great-circle
//! distance from the query point to their bounding rectangle. The bound must
//! never overestimate the true distance to any point inside the rectangle,
//! otherwise the search silently returns wrong answers; see
//! [`Rect::min_distance_km`] for why the bound used here is safe, including
//! across the antimeridian and near the poles.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::geodetic::{Geodetic, Point};

/// Maximum number of entries in a leaf and children in a branch.
const NODE_CAPACITY: usize = 16;

/// Axis-aligned bounding box in longitude/latitude degree space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

impl Rect {
    /// The empty rectangle: expanding it by anything yields that thing's
    /// bounds.
    const EMPTY: Rect = Rect {
        min_lat: f64::INFINITY,
        min_lon: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        max_lon: f64::NEG_INFINITY,
    };

    fn expand_point(&mut self, point: &Point) {
        self.min_lat = self.min_lat.min(point.latitude());
        self.min_lon = self.min_lon.min(point.longitude());
        self.max_lat = self.max_lat.max(point.latitude());
        self.max_lon = self.max_lon.max(point.longitude());
    }

    fn expand_rect(&mut self, other: &Rect) {
        self.min_lat = self.min_lat.min(other.min_lat);
        self.min_lon = self.min_lon.min(other.min_lon);
        self.max_lat = self.max_lat.max(other.max_lat);
        self.max_lon = self.max_lon.max(other.max_lon);
    }

    fn contains(&self, point: &Point) -> bool {
        point.latitude() >= self.min_lat
            && point.latitude() <= self.max_lat
            && point.longitude() >= self.min_lon
            && point.longitude() <= self.max_lon
    }

    /// Lower bound, in kilometers, on the great-circle distance from `query`
    /// to any point inside this rectangle.
    ///
    /// The bound is the haversine formula evaluated on per-axis minimized
    /// deltas. For any point p in the rectangle:
    ///
    /// - `dlat` (the clamp distance from the query latitude to the box's
    ///   latitude range) never exceeds `|lat_q - lat_p|`, and the central
    ///   angle between two points is at least their latitude difference;
    /// - `dlon` is the clamp distance to the box's longitude range, taking
    ///   the smaller of the direct path and the paths across the
    ///   antimeridian (query shifted by ±360°), so it never exceeds the
    ///   effective longitude difference to p;
    /// - `cos(lat_far)`, with `lat_far` the box latitude nearest a pole, is
    ///   the smallest latitude cosine anywhere in the box, so it never
    ///   exceeds `cos(lat_p)`.
    ///
    /// Each term therefore under-estimates the matching term of the exact
    /// haversine `h` for p, `h` is monotone in the resulting arc, and the
    /// bound never overestimates [`Geodetic::distance`] to p. A planar bound
    /// on raw degree differences would not survive the seam: two points at
    /// ±179.9° are 359.8 planar degrees but only ~22 km apart.
    fn min_distance_km(&self, geodetic: &Geodetic, query: &Point) -> f64 {
        let dlat = (self.min_lat - query.latitude())
            .max(query.latitude() - self.max_lat)
            .max(0.0);
        let dlon = {
            let clamp = |x: f64| (self.min_lon - x).max(x - self.max_lon).max(0.0);
            let lon = query.longitude();
            clamp(lon).min(clamp(lon + 360.0)).min(clamp(lon - 360.0))
        };
        if dlat == 0.0 && dlon == 0.0 {
            return 0.0;
        }

        let cos_query = query.latitude().to_radians().cos();
        let lat_far = self.min_lat.abs().max(self.max_lat.abs());
        let cos_far = lat_far.to_radians().cos().max(0.0);

        let h = (dlat.to_radians() / 2.0).sin().powi(2)
            + cos_query * cos_far * (dlon.to_radians() / 2.0).sin().powi(2);
        let h = h.clamp(0.0, 1.0);

        geodetic.radius_km() * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
    }
}

/// A tree node: a leaf over entry slots, or a branch over child nodes.
///
/// Nodes store slot indices into the index's entry vector rather than the
/// entries themselves, so payloads live in exactly one place.
#[derive(Debug)]
enum Node {
    Leaf { rect: Rect, slots: Vec<u32> },
    Branch { rect: Rect, children: Vec<Node> },
}

impl Node {
    fn rect(&self) -> &Rect {
        match self {
            Node::Leaf { rect, .. } => rect,
            Node::Branch { rect, .. } => rect,
        }
    }
}

#[derive(Debug)]
struct Entry<T> {
    point: Point,
    payload: T,
}

/// One query hit: where it is, what it carries, and how far away it is.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a, T> {
    /// Location of the matched entry.
    pub point: Point,
    /// Borrowed payload of the matched entry.
    pub payload: &'a T,
    /// Exact great-circle distance from the query point, in kilometers.
    pub distance_km: f64,
}

/// An immutable-after-construction spatial index over `(Point, T)` entries.
///
/// Built once via [`RTree::bulk_load`]; afterwards only read. `RTree<T>` is
/// `Send + Sync` whenever `T` is, so queries may run concurrently.
///
/// # Examples
///
/// ```
/// use nearport::{Point, RTree};
///
/// let index = RTree::bulk_load(vec![
///     (Point::new(47.5300, -122.3020)?, "BFI"),
///     (Point::new(47.4490, -122.3093)?, "SEA"),
///     (Point::new(13.1979, 77.7063)?, "BLR"),
/// ]);
///
/// let query = Point::new(47.6071, -122.3381)?;
/// let hits = index.nearest(&query, 10.0, 1);
/// assert_eq!(hits[0].payload, &"BFI");
/// # Ok::<(), nearport::NearportError>(())
/// ```
#[derive(Debug)]
pub struct RTree<T> {
    geodetic: Geodetic,
    entries: Vec<Entry<T>>,
    root: Option<Node>,
}

impl<T> RTree<T> {
    /// Bulk-load an index over [`Geodetic::EARTH`].
    ///
    /// See [`RTree::bulk_load_on`] for the entry-count capacity bound.
    pub fn bulk_load<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Point, T)>,
    {
        Self::bulk_load_on(Geodetic::EARTH, entries)
    }

    /// Bulk-load an index measuring distances on the given sphere.
    ///
    /// # Panics
    ///
    /// Panics when given more than `u32::MAX` entries; leaf slots are 32-bit
    /// indices.
    pub fn bulk_load_on<I>(geodetic: Geodetic, entries: I) -> Self
    where
        I: IntoIterator<Item = (Point, T)>,
    {
        let entries: Vec<Entry<T>> = entries
            .into_iter()
            .map(|(point, payload)| Entry { point, payload })
            .collect();
        assert!(
            entries.len() <= u32::MAX as usize,
            "index capacity is {} entries",
            u32::MAX
        );
        let root = build_root(&entries);
        log::debug!("bulk-loaded rectangle tree over {} entries", entries.len());
        Self {
            geodetic,
            entries,
            root,
        }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The sphere this index measures distances on.
    pub fn geodetic(&self) -> &Geodetic {
        &self.geodetic
    }

    /// Iterate over every indexed entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&Point, &T)> {
        self.entries.iter().map(|e| (&e.point, &e.payload))
    }

    /// The `k` entries nearest to `query` within `max_distance_km`, ascending
    /// by great-circle distance.
    ///
    /// Best-first search: a min-heap holds subtrees keyed by the admissible
    /// lower bound to their rectangle and individual entries keyed by their
    /// exact distance. An entry popped from the heap is at most as far as
    /// every remaining lower bound, so it is confirmed as the next nearest;
    /// the search stops after `k` confirmations or when the frontier only
    /// holds candidates beyond `max_distance_km`.
    ///
    /// `k == 0`, a non-positive `max_distance_km`, or an empty index yield an
    /// empty result. Pass `f64::INFINITY` for an unbounded radius. The
    /// relative order of entries at exactly equal distances is unspecified.
    pub fn nearest(&self, query: &Point, max_distance_km: f64, k: usize) -> Vec<Neighbor<'_, T>> {
        let mut found = Vec::new();
        if k == 0 || max_distance_km <= 0.0 {
            return found;
        }
        let Some(root) = self.root.as_ref() else {
            return found;
        };

        let mut frontier = BinaryHeap::new();
        frontier.push(Reverse(Candidate {
            distance_km: root.rect().min_distance_km(&self.geodetic, query),
            kind: CandidateKind::Node(root),
        }));

        while let Some(Reverse(candidate)) = frontier.pop() {
            // Heap pops in ascending order: once the best candidate is out of
            // range, everything left is too.
            if candidate.distance_km > max_distance_km {
                break;
            }
            match candidate.kind {
                CandidateKind::Node(Node::Leaf { slots, .. }) => {
                    for &slot in slots {
                        let entry = &self.entries[slot as usize];
                        let exact = self.geodetic.distance(query, &entry.point);
                        if exact <= max_distance_km {
                            frontier.push(Reverse(Candidate {
                                distance_km: exact,
                                kind: CandidateKind::Entry(slot),
                            }));
                        }
                    }
                }
                CandidateKind::Node(Node::Branch { children, .. }) => {
                    for child in children {
                        let bound = child.rect().min_distance_km(&self.geodetic, query);
                        if bound <= max_distance_km {
                            frontier.push(Reverse(Candidate {
                                distance_km: bound,
                                kind: CandidateKind::Node(child),
                            }));
                        }
                    }
                }
                CandidateKind::Entry(slot) => {
                    let entry = &self.entries[slot as usize];
                    found.push(Neighbor {
                        point: entry.point,
                        payload: &entry.payload,
                        distance_km: candidate.distance_km,
                    });
                    if found.len() == k {
                        break;
                    }
                }
            }
        }
        found
    }
}

/// A frontier element: a subtree keyed by its lower bound, or an entry keyed
/// by its exact distance.
struct Candidate<'a> {
    distance_km: f64,
    kind: CandidateKind<'a>,
}

enum CandidateKind<'a> {
    Node(&'a Node),
    Entry(u32),
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.distance_km.total_cmp(&other.distance_km) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_km.total_cmp(&other.distance_km)
    }
}

/// Pack the entry collection into a balanced tree, bottom-up.
fn build_root<T>(entries: &[Entry<T>]) -> Option<Node> {
    if entries.is_empty() {
        return None;
    }

    let mut order: Vec<u32> = (0..entries.len() as u32).collect();
    order.sort_by(|&a, &b| {
        entries[a as usize]
            .point
            .longitude()
            .total_cmp(&entries[b as usize].point.longitude())
    });

    // STR packing: about sqrt(leaf count) vertical slices, each sorted by
    // latitude and chunked into leaves.
    let leaf_count = entries.len().div_ceil(NODE_CAPACITY);
    let slice_count = (leaf_count as f64).sqrt().ceil() as usize;

    let mut leaves = Vec::with_capacity(leaf_count);
    for (slice_start, slice_end) in group_bounds(order.len(), slice_count) {
        let slice = &mut order[slice_start..slice_end];
        slice.sort_by(|&a, &b| {
            entries[a as usize]
                .point
                .latitude()
                .total_cmp(&entries[b as usize].point.latitude())
        });
        for (start, end) in group_bounds(slice.len(), slice.len().div_ceil(NODE_CAPACITY)) {
            let slots = &slice[start..end];
            let mut rect = Rect::EMPTY;
            for &slot in slots {
                rect.expand_point(&entries[slot as usize].point);
            }
            leaves.push(Node::Leaf {
                rect,
                slots: slots.to_vec(),
            });
        }
    }

    // Group each level evenly until a single root remains. Even splitting
    // keeps every non-root node at least half full, and level-by-level
    // grouping keeps all leaves at equal depth.
    let mut level = leaves;
    while level.len() > 1 {
        let groups = level.len().div_ceil(NODE_CAPACITY);
        let bounds = group_bounds(level.len(), groups);
        let mut nodes = level.into_iter();
        let mut next = Vec::with_capacity(groups);
        for (start, end) in bounds {
            let children: Vec<Node> = nodes.by_ref().take(end - start).collect();
            let mut rect = Rect::EMPTY;
            for child in &children {
                rect.expand_rect(child.rect());
            }
            next.push(Node::Branch { rect, children });
        }
        level = next;
    }
    level.pop()
}

/// Boundaries that split `len` items into `groups` contiguous chunks whose
/// sizes differ by at most one.
fn group_bounds(len: usize, groups: usize) -> Vec<(usize, usize)> {
    let groups = groups.max(1);
    (0..groups)
        .map(|g| (g * len / groups, (g + 1) * len / groups))
        .filter(|(start, end)| end > start)
        .collect()
}
