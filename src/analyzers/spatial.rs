//! Nearest-neighbor spatial join between stations and housing observations.
//!
//! Distances are planar Euclidean in (lat, lon) degree space. That is an
//! approximation, not a bug: the datasets span one region, and downstream
//! normalization and tests assume the simpler metric. Do not "fix" this to
//! geodesic distance.
//!
//! Exact ties resolve to the lowest housing-table index, which makes the
//! join deterministic under permutation of equal-distance candidates.

use anyhow::{Result, bail};
use std::cmp::Ordering;

use crate::analyzers::types::{JoinedRecord, TrendRecord};
use crate::housing::HousingObservation;

/// Result of a nearest-neighbor query: the index of the matched point in
/// the original table, and the Euclidean distance to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

struct KdNode {
    point: [f64; 2],
    index: usize,
    axis: usize,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

/// A static 2-D k-d tree over (lat, lon) points, answering exact
/// nearest-neighbor queries in O(log n) on average.
pub struct KdTree {
    root: Option<Box<KdNode>>,
    len: usize,
}

impl KdTree {
    /// Builds a balanced tree by recursive median split. Point order is
    /// irrelevant to query results; original indices are preserved for
    /// tie-breaking and result reporting.
    pub fn build(points: &[[f64; 2]]) -> Self {
        let mut indexed: Vec<(usize, [f64; 2])> = points.iter().copied().enumerate().collect();
        let root = build_node(&mut indexed, 0);
        Self {
            root,
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the nearest point to `query`, or `None` for an empty tree.
    /// Among points at exactly equal distance, the lowest index wins.
    pub fn nearest(&self, query: [f64; 2]) -> Option<Neighbor> {
        let mut best: Option<(f64, usize)> = None;
        if let Some(root) = &self.root {
            search(root, query, &mut best);
        }
        best.map(|(dist_sq, index)| Neighbor {
            index,
            distance: dist_sq.sqrt(),
        })
    }
}

fn build_node(items: &mut [(usize, [f64; 2])], axis: usize) -> Option<Box<KdNode>> {
    if items.is_empty() {
        return None;
    }

    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| {
        a.1[axis].partial_cmp(&b.1[axis]).unwrap_or(Ordering::Equal)
    });

    let (index, point) = items[mid];
    let (left, rest) = items.split_at_mut(mid);
    let right = &mut rest[1..];

    Some(Box::new(KdNode {
        point,
        index,
        axis,
        left: build_node(left, 1 - axis),
        right: build_node(right, 1 - axis),
    }))
}

fn dist_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn search(node: &KdNode, query: [f64; 2], best: &mut Option<(f64, usize)>) {
    let d = dist_sq(node.point, query);
    let improves = match best {
        None => true,
        Some((best_d, best_i)) => d < *best_d || (d == *best_d && node.index < *best_i),
    };
    if improves {
        *best = Some((d, node.index));
    }

    let diff = query[node.axis] - node.point[node.axis];
    let (near, far) = if diff < 0.0 {
        (&node.left, &node.right)
    } else {
        (&node.right, &node.left)
    };

    if let Some(child) = near {
        search(child, query, best);
    }

    // The far half-space can still hold a point at distance == the current
    // best (an exact tie with a lower index), so the prune is non-strict.
    if let Some(child) = far {
        if let Some((best_d, _)) = best {
            if diff * diff <= *best_d {
                search(child, query, best);
            }
        }
    }
}

/// Attaches the nearest housing observation to every trend record.
///
/// # Errors
/// Fails loudly when the housing table is empty: every station is expected
/// to have a real nearest neighbor, and a sentinel match would poison the
/// risk scores silently.
pub fn attach_nearest_housing(
    trend_records: Vec<TrendRecord>,
    housing: &[HousingObservation],
) -> Result<Vec<JoinedRecord>> {
    if housing.is_empty() {
        bail!("Cannot join stations to housing data: the housing table is empty");
    }

    let coords: Vec<[f64; 2]> = housing.iter().map(|h| [h.latitude, h.longitude]).collect();
    let tree = KdTree::build(&coords);

    let joined = trend_records
        .into_iter()
        .map(|trend| {
            // The tree is non-empty here, so a neighbor always exists.
            let neighbor = tree
                .nearest([trend.lat, trend.lon])
                .expect("nearest-neighbor query on non-empty tree");
            JoinedRecord {
                trend,
                median_house_value: housing[neighbor.index].median_house_value,
                nearest_housing_distance_deg: neighbor.distance,
            }
        })
        .collect();

    Ok(joined)
}
