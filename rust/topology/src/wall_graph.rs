// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar graph built from wall polylines.
//!
//! Every polyline point becomes a graph vertex; points closer than `eps` on
//! both axes collapse into the first vertex registered there. Each polyline
//! segment contributes one undirected edge, deduplicated across walls, so
//! two walls drawn along the same span share a single edge.
//!
//! The graph is rebuilt from scratch on every structural change: vertices
//! are plain indices into a `Vec`, which keeps merge and dedup trivial.

use std::f64::consts::TAU;

use dcim_floorplan_geometry::Point2D;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Default vertex merge tolerance in document units
pub const DEFAULT_MERGE_EPS: f64 = 3.0;

/// Neighbours of one vertex, sorted by polar angle.
pub type Adjacency = SmallVec<[usize; 4]>;

/// Undirected planar graph over merged wall vertices.
#[derive(Debug, Clone, Default)]
pub struct WallGraph {
    vertices: Vec<Point2D>,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Adjacency>,
}

impl WallGraph {
    /// Build the graph from wall polylines.
    ///
    /// Polylines with fewer than two points contribute nothing.
    pub fn build<'a, I>(polylines: I, eps: f64) -> Self
    where
        I: IntoIterator<Item = &'a [Point2D]>,
    {
        let mut graph = WallGraph::default();
        let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();

        for points in polylines {
            if points.len() < 2 {
                continue;
            }
            for pair in points.windows(2) {
                let a = graph.find_or_add(pair[0], eps);
                let b = graph.find_or_add(pair[1], eps);
                if a == b {
                    continue;
                }
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    graph.edges.push((a, b));
                }
            }
        }

        graph.build_adjacency();
        graph
    }

    fn find_or_add(&mut self, p: Point2D, eps: f64) -> usize {
        if let Some(i) = self
            .vertices
            .iter()
            .position(|v| (v.x - p.x).abs() < eps && (v.y - p.y).abs() < eps)
        {
            return i;
        }
        self.vertices.push(p);
        self.vertices.len() - 1
    }

    fn build_adjacency(&mut self) {
        let mut adjacency = vec![Adjacency::new(); self.vertices.len()];
        for &(a, b) in &self.edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for (v, neighbours) in adjacency.iter_mut().enumerate() {
            let origin = self.vertices[v];
            neighbours.sort_by(|&a, &b| {
                let aa = azimuth(&origin, &self.vertices[a]);
                let ba = azimuth(&origin, &self.vertices[b]);
                aa.partial_cmp(&ba).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        self.adjacency = adjacency;
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Neighbours of `v` sorted by polar angle, empty for unknown vertices.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        self.adjacency.get(v).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn into_vertices(self) -> Vec<Point2D> {
        self.vertices
    }

    /// Next vertex of the half-edge walk arriving at `v` from `u`.
    ///
    /// Picks the outgoing edge with the largest turn from the incoming
    /// direction, measured in `(0, 2π]`. In Y-down coordinates this walks
    /// around interior faces with positive shoelace area. Returns `None` at
    /// a dead end (the only neighbour is `u`).
    pub fn next_half_edge(&self, u: usize, v: usize) -> Option<usize> {
        let pv = self.vertices[v];
        let in_angle = azimuth(&pv, &self.vertices[u]);
        let mut best = None;
        let mut best_delta = f64::NEG_INFINITY;
        for &w in self.neighbors(v) {
            if w == u {
                continue;
            }
            let mut delta = azimuth(&pv, &self.vertices[w]) - in_angle;
            if delta <= 0.0 {
                delta += TAU;
            }
            if delta > best_delta {
                best_delta = delta;
                best = Some(w);
            }
        }
        best
    }
}

/// Polar angle of `to` seen from `from`
fn azimuth(from: &Point2D, to: &Point2D) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}
