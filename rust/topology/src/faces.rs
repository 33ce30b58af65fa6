// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enclosed-room detection by half-edge face traversal.
//!
//! Each undirected wall edge is walked in both directions. From a directed
//! edge `u → v` the walk continues along the neighbour of `v` with the
//! largest turn (see [`WallGraph::next_half_edge`]) until it reaches a
//! directed edge it has already used. In Y-down coordinates interior faces
//! come out with positive signed area; the unbounded outer face and
//! degenerate slivers do not, and are dropped.

use dcim_floorplan_geometry::{point_in_indexed_polygon, signed_area_indexed, Point2D};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::wall_graph::WallGraph;

/// One enclosed face: an ordered ring of indices into [`RoomFaces::vertices`].
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub ring: Vec<usize>,
    /// Signed shoelace area, always positive for accepted faces
    pub area: f64,
}

/// All enclosed faces of a wall graph, sharing one vertex array.
#[derive(Debug, Clone, Default)]
pub struct RoomFaces {
    pub vertices: Vec<Point2D>,
    pub faces: Vec<Face>,
}

impl RoomFaces {
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Whether `p` lies inside face `index` (ray casting).
    pub fn contains(&self, index: usize, p: &Point2D) -> bool {
        self.faces
            .get(index)
            .is_some_and(|f| point_in_indexed_polygon(p, &self.vertices, &f.ring))
    }

    /// Index of the first face containing `p`.
    pub fn face_containing(&self, p: &Point2D) -> Option<usize> {
        (0..self.faces.len()).find(|&i| self.contains(i, p))
    }

    /// Points of face `index` in ring order.
    pub fn polygon(&self, index: usize) -> Vec<Point2D> {
        self.faces
            .get(index)
            .map(|f| f.ring.iter().map(|&i| self.vertices[i]).collect())
            .unwrap_or_default()
    }
}

/// Walk every half-edge of `graph` and collect the enclosed faces.
pub fn detect_faces(graph: &WallGraph) -> RoomFaces {
    if graph.vertex_count() < 3 || graph.edge_count() < 3 {
        return RoomFaces {
            vertices: graph.vertices().to_vec(),
            faces: Vec::new(),
        };
    }

    let max_steps = graph.edge_count() * 2 + 4;
    let mut visited: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut faces = Vec::new();

    for &(a, b) in graph.edges() {
        for (u0, v0) in [(a, b), (b, a)] {
            if visited.contains(&(u0, v0)) {
                continue;
            }
            let mut ring = Vec::new();
            let (mut u, mut v) = (u0, v0);
            let mut closed = false;
            for _ in 0..max_steps {
                if !visited.insert((u, v)) {
                    closed = true;
                    break;
                }
                ring.push(v);
                match graph.next_half_edge(u, v) {
                    Some(w) => {
                        u = v;
                        v = w;
                    }
                    None => {
                        closed = true;
                        break;
                    }
                }
            }
            if !closed {
                warn!(
                    start = ?(u0, v0),
                    steps = max_steps,
                    "face traversal hit the step cap, discarding partial face"
                );
                continue;
            }
            if ring.len() < 3 {
                continue;
            }
            let area = signed_area_indexed(graph.vertices(), &ring);
            if area <= 0.0 {
                continue;
            }
            faces.push(Face { ring, area });
        }
    }

    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        faces = faces.len(),
        "detected room faces"
    );

    RoomFaces {
        vertices: graph.vertices().to_vec(),
        faces,
    }
}

/// Build the wall graph for `polylines` and detect its enclosed faces.
pub fn compute_room_faces<'a, I>(polylines: I, eps: f64) -> RoomFaces
where
    I: IntoIterator<Item = &'a [Point2D]>,
{
    detect_faces(&WallGraph::build(polylines, eps))
}
