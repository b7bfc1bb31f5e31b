//! Topology query methods for EditMesh.

use glam::Vec3;
use std::collections::HashSet;

use super::types::{Edge, EdgeId, Face, FaceId, Loop, LoopId, Vert, VertId};
use super::EditMesh;

impl EditMesh {
    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get vertex by handle
    pub fn vert(&self, id: VertId) -> Option<&Vert> {
        self.verts.get(id)
    }

    /// Get mutable vertex by handle
    pub fn vert_mut(&mut self, id: VertId) -> Option<&mut Vert> {
        self.verts.get_mut(id)
    }

    /// Get edge by handle
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Get mutable edge by handle
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    /// Get loop by handle
    pub fn get_loop(&self, id: LoopId) -> Option<&Loop> {
        self.loops.get(id)
    }

    /// Get mutable loop by handle
    pub fn get_loop_mut(&mut self, id: LoopId) -> Option<&mut Loop> {
        self.loops.get_mut(id)
    }

    /// Get face by handle
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id)
    }

    /// Get mutable face by handle
    pub fn face_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.faces.get_mut(id)
    }

    /// Iterate vertices in arena order
    pub fn verts(&self) -> impl Iterator<Item = (VertId, &Vert)> {
        self.verts.iter()
    }

    /// Iterate edges in arena order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// Iterate faces in arena order
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    /// Snapshot of vertex handles, for loops that mutate the mesh
    pub fn vert_ids(&self) -> Vec<VertId> {
        self.verts.keys().collect()
    }

    /// Snapshot of edge handles, for loops that mutate the mesh
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().collect()
    }

    /// Snapshot of face handles
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces.keys().collect()
    }

    pub fn vert_count(&self) -> usize {
        self.verts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    // ========================================================================
    // Edge Queries
    // ========================================================================

    /// Edge with no faces
    pub fn edge_is_wire(&self, e: EdgeId) -> bool {
        self.edge(e).is_some_and(|edge| edge.loops.is_empty())
    }

    /// Edge with exactly one face
    pub fn edge_is_boundary(&self, e: EdgeId) -> bool {
        self.edge(e).is_some_and(|edge| edge.loops.len() == 1)
    }

    /// Edge with exactly two faces
    pub fn edge_is_manifold(&self, e: EdgeId) -> bool {
        self.edge(e)
            .is_some_and(|edge| edge.loops.len() == 2 && edge.loops[0] != edge.loops[1])
    }

    /// Find the edge connecting two vertices
    pub fn edge_exists(&self, a: VertId, b: VertId) -> Option<EdgeId> {
        let vert = self.vert(a)?;
        vert.edges
            .iter()
            .copied()
            .find(|&e| self.edge(e).is_some_and(|edge| edge.has_vert(b) && edge.has_vert(a)))
    }

    /// The endpoint of `e` that is not `v`
    pub fn edge_other_vert(&self, e: EdgeId, v: VertId) -> Option<VertId> {
        self.edge(e)?.other_vert(v)
    }

    /// Vertex shared by two edges
    pub fn edge_share_vert(&self, a: EdgeId, b: EdgeId) -> Option<VertId> {
        let ea = self.edge(a)?;
        let eb = self.edge(b)?;
        if eb.has_vert(ea.v1) {
            Some(ea.v1)
        } else if eb.has_vert(ea.v2) {
            Some(ea.v2)
        } else {
            None
        }
    }

    /// Both loops of a manifold edge
    pub fn edge_loop_pair(&self, e: EdgeId) -> Option<(LoopId, LoopId)> {
        let edge = self.edge(e)?;
        match edge.loops.as_slice() {
            [a, b] if a != b => Some((*a, *b)),
            _ => None,
        }
    }

    /// Euclidean edge length
    pub fn edge_length(&self, e: EdgeId) -> f32 {
        self.edge(e)
            .and_then(|edge| Some(self.vert(edge.v1)?.co.distance(self.vert(edge.v2)?.co)))
            .unwrap_or(0.0)
    }

    /// Whether `e` is one of the two edges of the corner `l`
    pub fn edge_in_loop(&self, e: EdgeId, l: LoopId) -> bool {
        let Some(lp) = self.get_loop(l) else {
            return false;
        };
        lp.e == e || self.get_loop(lp.prev).is_some_and(|prev| prev.e == e)
    }

    // ========================================================================
    // Loop Queries
    // ========================================================================

    /// Next loop around the edge of `l` (wraps, returns `l` for boundary edges)
    pub fn radial_next(&self, l: LoopId) -> Option<LoopId> {
        let lp = self.get_loop(l)?;
        let edge = self.edge(lp.e)?;
        let index = edge.loops.iter().position(|&x| x == l)?;
        Some(edge.loops[(index + 1) % edge.loops.len()])
    }

    /// Corner at `v` of the face of `l`, where `l` lies on an edge using `v`
    pub fn edge_vert_share_loop(&self, l: LoopId, v: VertId) -> Option<LoopId> {
        let lp = self.get_loop(l)?;
        if lp.v == v {
            Some(l)
        } else {
            let next = self.get_loop(lp.next)?;
            (next.v == v).then_some(lp.next)
        }
    }

    /// Loop of the other edge of the face that also uses `v`
    pub fn loop_other_edge_loop(&self, l: LoopId, v: VertId) -> Option<LoopId> {
        let lp = self.get_loop(l)?;
        Some(if lp.v == v { lp.prev } else { lp.next })
    }

    /// Corner on the other side of `e` sharing the vertex of `l`.
    ///
    /// `l` must use `e` as one of its corner edges.
    pub fn edge_other_loop(&self, e: EdgeId, l: LoopId) -> Option<LoopId> {
        let lp = self.get_loop(l)?;
        let on_edge = if lp.e == e { l } else { lp.prev };
        if self.get_loop(on_edge)?.e != e {
            return None;
        }
        let other = self.radial_next(on_edge)?;
        if other == on_edge {
            return None;
        }
        let other_lp = self.get_loop(other)?;
        if other_lp.v == lp.v {
            Some(other)
        } else if self.get_loop(other_lp.next)?.v == lp.v {
            Some(other_lp.next)
        } else {
            None
        }
    }

    // ========================================================================
    // Face Queries
    // ========================================================================

    /// Corners of a face in winding order
    pub fn face_loops(&self, f: FaceId) -> Vec<LoopId> {
        let mut loops = Vec::new();
        let Some(face) = self.face(f) else {
            return loops;
        };

        let mut current = face.first;
        for _ in 0..face.len {
            let Some(lp) = self.get_loop(current) else {
                break;
            };
            loops.push(current);
            current = lp.next;
        }
        loops
    }

    /// Vertices of a face in winding order
    pub fn face_verts(&self, f: FaceId) -> Vec<VertId> {
        self.face_loops(f)
            .into_iter()
            .filter_map(|l| self.get_loop(l).map(|lp| lp.v))
            .collect()
    }

    /// Corner of `f` at `v`
    pub fn face_vert_share_loop(&self, f: FaceId, v: VertId) -> Option<LoopId> {
        self.face_loops(f)
            .into_iter()
            .find(|&l| self.get_loop(l).is_some_and(|lp| lp.v == v))
    }

    /// Neighbour of `v` in face `f` that is not `v_prev`
    pub fn face_other_vert_loop(&self, f: FaceId, v_prev: VertId, v: VertId) -> Option<LoopId> {
        let l = self.face_vert_share_loop(f, v)?;
        let lp = self.get_loop(l)?;
        if self.get_loop(lp.prev)?.v == v_prev {
            Some(lp.next)
        } else if self.get_loop(lp.next)?.v == v_prev {
            Some(lp.prev)
        } else {
            None
        }
    }

    /// Find a face using exactly these vertices
    pub fn face_exists(&self, verts: &[VertId]) -> Option<FaceId> {
        let first = *verts.first()?;
        self.vert_faces(first).into_iter().find(|&f| {
            let face_verts = self.face_verts(f);
            face_verts.len() == verts.len() && verts.iter().all(|v| face_verts.contains(v))
        })
    }

    /// Face normal using Newell's method (handles non-planar n-gons)
    pub fn face_normal(&self, f: FaceId) -> Vec3 {
        let cos: Vec<Vec3> = self
            .face_verts(f)
            .into_iter()
            .filter_map(|v| self.vert(v).map(|vert| vert.co))
            .collect();
        let mut normal = Vec3::ZERO;
        for (i, a) in cos.iter().enumerate() {
            let b = cos[(i + 1) % cos.len()];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal.normalize_or_zero()
    }

    /// Face centroid
    pub fn face_center(&self, f: FaceId) -> Vec3 {
        let cos: Vec<Vec3> = self
            .face_verts(f)
            .into_iter()
            .filter_map(|v| self.vert(v).map(|vert| vert.co))
            .collect();
        if cos.is_empty() {
            return Vec3::ZERO;
        }
        cos.iter().sum::<Vec3>() / cos.len() as f32
    }

    /// Unit vector in the face plane bisecting the corner, pointing inward
    pub fn loop_face_tangent(&self, l: LoopId) -> Vec3 {
        let Some(lp) = self.get_loop(l) else {
            return Vec3::ZERO;
        };
        let co = |loop_id: LoopId| -> Vec3 {
            self.get_loop(loop_id)
                .and_then(|x| self.vert(x.v))
                .map(|vert| vert.co)
                .unwrap_or(Vec3::ZERO)
        };
        let v_co = co(l);
        let v_prev = (co(lp.prev) - v_co).normalize_or_zero();
        let v_next = (v_co - co(lp.next)).normalize_or_zero();
        let dir = v_prev + v_next;
        let face_normal = self.face_normal(lp.f);

        let tangent = if v_prev.abs_diff_eq(v_next, f32::EPSILON * 10.0) {
            dir.cross(face_normal)
        } else {
            let mut nor = v_prev.cross(v_next);
            // concave corner
            if nor.dot(face_normal) < 0.0 {
                nor = -nor;
            }
            dir.cross(nor)
        };
        tangent.normalize_or_zero()
    }

    // ========================================================================
    // Vertex Queries
    // ========================================================================

    /// Edges of the vertex disk
    pub fn vert_edges(&self, v: VertId) -> Vec<EdgeId> {
        self.vert(v).map(|vert| vert.edges.to_vec()).unwrap_or_default()
    }

    /// Face corners at the vertex, one per face use
    pub fn vert_loops(&self, v: VertId) -> Vec<LoopId> {
        let mut loops = Vec::new();
        for e in self.vert_edges(v) {
            let Some(edge) = self.edge(e) else {
                continue;
            };
            for &l in &edge.loops {
                if let Some(corner) = self.edge_vert_share_loop(l, v) {
                    if !loops.contains(&corner) {
                        loops.push(corner);
                    }
                }
            }
        }
        loops
    }

    /// Faces using the vertex
    pub fn vert_faces(&self, v: VertId) -> Vec<FaceId> {
        let mut faces = Vec::new();
        for l in self.vert_loops(v) {
            if let Some(lp) = self.get_loop(l) {
                if !faces.contains(&lp.f) {
                    faces.push(lp.f);
                }
            }
        }
        faces
    }

    /// Number of face corners at the vertex
    pub fn vert_face_count(&self, v: VertId) -> usize {
        self.vert_loops(v).len()
    }

    pub fn vert_edge_count(&self, v: VertId) -> usize {
        self.vert(v).map_or(0, |vert| vert.edges.len())
    }

    /// Vertex whose edges are all wire
    pub fn vert_is_wire(&self, v: VertId) -> bool {
        let Some(vert) = self.vert(v) else {
            return false;
        };
        !vert.edges.is_empty() && vert.edges.iter().all(|&e| self.edge_is_wire(e))
    }

    /// Whether every face corner at `v` is reachable from every other by
    /// crossing edges incident to `v` (a single fan).
    pub fn vert_is_manifold_region(&self, v: VertId) -> bool {
        let corners = self.vert_loops(v);
        let Some(&first) = corners.first() else {
            return true;
        };
        self.vert_loop_region(v, first).len() == corners.len()
    }

    /// Corners at `v` connected to `start` through edges incident to `v`
    pub fn vert_loop_region(&self, v: VertId, start: LoopId) -> Vec<LoopId> {
        let mut region = vec![start];
        let mut visited: HashSet<LoopId> = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(corner) = stack.pop() {
            let Some(lp) = self.get_loop(corner) else {
                continue;
            };
            let prev_edge = self.get_loop(lp.prev).map(|prev| prev.e);
            for e in std::iter::once(lp.e).chain(prev_edge) {
                let Some(edge) = self.edge(e) else {
                    continue;
                };
                for &l in &edge.loops {
                    if let Some(other) = self.edge_vert_share_loop(l, v) {
                        if visited.insert(other) {
                            region.push(other);
                            stack.push(other);
                        }
                    }
                }
            }
        }
        region
    }

    /// Edges around `v` in fan order starting at `e_first`.
    ///
    /// Returns `None` when the fan crosses a non-manifold edge or does not
    /// close back on `e_first`.
    pub fn vert_fan_edges(&self, v: VertId, e_first: EdgeId) -> Option<Vec<EdgeId>> {
        let mut edges = vec![e_first];
        let mut e_cur = e_first;
        let mut l_cur = self.edge(e_first)?.first_loop()?;
        let limit = self.vert_edge_count(v) + 1;

        loop {
            let corner = self.edge_vert_share_loop(l_cur, v)?;
            let corner_lp = self.get_loop(corner)?;
            let (e_next, l_on_next) = if corner_lp.e == e_cur {
                (self.get_loop(corner_lp.prev)?.e, corner_lp.prev)
            } else {
                (corner_lp.e, corner)
            };

            if e_next == e_first {
                return Some(edges);
            }
            if !self.edge_is_manifold(e_next) || edges.len() > limit {
                return None;
            }

            edges.push(e_next);
            e_cur = e_next;
            l_cur = self.radial_next(l_on_next)?;
        }
    }

    /// The edge across the fan from `e_first` (half way around `v`)
    pub fn vert_other_disk_edge(&self, v: VertId, e_first: EdgeId) -> Option<EdgeId> {
        let fan = self.vert_fan_edges(v, e_first)?;
        fan.get(fan.len() / 2).copied()
    }
}
