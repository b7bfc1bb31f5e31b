//! Vertex separation: splitting one vertex into several so that groups of
//! face corners stop sharing it.
//!
//! All entry points reduce to [`EditMesh::separate_vert_regions`]: each face
//! corner (and each wire edge) at the vertex is assigned a region number,
//! the lowest region keeps the original vertex and every other region gets a
//! copy. Edges whose corners end up in different regions are duplicated.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::trace;

use super::types::{EditMeshError, ElemFlags, EdgeId, LoopId, VertId};
use super::EditMesh;

/// Region assignment for the corners and wire edges around one vertex
#[derive(Debug, Default)]
struct VertRegions {
    corners: HashMap<LoopId, usize>,
    wire_edges: HashMap<EdgeId, usize>,
}

impl VertRegions {
    fn used(&self) -> BTreeSet<usize> {
        self.corners
            .values()
            .chain(self.wire_edges.values())
            .copied()
            .collect()
    }
}

/// Minimal union-find over dense indices
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

impl EditMesh {
    /// Split `v` into one vertex per connected fan.
    ///
    /// Corners are connected when they share an edge at `v`; every wire edge
    /// becomes its own piece. The first piece keeps `v`. Returns every
    /// resulting vertex, `v` first.
    pub fn vert_separate(&mut self, v: VertId) -> Result<Vec<VertId>, EditMeshError> {
        let edges = self
            .vert(v)
            .ok_or(EditMeshError::InvalidVert(v))?
            .edges
            .to_vec();
        let index_of: HashMap<EdgeId, usize> =
            edges.iter().enumerate().map(|(i, &e)| (e, i)).collect();

        let corners = self.vert_loops(v);
        let mut sets = DisjointSet::new(edges.len());
        for &c in &corners {
            let lp = &self.loops[c];
            let prev_e = self.loops[lp.prev].e;
            if let (Some(&a), Some(&b)) = (index_of.get(&lp.e), index_of.get(&prev_e)) {
                sets.union(a, b);
            }
        }

        // Number components in disk order
        let mut component_region: HashMap<usize, usize> = HashMap::new();
        let mut edge_region = Vec::with_capacity(edges.len());
        for i in 0..edges.len() {
            let root = sets.find(i);
            let next = component_region.len();
            edge_region.push(*component_region.entry(root).or_insert(next));
        }

        let mut regions = VertRegions::default();
        for (i, &e) in edges.iter().enumerate() {
            if self.edge_is_wire(e) {
                regions.wire_edges.insert(e, edge_region[i]);
            }
        }
        for &c in &corners {
            if let Some(&i) = index_of.get(&self.loops[c].e) {
                regions.corners.insert(c, edge_region[i]);
            }
        }

        self.separate_vert_regions(v, &regions)
    }

    /// Give the corners in `larr` (all at one vertex) a vertex of their own.
    ///
    /// Returns the vertex now used by `larr`. When every face corner and edge
    /// at the vertex is covered by `larr` nothing changes and the original
    /// vertex is returned.
    pub fn face_loop_separate_multi(&mut self, larr: &[LoopId]) -> Result<VertId, EditMeshError> {
        let first = *larr
            .first()
            .ok_or_else(|| EditMeshError::InvalidTopology("empty loop list".to_string()))?;
        let v = self.get_loop(first).ok_or(EditMeshError::InvalidLoop(first))?.v;
        let mut selected: HashSet<LoopId> = HashSet::with_capacity(larr.len());
        for &l in larr {
            let lp = self.get_loop(l).ok_or(EditMeshError::InvalidLoop(l))?;
            if lp.v != v {
                return Err(EditMeshError::MixedSeparationVerts);
            }
            selected.insert(l);
        }
        self.separate_corner_set(v, &selected)
    }

    /// Give the fan of `l` (the corners reachable from it across edges at its
    /// vertex) a vertex of its own. Returns the vertex now used by the fan.
    pub fn face_loop_separate_isolated(&mut self, l: LoopId) -> Result<VertId, EditMeshError> {
        let v = self.get_loop(l).ok_or(EditMeshError::InvalidLoop(l))?.v;
        let fan: HashSet<LoopId> = self.vert_loop_region(v, l).into_iter().collect();
        self.separate_corner_set(v, &fan)
    }

    /// Split tagged edges into separate boundaries.
    ///
    /// Only tagged vertices are separated, with tagged edges acting as walls
    /// between fans. A tagged edge with no tagged vertex gets both vertices
    /// tagged first. Tags are cleared from separated vertices. Returns the
    /// number of vertices created.
    pub fn split_tagged_edges(&mut self) -> Result<usize, EditMeshError> {
        let tagged: Vec<EdgeId> = self
            .edges()
            .filter(|(_, edge)| edge.flags.contains(ElemFlags::TAG))
            .map(|(e, _)| e)
            .collect();

        for &e in &tagged {
            let edge = &self.edges[e];
            let (v1, v2) = (edge.v1, edge.v2);
            if !self.verts[v1].flags.contains(ElemFlags::TAG)
                && !self.verts[v2].flags.contains(ElemFlags::TAG)
            {
                self.verts[v1].flags.insert(ElemFlags::TAG);
                self.verts[v2].flags.insert(ElemFlags::TAG);
            }
        }

        let before = self.vert_count();
        for e in tagged {
            for side in 0..2 {
                let Some(edge) = self.edge(e) else {
                    break;
                };
                let v = if side == 0 { edge.v1 } else { edge.v2 };
                if !self.verts[v].flags.contains(ElemFlags::TAG) {
                    continue;
                }
                self.verts[v].flags.remove(ElemFlags::TAG);
                self.separate_vert_at_walls(v)?;
            }
        }

        let created = self.vert_count() - before;
        trace!("split_tagged_edges: {} vertices created", created);
        Ok(created)
    }

    /// Split `v` into fans bounded by tagged edges
    fn separate_vert_at_walls(&mut self, v: VertId) -> Result<Vec<VertId>, EditMeshError> {
        let corners = self.vert_loops(v);
        let index_of: HashMap<LoopId, usize> =
            corners.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let mut sets = DisjointSet::new(corners.len());

        for e in self.vert_edges(v) {
            let edge = &self.edges[e];
            if edge.flags.contains(ElemFlags::TAG) {
                continue;
            }
            let at_v: Vec<usize> = edge
                .loops
                .iter()
                .filter_map(|&l| self.edge_vert_share_loop(l, v))
                .filter_map(|c| index_of.get(&c).copied())
                .collect();
            for pair in at_v.windows(2) {
                sets.union(pair[0], pair[1]);
            }
        }

        let mut regions = VertRegions::default();
        let mut root_region: HashMap<usize, usize> = HashMap::new();
        for (i, &c) in corners.iter().enumerate() {
            let root = sets.find(i);
            let next = root_region.len();
            regions
                .corners
                .insert(c, *root_region.entry(root).or_insert(next));
        }
        for e in self.vert_edges(v) {
            if self.edge_is_wire(e) {
                regions.wire_edges.insert(e, 0);
            }
        }

        self.separate_vert_regions(v, &regions)
    }

    /// Corners in `set` go to region 1, everything else stays on `v`
    fn separate_corner_set(
        &mut self,
        v: VertId,
        set: &HashSet<LoopId>,
    ) -> Result<VertId, EditMeshError> {
        let mut regions = VertRegions::default();
        for c in self.vert_loops(v) {
            regions.corners.insert(c, usize::from(set.contains(&c)));
        }
        for e in self.vert_edges(v) {
            if self.edge_is_wire(e) {
                regions.wire_edges.insert(e, 0);
            }
        }

        let used = regions.used();
        let verts = self.separate_vert_regions(v, &regions)?;
        // The separated set maps to the last region in use
        Ok(if used.contains(&1) {
            verts.last().copied().unwrap_or(v)
        } else {
            v
        })
    }

    /// Core splitter. Returns one vertex per region in use, lowest first.
    fn separate_vert_regions(
        &mut self,
        v: VertId,
        regions: &VertRegions,
    ) -> Result<Vec<VertId>, EditMeshError> {
        let used = regions.used();
        if used.len() <= 1 {
            return Ok(vec![v]);
        }

        // ===== PHASE 1: ALLOCATE =====
        let mut targets: BTreeMap<usize, VertId> = BTreeMap::new();
        for (i, &region) in used.iter().enumerate() {
            let target = if i == 0 { v } else { self.create_vert_from(v)? };
            targets.insert(region, target);
        }

        // ===== PHASE 2: EDGES =====
        for e in self.vert_edges(v) {
            let (v1, v2, flags, loops) = {
                let edge = &self.edges[e];
                (edge.v1, edge.v2, edge.flags, edge.loops.to_vec())
            };

            let mut by_region: BTreeMap<usize, Vec<LoopId>> = BTreeMap::new();
            if loops.is_empty() {
                let region = regions.wire_edges.get(&e).copied().unwrap_or(0);
                by_region.insert(region, Vec::new());
            }
            for l in loops {
                let Some(corner) = self.edge_vert_share_loop(l, v) else {
                    continue;
                };
                let region = regions.corners.get(&corner).copied().unwrap_or(0);
                by_region.entry(region).or_default().push(l);
            }

            let mut groups = by_region.into_iter();
            let Some((keep_region, _)) = groups.next() else {
                continue;
            };
            let keep_target = targets.get(&keep_region).copied().unwrap_or(v);
            if keep_target != v {
                self.edge_replace_vert(e, v, keep_target);
            }

            for (region, group) in groups {
                let target = targets.get(&region).copied().unwrap_or(v);
                let (a, b) = if v1 == v { (target, v2) } else { (v1, target) };
                let e_new = self.insert_edge(a, b, flags);
                for l in group {
                    self.loop_move_to_edge(l, e_new);
                }
            }
        }

        // ===== PHASE 3: CORNERS =====
        for (&corner, region) in &regions.corners {
            if let Some(&target) = targets.get(region) {
                if target != v {
                    self.loops[corner].v = target;
                }
            }
        }

        trace!(
            "separate_vert_regions: {:?} split into {} vertices",
            v,
            targets.len()
        );
        Ok(targets.into_values().collect())
    }
}
