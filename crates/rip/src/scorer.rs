//! Screen-space scoring of edges and face corners against the cursor.
//!
//! Every decision the rip operator makes about "which side" is taken in
//! region pixels, so the result follows what the user sees rather than the
//! mesh's own coordinates.

use editmesh::{EdgeId, EditMesh, LoopId};
use glam::{Mat4, Vec2, Vec3};

/// Maps object-space positions to region pixels
pub trait ScreenProjector {
    fn project(&self, co: Vec3) -> Vec2;
}

impl<F> ScreenProjector for F
where
    F: Fn(Vec3) -> Vec2,
{
    fn project(&self, co: Vec3) -> Vec2 {
        self(co)
    }
}

/// Perspective (or orthographic) projection into a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    /// Combined projection * view * object matrix
    pub matrix: Mat4,
    /// Region size in pixels
    pub viewport: Vec2,
}

impl ViewProjection {
    pub fn new(matrix: Mat4, viewport: Vec2) -> Self {
        Self { matrix, viewport }
    }
}

impl ScreenProjector for ViewProjection {
    fn project(&self, co: Vec3) -> Vec2 {
        let clip = self.matrix * co.extend(1.0);
        if clip.w <= f32::EPSILON {
            return Vec2::ZERO;
        }
        let half = self.viewport * 0.5;
        half + half * (Vec2::new(clip.x, clip.y) / clip.w)
    }
}

/// Squared distance from `p` to the segment `a`-`b`
pub fn dist_squared_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + ab * t)
}

/// Squared screen distance from `cursor` to the edge `co1`-`co2`.
///
/// A non-zero `inset` (in pixels) pulls both ends toward each other first so
/// edges meeting at a vertex do not score the same.
pub fn edge_dist_squared(
    projector: &dyn ScreenProjector,
    co1: Vec3,
    co2: Vec3,
    cursor: Vec2,
    inset: f32,
) -> f32 {
    let mut v1 = projector.project(co1);
    let mut v2 = projector.project(co2);

    if inset != 0.0 {
        let dist_2d = v1.distance(v2);
        if dist_2d > f32::EPSILON {
            let f = inset / dist_2d;
            v1 = v1.lerp(v2, f);
            v2 = v2.lerp(v1, f);
        }
    }

    dist_squared_to_segment(cursor, v1, v2)
}

/// A point inside the corner `l`: along the corner bisector, at the mean
/// length of the corner's two edges.
pub fn loop_corner_co(mesh: &EditMesh, l: LoopId) -> Vec3 {
    let Some(lp) = mesh.get_loop(l) else {
        return Vec3::ZERO;
    };
    let co = mesh.vert(lp.v).map_or(Vec3::ZERO, |v| v.co);
    let prev_e = mesh.get_loop(lp.prev).map(|prev| prev.e);
    let scale = (mesh.edge_length(lp.e) + prev_e.map_or(0.0, |e| mesh.edge_length(e))) / 2.0;
    co + mesh.loop_face_tangent(l) * scale
}

pub(crate) fn edge_vert_cos(mesh: &EditMesh, e: EdgeId) -> Option<(Vec3, Vec3)> {
    let edge = mesh.edge(e)?;
    Some((mesh.vert(edge.v1)?.co, mesh.vert(edge.v2)?.co))
}

/// Cursor and tuning shared by every measurement of one rip invocation
pub struct RipView<'a> {
    pub projector: &'a dyn ScreenProjector,
    pub cursor: Vec2,
    pub edge_inset: f32,
    pub side_nudge: f32,
}

impl RipView<'_> {
    /// [`edge_dist_squared`] with this view's cursor and inset
    pub fn dist_squared(&self, co1: Vec3, co2: Vec3) -> f32 {
        edge_dist_squared(self.projector, co1, co2, self.cursor, self.edge_inset)
    }

    /// Signed score for the face of `l` next to edge `e`.
    ///
    /// The magnitude is the projected edge length. The sign is positive when
    /// the face lies on the same side of the edge as the cursor: nudging the
    /// cursor toward the face then moves it away from the edge.
    pub fn side_score(&self, mesh: &EditMesh, e: EdgeId, l: LoopId) -> f32 {
        let Some(edge) = mesh.edge(e) else {
            return 0.0;
        };
        let Some(f) = mesh.get_loop(l).map(|lp| lp.f) else {
            return 0.0;
        };
        let other_co = |v_prev, v| {
            mesh.face_other_vert_loop(f, v_prev, v)
                .and_then(|ol| mesh.get_loop(ol))
                .and_then(|ol| mesh.vert(ol.v))
                .map(|vert| vert.co)
        };
        let (Some(v1_other), Some(v2_other)) =
            (other_co(edge.v2, edge.v1), other_co(edge.v1, edge.v2))
        else {
            return 0.0;
        };
        let Some((co1, co2)) = edge_vert_cos(mesh, e) else {
            return 0.0;
        };

        let cent = self.projector.project((v1_other + v2_other) * 0.5);
        let mid = self.projector.project((co1 + co2) * 0.5);
        let e_v1 = self.projector.project(co1);
        let e_v2 = self.projector.project(co2);

        let nudge = (cent - mid).normalize_or_zero() * self.side_nudge;
        let tweak = self.cursor + nudge;

        let score = e_v1.distance(e_v2);
        if dist_squared_to_segment(tweak, e_v1, e_v2) > dist_squared_to_segment(self.cursor, e_v1, e_v2)
        {
            score
        } else {
            -score
        }
    }
}
