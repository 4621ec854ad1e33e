use glam::Vec3;

use crate::mesh::{Aabb, SourceMesh};

// Squared sine of the corner angle at `a` below which a triangle is handled
// as its three edges.
const DEGENERATE_SIN_SQ: f32 = 1.0e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub triangle: usize,
    pub corners: [u32; 3],
    pub barycentric: [f32; 3],
    pub point: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Hit(SurfaceHit),
    Miss,
}

#[derive(Debug, Clone, Default)]
pub struct SurfaceProjector {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    tri_bounds: Vec<Aabb>,
}

impl SurfaceProjector {
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let tri_bounds = triangles
            .iter()
            .map(|tri| {
                Aabb::from_points(tri.iter().map(|idx| positions[*idx as usize]))
                    .unwrap_or(Aabb {
                        min: [0.0; 3],
                        max: [0.0; 3],
                    })
            })
            .collect();
        Self {
            positions,
            triangles,
            tri_bounds,
        }
    }

    pub fn from_mesh(mesh: &SourceMesh) -> Self {
        Self::new(mesh.world_positions(), mesh.triangles().to_vec())
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn project(&self, query: Vec3) -> Projection {
        let mut best: Option<(SurfaceHit, f32)> = None;
        for (tri_index, tri) in self.triangles.iter().enumerate() {
            if let Some((_, best_dist)) = best {
                if self.tri_bounds[tri_index].distance_squared(query) >= best_dist {
                    continue;
                }
            }
            let a = self.positions[tri[0] as usize];
            let b = self.positions[tri[1] as usize];
            let c = self.positions[tri[2] as usize];
            let (closest, barycentric) = closest_point_on_triangle(query, a, b, c);
            let dist = (query - closest).length_squared();
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((
                    SurfaceHit {
                        triangle: tri_index,
                        corners: *tri,
                        barycentric,
                        point: closest,
                        distance: dist.sqrt(),
                    },
                    dist,
                ));
            }
        }
        match best {
            Some((hit, _)) => Projection::Hit(hit),
            None => Projection::Miss,
        }
    }
}

pub fn project(query: Vec3, mesh: &SourceMesh) -> Projection {
    SurfaceProjector::from_mesh(mesh).project(query)
}

pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, [f32; 3]) {
    let ab = b - a;
    let ac = c - a;
    let area = ab.cross(ac).length_squared();
    if area <= DEGENERATE_SIN_SQ * ab.length_squared() * ac.length_squared() {
        return closest_point_on_degenerate(p, a, b, c);
    }
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        let point = b + (c - b) * w;
        return (point, [0.0, 1.0 - w, w]);
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    let u = 1.0 - v - w;
    let point = a + ab * v + ac * w;
    (point, [u, v, w])
}

fn closest_point_on_degenerate(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, [f32; 3]) {
    let (on_ab, t_ab) = closest_point_on_segment(p, a, b);
    let (on_bc, t_bc) = closest_point_on_segment(p, b, c);
    let (on_ca, t_ca) = closest_point_on_segment(p, c, a);
    let mut best = (on_ab, [1.0 - t_ab, t_ab, 0.0]);
    let mut best_dist = (p - on_ab).length_squared();
    let dist_bc = (p - on_bc).length_squared();
    if dist_bc < best_dist {
        best = (on_bc, [0.0, 1.0 - t_bc, t_bc]);
        best_dist = dist_bc;
    }
    if (p - on_ca).length_squared() < best_dist {
        best = (on_ca, [t_ca, 0.0, 1.0 - t_ca]);
    }
    best
}

fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> (Vec3, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON * f32::EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}
