use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// CPU mesh ready for upload.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub const STRIDE: usize = 6;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
        index
    }

    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[index * Self::STRIDE..index * Self::STRIDE + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[index * Self::STRIDE + 3..index * Self::STRIDE + 6])
    }

    /// Axis aligned bounds of every vertex position.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (0..self.vertex_count())
            .map(|i| self.position(i))
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            })
    }

    fn scale(&mut self, scale: Vec3) {
        for chunk in self.vertices.chunks_exact_mut(Self::STRIDE) {
            let position = Vec3::from_slice(&chunk[0..3]) * scale;
            let normal = (Vec3::from_slice(&chunk[3..6]) / scale).normalize_or_zero();
            chunk[0..3].copy_from_slice(&position.to_array());
            chunk[3..6].copy_from_slice(&normal.to_array());
        }
    }

    fn translate(&mut self, offset: Vec3) {
        for chunk in self.vertices.chunks_exact_mut(Self::STRIDE) {
            chunk[0] += offset.x;
            chunk[1] += offset.y;
            chunk[2] += offset.z;
        }
    }

    fn center(&mut self) {
        if self.vertex_count() == 0 {
            return;
        }
        let (lo, hi) = self.bounds();
        self.translate(-(lo + hi) * 0.5);
    }

    /// Rebuilds vertex normals as the average of the adjacent face normals.
    fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertex_count()];

        for triangle in self.indices.chunks_exact(3) {
            let i0 = triangle[0] as usize;
            let i1 = triangle[1] as usize;
            let i2 = triangle[2] as usize;
            let p0 = self.position(i0);
            let normal = (self.position(i1) - p0).cross(self.position(i2) - p0);
            if normal.length_squared() > f32::EPSILON * f32::EPSILON {
                let normal = normal.normalize();
                accum[i0] += normal;
                accum[i1] += normal;
                accum[i2] += normal;
            }
        }

        for (i, normal) in accum.into_iter().enumerate() {
            let normal = normal.normalize_or_zero();
            self.vertices[i * Self::STRIDE + 3..i * Self::STRIDE + 6]
                .copy_from_slice(&normal.to_array());
        }
    }
}

/// Primitive shape with its tessellation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// Sphere section; `phi` sweeps around Y starting from -X.
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        phi_start: f32,
        phi_length: f32,
    },
    Cuboid {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Frustum along Y, centered on the origin.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
        open_ended: bool,
    },
    /// Ring in the XY plane.
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        arc: f32,
    },
    /// Disc in the XY plane facing +Z.
    Circle { radius: f32, segments: u32 },
    /// Lens outline bounded by two quadratic curves from the origin to
    /// `(length, 0)`, extruded along +Z.
    Leaf {
        length: f32,
        control_x: f32,
        upper_bulge: f32,
        lower_bulge: f32,
        depth: f32,
        curve_segments: u32,
    },
}

/// A primitive plus the transforms baked into its vertices.
///
/// The label identifies the tessellated mesh; two geometries with the same
/// label must describe the same vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub label: String,
    pub primitive: Primitive,
    pub scale: Vec3,
    pub offset: Vec3,
    pub centered: bool,
}

impl Geometry {
    pub fn new(label: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            label: label.into(),
            primitive,
            scale: Vec3::ONE,
            offset: Vec3::ZERO,
            centered: false,
        }
    }

    pub fn sphere(
        label: impl Into<String>,
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    ) -> Self {
        Self::sphere_section(label, radius, width_segments, height_segments, 0.0, TAU)
    }

    pub fn sphere_section(
        label: impl Into<String>,
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        phi_start: f32,
        phi_length: f32,
    ) -> Self {
        Self::new(
            label,
            Primitive::Sphere {
                radius,
                width_segments,
                height_segments,
                phi_start,
                phi_length,
            },
        )
    }

    pub fn cuboid(label: impl Into<String>, width: f32, height: f32, depth: f32) -> Self {
        Self::new(label, Primitive::Cuboid { width, height, depth })
    }

    pub fn cylinder(
        label: impl Into<String>,
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Self {
        Self::new(
            label,
            Primitive::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
                open_ended: false,
            },
        )
    }

    pub fn torus(
        label: impl Into<String>,
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    ) -> Self {
        Self::new(
            label,
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
                arc: TAU,
            },
        )
    }

    pub fn circle(label: impl Into<String>, radius: f32, segments: u32) -> Self {
        Self::new(label, Primitive::Circle { radius, segments })
    }

    /// Drops the end caps of a cylinder; other primitives are unchanged.
    pub fn open_ended(mut self) -> Self {
        if let Primitive::Cylinder { open_ended, .. } = &mut self.primitive {
            *open_ended = true;
        }
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale *= scale;
        self.offset *= scale;
        self
    }

    pub fn translated(mut self, offset: Vec3) -> Self {
        self.offset += offset;
        self
    }

    /// Moves the bounding box center of the final mesh onto the origin.
    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    /// Builds the mesh with every baked transform applied.
    pub fn tessellate(&self) -> Mesh {
        let mut mesh = match &self.primitive {
            Primitive::Sphere {
                radius,
                width_segments,
                height_segments,
                phi_start,
                phi_length,
            } => sphere_mesh(*radius, *width_segments, *height_segments, *phi_start, *phi_length),
            Primitive::Cuboid { width, height, depth } => cuboid_mesh(*width, *height, *depth),
            Primitive::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
                open_ended,
            } => cylinder_mesh(*radius_top, *radius_bottom, *height, *radial_segments, *open_ended),
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
                arc,
            } => torus_mesh(*radius, *tube, *radial_segments, *tubular_segments, *arc),
            Primitive::Circle { radius, segments } => circle_mesh(*radius, *segments),
            Primitive::Leaf {
                length,
                control_x,
                upper_bulge,
                lower_bulge,
                depth,
                curve_segments,
            } => leaf_mesh(
                *length,
                *control_x,
                *upper_bulge,
                *lower_bulge,
                *depth,
                *curve_segments,
            ),
        };
        if self.scale != Vec3::ONE {
            mesh.scale(self.scale);
        }
        if self.offset != Vec3::ZERO {
            mesh.translate(self.offset);
        }
        if self.centered {
            mesh.center();
        }
        mesh
    }
}

fn sphere_mesh(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    phi_start: f32,
    phi_length: f32,
) -> Mesh {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut mesh = Mesh::default();

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let theta = v * PI;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = phi_start + u * phi_length;
            let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            mesh.push_vertex(normal * radius, normal);
        }
    }

    let row = ws + 1;
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn push_face(mesh: &mut Mesh, corners: [Vec3; 4], normal: Vec3) {
    let base = mesh.vertex_count() as u32;
    for corner in corners {
        mesh.push_vertex(corner, normal);
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

fn cuboid_mesh(width: f32, height: f32, depth: f32) -> Mesh {
    let h = Vec3::new(width, height, depth) * 0.5;
    let mut mesh = Mesh::default();
    let corner = |x: f32, y: f32, z: f32| Vec3::new(x * h.x, y * h.y, z * h.z);
    push_face(
        &mut mesh,
        [
            corner(-1.0, -1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        ],
        Vec3::Z,
    );
    push_face(
        &mut mesh,
        [
            corner(1.0, -1.0, -1.0),
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
            corner(1.0, 1.0, -1.0),
        ],
        Vec3::NEG_Z,
    );
    push_face(
        &mut mesh,
        [
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, -1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
            corner(-1.0, 1.0, -1.0),
        ],
        Vec3::NEG_X,
    );
    push_face(
        &mut mesh,
        [
            corner(1.0, -1.0, 1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(1.0, 1.0, 1.0),
        ],
        Vec3::X,
    );
    push_face(
        &mut mesh,
        [
            corner(-1.0, 1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(1.0, 1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
        ],
        Vec3::Y,
    );
    push_face(
        &mut mesh,
        [
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, -1.0, 1.0),
            corner(-1.0, -1.0, 1.0),
        ],
        Vec3::NEG_Y,
    );
    mesh
}

fn cylinder_mesh(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    open_ended: bool,
) -> Mesh {
    let seg = radial_segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;
    let mut mesh = Mesh::default();

    for (y, radius) in [(half, radius_top), (-half, radius_bottom)] {
        for i in 0..=seg {
            let theta = i as f32 / seg as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            mesh.push_vertex(Vec3::new(radius * sin, y, radius * cos), normal);
        }
    }
    let row = seg + 1;
    for i in 0..seg {
        let a = i;
        let b = i + row;
        let c = i + row + 1;
        let d = i + 1;
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    if !open_ended {
        let caps = [(half, radius_top, Vec3::Y), (-half, radius_bottom, Vec3::NEG_Y)];
        for (y, radius, normal) in caps {
            if radius <= 0.0 {
                continue;
            }
            let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal);
            let first = mesh.vertex_count() as u32;
            for i in 0..=seg {
                let theta = i as f32 / seg as f32 * TAU;
                mesh.push_vertex(Vec3::new(radius * theta.sin(), y, radius * theta.cos()), normal);
            }
            for i in 0..seg {
                if normal.y > 0.0 {
                    mesh.indices.extend_from_slice(&[center, first + i, first + i + 1]);
                } else {
                    mesh.indices.extend_from_slice(&[center, first + i + 1, first + i]);
                }
            }
        }
    }
    mesh
}

fn torus_mesh(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    arc: f32,
) -> Mesh {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let mut mesh = Mesh::default();

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * arc;
            let ring = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            mesh.push_vertex(position, (position - ring).normalize_or_zero());
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

fn circle_mesh(radius: f32, segments: u32) -> Mesh {
    let seg = segments.max(3);
    let mut mesh = Mesh::default();
    let center = mesh.push_vertex(Vec3::ZERO, Vec3::Z);
    for i in 0..=seg {
        let theta = i as f32 / seg as f32 * TAU;
        mesh.push_vertex(Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0), Vec3::Z);
    }
    for i in 1..=seg {
        mesh.indices.extend_from_slice(&[center, i, i + 1]);
    }
    mesh
}

fn quadratic(p0: Vec2, control: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let s = 1.0 - t;
    p0 * (s * s) + control * (2.0 * s * t) + p1 * (t * t)
}

fn leaf_outline(
    length: f32,
    control_x: f32,
    upper_bulge: f32,
    lower_bulge: f32,
    curve_segments: u32,
) -> Vec<Vec2> {
    let seg = curve_segments.max(2);
    let tip = Vec2::new(length, 0.0);
    let upper = Vec2::new(control_x, upper_bulge);
    let lower = Vec2::new(control_x, lower_bulge);
    let mut outline = Vec::with_capacity(seg as usize * 2);
    for i in 0..seg {
        outline.push(quadratic(Vec2::ZERO, upper, tip, i as f32 / seg as f32));
    }
    for i in 0..seg {
        outline.push(quadratic(tip, lower, Vec2::ZERO, i as f32 / seg as f32));
    }
    outline
}

fn leaf_mesh(
    length: f32,
    control_x: f32,
    upper_bulge: f32,
    lower_bulge: f32,
    depth: f32,
    curve_segments: u32,
) -> Mesh {
    // Upper curve runs toward the tip, so the outline winds clockwise seen from +Z.
    let outline = leaf_outline(length, control_x, upper_bulge, lower_bulge, curve_segments);
    let n = outline.len() as u32;
    let centroid = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;
    let mut mesh = Mesh::default();

    for (z, front) in [(depth, true), (0.0, false)] {
        let center = mesh.push_vertex(centroid.extend(z), Vec3::ZERO);
        let first = mesh.vertex_count() as u32;
        for point in &outline {
            mesh.push_vertex(point.extend(z), Vec3::ZERO);
        }
        for i in 0..n {
            let a = first + i;
            let b = first + (i + 1) % n;
            if front {
                mesh.indices.extend_from_slice(&[center, b, a]);
            } else {
                mesh.indices.extend_from_slice(&[center, a, b]);
            }
        }
    }

    let first = mesh.vertex_count() as u32;
    for point in &outline {
        mesh.push_vertex(point.extend(depth), Vec3::ZERO);
        mesh.push_vertex(point.extend(0.0), Vec3::ZERO);
    }
    for i in 0..n {
        let j = (i + 1) % n;
        let front_a = first + i * 2;
        let back_a = front_a + 1;
        let front_b = first + j * 2;
        let back_b = front_b + 1;
        mesh.indices
            .extend_from_slice(&[front_a, front_b, back_a, front_b, back_b, back_a]);
    }

    mesh.recompute_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_valid(mesh: &Mesh) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = Geometry::sphere("ball", 0.32, 16, 12).tessellate();
        assert_eq!(mesh.vertex_count(), 17 * 13);
        assert_indices_valid(&mesh);
        for i in 0..mesh.vertex_count() {
            assert!((mesh.position(i).length() - 0.32).abs() < 1e-5);
        }
    }

    #[test]
    fn half_sphere_faces_positive_z() {
        let mesh = Geometry::sphere_section("tongue", 0.18, 12, 12, 0.0, PI).tessellate();
        for i in 0..mesh.vertex_count() {
            assert!(mesh.position(i).z >= -1e-5);
        }
    }

    #[test]
    fn baked_scale_keeps_normals_unit_length() {
        let mesh = Geometry::sphere("eye", 0.16, 16, 16)
            .scaled(Vec3::new(1.0, 1.0, 0.65))
            .tessellate();
        let (lo, hi) = mesh.bounds();
        assert!((hi.z - 0.16 * 0.65).abs() < 1e-5);
        assert!((lo.x + 0.16).abs() < 1e-5);
        for i in 0..mesh.vertex_count() {
            assert!((mesh.normal(i).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn translation_applies_after_scale() {
        let mesh = Geometry::sphere("body", 1.0, 24, 24)
            .scaled(Vec3::new(1.0, 0.98, 1.0))
            .translated(Vec3::new(0.0, 0.03, 0.0))
            .tessellate();
        let (lo, hi) = mesh.bounds();
        assert!((hi.y - 1.01).abs() < 1e-4);
        assert!((lo.y + 0.95).abs() < 1e-4);
    }

    #[test]
    fn cuboid_has_six_flat_faces() {
        let mesh = Geometry::cuboid("teeth", 0.35, 0.08, 0.03).tessellate();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
        let (lo, hi) = mesh.bounds();
        assert!((hi - lo - Vec3::new(0.35, 0.08, 0.03)).length() < 1e-6);
    }

    #[test]
    fn open_cylinder_skips_caps() {
        let closed = Geometry::cylinder("stalk", 0.06, 0.15, 0.55, 18).tessellate();
        let open = Geometry::cylinder("mouth", 0.24, 0.35, 0.35, 18)
            .open_ended()
            .tessellate();
        assert_indices_valid(&closed);
        assert_indices_valid(&open);
        assert_eq!(open.vertex_count(), 2 * 19);
        assert!(closed.vertex_count() > open.vertex_count());
        let (lo, hi) = open.bounds();
        assert!((hi.y - 0.175).abs() < 1e-6);
        assert!((lo.y + 0.175).abs() < 1e-6);
    }

    #[test]
    fn torus_vertices_stay_within_tube() {
        let mesh = Geometry::torus("lips", 0.32, 0.055, 12, 32).tessellate();
        assert_indices_valid(&mesh);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let ring = Vec3::new(p.x, p.y, 0.0).normalize() * 0.32;
            assert!(((p - ring).length() - 0.055).abs() < 1e-4);
        }
    }

    #[test]
    fn circle_faces_positive_z() {
        let mesh = Geometry::circle("iris", 0.09, 48).tessellate();
        assert_eq!(mesh.vertex_count(), 50);
        assert_eq!(mesh.indices.len(), 48 * 3);
        for i in 0..mesh.vertex_count() {
            assert_eq!(mesh.normal(i), Vec3::Z);
        }
    }

    #[test]
    fn centered_leaf_is_balanced_around_origin() {
        let mesh = Geometry::new(
            "leaf",
            Primitive::Leaf {
                length: 0.9,
                control_x: 0.35,
                upper_bulge: 0.1,
                lower_bulge: -0.12,
                depth: 0.06,
                curve_segments: 12,
            },
        )
        .centered()
        .tessellate();
        assert_indices_valid(&mesh);
        let (lo, hi) = mesh.bounds();
        assert!((lo + hi).length() < 1e-5);
        assert!((hi.x - lo.x - 0.9).abs() < 1e-5);
        assert!((hi.z - lo.z - 0.06).abs() < 1e-5);
    }

    #[test]
    fn leaf_caps_face_away_from_each_other() {
        let mesh = Geometry::new(
            "leaf",
            Primitive::Leaf {
                length: 0.9,
                control_x: 0.35,
                upper_bulge: 0.1,
                lower_bulge: -0.12,
                depth: 0.06,
                curve_segments: 8,
            },
        )
        .tessellate();
        // Vertex 0 is the front centroid, the back centroid follows the front ring.
        assert!(mesh.normal(0).z > 0.99);
        assert!(mesh.normal(17).z < -0.99);
    }
}
