use std::cmp::Ordering;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::composer::{DirectionalLight, Lighting};
use crate::driver::Frame;
use crate::material::Material;
use crate::scene::DrawItem;

/// Weight of the environment radiance relative to the analytic lights.
pub const ENVIRONMENT_WEIGHT: f32 = 0.5;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// x: exposure, y: encode sRGB in the shader, z: environment present.
    pub params: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub rim_direction: [f32; 4],
    pub rim_color: [f32; 4],
    pub ground_direction: [f32; 4],
    pub ground_color: [f32; 4],
    /// w: cutoff distance.
    pub spot_position: [f32; 4],
    /// w: decay exponent.
    pub spot_direction: [f32; 4],
    pub spot_color: [f32; 4],
    /// x: cos(outer), y: cos(inner).
    pub spot_cone: [f32; 4],
    pub env_sky: [f32; 4],
    pub env_ground: [f32; 4],
}

fn directional(light: &DirectionalLight) -> ([f32; 4], [f32; 4]) {
    (
        light.direction().extend(0.0).into(),
        (light.color.to_vec3() * light.intensity).extend(0.0).into(),
    )
}

impl GlobalUniform {
    pub fn from_frame(frame: &Frame<'_>, encode_srgb: bool) -> Self {
        let Lighting {
            hemisphere,
            rim,
            fill,
            ground,
        } = frame.lighting;
        let (rim_direction, rim_color) = directional(rim);
        let (ground_direction, ground_color) = directional(ground);
        let (outer, inner) = fill.cone_cosines();
        let (env_sky, env_ground, has_environment) = match frame.environment.as_deref() {
            Some(env) => (env.sky * ENVIRONMENT_WEIGHT, env.ground * ENVIRONMENT_WEIGHT, 1.0),
            None => (Vec3::ZERO, Vec3::ZERO, 0.0),
        };

        Self {
            view_proj: frame.camera.view_proj.to_cols_array_2d(),
            camera_position: frame.camera.position.extend(1.0).into(),
            params: [frame.exposure, f32::from(u8::from(encode_srgb)), has_environment, 0.0],
            hemi_sky: (hemisphere.sky.to_vec3() * hemisphere.intensity).extend(0.0).into(),
            hemi_ground: (hemisphere.ground.to_vec3() * hemisphere.intensity).extend(0.0).into(),
            rim_direction,
            rim_color,
            ground_direction,
            ground_color,
            spot_position: fill.position.extend(fill.distance).into(),
            spot_direction: fill.axis().extend(fill.decay).into(),
            spot_color: (fill.color.to_vec3() * fill.intensity).extend(0.0).into(),
            spot_cone: [outer, inner, 0.0, 0.0],
            env_sky: env_sky.extend(0.0).into(),
            env_ground: env_ground.extend(0.0).into(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    /// rgb: base color, a: opacity.
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    /// x: roughness, y: metalness, z: environment intensity, w: lit.
    pub surface: [f32; 4],
    /// x: clearcoat, y: clearcoat roughness.
    pub coat: [f32; 4],
    /// rgb: sheen color scaled by sheen, w: sheen roughness.
    pub sheen: [f32; 4],
}

impl ObjectConstants {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let opacity = if material.transparent { material.opacity } else { 1.0 };
        Self {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            color: material.color.to_vec3().extend(opacity).into(),
            emissive: (material.emissive.to_vec3() * material.emissive_intensity)
                .extend(0.0)
                .into(),
            surface: [
                material.roughness,
                material.metalness,
                material.env_map_intensity,
                f32::from(u8::from(material.is_lit())),
            ],
            coat: [material.clearcoat, material.clearcoat_roughness, 0.0, 0.0],
            sheen: (material.sheen_color.to_vec3() * material.sheen)
                .extend(material.sheen_roughness)
                .into(),
        }
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

/// Draw order for one frame, as indices into the draw list.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DrawPlan {
    pub opaque: Vec<usize>,
    /// Farthest first.
    pub blended: Vec<usize>,
}

pub(crate) fn plan_draws(items: &[DrawItem<'_>], camera_position: Vec3) -> DrawPlan {
    let mut plan = DrawPlan::default();
    let mut blended = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if item.visual.material.is_blended() {
            let depth = item.world.w_axis.truncate().distance_squared(camera_position);
            blended.push((index, depth));
        } else {
            plan.opaque.push(index);
        }
    }
    blended.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    plan.blended = blended.into_iter().map(|(index, _)| index).collect();
    plan
}
