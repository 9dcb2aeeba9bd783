use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use log::info;

use crate::material::Color;
use crate::render::CameraParams;
use crate::scene::SceneGraph;
use crate::shapes::{create_hand_with_fork, create_tomato, HandRig, TomatoRig};

/// Upper bound on the device pixel ratio applied to the render target.
pub const MAX_PIXEL_RATIO: f64 = 1.8;

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_degrees: 32.0,
            aspect: sanitize_aspect(aspect),
            near: 0.1,
            far: 50.0,
            position: Vec3::new(0.0, 0.35, 4.6),
            target: Vec3::new(0.0, 0.2, 0.0),
        }
    }

    /// Tracks a viewport resize. Zero-sized viewports keep the last aspect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = sanitize_aspect(width as f32 / height as f32);
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn params(&self) -> CameraParams {
        CameraParams {
            view_proj: self.projection() * self.view(),
            position: self.position,
        }
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

/// A light shining from `position` toward `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the lit surface toward the light.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl SpotLight {
    pub fn axis(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Cosine of the full cone angle and of the angle where the penumbra starts.
    pub fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle.cos();
        let inner = (self.angle * (1.0 - self.penumbra)).cos();
        (outer, inner)
    }
}

/// The fixed analytic light rig around the characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub hemisphere: HemisphereLight,
    pub rim: DirectionalLight,
    pub fill: SpotLight,
    pub ground: DirectionalLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            hemisphere: HemisphereLight {
                sky: Color::hex(0xfff1d0),
                ground: Color::hex(0xff748f),
                intensity: 0.75,
            },
            rim: DirectionalLight {
                color: Color::WHITE,
                intensity: 1.1,
                position: Vec3::new(-3.0, 3.0, 5.0),
                target: Vec3::ZERO,
            },
            fill: SpotLight {
                color: Color::hex(0xff8fa7),
                intensity: 1.2,
                distance: 15.0,
                angle: PI / 5.0,
                penumbra: 0.45,
                decay: 1.0,
                position: Vec3::new(3.0, 2.5, 4.0),
                target: Vec3::new(0.0, 0.4, 0.0),
            },
            ground: DirectionalLight {
                color: Color::hex(0xfff7f2),
                intensity: 0.6,
                position: Vec3::new(0.0, -2.0, 3.0),
                target: Vec3::ZERO,
            },
        }
    }
}

/// Everything the frame driver needs: the populated graph, the rigs the
/// timeline animates and the fixed presentation settings.
#[derive(Debug)]
pub struct Vignette {
    pub graph: SceneGraph,
    pub tomato: TomatoRig,
    pub hand: HandRig,
    pub camera: PerspectiveCamera,
    pub lighting: Lighting,
    pub background: Color,
    pub exposure: f32,
}

pub fn compose_vignette(aspect: f32) -> Vignette {
    let mut graph = SceneGraph::new();
    let tomato = create_tomato(&mut graph);
    let hand = create_hand_with_fork(&mut graph);
    info!(
        "Composed vignette with {} entities ({} drawable)",
        graph.len(),
        graph.draw_list().len()
    );

    Vignette {
        graph,
        tomato,
        hand,
        camera: PerspectiveCamera::new(aspect),
        lighting: Lighting::default(),
        background: Color::hex(0xffcfd6),
        exposure: 1.25,
    }
}

/// Clamps the host scale factor the way the render target size expects.
pub fn pixel_ratio(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composing_twice_yields_identical_scenes() {
        let a = compose_vignette(1.5);
        let b = compose_vignette(1.5);
        assert_eq!(a.graph.len(), b.graph.len());
        for ((_, left), (_, right)) in a.graph.iter().zip(b.graph.iter()) {
            assert_eq!(left.name, right.name);
            assert_eq!(left.transform, right.transform);
            assert_eq!(left.visible, right.visible);
            match (&left.visual, &right.visual) {
                (Some(l), Some(r)) => {
                    assert_eq!(*l.material, *r.material);
                    assert_eq!(*l.geometry, *r.geometry);
                }
                (None, None) => {}
                _ => panic!("visual mismatch on {}", left.name),
            }
        }
    }

    // The renderer caches meshes by label, so a label must never name two shapes.
    #[test]
    fn geometry_labels_identify_one_shape() {
        let vignette = compose_vignette(1.0);
        let mut seen: std::collections::HashMap<&str, &crate::geometry::Geometry> =
            std::collections::HashMap::new();
        for (_, entity) in vignette.graph.iter() {
            let Some(visual) = &entity.visual else {
                continue;
            };
            let geometry = visual.geometry.as_ref();
            if let Some(previous) = seen.insert(geometry.label.as_str(), geometry) {
                assert_eq!(previous, geometry, "label {} reused", geometry.label);
            }
        }
        assert!(seen.contains_key("slice-seed"));
        assert!(seen.contains_key("fork-prong"));
    }

    #[test]
    fn tomato_and_hand_are_the_only_roots() {
        let vignette = compose_vignette(1.0);
        assert_eq!(vignette.graph.roots(), &[vignette.tomato.root, vignette.hand.root]);
    }

    #[test]
    fn camera_tracks_viewport_aspect() {
        let mut camera = PerspectiveCamera::new(1.0);
        camera.set_viewport(1920, 1080);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.set_viewport(0, 1080);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn camera_looks_at_the_tomato() {
        let camera = PerspectiveCamera::new(1.0);
        let clip = camera.params().view_proj * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(pixel_ratio(1.0), 1.0);
        assert_eq!(pixel_ratio(3.0), MAX_PIXEL_RATIO);
        assert_eq!(pixel_ratio(f64::NAN), 1.0);
    }

    #[test]
    fn spot_penumbra_widens_inner_cone() {
        let fill = Lighting::default().fill;
        let (outer, inner) = fill.cone_cosines();
        assert!(inner > outer);
        assert!(fill.axis().dot(Vec3::new(-3.0, -2.1, -4.0).normalize()) > 0.999);
    }
}
