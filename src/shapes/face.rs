use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::Vec3;

use crate::geometry::Geometry;
use crate::material::{Color, Material};
use crate::scene::{Entity, EntityId, SceneGraph};

use super::mirror_named;

/// Rest offsets of the mouth channels the chewing cycle drives.
pub(crate) const TONGUE_REST_Y: f32 = -0.26;
pub(crate) const TEETH_REST_Y: f32 = -0.14;
pub(crate) const SMILE_LIFT_REST_Y: f32 = -0.18;
pub(crate) const FACE_REST_Z: f32 = 0.86;

/// Handles into the face sub-assembly.
#[derive(Debug, Clone)]
pub struct FaceRig {
    pub root: EntityId,
    pub eye_left: EntityId,
    pub eye_right: EntityId,
    pub iris_left: EntityId,
    pub iris_right: EntityId,
    pub pupil_left: EntityId,
    pub pupil_right: EntityId,
    pub highlight_left: EntityId,
    pub highlight_right: EntityId,
    pub nose: EntityId,
    pub lips: EntityId,
    pub inner_mouth: EntityId,
    pub tongue: EntityId,
    pub teeth: EntityId,
    pub smile_lift_left: EntityId,
    pub smile_lift_right: EntityId,
}

impl FaceRig {
    /// Left/right pairs, left first.
    pub fn mirrored_pairs(&self) -> [(EntityId, EntityId); 5] {
        [
            (self.eye_left, self.eye_right),
            (self.iris_left, self.iris_right),
            (self.pupil_left, self.pupil_right),
            (self.highlight_left, self.highlight_right),
            (self.smile_lift_left, self.smile_lift_right),
        ]
    }
}

/// Builds eyes, nose and the animated mouth parts under `parent`.
pub fn create_face(graph: &mut SceneGraph, parent: EntityId) -> FaceRig {
    let root = graph.add_child(parent, Entity::group("face").at(Vec3::new(0.0, 0.05, FACE_REST_Z)));

    let eye_white = Arc::new(Material {
        roughness: 0.1,
        metalness: 0.0,
        clearcoat: 0.6,
        clearcoat_roughness: 0.3,
        ..Material::physical("eye-white", Color::WHITE)
    });
    let pupil_material = Arc::new(Material {
        metalness: 0.1,
        roughness: 0.25,
        ..Material::standard("pupil", Color::hex(0x331616))
    });
    let iris_material = Arc::new(Material {
        emissive: Color::hex(0x1b396f),
        emissive_intensity: 0.45,
        metalness: 0.15,
        roughness: 0.25,
        ..Material::standard("iris", Color::hex(0x4b7ad1))
    });

    let eye_geometry =
        Arc::new(Geometry::sphere("eye", 0.16, 64, 64).scaled(Vec3::new(1.0, 1.0, 0.65)));
    let eye_left = graph.add_child(
        root,
        Entity::mesh("eye-left", &eye_geometry, &eye_white).at(Vec3::new(-0.32, 0.2, 0.04)),
    );
    let eye_right = mirror_named(graph, eye_left, "eye-right");

    let iris_position = Vec3::new(-0.32, 0.18, 0.12);
    let iris_rotation = Vec3::new(-PI / 2.1, 0.0, 0.0);
    let iris_geometry = Arc::new(Geometry::circle("iris", 0.09, 48));
    let iris_left = graph.add_child(
        root,
        Entity::mesh("iris-left", &iris_geometry, &iris_material)
            .at(iris_position)
            .rotated(iris_rotation),
    );
    let iris_right = mirror_named(graph, iris_left, "iris-right");

    let pupil_geometry = Arc::new(Geometry::circle("pupil", 0.05, 48));
    let pupil_left = graph.add_child(
        root,
        Entity::mesh("pupil-left", &pupil_geometry, &pupil_material)
            .at(iris_position + Vec3::new(0.0, 0.0, 0.015))
            .rotated(iris_rotation),
    );
    let pupil_right = mirror_named(graph, pupil_left, "pupil-right");

    let highlight_geometry = Arc::new(Geometry::circle("eye-highlight", 0.018, 24));
    let highlight_material = Arc::new(Material::unlit("eye-highlight", Color::WHITE));
    let highlight_left = graph.add_child(
        root,
        Entity::mesh("highlight-left", &highlight_geometry, &highlight_material)
            .at(iris_position + Vec3::new(-0.03, 0.03, 0.03)),
    );
    let highlight_right = mirror_named(graph, highlight_left, "highlight-right");

    let nose_geometry =
        Arc::new(Geometry::sphere("nose", 0.08, 32, 32).scaled(Vec3::new(1.0, 1.0, 0.6)));
    let nose_material = Arc::new(Material {
        roughness: 0.4,
        metalness: 0.05,
        clearcoat: 0.4,
        ..Material::physical("nose", Color::hex(0xff7a85))
    });
    let nose = graph.add_child(
        root,
        Entity::mesh("nose", &nose_geometry, &nose_material)
            .at(Vec3::new(0.0, -0.02, 0.14))
            .rotated(Vec3::new(-0.35, 0.0, 0.0)),
    );

    let lip_geometry = Arc::new(Geometry::torus("lips", 0.32, 0.055, 42, 128));
    let lip_material = Arc::new(Material {
        metalness: 0.2,
        roughness: 0.35,
        emissive: Color::hex(0x401018),
        emissive_intensity: 0.2,
        ..Material::standard("lips", Color::hex(0xb21529))
    });
    let lips = graph.add_child(
        root,
        Entity::mesh("lips", &lip_geometry, &lip_material)
            .at(Vec3::new(0.0, -0.18, 0.04))
            .rotated(Vec3::new(FRAC_PI_2, 0.0, 0.0)),
    );

    let mouth_geometry =
        Arc::new(Geometry::cylinder("inner-mouth", 0.24, 0.35, 0.35, 64).open_ended());
    let mouth_material = Arc::new(Material {
        double_sided: true,
        roughness: 0.4,
        metalness: 0.1,
        ..Material::standard("inner-mouth", Color::hex(0x120607))
    });
    let inner_mouth = graph.add_child(
        root,
        Entity::mesh("inner-mouth", &mouth_geometry, &mouth_material)
            .at(Vec3::new(0.0, -0.18, 0.22))
            .rotated(Vec3::new(FRAC_PI_2, 0.0, 0.0)),
    );

    let tongue_geometry = Arc::new(Geometry::sphere_section("tongue", 0.18, 42, 42, 0.0, PI));
    let tongue_material = Arc::new(Material {
        roughness: 0.5,
        metalness: 0.2,
        emissive: Color::hex(0xa64d66),
        emissive_intensity: 0.35,
        ..Material::standard("tongue", Color::hex(0xff6177))
    });
    let tongue = graph.add_child(
        root,
        Entity::mesh("tongue", &tongue_geometry, &tongue_material)
            .at(Vec3::new(0.0, TONGUE_REST_Y, 0.23))
            .scaled(Vec3::new(1.1, 0.65, 1.2)),
    );

    let teeth_geometry = Arc::new(Geometry::cuboid("teeth", 0.35, 0.08, 0.03));
    let teeth_material = Arc::new(Material {
        roughness: 0.15,
        metalness: 0.05,
        ..Material::standard("teeth", Color::WHITE)
    });
    let teeth = graph.add_child(
        root,
        Entity::mesh("teeth", &teeth_geometry, &teeth_material)
            .at(Vec3::new(0.0, TEETH_REST_Y, 0.23)),
    );

    let lift_geometry = Arc::new(Geometry::sphere_section("smile-lift", 0.2, 24, 24, 0.0, PI));
    let lift_material =
        Arc::new(Material::unlit("smile-lift", Color::hex(0xff4c60)).with_opacity(0.25));
    let smile_lift_left = graph.add_child(
        root,
        Entity::mesh("smile-lift-left", &lift_geometry, &lift_material)
            .at(Vec3::new(-0.33, SMILE_LIFT_REST_Y, 0.18))
            .rotated(Vec3::new(PI / 2.5, 0.0, 0.0)),
    );
    let smile_lift_right = mirror_named(graph, smile_lift_left, "smile-lift-right");

    FaceRig {
        root,
        eye_left,
        eye_right,
        iris_left,
        iris_right,
        pupil_left,
        pupil_right,
        highlight_left,
        highlight_right,
        nose,
        lips,
        inner_mouth,
        tongue,
        teeth,
        smile_lift_left,
        smile_lift_right,
    }
}
