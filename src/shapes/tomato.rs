use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use glam::Vec3;

use crate::geometry::{Geometry, Primitive};
use crate::material::{Color, Material};
use crate::scene::{Entity, EntityId, SceneGraph};

use super::face::{create_face, FaceRig};
use super::mirror_named;

const LEAF_COUNT: usize = 6;

/// Handles into the tomato character.
#[derive(Debug, Clone)]
pub struct TomatoRig {
    pub root: EntityId,
    pub body: EntityId,
    pub blush_left: EntityId,
    pub blush_right: EntityId,
    pub face: FaceRig,
    pub stem: StemRig,
    pub shadow: EntityId,
}

#[derive(Debug, Clone)]
pub struct StemRig {
    pub root: EntityId,
    pub stalk: EntityId,
    pub leaves: [EntityId; LEAF_COUNT],
}

/// Builds the tomato body, blushes, face, stem and ground shadow as a new root.
pub fn create_tomato(graph: &mut SceneGraph) -> TomatoRig {
    let root = graph.add_root(Entity::group("tomato").at(Vec3::new(0.0, 0.1, 0.0)));

    let body_geometry = Arc::new(
        Geometry::sphere("tomato-body", 1.0, 160, 160)
            .scaled(Vec3::new(1.0, 0.98, 1.0))
            .translated(Vec3::new(0.0, 0.03, 0.0)),
    );
    let body_material = Arc::new(Material {
        roughness: 0.16,
        metalness: 0.05,
        clearcoat: 1.0,
        clearcoat_roughness: 0.04,
        sheen: 1.0,
        sheen_color: Color::hex(0xff6b6b),
        sheen_roughness: 0.35,
        transmission: 0.07,
        thickness: 0.48,
        ior: 1.45,
        specular_intensity: 1.0,
        ..Material::physical("tomato-skin", Color::hex(0xdd1f2c))
    });
    let body = graph.add_child(root, Entity::mesh("tomato-body", &body_geometry, &body_material));

    let blush_geometry = Arc::new(Geometry::sphere("blush", 0.32, 48, 48));
    let blush_material = Arc::new(
        Material {
            emissive: Color::hex(0xff4e6d),
            emissive_intensity: 0.1,
            ..Material::standard("blush", Color::hex(0xff8a9a))
        }
        .with_opacity(0.18),
    );
    let blush_left = graph.add_child(
        root,
        Entity::mesh("blush-left", &blush_geometry, &blush_material)
            .at(Vec3::new(-0.43, -0.08, 0.88))
            .scaled(Vec3::new(1.0, 0.65, 0.35)),
    );
    let blush_right = mirror_named(graph, blush_left, "blush-right");

    let face = create_face(graph, root);
    let stem = create_stem(graph, root);

    let shadow_geometry = Arc::new(Geometry::circle("ground-shadow", 1.15, 64));
    let shadow_material =
        Arc::new(Material::unlit("ground-shadow", Color::hex(0xeb8591)).with_opacity(0.35));
    let shadow = graph.add_child(
        root,
        Entity::mesh("ground-shadow", &shadow_geometry, &shadow_material)
            .at(Vec3::new(0.0, -1.02, 0.0))
            .rotated(Vec3::new(-FRAC_PI_2, 0.0, 0.0))
            .scaled(Vec3::splat(0.8)),
    );

    TomatoRig {
        root,
        body,
        blush_left,
        blush_right,
        face,
        stem,
        shadow,
    }
}

/// Builds the stalk with its crown of six extruded leaves under `parent`.
pub fn create_stem(graph: &mut SceneGraph, parent: EntityId) -> StemRig {
    let root = graph.add_child(
        parent,
        Entity::group("stem")
            .at(Vec3::new(0.0, 1.01, -0.08))
            .rotated(Vec3::new(-0.15, 0.0, 0.0)),
    );

    let stalk_geometry = Arc::new(Geometry::cylinder("stalk", 0.06, 0.15, 0.55, 18));
    let stalk_material = Arc::new(Material {
        roughness: 0.4,
        metalness: 0.1,
        clearcoat: 0.2,
        sheen: 0.4,
        sheen_color: Color::hex(0x5fa437),
        ..Material::physical("stalk", Color::hex(0x2b5a14))
    });
    let stalk = graph.add_child(
        root,
        Entity::mesh("stalk", &stalk_geometry, &stalk_material).at(Vec3::new(0.0, 0.24, 0.0)),
    );

    let leaf_geometry = Arc::new(
        Geometry::new(
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
        .centered(),
    );
    let leaf_material = Arc::new(Material {
        roughness: 0.5,
        metalness: 0.1,
        double_sided: true,
        ..Material::standard("leaf", Color::hex(0x3f8f25))
    });
    let leaves = std::array::from_fn(|i| {
        graph.add_child(
            root,
            Entity::mesh(format!("leaf-{i}"), &leaf_geometry, &leaf_material)
                .at(Vec3::new(0.0, -0.05, -0.02))
                .rotated(Vec3::new(0.8, TAU * i as f32 / LEAF_COUNT as f32, 0.0))
                .scaled(Vec3::splat(0.9)),
        )
    });

    StemRig { root, stalk, leaves }
}
