use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use glam::Vec3;

use crate::geometry::Geometry;
use crate::material::{Color, Material};
use crate::scene::{Entity, EntityId, SceneGraph};

const SEED_COUNT: usize = 6;

/// Handles into the tomato slice carried on the fork.
#[derive(Debug, Clone)]
pub struct SliceRig {
    pub root: EntityId,
    pub rim: EntityId,
    pub flesh: EntityId,
    pub seeds: [EntityId; SEED_COUNT],
}

/// Builds the slice (rim, flesh, seeds) under `parent`, visible and at the
/// parent's origin.
pub fn create_tomato_slice(graph: &mut SceneGraph, parent: EntityId) -> SliceRig {
    let root = graph.add_child(
        parent,
        Entity::group("tomato-slice").scaled(Vec3::new(0.85, 0.85, 0.5)),
    );

    let rim_material = Arc::new(Material {
        roughness: 0.25,
        metalness: 0.1,
        clearcoat: 0.8,
        clearcoat_roughness: 0.08,
        sheen: 0.6,
        sheen_color: Color::hex(0xff6f7a),
        ..Material::physical("slice-rim", Color::hex(0xe32230))
    });
    let flesh_material = Arc::new(Material {
        roughness: 0.55,
        metalness: 0.05,
        emissive: Color::hex(0xff3246),
        emissive_intensity: 0.2,
        ..Material::standard("slice-flesh", Color::hex(0xff6a7a))
    });
    let seed_material = Arc::new(Material {
        roughness: 0.3,
        metalness: 0.15,
        ..Material::standard("slice-seed", Color::hex(0xffd9a1))
    });

    let face_on = Vec3::new(FRAC_PI_2, 0.0, 0.0);
    let rim_geometry = Arc::new(Geometry::cylinder("slice-rim", 0.21, 0.21, 0.05, 64));
    let rim = graph.add_child(
        root,
        Entity::mesh("slice-rim", &rim_geometry, &rim_material).rotated(face_on),
    );
    let flesh_geometry = Arc::new(Geometry::cylinder("slice-flesh", 0.185, 0.185, 0.045, 64));
    let flesh = graph.add_child(
        root,
        Entity::mesh("slice-flesh", &flesh_geometry, &flesh_material).rotated(face_on),
    );

    let seed_geometry = Arc::new(Geometry::sphere("slice-seed", 0.02, 16, 16));
    let seeds = std::array::from_fn(|i| {
        let angle = i as f32 / SEED_COUNT as f32 * TAU;
        graph.add_child(
            root,
            Entity::mesh(format!("slice-seed-{i}"), &seed_geometry, &seed_material)
                .at(Vec3::new(angle.cos() * 0.09, angle.sin() * 0.01, angle.sin() * 0.09))
                .rotated(face_on),
        )
    });

    SliceRig {
        root,
        rim,
        flesh,
        seeds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_ring_the_center() {
        let mut graph = SceneGraph::new();
        let host = graph.add_root(Entity::group("host"));
        let rig = create_tomato_slice(&mut graph, host);
        for seed in rig.seeds {
            let p = graph.transform(seed).position;
            assert!((Vec3::new(p.x, 0.0, p.z).length() - 0.09).abs() < 1e-6);
        }
        assert_eq!(graph.get(rig.root).children().len(), 2 + SEED_COUNT);
    }

    #[test]
    fn slice_is_flattened_and_visible() {
        let mut graph = SceneGraph::new();
        let host = graph.add_root(Entity::group("host"));
        let rig = create_tomato_slice(&mut graph, host);
        let root = graph.get(rig.root);
        assert!(root.visible);
        assert_eq!(root.transform.scale, Vec3::new(0.85, 0.85, 0.5));
        assert_eq!(graph.transform(rig.rim).rotation.x, FRAC_PI_2);
        assert_eq!(graph.transform(rig.flesh).rotation.x, FRAC_PI_2);
    }
}
