use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::Vec3;

use crate::geometry::Geometry;
use crate::material::{Color, Material};
use crate::scene::{Entity, EntityId, SceneGraph};

use super::slice::{create_tomato_slice, SliceRig};

/// Where the hand waits before the approach starts.
pub const HAND_START: Vec3 = Vec3::new(-2.4, -0.1, 0.55);
/// Where the hand comes to rest in front of the mouth.
pub const HAND_TARGET: Vec3 = Vec3::new(-0.3, -0.05, 0.32);

pub(crate) const SLICE_REST: Vec3 = Vec3::new(0.95, 0.0, 0.0);
pub(crate) const SLICE_REST_YAW: f32 = 0.2;

const FINGER_OFFSETS: [f32; 3] = [-0.1, 0.05, 0.18];
const PRONG_COUNT: usize = 4;

/// Handles into the hand, the fork it holds and the slice on the fork.
#[derive(Debug, Clone)]
pub struct HandRig {
    pub root: EntityId,
    pub palm: EntityId,
    pub fingers: [EntityId; 3],
    pub thumb: EntityId,
    pub fork: ForkRig,
    pub slice: SliceRig,
    pub start_position: Vec3,
    pub target_position: Vec3,
}

#[derive(Debug, Clone)]
pub struct ForkRig {
    pub root: EntityId,
    pub handle: EntityId,
    pub head: EntityId,
    pub prongs: [EntityId; PRONG_COUNT],
}

/// Builds the hand with fork and carried slice as a new root at [`HAND_START`].
pub fn create_hand_with_fork(graph: &mut SceneGraph) -> HandRig {
    let root = graph.add_root(
        Entity::group("hand")
            .at(HAND_START)
            .rotated(Vec3::new(0.08, -0.4, -0.25)),
    );

    let skin = Arc::new(Material {
        roughness: 0.6,
        metalness: 0.05,
        clearcoat: 0.1,
        sheen: 0.15,
        sheen_color: Color::hex(0xffe2c9),
        ..Material::physical("skin", Color::hex(0xffc9a5))
    });

    let palm_geometry = Arc::new(Geometry::cuboid("palm", 0.62, 0.18, 0.4));
    let palm = graph.add_child(
        root,
        Entity::mesh("palm", &palm_geometry, &skin).rotated(Vec3::new(0.0, 0.0, PI / 48.0)),
    );

    let finger_geometry = Arc::new(Geometry::cuboid("finger", 0.48, 0.08, 0.16));
    let fingers = std::array::from_fn(|i| {
        let step = i as f32;
        graph.add_child(
            root,
            Entity::mesh(format!("finger-{i}"), &finger_geometry, &skin)
                .at(Vec3::new(0.34, FINGER_OFFSETS[i], 0.12 - step * 0.08))
                .rotated(Vec3::new(0.0, -0.2 + step * 0.08, 0.0))
                .scaled(Vec3::new(1.0, 1.0, 0.6 + step * 0.1)),
        )
    });

    let thumb_geometry = Arc::new(Geometry::cuboid("thumb", 0.26, 0.09, 0.14));
    let thumb = graph.add_child(
        root,
        Entity::mesh("thumb", &thumb_geometry, &skin)
            .at(Vec3::new(-0.22, -0.1, 0.2))
            .rotated(Vec3::new(0.35, 0.35, -0.5)),
    );

    let fork = create_fork(graph, root);
    let slice = create_tomato_slice(graph, fork.root);
    {
        let transform = graph.transform_mut(slice.root);
        transform.position = SLICE_REST;
        transform.rotation = Vec3::new(0.0, SLICE_REST_YAW, 0.0);
    }

    HandRig {
        root,
        palm,
        fingers,
        thumb,
        fork,
        slice,
        start_position: HAND_START,
        target_position: HAND_TARGET,
    }
}

fn create_fork(graph: &mut SceneGraph, parent: EntityId) -> ForkRig {
    let root = graph.add_child(
        parent,
        Entity::group("fork")
            .at(Vec3::new(0.46, 0.01, 0.02))
            .rotated(Vec3::new(0.0, 0.28, 0.05)),
    );

    let handle_geometry = Arc::new(Geometry::cylinder("fork-handle", 0.035, 0.045, 1.45, 24));
    let handle_material = Arc::new(Material {
        roughness: 0.15,
        metalness: 0.9,
        env_map_intensity: 1.5,
        ..Material::physical("fork-handle", Color::hex(0xd5d8e1))
    });
    let handle = graph.add_child(
        root,
        Entity::mesh("fork-handle", &handle_geometry, &handle_material)
            .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
    );

    let steel = Arc::new(Material {
        metalness: 0.95,
        roughness: 0.12,
        ..Material::physical("fork-head", Color::hex(0xe6e7ef))
    });
    let head_geometry = Arc::new(Geometry::cuboid("fork-head", 0.55, 0.08, 0.14));
    let head = graph.add_child(
        root,
        Entity::mesh("fork-head", &head_geometry, &steel).at(Vec3::new(0.74, 0.0, 0.0)),
    );

    let prong_geometry = Arc::new(Geometry::cuboid("fork-prong", 0.32, 0.025, 0.04));
    let prongs = std::array::from_fn(|i| {
        let step = i as f32;
        graph.add_child(
            root,
            Entity::mesh(format!("fork-prong-{i}"), &prong_geometry, &steel)
                .at(Vec3::new(0.9, 0.038 - step * 0.026, 0.05 - step * 0.03)),
        )
    });

    ForkRig {
        root,
        handle,
        head,
        prongs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_starts_at_start_point() {
        let mut graph = SceneGraph::new();
        let rig = create_hand_with_fork(&mut graph);
        assert_eq!(graph.transform(rig.root).position, HAND_START);
        assert_eq!(rig.start_position, HAND_START);
        assert_eq!(rig.target_position, HAND_TARGET);
    }

    #[test]
    fn slice_hangs_off_the_fork() {
        let mut graph = SceneGraph::new();
        let rig = create_hand_with_fork(&mut graph);
        assert_eq!(graph.get(rig.slice.root).parent(), Some(rig.fork.root));
        assert_eq!(graph.get(rig.fork.root).parent(), Some(rig.root));
        assert_eq!(graph.transform(rig.slice.root).position, SLICE_REST);
        assert!(graph.get(rig.slice.root).visible);
    }

    #[test]
    fn fingers_step_back_and_widen() {
        let mut graph = SceneGraph::new();
        let rig = create_hand_with_fork(&mut graph);
        let depths: Vec<f32> = rig
            .fingers
            .iter()
            .map(|&f| graph.transform(f).position.z)
            .collect();
        assert!(depths.windows(2).all(|w| w[1] < w[0]));
        let widths: Vec<f32> = rig.fingers.iter().map(|&f| graph.transform(f).scale.z).collect();
        assert!(widths.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn prongs_share_head_material() {
        let mut graph = SceneGraph::new();
        let rig = create_hand_with_fork(&mut graph);
        let head = graph.get(rig.fork.head).visual.as_ref().map(|v| Arc::clone(&v.material));
        for prong in rig.fork.prongs {
            let material = graph.get(prong).visual.as_ref().map(|v| Arc::clone(&v.material));
            match (&head, material) {
                (Some(h), Some(m)) => assert!(Arc::ptr_eq(h, &m)),
                _ => panic!("fork parts must carry visuals"),
            }
        }
    }
}
