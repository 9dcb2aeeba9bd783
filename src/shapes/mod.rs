//! Constructors for the composite characters of the vignette.
//!
//! Each constructor inserts a fresh subtree into the graph and returns a rig:
//! plain entity handles for the parts the timeline animates later. Nothing
//! here can fail and nothing reads outside state, so building a rig twice
//! yields two independent copies with identical transforms and materials.

mod face;
mod hand;
mod slice;
mod tomato;

use crate::scene::{EntityId, SceneGraph};

pub use face::{create_face, FaceRig};
pub use hand::{create_hand_with_fork, ForkRig, HandRig, HAND_START, HAND_TARGET};
pub use slice::{create_tomato_slice, SliceRig};
pub use tomato::{create_stem, create_tomato, StemRig, TomatoRig};

pub(crate) use face::{FACE_REST_Z, SMILE_LIFT_REST_Y, TEETH_REST_Y, TONGUE_REST_Y};
pub(crate) use hand::{SLICE_REST, SLICE_REST_YAW};

/// Copies `source` next to itself with its lateral offset negated.
///
/// Every right-hand part is produced this way from its left counterpart so
/// the pair stays symmetric whatever the left literal is.
pub fn mirror_x(graph: &mut SceneGraph, source: EntityId) -> EntityId {
    let mirrored = graph.duplicate(source);
    let transform = graph.transform_mut(mirrored);
    transform.position.x = -transform.position.x;
    mirrored
}

/// [`mirror_x`], naming the copy `name`.
pub(crate) fn mirror_named(graph: &mut SceneGraph, left: EntityId, name: &str) -> EntityId {
    let right = mirror_x(graph, left);
    graph.get_mut(right).name = name.to_string();
    right
}
