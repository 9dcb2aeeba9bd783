//! Per-frame pose evaluation for the tomato and the hand.
//!
//! Every pose is a pure function of elapsed time except the chewing latch,
//! which records the first time the chewing window was entered and is never
//! cleared. Outside the window the mouth is put back to its rest pose on every
//! call rather than once on exit.

use glam::Vec3;
use log::debug;
use serde::Serialize;

use crate::scene::SceneGraph;
use crate::shapes::{
    FaceRig, HandRig, TomatoRig, FACE_REST_Z, SLICE_REST, SLICE_REST_YAW, SMILE_LIFT_REST_Y,
    TEETH_REST_Y, TONGUE_REST_Y,
};

pub const CHEW_WINDOW_START: f32 = 2.0;
pub const CHEW_WINDOW_END: f32 = 5.0;
/// Seconds the hand takes to reach its target.
pub const APPROACH_SECONDS: f32 = 2.0;
/// Seconds after the hand arrives at which the slice stops moving.
pub const SLICE_TRAVEL_LIMIT: f32 = 3.0;
/// Travel time after which the slice disappears for good.
pub const SLICE_HIDE_AFTER: f32 = 2.8;

const SLICE_BITE_Z: f32 = -0.12;

/// Cross-frame memory of the timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnimationState {
    chewing_start: Option<f32>,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chewing_start(&self) -> Option<f32> {
        self.chewing_start
    }

    fn latch_chewing(&mut self, t: f32) -> f32 {
        *self.chewing_start.get_or_insert(t)
    }
}

pub fn ease_out_cubic(p: f32) -> f32 {
    1.0 - (1.0 - p).powi(3)
}

pub fn in_chew_window(t: f32) -> bool {
    (CHEW_WINDOW_START..=CHEW_WINDOW_END).contains(&t)
}

/// Mouth oscillation `ce` seconds into chewing.
pub fn chew_wave(ce: f32) -> f32 {
    (ce * 3.2).sin() * 0.35
}

pub fn update_tomato(graph: &mut SceneGraph, rig: &TomatoRig, state: &mut AnimationState, t: f32) {
    {
        let root = graph.transform_mut(rig.root);
        root.position.y = 0.12 + (t * 1.5).sin() * 0.02;
        root.rotation.y = (t * 0.8).sin() * 0.05;
    }

    if in_chew_window(t) {
        let start = state.latch_chewing(t);
        pose_chewing(graph, &rig.face, chew_wave(t - start));
    } else {
        pose_mouth_neutral(graph, &rig.face);
    }

    let face = graph.transform_mut(rig.face.root);
    face.rotation.y = (t * 0.5).sin() * 0.02;
    face.position.z = FACE_REST_Z + (t * 0.8).sin() * 0.01;
}

fn pose_chewing(graph: &mut SceneGraph, face: &FaceRig, wave: f32) {
    {
        let mouth = graph.transform_mut(face.inner_mouth);
        mouth.scale.y = 1.0 + wave * 0.35;
        mouth.scale.z = 1.0 + wave * 0.3;
    }
    {
        let tongue = graph.transform_mut(face.tongue);
        tongue.position.y = TONGUE_REST_Y + (wave * 0.08).max(-0.04);
        tongue.rotation.x = -wave * 0.3;
    }
    {
        let lips = graph.transform_mut(face.lips);
        lips.scale.y = 1.0 + wave * 0.15;
        lips.rotation.z = wave * 0.08;
    }
    graph.transform_mut(face.teeth).position.y = TEETH_REST_Y + wave * 0.06;

    let lift_y = SMILE_LIFT_REST_Y + wave * 0.04;
    let lift_roll = 0.45 + wave * 0.2;
    for (id, roll) in [(face.smile_lift_left, lift_roll), (face.smile_lift_right, -lift_roll)] {
        let lift = graph.transform_mut(id);
        lift.position.y = lift_y;
        lift.rotation.z = roll;
    }
}

fn pose_mouth_neutral(graph: &mut SceneGraph, face: &FaceRig) {
    graph.transform_mut(face.inner_mouth).scale = Vec3::ONE;
    {
        let tongue = graph.transform_mut(face.tongue);
        tongue.position.y = TONGUE_REST_Y;
        tongue.rotation.x = 0.0;
    }
    {
        let lips = graph.transform_mut(face.lips);
        lips.scale = Vec3::ONE;
        lips.rotation.z = 0.0;
    }
    graph.transform_mut(face.teeth).position.y = TEETH_REST_Y;
    for id in [face.smile_lift_left, face.smile_lift_right] {
        let lift = graph.transform_mut(id);
        lift.position.y = SMILE_LIFT_REST_Y;
        lift.rotation.z = 0.0;
    }
}

/// Whether every animated mouth channel sits at its rest value.
pub fn mouth_is_neutral(graph: &SceneGraph, face: &FaceRig) -> bool {
    let tongue = graph.transform(face.tongue);
    let lips = graph.transform(face.lips);
    let lifts_at_rest = [face.smile_lift_left, face.smile_lift_right].iter().all(|&id| {
        let lift = graph.transform(id);
        lift.position.y == SMILE_LIFT_REST_Y && lift.rotation.z == 0.0
    });

    graph.transform(face.inner_mouth).scale == Vec3::ONE
        && tongue.position.y == TONGUE_REST_Y
        && tongue.rotation.x == 0.0
        && lips.scale == Vec3::ONE
        && lips.rotation.z == 0.0
        && graph.transform(face.teeth).position.y == TEETH_REST_Y
        && lifts_at_rest
}

pub fn update_hand(graph: &mut SceneGraph, rig: &HandRig, t: f32) {
    let eased = ease_out_cubic((t / APPROACH_SECONDS).clamp(0.0, 1.0));

    {
        let hand = graph.transform_mut(rig.root);
        hand.position = rig.start_position.lerp(rig.target_position, eased);
        hand.rotation.y = -0.4 + eased * 0.45;
        hand.rotation.x = 0.08 - eased * 0.22;
        hand.rotation.z = -0.25 + eased * 0.18;
    }
    {
        let fork = graph.transform_mut(rig.fork.root);
        fork.rotation.x = 0.25 + eased * 0.4;
        fork.rotation.y = 0.28 - eased * 0.35;
    }

    if t < APPROACH_SECONDS {
        let slice = graph.transform_mut(rig.slice.root);
        slice.position = SLICE_REST;
        slice.rotation.y = SLICE_REST_YAW + (t * 2.5).sin() * 0.25;
        return;
    }

    let travel = (t - APPROACH_SECONDS).min(SLICE_TRAVEL_LIMIT);
    {
        let slice = graph.transform_mut(rig.slice.root);
        slice.position = Vec3::new(0.65 - travel * 0.35, 0.0, SLICE_BITE_Z);
        slice.rotation = Vec3::new(0.6, 0.2, (travel * 3.0).sin() * 0.3);
    }
    if travel >= SLICE_HIDE_AFTER {
        let slice = graph.get_mut(rig.slice.root);
        if slice.visible {
            debug!("slice eaten at t={t:.3}");
            slice.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{compose_vignette, Vignette};

    const EPS: f32 = 1e-6;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= EPS
    }

    fn vignette() -> (Vignette, AnimationState) {
        (compose_vignette(1.0), AnimationState::new())
    }

    fn tick(v: &mut Vignette, state: &mut AnimationState, t: f32) {
        update_tomato(&mut v.graph, &v.tomato, state, t);
        update_hand(&mut v.graph, &v.hand, t);
    }

    #[test]
    fn ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(approx(ease_out_cubic(0.5), 0.875));
    }

    #[test]
    fn chew_window_is_closed_at_both_ends() {
        assert!(!in_chew_window(1.999));
        assert!(in_chew_window(2.0));
        assert!(in_chew_window(5.0));
        assert!(!in_chew_window(5.001));
    }

    #[test]
    fn tomato_bobs_for_all_times() {
        let (mut v, mut state) = vignette();
        for step in 0..400 {
            let t = step as f32 * 0.025;
            update_tomato(&mut v.graph, &v.tomato, &mut state, t);
            let y = v.graph.transform(v.tomato.root).position.y;
            assert!(approx(y, 0.12 + 0.02 * (1.5 * t).sin()), "t={t}");
        }
    }

    #[test]
    fn chewing_latch_sets_once_to_first_sample() {
        let (mut v, mut state) = vignette();
        for t in [0.5, 1.9, 2.05, 2.5, 4.0, 5.0, 5.5, 7.0] {
            update_tomato(&mut v.graph, &v.tomato, &mut state, t);
            if t < 2.0 {
                assert_eq!(state.chewing_start(), None);
            } else {
                assert_eq!(state.chewing_start(), Some(2.05));
            }
        }
    }

    #[test]
    fn mouth_is_neutral_outside_window() {
        let (mut v, mut state) = vignette();
        for t in [0.0, 1.0, 1.99, 3.1, 5.01, 6.0, 20.0] {
            update_tomato(&mut v.graph, &v.tomato, &mut state, t);
            assert_eq!(mouth_is_neutral(&v.graph, &v.tomato.face), !in_chew_window(t), "t={t}");
        }
    }

    #[test]
    fn chewing_follows_the_wave() {
        let (mut v, mut state) = vignette();
        update_tomato(&mut v.graph, &v.tomato, &mut state, 2.0);
        update_tomato(&mut v.graph, &v.tomato, &mut state, 3.0);
        let wave = chew_wave(1.0);
        let face = &v.tomato.face;
        let g = &v.graph;
        assert!(approx(g.transform(face.inner_mouth).scale.y, 1.0 + wave * 0.35));
        assert!(approx(g.transform(face.inner_mouth).scale.z, 1.0 + wave * 0.3));
        assert!(approx(
            g.transform(face.tongue).position.y,
            -0.26 + (wave * 0.08).max(-0.04)
        ));
        assert!(approx(g.transform(face.tongue).rotation.x, -0.3 * wave));
        assert!(approx(g.transform(face.lips).scale.y, 1.0 + 0.15 * wave));
        assert!(approx(g.transform(face.lips).rotation.z, 0.08 * wave));
        assert!(approx(g.transform(face.teeth).position.y, -0.14 + 0.06 * wave));
        let left = g.transform(face.smile_lift_left);
        let right = g.transform(face.smile_lift_right);
        assert!(approx(left.position.y, -0.18 + 0.04 * wave));
        assert_eq!(left.position.y, right.position.y);
        assert!(approx(left.rotation.z, 0.45 + 0.2 * wave));
        assert_eq!(right.rotation.z, -left.rotation.z);
    }

    #[test]
    fn tongue_dips_at_wave_trough() {
        let (mut v, mut state) = vignette();
        update_tomato(&mut v.graph, &v.tomato, &mut state, 2.0);
        // sin(3.2 * ce) = -1 at ce = 3π/6.4
        let t = 2.0 + 3.0 * std::f32::consts::PI / 6.4;
        update_tomato(&mut v.graph, &v.tomato, &mut state, t);
        let y = v.graph.transform(v.tomato.face.tongue).position.y;
        assert!((y - (-0.26 - 0.35 * 0.08)).abs() < 1e-5);
        assert!(y >= TONGUE_REST_Y - 0.04);
    }

    #[test]
    fn hand_starts_and_ends_at_its_endpoints() {
        let (mut v, _) = vignette();
        update_hand(&mut v.graph, &v.hand, 0.0);
        assert_eq!(v.graph.transform(v.hand.root).position, v.hand.start_position);
        for t in [2.0, 3.0, 10.0] {
            update_hand(&mut v.graph, &v.hand, t);
            let position = v.graph.transform(v.hand.root).position;
            assert!(position.abs_diff_eq(v.hand.target_position, EPS), "t={t}");
        }
    }

    #[test]
    fn hand_approach_never_backs_off() {
        let (mut v, _) = vignette();
        let target = v.hand.target_position;
        let mut previous = (v.hand.start_position - target).abs();
        for step in 0..=200 {
            let t = step as f32 * 0.01;
            update_hand(&mut v.graph, &v.hand, t);
            let distance = (v.graph.transform(v.hand.root).position - target).abs();
            assert!(distance.cmple(previous + Vec3::splat(EPS)).all(), "t={t}");
            previous = distance;
        }
    }

    #[test]
    fn hand_and_fork_rotations_blend_with_easing() {
        let (mut v, _) = vignette();
        update_hand(&mut v.graph, &v.hand, 1.0);
        let e = 0.875;
        let hand = v.graph.transform(v.hand.root).rotation;
        assert!(approx(hand.x, 0.08 - 0.22 * e));
        assert!(approx(hand.y, -0.4 + 0.45 * e));
        assert!(approx(hand.z, -0.25 + 0.18 * e));
        let fork = v.graph.transform(v.hand.fork.root).rotation;
        assert!(approx(fork.x, 0.25 + 0.4 * e));
        assert!(approx(fork.y, 0.28 - 0.35 * e));
        assert_eq!(fork.z, 0.05);
    }

    #[test]
    fn slice_wiggles_while_carried() {
        let (mut v, _) = vignette();
        update_hand(&mut v.graph, &v.hand, 1.5);
        let slice = v.graph.transform(v.hand.slice.root);
        assert_eq!(slice.position, SLICE_REST);
        assert!(approx(slice.rotation.y, 0.2 + 0.25 * (2.5f32 * 1.5).sin()));
    }

    #[test]
    fn slice_travels_then_stops() {
        let (mut v, _) = vignette();
        update_hand(&mut v.graph, &v.hand, 3.0);
        let slice = *v.graph.transform(v.hand.slice.root);
        assert!(approx(slice.position.x, 0.30));
        assert_eq!(slice.position.z, -0.12);
        assert!(approx(slice.rotation.z, 0.3 * 3f32.sin()));

        update_hand(&mut v.graph, &v.hand, 9.0);
        let stopped = v.graph.transform(v.hand.slice.root).position.x;
        assert!(approx(stopped, 0.65 - 0.35 * 3.0));
    }

    #[test]
    fn slice_hides_once_and_stays_hidden() {
        let (mut v, _) = vignette();
        for step in 0..=800 {
            let t = step as f32 * 0.01;
            update_hand(&mut v.graph, &v.hand, t);
            let visible = v.graph.get(v.hand.slice.root).visible;
            let hidden_expected = t >= 2.0 && (t - 2.0).min(3.0) >= 2.8;
            assert_eq!(visible, !hidden_expected, "t={t}");
        }
        update_hand(&mut v.graph, &v.hand, 0.5);
        assert!(!v.graph.get(v.hand.slice.root).visible);
    }

    #[test]
    fn mirrored_pairs_stay_symmetric_over_time() {
        let (mut v, mut state) = vignette();
        for step in 0..120 {
            let t = step as f32 * 0.05;
            tick(&mut v, &mut state, t);
            let mut pairs = v.tomato.face.mirrored_pairs().to_vec();
            pairs.push((v.tomato.blush_left, v.tomato.blush_right));
            for (left, right) in pairs {
                let l = v.graph.transform(left).position;
                let r = v.graph.transform(right).position;
                assert_eq!(r.x, -l.x, "t={t}");
            }
        }
    }

    #[test]
    fn end_to_end_scenario() {
        let (mut v, mut state) = vignette();

        tick(&mut v, &mut state, 0.0);
        assert_eq!(v.graph.transform(v.hand.root).position, v.hand.start_position);
        assert!(v.graph.get(v.hand.slice.root).visible);
        assert!(mouth_is_neutral(&v.graph, &v.tomato.face));

        tick(&mut v, &mut state, 1.0);
        assert!(mouth_is_neutral(&v.graph, &v.tomato.face));
        let expected = v.hand.start_position.lerp(v.hand.target_position, 0.875);
        assert!(v.graph.transform(v.hand.root).position.abs_diff_eq(expected, EPS));

        tick(&mut v, &mut state, 3.0);
        assert_eq!(state.chewing_start(), Some(3.0));
        let wave = chew_wave(0.0);
        assert!(approx(v.graph.transform(v.tomato.face.teeth).position.y, -0.14 + 0.06 * wave));
        assert!(approx(v.graph.transform(v.hand.slice.root).position.x, 0.30));

        tick(&mut v, &mut state, 5.5);
        assert!(!v.graph.get(v.hand.slice.root).visible);
        assert!(mouth_is_neutral(&v.graph, &v.tomato.face));
    }

    #[test]
    fn face_sways_around_rest_depth() {
        let (mut v, mut state) = vignette();
        update_tomato(&mut v.graph, &v.tomato, &mut state, 1.3);
        let face = v.graph.transform(v.tomato.face.root);
        assert!(approx(face.position.z, 0.86 + 0.01 * (0.8f32 * 1.3).sin()));
        assert!(approx(face.rotation.y, 0.02 * (0.5f32 * 1.3).sin()));
    }
}
