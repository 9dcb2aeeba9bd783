use std::fmt;

use serde::Serialize;

use crate::animation::{mouth_is_neutral, AnimationState};
use crate::composer::Vignette;
use crate::scene::Transform;

/// Snapshot of the animated channels, printed by the headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseReport {
    pub elapsed: f32,
    pub frames: u64,
    pub chewing_start: Option<f32>,
    pub mouth_neutral: bool,
    pub tomato: Transform,
    pub face: Transform,
    pub hand: Transform,
    pub fork: Transform,
    pub slice: Transform,
    pub slice_visible: bool,
}

impl PoseReport {
    pub fn capture(vignette: &Vignette, state: &AnimationState, elapsed: f32, frames: u64) -> Self {
        let graph = &vignette.graph;
        Self {
            elapsed,
            frames,
            chewing_start: state.chewing_start(),
            mouth_neutral: mouth_is_neutral(graph, &vignette.tomato.face),
            tomato: *graph.transform(vignette.tomato.root),
            face: *graph.transform(vignette.tomato.face.root),
            hand: *graph.transform(vignette.hand.root),
            fork: *graph.transform(vignette.hand.fork.root),
            slice: *graph.transform(vignette.hand.slice.root),
            slice_visible: graph.is_effectively_visible(vignette.hand.slice.root),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn write_transform(f: &mut fmt::Formatter<'_>, name: &str, transform: &Transform) -> fmt::Result {
    let p = transform.position;
    let r = transform.rotation;
    write!(
        f,
        " - {name} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2})",
        p.x, p.y, p.z, r.x, r.y, r.z
    )
}

impl fmt::Display for PoseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final pose at t={:.2}s after {} frame(s):", self.elapsed, self.frames)?;
        match self.chewing_start {
            Some(start) => writeln!(f, " - chewing start: {start:.2}")?,
            None => writeln!(f, " - chewing start: not yet")?,
        }
        writeln!(
            f,
            " - mouth: {}",
            if self.mouth_neutral { "neutral" } else { "chewing" }
        )?;
        write_transform(f, "tomato", &self.tomato)?;
        writeln!(f)?;
        write_transform(f, "face", &self.face)?;
        writeln!(f)?;
        write_transform(f, "hand", &self.hand)?;
        writeln!(f)?;
        write_transform(f, "fork", &self.fork)?;
        writeln!(f)?;
        write_transform(f, "slice", &self.slice)?;
        write!(f, " visible={}", self.slice_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::compose_vignette;

    #[test]
    fn fresh_vignette_reports_rest_pose() {
        let vignette = compose_vignette(1.0);
        let report = PoseReport::capture(&vignette, &AnimationState::new(), 0.0, 0);
        assert!(report.mouth_neutral);
        assert!(report.slice_visible);
        assert_eq!(report.chewing_start, None);
        assert_eq!(report.hand.position, vignette.hand.start_position);

        let text = report.to_string();
        assert!(text.contains("chewing start: not yet"));
        assert!(text.contains("mouth: neutral"));
        assert!(text.ends_with("visible=true"));
    }

    #[test]
    fn slice_counts_as_hidden_when_an_ancestor_is() {
        let mut vignette = compose_vignette(1.0);
        vignette.graph.get_mut(vignette.hand.fork.root).visible = false;
        let report = PoseReport::capture(&vignette, &AnimationState::new(), 0.0, 0);
        assert!(vignette.graph.get(vignette.hand.slice.root).visible);
        assert!(!report.slice_visible);
    }

    #[test]
    fn json_uses_field_names() {
        let vignette = compose_vignette(1.0);
        let report = PoseReport::capture(&vignette, &AnimationState::new(), 1.5, 90);
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("serialize")).expect("parse");
        assert_eq!(value["frames"], 90);
        assert_eq!(value["slice_visible"], true);
        assert!(value["chewing_start"].is_null());
        assert_eq!(value["tomato"]["position"].as_array().map(Vec::len), Some(3));
    }
}
