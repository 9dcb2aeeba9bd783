use std::sync::Arc;

use crate::animation::{update_hand, update_tomato, AnimationState};
use crate::clock::TimeSource;
use crate::composer::{Lighting, Vignette};
use crate::environment::{EnvironmentLight, EnvironmentSlot};
use crate::material::Color;
use crate::render::CameraParams;
use crate::report::PoseReport;
use crate::scene::SceneGraph;

/// Everything a renderer needs to draw one frame.
#[derive(Debug)]
pub struct Frame<'a> {
    pub graph: &'a SceneGraph,
    pub camera: CameraParams,
    pub lighting: &'a Lighting,
    pub background: Color,
    pub exposure: f32,
    pub environment: Option<Arc<EnvironmentLight>>,
}

/// Presentation backend driven by [`FrameDriver`].
pub trait SceneRenderer {
    type Error;

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error>;

    /// New output size in physical pixels.
    fn resize(&mut self, width: u32, height: u32);
}

/// Owns the vignette and advances it once per presented frame.
#[derive(Debug)]
pub struct FrameDriver<C> {
    vignette: Vignette,
    state: AnimationState,
    clock: C,
    environment: EnvironmentSlot,
    elapsed: f32,
    frames: u64,
}

impl<C: TimeSource> FrameDriver<C> {
    pub fn new(vignette: Vignette, clock: C, environment: EnvironmentSlot) -> Self {
        Self {
            vignette,
            state: AnimationState::new(),
            clock,
            environment,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Samples the clock and poses the tomato, then the hand.
    pub fn advance(&mut self) -> f32 {
        let t = self.clock.elapsed();
        let Vignette {
            graph, tomato, hand, ..
        } = &mut self.vignette;
        update_tomato(graph, tomato, &mut self.state, t);
        update_hand(graph, hand, t);
        self.elapsed = t;
        self.frames += 1;
        t
    }

    /// Advances the timeline and submits the posed scene.
    pub fn frame<R: SceneRenderer>(&mut self, renderer: &mut R) -> Result<f32, R::Error> {
        let t = self.advance();
        renderer.render(&self.frame_view())?;
        Ok(t)
    }

    /// Re-submits the current pose without advancing time.
    pub fn redraw<R: SceneRenderer>(&self, renderer: &mut R) -> Result<(), R::Error> {
        renderer.render(&self.frame_view())
    }

    pub fn frame_view(&self) -> Frame<'_> {
        Frame {
            graph: &self.vignette.graph,
            camera: self.vignette.camera.params(),
            lighting: &self.vignette.lighting,
            background: self.vignette.background,
            exposure: self.vignette.exposure,
            environment: self.environment.current(),
        }
    }

    /// Applies a viewport resize. Only the camera aspect and the renderer's
    /// output size change; the timeline is not touched.
    pub fn resize<R: SceneRenderer>(&mut self, renderer: &mut R, width: u32, height: u32) {
        self.vignette.camera.set_viewport(width, height);
        renderer.resize(width.max(1), height.max(1));
    }

    pub fn report(&self) -> PoseReport {
        PoseReport::capture(&self.vignette, &self.state, self.elapsed, self.frames)
    }

    pub fn vignette(&self) -> &Vignette {
        &self.vignette
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::clock::FixedStepClock;
    use crate::composer::compose_vignette;

    #[derive(Default)]
    struct RecordingRenderer {
        draws: Vec<usize>,
        sizes: Vec<(u32, u32)>,
        environment_seen: Vec<bool>,
        fail_next: bool,
    }

    impl SceneRenderer for RecordingRenderer {
        type Error = &'static str;

        fn render(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
            if std::mem::take(&mut self.fail_next) {
                return Err("surface lost");
            }
            self.draws.push(frame.graph.draw_list().len());
            self.environment_seen.push(frame.environment.is_some());
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
    }

    /// Replays a fixed list of samples, for exercising the clock clamp.
    struct ScriptedClock(Vec<f32>, crate::clock::MonotonicGuard);

    impl TimeSource for ScriptedClock {
        fn elapsed(&mut self) -> f32 {
            let raw = if self.0.is_empty() { 0.0 } else { self.0.remove(0) };
            self.1.accept(raw)
        }
    }

    fn driver() -> FrameDriver<FixedStepClock> {
        FrameDriver::new(
            compose_vignette(16.0 / 9.0),
            FixedStepClock::per_second(60),
            EnvironmentSlot::new(),
        )
    }

    #[test]
    fn each_frame_advances_and_renders_once() {
        let mut driver = driver();
        let mut renderer = RecordingRenderer::default();
        for _ in 0..3 {
            driver.frame(&mut renderer).expect("render");
        }
        assert_eq!(renderer.draws.len(), 3);
        assert_eq!(driver.frames(), 3);
        assert!((driver.elapsed() - 2.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn render_errors_surface_to_the_caller() {
        let mut driver = driver();
        let mut renderer = RecordingRenderer {
            fail_next: true,
            ..Default::default()
        };
        assert_eq!(driver.frame(&mut renderer), Err("surface lost"));
        assert!(driver.frame(&mut renderer).is_ok());
    }

    #[test]
    fn hidden_slice_drops_out_of_the_draw_list() {
        let mut driver = driver();
        let mut renderer = RecordingRenderer::default();
        driver.frame(&mut renderer).expect("render");
        while driver.elapsed() < 5.0 {
            driver.frame(&mut renderer).expect("render");
        }
        let first = renderer.draws[0];
        let last = renderer.draws[renderer.draws.len() - 1];
        // rim, flesh and six seeds
        assert_eq!(first - last, 8);
    }

    #[test]
    fn resize_only_touches_camera_and_output() {
        let mut driver = driver();
        let mut renderer = RecordingRenderer::default();
        for _ in 0..150 {
            driver.advance();
        }
        let state = *driver.state();
        let elapsed = driver.elapsed();
        let hand = driver.vignette().graph.transform(driver.vignette().hand.root).position;

        driver.resize(&mut renderer, 800, 800);
        driver.resize(&mut renderer, 0, 0);

        assert_eq!(renderer.sizes, vec![(800, 800), (1, 1)]);
        assert_eq!(driver.vignette().camera.aspect, 1.0);
        assert_eq!(*driver.state(), state);
        assert_eq!(driver.elapsed(), elapsed);
        assert_eq!(driver.vignette().graph.transform(driver.vignette().hand.root).position, hand);
    }

    #[test]
    fn environment_is_picked_up_when_published() {
        let slot = EnvironmentSlot::new();
        let mut driver = FrameDriver::new(
            compose_vignette(1.0),
            FixedStepClock::per_second(60),
            slot.clone(),
        );
        let mut renderer = RecordingRenderer::default();
        driver.frame(&mut renderer).expect("render");
        slot.publish(EnvironmentLight {
            sky: Vec3::ONE,
            ground: Vec3::splat(0.5),
        });
        driver.frame(&mut renderer).expect("render");
        assert_eq!(renderer.environment_seen, vec![false, true]);
    }

    #[test]
    fn broken_clock_samples_do_not_rewind_the_timeline() {
        let clock = ScriptedClock(vec![3.0, f32::NAN, 1.0, 3.5], Default::default());
        let mut driver = FrameDriver::new(compose_vignette(1.0), clock, EnvironmentSlot::new());
        let samples: Vec<f32> = (0..4).map(|_| driver.advance()).collect();
        assert_eq!(samples, vec![3.0, 3.0, 3.0, 3.5]);
        assert_eq!(driver.state().chewing_start(), Some(3.0));
    }
}
