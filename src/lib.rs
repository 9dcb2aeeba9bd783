//! A procedurally built, animated vignette: a tomato character being fed a
//! slice of tomato by a hand holding a fork.
//!
//! The crate is split the same way a frame flows. [`shapes`] builds the
//! characters into a [`scene::SceneGraph`], [`composer`] adds camera and
//! lights, [`animation`] poses everything from elapsed time and [`driver`]
//! ties the timeline to a [`driver::SceneRenderer`]. Everything except
//! [`render`] runs without a window or GPU, which keeps it testable headless.

pub mod animation;
pub mod clock;
pub mod composer;
pub mod driver;
pub mod environment;
pub mod geometry;
pub mod material;
pub mod render;
pub mod report;
pub mod scene;
pub mod shapes;
pub mod viewport;

pub use animation::{ease_out_cubic, update_hand, update_tomato, AnimationState};
pub use clock::{ElapsedClock, FixedStepClock, TimeSource};
pub use composer::{compose_vignette, Lighting, PerspectiveCamera, Vignette};
pub use driver::{Frame, FrameDriver, SceneRenderer};
pub use environment::{
    spawn_environment_load, EnvironmentError, EnvironmentLight, EnvironmentSlot, STUDIO_HDR_URL,
};
pub use render::{CameraParams, Renderer};
pub use report::PoseReport;
pub use scene::{Entity, EntityId, SceneGraph, Transform};
pub use viewport::{StaticViewport, ViewportProvider, WindowViewport};
