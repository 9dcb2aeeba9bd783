use std::sync::Arc;

use parking_lot::RwLock;

use crate::composer::pixel_ratio;

/// Reports the logical size of the surface the vignette is drawn into.
pub trait ViewportProvider: Send + Sync {
    fn viewport_size(&self) -> (u32, u32);

    fn aspect(&self) -> f32 {
        let (width, height) = self.viewport_size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}

/// A logical size that never changes. The binary uses one as its default
/// window size and as the framing of headless runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticViewport {
    pub width: u32,
    pub height: u32,
}

impl StaticViewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ViewportProvider for StaticViewport {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl<T> ViewportProvider for Arc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }
}

/// Window-backed viewport, updated from the event loop on resize.
///
/// Stores the logical size and the host scale factor; the physical render
/// target size applies the capped pixel ratio.
#[derive(Debug)]
pub struct WindowViewport {
    state: RwLock<ViewportState>,
}

#[derive(Debug, Clone, Copy)]
struct ViewportState {
    width: u32,
    height: u32,
    scale_factor: f64,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            state: RwLock::new(ViewportState {
                width: width.max(1),
                height: height.max(1),
                scale_factor,
            }),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        let mut state = self.state.write();
        state.width = width.max(1);
        state.height = height.max(1);
    }

    pub fn set_scale_factor(&self, scale_factor: f64) {
        self.state.write().scale_factor = scale_factor;
    }

    pub fn pixel_ratio(&self) -> f64 {
        pixel_ratio(self.state.read().scale_factor)
    }

    /// Size in physical pixels of the render target.
    pub fn render_size(&self) -> (u32, u32) {
        let state = *self.state.read();
        let ratio = pixel_ratio(state.scale_factor);
        let scale = |logical: u32| ((f64::from(logical) * ratio).round() as u32).max(1);
        (scale(state.width), scale(state.height))
    }
}

impl ViewportProvider for WindowViewport {
    fn viewport_size(&self) -> (u32, u32) {
        let state = self.state.read();
        (state.width, state.height)
    }
}
