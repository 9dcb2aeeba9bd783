//! Background loading of the studio lighting environment.
//!
//! The HDR image is fetched and decoded off the frame thread, reduced to a
//! sky/ground radiance pair and published into an [`EnvironmentSlot`]. The
//! renderer reads the slot every frame; until something is published (or if
//! loading fails) the slot stays empty and the scene is lit by the analytic
//! rig alone.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use glam::Vec3;
use image::{ImageFormat, Rgb32FImage};
use log::{info, warn};
use parking_lot::RwLock;
use thiserror::Error;

pub const STUDIO_HDR_URL: &str =
    "https://storage.googleapis.com/learnjs-data/agent-env/studio_small_09_1k.hdr";

pub type Result<T> = std::result::Result<T, EnvironmentError>;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HDR decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("environment image has no pixels")]
    Empty,
}

/// Mean radiance of the environment seen from above and from below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentLight {
    pub sky: Vec3,
    pub ground: Vec3,
}

impl EnvironmentLight {
    /// Averages the upper half of an equirectangular image into `sky` and the
    /// lower half into `ground`. Non-finite texels are skipped.
    pub fn from_equirect(image: &Rgb32FImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EnvironmentError::Empty);
        }

        let horizon = height.div_ceil(2);
        let mut sums = [(Vec3::ZERO, 0u32); 2];
        for (_, y, pixel) in image.enumerate_pixels() {
            let texel = Vec3::from_array(pixel.0);
            if !texel.is_finite() {
                continue;
            }
            let bucket = &mut sums[usize::from(y >= horizon)];
            bucket.0 += texel;
            bucket.1 += 1;
        }

        let mean = |(sum, count): (Vec3, u32)| {
            if count == 0 {
                Vec3::ZERO
            } else {
                sum / count as f32
            }
        };
        let sky = mean(sums[0]);
        // a single-row image has no lower half
        let ground = if sums[1].1 == 0 { sky } else { mean(sums[1]) };
        Ok(Self { sky, ground })
    }
}

/// Shared handle to the most recently published environment.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSlot {
    current: Arc<RwLock<Option<Arc<EnvironmentLight>>>>,
}

impl EnvironmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, light: EnvironmentLight) {
        *self.current.write() = Some(Arc::new(light));
    }

    pub fn current(&self) -> Option<Arc<EnvironmentLight>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn fetch_bytes(source: &str) -> Result<Vec<u8>> {
    if is_remote(source) {
        let http = |err: reqwest::Error| EnvironmentError::Http {
            url: source.to_string(),
            source: err,
        };
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("tomato-feast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(http)?;
        let response = client.get(source).send().map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnvironmentError::Status {
                url: source.to_string(),
                status: status.as_u16(),
            });
        }
        return Ok(response.bytes().map_err(http)?.to_vec());
    }

    let path = PathBuf::from(source.strip_prefix("file://").unwrap_or(source));
    fs::read(&path).map_err(|source| EnvironmentError::Io { path, source })
}

/// Fetches, decodes and reduces the environment at `source` (URL or path).
pub fn load_environment(source: &str) -> Result<EnvironmentLight> {
    let bytes = fetch_bytes(source)?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Hdr)?.into_rgb32f();
    EnvironmentLight::from_equirect(&image)
}

/// Loads `source` on a background thread and publishes the result into
/// `slot`. Failures are logged and leave the slot untouched.
pub fn spawn_environment_load(source: impl Into<String>, slot: EnvironmentSlot) -> JoinHandle<()> {
    let source = source.into();
    thread::spawn(move || match load_environment(&source) {
        Ok(light) => {
            info!(
                "Environment loaded from {source} (sky {:.3?}, ground {:.3?})",
                light.sky.to_array(),
                light.ground.to_array()
            );
            slot.publish(light);
        }
        Err(err) => warn!("Environment unavailable, using analytic lights only: {err}"),
    })
}
