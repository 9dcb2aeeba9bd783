use std::any::Any;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use tomato_feast::{
    compose_vignette, spawn_environment_load, ElapsedClock, EnvironmentSlot, FixedStepClock,
    FrameDriver, PoseReport, Renderer, StaticViewport, ViewportProvider, WindowViewport,
    STUDIO_HDR_URL,
};

const USAGE: &str = "Usage: tomato-feast [--summary-only] [--until <seconds>] [--json]";
/// Initial window size, and the frame a headless run composes for.
const DEFAULT_VIEWPORT: StaticViewport = StaticViewport::new(1280, 720);

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;

    if options.summary_only {
        run_headless(&options)
    } else {
        match run_interactive(&options) {
            Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
                eprintln!(
                    "{err}. Falling back to --summary-only mode \
                     (set DISPLAY or install a GPU driver to enable rendering)."
                );
                run_headless(&options)
            }
            other => other,
        }
    }
}

fn run_headless(options: &CliOptions) -> Result<()> {
    let driver = play_headless(options.until);
    print_report(&driver.report(), options.json)
}

/// Plays the timeline at 60 Hz until the first frame at or past `until`.
fn play_headless(until: f32) -> FrameDriver<FixedStepClock> {
    let mut driver = FrameDriver::new(
        compose_vignette(DEFAULT_VIEWPORT.aspect()),
        FixedStepClock::per_second(60),
        EnvironmentSlot::new(),
    );
    while driver.advance() < until {}
    driver
}

fn print_report(report: &PoseReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json().context("failed to serialize pose report")?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn run_interactive(options: &CliOptions) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    let environment = EnvironmentSlot::new();
    spawn_environment_load(STUDIO_HDR_URL, environment.clone());

    let mut app = App::new(environment);
    event_loop.run_app(&mut app).context("event loop terminated abnormally")?;

    if let Some(err) = app.failure.take() {
        return Err(err);
    }
    if let Some(driver) = app.driver.as_ref() {
        print_report(&driver.report(), options.json)?;
    }
    Ok(())
}

struct App {
    environment: EnvironmentSlot,
    viewport: Option<Arc<WindowViewport>>,
    renderer: Option<Renderer>,
    driver: Option<FrameDriver<ElapsedClock>>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(environment: EnvironmentSlot) -> Self {
        Self {
            environment,
            viewport: None,
            renderer: None,
            driver: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.failure = Some(err);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("Tomato Feast")
                        .with_inner_size(LogicalSize::new(
                            DEFAULT_VIEWPORT.width,
                            DEFAULT_VIEWPORT.height,
                        )),
                )
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );

        let scale_factor = window.scale_factor();
        let logical = window.inner_size().to_logical::<u32>(scale_factor);
        let viewport = Arc::new(WindowViewport::new(logical.width, logical.height, scale_factor));
        let (width, height) = viewport.render_size();

        let size = PhysicalSize::new(width, height);
        let renderer = block_on(Renderer::new(Arc::clone(&window), size))
            .map_err(|err| WindowInitError::from_error("renderer", err))?;
        let driver = FrameDriver::new(
            compose_vignette(viewport.aspect()),
            ElapsedClock::new(),
            self.environment.clone(),
        );
        info!(
            "Rendering {}x{} at pixel ratio {:.2}",
            width,
            height,
            viewport.pixel_ratio()
        );

        self.viewport = Some(viewport);
        self.renderer = Some(renderer);
        self.driver = Some(driver);
        Ok(())
    }

    fn apply_resize(&mut self) {
        let (Some(viewport), Some(renderer), Some(driver)) =
            (self.viewport.as_ref(), self.renderer.as_mut(), self.driver.as_mut())
        else {
            return;
        };
        let (width, height) = viewport.render_size();
        driver.resize(renderer, width, height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(driver)) = (self.renderer.as_mut(), self.driver.as_mut()) else {
            return;
        };
        match driver.frame(renderer) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.failure = Some(anyhow!("GPU is out of memory"));
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("Surface timeout; retrying next frame");
            }
            Err(err) => warn!("Skipping frame: {err}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        if window_id != renderer.window_id() {
            return;
        }
        let scale_factor = renderer.window().scale_factor();

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(viewport) = self.viewport.as_ref() {
                    let logical = size.to_logical::<u32>(scale_factor);
                    viewport.update(logical.width, logical.height);
                }
                self.apply_resize();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(viewport) = self.viewport.as_ref() {
                    viewport.set_scale_factor(scale_factor);
                }
                self.apply_resize();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            stage,
            message: panic_message(panic),
        }
    }

    fn from_error(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    summary_only: bool,
    until: f32,
    json: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            summary_only: false,
            until: 6.0,
            json: false,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--json" => options.json = true,
                "--until" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--until expects a number of seconds. {USAGE}"))?;
                    let seconds: f32 = value
                        .parse()
                        .with_context(|| format!("invalid --until value {value:?}. {USAGE}"))?;
                    if !seconds.is_finite() || seconds < 0.0 {
                        return Err(anyhow!("--until must be a non-negative number. {USAGE}"));
                    }
                    options.until = seconds;
                }
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_run_for_six_seconds() {
        let options = parse(&[]).expect("defaults");
        assert_eq!(
            options,
            CliOptions {
                summary_only: false,
                until: 6.0,
                json: false
            }
        );
    }

    #[test]
    fn parses_every_flag() {
        let options = parse(&["--json", "--until", "2.5", "--summary-only"]).expect("flags");
        assert!(options.summary_only && options.json);
        assert_eq!(options.until, 2.5);
    }

    #[test]
    fn rejects_bad_until_values() {
        assert!(parse(&["--until"]).is_err());
        assert!(parse(&["--until", "soon"]).is_err());
        assert!(parse(&["--until", "-1"]).is_err());
        assert!(parse(&["--until", "inf"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        let err = parse(&["--run-scripts"]).expect_err("unknown flag");
        assert!(err.to_string().contains("Unknown argument"));
    }

    #[test]
    fn headless_run_frames_the_default_window() {
        let driver = play_headless(0.5);
        let camera = &driver.vignette().camera;
        assert!((camera.aspect - 1280.0 / 720.0).abs() < 1e-6);
        assert_eq!(driver.frames(), 31);
        assert!(driver.elapsed() >= 0.5);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = WindowInitError::from_panic("event loop", Box::new("no display"));
        assert_eq!(err.to_string(), "failed to initialize event loop: no display");
    }
}
