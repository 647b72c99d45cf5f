//! Trade Beat - procedural trading sound with a live spectrum scope.
//!
//! Simulated market ticks fire percussive noise bursts; the scope window
//! shows the spectrum and waveform of what is playing.

use clap::Parser;
use std::error::Error;
use std::process;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use tradebeat::audio::{BackendKind, ProceduralAudioEngine};
use tradebeat::cli::Args;
use tradebeat::error::EngineError;
use tradebeat::recording;
use tradebeat::rendering::CanvasPresenter;
use tradebeat::ticker::Ticker;
use tradebeat::visual::{Canvas, CanvasRegistry};

/// Sample rate of the inert engine used with --allow-silent
const SILENT_SAMPLE_RATE: u32 = 44100;

/// Main application state
struct App {
    args: Args,
    surfaces: CanvasRegistry,
    surface_id: String,

    // Window and presentation
    window: Option<Arc<Window>>,
    presenter: Option<CanvasPresenter>,

    // Sound and tick source
    engine: Option<ProceduralAudioEngine>,
    ticker: Option<Ticker>,

    /// Set when the app exits because something broke
    failed: bool,
}

impl App {
    fn new(args: Args) -> Self {
        let surface_id = args.engine_config().surface.surface_id;
        Self {
            args,
            surfaces: CanvasRegistry::new(),
            surface_id,
            window: None,
            presenter: None,
            engine: None,
            ticker: None,
            failed: false,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let config = self.args.engine_config();
        config.validate()?;
        let surface = config.surface.clone();

        let window_attributes = Window::default_attributes()
            .with_title("Trade Beat")
            .with_inner_size(winit::dpi::LogicalSize::new(surface.width, surface.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let presenter = pollster::block_on(CanvasPresenter::new(
            Arc::clone(&window),
            surface.width,
            surface.height,
        ))?;

        self.surfaces.register(
            surface.surface_id.clone(),
            Canvas::new(surface.width, surface.height, surface.background),
        );

        let mut engine = self.build_engine()?;
        engine.start();

        let trigger = engine.trigger_handle();
        let ticker = Ticker::spawn(&self.args.ticker_config(), move || trigger.beat_once());

        log::info!("Trade Beat is running! Space = manual beat, ESC = quit");

        self.window = Some(window);
        self.presenter = Some(presenter);
        self.engine = Some(engine);
        self.ticker = Some(ticker);
        Ok(())
    }

    /// Open the audio device, falling back to the silent engine only when allowed
    fn build_engine(&self) -> Result<ProceduralAudioEngine, EngineError> {
        let config = self.args.engine_config();
        match ProceduralAudioEngine::new(config.clone(), BackendKind::Device, self.surfaces.clone())
        {
            Err(EngineError::AudioUnavailable) if self.args.allow_silent => {
                log::warn!("No audio device found, running silent");
                ProceduralAudioEngine::new(
                    config,
                    BackendKind::Silent {
                        sample_rate: SILENT_SAMPLE_RATE,
                    },
                    self.surfaces.clone(),
                )
            }
            other => other,
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(ticker) = self.ticker.take() {
            let ticks = ticker.stop();
            log::info!("Ticker stopped after {} ticks", ticks);
        }
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
        event_loop.exit();
    }

    /// Present the latest scope frame
    fn render_frame(&mut self) {
        let Some(ref mut presenter) = self.presenter else {
            return;
        };
        let result = self
            .surfaces
            .with_canvas(&self.surface_id, |canvas| presenter.present(canvas));

        match result {
            Some(Ok(())) | None => {}
            Some(Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    presenter.resize(size.width, size.height);
                }
            }
            Some(Err(e)) => log::error!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(engine) = &self.engine {
            if !engine.is_drawing() {
                log::error!("Scope draw loop ended, shutting down");
                self.failed = true;
                self.shutdown(event_loop);
                return;
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Startup failed: {}", e);
            self.failed = true;
            self.shutdown(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => self.shutdown(event_loop),
                KeyCode::Space => {
                    if let Some(engine) = &self.engine {
                        engine.beat_once();
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if let Some(recording_config) = args.recording_config() {
        let summary =
            recording::record(args.engine_config(), &args.ticker_config(), &recording_config)?;
        log::info!(
            "Wrote {} frames and {} ({} beats)",
            summary.frames,
            recording_config.audio_path(),
            summary.beats
        );
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(args);
    event_loop.run_app(&mut app)?;

    if app.failed {
        return Err("scope stopped unexpectedly".into());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        process::exit(1);
    }
}
