use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{error, info};
use pixels::{Pixels, SurfaceTexture};
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SquareWave};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey},
    window::{Window, WindowId},
};

use chip8_vm::{
    Chip8, Chip8Runner, Config, DEFAULT_CPU_HZ, DISPLAY_X, DISPLAY_Y, Display, IBM_LOGO, Quirks,
    u4,
};

/// The rate at which pixels fade out (phosphor decay).
const DISPLAY_PHOSPHOR_RATE: f32 = 10.0;

/// Mapping from physical keyboard keys to CHIP-8 hex keypad (0x0-0xF).
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x00
    KeyCode::Digit1, // 0x01
    KeyCode::Digit2, // 0x02
    KeyCode::Digit3, // 0x03
    KeyCode::KeyQ,   // 0x04
    KeyCode::KeyW,   // 0x05
    KeyCode::KeyE,   // 0x06
    KeyCode::KeyA,   // 0x07
    KeyCode::KeyS,   // 0x08
    KeyCode::KeyD,   // 0x09
    KeyCode::KeyZ,   // 0x0A
    KeyCode::KeyC,   // 0x0B
    KeyCode::Digit4, // 0x0C
    KeyCode::KeyR,   // 0x0D
    KeyCode::KeyF,   // 0x0E
    KeyCode::KeyV,   // 0x0F
];

struct App {
    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,
    /// Stores the brightness of each pixel (0.0 to 1.0) to implement phosphor decay.
    display_float: Display<f32>,

    /// Audio output stream (must be kept alive).
    _audio_stream: OutputStream,
    audio_sink: Sink,

    runner: Chip8Runner,
    /// Used for delta time calculation.
    last_frame_instant: Instant,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(chip8: Chip8, config: &Config) -> anyhow::Result<Self> {
        // Initialize audio
        let mut _audio_stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open audio output stream")?;
        _audio_stream.log_on_drop(false);

        let audio_sink = Sink::connect_new(_audio_stream.mixer());
        audio_sink.pause();
        audio_sink.append(SquareWave::new(440.0).amplify(0.5));

        let runner = Chip8Runner::with_config(chip8, config);

        Ok(Self {
            pixels: None,
            window: None,
            display_float: [[0.0; DISPLAY_X]; DISPLAY_Y],

            _audio_stream,
            audio_sink,

            runner,
            last_frame_instant: Instant::now(),
            exit_result: Ok(()),
        })
    }

    /// Blits the framebuffer into the pixel surface, fading pixels that turned off.
    fn render(&mut self, dt: f32) -> anyhow::Result<()> {
        let Some(pixels) = self.pixels.as_mut() else {
            return Ok(());
        };

        let rows = self.runner.chip8_ref().framebuffer().rows();
        let frame = pixels.frame_mut().chunks_exact_mut(4);
        let brightness = self.display_float.iter_mut().flatten();
        let lit = rows.iter().flatten();

        for ((pxl, level), &on) in frame.zip(brightness).zip(lit) {
            *level = if on {
                1.0
            } else {
                (*level - DISPLAY_PHOSPHOR_RATE * dt).max(0.0)
            };
            pxl.copy_from_slice(&[0, 0xff, 0, (*level * 255.0) as u8]);
        }

        pixels.render().context("Pixels render error")
    }

    fn update_sound(&self) {
        if self.runner.should_beep() {
            self.audio_sink.play();
        } else {
            self.audio_sink.pause();
        }
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = {
            let size = LogicalSize::new(DISPLAY_X as u32 * 10, DISPLAY_Y as u32 * 10);
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title("chip8-vm")
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        self.window = Some(window.clone());
        self.pixels = {
            let window_size = window.inner_size();
            let surface_texture =
                SurfaceTexture::new(window_size.width, window_size.height, window.clone());

            let pixels = Pixels::new(DISPLAY_X as u32, DISPLAY_Y as u32, surface_texture)
                .context("Failed to create pixels surface")?;

            window.request_redraw();
            Some(pixels)
        };

        // Avoid large dt on first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    pixels
                        .resize_surface(size.width, size.height)
                        .context("Failed to resize pixels surface")?;
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame_instant).as_secs_f32();
                self.last_frame_instant = now;

                if let Err(e) = self.runner.update(dt) {
                    error!("VM halted: {e}");
                    return Err(e).context("Chip8 Execution error");
                }

                self.update_sound();
                self.render(dt)?;

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
                    let pressed = event.state == ElementState::Pressed;
                    self.runner.set_key(u4::new(key as u8), pressed);
                }
            }

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Profile {
    /// Modern interpreter behaviour
    Modern,
    /// Original COSMAC VIP behaviour
    Vip,
}

/// CHIP-8 emulator written in Rust.
///
/// Keys 1-4, Q-R, A-F, Z-V map to CHIP-8 keys.
/// Escape is used to exit the emulator.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file; runs the built-in IBM logo if omitted
    rom_path: Option<PathBuf>,

    /// Interpreter quirks to emulate
    #[arg(long, value_enum, default_value_t = Profile::Modern)]
    profile: Profile,

    /// Instructions executed per second
    #[arg(long, default_value_t = DEFAULT_CPU_HZ, value_parser = parse_rate)]
    cpu_hz: f32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_rate(value: &str) -> Result<f32, String> {
    let hz: f32 = value.parse().map_err(|e| format!("{e}"))?;
    if hz.is_finite() && hz > 0.0 {
        Ok(hz)
    } else {
        Err(format!("rate must be a positive number of Hz, got {value}"))
    }
}

impl Args {
    fn config(&self) -> Config {
        let quirks = match self.profile {
            Profile::Modern => Quirks::modern(),
            Profile::Vip => Quirks::cosmac_vip(),
        };

        let mut config = Config::default()
            .with_quirks(quirks)
            .with_cpu_hz(self.cpu_hz);
        config.rng_seed = self.seed;
        config
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.config();

    let mut chip8 = Chip8::with_config(&config);
    match &args.rom_path {
        Some(path) => chip8
            .load_file(path)
            .context("Failed to load ROM into CHIP-8 memory")?,
        None => {
            info!("No ROM provided, running the built-in IBM logo");
            chip8
                .load(&IBM_LOGO)
                .context("Failed to load built-in program")?;
        }
    }

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(chip8, &config).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
