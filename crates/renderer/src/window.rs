use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use glam::Vec2;
use knobs::{KnobPanel, ParameterSource};
use tracing::{error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::camera::OrbitCamera;
use crate::gpu::GpuState;
use crate::runtime::{BoxedTimeSource, FrameScheduler, SystemTimeSource};
use crate::types::RendererConfig;

const SOFTWARE_FPS_CAP: f32 = 15.0;
/// Pixel scroll deltas (touchpads) per wheel notch.
const PIXELS_PER_LINE: f32 = 40.0;

/// Panel edits reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KnobCommand {
    Next,
    Previous,
    Nudge(i32),
    Reset,
    ResetAll,
    /// Restarts the sketch clock and frame counter.
    Restart,
    Print,
    Exit,
}

pub(crate) fn knob_command(key: &Key, modifiers: ModifiersState) -> Option<KnobCommand> {
    match key {
        Key::Named(NamedKey::Tab) if modifiers.shift_key() => Some(KnobCommand::Previous),
        Key::Named(NamedKey::Tab) => Some(KnobCommand::Next),
        Key::Named(NamedKey::ArrowUp) => Some(KnobCommand::Nudge(1)),
        Key::Named(NamedKey::ArrowDown) => Some(KnobCommand::Nudge(-1)),
        Key::Named(NamedKey::PageUp) => Some(KnobCommand::Nudge(10)),
        Key::Named(NamedKey::PageDown) => Some(KnobCommand::Nudge(-10)),
        Key::Named(NamedKey::Escape) => Some(KnobCommand::Exit),
        Key::Named(NamedKey::Home) => Some(KnobCommand::Restart),
        Key::Character(value) if value.eq_ignore_ascii_case("r") && modifiers.shift_key() => {
            Some(KnobCommand::ResetAll)
        }
        Key::Character(value) if value.eq_ignore_ascii_case("r") => Some(KnobCommand::Reset),
        Key::Character(value) if value.eq_ignore_ascii_case("p") => Some(KnobCommand::Print),
        _ => None,
    }
}

fn apply_command(panel: &mut KnobPanel, command: KnobCommand) -> bool {
    match command {
        KnobCommand::Next => panel.select_next(),
        KnobCommand::Previous => panel.select_previous(),
        KnobCommand::Nudge(steps) => {
            panel.nudge(steps);
        }
        KnobCommand::Reset => panel.reset_selected(),
        KnobCommand::ResetAll => panel.reset_all(),
        KnobCommand::Print => {
            info!(panel = %panel.summary(), "knob values");
            return false;
        }
        KnobCommand::Restart | KnobCommand::Exit => return false,
    }
    true
}

fn window_title(panel: &KnobPanel) -> String {
    format!("sketchbook - {}", panel.describe())
}

/// Left-drag tracking for the orbit controls.
#[derive(Default)]
struct MouseState {
    position: Option<PhysicalPosition<f64>>,
    dragging: bool,
}

impl MouseState {
    /// Returns the drag since the previous cursor event while the button is held.
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) -> Option<Vec2> {
        let previous = self.position.replace(position);
        if !self.dragging {
            return None;
        }
        previous.map(|previous| {
            Vec2::new(
                (position.x - previous.x) as f32,
                (position.y - previous.y) as f32,
            )
        })
    }

    fn handle_button(&mut self, state: ElementState) {
        self.dragging = state == ElementState::Pressed;
    }
}

fn scroll_steps(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

/// Aggregates GPU state, the panel and the camera for the window.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    panel: KnobPanel,
    camera: OrbitCamera,
    mouse: MouseState,
    modifiers: ModifiersState,
    time_source: BoxedTimeSource,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let gpu = GpuState::new(window.clone(), config)?;
        let camera = gpu.initial_camera();
        Ok(Self {
            window,
            gpu,
            panel: config.panel.clone(),
            camera,
            mouse: MouseState::default(),
            modifiers: ModifiersState::empty(),
            time_source: Box::new(SystemTimeSource::new()),
        })
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let time = self.time_source.sample();
        let knobs = self.panel.snapshot();
        self.gpu.render(time, &self.camera, &knobs)
    }

    fn restart_clock(&mut self) {
        self.time_source.reset();
        info!("sketch clock restarted");
    }

    fn refresh_title(&self) {
        self.window.set_title(&window_title(&self.panel));
    }
}

/// Opens the window and runs the frame loop until it is closed.
pub(crate) fn run_window(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(window_title(&config.panel))
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create sketch window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err:#}"))?;

    let profile = state.gpu.adapter_profile().clone();
    let mut target_fps = config.target_fps;
    if profile.is_software() && target_fps.is_none() {
        target_fps = Some(SOFTWARE_FPS_CAP);
        warn!(
            adapter = %profile.name,
            backend = ?profile.backend,
            cap = SOFTWARE_FPS_CAP,
            "software rasterizer detected; capping window to {} FPS (override with --fps)",
            SOFTWARE_FPS_CAP
        );
    }
    let mut scheduler = FrameScheduler::new(target_fps);
    state.window.request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window.id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::ModifiersChanged(modifiers) => {
                        state.modifiers = modifiers.state();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed {
                            return;
                        }
                        let Some(command) = knob_command(&event.logical_key, state.modifiers)
                        else {
                            return;
                        };
                        if command == KnobCommand::Exit {
                            elwt.exit();
                        } else if command == KnobCommand::Restart {
                            state.restart_clock();
                            scheduler.reset();
                        } else if apply_command(&mut state.panel, command) {
                            state.refresh_title();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        if let Some(drag) = state.mouse.handle_cursor_moved(position) {
                            let height = state.gpu.size().height as f32;
                            state.camera.orbit(drag, height);
                        }
                    }
                    WindowEvent::MouseInput {
                        state: button_state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        state.mouse.handle_button(button_state);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        state.camera.zoom(scroll_steps(delta));
                    }
                    WindowEvent::Resized(new_size) => {
                        state.gpu.resize(new_size);
                    }
                    WindowEvent::ScaleFactorChanged {
                        mut inner_size_writer,
                        ..
                    } => {
                        let _ = inner_size_writer.request_inner_size(state.gpu.size());
                    }
                    WindowEvent::RedrawRequested => match state.render_frame() {
                        Ok(()) => scheduler.mark_rendered(Instant::now()),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.gpu.reconfigure();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    },
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if scheduler.ready_for_frame(now) {
                    tracing::trace!("scheduler: issuing redraw now");
                    state.window.request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = scheduler.next_deadline() {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobs::SketchKind;

    #[test]
    fn keys_map_to_panel_commands() {
        let none = ModifiersState::empty();
        assert_eq!(
            knob_command(&Key::Named(NamedKey::Tab), none),
            Some(KnobCommand::Next)
        );
        assert_eq!(
            knob_command(&Key::Named(NamedKey::Tab), ModifiersState::SHIFT),
            Some(KnobCommand::Previous)
        );
        assert_eq!(
            knob_command(&Key::Named(NamedKey::PageDown), none),
            Some(KnobCommand::Nudge(-10))
        );
        assert_eq!(
            knob_command(&Key::Character("R".into()), none),
            Some(KnobCommand::Reset)
        );
        assert_eq!(
            knob_command(&Key::Character("p".into()), none),
            Some(KnobCommand::Print)
        );
        assert_eq!(
            knob_command(&Key::Character("R".into()), ModifiersState::SHIFT),
            Some(KnobCommand::ResetAll)
        );
        assert_eq!(
            knob_command(&Key::Named(NamedKey::Home), none),
            Some(KnobCommand::Restart)
        );
        assert_eq!(knob_command(&Key::Character("x".into()), none), None);
    }

    #[test]
    fn commands_edit_the_selected_knob() {
        let mut panel = KnobPanel::new(SketchKind::Cloud.schema());
        assert!(apply_command(&mut panel, KnobCommand::Nudge(10)));
        assert_eq!(panel.get("threshold"), Some(0.35));

        apply_command(&mut panel, KnobCommand::Previous);
        assert_eq!(panel.selected().map(|knob| knob.name), Some("blurStrength"));
        apply_command(&mut panel, KnobCommand::Nudge(-1));
        assert_eq!(panel.get("blurStrength"), Some(3.0));
        apply_command(&mut panel, KnobCommand::Reset);
        assert_eq!(panel.get("blurStrength"), Some(3.1));

        apply_command(&mut panel, KnobCommand::Nudge(5));
        apply_command(&mut panel, KnobCommand::Next);
        apply_command(&mut panel, KnobCommand::Nudge(5));
        assert!(apply_command(&mut panel, KnobCommand::ResetAll));
        assert_eq!(panel.get("threshold"), Some(0.25));
        assert_eq!(panel.get("blurStrength"), Some(3.1));

        assert!(!apply_command(&mut panel, KnobCommand::Restart));
        assert!(!apply_command(&mut panel, KnobCommand::Print));
        assert!(window_title(&panel).starts_with("sketchbook - "));
    }

    #[test]
    fn drags_only_count_while_the_button_is_held() {
        let mut mouse = MouseState::default();
        assert_eq!(mouse.handle_cursor_moved(PhysicalPosition::new(10.0, 10.0)), None);
        mouse.handle_button(ElementState::Pressed);
        assert_eq!(
            mouse.handle_cursor_moved(PhysicalPosition::new(14.0, 7.0)),
            Some(Vec2::new(4.0, -3.0))
        );
        mouse.handle_button(ElementState::Released);
        assert_eq!(mouse.handle_cursor_moved(PhysicalPosition::new(20.0, 7.0)), None);
        assert_eq!(scroll_steps(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
    }
}
