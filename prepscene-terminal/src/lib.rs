/// Terminal front-end for live scene views
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use prepscene_core::{CameraMode, LiveView, Playback, SceneConfig};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// A character cell is roughly twice as tall as it is wide, so the view is
/// laid out on half-height rows.
const CELL_ASPECT: f32 = 2.0;

/// Main application struct for the terminal live view
pub struct TerminalApp {
    view: LiveView,
    renderer: AsciiRenderer,
    title: String,
    running: bool,
    started: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: SceneConfig, title: impl Into<String>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let now = Instant::now();

        Ok(Self {
            view: LiveView::new(scene, f32::from(width), f32::from(height) * CELL_ASPECT),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            title: title.into(),
            running: true,
            started: now,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            // Update
            self.view.tick(self.now());

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.view
                    .resize(f32::from(width), f32::from(height) * CELL_ASPECT);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('p') => {
                let now = self.now();
                self.view.play_animation(now);
            }
            KeyCode::Char('r') => {
                self.view.reset();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.view.zoom(-1.0);
            }
            KeyCode::Char('-') => {
                self.view.zoom(1.0);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        // Cell centers in view pixels.
        let x = f32::from(mouse.column) + 0.5;
        let y = (f32::from(mouse.row) + 0.5) * CELL_ASPECT;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.view.pointer_down(x, y),
            MouseEventKind::Drag(MouseButton::Left) => self.view.pointer_move(x, y),
            MouseEventKind::Up(MouseButton::Left) => self.view.pointer_up(),
            MouseEventKind::ScrollUp => self.view.zoom(-1.0),
            MouseEventKind::ScrollDown => self.view.zoom(1.0),
            _ => {}
        }
    }

    fn status(&self) -> String {
        let playback = match self.view.playback() {
            Playback::Idle => "idle",
            Playback::Playing { .. } => "playing",
        };
        let camera = match self.view.mode() {
            CameraMode::Default => "default",
            CameraMode::UserOrbiting => "orbit",
        };
        format!(
            "{} | FPS: {:.1} | {} | camera: {} | Drag=Orbit/Move ball Scroll=Zoom P=Play R=Reset Q=Quit",
            self.title, self.fps, playback, camera
        )
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render current frame
        let frame = self.view.frame();
        self.renderer.render(&frame);

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(self.status()),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
