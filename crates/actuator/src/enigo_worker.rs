//! enigo-backed [`Actuator`] running on its own thread.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};

use mousekeys_common::error::{MouseKeysError, MouseKeysResult};
use mousekeys_platform_core::{Actuator, MouseButton};

type Reply<T> = Sender<Result<T, String>>;

enum Command {
    Move(i32, i32),
    Button(Button, Direction),
    Scroll(i32, Axis),
    Location(Reply<(i32, i32)>),
    MainDisplay(Reply<(i32, i32)>),
}

/// Pointer actuator backed by `enigo`.
///
/// Moves, buttons and scrolls are queued without waiting; enigo failures for
/// those are logged by the worker. Position and screen queries block until
/// the worker answers.
pub struct EnigoActuator {
    commands: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl EnigoActuator {
    /// Connect to the platform input system. Fails if enigo cannot.
    pub fn new() -> MouseKeysResult<Self> {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = std::thread::Builder::new()
            .name("mousekeys-actuator".into())
            .spawn(move || {
                let enigo = match Enigo::new(&Settings::default()) {
                    Ok(enigo) => {
                        let _ = ready_tx.send(Ok(()));
                        enigo
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                run_worker(enigo, rx);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::info!("Pointer actuator ready (enigo)");
                Ok(Self {
                    commands: Some(tx),
                    worker: Some(worker),
                })
            }
            Ok(Err(message)) => {
                let _ = worker.join();
                Err(MouseKeysError::actuator(format!(
                    "Failed to connect to the input system: {message}"
                )))
            }
            Err(_) => {
                let _ = worker.join();
                Err(MouseKeysError::actuator("actuator thread exited during setup"))
            }
        }
    }

    fn send(&self, command: Command) -> MouseKeysResult<()> {
        self.commands
            .as_ref()
            .ok_or_else(|| MouseKeysError::actuator("actuator is shut down"))?
            .send(command)
            .map_err(|_| MouseKeysError::actuator("actuator thread is gone"))
    }

    fn query(&self, make: impl FnOnce(Reply<(i32, i32)>) -> Command) -> MouseKeysResult<(i32, i32)> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(make(reply_tx))?;
        reply_rx
            .recv()
            .map_err(|_| MouseKeysError::actuator("actuator thread dropped the reply"))?
            .map_err(MouseKeysError::actuator)
    }
}

impl Actuator for EnigoActuator {
    fn move_to(&self, x: i32, y: i32) -> MouseKeysResult<()> {
        self.send(Command::Move(x, y))
    }

    fn button_down(&self, button: MouseButton) -> MouseKeysResult<()> {
        self.send(Command::Button(to_enigo_button(button), Direction::Press))
    }

    fn button_up(&self, button: MouseButton) -> MouseKeysResult<()> {
        self.send(Command::Button(to_enigo_button(button), Direction::Release))
    }

    fn click(&self, button: MouseButton) -> MouseKeysResult<()> {
        self.send(Command::Button(to_enigo_button(button), Direction::Click))
    }

    fn scroll(&self, dx: i32, dy: i32) -> MouseKeysResult<()> {
        if dy != 0 {
            self.send(Command::Scroll(wheel_length(dy), Axis::Vertical))?;
        }
        if dx != 0 {
            self.send(Command::Scroll(dx, Axis::Horizontal))?;
        }
        Ok(())
    }

    fn cursor_position(&self) -> MouseKeysResult<(i32, i32)> {
        self.query(Command::Location)
    }

    fn screen_size(&self) -> MouseKeysResult<(u32, u32)> {
        let (width, height) = self.query(Command::MainDisplay)?;
        Ok((width.max(0) as u32, height.max(0) as u32))
    }

    fn name(&self) -> &str {
        "enigo"
    }
}

impl Drop for EnigoActuator {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Actuator thread panicked");
            }
        }
    }
}

fn run_worker(mut enigo: Enigo, commands: Receiver<Command>) {
    for command in commands {
        match command {
            Command::Move(x, y) => {
                if let Err(e) = enigo.move_mouse(x, y, Coordinate::Abs) {
                    tracing::warn!(x, y, error = %e, "Pointer move failed");
                }
            }
            Command::Button(button, direction) => {
                if let Err(e) = enigo.button(button, direction) {
                    tracing::warn!(?button, ?direction, error = %e, "Button action failed");
                }
            }
            Command::Scroll(length, axis) => {
                if let Err(e) = enigo.scroll(length, axis) {
                    tracing::warn!(length, ?axis, error = %e, "Scroll failed");
                }
            }
            Command::Location(reply) => {
                let _ = reply.send(enigo.location().map_err(|e| e.to_string()));
            }
            Command::MainDisplay(reply) => {
                let _ = reply.send(enigo.main_display().map_err(|e| e.to_string()));
            }
        }
    }
    tracing::debug!("Actuator thread stopped");
}

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

/// enigo scrolls down for positive vertical lengths; MouseKeys scrolls up
/// for positive `dy`.
fn wheel_length(dy: i32) -> i32 {
    -dy
}
