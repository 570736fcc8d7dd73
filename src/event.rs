use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Terminal input plus a steady tick that stands in for display refresh.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms.max(1));

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                if event::poll(timeout).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            Some(Event::Key(key))
                        }
                        Ok(event::Event::Mouse(mouse)) if is_touch(&mouse) => Some(Event::Mouse(mouse)),
                        Ok(event::Event::Resize(w, h)) => Some(Event::Resize(w, h)),
                        Ok(_) => None,
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to read terminal event");
                            None
                        }
                    };
                    if let Some(ev) = forwarded {
                        if tx.send(ev).is_err() {
                            return;
                        }
                    }
                }

                // Ticks keep their cadence even while keys are held down.
                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        return;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> io::Result<Event> {
        self.rx
            .recv()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

fn is_touch(mouse: &MouseEvent) -> bool {
    matches!(
        mouse.kind,
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
    )
}
