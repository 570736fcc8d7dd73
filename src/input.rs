//! Input port handed to the engine at construction.
//!
//! The engine never owns the device; it subscribes to a source, drains it
//! once per tick, and unsubscribes on cleanup.

use std::collections::VecDeque;
use std::sync::mpsc;

use crossterm::event::KeyCode;

/// A touch point together with the viewport it was measured in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Touch {
    pub x: f32,
    pub y: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Touch {
    pub fn in_left_half(&self) -> bool {
        self.x < self.viewport_width / 2.0
    }

    pub fn in_top_half(&self) -> bool {
        self.y < self.viewport_height / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Key(KeyCode),
    TouchStart(Touch),
    TouchMove(Touch),
}

pub trait InputSource {
    fn subscribe(&mut self);
    fn unsubscribe(&mut self);
    fn is_subscribed(&self) -> bool;

    /// Next queued event, or `None` when empty or unsubscribed.
    fn poll(&mut self) -> Option<InputEvent>;
}

/// Host side of [`channel`].
#[derive(Clone)]
pub struct InputSender {
    tx: mpsc::Sender<InputEvent>,
}

impl InputSender {
    /// Returns false once the receiving engine has gone away.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Engine side of [`channel`].
pub struct ChannelInput {
    rx: mpsc::Receiver<InputEvent>,
    subscribed: bool,
}

pub fn channel() -> (InputSender, ChannelInput) {
    let (tx, rx) = mpsc::channel();
    (
        InputSender { tx },
        ChannelInput {
            rx,
            subscribed: false,
        },
    )
}

impl ChannelInput {
    fn discard_queued(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

impl InputSource for ChannelInput {
    fn subscribe(&mut self) {
        // Anything sent before subscribing was never meant for us.
        self.discard_queued();
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.discard_queued();
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    fn poll(&mut self) -> Option<InputEvent> {
        if !self.subscribed {
            self.discard_queued();
            return None;
        }
        self.rx.try_recv().ok()
    }
}

/// In-memory source for headless drivers and tests.
#[derive(Debug, Default)]
pub struct InputQueue {
    queue: VecDeque<InputEvent>,
    subscribed: bool,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        if self.subscribed {
            self.queue.push_back(event);
        }
    }
}

impl InputSource for InputQueue {
    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.queue.clear();
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    fn poll(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }
}
