//! Event System
//!
//! Gameplay code never calls into the game-flow or audio code directly. It
//! sends a `GameEvent` and the app routes it once per frame:
//!
//! 1. Collision resolution finds the player inside a vehicle → sends LevelLost
//! 2. Sound manager reads LevelLost → stops the ambiance, plays the death sting
//! 3. App reads LevelLost → sends StateChanged(Lost)
//!
//! Listeners registered with `listen` are called synchronously, in
//! registration order, whenever an event of their kind is dispatched. A
//! listener cannot dispatch into the bus it runs in; follow-up events go
//! through `send` and are routed after the current fan-out.

use super::entity::EntityId;
use crate::audio::SoundType;
use crate::state::StateType;

/// A queue for events of a single type.
/// Events are collected during the frame and drained at specific points.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events in the order they were sent
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Game events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    LevelWon,
    LevelLost,
    CoinCollected,
    /// Player stepped into a chapter point. `chapter` is 1-based.
    ChapterEntered { point: EntityId, chapter: u8 },
    ChapterExited { point: EntityId, chapter: u8 },
    StateChanged(StateType),
    SoundPlayed(SoundType),
    MusicPlayed(SoundType),
    AppQuit,
}

/// Payload-free discriminant, used to key listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEventKind {
    LevelWon,
    LevelLost,
    CoinCollected,
    ChapterEntered,
    ChapterExited,
    StateChanged,
    SoundPlayed,
    MusicPlayed,
    AppQuit,
}

impl GameEventKind {
    pub const COUNT: usize = 9;

    pub const ALL: [GameEventKind; Self::COUNT] = [
        GameEventKind::LevelWon,
        GameEventKind::LevelLost,
        GameEventKind::CoinCollected,
        GameEventKind::ChapterEntered,
        GameEventKind::ChapterExited,
        GameEventKind::StateChanged,
        GameEventKind::SoundPlayed,
        GameEventKind::MusicPlayed,
        GameEventKind::AppQuit,
    ];
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::LevelWon => GameEventKind::LevelWon,
            GameEvent::LevelLost => GameEventKind::LevelLost,
            GameEvent::CoinCollected => GameEventKind::CoinCollected,
            GameEvent::ChapterEntered { .. } => GameEventKind::ChapterEntered,
            GameEvent::ChapterExited { .. } => GameEventKind::ChapterExited,
            GameEvent::StateChanged(_) => GameEventKind::StateChanged,
            GameEvent::SoundPlayed(_) => GameEventKind::SoundPlayed,
            GameEvent::MusicPlayed(_) => GameEventKind::MusicPlayed,
            GameEvent::AppQuit => GameEventKind::AppQuit,
        }
    }
}

/// Returns true when the listener handled the event
pub type Listener = Box<dyn FnMut(&GameEvent) -> bool>;

/// Synchronous fan-out plus a FIFO queue for the frame's routing pass.
pub struct EventBus {
    listeners: Vec<Vec<Listener>>,
    queue: EventQueue<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: (0..GameEventKind::COUNT).map(|_| Vec::new()).collect(),
            queue: EventQueue::new(),
        }
    }

    /// Register a listener for one kind of event.
    pub fn listen<F>(&mut self, kind: GameEventKind, listener: F)
    where
        F: FnMut(&GameEvent) -> bool + 'static,
    {
        self.listeners[kind as usize].push(Box::new(listener));
    }

    /// Call every listener of the event's kind, in registration order.
    /// Returns true if any of them handled it.
    pub fn dispatch(&mut self, event: &GameEvent) -> bool {
        let mut handled = false;
        for listener in &mut self.listeners[event.kind() as usize] {
            handled |= listener(event);
        }
        handled
    }

    /// Queue an event for the routing pass.
    pub fn send(&mut self, event: GameEvent) {
        self.queue.send(event);
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.queue.drain().collect()
    }

    /// Events queued so far this frame
    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
