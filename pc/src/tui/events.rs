//! TUI event handling
//!
//! Blocking poll with a tick timeout. Each returned event is one render pass.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind};
use eyre::Result;

/// Terminal events
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick (no input within the tick rate)
    Tick,
}

/// Shortest poll timeout; zero would spin on `poll`
pub const MIN_TICK_RATE: Duration = Duration::from_millis(10);

/// Event source for the TUI
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate, at least [`MIN_TICK_RATE`]
    pub fn new(tick_rate: Duration) -> Self {
        Self {
            tick_rate: tick_rate.max(MIN_TICK_RATE),
        }
    }

    /// Wait for the next event, at most one tick
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        Ok(match event::read()? {
            // Release/repeat events would double-apply keys on some platforms
            event::Event::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            event::Event::Resize(w, h) => Event::Resize(w, h),
            _ => Event::Tick,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_handler_creation() {
        let handler = EventHandler::new(Duration::from_millis(100));
        assert_eq!(handler.tick_rate, Duration::from_millis(100));
    }

    #[test]
    fn test_zero_tick_rate_is_clamped() {
        let handler = EventHandler::new(Duration::ZERO);
        assert_eq!(handler.tick_rate, MIN_TICK_RATE);
    }
}
