use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
    animation_tick: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_animation_fps(tick_rate_ms, 60)
    }

    /// Idle tick plus a faster tick used while anything animates
    pub fn with_animation_fps(tick_rate_ms: u64, animation_fps: u32) -> Self {
        let animation_ms = if animation_fps == 0 {
            16
        } else {
            (1000 / animation_fps as u64).max(1)
        };
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            animation_tick: Duration::from_millis(animation_ms),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    pub fn animation_tick(&self) -> Duration {
        self.animation_tick
    }

    /// Poll for the next event at the idle tick rate
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.tick_rate)
    }

    /// Poll at the animation frame rate
    pub fn next_animation(&self) -> Result<Option<AppEvent>> {
        self.poll(self.animation_tick)
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // crossterm sends release events on some systems
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Poll timed out; advance a frame
    Tick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_tick_from_fps() {
        let handler = EventHandler::with_animation_fps(100, 50);
        assert_eq!(handler.tick_rate(), Duration::from_millis(100));
        assert_eq!(handler.animation_tick(), Duration::from_millis(20));

        let handler = EventHandler::with_animation_fps(100, 0);
        assert_eq!(handler.animation_tick(), Duration::from_millis(16));
    }
}
