//! Key events as delivered by the input layer.

/// Key state carried by an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Down,
    Up,
}

/// A key event tagged with the hardware scan code it surfaced as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub scan_code: i32,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn new(scan_code: i32, action: KeyAction) -> Self {
        Self { scan_code, action }
    }

    pub fn down(scan_code: i32) -> Self {
        Self::new(scan_code, KeyAction::Down)
    }

    pub fn up(scan_code: i32) -> Self {
        Self::new(scan_code, KeyAction::Up)
    }
}

/// What the input layer should do with an event after the engine saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Not a gesture (or not ours to handle yet); deliver it normally.
    PassThrough,
    /// Swallowed by the engine.
    Consumed,
}

impl KeyDisposition {
    pub fn is_consumed(self) -> bool {
        self == KeyDisposition::Consumed
    }
}
