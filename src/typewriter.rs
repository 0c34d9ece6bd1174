use std::time::Duration;

pub const TYPE_INTERVAL: Duration = Duration::from_millis(100);
pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeState {
    Typing { shown: usize },
    Done,
}

/// Caption that reveals one character per [`TYPE_INTERVAL`], advanced by the
/// frame tick rather than by its own timer.
#[derive(Clone, Debug)]
pub struct Typewriter {
    chars: Vec<char>,
    state: TypeState,
    since_char: Duration,
    since_blink: Duration,
    cursor_on: bool,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        // the first character shows immediately
        let state = if chars.len() <= 1 {
            TypeState::Done
        } else {
            TypeState::Typing { shown: 1 }
        };
        Self {
            chars,
            state,
            since_char: Duration::ZERO,
            since_blink: Duration::ZERO,
            cursor_on: true,
        }
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.since_blink += elapsed;
        while self.since_blink >= BLINK_INTERVAL {
            self.since_blink -= BLINK_INTERVAL;
            self.cursor_on = !self.cursor_on;
        }

        if self.is_done() {
            return;
        }
        self.since_char += elapsed;
        while let TypeState::Typing { shown } = self.state {
            if self.since_char < TYPE_INTERVAL {
                break;
            }
            self.since_char -= TYPE_INTERVAL;
            let next = shown + 1;
            self.state = if next >= self.chars.len() {
                TypeState::Done
            } else {
                TypeState::Typing { shown: next }
            };
        }
    }

    pub fn state(&self) -> TypeState {
        self.state
    }

    pub fn visible(&self) -> String {
        let n = match self.state {
            TypeState::Typing { shown } => shown,
            TypeState::Done => self.chars.len(),
        };
        self.chars[..n].iter().collect()
    }

    pub fn cursor_on(&self) -> bool {
        self.cursor_on
    }

    pub fn is_done(&self) -> bool {
        self.state == TypeState::Done
    }
}
