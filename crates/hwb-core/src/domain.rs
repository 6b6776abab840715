/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Unix timestamp marking the start of the next polling window.
///
/// Only moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(i64);

impl Cursor {
    pub fn new(ts: i64) -> Self {
        Self(ts)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Move the cursor to `ts` unless that would move it backwards.
    pub fn advance_to(&mut self, ts: i64) {
        if ts > self.0 {
            self.0 = ts;
        }
    }
}
