use std::collections::VecDeque;
use log::debug;

/// Default number of submitted lines kept before the oldest are evicted.
pub const DEFAULT_HISTORY_SIZE: usize = 500;

/// Append-only log of submitted lines plus the recall cursor.
///
/// The cursor ranges over `0..=len()`; `len()` means "not recalling".
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    index: usize,
    // 0 = unbounded
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            capacity,
        }
    }

    /// Records a submitted line. Blank lines are not recorded.
    pub fn push(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.entries.push_back(line.to_string());
            if self.capacity > 0 {
                while self.entries.len() > self.capacity {
                    if let Some(evicted) = self.entries.pop_front() {
                        debug!("history full, evicted: {}", evicted);
                    }
                }
            }
        }
        self.reset_cursor();
    }

    /// Moves the cursor one entry back (clamped at the oldest).
    /// Returns `None` when there is nothing to recall.
    pub fn back(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = self.index.saturating_sub(1);
        self.entries.get(self.index).map(String::as_str)
    }

    /// Moves the cursor one entry forward. Walking past the newest entry
    /// returns to the fresh-line position, reported as an empty line.
    pub fn forward(&mut self) -> &str {
        if self.index + 1 < self.entries.len() {
            self.index += 1;
            &self.entries[self.index]
        } else {
            self.index = self.entries.len();
            ""
        }
    }

    pub fn reset_cursor(&mut self) {
        self.index = self.entries.len();
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
