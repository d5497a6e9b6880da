//! Byte-at-a-time line editing.
//!
//! [`KeyDecoder`] turns raw terminal bytes into [`Key`]s, including the
//! ESC-prefixed arrow sequences. [`LineEditor`] applies keys to the line
//! buffer, keeping the visible line in step with it.

use std::io::{ErrorKind, Read, Write};
use anyhow::{Context, Result};
use colored::*;
use crate::shell::cancel::StopHandle;
use crate::shell::history::History;

const ESC: u8 = 0x1B;
const ERASE_LINE: &str = "\r\x1b[2K";

/// A decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Interrupt,
    Eof,
    Up,
    Down,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Editing,
    /// Saw ESC, expecting `[`.
    Escape,
    /// Saw ESC `[`, waiting for the final byte.
    Bracket,
}

/// Three-state decoder for the raw input stream.
///
/// Unrecognized escape sequences are dropped and the decoder returns to
/// `Editing`; they never reach the line buffer.
#[derive(Debug)]
pub struct KeyDecoder {
    state: DecodeState,
    utf8: Vec<u8>,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self {
            state: DecodeState::Editing,
            utf8: Vec::with_capacity(4),
        }
    }
}

impl KeyDecoder {
    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::Editing && self.utf8.is_empty()
    }

    pub fn reset(&mut self) {
        self.state = DecodeState::Editing;
        self.utf8.clear();
    }

    pub fn feed(&mut self, byte: u8) -> Option<Key> {
        match self.state {
            DecodeState::Escape => {
                self.state = if byte == b'[' {
                    DecodeState::Bracket
                } else {
                    DecodeState::Editing
                };
                None
            }
            DecodeState::Bracket => match byte {
                // CSI parameter bytes, e.g. the "1;5" in ESC[1;5A
                0x30..=0x3F => None,
                b'A' => {
                    self.state = DecodeState::Editing;
                    Some(Key::Up)
                }
                b'B' => {
                    self.state = DecodeState::Editing;
                    Some(Key::Down)
                }
                _ => {
                    self.state = DecodeState::Editing;
                    None
                }
            },
            DecodeState::Editing => self.feed_editing(byte),
        }
    }

    fn feed_editing(&mut self, byte: u8) -> Option<Key> {
        if byte >= 0x80 {
            return self.feed_utf8(byte);
        }
        // ASCII in the middle of a multi-byte sequence aborts it.
        self.utf8.clear();

        match byte {
            b'\r' | b'\n' => Some(Key::Enter),
            0x7F | 0x08 => Some(Key::Backspace),
            b'\t' => Some(Key::Tab),
            0x03 => Some(Key::Interrupt),
            0x04 => Some(Key::Eof),
            ESC => {
                self.state = DecodeState::Escape;
                None
            }
            0x20..=0x7E => Some(Key::Char(byte as char)),
            // NUL and remaining control bytes
            _ => None,
        }
    }

    fn feed_utf8(&mut self, byte: u8) -> Option<Key> {
        self.utf8.push(byte);
        match std::str::from_utf8(&self.utf8) {
            Ok(s) => {
                let ch = s.chars().next();
                self.utf8.clear();
                ch.map(Key::Char)
            }
            Err(e) if e.error_len().is_some() || self.utf8.len() >= 4 => {
                self.utf8.clear();
                None
            }
            Err(_) => None,
        }
    }
}

/// Result of tab-completing a prefix against the command names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    NoMatch,
    Unique(String),
    Ambiguous(Vec<String>),
}

/// Matches `prefix` against `candidates` (case-sensitive, leading substring).
///
/// Several matches never complete to their common prefix.
pub fn complete(prefix: &str, candidates: &[String]) -> Completion {
    let mut matches: Vec<String> = candidates
        .iter()
        .filter(|c| c.starts_with(prefix))
        .cloned()
        .collect();

    match matches.len() {
        0 => Completion::NoMatch,
        1 => Completion::Unique(matches.remove(0)),
        _ => {
            matches.sort();
            Completion::Ambiguous(matches)
        }
    }
}

/// How an input cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Stopped,
}

/// What the editor needs from the shell for one input cycle.
pub struct EditSession<'a> {
    pub prompt: &'a str,
    pub history: &'a mut History,
    pub candidates: &'a [String],
    pub stop: &'a StopHandle,
}

#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
    decoder: KeyDecoder,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Runs one input cycle: prompt, edit until Enter, Ctrl-D, EOF or stop.
    pub fn read_line<R: Read + ?Sized, W: Write + ?Sized>(
        &mut self,
        input: &mut R,
        out: &mut W,
        session: &mut EditSession<'_>,
    ) -> Result<ReadOutcome> {
        self.buffer.clear();
        self.decoder.reset();
        session.history.reset_cursor();

        write!(out, "{}", session.prompt)?;
        out.flush()?;

        let mut byte = [0u8; 1];
        loop {
            if session.stop.is_stopped() {
                return Ok(ReadOutcome::Stopped);
            }

            match input.read(&mut byte) {
                Ok(0) => {
                    session.stop.stop();
                    writeln!(out)?;
                    return Ok(ReadOutcome::Stopped);
                }
                Ok(_) => {}
                // Nothing yet; go round again so a stop request is noticed.
                Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => continue,
                Err(e) => return Err(e).context("Failed to read from terminal"),
            }

            let Some(key) = self.decoder.feed(byte[0]) else {
                continue;
            };
            if let Some(outcome) = self.handle_key(key, out, session)? {
                return Ok(outcome);
            }
        }
    }

    /// Applies one key. Returns `Some` when the input cycle is over.
    pub fn handle_key<W: Write + ?Sized>(
        &mut self,
        key: Key,
        out: &mut W,
        session: &mut EditSession<'_>,
    ) -> Result<Option<ReadOutcome>> {
        match key {
            Key::Enter => {
                writeln!(out)?;
                out.flush()?;
                return Ok(Some(ReadOutcome::Line(std::mem::take(&mut self.buffer))));
            }
            Key::Eof => {
                session.stop.stop();
                writeln!(out)?;
                out.flush()?;
                return Ok(Some(ReadOutcome::Stopped));
            }
            Key::Backspace => {
                if self.buffer.pop().is_some() {
                    self.redraw(out, session.prompt)?;
                }
            }
            Key::Tab => {
                match complete(&self.buffer, session.candidates) {
                    Completion::NoMatch => {}
                    Completion::Unique(name) => self.buffer = name,
                    Completion::Ambiguous(names) => {
                        writeln!(out)?;
                        for name in names {
                            writeln!(out, "  {}", name.cyan())?;
                        }
                    }
                }
                self.redraw(out, session.prompt)?;
            }
            Key::Interrupt => {
                self.buffer.clear();
                session.history.reset_cursor();
                writeln!(out, "^C")?;
                self.redraw(out, session.prompt)?;
            }
            Key::Up => {
                if let Some(entry) = session.history.back() {
                    self.buffer = entry.to_string();
                    self.redraw(out, session.prompt)?;
                }
            }
            Key::Down => {
                self.buffer = session.history.forward().to_string();
                self.redraw(out, session.prompt)?;
            }
            Key::Char(c) => {
                self.buffer.push(c);
                write!(out, "{}", c)?;
                out.flush()?;
            }
        }
        Ok(None)
    }

    fn redraw<W: Write + ?Sized>(&self, out: &mut W, prompt: &str) -> Result<()> {
        write!(out, "{}{}{}", ERASE_LINE, prompt, self.buffer)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Vec<Key> {
        let mut decoder = KeyDecoder::default();
        bytes.iter().filter_map(|b| decoder.feed(*b)).collect()
    }

    #[test]
    fn test_arrow_sequences() {
        assert_eq!(decode(b"\x1b[A\x1b[B"), vec![Key::Up, Key::Down]);
        assert_eq!(decode(b"\x1b[1;5A"), vec![Key::Up]);
    }

    #[test]
    fn test_garbled_escape_is_dropped() {
        // Bare ESC followed by a letter: the letter is swallowed.
        assert_eq!(decode(b"\x1bxa"), vec![Key::Char('a')]);
        // Right arrow is not handled.
        assert_eq!(decode(b"\x1b[Cb"), vec![Key::Char('b')]);
        // Delete key (ESC [ 3 ~) leaves nothing behind.
        assert_eq!(decode(b"\x1b[3~c"), vec![Key::Char('c')]);
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(
            decode(b"\r\n\x7f\x08\t\x03\x04"),
            vec![Key::Enter, Key::Enter, Key::Backspace, Key::Backspace, Key::Tab, Key::Interrupt, Key::Eof]
        );
        assert!(decode(b"\x00\x01\x1a").is_empty());
    }

    #[test]
    fn test_utf8_char() {
        assert_eq!(decode("é".as_bytes()), vec![Key::Char('é')]);
        let mut decoder = KeyDecoder::default();
        assert_eq!(decoder.feed(0xFF), None);
        assert!(decoder.is_idle());
    }
}
