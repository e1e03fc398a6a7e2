//! Incremental SSE frame parser.
//!
//! Frames are separated by a blank line. Lines may end in `\n`, `\r\n` or a
//! bare `\r`. Only `data:` lines carry content; a frame whose data is `[DONE]`
//! ends the stream.

use crate::types::StreamEvent;

pub const DATA_FIELD: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// A frame whose data was not a valid event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFrame {
    pub data: String,
    pub reason: String,
}

/// One complete frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Event(StreamEvent),
    Malformed(MalformedFrame),
    /// The terminal sentinel.
    Done,
}

/// Reassembles frames from text chunks of arbitrary size.
///
/// The trailing partial frame stays in `buffer` until the chunk that completes
/// it arrives. After the terminal sentinel all further input is discarded.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: String,
    done: bool,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminal sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Text received but not yet part of a complete frame.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Append a chunk and return every frame it completes, in order.
    pub fn push(&mut self, chunk: &str) -> Vec<Frame> {
        if self.done {
            return Vec::new();
        }
        self.buffer.push_str(chunk);
        self.normalize_line_endings();

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..end + 2).collect();
            let Some(frame) = parse_frame(&raw[..end]) else {
                continue;
            };
            let is_done = matches!(frame, Frame::Done);
            frames.push(frame);
            if is_done {
                self.finish_stream();
                break;
            }
        }
        frames
    }

    /// Flush whatever is left once the underlying stream has ended.
    ///
    /// The leftover text is treated as a final frame even without its
    /// closing blank line.
    pub fn finish(&mut self) -> Vec<Frame> {
        if self.done {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.buffer);
        let frames: Vec<Frame> = parse_frame(rest.trim_end_matches(['\r', '\n']))
            .into_iter()
            .collect();
        if frames.iter().any(|f| matches!(f, Frame::Done)) {
            self.done = true;
        }
        frames
    }

    // `\r\n` and a bare `\r` both end a line. A trailing `\r` is left alone
    // until the next chunk shows whether a `\n` follows it.
    fn normalize_line_endings(&mut self) {
        if !self.buffer.contains('\r') {
            return;
        }
        let held = self.buffer.ends_with('\r');
        if held {
            self.buffer.pop();
        }
        self.buffer = self.buffer.replace("\r\n", "\n").replace('\r', "\n");
        if held {
            self.buffer.push('\r');
        }
    }

    fn finish_stream(&mut self) {
        self.done = true;
        self.buffer.clear();
    }
}

/// Parse a single frame body (without its terminating blank line).
///
/// Returns `None` for frames with no data lines, such as comments or keep-alives.
pub fn parse_frame(raw: &str) -> Option<Frame> {
    let data_lines: Vec<&str> = raw
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_FIELD))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data.trim() == DONE_SENTINEL {
        return Some(Frame::Done);
    }
    match serde_json::from_str::<StreamEvent>(&data) {
        Ok(event) => Some(Frame::Event(event)),
        Err(err) => Some(Frame::Malformed(MalformedFrame {
            data,
            reason: err.to_string(),
        })),
    }
}
