//! Incremental marker scanner for the inline tool strategy.
//!
//! The model may emit `<command>context</command>` anywhere in its streamed
//! response, and the self-closing `<tool-unsupported tool="x" reason="y"/>`
//! when it gave up on a tool. Chunks arrive with arbitrary boundaries, so the
//! scanner keeps only the tail that could still grow into a marker and
//! releases everything else immediately.
//!
//! The scanner is a two-state machine driven by [`MarkerScanner::feed`]:
//!
//! ```text
//!   Scanning ──(tail may start a marker)──▶ BufferingPossibleOpen
//!      ▲                                            │
//!      └────(tail resolved: emitted or consumed)────┘
//! ```
//!
//! Matching follows leftmost-first semantics: the earliest position holding a
//! complete marker wins, and at one position a command marker is tried before
//! the unsupported marker. Tag names and attribute names are matched ASCII
//! case-insensitively.

/// Opening of the always-recognized unsupported-tool marker.
pub const UNSUPPORTED_TAG: &str = "<tool-unsupported";

/// Scanner state between two [`MarkerScanner::feed`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Nothing is held back.
    #[default]
    Scanning,
    /// The buffer holds a tail that may still become a marker.
    BufferingPossibleOpen,
}

/// A piece of scanner output, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text to forward as is.
    Text(String),
    /// A complete `<command>context</command>` marker.
    Invocation {
        /// Command as written in the stream (original case).
        command: String,
        /// Inner text, trimmed.
        context: String,
    },
    /// A complete unsupported-tool marker.
    Unsupported { tool: String, reason: String },
}

#[derive(Debug, Clone)]
struct MarkerTag {
    key: String,
    open: String,
    close: String,
}

/// Result of matching one grammar element at a position.
enum Step {
    /// Matched; continue at this byte offset.
    Matched(usize),
    /// The buffer ended before the element could be decided.
    Incomplete,
    /// The element cannot match here.
    Mismatch,
}

/// Result of trying a marker at one `<` position.
enum Attempt {
    Complete { end: usize, segment: Segment },
    Partial,
    NoMatch,
}

/// Stateful marker detector. One instance per streamed response.
#[derive(Debug, Clone)]
pub struct MarkerScanner {
    tags: Vec<MarkerTag>,
    buffer: String,
    state: ScanState,
}

impl MarkerScanner {
    /// Builds a scanner for the given marker keys.
    ///
    /// Keys are normalized (leading `/` stripped, lowercased); empty and
    /// duplicate keys are ignored. The unsupported marker is always active.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<MarkerTag> = Vec::new();
        for key in keys {
            let key = super::marker_key(key.as_ref());
            if key.is_empty() || tags.iter().any(|t| t.key == key) {
                continue;
            }
            tags.push(MarkerTag {
                open: format!("<{}>", key),
                close: format!("</{}>", key),
                key,
            });
        }
        Self {
            tags,
            buffer: String::new(),
            state: ScanState::Scanning,
        }
    }

    /// Builds a scanner recognizing the markers of every tool in `tools`.
    pub fn for_tool_set(tools: &super::ToolSet) -> Self {
        Self::new(tools.marker_keys())
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Text currently held back.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Feeds one chunk and returns everything that is now decided.
    ///
    /// Complete markers are always consumed before returning, so the buffer
    /// never holds one at rest.
    pub fn feed(&mut self, chunk: &str) -> Vec<Segment> {
        self.buffer.push_str(chunk);
        let mut segments = Vec::new();

        while let Some((start, end, segment)) = self.find_complete() {
            push_text(&mut segments, &self.buffer[..start]);
            segments.push(segment);
            self.buffer.drain(..end);
        }

        match self.find_partial() {
            Some(start) => {
                push_text(&mut segments, &self.buffer[..start]);
                self.buffer.drain(..start);
                self.state = ScanState::BufferingPossibleOpen;
            }
            None => {
                push_text(&mut segments, &self.buffer);
                self.buffer.clear();
                self.state = ScanState::Scanning;
            }
        }

        segments
    }

    /// Ends the stream: returns held-back text verbatim and resets the state.
    pub fn finish(&mut self) -> String {
        self.state = ScanState::Scanning;
        std::mem::take(&mut self.buffer)
    }

    /// Leftmost complete marker as `(start, end, segment)`.
    fn find_complete(&self) -> Option<(usize, usize, Segment)> {
        self.buffer.match_indices('<').find_map(|(start, _)| {
            match self.attempt_at(start) {
                Attempt::Complete { end, segment } => Some((start, end, segment)),
                Attempt::Partial | Attempt::NoMatch => None,
            }
        })
    }

    /// Earliest position whose tail may still become a marker.
    fn find_partial(&self) -> Option<usize> {
        self.buffer
            .match_indices('<')
            .map(|(start, _)| start)
            .find(|&start| matches!(self.attempt_at(start), Attempt::Partial))
    }

    fn attempt_at(&self, start: usize) -> Attempt {
        let bytes = self.buffer.as_bytes();
        let mut partial = false;

        for tag in &self.tags {
            match match_literal(bytes, start, tag.open.as_bytes()) {
                Step::Matched(open_end) => {
                    match find_ignore_ascii_case(&bytes[open_end..], tag.close.as_bytes()) {
                        Some(offset) => {
                            let close_start = open_end + offset;
                            return Attempt::Complete {
                                end: close_start + tag.close.len(),
                                segment: Segment::Invocation {
                                    command: self.buffer[start + 1..open_end - 1].to_string(),
                                    context: self.buffer[open_end..close_start].trim().to_string(),
                                },
                            };
                        }
                        None => partial = true,
                    }
                }
                Step::Incomplete => partial = true,
                Step::Mismatch => {}
            }
        }

        match self.match_unsupported(start) {
            Attempt::NoMatch if partial => Attempt::Partial,
            other => other,
        }
    }

    /// Matches `<tool-unsupported\s+tool="[^"]+"\s+reason="[^"]+"\s*/?>`.
    fn match_unsupported(&self, start: usize) -> Attempt {
        let bytes = self.buffer.as_bytes();

        macro_rules! step {
            ($step:expr) => {
                match $step {
                    Step::Matched(next) => next,
                    Step::Incomplete => return Attempt::Partial,
                    Step::Mismatch => return Attempt::NoMatch,
                }
            };
        }

        let pos = step!(match_literal(bytes, start, UNSUPPORTED_TAG.as_bytes()));
        let pos = step!(match_whitespace(bytes, pos, 1));
        let pos = step!(match_literal(bytes, pos, b"tool=\""));
        let tool_start = pos;
        let pos = step!(match_quoted_value(bytes, pos));
        let tool_end = pos - 1;
        let pos = step!(match_whitespace(bytes, pos, 1));
        let pos = step!(match_literal(bytes, pos, b"reason=\""));
        let reason_start = pos;
        let pos = step!(match_quoted_value(bytes, pos));
        let reason_end = pos - 1;
        let pos = step!(match_whitespace(bytes, pos, 0));
        let pos = match bytes.get(pos) {
            Some(b'/') => pos + 1,
            Some(_) => pos,
            None => return Attempt::Partial,
        };
        let end = step!(match_literal(bytes, pos, b">"));

        Attempt::Complete {
            end,
            segment: Segment::Unsupported {
                tool: self.buffer[tool_start..tool_end].to_string(),
                reason: self.buffer[reason_start..reason_end].to_string(),
            },
        }
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
}

fn match_literal(bytes: &[u8], pos: usize, literal: &[u8]) -> Step {
    let available = &bytes[pos.min(bytes.len())..];
    let n = available.len().min(literal.len());
    if !available[..n].eq_ignore_ascii_case(&literal[..n]) {
        Step::Mismatch
    } else if n < literal.len() {
        Step::Incomplete
    } else {
        Step::Matched(pos + literal.len())
    }
}

/// At least `min` whitespace bytes. Whitespace running into the end of the
/// buffer is undecided.
fn match_whitespace(bytes: &[u8], pos: usize, min: usize) -> Step {
    let count = bytes[pos..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    if pos + count == bytes.len() {
        Step::Incomplete
    } else if count < min {
        Step::Mismatch
    } else {
        Step::Matched(pos + count)
    }
}

/// A non-empty value up to and including the closing quote.
fn match_quoted_value(bytes: &[u8], pos: usize) -> Step {
    match bytes[pos..].iter().position(|&b| b == b'"') {
        Some(0) => Step::Mismatch,
        Some(len) => Step::Matched(pos + len + 1),
        None => Step::Incomplete,
    }
}

fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}
