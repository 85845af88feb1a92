//! Fenced tool block tracker.
//!
//! In the gating and concat strategies the model writes tool output directly
//! into its response as a fenced block (```` ```graph-spec ````). The tracker
//! watches the stream for those blocks so the UI can show progress. It never
//! alters the text.

const FENCE: &str = "```";

/// Block boundary seen in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceEvent {
    /// A tool block opened; carries the command as written.
    Opened(String),
    /// The open tool block closed.
    Closed(String),
}

enum Opening {
    Found { end: usize, command: String },
    Undecided(usize),
    Absent,
}

/// Observes streamed text for fenced tool blocks.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    keys: Vec<String>,
    pending: String,
    open: Option<String>,
}

impl FenceTracker {
    /// Tracks blocks tagged with any of `keys` (case-insensitive, leading `/`
    /// stripped).
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = keys
            .into_iter()
            .map(|key| super::marker_key(key.as_ref()))
            .filter(|key| !key.is_empty())
            .collect();
        // Longest first so `graph-spec` wins over `graph`.
        normalized.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        normalized.dedup();

        Self {
            keys: normalized,
            pending: String::new(),
            open: None,
        }
    }

    /// Command of the block currently open, if any.
    pub fn open_block(&self) -> Option<&str> {
        self.open.as_deref()
    }

    /// Observes one chunk and returns the block boundaries it completes.
    ///
    /// Only the tail that could still be part of a fence stays buffered.
    pub fn observe(&mut self, chunk: &str) -> Vec<FenceEvent> {
        if self.keys.is_empty() {
            return Vec::new();
        }

        self.pending.push_str(chunk);
        let mut events = Vec::new();
        let mut cursor = 0;

        loop {
            let rest = &self.pending[cursor..];
            match self.open.take() {
                None => match self.find_opening(rest) {
                    Opening::Found { end, command } => {
                        events.push(FenceEvent::Opened(command.clone()));
                        self.open = Some(command);
                        cursor += end;
                    }
                    Opening::Undecided(at) => {
                        cursor += at;
                        break;
                    }
                    Opening::Absent => {
                        cursor += rest.trim_end_matches('`').len();
                        break;
                    }
                },
                Some(command) => match rest.find(FENCE) {
                    Some(at) => {
                        events.push(FenceEvent::Closed(command));
                        cursor += at + FENCE.len();
                    }
                    None => {
                        self.open = Some(command);
                        cursor += rest.trim_end_matches('`').len();
                        break;
                    }
                },
            }
        }

        self.pending.drain(..cursor);
        events
    }

    /// Ends the stream. Returns the command of a block left open.
    pub fn finish(&mut self) -> Option<String> {
        self.pending.clear();
        self.open.take()
    }

    fn find_opening(&self, text: &str) -> Opening {
        let bytes = text.as_bytes();

        for (at, _) in text.match_indices(FENCE) {
            let after = at + FENCE.len();
            let tail = &bytes[after..];
            let mut undecided = tail.is_empty();

            for key in &self.keys {
                let key = key.as_bytes();
                if tail.len() < key.len() {
                    if tail.eq_ignore_ascii_case(&key[..tail.len()]) {
                        undecided = true;
                    }
                    continue;
                }
                if !tail[..key.len()].eq_ignore_ascii_case(key) {
                    continue;
                }
                match tail.get(key.len()) {
                    None => undecided = true,
                    Some(&b) if is_command_byte(b) => {}
                    Some(_) => {
                        return Opening::Found {
                            end: after + key.len(),
                            command: text[after..after + key.len()].to_string(),
                        }
                    }
                }
            }

            if undecided {
                return Opening::Undecided(at);
            }
        }
        Opening::Absent
    }
}

fn is_command_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}
