// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Wire framing: splits a session's incoming byte stream into complete
//! commands, INLINE or BULK-tailed, tolerating partial reads across
//! multiple READABLE events.

use bytes::{Bytes, BytesMut};

/// Whether a command's final argument arrives inline (whitespace-separated,
/// on the same line) or as a length-prefixed bulk blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Inline,
    Bulk,
}

/// A command's declared argc (including the command token itself): either
/// an exact count, or a floor for variadic commands like `sinter`/
/// `sinterstore`. No registered `Bulk` command is variadic, so the codec
/// only ever needs the floor to size the bulk tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn min_argc(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => n,
        }
    }

    pub fn matches(self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => argc == n,
            Arity::AtLeast(n) => argc >= n,
        }
    }
}

/// Minimal view the codec needs of the Command Registry: given a command
/// name, the declared arity (argc including the command token) and kind.
/// Implemented by the registry itself so `protocol` never depends on
/// `commands`.
pub trait ArityLookup {
    fn lookup(&self, name: &[u8]) -> Option<(Arity, CommandKind)>;
}

#[derive(Debug)]
pub enum ParseOutcome {
    /// Not enough bytes buffered yet; wait for the next READABLE event.
    NeedMore,
    /// A complete command frame, argv[0] is the command name.
    Command(Vec<Bytes>),
    /// The stream violated the framing contract; the session must close.
    ProtocolError(&'static str),
}

#[derive(Debug)]
enum ParseState {
    ReadingInline,
    ReadingBulkHeader { argv: Vec<Bytes> },
    ReadingBulkBody { argv: Vec<Bytes>, len: usize },
}

/// Per-session incoming parse buffer and framing state machine.
#[derive(Debug)]
pub struct Codec {
    buf: BytesMut,
    state: ParseState,
}

impl Default for Codec {
    fn default() -> Self {
        Self { buf: BytesMut::with_capacity(4096), state: ParseState::ReadingInline }
    }
}

impl Codec {
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Attempts to produce the next complete command from buffered bytes.
    /// Call in a loop (while not `NeedMore`) after every `feed`, since one
    /// read may contain several pipelined commands.
    pub fn next_command(&mut self, registry: &dyn ArityLookup) -> ParseOutcome {
        loop {
            match &self.state {
                ParseState::ReadingInline => {
                    let Some(line) = self.take_line() else { return ParseOutcome::NeedMore };
                    let tokens = split_whitespace_bytes(&line);
                    if tokens.is_empty() {
                        // Blank line; a keepalive no-op. Try the next one.
                        continue;
                    }

                    match registry.lookup(&tokens[0]) {
                        Some((arity, CommandKind::Bulk)) if tokens.len() == arity.min_argc() - 1 => {
                            self.state = ParseState::ReadingBulkHeader { argv: tokens };
                        },
                        _ => return ParseOutcome::Command(tokens),
                    }
                },
                ParseState::ReadingBulkHeader { .. } => {
                    let Some(line) = self.take_line() else { return ParseOutcome::NeedMore };
                    if line.first() != Some(&b'$') {
                        return ParseOutcome::ProtocolError("expected bulk length header");
                    }
                    let Ok(len) = std::str::from_utf8(&line[1..])
                        .ok()
                        .and_then(|s| s.parse::<usize>().ok())
                        .ok_or(())
                    else {
                        return ParseOutcome::ProtocolError("malformed bulk length");
                    };

                    let ParseState::ReadingBulkHeader { argv } =
                        std::mem::replace(&mut self.state, ParseState::ReadingInline)
                    else {
                        unreachable!("matched ReadingBulkHeader above")
                    };
                    self.state = ParseState::ReadingBulkBody { argv, len };
                },
                ParseState::ReadingBulkBody { len, .. } => {
                    let len = *len;
                    if self.buf.len() < len + 2 {
                        return ParseOutcome::NeedMore;
                    }
                    let body = self.buf.split_to(len).freeze();
                    let term = self.buf.split_to(2);
                    if &term[..] != b"\r\n" {
                        return ParseOutcome::ProtocolError("missing bulk terminator");
                    }

                    let ParseState::ReadingBulkBody { mut argv, .. } =
                        std::mem::replace(&mut self.state, ParseState::ReadingInline)
                    else {
                        unreachable!("matched ReadingBulkBody above")
                    };
                    argv.push(body);
                    return ParseOutcome::Command(argv);
                },
            }
        }
    }

    /// Pulls one CRLF-terminated line out of the buffer, if complete.
    fn take_line(&mut self) -> Option<Bytes> {
        let pos = self.buf.windows(2).position(|w| w == b"\r\n")?;
        let line = self.buf.split_to(pos).freeze();
        let _ = self.buf.split_to(2);
        Some(line)
    }
}

/// Splits on runs of ASCII whitespace, dropping empty tokens, without ever
/// requiring the input to be valid UTF-8 (commands operate on raw bytes).
fn split_whitespace_bytes(line: &[u8]) -> Vec<Bytes> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, b) in line.iter().enumerate() {
        if b.is_ascii_whitespace() {
            if let Some(s) = start.take() {
                out.push(Bytes::copy_from_slice(&line[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(Bytes::copy_from_slice(&line[s..]));
    }
    out
}

/// Formats the canonical bulk-string reply `$<len>\r\n<bytes>\r\n`.
pub fn format_bulk(payload: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(payload.len() + 16);
    out.extend_from_slice(format!("${}\r\n", payload.len()).as_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(b"\r\n");
    out.freeze()
}

/// Formats a plain CRLF-terminated line, e.g. for `get`'s non-bulk reply
/// shape or the `keys` space-joined listing.
pub fn format_line(payload: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(payload.len() + 2);
    out.extend_from_slice(payload);
    out.extend_from_slice(b"\r\n");
    out.freeze()
}
