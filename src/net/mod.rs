// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! TCP listener, per-connection session state, and wire framing.

pub mod listener;
pub mod protocol;
pub mod session;

pub use listener::Listener;
pub use protocol::{ArityLookup, Codec, CommandKind, ParseOutcome};
pub use session::{Session, SessionState};
