// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::{HashSet, VecDeque};

use bytes::Bytes;
use thiserror::Error;

/// The three value shapes a key can hold.
#[derive(Debug, Clone)]
pub enum Value {
    String(Bytes),
    List(VecDeque<Bytes>),
    Set(HashSet<Bytes>),
}

/// A value's shape, independent of its contents. Used for WRONGTYPE checks
/// and for the snapshot file's tagged encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    List,
    Set,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
        }
    }
}

/// Returned when a typed operation (e.g. `LPUSH` on a string key) is applied
/// to a value of a different kind. The caller never mutates state before
/// this is raised.
#[derive(Debug, Error)]
#[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
pub struct WrongType;

impl Value {
    pub fn as_string(&self) -> Result<&Bytes, WrongType> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(WrongType),
        }
    }

    pub fn as_list(&self) -> Result<&VecDeque<Bytes>, WrongType> {
        match self {
            Value::List(l) => Ok(l),
            _ => Err(WrongType),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut VecDeque<Bytes>, WrongType> {
        match self {
            Value::List(l) => Ok(l),
            _ => Err(WrongType),
        }
    }

    pub fn as_set(&self) -> Result<&HashSet<Bytes>, WrongType> {
        match self {
            Value::Set(s) => Ok(s),
            _ => Err(WrongType),
        }
    }

    pub fn as_set_mut(&mut self) -> Result<&mut HashSet<Bytes>, WrongType> {
        match self {
            Value::Set(s) => Ok(s),
            _ => Err(WrongType),
        }
    }
}
