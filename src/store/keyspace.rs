// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use bytes::Bytes;

use crate::store::value::Value;

/// One logical database: a flat mapping from key to typed value.
#[derive(Debug, Clone, Default)]
pub struct Database {
    entries: HashMap<Bytes, Value>,
}

impl Database {
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    pub fn set(&mut self, key: Bytes, value: Value) {
        self.entries.insert(key, value);
    }

    /// Inserts only if absent. Returns `true` if the insert happened.
    pub fn set_nx(&mut self, key: Bytes, value: Value) -> bool {
        if self.entries.contains_key(&key) {
            false
        } else {
            self.entries.insert(key, value);
            true
        }
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Bytes> {
        self.entries.keys()
    }

    pub fn entry_or_insert_with(
        &mut self,
        key: Bytes,
        default: impl FnOnce() -> Value,
    ) -> &mut Value {
        self.entries.entry(key).or_insert_with(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Value)> {
        self.entries.iter()
    }
}

/// The fixed-size array of logical databases. Exclusively owned and mutated
/// from the reactor thread; never shared by reference with the snapshotter.
#[derive(Debug, Clone)]
pub struct Keyspace {
    databases: Vec<Database>,
}

impl Keyspace {
    pub fn new(count: usize) -> Self {
        Self {
            databases: (0..count).map(|_| Database::default()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn db(&self, index: usize) -> Option<&Database> {
        self.databases.get(index)
    }

    pub fn db_mut(&mut self, index: usize) -> Option<&mut Database> {
        self.databases.get_mut(index)
    }

    pub fn flush_all(&mut self) {
        for db in &mut self.databases {
            db.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Database)> {
        self.databases.iter().enumerate()
    }

    pub fn from_databases(databases: Vec<Database>) -> Self {
        Self { databases }
    }
}
