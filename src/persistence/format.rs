// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! On-disk snapshot encoding. `serde_json` gives a self-describing format
//! that round-trips every value kind and empty databases losslessly,
//! without requiring byte-for-byte stability across versions.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::store::{Database, Keyspace, Value};

#[derive(Serialize, Deserialize)]
pub struct SnapshotFile {
    pub databases: Vec<Vec<(Vec<u8>, ValueDto)>>,
}

#[derive(Serialize, Deserialize)]
pub enum ValueDto {
    String(Vec<u8>),
    List(Vec<Vec<u8>>),
    Set(Vec<Vec<u8>>),
}

impl From<&Value> for ValueDto {
    fn from(v: &Value) -> Self {
        match v {
            Value::String(s) => ValueDto::String(s.to_vec()),
            Value::List(l) => ValueDto::List(l.iter().map(|b| b.to_vec()).collect()),
            Value::Set(s) => ValueDto::Set(s.iter().map(|b| b.to_vec()).collect()),
        }
    }
}

impl From<ValueDto> for Value {
    fn from(dto: ValueDto) -> Self {
        match dto {
            ValueDto::String(s) => Value::String(Bytes::from(s)),
            ValueDto::List(l) => Value::List(l.into_iter().map(Bytes::from).collect()),
            ValueDto::Set(s) => Value::Set(s.into_iter().map(Bytes::from).collect()),
        }
    }
}

impl SnapshotFile {
    pub fn from_keyspace(keyspace: &Keyspace) -> Self {
        let databases = keyspace
            .iter()
            .map(|(_, db)| db.iter().map(|(k, v)| (k.to_vec(), ValueDto::from(v))).collect())
            .collect();
        SnapshotFile { databases }
    }

    pub fn into_keyspace(self) -> Keyspace {
        let databases = self
            .databases
            .into_iter()
            .map(|entries| {
                let mut db = Database::default();
                for (k, v) in entries {
                    db.set(Bytes::from(k), Value::from(v));
                }
                db
            })
            .collect();
        Keyspace::from_databases(databases)
    }
}
