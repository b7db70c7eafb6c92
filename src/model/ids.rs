// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// A stable identifier used across the model and the persisted document.
///
/// This is intentionally std-only and does not enforce any particular id
/// scheme; it only enforces that the id is a non-empty *path segment* (i.e.
/// contains no `/`), because ids can end up embedded in derived file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id_segment(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    ContainsSlash,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::ContainsSlash => f.write_str("id must not contain '/'"),
        }
    }
}

impl std::error::Error for IdError {}

fn validate_id_segment(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.contains('/') {
        return Err(IdError::ContainsSlash);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SheetIdTag {}
pub type SheetId = Id<SheetIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeIdTag {}
pub type EdgeId = Id<EdgeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionIdTag {}
pub type OptionId = Id<OptionIdTag>;

/// Mints time-derived ids (`node-<millis>`), never reusing one within the
/// process even when the clock does not advance between calls.
///
/// Ids minted in the same millisecond get a running counter suffix, so a
/// tight creation loop still yields distinct ids. A clock that jumps
/// backwards is clamped to the last observed millisecond.
#[derive(Debug, Clone)]
pub struct IdMinter {
    last_millis: u64,
    sequence: u32,
}

impl Default for IdMinter {
    fn default() -> Self {
        Self::new()
    }
}

impl IdMinter {
    pub fn new() -> Self {
        Self {
            last_millis: 0,
            sequence: 0,
        }
    }

    pub fn node_id(&mut self) -> NodeId {
        NodeId::new(self.next_raw("node")).expect("minted id is a valid segment")
    }

    pub fn option_id(&mut self) -> OptionId {
        OptionId::new(self.next_raw("opt")).expect("minted id is a valid segment")
    }

    pub fn sheet_id(&mut self) -> SheetId {
        SheetId::new(self.next_raw("sheet")).expect("minted id is a valid segment")
    }

    fn next_raw(&mut self, prefix: &str) -> String {
        let millis = now_millis().max(self.last_millis);
        if millis == self.last_millis {
            self.sequence = self.sequence.saturating_add(1);
        } else {
            self.last_millis = millis;
            self.sequence = 0;
        }

        if self.sequence == 0 {
            format!("{prefix}-{millis}")
        } else {
            format!("{prefix}-{millis}-{}", self.sequence)
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
