// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::ids::{NodeId, OptionId};

/// A point in canvas coordinates (not screen cells).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The type of node, mirroring the `type` tag of the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Dialogue,
    Choice,
}

/// Payload of a dialogue node: one spoken line. Empty strings are permitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogueData {
    speaker: String,
    text: String,
}

impl DialogueData {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn set_speaker(&mut self, speaker: impl Into<String>) {
        self.speaker = speaker.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// One selectable answer on a choice node. Its id doubles as the outbound
/// port name that edges reference through `source_handle`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    id: OptionId,
    text: String,
}

impl ChoiceOption {
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    pub fn id(&self) -> &OptionId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Payload of a choice node: an ordered list of options.
///
/// A choice node starts with at least one option; deleting options may leave
/// the list empty, which is tolerated. Removing an option orphans any edge
/// whose `source_handle` named it; such edges stay in the sheet and render
/// as inert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChoiceData {
    options: Vec<ChoiceOption>,
}

impl ChoiceData {
    pub fn new(first: ChoiceOption) -> Self {
        Self {
            options: vec![first],
        }
    }

    /// Rebuilds the payload from an already-ordered option list. The list
    /// may be empty when options were deleted before the sheet was saved.
    pub fn from_options(options: Vec<ChoiceOption>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    /// Appends a fresh option at the end of the list.
    pub fn push_option(&mut self, option: ChoiceOption) {
        self.options.push(option);
    }

    /// Replaces one option's text by id, preserving order. Returns `false`
    /// when no option carries the id.
    pub fn update_option_text(&mut self, option_id: &OptionId, text: impl Into<String>) -> bool {
        let Some(option) = self.options.iter_mut().find(|o| o.id() == option_id) else {
            return false;
        };
        option.set_text(text);
        true
    }

    /// Removes one option by id, preserving the order of the rest. Returns
    /// `false` when no option carries the id.
    pub fn remove_option(&mut self, option_id: &OptionId) -> bool {
        let before_len = self.options.len();
        self.options.retain(|o| o.id() != option_id);
        self.options.len() != before_len
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Dialogue(DialogueData),
    Choice(ChoiceData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Dialogue(_) => NodeKind::Dialogue,
            Self::Choice(_) => NodeKind::Choice,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDataKindMismatch {
    expected: NodeKind,
    found: NodeKind,
}

impl NodeDataKindMismatch {
    pub fn expected(&self) -> NodeKind {
        self.expected
    }

    pub fn found(&self) -> NodeKind {
        self.found
    }
}

impl fmt::Display for NodeDataKindMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node data kind mismatch (expected {:?}, found {:?})",
            self.expected, self.found
        )
    }
}

impl std::error::Error for NodeDataKindMismatch {}

/// A graph vertex: one dialogue line or one branching choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    position: Position,
    data: NodeData,
}

impl Node {
    pub fn new(id: NodeId, position: Position, data: NodeData) -> Self {
        Self { id, position, data }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    /// Replaces the payload wholesale. A node never changes type after
    /// creation, so a payload of the other kind is rejected.
    pub fn set_data(&mut self, data: NodeData) -> Result<(), NodeDataKindMismatch> {
        let found = data.kind();
        let expected = self.data.kind();
        if found != expected {
            return Err(NodeDataKindMismatch { expected, found });
        }
        self.data = data;
        Ok(())
    }
}
