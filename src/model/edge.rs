// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{EdgeId, NodeId, OptionId};

/// A directed connection from a node's output port to another node's input.
///
/// Endpoints are referenced by id only; deleting a node does not cascade to
/// the edges pointing at it. A dangling edge stays in the sheet and is
/// treated as inert by whoever renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    source_handle: Option<OptionId>,
    target_handle: Option<OptionId>,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self::new_with(source, target, None, None)
    }

    pub fn new_with(
        source: NodeId,
        target: NodeId,
        source_handle: Option<OptionId>,
        target_handle: Option<OptionId>,
    ) -> Self {
        let id = Self::derived_id(&source, &target, source_handle.as_ref());
        Self {
            id,
            source,
            target,
            source_handle,
            target_handle,
        }
    }

    /// Reconstructs an edge with an explicit id, as read from a document.
    pub fn from_parts(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        source_handle: Option<OptionId>,
        target_handle: Option<OptionId>,
    ) -> Self {
        Self {
            id,
            source,
            target,
            source_handle,
            target_handle,
        }
    }

    /// The conventional id for a connection: `e<source>-<target>`, extended
    /// with the source handle when the connection leaves a named port. Two
    /// identical connections therefore compute the same id, and re-adding
    /// one overwrites rather than duplicates.
    pub fn derived_id(source: &NodeId, target: &NodeId, source_handle: Option<&OptionId>) -> EdgeId {
        let raw = match source_handle {
            Some(handle) => format!("e{source}-{target}-{handle}"),
            None => format!("e{source}-{target}"),
        };
        EdgeId::new(raw).expect("derived edge id is a valid segment")
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn source_handle(&self) -> Option<&OptionId> {
        self.source_handle.as_ref()
    }

    pub fn target_handle(&self) -> Option<&OptionId> {
        self.target_handle.as_ref()
    }
}
