// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The persisted flow document: `{ "nodes": [...], "edges": [...] }`.
//!
//! UTF-8 JSON, no schema version, no checksum. Nodes serialize `id`, `type`,
//! `position` and the type-specific `data` fields only; edges serialize
//! `id`, `source`, `target` and the optional `sourceHandle`/`targetHandle`.
//! A document missing either top-level array is rejected wholesale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{
    ChoiceData, ChoiceOption, DialogueData, Edge, EdgeId, IdError, Node, NodeData, NodeId,
    OptionId, Position,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlowDocumentJson {
    nodes: Vec<NodeJson>,
    edges: Vec<EdgeJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeJson {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKindJson,
    position: PositionJson,
    data: NodeDataJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NodeKindJson {
    Dialogue,
    Choice,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PositionJson {
    x: f32,
    y: f32,
}

/// Type-specific payload fields; which of them are present follows the
/// node's `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeDataJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<OptionJson>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OptionJson {
    id: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeJson {
    id: String,
    source: String,
    target: String,
    #[serde(
        rename = "sourceHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    source_handle: Option<String>,
    #[serde(
        rename = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    target_handle: Option<String>,
}

/// Serializes the given collections as a pretty-printed flow document.
pub fn serialize_document(nodes: &[Node], edges: &[Edge]) -> Result<String, DocumentError> {
    let document = FlowDocumentJson {
        nodes: nodes.iter().map(node_to_json).collect(),
        edges: edges.iter().map(edge_to_json).collect(),
    };
    serde_json::to_string_pretty(&document).map_err(DocumentError::Json)
}

/// Parses a flow document. Fails when the text is not JSON, when `nodes` or
/// `edges` is absent, or when an id is not a valid segment; the caller's
/// collections stay untouched in every failure case.
pub fn parse_document(text: &str) -> Result<(Vec<Node>, Vec<Edge>), DocumentError> {
    let document: FlowDocumentJson = serde_json::from_str(text).map_err(DocumentError::Json)?;

    let nodes = document
        .nodes
        .into_iter()
        .map(node_from_json)
        .collect::<Result<Vec<_>, _>>()?;
    let edges = document
        .edges
        .into_iter()
        .map(edge_from_json)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((nodes, edges))
}

fn node_to_json(node: &Node) -> NodeJson {
    let (kind, data) = match node.data() {
        NodeData::Dialogue(data) => (
            NodeKindJson::Dialogue,
            NodeDataJson {
                speaker: Some(data.speaker().to_owned()),
                text: Some(data.text().to_owned()),
                options: None,
            },
        ),
        NodeData::Choice(data) => (
            NodeKindJson::Choice,
            NodeDataJson {
                speaker: None,
                text: None,
                options: Some(
                    data.options()
                        .iter()
                        .map(|option| OptionJson {
                            id: option.id().to_string(),
                            text: option.text().to_owned(),
                        })
                        .collect(),
                ),
            },
        ),
    };

    NodeJson {
        id: node.id().to_string(),
        kind,
        position: PositionJson {
            x: node.position().x,
            y: node.position().y,
        },
        data,
    }
}

fn node_from_json(node_json: NodeJson) -> Result<Node, DocumentError> {
    let id = NodeId::new(node_json.id.clone()).map_err(|source| DocumentError::InvalidId {
        field: "nodes[].id",
        value: node_json.id,
        source,
    })?;

    let data = match node_json.kind {
        NodeKindJson::Dialogue => NodeData::Dialogue(DialogueData::new(
            node_json.data.speaker.unwrap_or_default(),
            node_json.data.text.unwrap_or_default(),
        )),
        NodeKindJson::Choice => {
            let options = node_json.data.options.unwrap_or_default();
            let mut parsed = Vec::with_capacity(options.len());
            for option_json in options {
                let option_id = OptionId::new(option_json.id.clone()).map_err(|source| {
                    DocumentError::InvalidId {
                        field: "nodes[].data.options[].id",
                        value: option_json.id,
                        source,
                    }
                })?;
                parsed.push(ChoiceOption::new(option_id, option_json.text));
            }
            NodeData::Choice(ChoiceData::from_options(parsed))
        }
    };

    Ok(Node::new(
        id,
        Position::new(node_json.position.x, node_json.position.y),
        data,
    ))
}

fn edge_to_json(edge: &Edge) -> EdgeJson {
    EdgeJson {
        id: edge.id().to_string(),
        source: edge.source().to_string(),
        target: edge.target().to_string(),
        source_handle: edge.source_handle().map(ToString::to_string),
        target_handle: edge.target_handle().map(ToString::to_string),
    }
}

fn edge_from_json(edge_json: EdgeJson) -> Result<Edge, DocumentError> {
    let id = EdgeId::new(edge_json.id.clone()).map_err(|source| DocumentError::InvalidId {
        field: "edges[].id",
        value: edge_json.id,
        source,
    })?;
    let source = NodeId::new(edge_json.source.clone()).map_err(|source| {
        DocumentError::InvalidId {
            field: "edges[].source",
            value: edge_json.source,
            source,
        }
    })?;
    let target = NodeId::new(edge_json.target.clone()).map_err(|source| {
        DocumentError::InvalidId {
            field: "edges[].target",
            value: edge_json.target,
            source,
        }
    })?;
    let source_handle = edge_json
        .source_handle
        .map(|value| {
            OptionId::new(value.clone()).map_err(|source| DocumentError::InvalidId {
                field: "edges[].sourceHandle",
                value,
                source,
            })
        })
        .transpose()?;
    let target_handle = edge_json
        .target_handle
        .map(|value| {
            OptionId::new(value.clone()).map_err(|source| DocumentError::InvalidId {
                field: "edges[].targetHandle",
                value,
                source,
            })
        })
        .transpose()?;

    Ok(Edge::from_parts(id, source, target, source_handle, target_handle))
}

#[derive(Debug)]
pub enum DocumentError {
    Json(serde_json::Error),
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(source) => write!(f, "not a flow document: {source}"),
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid {field} '{value}': {source}"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(source) => Some(source),
            Self::InvalidId { source, .. } => Some(source),
        }
    }
}
