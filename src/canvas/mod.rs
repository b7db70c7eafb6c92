// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas interaction: the connection-drag-to-create workflow.
//!
//! The rendering surface owns drawing, scrolling, and hit-testing; it feeds
//! this module *classified* pointer events ([`PointerTarget`]) with screen
//! coordinates. The state machine here decides when a context menu opens,
//! what a menu selection spawns, and whether the spawned node gets
//! auto-wired to the drag source.

use crate::model::{
    ChoiceData, ChoiceOption, DialogueData, Edge, IdMinter, Node, NodeData, NodeId, NodeKind,
    OptionId, Position,
};
use crate::ops::GraphOp;

/// A point in screen cells, as reported by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Maps between screen cells and canvas coordinates.
///
/// `origin` is the screen cell of the canvas area's top-left corner and
/// `scroll` the canvas coordinate currently shown there.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    origin: ScreenPoint,
    scroll: Position,
}

impl Viewport {
    pub fn new(origin: ScreenPoint, scroll: Position) -> Self {
        Self { origin, scroll }
    }

    pub fn scroll(&self) -> Position {
        self.scroll
    }

    pub fn screen_to_canvas(&self, point: ScreenPoint) -> Position {
        Position::new(
            (point.x - self.origin.x) as f32 + self.scroll.x,
            (point.y - self.origin.y) as f32 + self.scroll.y,
        )
    }

    pub fn canvas_to_screen(&self, position: Position) -> ScreenPoint {
        ScreenPoint::new(
            (position.x - self.scroll.x) as i32 + self.origin.x,
            (position.y - self.scroll.y) as i32 + self.origin.y,
        )
    }
}

/// What the surface's hit-test found under a pointer event.
///
/// The surface's classification is authoritative; the workflow never
/// re-derives geometry, even when a release lands on a boundary cell.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    Node(NodeId),
    Handle {
        node_id: NodeId,
        handle_id: Option<OptionId>,
    },
    Pane,
}

/// The output port a connection drag started from. `handle_id` is `None`
/// for the single unnamed port of a dialogue node.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSource {
    pub node_id: NodeId,
    pub handle_id: Option<OptionId>,
}

/// An open create-node menu: where it sits on screen, and the drag source
/// captured at open time (absent when the menu came from a plain
/// right-click).
#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    at: ScreenPoint,
    wire_from: Option<DragSource>,
}

impl MenuState {
    pub fn at(&self) -> ScreenPoint {
        self.at
    }

    pub fn wire_from(&self) -> Option<&DragSource> {
        self.wire_from.as_ref()
    }
}

/// A committed menu selection, ready to be turned into ops.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSelection {
    pub kind: NodeKind,
    pub position: Position,
    pub wire_from: Option<DragSource>,
}

/// Idle → Dragging → Idle, with a side branch through MenuOpen.
///
/// The surface fires both a connect-end and a synthetic pane click for the
/// same release; the one-shot `skip_next_pane_click` flag keeps that click
/// from dismissing the menu it just opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasInteraction {
    connecting: Option<DragSource>,
    menu: Option<MenuState>,
    skip_next_pane_click: bool,
}

impl CanvasInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_source(&self) -> Option<&DragSource> {
        self.connecting.as_ref()
    }

    pub fn menu(&self) -> Option<&MenuState> {
        self.menu.as_ref()
    }

    /// The surface reported a connection drag starting from a node's output
    /// port.
    pub fn on_connect_start(&mut self, node_id: NodeId, handle_id: Option<OptionId>) {
        self.connecting = Some(DragSource { node_id, handle_id });
    }

    /// The surface completed a connection itself (release over a valid
    /// element); the recorded source is spent.
    pub fn on_connect_done(&mut self) {
        self.connecting = None;
    }

    /// The drag ended. Over empty canvas the context menu opens at the
    /// release point and captures the drag source; over a node or handle the
    /// surface's own connect handler is in charge and nothing happens here.
    /// Returns whether a menu opened.
    pub fn on_connect_end(&mut self, target: &PointerTarget, at: ScreenPoint) -> bool {
        if self.connecting.is_none() {
            return false;
        }

        match target {
            PointerTarget::Node(_) | PointerTarget::Handle { .. } => false,
            PointerTarget::Pane => {
                self.skip_next_pane_click = true;
                self.menu = Some(MenuState {
                    at,
                    wire_from: self.connecting.take(),
                });
                true
            }
        }
    }

    /// A click on empty canvas dismisses the menu and forgets any recorded
    /// drag source, unless this is the synthetic click paired with the
    /// connect-end that just opened the menu. Returns whether the click was
    /// consumed by the suppression flag.
    pub fn on_pane_click(&mut self) -> bool {
        if self.skip_next_pane_click {
            self.skip_next_pane_click = false;
            return true;
        }
        self.menu = None;
        self.connecting = None;
        false
    }

    /// Right-click / long-press on empty canvas: the same menu, no drag
    /// source recorded.
    pub fn on_pane_context_menu(&mut self, at: ScreenPoint) {
        self.menu = Some(MenuState {
            at,
            wire_from: None,
        });
    }

    pub fn dismiss_menu(&mut self) {
        self.menu = None;
        self.connecting = None;
    }

    /// The user picked a node type from the menu. Converts the stored screen
    /// point to canvas coordinates, closes the menu and hands back what to
    /// spawn. `None` when no menu is open.
    pub fn take_menu_selection(
        &mut self,
        kind: NodeKind,
        viewport: &Viewport,
    ) -> Option<MenuSelection> {
        let menu = self.menu.take()?;
        self.connecting = None;
        Some(MenuSelection {
            kind,
            position: viewport.screen_to_canvas(menu.at),
            wire_from: menu.wire_from,
        })
    }
}

/// Creates a node of the given kind with freshly minted ids. A dialogue
/// node starts with empty speaker/text; a choice node starts with a single
/// empty option.
pub fn spawn_node(kind: NodeKind, position: Position, minter: &mut IdMinter) -> Node {
    let data = match kind {
        NodeKind::Dialogue => NodeData::Dialogue(DialogueData::default()),
        NodeKind::Choice => NodeData::Choice(ChoiceData::new(ChoiceOption::new(
            minter.option_id(),
            "",
        ))),
    };
    Node::new(minter.node_id(), position, data)
}

/// Turns a menu selection into mutation ops: one node, plus one edge from
/// the captured drag source when the menu came out of a connection drag.
pub fn spawn_from_menu(selection: MenuSelection, minter: &mut IdMinter) -> (NodeId, Vec<GraphOp>) {
    let node = spawn_node(selection.kind, selection.position, minter);
    let node_id = node.id().clone();

    let mut ops = vec![GraphOp::AddNode { node }];
    if let Some(source) = selection.wire_from {
        ops.push(GraphOp::AddEdge {
            edge: Edge::new_with(source.node_id, node_id.clone(), source.handle_id, None),
        });
    }

    (node_id, ops)
}

#[cfg(test)]
mod tests;
