// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Graph, IdMinter, NodeData, NodeId, NodeKind, OptionId, Position};
use crate::ops::apply_ops;

use super::{
    spawn_from_menu, spawn_node, CanvasInteraction, PointerTarget, ScreenPoint, Viewport,
};

fn node_id(raw: &str) -> NodeId {
    NodeId::new(raw).expect("node id")
}

fn viewport() -> Viewport {
    Viewport::new(ScreenPoint::new(1, 2), Position::new(10.0, 20.0))
}

#[test]
fn viewport_round_trips_between_screen_and_canvas() {
    let viewport = viewport();
    let screen = ScreenPoint::new(15, 9);
    let canvas = viewport.screen_to_canvas(screen);
    assert_eq!(canvas, Position::new(24.0, 27.0));
    assert_eq!(viewport.canvas_to_screen(canvas), screen);
}

#[test]
fn drag_into_empty_canvas_opens_the_menu_and_captures_the_source() {
    let mut interaction = CanvasInteraction::new();
    let handle = OptionId::new("opt-1").expect("option id");

    interaction.on_connect_start(node_id("node-1"), Some(handle.clone()));
    assert!(interaction.menu().is_none());

    let opened = interaction.on_connect_end(&PointerTarget::Pane, ScreenPoint::new(30, 12));
    assert!(opened);

    let menu = interaction.menu().expect("menu open");
    assert_eq!(menu.at(), ScreenPoint::new(30, 12));
    let source = menu.wire_from().expect("drag source captured");
    assert_eq!(source.node_id, node_id("node-1"));
    assert_eq!(source.handle_id, Some(handle));
    // The source moved into the menu; the drag itself is over.
    assert!(interaction.drag_source().is_none());
}

#[test]
fn drag_released_over_a_node_defers_to_the_surface_connect_handler() {
    let mut interaction = CanvasInteraction::new();
    interaction.on_connect_start(node_id("node-1"), None);

    let opened = interaction.on_connect_end(
        &PointerTarget::Node(node_id("node-2")),
        ScreenPoint::new(5, 5),
    );
    assert!(!opened);
    assert!(interaction.menu().is_none());
    // Still recorded until the surface's connect handler reports done.
    assert!(interaction.drag_source().is_some());

    interaction.on_connect_done();
    assert!(interaction.drag_source().is_none());
}

#[test]
fn connect_end_without_a_recorded_drag_does_nothing() {
    let mut interaction = CanvasInteraction::new();
    let opened = interaction.on_connect_end(&PointerTarget::Pane, ScreenPoint::new(3, 3));
    assert!(!opened);
    assert!(interaction.menu().is_none());
}

#[test]
fn the_synthetic_pane_click_after_a_drag_release_is_suppressed_once() {
    let mut interaction = CanvasInteraction::new();
    interaction.on_connect_start(node_id("node-1"), None);
    interaction.on_connect_end(&PointerTarget::Pane, ScreenPoint::new(8, 8));

    // The release's paired click must not dismiss the menu it just opened.
    assert!(interaction.on_pane_click());
    assert!(interaction.menu().is_some());

    // The next real click dismisses.
    assert!(!interaction.on_pane_click());
    assert!(interaction.menu().is_none());
}

#[test]
fn menu_selection_after_a_drag_spawns_one_node_and_one_edge() {
    let mut minter = IdMinter::new();
    let mut graph = Graph::default();
    let mut interaction = CanvasInteraction::new();
    let handle = OptionId::new("opt-1").expect("option id");

    interaction.on_connect_start(node_id("node-1"), Some(handle.clone()));
    interaction.on_connect_end(&PointerTarget::Pane, ScreenPoint::new(30, 12));

    let selection = interaction
        .take_menu_selection(NodeKind::Dialogue, &viewport())
        .expect("menu selection");
    assert_eq!(selection.position, Position::new(39.0, 30.0));

    let (new_id, ops) = spawn_from_menu(selection, &mut minter);
    apply_ops(&mut graph, &ops);

    assert_eq!(graph.nodes().len(), 1);
    assert_eq!(graph.nodes()[0].id(), &new_id);
    assert_eq!(graph.nodes()[0].kind(), NodeKind::Dialogue);

    assert_eq!(graph.edges().len(), 1);
    let edge = &graph.edges()[0];
    assert_eq!(edge.source(), &node_id("node-1"));
    assert_eq!(edge.target(), &new_id);
    assert_eq!(edge.source_handle(), Some(&handle));

    assert!(interaction.menu().is_none());
    assert!(interaction.drag_source().is_none());
}

#[test]
fn menu_from_a_plain_right_click_spawns_an_unconnected_node() {
    let mut minter = IdMinter::new();
    let mut graph = Graph::default();
    let mut interaction = CanvasInteraction::new();

    interaction.on_pane_context_menu(ScreenPoint::new(4, 6));
    let selection = interaction
        .take_menu_selection(NodeKind::Choice, &viewport())
        .expect("menu selection");
    assert!(selection.wire_from.is_none());

    let (_, ops) = spawn_from_menu(selection, &mut minter);
    apply_ops(&mut graph, &ops);

    assert_eq!(graph.nodes().len(), 1);
    assert!(graph.edges().is_empty());
}

#[test]
fn selecting_without_an_open_menu_yields_nothing() {
    let mut interaction = CanvasInteraction::new();
    assert!(interaction
        .take_menu_selection(NodeKind::Dialogue, &viewport())
        .is_none());
}

#[test]
fn dismissing_the_menu_drops_the_captured_source() {
    let mut interaction = CanvasInteraction::new();
    interaction.on_connect_start(node_id("node-1"), None);
    interaction.on_connect_end(&PointerTarget::Pane, ScreenPoint::new(2, 2));

    interaction.dismiss_menu();
    assert!(interaction.menu().is_none());
    assert!(interaction
        .take_menu_selection(NodeKind::Dialogue, &viewport())
        .is_none());
}

#[test]
fn spawned_choice_nodes_start_with_one_empty_option() {
    let mut minter = IdMinter::new();
    let node = spawn_node(NodeKind::Choice, Position::new(1.0, 2.0), &mut minter);

    let NodeData::Choice(data) = node.data() else {
        panic!("expected choice payload");
    };
    assert_eq!(data.options().len(), 1);
    assert_eq!(data.options()[0].text(), "");
}
