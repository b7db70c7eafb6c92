// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! The interactive shell (ratatui + crossterm) is the rendering surface of
//! the editor: it owns drawing, scrolling and hit-testing, and feeds the
//! canvas workflow classified pointer events. Everything it mutates goes
//! through the ops layer, except node position/selection changes, which are
//! pass-through.

use std::{
    error::Error,
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::canvas::{
    spawn_from_menu, spawn_node, CanvasInteraction, PointerTarget, ScreenPoint, Viewport,
};
use crate::model::{
    ChoiceOption, Edge, Graph, IdMinter, Node, NodeData, NodeId, NodeKind, OptionId, Position,
    Sheet, SheetId, Workspace,
};
use crate::ops::{apply_ops, GraphOp};
use crate::store::{FlowFolder, StoreError};

pub mod theme;

use theme::{ThemeMode, TuiTheme};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const TOAST_TTL: Duration = Duration::from_secs(5);
const NODE_WIDTH: i32 = 24;
const MENU_WIDTH: u16 = 20;
const EDITOR_PANEL_WIDTH: u16 = 34;
const SPAWN_CASCADE_STEPS: u32 = 8;

/// Startup knobs resolved by the CLI entrypoint.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub flows_dir: PathBuf,
    pub theme: Option<ThemeMode>,
}

/// Runs the interactive editor until the user quits.
pub fn run(options: RunOptions) -> Result<(), Box<dyn Error>> {
    let theme = match options.theme {
        Some(mode) => TuiTheme::with_mode(mode),
        None => TuiTheme::from_env()?,
    };
    let mut app = App::new(FlowFolder::new(options.flows_dir), theme);
    let mut terminal = TerminalSession::new()?;

    while !app.should_quit {
        app.expire_toast();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Raw-mode + alternate-screen + mouse-capture guard. Dropping it restores
/// the terminal even when the event loop bails with an error.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(|frame| draw_fn(frame))?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = self.terminal.show_cursor();
    }
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    error: bool,
    expires: Instant,
}

#[derive(Debug, Clone, PartialEq)]
enum ConfirmAction {
    CloseSheet(SheetId),
    ClearCanvas,
}

#[derive(Debug, Clone, PartialEq)]
struct NodeEditor {
    node_id: NodeId,
    field: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Normal,
    EditNode(NodeEditor),
    RenameSheet { sheet_id: SheetId },
    Confirm(ConfirmAction),
    LoadPicker { files: Vec<String>, cursor: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum DragKind {
    MoveNode {
        node_id: NodeId,
        grab_dx: f32,
        grab_dy: f32,
    },
    Connect,
}

struct App {
    live: Graph,
    workspace: Workspace,
    minter: IdMinter,
    interaction: CanvasInteraction,
    folder: FlowFolder,
    theme: TuiTheme,
    mode: Mode,
    scroll: Position,
    canvas_inner: Rect,
    tab_hits: Vec<(u16, u16, SheetId)>,
    new_tab_hit: Option<(u16, u16)>,
    selected_node: Option<NodeId>,
    drag: Option<DragKind>,
    menu_cursor: usize,
    spawn_count: u32,
    toast: Option<Toast>,
    should_quit: bool,
}

impl App {
    fn new(folder: FlowFolder, theme: TuiTheme) -> Self {
        let mut minter = IdMinter::new();
        let workspace = Workspace::new(minter.sheet_id());
        Self {
            live: Graph::default(),
            workspace,
            minter,
            interaction: CanvasInteraction::new(),
            folder,
            theme,
            mode: Mode::Normal,
            scroll: Position::default(),
            canvas_inner: Rect::default(),
            tab_hits: Vec::new(),
            new_tab_hit: None,
            selected_node: None,
            drag: None,
            menu_cursor: 0,
            spawn_count: 0,
            toast: None,
            should_quit: false,
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(
            ScreenPoint::new(self.canvas_inner.x as i32, self.canvas_inner.y as i32),
            self.scroll,
        )
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            error: false,
            expires: Instant::now() + TOAST_TTL,
        });
    }

    fn set_error_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            error: true,
            expires: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| Instant::now() >= toast.expires)
        {
            self.toast = None;
        }
    }

    /// The single mutation entry point for node content editors: every field
    /// edit lands here, per keystroke, and flows through the ops layer.
    fn commit_node_data(&mut self, node_id: NodeId, data: NodeData) {
        apply_ops(&mut self.live, &[GraphOp::UpdateNodeData { node_id, data }]);
    }

    // ---- key handling ------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        match &self.mode {
            Mode::Normal if self.interaction.menu().is_some() => self.handle_menu_key(key.code),
            Mode::Normal => self.handle_normal_key(key),
            Mode::EditNode(_) => self.handle_editor_key(key),
            Mode::RenameSheet { .. } => self.handle_rename_key(key.code),
            Mode::Confirm(_) => self.handle_confirm_key(key.code),
            Mode::LoadPicker { .. } => self.handle_picker_key(key.code),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('s') {
                self.save_active_sheet();
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') => self.spawn_at_cascade(NodeKind::Dialogue),
            KeyCode::Char('c') => self.spawn_at_cascade(NodeKind::Choice),
            KeyCode::Char('e') | KeyCode::Enter => self.open_editor(),
            KeyCode::Char('D') | KeyCode::Delete => self.delete_selected_node(),
            KeyCode::Char('n') => self.create_sheet(),
            KeyCode::Char('w') => self.request_close_sheet(),
            KeyCode::Char('r') => {
                self.mode = Mode::RenameSheet {
                    sheet_id: self.workspace.active_sheet_id().clone(),
                };
            }
            KeyCode::Tab => self.switch_sheet_relative(1),
            KeyCode::BackTab => self.switch_sheet_relative(-1),
            KeyCode::Char('s') => self.save_active_sheet(),
            KeyCode::Char('o') => self.open_load_picker(),
            KeyCode::Char('x') => self.mode = Mode::Confirm(ConfirmAction::ClearCanvas),
            KeyCode::Char('t') => self.theme.toggle(),
            KeyCode::Left => self.scroll.x -= 4.0,
            KeyCode::Right => self.scroll.x += 4.0,
            KeyCode::Up => self.scroll.y -= 2.0,
            KeyCode::Down => self.scroll.y += 2.0,
            KeyCode::Esc => self.selected_node = None,
            _ => {}
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Down => self.menu_cursor = 1 - self.menu_cursor.min(1),
            KeyCode::Char('d') => self.insert_from_menu(NodeKind::Dialogue),
            KeyCode::Char('c') => self.insert_from_menu(NodeKind::Choice),
            KeyCode::Enter => {
                let kind = if self.menu_cursor == 0 {
                    NodeKind::Dialogue
                } else {
                    NodeKind::Choice
                };
                self.insert_from_menu(kind);
            }
            KeyCode::Esc => self.interaction.dismiss_menu(),
            _ => {}
        }
    }

    fn handle_rename_key(&mut self, code: KeyCode) {
        let Mode::RenameSheet { sheet_id } = &self.mode else {
            return;
        };
        let sheet_id = sheet_id.clone();

        match code {
            KeyCode::Enter | KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                let mut name = self
                    .workspace
                    .sheet(&sheet_id)
                    .map(|sheet| sheet.name().to_owned())
                    .unwrap_or_default();
                name.pop();
                self.workspace.rename_sheet(&sheet_id, name);
            }
            KeyCode::Char(c) => {
                let mut name = self
                    .workspace
                    .sheet(&sheet_id)
                    .map(|sheet| sheet.name().to_owned())
                    .unwrap_or_default();
                name.push(c);
                self.workspace.rename_sheet(&sheet_id, name);
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        let Mode::Confirm(action) = &self.mode else {
            return;
        };
        let action = action.clone();

        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                match action {
                    ConfirmAction::CloseSheet(sheet_id) => self.close_sheet(&sheet_id),
                    ConfirmAction::ClearCanvas => self.clear_canvas(),
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let Mode::LoadPicker { files, cursor } = &mut self.mode else {
            return;
        };

        match code {
            KeyCode::Up => *cursor = cursor.saturating_sub(1),
            KeyCode::Down => *cursor = (*cursor + 1).min(files.len().saturating_sub(1)),
            KeyCode::Enter => {
                let file = files.get(*cursor).cloned();
                self.mode = Mode::Normal;
                if let Some(file) = file {
                    self.load_flow_as_sheet(&file);
                }
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Mode::EditNode(editor) = &self.mode else {
            return;
        };
        let mut editor = editor.clone();

        // The edited node can only disappear through this editor, but guard
        // against a stale id anyway.
        let Some(node) = self.live.node(&editor.node_id) else {
            self.mode = Mode::Normal;
            return;
        };
        let data = node.data().clone();
        let field_count = match &data {
            NodeData::Dialogue(_) => 2,
            NodeData::Choice(choice) => choice.options().len(),
        };
        editor.field = editor.field.min(field_count.saturating_sub(1));

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('a') => self.editor_add_option(&mut editor, data),
                KeyCode::Char('d') => self.editor_remove_option(&mut editor, data),
                KeyCode::Char('x') => self.editor_unwire(&editor, &data),
                _ => {}
            }
            self.mode = Mode::EditNode(editor);
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                return;
            }
            KeyCode::Up | KeyCode::BackTab => {
                editor.field = editor.field.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Tab => {
                if field_count > 0 {
                    editor.field = (editor.field + 1).min(field_count - 1);
                }
            }
            KeyCode::Enter => {
                if field_count > 0 {
                    editor.field = (editor.field + 1) % field_count;
                }
            }
            KeyCode::Char(c) => self.editor_edit_field(&editor, data, |text| text.push(c)),
            KeyCode::Backspace => self.editor_edit_field(&editor, data, |text| {
                text.pop();
            }),
            _ => {}
        }

        self.mode = Mode::EditNode(editor);
    }

    fn editor_edit_field(&mut self, editor: &NodeEditor, data: NodeData, edit: impl FnOnce(&mut String)) {
        let node_id = editor.node_id.clone();
        match data {
            NodeData::Dialogue(mut dialogue) => {
                if editor.field == 0 {
                    let mut speaker = dialogue.speaker().to_owned();
                    edit(&mut speaker);
                    dialogue.set_speaker(speaker);
                } else {
                    let mut text = dialogue.text().to_owned();
                    edit(&mut text);
                    dialogue.set_text(text);
                }
                self.commit_node_data(node_id, NodeData::Dialogue(dialogue));
            }
            NodeData::Choice(mut choice) => {
                let Some(option) = choice.options().get(editor.field) else {
                    return;
                };
                let option_id = option.id().clone();
                let mut text = option.text().to_owned();
                edit(&mut text);
                choice.update_option_text(&option_id, text);
                self.commit_node_data(node_id, NodeData::Choice(choice));
            }
        }
    }

    fn editor_add_option(&mut self, editor: &mut NodeEditor, data: NodeData) {
        let NodeData::Choice(mut choice) = data else {
            return;
        };
        choice.push_option(ChoiceOption::new(self.minter.option_id(), ""));
        editor.field = choice.options().len() - 1;
        self.commit_node_data(editor.node_id.clone(), NodeData::Choice(choice));
    }

    fn editor_remove_option(&mut self, editor: &mut NodeEditor, data: NodeData) {
        let NodeData::Choice(mut choice) = data else {
            return;
        };
        let Some(option) = choice.options().get(editor.field) else {
            return;
        };
        let option_id = option.id().clone();
        // Edges out of this option are orphaned on purpose; they stay in the
        // sheet and render as inert.
        choice.remove_option(&option_id);
        editor.field = editor.field.min(choice.options().len().saturating_sub(1));
        self.commit_node_data(editor.node_id.clone(), NodeData::Choice(choice));
    }

    fn editor_unwire(&mut self, editor: &NodeEditor, data: &NodeData) {
        let handle = match data {
            NodeData::Dialogue(_) => None,
            NodeData::Choice(choice) => match choice.options().get(editor.field) {
                Some(option) => Some(option.id().clone()),
                None => return,
            },
        };

        let edge_id = self
            .live
            .edges()
            .iter()
            .find(|edge| {
                edge.source() == &editor.node_id && edge.source_handle() == handle.as_ref()
            })
            .map(|edge| edge.id().clone());

        if let Some(edge_id) = edge_id {
            apply_ops(&mut self.live, &[GraphOp::RemoveEdge { edge_id }]);
        }
    }

    // ---- mouse handling ----------------------------------------------

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Normal && !matches!(self.mode, Mode::EditNode(_)) {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.mouse_drag(mouse.column, mouse.row),
            MouseEventKind::Up(MouseButton::Left) => self.mouse_up(mouse.column, mouse.row),
            MouseEventKind::Down(MouseButton::Right) => {
                self.mouse_context_menu(mouse.column, mouse.row);
            }
            MouseEventKind::ScrollUp => self.scroll.y -= 2.0,
            MouseEventKind::ScrollDown => self.scroll.y += 2.0,
            _ => {}
        }
    }

    fn mouse_down(&mut self, column: u16, row: u16) {
        if let Some(menu) = self.interaction.menu() {
            let rect = menu_rect(menu.at(), self.canvas_inner);
            if contains(rect, column, row) {
                // Inner rows: title, then the two node types.
                match (row as i32) - (rect.y as i32 + 2) {
                    0 => self.insert_from_menu(NodeKind::Dialogue),
                    1 => self.insert_from_menu(NodeKind::Choice),
                    _ => {}
                }
                return;
            }
            // A press outside the popup falls through as an ordinary event
            // after the pane-click rules have had their say.
        }

        let tab_target = self
            .tab_hits
            .iter()
            .find(|(start, end, _)| row == 0 && column >= *start && column < *end)
            .map(|(_, _, sheet_id)| sheet_id.clone());
        if let Some(sheet_id) = tab_target {
            self.switch_sheet(&sheet_id);
            return;
        }
        if self
            .new_tab_hit
            .is_some_and(|(start, end)| column >= start && column < end && row == 0)
        {
            self.create_sheet();
            return;
        }

        if !contains(self.canvas_inner, column, row) {
            return;
        }

        match self.hit_test(column, row) {
            PointerTarget::Handle { node_id, handle_id } => {
                self.interaction.dismiss_menu();
                self.selected_node = Some(node_id.clone());
                self.interaction.on_connect_start(node_id, handle_id);
                self.drag = Some(DragKind::Connect);
            }
            PointerTarget::Node(node_id) => {
                self.interaction.dismiss_menu();
                self.selected_node = Some(node_id.clone());
                if let Some(node) = self.live.node(&node_id) {
                    let grab = self
                        .viewport()
                        .screen_to_canvas(ScreenPoint::new(column as i32, row as i32));
                    self.drag = Some(DragKind::MoveNode {
                        node_id,
                        grab_dx: grab.x - node.position().x,
                        grab_dy: grab.y - node.position().y,
                    });
                }
            }
            PointerTarget::Pane => self.pane_click(),
        }
    }

    fn mouse_drag(&mut self, column: u16, row: u16) {
        let Some(DragKind::MoveNode {
            node_id,
            grab_dx,
            grab_dy,
        }) = self.drag.clone()
        else {
            return;
        };

        let at = self
            .viewport()
            .screen_to_canvas(ScreenPoint::new(column as i32, row as i32));
        // Position changes are pass-through commits, not ops.
        if let Some(node) = self.live.node_mut(&node_id) {
            node.set_position(Position::new(at.x - grab_dx, at.y - grab_dy));
        }
    }

    fn mouse_up(&mut self, column: u16, row: u16) {
        let drag = self.drag.take();

        if drag == Some(DragKind::Connect) {
            let target = self.hit_test(column, row);
            match &target {
                PointerTarget::Node(_) | PointerTarget::Handle { .. } => {
                    self.complete_connect(&target);
                }
                PointerTarget::Pane => {
                    let at = ScreenPoint::new(column as i32, row as i32);
                    if self.interaction.on_connect_end(&PointerTarget::Pane, at) {
                        self.menu_cursor = 0;
                    }
                    // The release also lands on the pane as a click; the
                    // workflow's one-shot flag keeps it from dismissing the
                    // menu it just opened.
                    self.pane_click();
                }
            }
        }
    }

    fn mouse_context_menu(&mut self, column: u16, row: u16) {
        if !contains(self.canvas_inner, column, row) {
            return;
        }
        if matches!(self.hit_test(column, row), PointerTarget::Pane) {
            self.interaction
                .on_pane_context_menu(ScreenPoint::new(column as i32, row as i32));
            self.menu_cursor = 0;
        }
    }

    fn pane_click(&mut self) {
        let suppressed = self.interaction.on_pane_click();
        if !suppressed {
            self.selected_node = None;
        }
    }

    /// The surface's own connect handler: release over a node or port wires
    /// the recorded source straight to that node.
    fn complete_connect(&mut self, target: &PointerTarget) {
        let Some(source) = self.interaction.drag_source().cloned() else {
            return;
        };
        let target_node_id = match target {
            PointerTarget::Node(node_id) => node_id.clone(),
            PointerTarget::Handle { node_id, .. } => node_id.clone(),
            PointerTarget::Pane => return,
        };

        let edge = Edge::new_with(source.node_id, target_node_id, source.handle_id, None);
        apply_ops(&mut self.live, &[GraphOp::AddEdge { edge }]);
        self.interaction.on_connect_done();
    }

    /// The surface's hit-test, authoritative for pointer classification.
    /// Nodes later in the sequence draw on top and win ties.
    fn hit_test(&self, column: u16, row: u16) -> PointerTarget {
        let at = self
            .viewport()
            .screen_to_canvas(ScreenPoint::new(column as i32, row as i32));
        let (cx, cy) = (at.x.round() as i32, at.y.round() as i32);

        for node in self.live.nodes().iter().rev() {
            let rect = node_rect(node);
            for (px, py, handle) in output_ports(node, &rect) {
                if (cx, cy) == (px, py) {
                    return PointerTarget::Handle {
                        node_id: node.id().clone(),
                        handle_id: handle,
                    };
                }
            }
            if rect.contains(cx, cy) {
                return PointerTarget::Node(node.id().clone());
            }
        }

        PointerTarget::Pane
    }

    // ---- actions -----------------------------------------------------

    fn insert_from_menu(&mut self, kind: NodeKind) {
        let viewport = self.viewport();
        let Some(selection) = self.interaction.take_menu_selection(kind, &viewport) else {
            return;
        };
        let (node_id, ops) = spawn_from_menu(selection, &mut self.minter);
        apply_ops(&mut self.live, &ops);
        self.selected_node = Some(node_id);
    }

    /// Toolbar-style creation without a pointer position: spawn along a
    /// cascade so consecutive nodes do not stack on one spot.
    fn spawn_at_cascade(&mut self, kind: NodeKind) {
        let step = self.spawn_count % SPAWN_CASCADE_STEPS;
        let position = Position::new(
            self.scroll.x + 4.0 + (step * 3) as f32,
            self.scroll.y + 2.0 + (step * 2) as f32,
        );
        self.spawn_count += 1;

        let node = spawn_node(kind, position, &mut self.minter);
        let node_id = node.id().clone();
        apply_ops(&mut self.live, &[GraphOp::AddNode { node }]);
        self.selected_node = Some(node_id);
    }

    fn open_editor(&mut self) {
        if let Some(node_id) = self.selected_node.clone() {
            if self.live.node(&node_id).is_some() {
                self.mode = Mode::EditNode(NodeEditor { node_id, field: 0 });
            }
        }
    }

    fn delete_selected_node(&mut self) {
        let Some(node_id) = self.selected_node.take() else {
            return;
        };
        // No cascade: edges referencing the node stay and go inert.
        apply_ops(&mut self.live, &[GraphOp::RemoveNode { node_id }]);
    }

    fn create_sheet(&mut self) {
        let sheet_id = self.minter.sheet_id();
        self.workspace.create_sheet(&mut self.live, sheet_id);
        self.selected_node = None;
        self.scroll = Position::default();
    }

    fn switch_sheet(&mut self, sheet_id: &SheetId) {
        if self.workspace.switch_sheet(&mut self.live, sheet_id) {
            self.selected_node = None;
            self.interaction.dismiss_menu();
        }
    }

    fn switch_sheet_relative(&mut self, offset: isize) {
        let sheets = self.workspace.sheets();
        let Some(current) = sheets
            .iter()
            .position(|sheet| sheet.id() == self.workspace.active_sheet_id())
        else {
            return;
        };
        let len = sheets.len() as isize;
        let next = (current as isize + offset).rem_euclid(len) as usize;
        let target = sheets[next].id().clone();
        self.switch_sheet(&target);
    }

    fn request_close_sheet(&mut self) {
        if self.workspace.sheets().len() <= 1 {
            self.set_error_toast("The last sheet cannot be closed");
            return;
        }
        self.mode = Mode::Confirm(ConfirmAction::CloseSheet(
            self.workspace.active_sheet_id().clone(),
        ));
    }

    fn close_sheet(&mut self, sheet_id: &SheetId) {
        match self.workspace.close_sheet(&mut self.live, sheet_id) {
            Ok(()) => {
                self.selected_node = None;
                self.interaction.dismiss_menu();
            }
            Err(err) => self.set_error_toast(err.to_string()),
        }
    }

    fn clear_canvas(&mut self) {
        apply_ops(
            &mut self.live,
            &[
                GraphOp::SetNodes { nodes: Vec::new() },
                GraphOp::SetEdges { edges: Vec::new() },
            ],
        );
        self.selected_node = None;
    }

    fn save_active_sheet(&mut self) {
        let sheet = self.workspace.active_sheet();
        let sheet_name = sheet.name().to_owned();
        let previous = sheet.file_name().map(str::to_owned);

        match self.folder.save_flow(
            &sheet_name,
            previous.as_deref(),
            self.live.nodes(),
            self.live.edges(),
        ) {
            Ok(file_name) => {
                self.workspace.set_active_file_name(Some(file_name.clone()));
                self.set_toast(format!("Saved {file_name}"));
            }
            Err(err) => self.set_error_toast(format!("Save failed: {err}")),
        }
    }

    fn open_load_picker(&mut self) {
        match self.folder.flow_files() {
            Ok(files) if files.is_empty() => {
                self.set_toast(format!("No flows in {}", self.folder.root().display()));
            }
            Ok(files) => self.mode = Mode::LoadPicker { files, cursor: 0 },
            Err(err) => self.set_error_toast(format!("Load failed: {err}")),
        }
    }

    /// A loaded file becomes a new sheet named after its stem; on any
    /// failure the live collections stay untouched.
    fn load_flow_as_sheet(&mut self, file_name: &str) {
        match self.folder.load_flow(file_name) {
            Ok(loaded) => {
                let mut sheet = Sheet::new_with(
                    self.minter.sheet_id(),
                    loaded.name,
                    loaded.nodes,
                    loaded.edges,
                );
                sheet.set_file_name(Some(loaded.file_name.clone()));
                self.workspace.adopt_sheet(&mut self.live, sheet);
                self.selected_node = None;
                self.scroll = Position::default();
                self.set_toast(format!("Loaded {}", loaded.file_name));
            }
            Err(err @ StoreError::Document { .. }) => {
                self.set_error_toast(format!("Import failed: {err}"));
            }
            Err(err) => self.set_error_toast(format!("Load failed: {err}")),
        }
    }
}

// ---- geometry --------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeRect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl NodeRect {
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

fn node_rect(node: &Node) -> NodeRect {
    let h = match node.data() {
        NodeData::Dialogue(_) => 4,
        NodeData::Choice(choice) => (choice.options().len() as i32).max(1) + 2,
    };
    NodeRect {
        x: node.position().x.round() as i32,
        y: node.position().y.round() as i32,
        w: NODE_WIDTH,
        h,
    }
}

/// Output ports in canvas coordinates: one unnamed mid-border port for a
/// dialogue node, one per option row for a choice node.
fn output_ports(node: &Node, rect: &NodeRect) -> Vec<(i32, i32, Option<OptionId>)> {
    match node.data() {
        NodeData::Dialogue(_) => {
            vec![(rect.x + rect.w - 1, rect.y + rect.h / 2, None)]
        }
        NodeData::Choice(choice) => choice
            .options()
            .iter()
            .enumerate()
            .map(|(index, option)| {
                (
                    rect.x + rect.w - 1,
                    rect.y + 1 + index as i32,
                    Some(option.id().clone()),
                )
            })
            .collect(),
    }
}

fn input_port(rect: &NodeRect) -> (i32, i32) {
    (rect.x, rect.y + rect.h / 2)
}

/// Resolves an edge to its source/target port positions. `None` for a
/// dangling edge (missing node or orphaned option handle): such edges are
/// inert and simply not drawn.
fn edge_route(live: &Graph, edge: &Edge) -> Option<((i32, i32), (i32, i32))> {
    let source = live.node(edge.source())?;
    let target = live.node(edge.target())?;
    let source_rect = node_rect(source);
    let target_rect = node_rect(target);

    let from = match edge.source_handle() {
        Some(handle) => {
            let NodeData::Choice(choice) = source.data() else {
                return None;
            };
            let index = choice.options().iter().position(|o| o.id() == handle)?;
            (
                source_rect.x + source_rect.w - 1,
                source_rect.y + 1 + index as i32,
            )
        }
        None => (
            source_rect.x + source_rect.w - 1,
            source_rect.y + source_rect.h / 2,
        ),
    };

    Some((from, input_port(&target_rect)))
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x + rect.width
        && row >= rect.y
        && row < rect.y + rect.height
}

fn menu_rect(at: ScreenPoint, within: Rect) -> Rect {
    let width = MENU_WIDTH.min(within.width);
    let height = 5.min(within.height);
    let max_x = (within.x + within.width).saturating_sub(width).max(within.x);
    let max_y = (within.y + within.height).saturating_sub(height).max(within.y);
    Rect {
        x: (at.x.max(0) as u16).min(max_x),
        y: (at.y.max(0) as u16).min(max_y),
        width,
        height,
    }
}

// ---- drawing ---------------------------------------------------------

/// A cell grid the canvas is composited into before it becomes a ratatui
/// `Text`. Edges go in first, then node boxes on top.
struct CanvasPainter {
    width: usize,
    height: usize,
    cells: Vec<(char, Style)>,
}

impl CanvasPainter {
    fn new(width: usize, height: usize, base: Style) -> Self {
        Self {
            width,
            height,
            cells: vec![(' ', base); width * height],
        }
    }

    fn put(&mut self, x: i32, y: i32, ch: char, style: Style) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.cells[y * self.width + x] = (ch, style);
    }

    fn put_str(&mut self, x: i32, y: i32, text: &str, style: Style, max_width: i32) {
        for (offset, ch) in text.chars().take(max_width.max(0) as usize).enumerate() {
            self.put(x + offset as i32, y, ch, style);
        }
    }

    fn into_text(self) -> Text<'static> {
        let mut lines = Vec::with_capacity(self.height);
        for row in 0..self.height {
            let mut spans = Vec::new();
            let mut run = String::new();
            let mut run_style = None::<Style>;
            for col in 0..self.width {
                let (ch, style) = self.cells[row * self.width + col];
                match run_style {
                    Some(current) if current == style => run.push(ch),
                    Some(current) => {
                        spans.push(Span::styled(std::mem::take(&mut run), current));
                        run.push(ch);
                        run_style = Some(style);
                    }
                    None => {
                        run.push(ch);
                        run_style = Some(style);
                    }
                }
            }
            if let Some(style) = run_style {
                spans.push(Span::styled(run, style));
            }
            lines.push(Line::from(spans));
        }
        Text::from(lines)
    }
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    frame.render_widget(
        Block::default().style(app.theme.base_style()),
        area,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    let tabs_area = rows[0];
    let mut canvas_area = rows[1];
    let footer_area = rows[2];

    let mut editor_area = None;
    if matches!(app.mode, Mode::EditNode(_)) && canvas_area.width > EDITOR_PANEL_WIDTH + 10 {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(EDITOR_PANEL_WIDTH)])
            .split(canvas_area);
        canvas_area = panes[0];
        editor_area = Some(panes[1]);
    }

    draw_tabs(frame, app, tabs_area);
    draw_canvas(frame, app, canvas_area);
    if let Some(editor_area) = editor_area {
        draw_editor_panel(frame, app, editor_area);
    }
    draw_footer(frame, app, footer_area);

    if app.interaction.menu().is_some() {
        draw_menu(frame, app);
    }
    match &app.mode {
        Mode::Confirm(action) => draw_confirm(frame, app, action.clone(), area),
        Mode::LoadPicker { files, cursor } => {
            draw_picker(frame, app, &files.clone(), *cursor, area);
        }
        _ => {}
    }
}

fn draw_tabs(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    app.tab_hits.clear();
    app.new_tab_hit = None;

    let mut spans = Vec::new();
    let mut column = area.x;
    let renaming = matches!(app.mode, Mode::RenameSheet { .. });

    for sheet in app.workspace.sheets() {
        let active = sheet.id() == app.workspace.active_sheet_id();
        let mut label = format!(" {} ", sheet.name());
        if active && renaming {
            label = format!(" {}_ ", sheet.name());
        }
        let width = label.chars().count() as u16;
        app.tab_hits.push((column, column + width, sheet.id().clone()));
        spans.push(Span::styled(label, app.theme.tab_style(active)));
        spans.push(Span::styled("│", app.theme.panel_border_style()));
        column += width + 1;
    }

    let plus = " + ";
    app.new_tab_hit = Some((column, column + plus.chars().count() as u16));
    spans.push(Span::styled(plus, app.theme.tab_style(false)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_canvas(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let title = format!(
        " {} — {} ",
        app.workspace.active_sheet().name(),
        app.folder.root().display()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(app.theme.panel_border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.canvas_inner = inner;

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut painter = CanvasPainter::new(
        inner.width as usize,
        inner.height as usize,
        app.theme.base_style(),
    );
    let scroll_x = app.scroll.x.round() as i32;
    let scroll_y = app.scroll.y.round() as i32;

    for edge in app.live.edges() {
        if let Some((from, to)) = edge_route(&app.live, edge) {
            draw_edge_path(
                &mut painter,
                (from.0 - scroll_x, from.1 - scroll_y),
                (to.0 - scroll_x, to.1 - scroll_y),
                app.theme.edge_style(),
            );
        }
    }

    for node in app.live.nodes() {
        let selected = app.selected_node.as_ref() == Some(node.id());
        draw_node(&mut painter, app, node, selected, scroll_x, scroll_y);
    }

    frame.render_widget(Paragraph::new(painter.into_text()), inner);
}

fn draw_edge_path(painter: &mut CanvasPainter, from: (i32, i32), to: (i32, i32), style: Style) {
    let (fx, fy) = from;
    let (tx, ty) = to;
    let start_x = fx + 1;
    let end_x = tx - 1;
    let mid_x = (start_x + end_x) / 2;

    for x in start_x.min(mid_x)..=start_x.max(mid_x) {
        painter.put(x, fy, '─', style);
    }
    if fy != ty {
        let corner_top = if ty > fy { '┐' } else { '┘' };
        let corner_bottom = if ty > fy { '└' } else { '┌' };
        painter.put(mid_x, fy, corner_top, style);
        for y in fy.min(ty) + 1..fy.max(ty) {
            painter.put(mid_x, y, '│', style);
        }
        painter.put(mid_x, ty, corner_bottom, style);
    }
    for x in mid_x.min(end_x) + 1..=mid_x.max(end_x) - 1 {
        painter.put(x, ty, '─', style);
    }
    painter.put(end_x, ty, '▸', style);
}

fn draw_node(
    painter: &mut CanvasPainter,
    app: &App,
    node: &Node,
    selected: bool,
    scroll_x: i32,
    scroll_y: i32,
) {
    let rect = node_rect(node);
    let (x, y) = (rect.x - scroll_x, rect.y - scroll_y);
    let (w, h) = (rect.w, rect.h);
    let style = match node.data() {
        NodeData::Dialogue(_) => app.theme.dialogue_node_style(selected),
        NodeData::Choice(_) => app.theme.choice_node_style(selected),
    };

    painter.put(x, y, '┌', style);
    painter.put(x + w - 1, y, '┐', style);
    painter.put(x, y + h - 1, '└', style);
    painter.put(x + w - 1, y + h - 1, '┘', style);
    for col in x + 1..x + w - 1 {
        painter.put(col, y, '─', style);
        painter.put(col, y + h - 1, '─', style);
    }
    for row in y + 1..y + h - 1 {
        painter.put(x, row, '│', style);
        painter.put(x + w - 1, row, '│', style);
    }

    let title = match node.data() {
        NodeData::Dialogue(_) => " say ",
        NodeData::Choice(_) => " choice ",
    };
    painter.put_str(x + 2, y, title, style, w - 4);

    match node.data() {
        NodeData::Dialogue(dialogue) => {
            let speaker = if dialogue.speaker().is_empty() {
                "(speaker)"
            } else {
                dialogue.speaker()
            };
            painter.put_str(x + 2, y + 1, speaker, style, w - 4);
            painter.put_str(x + 2, y + 2, dialogue.text(), style, w - 4);
        }
        NodeData::Choice(choice) => {
            for (index, option) in choice.options().iter().enumerate() {
                let text = if option.text().is_empty() {
                    "(option)"
                } else {
                    option.text()
                };
                painter.put_str(x + 2, y + 1 + index as i32, text, style, w - 4);
            }
        }
    }

    let port_style = app.theme.port_style();
    let (ix, iy) = input_port(&rect);
    painter.put(ix - scroll_x, iy - scroll_y, '○', port_style);
    for (px, py, _) in output_ports(node, &rect) {
        painter.put(px - scroll_x, py - scroll_y, '●', port_style);
    }
}

fn draw_editor_panel(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Mode::EditNode(editor) = &app.mode else {
        return;
    };
    let Some(node) = app.live.node(&editor.node_id) else {
        return;
    };

    let mut lines = Vec::new();
    match node.data() {
        NodeData::Dialogue(dialogue) => {
            lines.push(Line::from(Span::styled(
                "speaker",
                app.theme.field_label_style(),
            )));
            lines.push(field_line(dialogue.speaker(), editor.field == 0, app));
            lines.push(Line::from(Span::styled(
                "text",
                app.theme.field_label_style(),
            )));
            lines.push(field_line(dialogue.text(), editor.field == 1, app));
        }
        NodeData::Choice(choice) => {
            if choice.options().is_empty() {
                lines.push(Line::from(Span::styled(
                    "no options — ^A adds one",
                    app.theme.footer_label_style(),
                )));
            }
            for (index, option) in choice.options().iter().enumerate() {
                lines.push(Line::from(Span::styled(
                    format!("option {}", index + 1),
                    app.theme.field_label_style(),
                )));
                lines.push(field_line(option.text(), editor.field == index, app));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" edit node ")
        .border_style(app.theme.panel_border_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(value: &str, active: bool, app: &App) -> Line<'static> {
    let style = if active {
        app.theme.field_active_style()
    } else {
        app.theme.base_style()
    };
    let shown = if active {
        format!("{value}_")
    } else {
        value.to_owned()
    };
    Line::from(Span::styled(shown, style))
}

fn draw_menu(frame: &mut Frame<'_>, app: &App) {
    let Some(menu) = app.interaction.menu() else {
        return;
    };
    let rect = menu_rect(menu.at(), app.canvas_inner);

    let items = [
        (0, "dialogue node"),
        (1, "choice node"),
    ];
    let mut lines = vec![Line::from(Span::styled(
        "add node",
        app.theme.field_label_style(),
    ))];
    for (index, label) in items {
        let style = if app.menu_cursor == index {
            app.theme.menu_selected_style()
        } else {
            app.theme.menu_style()
        };
        lines.push(Line::from(Span::styled(format!(" {label} "), style)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_style())
        .style(app.theme.menu_style());
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_confirm(frame: &mut Frame<'_>, app: &App, action: ConfirmAction, area: Rect) {
    let message = match &action {
        ConfirmAction::CloseSheet(sheet_id) => {
            let name = app
                .workspace
                .sheet(sheet_id)
                .map(|sheet| sheet.name().to_owned())
                .unwrap_or_else(|| sheet_id.to_string());
            format!("Close sheet '{name}'? Unsaved content is lost.")
        }
        ConfirmAction::ClearCanvas => "Clear the canvas? Unsaved content is lost.".to_owned(),
    };

    let width = (message.chars().count() as u16 + 4).min(area.width);
    let rect = centered_rect(area, width, 5);
    let lines = vec![
        Line::from(message),
        Line::default(),
        Line::from(Span::styled("[y]es   [n]o", app.theme.field_label_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" confirm ")
        .border_style(app.theme.error_style());
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(block).style(app.theme.menu_style()),
        rect,
    );
}

fn draw_picker(frame: &mut Frame<'_>, app: &App, files: &[String], cursor: usize, area: Rect) {
    let height = (files.len() as u16 + 2).min(area.height.saturating_sub(2)).max(3);
    let rect = centered_rect(area, 40.min(area.width), height);

    let lines = files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let style = if index == cursor {
                app.theme.menu_selected_style()
            } else {
                app.theme.menu_style()
            };
            Line::from(Span::styled(format!(" {file} "), style))
        })
        .collect::<Vec<_>>();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" load flow ")
        .border_style(app.theme.panel_border_style());
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(block).style(app.theme.menu_style()),
        rect,
    );
}

fn draw_footer(frame: &mut Frame<'_>, app: &App, area: Rect) {
    if let Some(toast) = &app.toast {
        let style = if toast.error {
            app.theme.error_style()
        } else {
            app.theme.toast_style()
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(toast.message.clone(), style))),
            area,
        );
        return;
    }

    let hints: &[(&str, &str)] = if app.interaction.menu().is_some() {
        &[("↑↓", "choose"), ("⏎", "add"), ("esc", "cancel")]
    } else {
        match &app.mode {
            Mode::Normal => &[
                ("d/c", "node"),
                ("⏎", "edit"),
                ("D", "delete"),
                ("n", "new sheet"),
                ("w", "close"),
                ("r", "rename"),
                ("⇥", "switch"),
                ("s", "save"),
                ("o", "load"),
                ("x", "clear"),
                ("t", "theme"),
                ("q", "quit"),
            ],
            Mode::EditNode(_) => &[
                ("type", "edit field"),
                ("↑↓", "field"),
                ("^A", "add option"),
                ("^D", "del option"),
                ("^X", "unwire"),
                ("esc", "done"),
            ],
            Mode::RenameSheet { .. } => &[("type", "rename"), ("⏎/esc", "done")],
            Mode::Confirm(_) => &[("y", "confirm"), ("n", "cancel")],
            Mode::LoadPicker { .. } => &[("↑↓", "choose"), ("⏎", "load"), ("esc", "cancel")],
        }
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key} "), app.theme.footer_key_style()));
        spans.push(Span::styled(format!("{label} "), app.theme.footer_label_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
