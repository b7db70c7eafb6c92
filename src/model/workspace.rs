// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::graph::Graph;
use super::ids::SheetId;
use super::sheet::Sheet;

/// Multi-sheet lifecycle: create, switch, rename, close.
///
/// Exactly one sheet is active at any time and at least one sheet exists at
/// all times. Every operation that changes which sheet is live snapshots the
/// working copy into the outgoing sheet before loading the incoming one, so
/// the live collections always belong to either the old or the new sheet,
/// never to neither.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    sheets: Vec<Sheet>,
    active_sheet_id: SheetId,
    created: u64,
}

impl Workspace {
    /// A workspace starts with a single empty sheet named "Flow 1".
    pub fn new(first_sheet_id: SheetId) -> Self {
        let first = Sheet::new(first_sheet_id.clone(), "Flow 1");
        Self {
            sheets: vec![first],
            active_sheet_id: first_sheet_id,
            created: 1,
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn active_sheet_id(&self) -> &SheetId {
        &self.active_sheet_id
    }

    pub fn sheet(&self, sheet_id: &SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id() == sheet_id)
    }

    pub fn sheet_mut(&mut self, sheet_id: &SheetId) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.id() == sheet_id)
    }

    pub fn active_sheet(&self) -> &Sheet {
        self.sheet(&self.active_sheet_id)
            .expect("the active sheet is always present")
    }

    /// Switches to another sheet. A no-op when `target_id` is already active
    /// or is unknown; in the unknown case the live collections have already
    /// been snapshotted, so nothing is lost. Returns whether a switch
    /// happened.
    pub fn switch_sheet(&mut self, live: &mut Graph, target_id: &SheetId) -> bool {
        if target_id == &self.active_sheet_id {
            return false;
        }

        self.snapshot_active(live);

        let Some(target) = self.sheet(target_id) else {
            return false;
        };

        *live = target.checkout_graph();
        self.active_sheet_id = target_id.clone();
        true
    }

    /// Snapshots the active sheet, then creates and activates a new empty
    /// sheet with an auto-generated "Flow N" name. The live collections are
    /// reset to empty.
    pub fn create_sheet(&mut self, live: &mut Graph, sheet_id: SheetId) -> &Sheet {
        self.snapshot_active(live);

        self.created = self.created.saturating_add(1);
        let name = format!("Flow {}", self.created);
        self.sheets.push(Sheet::new(sheet_id.clone(), name));
        self.active_sheet_id = sheet_id;
        live.clear();

        self.active_sheet()
    }

    /// Snapshots the active sheet, then appends `sheet` and makes it active,
    /// loading its collections as the working copy. Used when a loaded file
    /// becomes a new sheet.
    pub fn adopt_sheet(&mut self, live: &mut Graph, sheet: Sheet) -> &Sheet {
        self.snapshot_active(live);

        *live = sheet.checkout_graph();
        self.active_sheet_id = sheet.id().clone();
        self.sheets.push(sheet);

        self.active_sheet()
    }

    /// Removes a sheet. Refused while only one sheet remains, before any
    /// mutation occurs. When the closed sheet was active, the last remaining
    /// sheet in list order becomes active and its collections are loaded;
    /// the closed sheet's working copy is discarded, not snapshotted.
    pub fn close_sheet(&mut self, live: &mut Graph, sheet_id: &SheetId) -> Result<(), CloseSheetError> {
        if self.sheets.len() <= 1 {
            return Err(CloseSheetError::LastSheet);
        }
        let Some(index) = self.sheets.iter().position(|s| s.id() == sheet_id) else {
            return Err(CloseSheetError::Unknown {
                sheet_id: sheet_id.clone(),
            });
        };

        self.sheets.remove(index);

        if sheet_id == &self.active_sheet_id {
            let next = self.sheets.last().expect("at least one sheet remains");
            *live = next.checkout_graph();
            self.active_sheet_id = next.id().clone();
        }

        Ok(())
    }

    /// In-place rename; display names are not required to be unique. A no-op
    /// for an unknown id.
    pub fn rename_sheet(&mut self, sheet_id: &SheetId, name: impl Into<String>) {
        if let Some(sheet) = self.sheet_mut(sheet_id) {
            sheet.set_name(name);
        }
    }

    /// Records the file the active sheet was last persisted to.
    pub fn set_active_file_name<T: Into<String>>(&mut self, file_name: Option<T>) {
        let active_id = self.active_sheet_id.clone();
        if let Some(sheet) = self.sheet_mut(&active_id) {
            sheet.set_file_name(file_name);
        }
    }

    fn snapshot_active(&mut self, live: &Graph) {
        let active_id = self.active_sheet_id.clone();
        if let Some(sheet) = self.sheet_mut(&active_id) {
            sheet.store_graph(live);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseSheetError {
    LastSheet,
    Unknown { sheet_id: SheetId },
}

impl fmt::Display for CloseSheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastSheet => f.write_str("the last remaining sheet cannot be closed"),
            Self::Unknown { sheet_id } => write!(f, "no sheet with id {sheet_id}"),
        }
    }
}

impl std::error::Error for CloseSheetError {}
