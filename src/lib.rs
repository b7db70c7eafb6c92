// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Thalia — terminal-first branching-dialogue flow editor.
//!
//! Authors place dialogue and choice nodes on a canvas, wire them into a
//! directed graph, organize work into named sheets ("flows") and persist
//! each flow as JSON in a flows directory.

pub mod canvas;
pub mod model;
pub mod ops;
pub mod store;
pub mod tui;

#[cfg(test)]
mod tests {
    #[test]
    fn sanity() {
        assert_eq!(2 + 2, 4);
    }
}
