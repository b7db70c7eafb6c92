// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence: the flow document format and the folder-backed store.

pub mod document;
pub mod flow_folder;

pub use document::{parse_document, serialize_document, DocumentError};
pub use flow_folder::{
    suggested_file_name, FlowFolder, LoadedFlow, StoreError, DEFAULT_FLOW_FILE_STEM,
};
