// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::{Edge, Node};

use super::document::{parse_document, serialize_document, DocumentError};

/// File stem used when no sheet name survives sanitization.
pub const DEFAULT_FLOW_FILE_STEM: &str = "game-dialogue";

/// A flow loaded from disk, ready to become a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFlow {
    pub name: String,
    pub file_name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Directory-backed persistence: one `<sheet-name>.json` per flow.
///
/// Writes go through a temp file and rename so a crash mid-save never leaves
/// a truncated document behind. File names are plain segments inside the
/// root; anything that would escape it is refused.
#[derive(Debug, Clone)]
pub struct FlowFolder {
    root: PathBuf,
}

impl FlowFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn flow_path(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }

    /// Saves the collections as `<sheet-name>.json`, returning the file name
    /// actually written. When the sheet was previously saved under a
    /// different name, the stale file is removed first (best effort on a
    /// file that already disappeared, an error otherwise).
    pub fn save_flow(
        &self,
        sheet_name: &str,
        previous_file_name: Option<&str>,
        nodes: &[Node],
        edges: &[Edge],
    ) -> Result<String, StoreError> {
        let file_name = suggested_file_name(sheet_name);
        let path = self.flow_path(&file_name)?;

        if let Some(previous) = previous_file_name {
            if previous != file_name {
                let previous_path = self.flow_path(previous)?;
                match fs::remove_file(&previous_path) {
                    Ok(()) => {}
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(source) => {
                        return Err(StoreError::Io {
                            path: previous_path,
                            source,
                        });
                    }
                }
            }
        }

        let text = serialize_document(nodes, edges).map_err(|source| StoreError::Document {
            path: path.clone(),
            source,
        })?;
        self.write_atomic(&path, text.as_bytes())?;

        Ok(file_name)
    }

    /// Reads and parses one flow file. On any failure nothing of the live
    /// state is touched; the caller surfaces the error and moves on.
    pub fn load_flow(&self, file_name: &str) -> Result<LoadedFlow, StoreError> {
        let path = self.flow_path(file_name)?;
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let (nodes, edges) =
            parse_document(&text).map_err(|source| StoreError::Document { path, source })?;

        let name = file_name
            .strip_suffix(".json")
            .unwrap_or(file_name)
            .to_owned();

        Ok(LoadedFlow {
            name,
            file_name: file_name.to_owned(),
            nodes,
            edges,
        })
    }

    /// Lists the folder's flow files (`*.json`, case-insensitive), sorted by
    /// name. A folder that does not exist yet lists as empty.
    pub fn flow_files(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                });
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let is_flow = Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_flow {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut tmp_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tmp_name.push_str(".tmp");
        let tmp_path = self.root.join(tmp_name);

        fs::write(&tmp_path, contents).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The suggested file name for a sheet: its display name with a `.json`
/// extension, path-hostile characters replaced, with a default when nothing
/// usable remains.
pub fn suggested_file_name(sheet_name: &str) -> String {
    let stem = sheet_name
        .trim()
        .replace('/', "-")
        .replace('\\', "-")
        .trim_matches('.')
        .to_owned();

    if stem.is_empty() {
        format!("{DEFAULT_FLOW_FILE_STEM}.json")
    } else {
        format!("{stem}.json")
    }
}

fn validate_file_name(file_name: &str) -> Result<(), StoreError> {
    let plain_segment = !file_name.is_empty()
        && file_name != "."
        && file_name != ".."
        && !file_name.contains('/')
        && !file_name.contains('\\');
    if plain_segment {
        Ok(())
    } else {
        Err(StoreError::InvalidFileName {
            value: file_name.to_owned(),
        })
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Document {
        path: PathBuf,
        source: DocumentError,
    },
    InvalidFileName {
        value: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            Self::Document { path, source } => {
                write!(f, "invalid flow document {}: {source}", path.display())
            }
            Self::InvalidFileName { value } => write!(f, "invalid flow file name '{value}'"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Document { source, .. } => Some(source),
            Self::InvalidFileName { .. } => None,
        }
    }
}
