//! Host document: the data blocks a page embeds for the reader.
//!
//! A page ships one data block per `(file id, type)` pair. This module models them as a JSON
//! document:
//!
//! ```json
//! {
//!   "main": 1,
//!   "scripts": [
//!     { "id": 1, "type": "source", "path": "src/main.c", "data": ["int main(void) {", "}"] },
//!     { "id": 1, "type": "link", "data": [] },
//!     { "id": 1, "type": "semantics", "data": [1, 1, 1, 4, "KEYWORD", "int"] }
//!   ]
//! }
//! ```
//!
//! Lookups follow first-match semantics: when a pair appears twice, the first block wins.

use reader_core::{AnnotationSources, FileId, LineIndex, LinkResolver};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Type tag of a data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    /// Line sequence of the file (carries the display path).
    Source,
    /// `link` annotation tuples.
    Link,
    /// `semantics` annotation tuples.
    Semantics,
    /// `decl` annotation tuples.
    Decl,
    /// `macro_decl` annotation tuples.
    MacroDecl,
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScriptType::Source => "source",
            ScriptType::Link => "link",
            ScriptType::Semantics => "semantics",
            ScriptType::Decl => "decl",
            ScriptType::MacroDecl => "macro_decl",
        })
    }
}

/// One embedded data block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// File the block belongs to.
    pub id: FileId,
    /// Block type.
    #[serde(rename = "type")]
    pub kind: ScriptType,
    /// Display path (meaningful on `source` blocks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Block payload: lines for `source`, flat tuples otherwise.
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    main: Option<FileId>,
    #[serde(default)]
    scripts: Vec<Script>,
}

/// Host document errors.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid host document: {0}")]
    /// The document is not valid JSON or does not have the expected shape.
    Json(#[from] serde_json::Error),

    #[error("unknown source for id({0})")]
    /// No `source` block exists for the id.
    UnknownFile(FileId),

    #[error("missing source path for id({0})")]
    /// The `source` block has no (or an empty) path.
    MissingPath(FileId),

    #[error("missing {kind} data for id({id})")]
    /// A required annotation block is absent. A block that is present but malformed only
    /// drops its own overlay.
    MissingData {
        /// File id.
        id: FileId,
        /// Missing block type.
        kind: ScriptType,
    },

    #[error("missing main declaration")]
    /// The document declares no main file.
    MissingMain,

    #[error("source for id({0}) is not an array of lines")]
    /// A `source` block's data is missing or not an array.
    SourceNotArray(FileId),

    #[error("source for id({id}) has a non-string line at index {line}")]
    /// A `source` block contains a line that is not a string.
    MalformedSource {
        /// File id.
        id: FileId,
        /// 0-based index of the offending line.
        line: usize,
    },
}

/// Everything needed to open one file.
#[derive(Debug, Clone, Copy)]
pub struct FileRecord<'a> {
    /// File id.
    pub id: FileId,
    /// Display path.
    pub path: &'a str,
    /// Line sequence.
    pub lines: &'a [Value],
    /// Annotation streams.
    pub annotations: AnnotationSources<'a>,
}

impl FileRecord<'_> {
    /// Build the line index of the file.
    pub fn line_index(&self) -> Result<LineIndex, HostError> {
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(line, value)| {
                value.as_str().ok_or(HostError::MalformedSource {
                    id: self.id,
                    line,
                })
            })
            .collect::<Result<Vec<&str>, HostError>>()?;
        Ok(LineIndex::from_lines(lines))
    }
}

/// Indexed host document.
#[derive(Debug, Clone, Default)]
pub struct HostDocument {
    main: Option<FileId>,
    scripts: HashMap<(FileId, ScriptType), Script>,
}

impl HostDocument {
    /// Parse a host document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, HostError> {
        let raw: RawDocument = serde_json::from_str(text)?;
        Ok(Self::from_scripts(raw.main, raw.scripts))
    }

    /// Parse a host document from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, HostError> {
        let raw: RawDocument = serde_json::from_value(value)?;
        Ok(Self::from_scripts(raw.main, raw.scripts))
    }

    /// Index data blocks; the first block of each `(id, type)` pair wins.
    pub fn from_scripts(main: Option<FileId>, scripts: impl IntoIterator<Item = Script>) -> Self {
        let mut indexed = HashMap::new();
        for script in scripts {
            let key = (script.id, script.kind);
            if indexed.contains_key(&key) {
                tracing::warn!(id = %script.id, kind = %script.kind, "ignoring duplicate data block");
                continue;
            }
            indexed.insert(key, script);
        }
        Self {
            main,
            scripts: indexed,
        }
    }

    /// The id declared as main.
    pub fn default_id(&self) -> Result<FileId, HostError> {
        self.main.ok_or(HostError::MissingMain)
    }

    /// The data block for `(id, kind)`, if any.
    pub fn script(&self, id: FileId, kind: ScriptType) -> Option<&Script> {
        self.scripts.get(&(id, kind))
    }

    /// Display path of `id`, if it has a source block with a path.
    pub fn path(&self, id: FileId) -> Option<&str> {
        self.script(id, ScriptType::Source)?
            .path
            .as_deref()
            .filter(|path| !path.is_empty())
    }

    /// Ids of every file with a source block, ascending.
    pub fn file_ids(&self) -> Vec<FileId> {
        let mut ids: Vec<FileId> = self
            .scripts
            .keys()
            .filter(|(_, kind)| *kind == ScriptType::Source)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Collect everything needed to open `id`.
    ///
    /// `link` and `semantics` blocks are required; `decl` and `macro_decl` are optional.
    pub fn record(&self, id: FileId) -> Result<FileRecord<'_>, HostError> {
        let source = self
            .script(id, ScriptType::Source)
            .ok_or(HostError::UnknownFile(id))?;
        let path = self.path(id).ok_or(HostError::MissingPath(id))?;
        let lines = source
            .data
            .as_array()
            .ok_or(HostError::SourceNotArray(id))?;

        let annotations = AnnotationSources {
            link: Some(self.required_block(id, ScriptType::Link)?),
            semantics: Some(self.required_block(id, ScriptType::Semantics)?),
            decl: self.block(id, ScriptType::Decl),
            macro_decl: self.block(id, ScriptType::MacroDecl),
        };

        Ok(FileRecord {
            id,
            path,
            lines,
            annotations,
        })
    }

    fn block(&self, id: FileId, kind: ScriptType) -> Option<&Value> {
        self.script(id, kind).map(|script| &script.data)
    }

    fn required_block(&self, id: FileId, kind: ScriptType) -> Result<&Value, HostError> {
        self.block(id, kind).ok_or(HostError::MissingData { id, kind })
    }
}

impl LinkResolver for HostDocument {
    fn display_target(&self, file: FileId) -> Option<String> {
        self.path(file).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(id: u32, path: Option<&str>) -> Script {
        Script {
            id: FileId(id),
            kind: ScriptType::Source,
            path: path.map(str::to_string),
            data: json!(["a"]),
        }
    }

    #[test]
    fn test_first_block_wins() {
        let doc = HostDocument::from_scripts(
            None,
            vec![source(1, Some("first.c")), source(1, Some("second.c"))],
        );
        assert_eq!(doc.path(FileId(1)), Some("first.c"));
        assert_eq!(doc.file_ids(), vec![FileId(1)]);
    }

    #[test]
    fn test_empty_path_is_missing() {
        let doc = HostDocument::from_scripts(None, vec![source(1, Some(""))]);
        assert!(matches!(
            doc.record(FileId(1)),
            Err(HostError::MissingPath(FileId(1)))
        ));
    }

    #[test]
    fn test_source_without_lines() {
        let mut script = source(1, Some("a.c"));
        script.data = Value::Null;
        let doc = HostDocument::from_scripts(None, vec![script]);

        let err = doc.record(FileId(1)).unwrap_err();
        assert!(matches!(err, HostError::SourceNotArray(FileId(1))));
        assert_eq!(err.to_string(), "source for id(1) is not an array of lines");
    }

    #[test]
    fn test_missing_main() {
        let doc = HostDocument::default();
        assert!(matches!(doc.default_id(), Err(HostError::MissingMain)));
    }
}
