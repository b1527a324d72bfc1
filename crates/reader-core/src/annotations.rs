//! Flat tuple-encoded annotations and their decoder.
//!
//! The host document ships every annotation kind as one flat JSON array. Each record occupies a
//! fixed number of slots (the kind's *tuple width*):
//!
//! | kind         | width | fields                                                                 |
//! |--------------|-------|------------------------------------------------------------------------|
//! | `link`       | 5     | begin row, begin col, end row, end col, target file id                 |
//! | `semantics`  | 6     | begin row, begin col, end row, end col, kind, name                     |
//! | `decl`       | 8     | row, col, name, kind, specs, elaborated type, qualified, desugared type |
//! | `macro_decl` | 5     | row, col, name, parameters, body                                       |
//!
//! Rows and columns are 1-based. `decl` and `macro_decl` spans start at `(row, col)` and cover the
//! declared name.
//!
//! Decoding a stream is all-or-nothing for that kind only: [`Annotations::decode`] keeps going with
//! the other kinds when one of them fails.

use crate::error::{DecodeError, Malformed};
use crate::line_index::{ColumnEncoding, LineIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a file record in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl FileId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An annotation stream kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Navigable spans (e.g. `#include` targets).
    Link,
    /// Lexical/semantic classes.
    Semantics,
    /// Declarations with type information.
    Decl,
    /// Macro definitions referenced from expansions.
    MacroDecl,
}

impl AnnotationKind {
    /// Every kind, in decoding order.
    pub const ALL: [AnnotationKind; 4] = [
        AnnotationKind::Link,
        AnnotationKind::Semantics,
        AnnotationKind::Decl,
        AnnotationKind::MacroDecl,
    ];

    /// Number of array slots consumed per record.
    pub const fn width(self) -> usize {
        match self {
            AnnotationKind::Link => 5,
            AnnotationKind::Semantics => 6,
            AnnotationKind::Decl => 8,
            AnnotationKind::MacroDecl => 5,
        }
    }

    /// The kind's name in the host document.
    pub const fn as_str(self) -> &'static str {
        match self {
            AnnotationKind::Link => "link",
            AnnotationKind::Semantics => "semantics",
            AnnotationKind::Decl => "decl",
            AnnotationKind::MacroDecl => "macro_decl",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded annotation: a half-open offset range plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRange<P> {
    /// Start offset (inclusive).
    pub from: usize,
    /// End offset (exclusive). Equal to `from` for zero-width markers.
    pub to: usize,
    /// Kind-specific payload.
    pub payload: P,
}

impl<P> DecodedRange<P> {
    /// Create a decoded range.
    pub fn new(from: usize, to: usize, payload: P) -> Self {
        Self { from, to, payload }
    }
}

/// Payload of a `link` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkTarget {
    /// The file the link navigates to.
    pub file: FileId,
}

/// Payload of a `semantics` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticClass {
    /// Lexical/semantic class (`KEYWORD`, `LITERAL`, `INACTIVE`, ...).
    pub kind: String,
    /// Optional sub-kind used for fine-grained styling (e.g. `if` for `KEYWORD.if`).
    pub name: Option<String>,
}

impl SemanticClass {
    /// The class attribute a mark for this class carries: `semantics <kind> [<name>]`.
    pub fn class_attr(&self) -> String {
        let mut out = format!("semantics {}", self.kind);
        if let Some(name) = &self.name {
            out.push(' ');
            out.push_str(name);
        }
        out
    }
}

/// Tag keyword of an elaborated type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ElaboratedType {
    /// Not an elaborated type.
    #[default]
    None,
    /// `struct`
    Struct,
    /// `union`
    Union,
    /// `enum`
    Enum,
}

impl ElaboratedType {
    fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(ElaboratedType::None),
            1 => Some(ElaboratedType::Struct),
            2 => Some(ElaboratedType::Union),
            3 => Some(ElaboratedType::Enum),
            _ => None,
        }
    }

    /// The keyword, or `""` for [`ElaboratedType::None`].
    pub fn keyword(self) -> &'static str {
        match self {
            ElaboratedType::None => "",
            ElaboratedType::Struct => "struct",
            ElaboratedType::Union => "union",
            ElaboratedType::Enum => "enum",
        }
    }
}

/// Storage-class and qualifier bits carried by `decl` annotations.
pub const DECL_SPECIFIERS: [(u32, &str); 5] = [
    (1, "extern"),
    (2, "static"),
    (4, "inline"),
    (8, "const"),
    (16, "volatile"),
];

/// Payload of a `decl` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclInfo {
    /// Declared identifier.
    pub name: String,
    /// Declaration kind (`FunctionDecl`, `VarDecl`, ...).
    pub kind: String,
    /// Specifier bits, see [`DECL_SPECIFIERS`].
    pub specs: u32,
    /// Elaborated type keyword.
    pub elaborated: ElaboratedType,
    /// Qualified type as written.
    pub qualified_type: String,
    /// Desugared type, when it differs from the qualified one.
    pub desugared_type: Option<String>,
}

impl DeclInfo {
    /// Specifier keywords set in [`DeclInfo::specs`], in canonical order.
    pub fn specifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        DECL_SPECIFIERS
            .iter()
            .filter(|(bit, _)| self.specs & bit != 0)
            .map(|(_, name)| *name)
    }
}

/// Payload of a `macro_decl` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroInfo {
    /// Macro name.
    pub name: String,
    /// Parameter list including parentheses, for function-like macros.
    pub parameters: Option<String>,
    /// Replacement list.
    pub body: Option<String>,
}

/// Walks one tuple's fields. Each decode call owns its cursors; nothing is shared.
struct TupleCursor<'a> {
    kind: AnnotationKind,
    index: usize,
    fields: &'a [Value],
    pos: usize,
}

impl<'a> TupleCursor<'a> {
    fn new(kind: AnnotationKind, index: usize, fields: &'a [Value]) -> Self {
        Self {
            kind,
            index,
            fields,
            pos: 0,
        }
    }

    fn malformed(&self, field: &'static str) -> DecodeError {
        DecodeError::MalformedAnnotation {
            kind: self.kind,
            reason: Malformed::Field {
                index: self.index,
                field,
            },
        }
    }

    fn next(&mut self) -> &'a Value {
        // Tuples are sliced to exactly `kind.width()` fields.
        let fields = self.fields;
        let value = &fields[self.pos];
        self.pos += 1;
        value
    }

    fn uint(&mut self, field: &'static str) -> Result<u64, DecodeError> {
        self.next().as_u64().ok_or_else(|| self.malformed(field))
    }

    fn string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        match self.next() {
            Value::String(s) => Ok(s.clone()),
            _ => Err(self.malformed(field)),
        }
    }

    /// `null` and `""` both mean "absent".
    fn opt_string(&mut self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.next() {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(self.malformed(field)),
        }
    }
}

/// Decodes flat annotation arrays against a document's line index.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    index: &'a LineIndex,
    columns: ColumnEncoding,
}

impl<'a> Decoder<'a> {
    /// Create a decoder counting columns in characters.
    pub fn new(index: &'a LineIndex) -> Self {
        Self {
            index,
            columns: ColumnEncoding::Chars,
        }
    }

    /// Use the given column encoding.
    pub fn with_columns(mut self, columns: ColumnEncoding) -> Self {
        self.columns = columns;
        self
    }

    /// The line index positions resolve against.
    pub fn line_index(&self) -> &'a LineIndex {
        self.index
    }

    /// Decode a `link` stream.
    pub fn links(&self, data: &[Value]) -> Result<Vec<DecodedRange<LinkTarget>>, DecodeError> {
        self.decode(AnnotationKind::Link, data, |cursor| {
            let (from, to) = self.span(cursor)?;
            let file = u32::try_from(cursor.uint("target")?)
                .map_err(|_| cursor.malformed("target"))?;
            Ok(DecodedRange::new(
                from,
                to,
                LinkTarget { file: FileId(file) },
            ))
        })
    }

    /// Decode a `semantics` stream.
    pub fn semantics(
        &self,
        data: &[Value],
    ) -> Result<Vec<DecodedRange<SemanticClass>>, DecodeError> {
        self.decode(AnnotationKind::Semantics, data, |cursor| {
            let (from, to) = self.span(cursor)?;
            let kind = cursor.string("kind")?;
            let name = cursor.opt_string("name")?;
            Ok(DecodedRange::new(from, to, SemanticClass { kind, name }))
        })
    }

    /// Decode a `decl` stream.
    pub fn decls(&self, data: &[Value]) -> Result<Vec<DecodedRange<DeclInfo>>, DecodeError> {
        self.decode(AnnotationKind::Decl, data, |cursor| {
            let (row, column) = (cursor.uint("row")?, cursor.uint("col")?);
            let name = cursor.string("name")?;
            let kind = cursor.string("kind")?;
            let specs =
                u32::try_from(cursor.uint("specs")?).map_err(|_| cursor.malformed("specs"))?;
            let elaborated = ElaboratedType::from_code(cursor.uint("elaborated_type")?)
                .ok_or_else(|| cursor.malformed("elaborated_type"))?;
            let qualified_type = cursor.opt_string("qualified_type")?.unwrap_or_default();
            let desugared_type = cursor
                .opt_string("desugared_type")?
                .filter(|desugared| *desugared != qualified_type);

            let (from, to) = self.name_span(cursor, row, column, &name)?;
            Ok(DecodedRange::new(
                from,
                to,
                DeclInfo {
                    name,
                    kind,
                    specs,
                    elaborated,
                    qualified_type,
                    desugared_type,
                },
            ))
        })
    }

    /// Decode a `macro_decl` stream.
    pub fn macro_decls(
        &self,
        data: &[Value],
    ) -> Result<Vec<DecodedRange<MacroInfo>>, DecodeError> {
        self.decode(AnnotationKind::MacroDecl, data, |cursor| {
            let (row, column) = (cursor.uint("row")?, cursor.uint("col")?);
            let name = cursor.string("name")?;
            let parameters = cursor.opt_string("parameters")?;
            let body = cursor.opt_string("body")?;

            let (from, to) = self.name_span(cursor, row, column, &name)?;
            Ok(DecodedRange::new(
                from,
                to,
                MacroInfo {
                    name,
                    parameters,
                    body,
                },
            ))
        })
    }

    fn decode<P, F>(
        &self,
        kind: AnnotationKind,
        data: &[Value],
        mut decode_tuple: F,
    ) -> Result<Vec<DecodedRange<P>>, DecodeError>
    where
        F: FnMut(&mut TupleCursor<'_>) -> Result<DecodedRange<P>, DecodeError>,
    {
        let width = kind.width();
        if data.len() % width != 0 {
            return Err(DecodeError::MalformedAnnotation {
                kind,
                reason: Malformed::Length {
                    len: data.len(),
                    width,
                },
            });
        }

        let mut out = Vec::with_capacity(data.len() / width);
        for (index, fields) in data.chunks_exact(width).enumerate() {
            let mut cursor = TupleCursor::new(kind, index, fields);
            let range = decode_tuple(&mut cursor)?;
            if range.to < range.from {
                return Err(DecodeError::MalformedAnnotation {
                    kind,
                    reason: Malformed::Inverted {
                        index,
                        from: range.from,
                        to: range.to,
                    },
                });
            }
            out.push(range);
        }
        Ok(out)
    }

    fn offset(
        &self,
        cursor: &TupleCursor<'_>,
        row: u64,
        column: u64,
    ) -> Result<usize, DecodeError> {
        let out_of_range = || DecodeError::OutOfRange {
            kind: cursor.kind,
            index: cursor.index,
            row,
            column,
        };
        let r = usize::try_from(row).map_err(|_| out_of_range())?;
        let c = usize::try_from(column).map_err(|_| out_of_range())?;
        self.index
            .offset_at(r, c, self.columns)
            .ok_or_else(out_of_range)
    }

    /// Reads `begin row, begin col, end row, end col`.
    fn span(&self, cursor: &mut TupleCursor<'_>) -> Result<(usize, usize), DecodeError> {
        let begin_row = cursor.uint("begin_row")?;
        let begin_col = cursor.uint("begin_col")?;
        let end_row = cursor.uint("end_row")?;
        let end_col = cursor.uint("end_col")?;

        let from = self.offset(cursor, begin_row, begin_col)?;
        let to = self.offset(cursor, end_row, end_col)?;
        Ok((from, to))
    }

    /// A span starting at `(row, column)` covering `name`, which must fit on that line.
    fn name_span(
        &self,
        cursor: &TupleCursor<'_>,
        row: u64,
        column: u64,
        name: &str,
    ) -> Result<(usize, usize), DecodeError> {
        let from = self.offset(cursor, row, column)?;
        let to = from + name.chars().count();

        let line_end = usize::try_from(row)
            .ok()
            .and_then(|r| Some(self.index.line_start(r)? + self.index.line_len(r)?));
        match line_end {
            Some(end) if to <= end => Ok((from, to)),
            _ => Err(DecodeError::OutOfRange {
                kind: cursor.kind,
                index: cursor.index,
                row,
                column,
            }),
        }
    }
}

/// Borrowed annotation blocks for one file, one optional stream per kind.
///
/// Each block is expected to be a flat JSON array; any other value fails that kind with
/// [`Malformed::Shape`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationSources<'a> {
    /// `link` stream.
    pub link: Option<&'a Value>,
    /// `semantics` stream.
    pub semantics: Option<&'a Value>,
    /// `decl` stream.
    pub decl: Option<&'a Value>,
    /// `macro_decl` stream.
    pub macro_decl: Option<&'a Value>,
}

impl<'a> AnnotationSources<'a> {
    /// The block for `kind`, if present.
    pub fn get(&self, kind: AnnotationKind) -> Option<&'a Value> {
        match kind {
            AnnotationKind::Link => self.link,
            AnnotationKind::Semantics => self.semantics,
            AnnotationKind::Decl => self.decl,
            AnnotationKind::MacroDecl => self.macro_decl,
        }
    }
}

fn stream(kind: AnnotationKind, block: &Value) -> Result<&[Value], DecodeError> {
    block
        .as_array()
        .map(Vec::as_slice)
        .ok_or(DecodeError::MalformedAnnotation {
            kind,
            reason: Malformed::Shape,
        })
}

/// Every annotation kind of one file, decoded independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Decoded links (empty if absent or failed).
    pub links: Vec<DecodedRange<LinkTarget>>,
    /// Decoded semantic classes (empty if absent or failed).
    pub semantics: Vec<DecodedRange<SemanticClass>>,
    /// Decoded declarations (empty if absent or failed).
    pub decls: Vec<DecodedRange<DeclInfo>>,
    /// Decoded macro definitions (empty if absent or failed).
    pub macros: Vec<DecodedRange<MacroInfo>>,
    /// One error per kind that failed to decode.
    pub failures: Vec<DecodeError>,
}

impl Annotations {
    /// Decode every present stream. A failing kind is logged, recorded in
    /// [`Annotations::failures`] and left empty; the other kinds are unaffected.
    pub fn decode(decoder: &Decoder<'_>, sources: &AnnotationSources<'_>) -> Self {
        let mut out = Annotations::default();

        if let Some(block) = sources.link {
            let result = stream(AnnotationKind::Link, block).and_then(|data| decoder.links(data));
            out.links = out.keep(result);
        }
        if let Some(block) = sources.semantics {
            let result =
                stream(AnnotationKind::Semantics, block).and_then(|data| decoder.semantics(data));
            out.semantics = out.keep(result);
        }
        if let Some(block) = sources.decl {
            let result = stream(AnnotationKind::Decl, block).and_then(|data| decoder.decls(data));
            out.decls = out.keep(result);
        }
        if let Some(block) = sources.macro_decl {
            let result =
                stream(AnnotationKind::MacroDecl, block).and_then(|data| decoder.macro_decls(data));
            out.macros = out.keep(result);
        }

        tracing::debug!(
            links = out.links.len(),
            semantics = out.semantics.len(),
            decls = out.decls.len(),
            macros = out.macros.len(),
            failures = out.failures.len(),
            "decoded annotations"
        );
        out
    }

    fn keep<P>(
        &mut self,
        result: Result<Vec<DecodedRange<P>>, DecodeError>,
    ) -> Vec<DecodedRange<P>> {
        match result {
            Ok(ranges) => ranges,
            Err(err) => {
                tracing::warn!(kind = %err.kind(), error = %err, "dropping annotation kind");
                self.failures.push(err);
                Vec::new()
            }
        }
    }

    /// Whether decoding of `kind` failed.
    pub fn failed(&self, kind: AnnotationKind) -> bool {
        self.failures.iter().any(|err| err.kind() == kind)
    }
}
