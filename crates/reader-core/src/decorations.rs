//! Decoration data model.
//!
//! Decorations are UI-facing overlays anchored to document character offsets, without modifying
//! the document text:
//!
//! - style marks (CSS-class spans) for semantic classes
//! - links (interactive spans navigating to another file)
//! - hover info for declarations and macro definitions
//!
//! Values compare structurally, so a set rebuilt from the same tuples is equal to the old one
//! even though every payload was freshly allocated.

use crate::annotations::{DeclInfo, FileId, MacroInfo};

/// A half-open character-offset range (`start..end`) in the document.
///
/// For zero-width markers, `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationRange {
    /// Range start offset (inclusive).
    pub start: usize,
    /// Range end offset (exclusive).
    pub end: usize,
}

impl DecorationRange {
    /// Create a new decoration range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A coarse decoration kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecorationKind {
    /// Non-interactive style mark.
    Mark,
    /// Navigable link.
    Link,
    /// Hover-only information (declarations, macros).
    Hover,
}

/// A non-interactive style mark: the span gets every class in `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkDecoration {
    /// Class names, in attribute order (e.g. `["semantics", "KEYWORD", "if"]`).
    pub classes: Vec<String>,
}

impl MarkDecoration {
    /// Build a mark from a space-separated class attribute.
    pub fn from_class_attr(attr: &str) -> Self {
        Self {
            classes: attr.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// The space-separated class attribute.
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }
}

/// An interactive link mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkDecoration {
    /// Navigation target.
    pub target: FileId,
}

/// Hover payloads that do not navigate anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HoverInfo {
    /// A declaration.
    Decl(DeclInfo),
    /// A macro definition.
    Macro(MacroInfo),
}

/// What a tooltip shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TooltipContent {
    /// A link: display target plus a "Follow link" action.
    Link {
        /// The file the link opens.
        target: FileId,
        /// Display form of the target (its path when known).
        label: String,
    },
    /// A declaration.
    Decl(DeclInfo),
    /// A macro definition.
    Macro(MacroInfo),
}

impl TooltipContent {
    /// Root class of the tooltip element (`link`, `decl`, `macro_decl`).
    pub fn class_name(&self) -> &'static str {
        match self {
            TooltipContent::Link { .. } => "link",
            TooltipContent::Decl(_) => "decl",
            TooltipContent::Macro(_) => "macro_decl",
        }
    }

    /// Plain-text rendering for hosts without a DOM.
    pub fn summary(&self) -> String {
        match self {
            TooltipContent::Link { label, .. } => format!("header \"{label}\"  Follow link"),
            TooltipContent::Decl(decl) => {
                let mut out = String::new();
                for spec in decl.specifiers() {
                    out.push_str(spec);
                    out.push(' ');
                }
                let elaborated = decl.elaborated.keyword();
                if !elaborated.is_empty() {
                    out.push_str(elaborated);
                    out.push(' ');
                }
                out.push_str(decl_tag(&decl.kind));
                out.push_str(&decl.name);
                out.push_str(": ");
                out.push_str(&decl.qualified_type);
                if let Some(desugared) = &decl.desugared_type {
                    out.push_str(" (aka ");
                    out.push_str(desugared);
                    out.push(')');
                }
                out
            }
            TooltipContent::Macro(info) => {
                let mut out = format!("macro {}", info.name);
                if let Some(parameters) = &info.parameters {
                    out.push_str(parameters);
                }
                if let Some(body) = &info.body {
                    out.push(' ');
                    out.push_str(body);
                }
                out
            }
        }
    }
}

/// Short tag printed before a declared identifier.
fn decl_tag(kind: &str) -> &'static str {
    match kind {
        "FunctionDecl" => "func ",
        "VarDecl" => "var ",
        "ParmVarDecl" => "param ",
        "FieldDecl" => "field ",
        "TypedefDecl" => "type ",
        _ => "",
    }
}

/// A tooltip anchored to the decoration range it describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tooltip {
    /// Anchor range.
    pub range: DecorationRange,
    /// Content.
    pub content: TooltipContent,
}

impl Tooltip {
    /// The navigation request a click on the tooltip's action emits, for link tooltips.
    pub fn follow(&self) -> Option<OpenFile> {
        match self.content {
            TooltipContent::Link { target, .. } => Some(OpenFile { id: Some(target) }),
            _ => None,
        }
    }
}

/// Navigation request bubbled from an editor view to whoever hosts it.
///
/// The view never opens files itself; the panel host interprets the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpenFile {
    /// File to open; `None` means the host's default (main) file.
    pub id: Option<FileId>,
}

impl OpenFile {
    /// Name of the DOM event carrying this request.
    pub const EVENT_NAME: &'static str = "OpenFile";
}

/// Maps link targets to their display form (typically the target file's path).
pub trait LinkResolver {
    /// Display target for `file`, or `None` to fall back to the numeric id.
    fn display_target(&self, file: FileId) -> Option<String>;
}

/// Resolver that always falls back to the numeric id.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdResolver;

impl LinkResolver for IdResolver {
    fn display_target(&self, _file: FileId) -> Option<String> {
        None
    }
}

impl<F> LinkResolver for F
where
    F: Fn(FileId) -> Option<String>,
{
    fn display_target(&self, file: FileId) -> Option<String> {
        self(file)
    }
}
