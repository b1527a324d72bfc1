#![warn(missing_docs)]
//! Reader Core - Headless Source Reader Kernel
//!
//! # Overview
//!
//! `reader-core` turns the flat annotation arrays produced by a source indexer into decorations
//! over a read-only document: semantic class marks, navigable links and declaration tooltips.
//! It does not paint anything; hosts either submit [`DecorationSet::marks`] to their own text
//! widget or render [`LineSnapshot`]s cell by cell.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  SourceView (hover / follow queries)        │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Line Snapshots + Theme                     │  ← Rendering Data
//! ├─────────────────────────────────────────────┤
//! │  DecorationSet (marks, links, hovers)       │  ← Decorations
//! ├─────────────────────────────────────────────┤
//! │  Annotation Decoder (flat tuples → ranges)  │  ← Decoding
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← Line Access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use reader_core::{
//!     AnnotationSources, DecoderConfig, FileId, IdResolver, LineIndex, OpenFile, SourceView,
//! };
//! use serde_json::json;
//!
//! let index = LineIndex::from_lines(["#include \"a.h\"", "if (x) {}"]);
//! let link = json!([1, 10, 1, 15, 2]);
//! let semantics = json!([2, 1, 2, 3, "KEYWORD", "if"]);
//!
//! let sources = AnnotationSources {
//!     link: Some(&link),
//!     semantics: Some(&semantics),
//!     ..Default::default()
//! };
//! let view = SourceView::new(index, DecoderConfig::default(), &sources);
//! assert!(view.failures().is_empty());
//!
//! let tooltip = view.hover_at(1, 11, &IdResolver).unwrap();
//! assert_eq!(tooltip.follow(), Some(OpenFile { id: Some(FileId(2)) }));
//! ```
//!
//! # Module Description
//!
//! - [`line_index`] - Rope based line index
//! - [`annotations`] - Tuple decoding into offset ranges
//! - [`intervals`] - Sorted range sets with overlap queries
//! - [`decorations`] - Decoration and tooltip data model
//! - [`render`] - Decoration sets and source views
//! - [`snapshot`] - Headless line snapshots
//! - [`theme`] - Class-selector themes

pub mod annotations;
pub mod decorations;
mod error;
pub mod intervals;
pub mod line_index;
pub mod render;
pub mod snapshot;
pub mod theme;

pub use annotations::{
    AnnotationKind, AnnotationSources, Annotations, DECL_SPECIFIERS, DeclInfo, DecodedRange,
    Decoder, ElaboratedType, FileId, LinkTarget, MacroInfo, SemanticClass,
};
pub use decorations::{
    DecorationKind, DecorationRange, HoverInfo, IdResolver, LinkDecoration, LinkResolver,
    MarkDecoration, OpenFile, Tooltip, TooltipContent,
};
pub use error::{DecodeError, Malformed};
pub use intervals::{RangeSet, Ranged};
pub use line_index::{ColumnEncoding, LineIndex};
pub use render::{DecorationSet, DecoderConfig, SourceView};
pub use snapshot::{LineSnapshot, StyledSpan};
pub use theme::{ResolvedStyle, Rgb, Theme, ThemeRule};
