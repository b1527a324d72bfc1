//! Turns decoded annotations into decorations and answers hover/click queries.
//!
//! Marks are sorted before they are stored, so hosts that require ordered input (most editor
//! widgets do) can submit [`DecorationSet::marks`] as-is. Overlapping marks are kept side by side;
//! a keyword inside an inactive preprocessor region carries both classes.

use crate::annotations::{AnnotationSources, Annotations, Decoder};
use crate::decorations::{
    DecorationKind, DecorationRange, HoverInfo, LinkDecoration, LinkResolver, MarkDecoration,
    OpenFile, Tooltip, TooltipContent,
};
use crate::error::DecodeError;
use crate::intervals::{RangeSet, Ranged};
use crate::line_index::{ColumnEncoding, LineIndex};

/// Every decoration of one document, sorted and immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    marks: RangeSet<MarkDecoration>,
    links: RangeSet<LinkDecoration>,
    hovers: RangeSet<HoverInfo>,
}

impl DecorationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build decorations from decoded annotations.
    pub fn from_annotations(annotations: &Annotations) -> Self {
        let marks = annotations
            .semantics
            .iter()
            .map(|r| {
                Ranged::new(
                    r.from,
                    r.to,
                    MarkDecoration::from_class_attr(&r.payload.class_attr()),
                )
            })
            .collect();

        let links = annotations
            .links
            .iter()
            .map(|r| {
                Ranged::new(
                    r.from,
                    r.to,
                    LinkDecoration {
                        target: r.payload.file,
                    },
                )
            })
            .collect();

        let hovers = annotations
            .decls
            .iter()
            .map(|r| Ranged::new(r.from, r.to, HoverInfo::Decl(r.payload.clone())))
            .chain(
                annotations
                    .macros
                    .iter()
                    .map(|r| Ranged::new(r.from, r.to, HoverInfo::Macro(r.payload.clone()))),
            )
            .collect();

        Self {
            marks,
            links,
            hovers,
        }
    }

    /// Style marks, sorted by start offset.
    pub fn marks(&self) -> &RangeSet<MarkDecoration> {
        &self.marks
    }

    /// Link marks, sorted by start offset.
    pub fn links(&self) -> &RangeSet<LinkDecoration> {
        &self.links
    }

    /// Hover-only decorations, sorted by start offset.
    pub fn hovers(&self) -> &RangeSet<HoverInfo> {
        &self.hovers
    }

    /// Number of decorations of a kind.
    pub fn count(&self, kind: DecorationKind) -> usize {
        match kind {
            DecorationKind::Mark => self.marks.len(),
            DecorationKind::Link => self.links.len(),
            DecorationKind::Hover => self.hovers.len(),
        }
    }

    /// Whether the set holds no decorations at all.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty() && self.links.is_empty() && self.hovers.is_empty()
    }

    /// Replace the held decorations with `next` if they differ structurally.
    ///
    /// Returns `true` when the set changed and the host needs to redraw.
    pub fn replace(&mut self, next: DecorationSet) -> bool {
        if *self == next {
            return false;
        }
        *self = next;
        true
    }

    /// Tooltip for the decoration under `pos`.
    ///
    /// Links take precedence over declaration info; among several matches of the same kind the
    /// innermost (last in sorted order) wins.
    pub fn hover(&self, pos: usize, resolver: &dyn LinkResolver) -> Option<Tooltip> {
        if let Some(link) = self.links.between(pos, pos).last() {
            let target = link.value.target;
            let label = resolver
                .display_target(target)
                .unwrap_or_else(|| target.to_string());
            return Some(Tooltip {
                range: DecorationRange::new(link.from, link.to),
                content: TooltipContent::Link { target, label },
            });
        }

        let hover = self.hovers.between(pos, pos).last()?;
        let content = match &hover.value {
            HoverInfo::Decl(decl) => TooltipContent::Decl(decl.clone()),
            HoverInfo::Macro(info) => TooltipContent::Macro(info.clone()),
        };
        Some(Tooltip {
            range: DecorationRange::new(hover.from, hover.to),
            content,
        })
    }

    /// The navigation request produced by activating the link under `pos`, if any.
    pub fn follow(&self, pos: usize) -> Option<OpenFile> {
        self.links.between(pos, pos).last().map(|link| OpenFile {
            id: Some(link.value.target),
        })
    }
}

/// A read-only editor view: document, decorations and the decode failures that were tolerated.
#[derive(Debug, Clone)]
pub struct SourceView {
    index: LineIndex,
    decorations: DecorationSet,
    failures: Vec<DecodeError>,
}

impl SourceView {
    /// Decode `sources` against `index` and build the view.
    ///
    /// Runs synchronously; a kind that fails to decode is left out and recorded in
    /// [`SourceView::failures`].
    pub fn new(
        index: LineIndex,
        decoder_config: DecoderConfig,
        sources: &AnnotationSources<'_>,
    ) -> Self {
        let decoder = Decoder::new(&index).with_columns(decoder_config.columns);
        let annotations = Annotations::decode(&decoder, sources);
        let decorations = DecorationSet::from_annotations(&annotations);
        Self {
            index,
            decorations,
            failures: annotations.failures,
        }
    }

    /// Document line index.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Decorations.
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    /// Annotation kinds that failed to decode (the view renders without them).
    pub fn failures(&self) -> &[DecodeError] {
        &self.failures
    }

    /// Tooltip for the 1-based `(row, column)` position, if any.
    pub fn hover_at(
        &self,
        row: usize,
        column: usize,
        resolver: &dyn LinkResolver,
    ) -> Option<Tooltip> {
        let pos = self.index.offset_at(row, column, ColumnEncoding::Chars)?;
        self.decorations.hover(pos, resolver)
    }

    /// Navigation request for the link at the 1-based `(row, column)` position, if any.
    pub fn follow_at(&self, row: usize, column: usize) -> Option<OpenFile> {
        let pos = self.index.offset_at(row, column, ColumnEncoding::Chars)?;
        self.decorations.follow(pos)
    }
}

/// Decoding options for a [`SourceView`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// How annotation columns are counted.
    pub columns: ColumnEncoding,
}
