//! Headless line snapshots.
//!
//! Splits a line into maximal spans sharing the same decoration state, which is what a renderer
//! without a DOM (terminal, image, test) needs to paint composed marks.

use crate::annotations::FileId;
use crate::line_index::LineIndex;
use crate::render::DecorationSet;

/// A run of characters with identical decorations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// Text of the run.
    pub text: String,
    /// 0-based character column where the run starts.
    pub column: usize,
    /// Classes of every mark covering the run, outer marks first, without duplicates.
    pub classes: Vec<String>,
    /// Link target if the run is inside a link.
    pub link: Option<FileId>,
}

impl StyledSpan {
    /// Whether the run carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// One document line split into styled runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    /// 1-based row.
    pub row: usize,
    /// Runs covering the whole line, in order. Empty for an empty line.
    pub spans: Vec<StyledSpan>,
}

impl LineSnapshot {
    /// Build the snapshot of the 1-based `row`, or `None` past the end of the document.
    pub fn build(index: &LineIndex, decorations: &DecorationSet, row: usize) -> Option<Self> {
        let start = index.line_start(row)?;
        let text = index.line_text(row)?;
        let chars: Vec<char> = text.chars().collect();
        let end = start + chars.len();

        let marks: Vec<_> = decorations
            .marks()
            .overlapping(start, end)
            .filter(|m| !m.is_empty())
            .collect();
        let links: Vec<_> = decorations
            .links()
            .overlapping(start, end)
            .filter(|l| !l.is_empty())
            .collect();

        let mut cuts = vec![start, end];
        for (from, to) in marks
            .iter()
            .map(|m| (m.from, m.to))
            .chain(links.iter().map(|l| (l.from, l.to)))
        {
            cuts.push(from.clamp(start, end));
            cuts.push(to.clamp(start, end));
        }
        cuts.sort_unstable();
        cuts.dedup();

        let mut spans: Vec<StyledSpan> = Vec::new();
        for window in cuts.windows(2) {
            let (a, b) = (window[0], window[1]);
            if a == b {
                continue;
            }

            let mut classes: Vec<String> = Vec::new();
            for mark in marks.iter().filter(|m| m.from <= a && m.to >= b) {
                for class in &mark.value.classes {
                    if !classes.contains(class) {
                        classes.push(class.clone());
                    }
                }
            }
            let link = links
                .iter()
                .filter(|l| l.from <= a && l.to >= b)
                .last()
                .map(|l| l.value.target);

            let segment: String = chars[a - start..b - start].iter().collect();
            match spans.last_mut() {
                Some(prev) if prev.classes == classes && prev.link == link => {
                    prev.text.push_str(&segment);
                }
                _ => spans.push(StyledSpan {
                    text: segment,
                    column: a - start,
                    classes,
                    link,
                }),
            }
        }

        Some(Self { row, spans })
    }
}
