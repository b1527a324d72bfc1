//! Class-selector themes.
//!
//! A [`Theme`] is an ordered list of `selector → declarations` rules written the way the page
//! styles them (camelCase property names). [`Theme::to_css`] renders a stylesheet for DOM hosts;
//! [`Theme::resolve`] runs a small cascade over compound class selectors (`.KEYWORD.if`) for hosts
//! that paint cells themselves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One style rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRule {
    /// CSS selector, e.g. `.KEYWORD.if` or `.link > .follow`.
    pub selector: String,
    /// Property → value, property names in camelCase.
    pub declarations: BTreeMap<String, String>,
}

impl ThemeRule {
    /// Create a rule from `(property, value)` pairs.
    pub fn new(selector: impl Into<String>, declarations: &[(&str, &str)]) -> Self {
        Self {
            selector: selector.into(),
            declarations: declarations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Class names of a compound class selector (`.a.b` → `["a", "b"]`).
    ///
    /// Returns `None` for selectors with combinators, pseudo-elements or non-class parts; those
    /// only apply to DOM hosts.
    fn compound_classes(&self) -> Option<Vec<&str>> {
        let rest = self.selector.trim().strip_prefix('.')?;
        let classes: Vec<&str> = rest.split('.').collect();
        let valid = classes.iter().all(|class| {
            !class.is_empty()
                && class
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });
        valid.then_some(classes)
    }
}

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb` or `#rgb` (an optional `!important` suffix is ignored).
    pub fn parse(value: &str) -> Option<Self> {
        let hex = strip_important(value).strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self {
                    r: short(0)?,
                    g: short(1)?,
                    b: short(2)?,
                })
            }
            _ => None,
        }
    }
}

/// Host-neutral result of resolving a class list against a theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    /// Foreground color.
    pub color: Option<Rgb>,
    /// Bold weight.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
    /// Dotted decoration line.
    pub dotted: bool,
}

/// Ordered style rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Rules in cascade order.
    pub rules: Vec<ThemeRule>,
}

impl Theme {
    /// Create a theme from rules.
    pub fn new(rules: Vec<ThemeRule>) -> Self {
        Self { rules }
    }

    /// Render the theme as CSS text (property names converted to kebab-case).
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            let _ = write!(out, "{} {{", rule.selector);
            for (property, value) in &rule.declarations {
                let _ = write!(out, " {}: {};", kebab_case(property), value);
            }
            out.push_str(" }\n");
        }
        out
    }

    /// Resolve the style of a span carrying `classes`.
    ///
    /// A compound selector applies when all of its classes are present. Properties cascade
    /// independently: selectors with more classes win, ties go to the later rule.
    pub fn resolve<S: AsRef<str>>(&self, classes: &[S]) -> ResolvedStyle {
        let mut matching: Vec<(usize, usize, &ThemeRule)> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(order, rule)| {
                let selector = rule.compound_classes()?;
                let applies = selector
                    .iter()
                    .all(|want| classes.iter().any(|have| have.as_ref() == *want));
                applies.then_some((selector.len(), order, rule))
            })
            .collect();
        matching.sort_by_key(|(specificity, order, _)| (*specificity, *order));

        let mut cascaded: BTreeMap<&str, &str> = BTreeMap::new();
        for (_, _, rule) in matching {
            for (property, value) in &rule.declarations {
                cascaded.insert(property, value);
            }
        }

        let mut style = ResolvedStyle::default();
        if let Some(color) = cascaded.get("color") {
            style.color = Rgb::parse(color);
        }
        if let Some(weight) = cascaded.get("fontWeight") {
            let weight = strip_important(weight);
            style.bold =
                weight == "bold" || weight.parse::<u16>().map(|w| w >= 600).unwrap_or(false);
        }
        if let Some(font_style) = cascaded.get("fontStyle") {
            style.italic = strip_important(font_style) == "italic";
        }
        if let Some(decoration) = cascaded.get("textDecoration") {
            style.underline = decoration.split_whitespace().any(|word| word == "underline");
            style.dotted = decoration.split_whitespace().any(|word| word == "dotted");
        }
        if let Some(line_style) = cascaded.get("textDecorationStyle") {
            style.dotted = strip_important(line_style) == "dotted";
        }
        style
    }
}

impl Default for Theme {
    /// The built-in light palette, including the link tooltip styles.
    fn default() -> Self {
        const TYPE_KEYWORDS: [&str; 5] = ["int", "long", "short", "char", "_Bool"];
        const FLOW_KEYWORDS: [&str; 11] = [
            "if", "else", "return", "for", "while", "goto", "continue", "break", "switch", "case",
            "default",
        ];

        let mut rules = vec![
            ThemeRule::new(".link", &[("fontFamily", "monospace"), ("margin", "5px")]),
            ThemeRule::new(
                ".link::before",
                &[
                    ("color", "#808080"),
                    ("fontStyle", "italic"),
                    ("content", "\"header \""),
                ],
            ),
            ThemeRule::new(
                ".link .file",
                &[
                    ("color", "#A31515"),
                    ("fontWeight", "bold"),
                    ("quotes", "'\"' '\"'"),
                ],
            ),
            ThemeRule::new(".link .file::before", &[("content", "open-quote")]),
            ThemeRule::new(".link .file::after", &[("content", "close-quote")]),
            ThemeRule::new(".link > .follow", &[("margin", "5px"), ("cursor", "pointer")]),
            ThemeRule::new(".KEYWORD", &[("color", "#0000ff")]),
        ];
        for keyword in TYPE_KEYWORDS {
            rules.push(ThemeRule::new(format!(".KEYWORD.{keyword}"), &[("color", "#2B91AF")]));
        }
        for keyword in FLOW_KEYWORDS {
            rules.push(ThemeRule::new(format!(".KEYWORD.{keyword}"), &[("color", "#8F08C4")]));
        }

        let plain = [
            (".PPKEYWORD", "#808080"),
            (".LITERAL", "#A31515"),
            (".numeric_constant", "#098658"),
            (".char_constant", "#0000ff"),
            (".INACTIVE", "#E5EBF1"),
            (".COMMENT", "#008000"),
            (".IDENTIFIER", "#000000"),
            (".macro", "#0000ff"),
            (".function_like_macro", "#8A1BFF"),
            (".Function", "#795E26"),
            (".Var", "#001080"),
            (".ParmVar", "#808080"),
            (".Field", "#0451a5"),
            (".Typedef", "#267f99"),
            (".PUNCTUATION", "#A31515"),
            (".TOKEN", "#000000"),
        ];
        rules.extend(
            plain
                .iter()
                .map(|(selector, color)| ThemeRule::new(*selector, &[("color", *color)])),
        );

        rules.push(ThemeRule::new(
            ".header_name",
            &[("color", "#a31515"), ("textDecoration", "underline 1px")],
        ));
        rules.push(ThemeRule::new(
            ".EXPANSION",
            &[
                ("textDecorationStyle", "dotted !important"),
                ("textDecoration", "underline 1px"),
            ],
        ));

        Self { rules }
    }
}

fn strip_important(value: &str) -> &str {
    value.trim().trim_end_matches("!important").trim_end()
}

/// `textDecorationStyle` → `text-decoration-style`.
fn kebab_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
