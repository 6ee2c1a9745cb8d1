#![forbid(unsafe_code)]

//! Token stream renderers: aligned table, JSON Lines and ANSI-colored source.

use std::io::Write;

use crossterm::style::{Color, ContentStyle, Stylize};
use serde::Serialize;
use suds_syntax::{LexStats, Token, TokenKind, Tokens};

use crate::cli::Format;
use crate::error::HarnessError;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Terminal styles per token category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Palette {
    pub heading: ContentStyle,
    pub string: ContentStyle,
    pub string_single: ContentStyle,
    pub string_escape: ContentStyle,
    pub comment: ContentStyle,
    pub comment_special: ContentStyle,
    pub class: ContentStyle,
    pub operator: ContentStyle,
    pub keyword: ContentStyle,
    pub variable: ContentStyle,
    pub constant: ContentStyle,
    pub number: ContentStyle,
    pub decorator: ContentStyle,
    pub label: ContentStyle,
    pub text: ContentStyle,
}

impl Palette {
    /// A palette with every style empty; output is the plain source.
    pub fn plain() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn style_for(&self, kind: TokenKind) -> ContentStyle {
        match kind {
            TokenKind::Heading => self.heading,
            TokenKind::String => self.string,
            TokenKind::StringSingle => self.string_single,
            TokenKind::StringEscape => self.string_escape,
            TokenKind::Comment => self.comment,
            TokenKind::CommentSpecial => self.comment_special,
            TokenKind::Class => self.class,
            TokenKind::Operator => self.operator,
            TokenKind::Keyword => self.keyword,
            TokenKind::Variable => self.variable,
            TokenKind::Constant => self.constant,
            TokenKind::Number => self.number,
            TokenKind::Decorator => self.decorator,
            TokenKind::Label => self.label,
            TokenKind::Text => self.text,
        }
    }

    /// Colors for dark terminal backgrounds.
    #[must_use]
    pub fn dark() -> Self {
        let purple = Color::Rgb { r: 198, g: 120, b: 221 };
        let blue = Color::Rgb { r: 97, g: 175, b: 239 };
        let cyan = Color::Rgb { r: 86, g: 182, b: 194 };
        let green = Color::Rgb { r: 152, g: 195, b: 121 };
        let orange = Color::Rgb { r: 209, g: 154, b: 102 };
        let red = Color::Rgb { r: 224, g: 108, b: 117 };
        let yellow = Color::Rgb { r: 229, g: 192, b: 123 };
        let gray = Color::Rgb { r: 92, g: 99, b: 112 };

        let style = ContentStyle::new;
        Self {
            heading: style().with(blue).bold(),
            string: style().with(cyan),
            string_single: style().with(cyan),
            string_escape: style().with(orange),
            comment: style().with(green).italic(),
            comment_special: style().with(gray).italic(),
            class: style().with(yellow).bold(),
            operator: style().with(gray),
            keyword: style().with(purple).bold(),
            variable: style().with(red),
            constant: style().with(orange),
            number: style().with(orange),
            decorator: style().with(yellow),
            label: style().with(blue).underlined(),
            text: style(),
        }
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TokenRecord<'a> {
    kind: TokenKind,
    name: &'static str,
    start: usize,
    end: usize,
    text: &'a str,
}

impl<'a> TokenRecord<'a> {
    fn new(token: &Token, source: &'a str) -> Self {
        Self {
            kind: token.kind,
            name: token.kind.name(),
            start: token.range.start,
            end: token.range.end,
            text: token.text(source),
        }
    }
}

/// Drain `tokens` into `out` in `format` and return the run's counters.
pub fn render<W: Write>(
    out: &mut W,
    source: &str,
    mut tokens: Tokens<'_>,
    format: Format,
    palette: &Palette,
) -> Result<LexStats, HarnessError> {
    for token in tokens.by_ref() {
        match format {
            Format::Table => write_table_row(out, source, &token)?,
            Format::Json => {
                serde_json::to_writer(&mut *out, &TokenRecord::new(&token, source))?;
                writeln!(out)?;
            }
            Format::Ansi => {
                let style = palette.style_for(token.kind);
                write!(out, "{}", style.apply(token.text(source)))?;
            }
        }
    }
    out.flush()?;
    Ok(tokens.stats())
}

fn write_table_row<W: Write>(out: &mut W, source: &str, token: &Token) -> Result<(), HarnessError> {
    let span = format!("{}..{}", token.range.start, token.range.end);
    writeln!(out, "{span:<12} {:<16} {:?}", token.kind.name(), token.text(source))?;
    Ok(())
}

/// One-line summary of `stats`.
pub fn write_stats<W: Write>(out: &mut W, stats: &LexStats, format: Format) -> Result<(), HarnessError> {
    match format {
        Format::Json => {
            let record = serde_json::json!({
                "steps": stats.steps,
                "recoveries": stats.recoveries,
                "pushes": stats.pushes,
                "pops": stats.pops,
            });
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        }
        Format::Table | Format::Ansi => writeln!(
            out,
            "steps={} recoveries={} pushes={} pops={}",
            stats.steps, stats.recoveries, stats.pushes, stats.pops
        )?,
    }
    Ok(())
}
