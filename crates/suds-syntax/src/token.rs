#![forbid(unsafe_code)]

//! Token model: categories and classified byte spans.

use std::ops::Range;

// ---------------------------------------------------------------------------
// Token kinds
// ---------------------------------------------------------------------------

/// Semantic categories emitted by the SUDS tokenizer.
///
/// The set is closed. Sub-kinds (`StringSingle`, `StringEscape`,
/// `CommentSpecial`) stay separate variants so a theme can style them apart
/// while still grouping them through the predicates below.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    /// Scene or section divider (`===`).
    Heading,
    /// Choice line text.
    String,
    /// Double-quoted literal inside an expression.
    StringSingle,
    /// Backtick-quoted literal inside an expression.
    StringEscape,
    /// `#` comment line.
    Comment,
    /// Line identifier tag (`@1f@`).
    CommentSpecial,
    /// Speaker label (`Alice:`).
    Class,
    Operator,
    Keyword,
    /// Variable name inside `{...}` or after `[set`.
    Variable,
    /// Boolean and gender literals.
    Constant,
    Number,
    /// Inline markup tag (`<b>`, `</>`).
    Decorator,
    /// Goto label line (`:label`).
    Label,
    /// Plain text, including whitespace.
    Text,
}

impl TokenKind {
    /// Every kind, in declaration order.
    pub const ALL: [TokenKind; 15] = [
        Self::Heading,
        Self::String,
        Self::StringSingle,
        Self::StringEscape,
        Self::Comment,
        Self::CommentSpecial,
        Self::Class,
        Self::Operator,
        Self::Keyword,
        Self::Variable,
        Self::Constant,
        Self::Number,
        Self::Decorator,
        Self::Label,
        Self::Text,
    ];

    /// Dotted category name as used by highlighter style sheets.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Heading => "Generic.Heading",
            Self::String => "String",
            Self::StringSingle => "String.Single",
            Self::StringEscape => "String.Escape",
            Self::Comment => "Comment",
            Self::CommentSpecial => "Comment.Special",
            Self::Class => "Name.Class",
            Self::Operator => "Operator",
            Self::Keyword => "Keyword",
            Self::Variable => "Name.Variable",
            Self::Constant => "Name.Constant",
            Self::Number => "Number",
            Self::Decorator => "Name.Decorator",
            Self::Label => "Name.Label",
            Self::Text => "Text",
        }
    }

    /// Look a kind up by its dotted name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether this kind is a string variant.
    pub fn is_string(self) -> bool {
        matches!(self, Self::String | Self::StringSingle | Self::StringEscape)
    }

    /// Whether this kind is a comment variant.
    pub fn is_comment(self) -> bool {
        matches!(self, Self::Comment | Self::CommentSpecial)
    }

    /// Whether this kind names something (speaker, variable, constant, tag, label).
    pub fn is_name(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Variable | Self::Constant | Self::Decorator | Self::Label
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A classified span of the source text.
///
/// Ranges are byte offsets into the source and always fall on `char`
/// boundaries. The tokenizer never emits empty tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

impl Token {
    /// Create a token. Panics in debug builds if the range is inverted.
    pub fn new(kind: TokenKind, range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end, "token range must be ordered");
        Self { kind, range }
    }

    /// Token length in bytes.
    pub fn len(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Whether the token covers no text.
    pub fn is_empty(&self) -> bool {
        self.range.start >= self.range.end
    }

    /// Extract the token's text from the source it was produced from.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.clone()]
    }
}
