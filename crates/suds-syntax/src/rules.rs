#![forbid(unsafe_code)]

//! Rule table for the SUDS tokenizer.
//!
//! A [`RuleTable`] holds one ordered rule list per [`LexState`]. The
//! tokenizer tries the active state's rules in declaration order and applies
//! the first one whose [`Pattern`] matches at the cursor, so order is part of
//! the table's meaning: earlier rules win even when a later rule would match
//! more text.
//!
//! Patterns are hand-written anchored matchers. Each one mirrors the regular
//! expression shown on its variant, including its backtracking behaviour,
//! and sees the whole source so word boundaries look at the character before
//! the cursor.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use smallvec::SmallVec;

use crate::token::TokenKind;
use crate::token::TokenKind as K;

// ---------------------------------------------------------------------------
// States, actions, transitions
// ---------------------------------------------------------------------------

/// Lexer states. The bottom of the state stack is always `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LexState {
    #[default]
    Default,
    /// Inside the text of a speaker line, until `@` or end of line.
    SpeakerLine,
}

impl LexState {
    pub const ALL: [LexState; 2] = [Self::Default, Self::SpeakerLine];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::SpeakerLine => "speakerline",
        }
    }
}

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a match is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The whole match gets one kind.
    Single(TokenKind),
    /// One kind per capture group, positionally.
    Groups(&'static [TokenKind]),
}

/// State change applied after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    None,
    Push(LexState),
    Pop,
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Result of a successful anchored match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    /// Byte offset one past the match.
    pub end: usize,
    /// Capture group spans, in group order. Empty for ungrouped patterns.
    pub groups: SmallVec<[Range<usize>; 5]>,
}

impl Captures {
    fn whole(end: usize) -> Self {
        Self {
            end,
            groups: SmallVec::new(),
        }
    }
}

const OPERATOR_WORDS: &[&str] = &["and", "or", "&&", "||", "not"];

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "elseif", "endif", "event", "return", "goto", "gosub", "go to", "go sub",
];

const CONSTANT_WORDS: &[&str] = &[
    "true",
    "True",
    "false",
    "False",
    "masculine",
    "Masculine",
    "feminine",
    "Feminine",
    "neuter",
    "Neuter",
];

const PIPE_FUNCTIONS: &[&str] = &["plural", "gender"];

/// The operator rule matches this exact sequence, not a character class.
const OPERATOR_SEQUENCE: &str = "+/-*!";

/// Anchored matchers, one per distinct pattern of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `===\s*\n`
    Heading,
    /// `\s*\*\s+[^@\n]+[@\n]`
    Choice,
    /// `\s*#.*\n`
    CommentLine,
    /// `\s*\S+:`
    Speaker,
    /// A fixed string (`]`, `</>`).
    Literal(&'static str),
    /// `\b(and|or|&&|\|\||not)\b`
    OperatorWord,
    /// `(\[)\s*(set)(\s+)(\S+)`
    SetCommand,
    /// `(\[)\s*(if|else|...|go sub)\b`
    ControlCommand,
    /// `(\{)([\w.]+)(\})`
    VariableRef,
    /// `(\|)(plural|gender)(\()(.*?)(\))`
    PipeFunction,
    /// `\b([tT]rue|[fF]alse|[mM]asculine|[fF]eminine|[nN]euter)\b`
    ConstantWord,
    /// `\+/-\*!`
    OperatorSequence,
    /// `"[^"]*"` or `` `[^`]*` ``, keyed by the delimiter.
    Quoted(char),
    /// `\d+(\.\d+)?`
    Number,
    /// `@[0-9a-fA-F]+@`
    LineId,
    /// `<\w+>`
    OpenTag,
    /// `\s*:\S+\n`
    GotoLabel,
    /// `\s+\n?`
    Whitespace,
    /// `\S+?\n?`
    NonWhitespace,
    /// `[@\n]`
    LineEnd,
    /// `[^@\n<{]+`
    LineText,
}

impl Pattern {
    /// Number of capture groups the pattern reports.
    pub const fn group_count(self) -> usize {
        match self {
            Self::SetCommand => 4,
            Self::ControlCommand => 2,
            Self::VariableRef => 3,
            Self::PipeFunction => 5,
            _ => 0,
        }
    }

    /// Match anchored at byte offset `at` of `source`.
    ///
    /// `at` must lie on a char boundary. A returned match always ends past
    /// `at`: no pattern of this enum matches the empty string.
    pub fn match_at(self, source: &str, at: usize) -> Option<Captures> {
        let rest = &source[at..];
        match self {
            Self::Heading => {
                let ws_start = at + prefix_len(rest, "===")?;
                let ws_end = skip_while(source, ws_start, is_space);
                let newline = source[ws_start..ws_end].rfind('\n')?;
                Some(Captures::whole(ws_start + newline + 1))
            }
            Self::Choice => {
                let star = skip_while(source, at, is_space);
                if !source[star..].starts_with('*') {
                    return None;
                }
                let ws_start = star + 1;
                let ws_end = skip_while(source, ws_start, is_space);
                // `\s+` backs off one char at a time until the body can close.
                let mut split = ws_end;
                while split > ws_start {
                    let body_end = skip_while(source, split, |c| c != '@' && c != '\n');
                    if body_end > split && source[body_end..].starts_with(['@', '\n']) {
                        return Some(Captures::whole(body_end + 1));
                    }
                    split = prev_boundary(source, split);
                }
                None
            }
            Self::CommentLine => {
                let hash = skip_while(source, at, is_space);
                if !source[hash..].starts_with('#') {
                    return None;
                }
                let newline = source[hash..].find('\n')?;
                Some(Captures::whole(hash + newline + 1))
            }
            Self::Speaker => {
                let word = skip_while(source, at, is_space);
                let word_end = skip_while(source, word, |c| !is_space(c));
                let colon = source[word..word_end].rfind(':').filter(|&i| i > 0)?;
                Some(Captures::whole(word + colon + 1))
            }
            Self::Literal(lit) => {
                let len = prefix_len(rest, lit)?;
                (len > 0).then(|| Captures::whole(at + len))
            }
            Self::OperatorWord => match_word(source, at, OPERATOR_WORDS),
            Self::ConstantWord => match_word(source, at, CONSTANT_WORDS),
            Self::SetCommand => {
                prefix_len(rest, "[")?;
                let kw = skip_while(source, at + 1, is_space);
                let kw_end = kw + prefix_len(&source[kw..], "set")?;
                let ws_end = skip_while(source, kw_end, is_space);
                let name_end = skip_while(source, ws_end, |c| !is_space(c));
                if ws_end == kw_end || name_end == ws_end {
                    return None;
                }
                Some(Captures {
                    end: name_end,
                    groups: SmallVec::from_iter([
                        at..at + 1,
                        kw..kw_end,
                        kw_end..ws_end,
                        ws_end..name_end,
                    ]),
                })
            }
            Self::ControlCommand => {
                prefix_len(rest, "[")?;
                let kw = skip_while(source, at + 1, is_space);
                let kw_end = CONTROL_KEYWORDS.iter().find_map(|word| {
                    let end = kw + prefix_len(&source[kw..], word)?;
                    is_word_boundary(source, end).then_some(end)
                })?;
                Some(Captures {
                    end: kw_end,
                    groups: SmallVec::from_iter([at..at + 1, kw..kw_end]),
                })
            }
            Self::VariableRef => {
                prefix_len(rest, "{")?;
                let name = at + 1;
                let name_end = skip_while(source, name, |c| is_word_char(c) || c == '.');
                if name_end == name || !source[name_end..].starts_with('}') {
                    return None;
                }
                Some(Captures {
                    end: name_end + 1,
                    groups: SmallVec::from_iter([at..name, name..name_end, name_end..name_end + 1]),
                })
            }
            Self::PipeFunction => {
                prefix_len(rest, "|")?;
                let func = at + 1;
                let func_end = PIPE_FUNCTIONS
                    .iter()
                    .find_map(|name| prefix_len(&source[func..], name).map(|len| func + len))?;
                prefix_len(&source[func_end..], "(")?;
                let arg = func_end + 1;
                // Lazy `.*?`: the first `)` on the same line closes the call.
                let close = source[arg..]
                    .find([')', '\n'])
                    .map(|i| arg + i)
                    .filter(|&i| source[i..].starts_with(')'))?;
                Some(Captures {
                    end: close + 1,
                    groups: SmallVec::from_iter([
                        at..func,
                        func..func_end,
                        func_end..arg,
                        arg..close,
                        close..close + 1,
                    ]),
                })
            }
            Self::OperatorSequence => {
                prefix_len(rest, OPERATOR_SEQUENCE).map(|len| Captures::whole(at + len))
            }
            Self::Quoted(delim) => {
                let body = at + prefix_char(rest, delim)?;
                let close = source[body..].find(delim)?;
                Some(Captures::whole(body + close + delim.len_utf8()))
            }
            Self::Number => {
                let int_end = skip_while(source, at, |c| c.is_ascii_digit());
                if int_end == at {
                    return None;
                }
                let end = match prefix_len(&source[int_end..], ".") {
                    Some(dot) => {
                        let frac = int_end + dot;
                        let frac_end = skip_while(source, frac, |c| c.is_ascii_digit());
                        if frac_end > frac { frac_end } else { int_end }
                    }
                    None => int_end,
                };
                Some(Captures::whole(end))
            }
            Self::LineId => {
                prefix_len(rest, "@")?;
                let hex_end = skip_while(source, at + 1, |c| c.is_ascii_hexdigit());
                if hex_end == at + 1 || !source[hex_end..].starts_with('@') {
                    return None;
                }
                Some(Captures::whole(hex_end + 1))
            }
            Self::OpenTag => {
                prefix_len(rest, "<")?;
                let name_end = skip_while(source, at + 1, is_word_char);
                if name_end == at + 1 || !source[name_end..].starts_with('>') {
                    return None;
                }
                Some(Captures::whole(name_end + 1))
            }
            Self::GotoLabel => {
                let colon = skip_while(source, at, is_space);
                if !source[colon..].starts_with(':') {
                    return None;
                }
                let name_end = skip_while(source, colon + 1, |c| !is_space(c));
                if name_end == colon + 1 || !source[name_end..].starts_with('\n') {
                    return None;
                }
                Some(Captures::whole(name_end + 1))
            }
            Self::Whitespace => {
                // The run already swallows any newline, so `\n?` adds nothing.
                let end = skip_while(source, at, is_space);
                (end > at).then(|| Captures::whole(end))
            }
            Self::NonWhitespace => {
                let ch = rest.chars().next().filter(|c| !is_space(*c))?;
                let end = at + ch.len_utf8();
                let end = if source[end..].starts_with('\n') { end + 1 } else { end };
                Some(Captures::whole(end))
            }
            Self::LineEnd => rest
                .starts_with(['@', '\n'])
                .then(|| Captures::whole(at + 1)),
            Self::LineText => {
                let end = skip_while(source, at, |c| !matches!(c, '@' | '\n' | '<' | '{'));
                (end > at).then(|| Captures::whole(end))
            }
        }
    }
}

/// Whitespace as understood by `\s`: the Unicode `White_Space` set plus the
/// ASCII separators U+001C..=U+001F.
pub(crate) fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Word characters as understood by `\w` and `\b`.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `\b` at byte offset `pos`, looking at the full source on both sides.
pub(crate) fn is_word_boundary(source: &str, pos: usize) -> bool {
    let before = source[..pos].chars().next_back().is_some_and(is_word_char);
    let after = source[pos..].chars().next().is_some_and(is_word_char);
    before != after
}

fn skip_while(source: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    source[from..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(source.len(), |(i, _)| from + i)
}

fn prev_boundary(source: &str, pos: usize) -> usize {
    source[..pos]
        .char_indices()
        .next_back()
        .map_or(0, |(i, _)| i)
}

fn prefix_len(s: &str, prefix: &str) -> Option<usize> {
    s.starts_with(prefix).then_some(prefix.len())
}

fn prefix_char(s: &str, c: char) -> Option<usize> {
    s.starts_with(c).then_some(c.len_utf8())
}

fn match_word(source: &str, at: usize, words: &[&str]) -> Option<Captures> {
    if !is_word_boundary(source, at) {
        return None;
    }
    words.iter().find_map(|word| {
        let end = at + prefix_len(&source[at..], word)?;
        is_word_boundary(source, end).then(|| Captures::whole(end))
    })
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One entry of a state's rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Short identifier used in diagnostics.
    pub name: &'static str,
    pub pattern: Pattern,
    pub action: Action,
    pub transition: Transition,
}

impl Rule {
    pub const fn new(name: &'static str, pattern: Pattern, action: Action) -> Self {
        Self {
            name,
            pattern,
            action,
            transition: Transition::None,
        }
    }

    pub const fn push(self, state: LexState) -> Self {
        Self {
            transition: Transition::Push(state),
            ..self
        }
    }

    pub const fn pop(self) -> Self {
        Self {
            transition: Transition::Pop,
            ..self
        }
    }
}

const VARIABLE_GROUPS: &[TokenKind] = &[K::Operator, K::Variable, K::Operator];
const PIPE_GROUPS: &[TokenKind] = &[K::Operator, K::Keyword, K::Operator, K::Keyword, K::Operator];

/// Rules of the `default` state, in priority order.
pub const DEFAULT_RULES: &[Rule] = &[
    Rule::new("heading", Pattern::Heading, Action::Single(K::Heading)),
    Rule::new("choice", Pattern::Choice, Action::Single(K::String)),
    Rule::new("comment", Pattern::CommentLine, Action::Single(K::Comment)),
    Rule::new("speaker", Pattern::Speaker, Action::Single(K::Class)).push(LexState::SpeakerLine),
    Rule::new("close-bracket", Pattern::Literal("]"), Action::Single(K::Operator)),
    Rule::new("operator-word", Pattern::OperatorWord, Action::Single(K::Operator)),
    Rule::new(
        "set-command",
        Pattern::SetCommand,
        Action::Groups(&[K::Operator, K::Keyword, K::Text, K::Variable]),
    ),
    Rule::new(
        "control-command",
        Pattern::ControlCommand,
        Action::Groups(&[K::Operator, K::Keyword]),
    ),
    Rule::new("variable", Pattern::VariableRef, Action::Groups(VARIABLE_GROUPS)),
    Rule::new("pipe-function", Pattern::PipeFunction, Action::Groups(PIPE_GROUPS)),
    Rule::new("constant", Pattern::ConstantWord, Action::Single(K::Constant)),
    Rule::new("operator", Pattern::OperatorSequence, Action::Single(K::Operator)),
    Rule::new("double-quoted", Pattern::Quoted('"'), Action::Single(K::StringSingle)),
    Rule::new("backtick-quoted", Pattern::Quoted('`'), Action::Single(K::StringEscape)),
    Rule::new("number", Pattern::Number, Action::Single(K::Number)),
    Rule::new("line-id", Pattern::LineId, Action::Single(K::CommentSpecial)),
    Rule::new("open-tag", Pattern::OpenTag, Action::Single(K::Decorator)),
    Rule::new("close-tag", Pattern::Literal("</>"), Action::Single(K::Decorator)),
    Rule::new("goto-label", Pattern::GotoLabel, Action::Single(K::Label)),
    Rule::new("whitespace", Pattern::Whitespace, Action::Single(K::Text)),
    Rule::new("text", Pattern::NonWhitespace, Action::Single(K::Text)),
];

/// Rules of the `speakerline` state, in priority order.
pub const SPEAKER_LINE_RULES: &[Rule] = &[
    Rule::new("variable", Pattern::VariableRef, Action::Groups(VARIABLE_GROUPS)),
    Rule::new("pipe-function", Pattern::PipeFunction, Action::Groups(PIPE_GROUPS)),
    Rule::new("line-end", Pattern::LineEnd, Action::Single(K::Text)).pop(),
    Rule::new("open-tag", Pattern::OpenTag, Action::Single(K::Decorator)),
    Rule::new("close-tag", Pattern::Literal("</>"), Action::Single(K::Decorator)),
    Rule::new("line-text", Pattern::LineText, Action::Single(K::Text)),
];

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Construction-time defects of a rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTableError {
    /// A state has no rules at all.
    EmptyState(LexState),
    /// The base state does not end in the whitespace and non-whitespace
    /// fallbacks, so it may stall or shadow earlier rules.
    MissingFallback,
    /// A state that can be pushed has no rule that pops it.
    NoExit(LexState),
    /// A rule in the base state pops, which would empty the stack.
    PopFromBase { rule: &'static str },
    /// A `Groups` action lists a different number of kinds than the pattern has groups.
    GroupMismatch {
        rule: &'static str,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for RuleTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyState(state) => write!(f, "state `{state}` has no rules"),
            Self::MissingFallback => {
                write!(f, "base state does not end in the whitespace and non-whitespace fallbacks")
            }
            Self::NoExit(state) => write!(f, "state `{state}` is pushed but never popped"),
            Self::PopFromBase { rule } => {
                write!(f, "rule `{rule}` pops the base state")
            }
            Self::GroupMismatch {
                rule,
                expected,
                found,
            } => write!(
                f,
                "rule `{rule}` classifies {found} groups but its pattern captures {expected}"
            ),
        }
    }
}

impl std::error::Error for RuleTableError {}

/// Ordered rule lists for every lexer state.
#[derive(Debug, Clone)]
pub struct RuleTable {
    default: Vec<Rule>,
    speaker_line: Vec<Rule>,
}

static STANDARD: LazyLock<RuleTable> = LazyLock::new(|| RuleTable {
    default: DEFAULT_RULES.to_vec(),
    speaker_line: SPEAKER_LINE_RULES.to_vec(),
});

impl RuleTable {
    /// Build and validate a custom table.
    pub fn new(default: Vec<Rule>, speaker_line: Vec<Rule>) -> Result<Self, RuleTableError> {
        let table = Self {
            default,
            speaker_line,
        };
        table.check()?;
        Ok(table)
    }

    /// The SUDS highlighting table, built once per process.
    pub fn standard() -> &'static RuleTable {
        &STANDARD
    }

    /// Rules of `state`, in priority order.
    pub fn rules(&self, state: LexState) -> &[Rule] {
        match state {
            LexState::Default => &self.default,
            LexState::SpeakerLine => &self.speaker_line,
        }
    }

    /// Verify the structural guarantees the tokenizer relies on.
    pub fn check(&self) -> Result<(), RuleTableError> {
        for state in LexState::ALL {
            let rules = self.rules(state);
            if rules.is_empty() {
                return Err(RuleTableError::EmptyState(state));
            }
            for rule in rules {
                if let Action::Groups(kinds) = rule.action
                    && kinds.len() != rule.pattern.group_count()
                {
                    return Err(RuleTableError::GroupMismatch {
                        rule: rule.name,
                        expected: rule.pattern.group_count(),
                        found: kinds.len(),
                    });
                }
                if state == LexState::Default && rule.transition == Transition::Pop {
                    return Err(RuleTableError::PopFromBase { rule: rule.name });
                }
            }
        }

        match self.default.as_slice() {
            [.., ws, non_ws]
                if ws.pattern == Pattern::Whitespace && non_ws.pattern == Pattern::NonWhitespace => {}
            _ => return Err(RuleTableError::MissingFallback),
        }

        let pushed = LexState::ALL.into_iter().filter(|&target| {
            LexState::ALL.into_iter().any(|state| {
                self.rules(state)
                    .iter()
                    .any(|r| r.transition == Transition::Push(target))
            })
        });
        for state in pushed {
            if state == LexState::Default {
                continue;
            }
            if !self.rules(state).iter().any(|r| r.transition == Transition::Pop) {
                return Err(RuleTableError::NoExit(state));
            }
        }
        Ok(())
    }

    /// First rule of `state` matching at `at`, with its captures.
    pub fn find_match(&self, state: LexState, source: &str, at: usize) -> Option<(&Rule, Captures)> {
        self.rules(state).iter().find_map(|rule| {
            let caps = rule.pattern.match_at(source, at)?;
            debug_assert!(caps.end > at, "rule `{}` matched empty text", rule.name);
            // A zero-width match would stall the cursor; treat it as no match.
            (caps.end > at).then_some((rule, caps))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_of(pattern: Pattern, source: &str) -> Option<usize> {
        pattern.match_at(source, 0).map(|c| c.end)
    }

    #[test]
    fn standard_table_is_valid() {
        assert_eq!(RuleTable::standard().check(), Ok(()));
        assert_eq!(RuleTable::standard().rules(LexState::Default).len(), 21);
        assert_eq!(RuleTable::standard().rules(LexState::SpeakerLine).len(), 6);
    }

    #[test]
    fn heading_requires_three_equals_and_newline() {
        assert_eq!(end_of(Pattern::Heading, "===\n"), Some(4));
        assert_eq!(end_of(Pattern::Heading, "===  \t\nNext"), Some(7));
        // Greedy whitespace backs off to the last newline of the run.
        assert_eq!(end_of(Pattern::Heading, "===\n\n  x"), Some(5));
        assert_eq!(end_of(Pattern::Heading, "==\n"), None);
        assert_eq!(end_of(Pattern::Heading, "===="), None);
        assert_eq!(end_of(Pattern::Heading, "===   "), None);
    }

    #[test]
    fn choice_runs_to_line_id_or_newline() {
        assert_eq!(end_of(Pattern::Choice, "* Pick this@12@\n"), Some(12));
        assert_eq!(end_of(Pattern::Choice, "  * Go\nrest"), Some(7));
        assert_eq!(end_of(Pattern::Choice, "*nospace\n"), None);
        assert_eq!(end_of(Pattern::Choice, "* unterminated"), None);
        assert_eq!(end_of(Pattern::Choice, "* @"), None);
    }

    #[test]
    fn choice_backs_off_whitespace_to_find_a_body() {
        // `\s+` gives back one space so `[^@\n]+` can take the other.
        assert_eq!(end_of(Pattern::Choice, "*  \n\n"), Some(4));
        // Whitespace may span lines before the body.
        assert_eq!(end_of(Pattern::Choice, "* \nfoo\n"), Some(7));
    }

    #[test]
    fn comment_needs_trailing_newline() {
        assert_eq!(end_of(Pattern::CommentLine, "  # note\nx"), Some(9));
        assert_eq!(end_of(Pattern::CommentLine, "# eof"), None);
    }

    #[test]
    fn speaker_takes_last_colon_of_word() {
        assert_eq!(end_of(Pattern::Speaker, "Alice: hi"), Some(6));
        assert_eq!(end_of(Pattern::Speaker, "  a:b:c"), Some(6));
        assert_eq!(end_of(Pattern::Speaker, ":label\n"), None);
        assert_eq!(end_of(Pattern::Speaker, "::"), Some(2));
        assert_eq!(end_of(Pattern::Speaker, "[set x]"), None);
    }

    #[test]
    fn operator_words_respect_boundaries() {
        assert_eq!(end_of(Pattern::OperatorWord, "and x"), Some(3));
        assert_eq!(end_of(Pattern::OperatorWord, "order"), None);
        assert_eq!(end_of(Pattern::OperatorWord, "not"), Some(3));
        // Symbolic forms only sit between word characters.
        assert_eq!(end_of(Pattern::OperatorWord, "&& x"), None);
        let src = "a&&b";
        assert_eq!(Pattern::OperatorWord.match_at(src, 1).map(|c| c.end), Some(3));
        // The boundary looks at the character before the cursor.
        assert_eq!(Pattern::OperatorWord.match_at("xand y", 1), None);
    }

    #[test]
    fn set_command_groups() {
        let caps = Pattern::SetCommand.match_at("[ set  x]", 0).unwrap();
        assert_eq!(caps.end, 9);
        assert_eq!(caps.groups.as_slice(), &[0..1, 2..5, 5..7, 7..9]);
        assert!(Pattern::SetCommand.match_at("[settle x]", 0).is_none());
        assert!(Pattern::SetCommand.match_at("[set ", 0).is_none());
    }

    #[test]
    fn control_keyword_prefers_whole_words() {
        let caps = Pattern::ControlCommand.match_at("[elseif x]", 0).unwrap();
        assert_eq!(caps.groups[1], 1..7);
        let caps = Pattern::ControlCommand.match_at("[go to end]", 0).unwrap();
        assert_eq!(caps.groups[1], 1..6);
        assert!(Pattern::ControlCommand.match_at("[ifx]", 0).is_none());
        assert!(Pattern::ControlCommand.match_at("[set x]", 0).is_none());
    }

    #[test]
    fn variable_and_pipe_groups() {
        let caps = Pattern::VariableRef.match_at("{npc.name}", 0).unwrap();
        assert_eq!(caps.groups.as_slice(), &[0..1, 1..9, 9..10]);
        assert!(Pattern::VariableRef.match_at("{}", 0).is_none());
        assert!(Pattern::VariableRef.match_at("{a b}", 0).is_none());

        let caps = Pattern::PipeFunction.match_at("|plural(one|many) x)", 0).unwrap();
        assert_eq!(caps.end, 17);
        assert_eq!(caps.groups[3], 8..16);
        let caps = Pattern::PipeFunction.match_at("|gender()", 0).unwrap();
        assert!(caps.groups[3].is_empty());
        assert!(Pattern::PipeFunction.match_at("|plural(a\n)", 0).is_none());
        assert!(Pattern::PipeFunction.match_at("|upper(a)", 0).is_none());
    }

    #[test]
    fn literals_and_numbers() {
        assert_eq!(end_of(Pattern::Quoted('"'), r#""a\"b""#), Some(4));
        assert_eq!(end_of(Pattern::Quoted('`'), "`x`y"), Some(3));
        assert_eq!(end_of(Pattern::Quoted('"'), "\"open"), None);
        assert_eq!(end_of(Pattern::Number, "12.5x"), Some(4));
        assert_eq!(end_of(Pattern::Number, "12."), Some(2));
        assert_eq!(end_of(Pattern::LineId, "@1aF@"), Some(5));
        assert_eq!(end_of(Pattern::LineId, "@xyz@"), None);
        assert_eq!(end_of(Pattern::OpenTag, "<b>"), Some(3));
        assert_eq!(end_of(Pattern::OpenTag, "< b>"), None);
        assert_eq!(end_of(Pattern::OperatorSequence, "+/-*! x"), Some(5));
        assert_eq!(end_of(Pattern::OperatorSequence, "+-*/!"), None);
        assert_eq!(end_of(Pattern::OperatorSequence, "+"), None);
        assert_eq!(end_of(Pattern::OperatorSequence, "!"), None);
        assert_eq!(end_of(Pattern::ConstantWord, "True"), Some(4));
        assert_eq!(end_of(Pattern::ConstantWord, "Truest"), None);
    }

    #[test]
    fn goto_label_and_fallbacks() {
        assert_eq!(end_of(Pattern::GotoLabel, "  :start\n"), Some(9));
        assert_eq!(end_of(Pattern::GotoLabel, ":start"), None);
        assert_eq!(end_of(Pattern::Whitespace, " \t\n\nx"), Some(4));
        assert_eq!(end_of(Pattern::NonWhitespace, "ab"), Some(1));
        assert_eq!(end_of(Pattern::NonWhitespace, "a\nb"), Some(2));
        assert_eq!(end_of(Pattern::NonWhitespace, "日本"), Some(3));
        // ASCII file/group/record/unit separators count as whitespace.
        assert_eq!(end_of(Pattern::Whitespace, "\u{1c}\u{1f}x"), Some(2));
        assert_eq!(end_of(Pattern::NonWhitespace, "a\u{1e}"), Some(1));
        assert_eq!(end_of(Pattern::Speaker, "\u{1d}Al:"), Some(4));
        assert_eq!(end_of(Pattern::LineText, "Hello {x}"), Some(6));
    }

    #[test]
    fn check_rejects_defective_tables() {
        let err = RuleTable::new(Vec::new(), SPEAKER_LINE_RULES.to_vec()).unwrap_err();
        assert_eq!(err, RuleTableError::EmptyState(LexState::Default));

        let no_fallback = DEFAULT_RULES[..19].to_vec();
        let err = RuleTable::new(no_fallback, SPEAKER_LINE_RULES.to_vec()).unwrap_err();
        assert_eq!(err, RuleTableError::MissingFallback);

        let mut fallbacks_first = DEFAULT_RULES[19..].to_vec();
        fallbacks_first.extend_from_slice(&DEFAULT_RULES[..19]);
        let err = RuleTable::new(fallbacks_first, SPEAKER_LINE_RULES.to_vec()).unwrap_err();
        assert_eq!(err, RuleTableError::MissingFallback);

        let mut swapped = DEFAULT_RULES.to_vec();
        swapped.swap(19, 20);
        let err = RuleTable::new(swapped, SPEAKER_LINE_RULES.to_vec()).unwrap_err();
        assert_eq!(err, RuleTableError::MissingFallback);

        let no_exit: Vec<Rule> = SPEAKER_LINE_RULES
            .iter()
            .copied()
            .filter(|r| r.transition != Transition::Pop)
            .collect();
        let err = RuleTable::new(DEFAULT_RULES.to_vec(), no_exit).unwrap_err();
        assert_eq!(err, RuleTableError::NoExit(LexState::SpeakerLine));

        let mut popping = DEFAULT_RULES.to_vec();
        popping.insert(0, Rule::new("bad", Pattern::Literal("]"), Action::Single(K::Text)).pop());
        let err = RuleTable::new(popping, SPEAKER_LINE_RULES.to_vec()).unwrap_err();
        assert_eq!(err, RuleTableError::PopFromBase { rule: "bad" });

        let mut grouped = DEFAULT_RULES.to_vec();
        grouped[8] = Rule::new("variable", Pattern::VariableRef, Action::Groups(&[K::Operator]));
        let err = RuleTable::new(grouped, SPEAKER_LINE_RULES.to_vec()).unwrap_err();
        assert_eq!(
            err,
            RuleTableError::GroupMismatch {
                rule: "variable",
                expected: 3,
                found: 1
            }
        );
        assert!(err.to_string().contains("captures 3"));
    }
}
