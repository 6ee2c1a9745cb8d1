//! Lexical tokenizer for SUDS dialogue scripts.
//!
//! Scans raw script text and classifies it into [`Token`]s (speaker labels,
//! choices, embedded commands, variables, markup, plain text) for syntax
//! highlighting. There is no parser and no evaluation: the tokenizer is a
//! prioritized list of patterns per lexer state, with a single extra state
//! for the text of a speaker line.
//!
//! # Example
//!
//! ```
//! use suds_syntax::{tokenize, TokenKind};
//!
//! let src = "Alice: Hello {name}!\n";
//! let kinds: Vec<_> = tokenize(src).map(|t| t.kind).collect();
//! assert_eq!(kinds[0], TokenKind::Class);
//! assert!(kinds.contains(&TokenKind::Variable));
//! ```
//!
//! # Features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `tracing` | Emit `tracing` events for state changes and recoveries |
//! | `serde` | `Serialize` for [`Token`] and [`TokenKind`] |

#![forbid(unsafe_code)]

pub mod lexer;
pub mod rules;
pub mod token;
pub mod validate;

pub use lexer::{LexStats, SudsLexer, Tokens, tokenize, tokenize_to_vec};
pub use rules::{Action, Captures, LexState, Pattern, Rule, RuleTable, RuleTableError, Transition};
pub use token::{Token, TokenKind};
pub use validate::{covers_source, reassemble, validate_tokens};
