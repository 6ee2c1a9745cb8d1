#![forbid(unsafe_code)]

//! Structural checks over token streams.

use crate::token::Token;

/// Whether every token is a well-formed span of `source`: non-empty, inside
/// the source, cut on char boundaries, and after the token before it.
///
/// Gaps are allowed, so any filtered subsequence of a token stream passes.
pub fn validate_tokens(source: &str, tokens: &[Token]) -> bool {
    let well_formed = |t: &Token| {
        !t.is_empty()
            && source.is_char_boundary(t.range.start)
            && source.is_char_boundary(t.range.end)
    };
    tokens.iter().all(well_formed)
        && tokens
            .windows(2)
            .all(|pair| pair[0].range.end <= pair[1].range.start)
}

/// Whether `tokens` partition `source`: well-formed, each one starting where
/// the previous ended, from offset 0 to `source.len()`.
pub fn covers_source(source: &str, tokens: &[Token]) -> bool {
    let first = tokens.first().map_or(0, |t| t.range.start);
    let last = tokens.last().map_or(0, |t| t.range.end);
    first == 0
        && last == source.len()
        && tokens
            .windows(2)
            .all(|pair| pair[0].range.end == pair[1].range.start)
        && validate_tokens(source, tokens)
}

/// Concatenate the text of every token.
pub fn reassemble(source: &str, tokens: &[Token]) -> String {
    let mut out = String::with_capacity(source.len());
    for token in tokens {
        out.push_str(token.text(source));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn validate_accepts_gaps_but_not_overlap() {
        let src = "abcdef";
        let ok = [Token::new(TokenKind::Text, 0..2), Token::new(TokenKind::Text, 3..6)];
        assert!(validate_tokens(src, &ok));
        let overlap = [Token::new(TokenKind::Text, 0..3), Token::new(TokenKind::Text, 2..6)];
        assert!(!validate_tokens(src, &overlap));
        let out_of_bounds = [Token::new(TokenKind::Text, 0..7)];
        assert!(!validate_tokens(src, &out_of_bounds));
    }

    #[test]
    fn validate_rejects_empty_and_split_tokens() {
        let src = "aé";
        assert!(!validate_tokens(src, &[Token::new(TokenKind::Text, 1..1)]));
        assert!(!validate_tokens(src, &[Token::new(TokenKind::Text, 0..2)]));
        assert!(!validate_tokens(src, &[Token::new(TokenKind::Text, 2..3)]));
        assert!(validate_tokens(src, &[Token::new(TokenKind::Text, 1..3)]));
        assert!(validate_tokens(src, &[]));
    }

    #[test]
    fn filtered_streams_still_validate() {
        let src = "Al: {x}\n";
        let tokens = crate::lexer::tokenize_to_vec(src);
        let names: Vec<Token> = tokens.into_iter().filter(|t| t.kind.is_name()).collect();
        assert!(!names.is_empty());
        assert!(validate_tokens(src, &names));
        assert!(!covers_source(src, &names));
    }

    #[test]
    fn coverage_rejects_gaps_and_short_streams() {
        let src = "abcdef";
        let full = [Token::new(TokenKind::Text, 0..2), Token::new(TokenKind::Text, 2..6)];
        assert!(covers_source(src, &full));
        let gap = [Token::new(TokenKind::Text, 0..2), Token::new(TokenKind::Text, 3..6)];
        assert!(!covers_source(src, &gap));
        let short = [Token::new(TokenKind::Text, 0..2)];
        assert!(!covers_source(src, &short));
        let empty = [Token::new(TokenKind::Text, 0..0), Token::new(TokenKind::Text, 0..6)];
        assert!(!covers_source(src, &empty));
        assert!(covers_source("", &[]));
    }

    #[test]
    fn coverage_rejects_split_chars() {
        let src = "é";
        let split = [Token::new(TokenKind::Text, 0..1), Token::new(TokenKind::Text, 1..2)];
        assert!(!covers_source(src, &split));
    }

    #[test]
    fn reassemble_joins_spans() {
        let src = "ab";
        let tokens = [Token::new(TokenKind::Text, 0..1), Token::new(TokenKind::Operator, 1..2)];
        assert_eq!(reassemble(src, &tokens), "ab");
    }
}
