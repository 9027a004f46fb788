//! Line parser: splits one preprocessed line into opcode and operand tokens.
//!
//! Operands are separated by commas. A single-quoted literal is one atomic
//! operand even when it contains commas or spaces; its quotes are stripped and
//! the token is tagged [`TokenKind::Text`].

use crate::fault::ParseErrorKind;
use crate::source::QUOTE;

/// How an operand token was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Bare token: an integer literal or a register/label name.
    Value,
    /// Quoted literal with the enclosing quotes removed.
    Text,
}

/// One operand as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text, trimmed, with quotes removed for [`TokenKind::Text`].
    pub text: String,
    /// Whether the token was a quoted literal.
    pub kind: TokenKind,
}

impl Token {
    /// Creates a bare value token.
    #[must_use]
    pub fn value(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Value,
        }
    }

    /// Creates a text literal token.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Text,
        }
    }

    /// Returns `true` for quoted literals.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == TokenKind::Text
    }
}

/// Opcode token plus its ordered operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// First whitespace-delimited token, as written.
    pub opcode: String,
    /// Comma-separated operands in source order.
    pub operands: Vec<Token>,
}

/// Parses one preprocessed line.
///
/// # Errors
///
/// Returns [`ParseErrorKind::EmptyOpcode`] for a blank line,
/// [`ParseErrorKind::UnterminatedString`] for an unbalanced quote,
/// [`ParseErrorKind::EmptyOperand`] for an empty comma-separated slot, and
/// [`ParseErrorKind::InvalidOperand`] for a quote that does not enclose a
/// whole operand.
pub fn parse_line(line: &str) -> Result<RawLine, ParseErrorKind> {
    let (opcode, rest) = split_opcode(line.trim());
    if opcode.is_empty() {
        return Err(ParseErrorKind::EmptyOpcode);
    }

    Ok(RawLine {
        opcode: opcode.to_string(),
        operands: split_operands(rest)?,
    })
}

/// Splits at the first whitespace boundary.
#[must_use]
pub fn split_opcode(line: &str) -> (&str, &str) {
    line.split_once(char::is_whitespace)
        .map_or((line, ""), |(opcode, rest)| (opcode, rest.trim()))
}

fn split_operands(rest: &str) -> Result<Vec<Token>, ParseErrorKind> {
    if rest.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quote = false;

    for (pos, ch) in rest.char_indices() {
        match ch {
            QUOTE => in_quote = !in_quote,
            ',' if !in_quote => {
                segments.push(&rest[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    if in_quote {
        return Err(ParseErrorKind::UnterminatedString);
    }
    segments.push(&rest[start..]);

    segments.into_iter().map(classify_operand).collect()
}

fn classify_operand(raw: &str) -> Result<Token, ParseErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseErrorKind::EmptyOperand);
    }

    let quoted = trimmed
        .strip_prefix(QUOTE)
        .and_then(|inner| inner.strip_suffix(QUOTE));
    match quoted {
        Some(inner) if !inner.contains(QUOTE) => Ok(Token::text(inner)),
        _ if trimmed.contains(QUOTE) => Err(ParseErrorKind::InvalidOperand(trimmed.to_string())),
        _ => Ok(Token::value(trimmed)),
    }
}

/// Returns `true` when `s` is a valid register or label name.
///
/// Names start with an ASCII letter or `_` and continue with ASCII
/// alphanumerics or `_`.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn values(tokens: &[&str]) -> Vec<Token> {
        tokens.iter().map(|t| Token::value(*t)).collect()
    }

    #[test]
    fn zero_operand_lines() {
        for line in ["ret", "end", "loop:", "  end  "] {
            let parsed = parse_line(line).expect("bare token should parse");
            assert_eq!(parsed.opcode, line.trim());
            assert!(parsed.operands.is_empty());
        }
    }

    #[test]
    fn splits_value_operands_on_commas() {
        let parsed = parse_line("mov  a ,  -12").expect("valid line");
        assert_eq!(parsed.opcode, "mov");
        assert_eq!(parsed.operands, values(&["a", "-12"]));
    }

    #[test]
    fn tab_separates_opcode() {
        let parsed = parse_line("inc\tcounter").expect("valid line");
        assert_eq!(parsed.opcode, "inc");
        assert_eq!(parsed.operands, values(&["counter"]));
    }

    #[test]
    fn quoted_literal_with_comma_is_one_operand() {
        let parsed = parse_line("msg 'a, b'").expect("valid line");
        assert_eq!(parsed.operands, vec![Token::text("a, b")]);
    }

    #[test]
    fn mixed_literals_and_values_keep_order() {
        let parsed = parse_line("msg '(5+1)/2 = ', a, ' and ', 7").expect("valid line");
        assert_eq!(
            parsed.operands,
            vec![
                Token::text("(5+1)/2 = "),
                Token::value("a"),
                Token::text(" and "),
                Token::value("7"),
            ]
        );
        assert!(parsed.operands[0].is_text());
        assert!(!parsed.operands[1].is_text());
    }

    #[test]
    fn literal_whitespace_is_preserved() {
        let parsed = parse_line("msg '  padded  '").expect("valid line");
        assert_eq!(parsed.operands, vec![Token::text("  padded  ")]);
    }

    #[test]
    fn empty_literal_is_allowed() {
        let parsed = parse_line("msg ''").expect("valid line");
        assert_eq!(parsed.operands, vec![Token::text("")]);
    }

    #[rstest]
    #[case("msg 'oops", ParseErrorKind::UnterminatedString)]
    #[case("msg 'a', 'b", ParseErrorKind::UnterminatedString)]
    #[case("mov a,,b", ParseErrorKind::EmptyOperand)]
    #[case("mov a,", ParseErrorKind::EmptyOperand)]
    #[case("msg 'a' 'b'", ParseErrorKind::InvalidOperand("'a' 'b'".into()))]
    #[case("msg x'y'", ParseErrorKind::InvalidOperand("x'y'".into()))]
    #[case("", ParseErrorKind::EmptyOpcode)]
    fn malformed_lines_are_rejected(#[case] line: &str, #[case] expected: ParseErrorKind) {
        assert_eq!(parse_line(line), Err(expected));
    }

    #[rstest]
    #[case("a", true)]
    #[case("_tmp", true)]
    #[case("reg_2", true)]
    #[case("Acc", true)]
    #[case("2x", false)]
    #[case("", false)]
    #[case("a-b", false)]
    #[case("-5", false)]
    fn identifier_rules(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_identifier(name), valid);
    }
}
