use indexmap::IndexMap;

use crate::parse::ParseError;
use crate::parse::token::{
    BACKTICK, BULLET, CHECKED_BOX, FENCE, META_DELIM, META_KV_DELIM, POUND, STAR, Token,
    UNCHECKED_BOX, UNDER,
};

/// Lex card lines into a token stream in one forward pass.
///
/// Front matter is recognized only when the very first line is the `---`
/// delimiter; it becomes a single leading `Meta` token. Every remaining
/// line contributes its content tokens followed by one `Newline`.
pub fn lex(lines: &[String]) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut body = lines;

    if let Some(first) = lines.first()
        && first.trim_end() == META_DELIM
    {
        let (meta, consumed) = lex_meta(&lines[1..])?;
        tokens.push(Token::Meta(meta));
        body = &lines[1 + consumed..];
    }

    // Python-style indentation stack; the bottom 0 is never popped
    let mut indentation = vec![0usize];
    for line in body {
        lex_line(line, &mut indentation, &mut tokens)?;
    }
    Ok(tokens)
}

/// Consume `key:value` lines up to and including the closing `---`.
/// Returns the mapping and the number of lines consumed.
fn lex_meta(lines: &[String]) -> Result<(IndexMap<String, String>, usize), ParseError> {
    let mut meta = IndexMap::new();
    for (idx, line) in lines.iter().enumerate() {
        if line.trim_end() == META_DELIM {
            return Ok((meta, idx + 1));
        }
        // split on the first separator, both halves kept verbatim
        let Some((key, value)) = line.split_once(META_KV_DELIM) else {
            return Err(ParseError::MalformedMeta(format!(
                "line {line:?} has no `{META_KV_DELIM}` separator"
            )));
        };
        meta.insert(key.to_string(), value.to_string());
    }
    Err(ParseError::MalformedMeta(
        "front matter never closed with `---`".to_string(),
    ))
}

fn lex_line(
    line: &str,
    indentation: &mut Vec<usize>,
    tokens: &mut Vec<Token>,
) -> Result<(), ParseError> {
    // Blank lines never touch the indentation stack
    if line.trim().is_empty() {
        tokens.push(Token::Newline);
        return Ok(());
    }

    let mut rest = line;

    // Count leading whitespace, stopping early where a list marker
    // begins: the marker's own width counts as indentation so nested
    // content lines up past it.
    let mut width = 0;
    while list_marker(rest).is_none() {
        match rest.chars().next() {
            Some(c) if c.is_whitespace() => {
                width += 1;
                rest = &rest[c.len_utf8()..];
            }
            _ => break,
        }
    }
    if let Some((lit, _)) = list_marker(rest) {
        // not consumed yet; the marker token comes after indentation
        width += lit.len();
    }

    // Reconcile the width against the stack: at most one push per line,
    // as many pops as it takes to land on a recorded width.
    let top = indentation.last().copied().unwrap_or(0);
    if width > top {
        indentation.push(width);
        tokens.push(Token::Indent(width));
    } else if width < top {
        while indentation.last().is_some_and(|&w| width < w) {
            indentation.pop();
            tokens.push(Token::Dedent);
        }
        if indentation.last().copied().unwrap_or(0) != width {
            return Err(ParseError::IndentationMismatch(format!(
                "line dedents to width {width}, which was never indented to"
            )));
        }
    }

    // Header pounds live at column zero only
    while let Some(stripped) = rest.strip_prefix(POUND) {
        if width != 0 {
            return Err(ParseError::IndentationMismatch(
                "header `#` after indentation".to_string(),
            ));
        }
        tokens.push(Token::Pound);
        rest = stripped;
    }

    // A fence swallows the rest of the line as its annotation
    if let Some(annot) = rest.strip_prefix(FENCE) {
        tokens.push(Token::Fence(annot.to_string()));
        tokens.push(Token::Newline);
        return Ok(());
    }

    // At most one list marker per line, directly after its indentation
    if let Some((lit, marker)) = list_marker(rest) {
        tokens.push(marker);
        rest = &rest[lit.len()..];
    }

    // The remainder: span delimiters, blanks, and words
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix(BACKTICK) {
            tokens.push(Token::Backtick);
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix(STAR) {
            tokens.push(Token::Star);
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix(UNDER) {
            tokens.push(Token::Under);
            rest = stripped;
        } else {
            let Some(c) = rest.chars().next() else { break };
            if c.is_whitespace() {
                tokens.push(Token::Blank(c));
                rest = &rest[c.len_utf8()..];
            } else {
                let end = rest.find(word_boundary).unwrap_or(rest.len());
                tokens.push(Token::Word(rest[..end].to_string()));
                rest = &rest[end..];
            }
        }
    }

    tokens.push(Token::Newline);
    Ok(())
}

/// The list marker starting `rest`, if any, as (literal, token).
fn list_marker(rest: &str) -> Option<(&'static str, Token)> {
    if rest.starts_with(BULLET) {
        Some((BULLET, Token::Bullet))
    } else if rest.starts_with(CHECKED_BOX) {
        Some((CHECKED_BOX, Token::CheckedBox))
    } else if rest.starts_with(UNCHECKED_BOX) {
        Some((UNCHECKED_BOX, Token::UncheckedBox))
    } else {
        None
    }
}

/// Words run up to the next whitespace or span-delimiter character.
fn word_boundary(c: char) -> bool {
    c.is_whitespace() || c == '`' || c == '*' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &str) -> Vec<String> {
        s.lines().map(|l| l.to_string()).collect()
    }

    fn lex_ok(s: &str) -> Vec<Token> {
        lex(&lines(s)).unwrap()
    }

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_words_and_blanks() {
        assert_eq!(
            lex_ok("a b"),
            vec![word("a"), Token::Blank(' '), word("b"), Token::Newline]
        );
    }

    #[test]
    fn test_span_delimiters_end_words() {
        assert_eq!(
            lex_ok("x*y_z`w"),
            vec![
                word("x"),
                Token::Star,
                word("y"),
                Token::Under,
                word("z"),
                Token::Backtick,
                word("w"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_header_pounds() {
        assert_eq!(
            lex_ok("## Hi"),
            vec![
                Token::Pound,
                Token::Pound,
                Token::Blank(' '),
                word("Hi"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_header_must_start_at_column_zero() {
        let err = lex(&lines("  # Hi")).unwrap_err();
        assert!(matches!(err, ParseError::IndentationMismatch(_)));
    }

    #[test]
    fn test_fence_takes_the_rest_of_the_line() {
        assert_eq!(
            lex_ok("```js strict"),
            vec![Token::Fence("js strict".to_string()), Token::Newline]
        );
        assert_eq!(
            lex_ok("```"),
            vec![Token::Fence(String::new()), Token::Newline]
        );
    }

    #[test]
    fn test_front_matter_block() {
        let tokens = lex_ok("---\ntitle:Card one\n---\nhi");
        let Token::Meta(meta) = &tokens[0] else {
            panic!("expected a leading Meta token, got {:?}", tokens[0]);
        };
        assert_eq!(meta.get("title").map(String::as_str), Some("Card one"));
        assert_eq!(&tokens[1..], &[word("hi"), Token::Newline]);
    }

    #[test]
    fn test_front_matter_splits_on_first_colon() {
        let tokens = lex_ok("---\nurl:http://example\n---");
        let Token::Meta(meta) = &tokens[0] else {
            panic!("expected a leading Meta token");
        };
        assert_eq!(meta.get("url").map(String::as_str), Some("http://example"));
    }

    #[test]
    fn test_front_matter_only_at_the_top() {
        // a later `---` line is just a word
        let tokens = lex_ok("x\n---\na:1");
        assert!(!tokens.iter().any(|t| matches!(t, Token::Meta(_))));
        assert!(tokens.contains(&word("---")));
    }

    #[test]
    fn test_front_matter_missing_separator() {
        let err = lex(&lines("---\nno separator here\n---")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedMeta(_)));
    }

    #[test]
    fn test_front_matter_never_closed() {
        let err = lex(&lines("---\na:1")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedMeta(_)));
    }

    #[test]
    fn test_indent_and_dedent() {
        assert_eq!(
            lex_ok("  a\nb"),
            vec![
                Token::Indent(2),
                word("a"),
                Token::Newline,
                Token::Dedent,
                word("b"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_same_width_continuation_is_silent() {
        assert_eq!(
            lex_ok("  a\n  b"),
            vec![
                Token::Indent(2),
                word("a"),
                Token::Newline,
                word("b"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_dedent_to_unknown_width_fails() {
        let err = lex(&lines("    a\n  b")).unwrap_err();
        assert!(matches!(err, ParseError::IndentationMismatch(_)));
    }

    #[test]
    fn test_blank_lines_keep_indentation() {
        assert_eq!(
            lex_ok("  a\n\n  b"),
            vec![
                Token::Indent(2),
                word("a"),
                Token::Newline,
                Token::Newline,
                word("b"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_marker_width_counts_as_indentation() {
        assert_eq!(
            lex_ok(" - a"),
            vec![Token::Indent(3), Token::Bullet, word("a"), Token::Newline]
        );
        assert_eq!(
            lex_ok(" [x] a"),
            vec![
                Token::Indent(5),
                Token::CheckedBox,
                word("a"),
                Token::Newline,
            ]
        );
        assert_eq!(
            lex_ok(" [ ] a"),
            vec![
                Token::Indent(5),
                Token::UncheckedBox,
                word("a"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_nested_marker_widths() {
        assert_eq!(
            lex_ok(" - a\n    - b"),
            vec![
                Token::Indent(3),
                Token::Bullet,
                word("a"),
                Token::Newline,
                Token::Indent(6),
                Token::Bullet,
                word("b"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_dash_without_leading_space_is_a_word() {
        assert_eq!(
            lex_ok("- a"),
            vec![word("-"), Token::Blank(' '), word("a"), Token::Newline]
        );
    }

    #[test]
    fn test_line_reconstruction() {
        // concatenated literals reproduce the line minus consumed
        // indentation
        let line = "  keep *it* `simple`, ok?";
        let tokens = lex_ok(line);
        let mut rebuilt = String::new();
        for token in &tokens {
            token.write_literal(&mut rebuilt);
        }
        assert_eq!(rebuilt, line.trim_start());
    }

    #[test]
    fn test_indentation_well_nested() {
        let tokens = lex_ok(" - a\n    - b\n       deep\n - c\nd");
        let mut stack = vec![0usize];
        for token in &tokens {
            match token {
                Token::Indent(w) => {
                    assert!(*w > *stack.last().unwrap());
                    stack.push(*w);
                }
                Token::Dedent => {
                    assert!(stack.len() >= 2, "dedent would pop the root");
                    stack.pop();
                }
                _ => {}
            }
        }
        assert!(!stack.is_empty());
    }
}
