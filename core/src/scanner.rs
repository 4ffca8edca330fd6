//! Character-level structural helpers shared by the parser and the condition
//! parser.
//!
//! The grammar has no tokenizer. Instead, the parser works on the raw text and
//! uses these helpers to find matching brackets, to split on separators at
//! nesting depth zero, and to blank out parenthesized groups so that top-level
//! operators can be found with a plain character scan.
//!
//! All helpers treat `'...'` and `"..."` as opaque: brackets, separators and
//! operators inside a quoted literal are never structural.

/// Tracks whether the scan position is inside a quoted literal.
#[derive(Debug, Default, Clone, Copy)]
struct QuoteState {
    open: Option<u8>,
}

impl QuoteState {
    /// Feeds one byte. Returns `true` if the byte is part of a literal
    /// (including its delimiting quotes).
    fn feed(&mut self, c: u8) -> bool {
        match self.open {
            Some(q) => {
                if c == q {
                    self.open = None;
                }
                true
            }
            None if c == b'\'' || c == b'"' => {
                self.open = Some(c);
                true
            }
            None => false,
        }
    }
}

/// Returns the index of the bracket matching the `open` bracket at `index`.
///
/// `text[index]` must be `open`. Returns `None` when there is no matching
/// `close` before the end of the text.
pub fn matching_bracket_forward(text: &str, index: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(index) != Some(&open) {
        return None;
    }
    let mut depth = 0usize;
    let mut quotes = QuoteState::default();
    for (i, &c) in bytes.iter().enumerate().skip(index) {
        if quotes.feed(c) {
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Returns the index of the bracket matching the `close` bracket at `index`,
/// scanning backwards.
pub fn matching_bracket_backward(text: &str, index: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(index) != Some(&close) {
        return None;
    }
    let mut depth = 0usize;
    let mut quotes = QuoteState::default();
    for i in (0..=index).rev() {
        let c = bytes[i];
        if quotes.feed(c) {
            continue;
        }
        if c == close {
            depth += 1;
        } else if c == open {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Splits `text` on `separator` wherever `()` and `[]` nesting depth is zero.
///
/// Every piece is trimmed. An empty (or all-whitespace) input yields an empty
/// vector rather than a single empty piece.
pub fn split_respecting_parens(text: &str, separator: u8) -> Vec<&str> {
    split_respecting_parens_with_offsets(text, separator)
        .into_iter()
        .map(|(_, piece)| piece)
        .collect()
}

/// Like [`split_respecting_parens`], but also returns the byte offset of each
/// trimmed piece within `text`.
pub fn split_respecting_parens_with_offsets(text: &str, separator: u8) -> Vec<(usize, &str)> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut depth = 0isize;
    let mut start = 0;
    let mut quotes = QuoteState::default();

    for (i, &c) in bytes.iter().enumerate() {
        if quotes.feed(c) {
            continue;
        }
        match c {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            _ if c == separator && depth == 0 => {
                pieces.push(trimmed_piece(text, start, i));
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(trimmed_piece(text, start, bytes.len()));
    pieces
}

fn trimmed_piece(text: &str, start: usize, end: usize) -> (usize, &str) {
    let raw = &text[start..end];
    let leading = raw.len() - raw.trim_start().len();
    (start + leading, raw.trim())
}

/// Replaces every character inside a parenthesized group, and the group's
/// closing paren, with a space. The opening paren of a top-level group is
/// kept. The interior of quoted literals is blanked as well, keeping the
/// quote characters.
///
/// The result has exactly the same byte length as the input, so positions
/// found in the blanked text index straight into the original.
pub fn blank_paren_interiors(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;

    for &c in bytes {
        if let Some(q) = quote {
            if c == q {
                quote = None;
                out.push(if depth > 0 { b' ' } else { c });
            } else {
                out.push(b' ');
            }
            continue;
        }
        match c {
            b'(' => {
                out.push(if depth == 0 { c } else { b' ' });
                depth += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                out.push(b' ');
            }
            b'\'' | b'"' => {
                quote = Some(c);
                out.push(if depth > 0 { b' ' } else { c });
            }
            _ => out.push(if depth > 0 { b' ' } else { c }),
        }
    }

    // Only ASCII bytes are ever replaced, and whole multi-byte characters
    // are either copied or blanked byte by byte, so this is valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

/// Checks that `()` and `[]` are balanced and properly nested.
///
/// On failure returns the offending delimiter and its byte position.
pub fn check_balanced(text: &str) -> Result<(), (char, usize)> {
    let mut stack: Vec<(u8, usize)> = Vec::new();
    let mut quotes = QuoteState::default();
    for (i, &c) in text.as_bytes().iter().enumerate() {
        if quotes.feed(c) {
            continue;
        }
        match c {
            b'(' | b'[' => stack.push((c, i)),
            b')' | b']' => {
                let expected = if c == b')' { b'(' } else { b'[' };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => return Err((c as char, i)),
                }
            }
            _ => {}
        }
    }
    match stack.pop() {
        Some((open, pos)) => Err((open as char, pos)),
        None => match quotes.open {
            Some(q) => Err((q as char, text.rfind(q as char).unwrap_or(0))),
            None => Ok(()),
        },
    }
}

/// Returns `true` if the whole of `text` is a single `'...'` or `"..."`
/// literal.
pub fn is_quoted_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    let q = bytes[0];
    if q != b'\'' && q != b'"' {
        return false;
    }
    bytes[1..].iter().position(|&c| c == q) == Some(bytes.len() - 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matching_bracket_forward() {
        assert_eq!(matching_bracket_forward("(a(b)c)", 0, b'(', b')'), Some(6));
        assert_eq!(matching_bracket_forward("(a(b)c)", 2, b'(', b')'), Some(4));
        assert_eq!(matching_bracket_forward("x[1][2]", 1, b'[', b']'), Some(3));
        assert_eq!(matching_bracket_forward("(a(b)c", 0, b'(', b')'), None);
        assert_eq!(matching_bracket_forward("abc", 0, b'(', b')'), None);
    }

    #[test]
    fn test_matching_bracket_forward_skips_quotes() {
        assert_eq!(matching_bracket_forward("f(')', 1)", 1, b'(', b')'), Some(8));
    }

    #[test]
    fn test_matching_bracket_backward() {
        assert_eq!(matching_bracket_backward("(a(b)c)", 6, b'(', b')'), Some(0));
        assert_eq!(matching_bracket_backward("(a(b)c)", 4, b'(', b')'), Some(2));
        assert_eq!(matching_bracket_backward("a(b)c)", 5, b'(', b')'), None);
    }

    #[test]
    fn test_split_respecting_parens() {
        assert_eq!(split_respecting_parens("a, f(b, c), d", b','), vec!["a", "f(b, c)", "d"]);
        assert_eq!(split_respecting_parens("1; (2; 3); x[1;2]", b';'), vec!["1", "(2; 3)", "x[1;2]"]);
        assert_eq!(split_respecting_parens("'a,b', c", b','), vec!["'a,b'", "c"]);
    }

    #[test]
    fn test_split_empty_input_yields_nothing() {
        assert!(split_respecting_parens("", b',').is_empty());
        assert!(split_respecting_parens("   ", b',').is_empty());
        // A trailing separator still produces an empty last piece.
        assert_eq!(split_respecting_parens("a,", b','), vec!["a", ""]);
    }

    #[test]
    fn test_split_offsets() {
        assert_eq!(
            split_respecting_parens_with_offsets("a,  bc , d", b','),
            vec![(0, "a"), (4, "bc"), (9, "d")]
        );
    }

    #[test]
    fn test_blank_paren_interiors() {
        assert_eq!(blank_paren_interiors("f(a+b)*2"), "f(    *2");
        assert_eq!(blank_paren_interiors("(1+(2*3))-4"), "(        -4");
        assert_eq!(blank_paren_interiors("a+b"), "a+b");
        assert_eq!(blank_paren_interiors("'a+b'+c"), "'   '+c");
    }

    #[test]
    fn test_blank_preserves_length() {
        for text in ["", "(", "a(b(c)d)e", "'x' + (\"y\")", "((()))"] {
            assert_eq!(blank_paren_interiors(text).len(), text.len());
        }
    }

    #[test]
    fn test_check_balanced() {
        assert_eq!(check_balanced("f(a[1], (b))"), Ok(()));
        assert_eq!(check_balanced("(1+2"), Err(('(', 0)));
        assert_eq!(check_balanced("1+2)"), Err((')', 3)));
        assert_eq!(check_balanced("a[1)"), Err((')', 3)));
        assert_eq!(check_balanced("')' + 1"), Ok(()));
    }

    #[test]
    fn test_is_quoted_literal() {
        assert!(is_quoted_literal("'abc'"));
        assert!(is_quoted_literal("\"a'b\""));
        assert!(!is_quoted_literal("'a'+'b'"));
        assert!(!is_quoted_literal("'"));
        assert!(!is_quoted_literal("abc"));
    }
}
