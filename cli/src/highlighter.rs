use crate::lexer::Token;
use logos::Logos;
use nu_ansi_term::{Color, Style};
use reedline::StyledText;

/// Words that start a form rather than a function call.
const FORMS: &[&str] = &["if", "switch", "optional", "default"];

/// Words that evaluate without the host.
const LITERALS: &[&str] = &["pi", "PI", "true", "True", "false", "False", "null", "ARRAY"];

fn color_of(token: Token, text: &str, before_paren: bool) -> Color {
    match token {
        Token::Number => Color::Cyan,
        Token::Str => Color::Green,
        Token::Logical | Token::Comparison => Color::Magenta,
        Token::Word if FORMS.contains(&text) => Color::Magenta,
        Token::Word if LITERALS.contains(&text) => Color::Cyan,
        Token::Word if before_paren => Color::Blue,
        Token::Word => Color::Red,
        _ => Color::White,
    }
}

pub struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();
        let plain = Style::new().fg(Color::White);

        let mut spans = Vec::new();
        for (token, span) in Token::lexer(line).spanned() {
            match token {
                Ok(token) => spans.push((token, span)),
                Err(_) => break,
            }
        }

        let mut curr_end = 0;
        for (i, (token, span)) in spans.iter().enumerate() {
            if span.start > curr_end {
                output.push((plain, line[curr_end..span.start].to_string()));
            }
            let before_paren = matches!(spans.get(i + 1), Some((Token::LParen, _)));
            let text = &line[span.clone()];
            let style = Style::new().fg(color_of(*token, text, before_paren));
            output.push((style, text.to_string()));
            curr_end = span.end;
        }

        // Whatever the lexer rejected (an unterminated string, say) is
        // shown as typed.
        if curr_end < line.len() {
            output.push((plain, line[curr_end..].to_string()));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reedline::Highlighter as _;

    fn rendered(line: &str) -> String {
        Highlighter
            .highlight(line, 0)
            .buffer
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    #[test]
    fn test_highlight_keeps_text() {
        for line in ["if(w > 2, max(w, 3), 'x')", "  1 +  2", "'open + 1", "a -> b()"] {
            assert_eq!(rendered(line), line);
        }
    }

    #[test]
    fn test_colors() {
        assert_eq!(color_of(Token::Word, "max", true), Color::Blue);
        assert_eq!(color_of(Token::Word, "width", false), Color::Red);
        assert_eq!(color_of(Token::Word, "switch", true), Color::Magenta);
        assert_eq!(color_of(Token::Word, "pi", false), Color::Cyan);
    }
}
