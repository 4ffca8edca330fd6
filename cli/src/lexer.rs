use logos::Logos;

/// Formula tokens, for highlighting and line continuation only. The parser
/// itself works on raw text.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    #[token(";")]
    #[token(":")]
    Separator,

    #[token("->")]
    Arrow,

    #[token("&&")]
    #[token("||")]
    #[token("!")]
    Logical,

    #[token("==")]
    #[token("!=")]
    #[token("!>=")]
    #[token("!>")]
    #[token("<=")]
    #[token(">=")]
    #[token("<")]
    #[token(">")]
    Comparison,

    #[regex(r"[-+*/%^]")]
    Operator,

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][-+]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][-+]?[0-9]+)?")]
    Number,

    // Strict: must be closed on the same input.
    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Str,

    #[regex(r"[A-Za-z_$#][A-Za-z0-9_.$#]*")]
    Word,
}

/// Open bracket depth at the end of `buffer`, or `None` when the buffer
/// holds something the lexer rejects, such as an unterminated string.
pub fn calculate_depth(buffer: &str) -> Option<usize> {
    let mut depth: isize = 0;

    for token in Token::lexer(buffer) {
        match token {
            Ok(Token::LParen) | Ok(Token::LBracket) => depth += 1,
            Ok(Token::RParen) | Ok(Token::RBracket) => depth -= 1,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    Some(depth.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> Vec<Token> {
        Token::lexer(input).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_tokens() {
        assert_eq!(
            tokens("lot->area() !>= 2.5e-1"),
            vec![
                Token::Word,
                Token::Arrow,
                Token::Word,
                Token::LParen,
                Token::RParen,
                Token::Comparison,
                Token::Number,
            ]
        );
        assert_eq!(
            tokens("-x + 'a b'"),
            vec![Token::Operator, Token::Word, Token::Operator, Token::Str]
        );
    }

    #[test]
    fn test_depth() {
        assert_eq!(calculate_depth("if(a > 1, sizes[0"), Some(2));
        assert_eq!(calculate_depth("f(1))"), Some(0));
        assert_eq!(calculate_depth("'(' + 1"), Some(0));
        assert_eq!(calculate_depth("'open"), None);
    }
}
