// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the Fun language.
// Converts source code text into a stream of tokens for parsing.
//
// Supports:
// - Keywords: fun (also spelled function), var, while, if, else, return
// - Identifiers and unsigned decimal numbers
// - Operators: + - * / % > < >= <= == != && || =
// - Punctuation: ( ) { } , ;
// - Line comments starting with //

use crate::errors::{ParseError, SourceLocation};

pub const KEYWORDS: &[&str] = &["fun", "function", "var", "while", "if", "else", "return"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    /// Digits exactly as written; overflow is the interpreter's concern
    Number(String),
    Operator(String),
    Punctuation(char),
    Keyword(String),
    Eof,
}

impl TokenKind {
    /// Human-readable form used in parse error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Number(text) => format!("number {}", text),
            TokenKind::Operator(op) => format!("'{}'", op),
            TokenKind::Punctuation(c) => format!("'{}'", c),
            TokenKind::Keyword(k) => format!("keyword '{}'", k),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Tokenizes Fun source code into a vector of tokens ending with `Eof`.
///
/// Whitespace, including newlines, only separates tokens. Each token records
/// the line and column of its first character.
///
/// # Errors
/// Returns `ParseError::UnexpectedChar` for any character outside the grammar,
/// including a lone `&`, `|` or `!`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;
    let mut col = 1;

    while let Some(&c) = chars.peek() {
        let start = col;
        match c {
            ' ' | '\t' | '\r' => {
                chars.next();
                col += 1;
            }
            '\n' => {
                chars.next();
                line += 1;
                col = 1;
            }
            '0'..='9' => {
                let mut num = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_digit() {
                        num.push(ch);
                        chars.next();
                        col += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Number(num),
                    line,
                    column: start,
                });
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                        col += 1;
                    } else {
                        break;
                    }
                }

                let kind = if KEYWORDS.contains(&ident.as_str()) {
                    TokenKind::Keyword(ident)
                } else {
                    TokenKind::Identifier(ident)
                };
                tokens.push(Token {
                    kind,
                    line,
                    column: start,
                });
            }
            '/' => {
                chars.next();
                col += 1;
                if chars.peek() == Some(&'/') {
                    // Comment runs to end of line; the newline itself is handled above
                    while let Some(&ch) = chars.peek() {
                        if ch == '\n' {
                            break;
                        }
                        chars.next();
                        col += 1;
                    }
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Operator("/".into()),
                        line,
                        column: start,
                    });
                }
            }
            '+' | '-' | '*' | '%' => {
                chars.next();
                col += 1;
                tokens.push(Token {
                    kind: TokenKind::Operator(c.to_string()),
                    line,
                    column: start,
                });
            }
            '=' | '<' | '>' | '!' => {
                chars.next();
                col += 1;
                if chars.peek() == Some(&'=') {
                    chars.next();
                    col += 1;
                    tokens.push(Token {
                        kind: TokenKind::Operator(format!("{}=", c)),
                        line,
                        column: start,
                    });
                } else if c == '!' {
                    return Err(ParseError::UnexpectedChar {
                        ch: c,
                        location: SourceLocation::new(line, start),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Operator(c.to_string()),
                        line,
                        column: start,
                    });
                }
            }
            '&' | '|' => {
                chars.next();
                col += 1;
                if chars.peek() == Some(&c) {
                    chars.next();
                    col += 1;
                    tokens.push(Token {
                        kind: TokenKind::Operator(format!("{}{}", c, c)),
                        line,
                        column: start,
                    });
                } else {
                    return Err(ParseError::UnexpectedChar {
                        ch: c,
                        location: SourceLocation::new(line, start),
                    });
                }
            }
            '(' | ')' | '{' | '}' | ',' | ';' => {
                chars.next();
                col += 1;
                tokens.push(Token {
                    kind: TokenKind::Punctuation(c),
                    line,
                    column: start,
                });
            }
            _ => {
                return Err(ParseError::UnexpectedChar {
                    ch: c,
                    location: SourceLocation::new(line, start),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
        column: col,
    });

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_identifiers_and_numbers() {
        assert_eq!(
            kinds("var x1 = 42"),
            vec![
                TokenKind::Keyword("var".into()),
                TokenKind::Identifier("x1".into()),
                TokenKind::Operator("=".into()),
                TokenKind::Number("42".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("a >= b != c && d || e == f <= g"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Operator(">=".into()),
                TokenKind::Identifier("b".into()),
                TokenKind::Operator("!=".into()),
                TokenKind::Identifier("c".into()),
                TokenKind::Operator("&&".into()),
                TokenKind::Identifier("d".into()),
                TokenKind::Operator("||".into()),
                TokenKind::Identifier("e".into()),
                TokenKind::Operator("==".into()),
                TokenKind::Identifier("f".into()),
                TokenKind::Operator("<=".into()),
                TokenKind::Identifier("g".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped_and_division_kept() {
        assert_eq!(
            kinds("x / 2 // halve it\ny"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Operator("/".into()),
                TokenKind::Number("2".into()),
                TokenKind::Identifier("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokens_record_start_positions() {
        let tokens = tokenize("var a\n  println(a)").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 10));
    }

    #[test]
    fn stray_characters_are_rejected() {
        let err = tokenize("var a = 1 & 2").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedChar {
                ch: '&',
                location: SourceLocation::new(1, 11),
            }
        );
        assert!(tokenize("a = \"text\"").is_err());
        assert!(tokenize("!a").is_err());
    }
}
