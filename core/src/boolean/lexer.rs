//! Lexer for Boolean query expressions such as `AND(foo, OR('bar baz', qux))`.

use super::QueryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Operator name or bare literal, e.g. `AND` or `foo`.
    Identifier(String),
    /// Single- or double-quoted literal, quotes removed.
    Quoted(String),
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("'{name}'"),
            Token::Quoted(text) => format!("string '{text}'"),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self { input: input.chars().collect(), position: 0 }
    }

    pub fn next_token(&mut self) -> Result<Token, QueryError> {
        self.skip_whitespace();

        let Some(&ch) = self.input.get(self.position) else {
            return Ok(Token::Eof);
        };

        match ch {
            '(' => {
                self.position += 1;
                Ok(Token::LeftParen)
            }
            ')' => {
                self.position += 1;
                Ok(Token::RightParen)
            }
            ',' => {
                self.position += 1;
                Ok(Token::Comma)
            }
            '"' | '\'' => self.read_quoted(ch),
            _ if is_identifier_char(ch) => Ok(self.read_identifier()),
            _ => Err(QueryError::Syntax(format!(
                "unexpected character '{ch}' at position {}",
                self.position
            ))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.input.get(self.position).is_some_and(|c| c.is_whitespace()) {
            self.position += 1;
        }
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while self.input.get(self.position).copied().is_some_and(is_identifier_char) {
            self.position += 1;
        }
        Token::Identifier(self.input[start..self.position].iter().collect())
    }

    /// Reads up to the matching closing quote. A backslash escapes the next
    /// character.
    fn read_quoted(&mut self, quote: char) -> Result<Token, QueryError> {
        let start = self.position;
        self.position += 1;
        let mut text = String::new();
        while let Some(&ch) = self.input.get(self.position) {
            self.position += 1;
            match ch {
                '\\' => match self.input.get(self.position) {
                    Some(&escaped) => {
                        text.push(escaped);
                        self.position += 1;
                    }
                    None => break,
                },
                _ if ch == quote => return Ok(Token::Quoted(text)),
                _ => text.push(ch),
            }
        }
        Err(QueryError::Syntax(format!("unterminated string literal at position {start}")))
    }
}

/// ASCII letters, digits and underscore, plus any non-ASCII alphanumeric.
fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || (!ch.is_ascii() && ch.is_alphanumeric())
}
