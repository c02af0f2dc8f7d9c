//! Recursive descent parser producing an undecorated syntax tree.
//!
//! # Grammar
//!
//! ```text
//! query     := node EOF
//! node      := IDENT call? | QUOTED
//! call      := '(' (node (',' node)* ','?)? ')'
//! ```
//!
//! Operator names are not checked here; `AND()` parses fine and is rejected
//! during validation. Calls nest at most [`MAX_NESTING`] deep.

use super::lexer::{Lexer, Token};
use super::QueryError;

/// Deepest allowed nesting of operator calls.
pub const MAX_NESTING: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Call { name: String, args: Vec<SyntaxNode> },
    Quoted(String),
    Bare(String),
}

pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, QueryError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    pub fn parse(mut self) -> Result<SyntaxNode, QueryError> {
        let node = self.parse_node(0)?;
        if self.current != Token::Eof {
            return Err(unexpected(&self.current, "end of input"));
        }
        Ok(node)
    }

    fn advance(&mut self) -> Result<Token, QueryError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// `depth` counts the calls enclosing this node.
    fn parse_node(&mut self, depth: usize) -> Result<SyntaxNode, QueryError> {
        match self.advance()? {
            Token::Quoted(text) => Ok(SyntaxNode::Quoted(text)),
            Token::Identifier(name) => {
                if self.current == Token::LeftParen {
                    if depth >= MAX_NESTING {
                        return Err(QueryError::Syntax("too many nested parentheses".into()));
                    }
                    self.advance()?;
                    let args = self.parse_arguments(depth + 1)?;
                    Ok(SyntaxNode::Call { name, args })
                } else {
                    Ok(SyntaxNode::Bare(name))
                }
            }
            other => Err(unexpected(&other, "an operator or a literal")),
        }
    }

    /// Arguments after `(`, consuming the closing `)`.
    fn parse_arguments(&mut self, depth: usize) -> Result<Vec<SyntaxNode>, QueryError> {
        let mut args = Vec::new();
        loop {
            if self.current == Token::RightParen {
                self.advance()?;
                return Ok(args);
            }
            args.push(self.parse_node(depth)?);
            match self.advance()? {
                Token::Comma => {}
                Token::RightParen => return Ok(args),
                other => return Err(unexpected(&other, "',' or ')'")),
            }
        }
    }
}

fn unexpected(found: &Token, expected: &str) -> QueryError {
    match found {
        Token::Eof => QueryError::Syntax(format!("unexpected end of input, expected {expected}")),
        token => QueryError::Syntax(format!("unexpected {}, expected {expected}", token.describe())),
    }
}

pub fn parse(input: &str) -> Result<SyntaxNode, QueryError> {
    Parser::new(input)?.parse()
}
