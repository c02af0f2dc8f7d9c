//! Unranked Boolean retrieval.
//!
//! A query is an expression over the operators `AND`, `OR` (any positive
//! arity) and `ANDNOT` (exactly two operands), e.g.
//! `ANDNOT(AND(cat, 'black white'), dog)`. Operator names are case-sensitive.
//! Bare literals must normalize to a single term; quoted literals may hold
//! several, which are combined with the operator of the enclosing context.
//! Matching documents come back in ascending document id order.

mod lexer;
mod optimizer;
mod parser;

use crate::corpus::Corpus;
use crate::document::Document;
use crate::index::{InvertedIndex, Postings};
use crate::merger;
use parser::SyntaxNode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

pub use optimizer::{optimize, reorder, simplify};

/// Why a query could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Syntax error, {0}.")]
    Syntax(String),
    #[error("Unsupported operator {0}.")]
    UnsupportedOperator(String),
    #[error("Operator {0} expects at least one argument.")]
    MissingArguments(String),
    #[error("Operator ANDNOT expects exactly two arguments.")]
    AndNotArity,
    #[error("Expected '{0}' to contain at least one term.")]
    NoTerms(String),
    #[error("Expected '{text}' to contain a single term, got [{}].", quote_all(.terms))]
    NotSingleTerm { text: String, terms: Vec<String> },
}

fn quote_all(terms: &[String]) -> String {
    terms.iter().map(|term| format!("'{term}'")).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BooleanOptions {
    pub optimize: bool,
}

impl Default for BooleanOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// How the terms of a quoted literal, or the operands of a node, are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// A literal decorated with its normalized terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub quoted: bool,
    pub terms: Vec<String>,
}

/// A validated query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    And(Vec<Expr>),
    Or(Vec<Expr>),
    AndNot(Box<Expr>, Box<Expr>),
    Literal(Literal),
}

impl fmt::Display for Expr {
    /// Renders the expression with normalized terms, e.g. `AND(cat, 'black white')`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn operands(f: &mut fmt::Formatter<'_>, name: &str, operands: &[&Expr]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{operand}")?;
            }
            write!(f, ")")
        }
        match self {
            Expr::And(children) => operands(f, "AND", &children.iter().collect::<Vec<_>>()),
            Expr::Or(children) => operands(f, "OR", &children.iter().collect::<Vec<_>>()),
            Expr::AndNot(left, right) => operands(f, "ANDNOT", &[&**left, &**right]),
            Expr::Literal(Literal { quoted: true, terms, .. }) => write!(f, "'{}'", terms.join(" ")),
            Expr::Literal(Literal { terms, .. }) => write!(f, "{}", terms.join(" ")),
        }
    }
}

pub struct BooleanSearchEngine<'a> {
    corpus: &'a dyn Corpus,
    index: &'a dyn InvertedIndex,
}

impl<'a> BooleanSearchEngine<'a> {
    pub fn new(corpus: &'a dyn Corpus, index: &'a dyn InvertedIndex) -> Self {
        Self { corpus, index }
    }

    /// Parses, validates and (optionally) optimizes `expression` without
    /// touching any posting lists.
    pub fn plan(&self, expression: &str, options: &BooleanOptions) -> Result<Expr, QueryError> {
        let tree = parser::parse(expression)?;
        let expr = self.validate(tree)?;
        Ok(if options.optimize { optimize(expr, self.index) } else { expr })
    }

    /// Documents matching `expression`, in ascending document id order.
    pub fn evaluate(
        &self,
        expression: &str,
        options: &BooleanOptions,
    ) -> Result<impl Iterator<Item = &'a Document> + 'a, QueryError> {
        let expr = self.plan(expression, options)?;
        tracing::debug!(%expr, optimize = options.optimize, "evaluating boolean query");
        let corpus = self.corpus;
        Ok(self
            .postings(&expr, Connective::And)
            .filter_map(move |posting| corpus.get_document(posting.document_id)))
    }

    fn validate(&self, node: SyntaxNode) -> Result<Expr, QueryError> {
        match node {
            SyntaxNode::Call { name, args } => match name.as_str() {
                "AND" | "OR" => {
                    if args.is_empty() {
                        return Err(QueryError::MissingArguments(name));
                    }
                    let operands = args.into_iter().map(|arg| self.validate(arg)).collect::<Result<Vec<_>, _>>()?;
                    Ok(if name == "AND" { Expr::And(operands) } else { Expr::Or(operands) })
                }
                "ANDNOT" => {
                    let [left, right]: [SyntaxNode; 2] = args.try_into().map_err(|_| QueryError::AndNotArity)?;
                    Ok(Expr::AndNot(Box::new(self.validate(left)?), Box::new(self.validate(right)?)))
                }
                _ => Err(QueryError::UnsupportedOperator(name)),
            },
            SyntaxNode::Quoted(text) => {
                let mut terms: Vec<String> = Vec::new();
                for term in self.index.get_terms(&text) {
                    if !terms.contains(&term) {
                        terms.push(term);
                    }
                }
                if terms.is_empty() {
                    return Err(QueryError::NoTerms(text));
                }
                Ok(Expr::Literal(Literal { text, quoted: true, terms }))
            }
            SyntaxNode::Bare(text) => {
                let terms: Vec<String> = self.index.get_terms(&text).collect();
                if terms.len() != 1 {
                    return Err(QueryError::NotSingleTerm { text, terms });
                }
                Ok(Expr::Literal(Literal { text, quoted: false, terms }))
            }
        }
    }

    /// Evaluates depth first, folding operands in query order. ANDNOT takes
    /// its left operand in AND context and its right in OR context.
    fn postings(&self, expr: &Expr, context: Connective) -> Postings<'a> {
        match expr {
            Expr::And(operands) => fold(operands.iter().map(|e| self.postings(e, Connective::And)), Connective::And),
            Expr::Or(operands) => fold(operands.iter().map(|e| self.postings(e, Connective::Or)), Connective::Or),
            Expr::AndNot(left, right) => Box::new(merger::difference(
                self.postings(left, Connective::And),
                self.postings(right, Connective::Or),
            )),
            Expr::Literal(literal) => {
                let index = self.index;
                fold(literal.terms.iter().map(|term| index.get_postings_iterator(term)), context)
            }
        }
    }
}

/// Merges operands pairwise, neighbours first, so the iterator tree stays
/// logarithmically deep however many operands a node has.
fn fold<'a>(operands: impl Iterator<Item = Postings<'a>>, connective: Connective) -> Postings<'a> {
    let mut level: Vec<Postings<'a>> = operands.collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut pairs = level.into_iter();
        while let Some(left) = pairs.next() {
            next.push(match pairs.next() {
                Some(right) => merge(left, right, connective),
                None => left,
            });
        }
        level = next;
    }
    level.pop().unwrap_or_else(|| Box::new(std::iter::empty()))
}

fn merge<'a>(left: Postings<'a>, right: Postings<'a>, connective: Connective) -> Postings<'a> {
    match connective {
        Connective::And => Box::new(merger::intersection(left, right)),
        Connective::Or => Box::new(merger::union(left, right)),
    }
}
