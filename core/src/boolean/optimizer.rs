//! Semantics-preserving rewrites applied before evaluation.
//!
//! Costs use a term's document frequency, i.e. its posting list length. An
//! AND costs the minimum of its operands, OR and ANDNOT the sum.

use super::{Connective, Expr, Literal};
use crate::index::InvertedIndex;

pub fn optimize(expr: Expr, index: &dyn InvertedIndex) -> Expr {
    let mut expr = simplify(expr);
    reorder(&mut expr, Connective::And, index);
    expr
}

/// Flattens AND directly inside AND and OR directly inside OR.
pub fn simplify(expr: Expr) -> Expr {
    match expr {
        Expr::And(operands) => {
            let mut flat = Vec::with_capacity(operands.len());
            for operand in operands.into_iter().map(simplify) {
                match operand {
                    Expr::And(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            Expr::And(flat)
        }
        Expr::Or(operands) => {
            let mut flat = Vec::with_capacity(operands.len());
            for operand in operands.into_iter().map(simplify) {
                match operand {
                    Expr::Or(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            Expr::Or(flat)
        }
        Expr::AndNot(left, right) => Expr::AndNot(Box::new(simplify(*left)), Box::new(simplify(*right))),
        literal @ Expr::Literal(_) => literal,
    }
}

/// Reorders operands in place, cheapest first, and returns the estimated cost.
///
/// AND and OR nodes with more than two operands are reordered, as are quoted
/// literals with more than two terms. Sorting is stable.
pub fn reorder(expr: &mut Expr, context: Connective, index: &dyn InvertedIndex) -> usize {
    match expr {
        Expr::And(operands) => reorder_operands(operands, Connective::And, index),
        Expr::Or(operands) => reorder_operands(operands, Connective::Or, index),
        Expr::AndNot(left, right) => {
            reorder(left, Connective::And, index) + reorder(right, Connective::Or, index)
        }
        Expr::Literal(literal) => reorder_terms(literal, context, index),
    }
}

fn reorder_operands(operands: &mut Vec<Expr>, connective: Connective, index: &dyn InvertedIndex) -> usize {
    let mut costed: Vec<(usize, Expr)> = operands
        .drain(..)
        .map(|mut operand| (reorder(&mut operand, connective, index), operand))
        .collect();
    if costed.len() > 2 {
        costed.sort_by_key(|(cost, _)| *cost);
    }
    let cost = combine(connective, costed.iter().map(|(cost, _)| *cost));
    operands.extend(costed.into_iter().map(|(_, operand)| operand));
    cost
}

fn reorder_terms(literal: &mut Literal, context: Connective, index: &dyn InvertedIndex) -> usize {
    if !literal.quoted {
        return literal.terms.first().map_or(0, |term| index.get_document_frequency(term));
    }
    let mut costed: Vec<(usize, String)> = literal
        .terms
        .drain(..)
        .map(|term| (index.get_document_frequency(&term), term))
        .collect();
    if costed.len() > 2 {
        costed.sort_by_key(|(cost, _)| *cost);
    }
    let cost = combine(context, costed.iter().map(|(cost, _)| *cost));
    literal.terms.extend(costed.into_iter().map(|(_, term)| term));
    cost
}

fn combine(connective: Connective, costs: impl Iterator<Item = usize>) -> usize {
    match connective {
        Connective::And => costs.min().unwrap_or(0),
        Connective::Or => costs.sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Postings;
    use std::collections::HashMap;

    /// Answers document frequencies only.
    struct Frequencies(HashMap<&'static str, usize>);

    impl InvertedIndex for Frequencies {
        fn get_terms<'a>(&'a self, buffer: &str) -> Box<dyn Iterator<Item = String> + 'a> {
            let terms: Vec<String> = buffer.split_whitespace().map(str::to_string).collect();
            Box::new(terms.into_iter())
        }

        fn get_indexed_terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
            Box::new(self.0.keys().copied())
        }

        fn get_postings_iterator(&self, _term: &str) -> Postings<'_> {
            Box::new(std::iter::empty())
        }

        fn get_document_frequency(&self, term: &str) -> usize {
            self.0.get(term).copied().unwrap_or(0)
        }
    }

    fn frequencies() -> Frequencies {
        Frequencies(HashMap::from([("a", 50), ("b", 5), ("c", 20), ("d", 1), ("e", 5)]))
    }

    fn bare(term: &str) -> Expr {
        Expr::Literal(Literal { text: term.into(), quoted: false, terms: vec![term.into()] })
    }

    fn quoted(terms: &[&str]) -> Expr {
        Expr::Literal(Literal {
            text: terms.join(" "),
            quoted: true,
            terms: terms.iter().map(|t| t.to_string()).collect(),
        })
    }

    #[test]
    fn simplify_flattens_same_operator_nesting() {
        let expr = Expr::And(vec![
            bare("a"),
            Expr::And(vec![bare("b"), Expr::And(vec![bare("c")])]),
            Expr::Or(vec![bare("d"), Expr::Or(vec![bare("e")]), Expr::And(vec![bare("a")])]),
        ]);
        assert_eq!(simplify(expr).to_string(), "AND(a, b, c, OR(d, e, AND(a)))");
    }

    #[test]
    fn simplify_keeps_andnot_operands_apart() {
        let expr = Expr::AndNot(
            Box::new(Expr::And(vec![bare("a"), Expr::And(vec![bare("b")])])),
            Box::new(Expr::And(vec![bare("c")])),
        );
        assert_eq!(simplify(expr).to_string(), "ANDNOT(AND(a, b), AND(c))");
    }

    #[test]
    fn reorders_wide_nodes_by_cost() {
        let index = frequencies();
        let mut expr = Expr::And(vec![bare("a"), bare("c"), bare("b"), bare("e")]);
        assert_eq!(reorder(&mut expr, Connective::And, &index), 5);
        // Stable: b precedes e at equal cost.
        assert_eq!(expr.to_string(), "AND(b, e, c, a)");

        let mut expr = Expr::Or(vec![bare("a"), bare("c"), bare("d")]);
        assert_eq!(reorder(&mut expr, Connective::And, &index), 71);
        assert_eq!(expr.to_string(), "OR(d, c, a)");
    }

    #[test]
    fn leaves_binary_nodes_alone() {
        let index = frequencies();
        let mut expr = Expr::And(vec![bare("a"), bare("d")]);
        assert_eq!(reorder(&mut expr, Connective::And, &index), 1);
        assert_eq!(expr.to_string(), "AND(a, d)");
    }

    #[test]
    fn quoted_literals_cost_per_context() {
        let index = frequencies();
        let mut expr = quoted(&["a", "c", "d"]);
        assert_eq!(reorder(&mut expr, Connective::And, &index), 1);
        assert_eq!(expr.to_string(), "'d c a'");
        let mut expr = quoted(&["a", "c"]);
        assert_eq!(reorder(&mut expr, Connective::Or, &index), 70);
        assert_eq!(expr.to_string(), "'a c'");
    }

    #[test]
    fn andnot_sums_its_operands() {
        let index = frequencies();
        let mut expr = Expr::AndNot(Box::new(quoted(&["a", "b"])), Box::new(quoted(&["c", "d"])));
        // Left in AND context (min 5), right in OR context (20 + 1).
        assert_eq!(reorder(&mut expr, Connective::And, &index), 26);
    }

    #[test]
    fn optimize_flattens_then_reorders() {
        let index = frequencies();
        let expr = Expr::And(vec![bare("a"), Expr::And(vec![bare("c"), bare("d")])]);
        assert_eq!(optimize(expr, &index).to_string(), "AND(d, c, a)");
    }
}
