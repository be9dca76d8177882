//! Arithmetic expression evaluator
//!
//! A small lexer, a recursive-descent parser that builds an [`Expr`] tree,
//! and a tree-walking evaluator. Used by the calculator tool in place of any
//! dynamic code execution.

mod eval;
mod lexer;
mod parser;

pub use eval::evaluate;
pub use lexer::{tokenize, Token};
pub use parser::parse_expression;

use thiserror::Error;

/// Errors raised while lexing, parsing or evaluating an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("unexpected character '{ch}' at position {pos}")]
    Lex { ch: char, pos: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),
}

/// Binary operators, in the order of the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Named constant such as `pi`
    Ident(String),
    Neg(Box<Expr>),
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// Parse and evaluate in one step
pub fn eval_str(source: &str) -> Result<f64, CalcError> {
    let expr = parse_expression(source)?;
    evaluate(&expr)
}

/// Render a result without spurious trailing digits
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let fixed = format!("{:.10}", value);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_str() {
        assert_eq!(eval_str("2 + 2").unwrap(), 4.0);
        assert_eq!(eval_str("(1 + 2) * (3 + 4)").unwrap(), 21.0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(-12.0), "-12");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(10.0 / 3.0), "3.3333333333");
    }
}
