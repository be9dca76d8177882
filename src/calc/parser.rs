//! Recursive-descent parser
//!
//! ```text
//! expr    → term (('+' | '-') term)*
//! term    → unary (('*' | '/' | '%') unary)*
//! unary   → ('-' | '+') unary | power
//! power   → atom ('^' unary)?
//! atom    → number | ident | ident '(' args ')' | '(' expr ')'
//! ```

use super::lexer::{tokenize, Token};
use super::{BinOp, CalcError, Expr};

/// Deepest tree the parser builds; keeps parsing, evaluation and drop off
/// the end of the stack.
pub const MAX_DEPTH: usize = 128;

/// Parse a complete expression; trailing tokens are an error
pub fn parse_expression(source: &str) -> Result<Expr, CalcError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens);
    if matches!(parser.peek(), Token::Eof) {
        return Err(CalcError::Parse("empty expression".to_string()));
    }
    let expr = parser.parse_expr()?;
    if !matches!(parser.peek(), Token::Eof) {
        return Err(parser.error("unexpected token after expression"));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), CalcError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("expected {:?}", expected)))
        }
    }

    fn error(&self, msg: &str) -> CalcError {
        CalcError::Parse(format!("{}, got {:?} at token {}", msg, self.peek(), self.pos))
    }

    fn enter(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::Parse("expression nested too deeply".to_string()));
        }
        Ok(())
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, CalcError>) -> Result<T, CalcError> {
        self.enter()?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_expr(&mut self) -> Result<Expr, CalcError> {
        let entry = self.depth;
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            // Each fold adds a level to the left-leaning tree
            self.enter()?;
            let right = self.parse_term()?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        self.depth = entry;
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, CalcError> {
        let entry = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_unary()?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        self.depth = entry;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CalcError> {
        match self.peek() {
            Token::Minus => {
                self.advance();
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Token::Plus => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            _ => self.parse_power(),
        }
    }

    /// Right-associative: the exponent is itself a unary expression, so
    /// `2^3^2` is `2^(3^2)` and `2^-1` parses.
    fn parse_power(&mut self) -> Result<Expr, CalcError> {
        let base = self.parse_atom()?;
        if matches!(self.peek(), Token::Caret) {
            self.advance();
            let exponent = self.nested(Self::parse_unary)?;
            return Ok(Expr::BinOp {
                left: Box::new(base),
                op: BinOp::Pow,
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, CalcError> {
        match self.advance() {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Ident(name) => {
                if matches!(self.peek(), Token::LParen) {
                    self.advance();
                    let args = self.nested(Self::parse_args)?;
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Token::LParen => {
                let inner = self.nested(Self::parse_expr)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => Err(CalcError::Parse(format!("unexpected token {:?}", other))),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, CalcError> {
        let mut args = Vec::new();
        if matches!(self.peek(), Token::RParen) {
            return Ok(args);
        }
        args.push(self.parse_expr()?);
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::Number(v))
    }

    #[test]
    fn test_precedence() {
        let expr = parse_expression("2 + 3 * 4").unwrap();
        assert_eq!(
            expr,
            Expr::BinOp {
                left: num(2.0),
                op: BinOp::Add,
                right: Box::new(Expr::BinOp {
                    left: num(3.0),
                    op: BinOp::Mul,
                    right: num(4.0),
                }),
            }
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_expression("2^3^2").unwrap();
        assert_eq!(
            expr,
            Expr::BinOp {
                left: num(2.0),
                op: BinOp::Pow,
                right: Box::new(Expr::BinOp {
                    left: num(3.0),
                    op: BinOp::Pow,
                    right: num(2.0),
                }),
            }
        );
    }

    #[test]
    fn test_negation_binds_looser_than_power() {
        let expr = parse_expression("-2^2").unwrap();
        assert_eq!(
            expr,
            Expr::Neg(Box::new(Expr::BinOp {
                left: num(2.0),
                op: BinOp::Pow,
                right: num(2.0),
            }))
        );
    }

    #[test]
    fn test_function_call_with_args() {
        let expr = parse_expression("max(1, 2 + 3)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "max");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("(1 + 2").is_err());
        assert!(parse_expression("1 + ").is_err());
        assert!(parse_expression("1 2").is_err());
        assert!(parse_expression("sqrt(4,").is_err());
    }

    fn nested_too_deeply(result: Result<Expr, CalcError>) -> bool {
        matches!(result, Err(CalcError::Parse(msg)) if msg == "expression nested too deeply")
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(nested_too_deeply(parse_expression(&parens)));

        let negations = format!("{}1", "-".repeat(10_000));
        assert!(nested_too_deeply(parse_expression(&negations)));

        let powers = vec!["2"; 10_000].join("^");
        assert!(nested_too_deeply(parse_expression(&powers)));

        let calls = format!("{}1{}", "abs(".repeat(10_000), ")".repeat(10_000));
        assert!(nested_too_deeply(parse_expression(&calls)));

        let sum = vec!["1"; 10_000].join(" + ");
        assert!(nested_too_deeply(parse_expression(&sum)));
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let parens = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_expression(&parens).unwrap(), Expr::Number(1.0));

        let sum = vec!["1"; 100].join(" + ");
        assert!(parse_expression(&sum).is_ok());
    }
}
