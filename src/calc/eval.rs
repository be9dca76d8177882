//! Tree-walking evaluator

use super::{BinOp, CalcError, Expr};

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "tau" => Some(std::f64::consts::TAU),
        _ => None,
    }
}

fn arity(name: &str, args: &[f64], expected: usize) -> Result<(), CalcError> {
    if args.len() != expected {
        return Err(CalcError::Evaluation(format!(
            "{}() takes {} argument(s), got {}",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn call(name: &str, args: &[f64]) -> Result<f64, CalcError> {
    let unary = |f: fn(f64) -> f64| -> Result<f64, CalcError> {
        arity(name, args, 1)?;
        Ok(f(args[0]))
    };

    match name {
        "sqrt" => {
            arity(name, args, 1)?;
            if args[0] < 0.0 {
                return Err(CalcError::Evaluation("square root of a negative number".to_string()));
            }
            Ok(args[0].sqrt())
        }
        "ln" | "log" | "log10" | "log2" => {
            arity(name, args, 1)?;
            if args[0] <= 0.0 {
                return Err(CalcError::Evaluation(format!("{}() of a non-positive number", name)));
            }
            Ok(match name {
                "ln" => args[0].ln(),
                "log2" => args[0].log2(),
                _ => args[0].log10(),
            })
        }
        "abs" => unary(f64::abs),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "asin" => unary(f64::asin),
        "acos" => unary(f64::acos),
        "atan" => unary(f64::atan),
        "exp" => unary(f64::exp),
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "round" => unary(f64::round),
        "pow" => {
            arity(name, args, 2)?;
            Ok(args[0].powf(args[1]))
        }
        "min" | "max" => {
            if args.is_empty() {
                return Err(CalcError::Evaluation(format!("{}() needs at least one argument", name)));
            }
            let fold: fn(f64, f64) -> f64 = if name == "min" { f64::min } else { f64::max };
            Ok(args[1..].iter().fold(args[0], |acc, &v| fold(acc, v)))
        }
        _ => Err(CalcError::Evaluation(format!("unknown function '{}'", name))),
    }
}

fn apply(op: BinOp, left: f64, right: f64) -> Result<f64, CalcError> {
    match op {
        BinOp::Add => Ok(left + right),
        BinOp::Sub => Ok(left - right),
        BinOp::Mul => Ok(left * right),
        BinOp::Div => {
            if right == 0.0 {
                return Err(CalcError::Evaluation("division by zero".to_string()));
            }
            Ok(left / right)
        }
        BinOp::Rem => {
            if right == 0.0 {
                return Err(CalcError::Evaluation("modulo by zero".to_string()));
            }
            Ok(left % right)
        }
        BinOp::Pow => Ok(left.powf(right)),
    }
}

fn eval_node(expr: &Expr) -> Result<f64, CalcError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Ident(name) => constant(name)
            .ok_or_else(|| CalcError::Evaluation(format!("unknown identifier '{}'", name))),
        Expr::Neg(inner) => Ok(-eval_node(inner)?),
        Expr::BinOp { left, op, right } => apply(*op, eval_node(left)?, eval_node(right)?),
        Expr::Call { name, args } => {
            let values = args.iter().map(eval_node).collect::<Result<Vec<_>, _>>()?;
            call(name, &values)
        }
    }
}

/// Evaluate an expression tree; NaN and infinite results are errors
pub fn evaluate(expr: &Expr) -> Result<f64, CalcError> {
    let value = eval_node(expr)?;
    if !value.is_finite() {
        return Err(CalcError::Evaluation("result is not a finite number".to_string()));
    }
    Ok(value)
}
