// ABOUTME: Arithmetic operators: +, -, *, /, modulo, and basic transcendental functions

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;
use std::sync::Arc;

fn number_arg(args: &[Value], fname: &str, pos: usize) -> Result<f64, EvalError> {
    match args.get(pos) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(EvalError::type_error(fname, "number", other, pos)),
        None => Err(EvalError::arity_error(fname, "more", args.len())),
    }
}

#[builtin(name = "+", min = 0, max = -1)]
pub fn add(args: &[Value]) -> Result<Value, EvalError> {
    let mut sum = 0.0;
    for i in 0..args.len() {
        sum += number_arg(args, "+", i)?;
    }
    Ok(Value::Number(sum))
}

#[builtin(name = "-", min = 1, max = -1)]
pub fn sub(args: &[Value]) -> Result<Value, EvalError> {
    let first = number_arg(args, "-", 0)?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }
    let mut result = first;
    for i in 1..args.len() {
        result -= number_arg(args, "-", i)?;
    }
    Ok(Value::Number(result))
}

#[builtin(name = "*", min = 0, max = -1)]
pub fn mul(args: &[Value]) -> Result<Value, EvalError> {
    let mut product = 1.0;
    for i in 0..args.len() {
        product *= number_arg(args, "*", i)?;
    }
    Ok(Value::Number(product))
}

#[builtin(name = "/", min = 1, max = -1)]
pub fn div(args: &[Value]) -> Result<Value, EvalError> {
    let first = number_arg(args, "/", 0)?;
    if args.len() == 1 {
        if first == 0.0 {
            return Err(EvalError::ZeroDivision);
        }
        return Ok(Value::Number(1.0 / first));
    }
    let mut result = first;
    for i in 1..args.len() {
        let n = number_arg(args, "/", i)?;
        if n == 0.0 {
            return Err(EvalError::ZeroDivision);
        }
        result /= n;
    }
    Ok(Value::Number(result))
}

#[builtin(name = "modulo", min = 2, max = 2)]
pub fn modulo(args: &[Value]) -> Result<Value, EvalError> {
    let a = number_arg(args, "modulo", 0)?;
    let b = number_arg(args, "modulo", 1)?;
    if b == 0.0 {
        return Err(EvalError::ZeroDivision);
    }
    Ok(Value::Number(a.rem_euclid(b)))
}

#[builtin(name = "abs", min = 1, max = 1)]
pub fn abs(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "abs", 0)?.abs()))
}

#[builtin(name = "sqrt", min = 1, max = 1)]
pub fn sqrt(args: &[Value]) -> Result<Value, EvalError> {
    let n = number_arg(args, "sqrt", 0)?;
    if n < 0.0 {
        return Err(EvalError::runtime_error("sqrt", "argument must be non-negative"));
    }
    Ok(Value::Number(n.sqrt()))
}

#[builtin(name = "sin", min = 1, max = 1)]
pub fn sin(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "sin", 0)?.sin()))
}

#[builtin(name = "cos", min = 1, max = 1)]
pub fn cos(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "cos", 0)?.cos()))
}

#[builtin(name = "tan", min = 1, max = 1)]
pub fn tan(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "tan", 0)?.tan()))
}

#[builtin(name = "asin", min = 1, max = 1)]
pub fn asin(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "asin", 0)?.asin()))
}

#[builtin(name = "acos", min = 1, max = 1)]
pub fn acos(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "acos", 0)?.acos()))
}

#[builtin(name = "atan", min = 1, max = 1)]
pub fn atan(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "atan", 0)?.atan()))
}

#[builtin(name = "exp", min = 1, max = 1)]
pub fn exp(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "exp", 0)?.exp()))
}

#[builtin(name = "log", min = 1, max = 1)]
pub fn log(args: &[Value]) -> Result<Value, EvalError> {
    let n = number_arg(args, "log", 0)?;
    if n <= 0.0 {
        return Err(EvalError::runtime_error("log", "argument must be positive"));
    }
    Ok(Value::Number(n.ln()))
}

#[builtin(name = "round", min = 1, max = 1)]
pub fn round(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "round", 0)?.round()))
}

#[builtin(name = "floor", min = 1, max = 1)]
pub fn floor(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "floor", 0)?.floor()))
}

#[builtin(name = "ceiling", min = 1, max = 1)]
pub fn ceiling(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "ceiling", 0)?.ceil()))
}

#[builtin(name = "truncate", min = 1, max = 1)]
pub fn truncate(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg(args, "truncate", 0)?.trunc()))
}

#[builtin(name = "remainder", min = 2, max = 2)]
pub fn remainder(args: &[Value]) -> Result<Value, EvalError> {
    let a = number_arg(args, "remainder", 0)?;
    let b = number_arg(args, "remainder", 1)?;
    if b == 0.0 {
        return Err(EvalError::ZeroDivision);
    }
    Ok(Value::Number(a % b))
}

#[builtin(name = "min", min = 1, max = -1)]
pub fn min_fn(args: &[Value]) -> Result<Value, EvalError> {
    let mut best = number_arg(args, "min", 0)?;
    for i in 1..args.len() {
        best = best.min(number_arg(args, "min", i)?);
    }
    Ok(Value::Number(best))
}

#[builtin(name = "max", min = 1, max = -1)]
pub fn max_fn(args: &[Value]) -> Result<Value, EvalError> {
    let mut best = number_arg(args, "max", 0)?;
    for i in 1..args.len() {
        best = best.max(number_arg(args, "max", i)?);
    }
    Ok(Value::Number(best))
}

pub fn register(env: &Arc<Environment>) {
    register_add(env);
    register_sub(env);
    register_mul(env);
    register_div(env);
    register_modulo(env);
    register_abs(env);
    register_sqrt(env);
    register_sin(env);
    register_cos(env);
    register_tan(env);
    register_asin(env);
    register_acos(env);
    register_atan(env);
    register_exp(env);
    register_log(env);
    register_round(env);
    register_floor(env);
    register_ceiling(env);
    register_truncate(env);
    register_remainder(env);
    register_min_fn(env);
    register_max_fn(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sums_all_args() {
        let result = add(&[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]).unwrap();
        assert_eq!(result.to_string(), "6");
    }

    #[test]
    fn sub_with_one_arg_negates() {
        let result = sub(&[Value::Number(5.0)]).unwrap();
        assert_eq!(result.to_string(), "-5");
    }

    #[test]
    fn div_by_zero_is_zero_division_error() {
        assert!(matches!(
            div(&[Value::Number(1.0), Value::Number(0.0)]),
            Err(EvalError::ZeroDivision)
        ));
    }

    #[test]
    fn type_error_names_offending_position() {
        let err = add(&[Value::Number(1.0), Value::string("x")]).unwrap_err();
        assert!(err.to_string().contains("argument 1"));
    }
}
