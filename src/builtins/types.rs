// ABOUTME: Type predicates and the eq?/eqv?/equal? equality family

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;
use std::sync::Arc;

macro_rules! predicate {
    ($fn_name:ident, $lisp_name:literal, $pat:pat) => {
        #[builtin(name = $lisp_name, min = 1, max = 1)]
        pub fn $fn_name(args: &[Value]) -> Result<Value, EvalError> {
            Ok(Value::Bool(matches!(&args[0], $pat)))
        }
    };
}

predicate!(number_p, "number?", Value::Number(_));
predicate!(string_p, "string?", Value::String(_));
predicate!(bool_p, "boolean?", Value::Bool(_));
predicate!(char_p, "char?", Value::Character(_));
predicate!(vector_p, "vector?", Value::Vector(_));
predicate!(procedure_p, "procedure?", Value::Closure(_) | Value::Builtin { .. });
predicate!(channel_p, "channel?", Value::Channel(_));
predicate!(error_p, "error?", Value::Error(_));

#[builtin(name = "symbol?", min = 1, max = 1)]
pub fn symbol_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(&args[0], Value::Symbol(s) if !s.is_empty())))
}

#[builtin(name = "pair?", min = 1, max = 1)]
pub fn pair_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(&args[0], Value::List { items, tail } if !items.is_empty() || tail.is_some())))
}

#[builtin(name = "null?", min = 1, max = 1)]
pub fn null_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_nil()))
}

#[builtin(name = "list?", min = 1, max = 1)]
pub fn list_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_proper_list()))
}

#[builtin(name = "eq?", min = 2, max = 2)]
pub fn eq_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].eq(&args[1])))
}

#[builtin(name = "eqv?", min = 2, max = 2)]
pub fn eqv_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].eqv(&args[1])))
}

#[builtin(name = "equal?", min = 2, max = 2)]
pub fn equal_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].equal(&args[1])))
}

#[builtin(name = "not", min = 1, max = 1)]
pub fn not(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(!args[0].is_truthy()))
}

pub fn register(env: &Arc<Environment>) {
    register_number_p(env);
    register_string_p(env);
    register_symbol_p(env);
    register_bool_p(env);
    register_char_p(env);
    register_vector_p(env);
    register_procedure_p(env);
    register_channel_p(env);
    register_error_p(env);
    register_pair_p(env);
    register_null_p(env);
    register_list_p(env);
    register_eq_p(env);
    register_eqv_p(env);
    register_equal_p(env);
    register_not(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_p_true_only_for_empty_list() {
        assert_eq!(null_p(&[Value::nil()]).unwrap().to_string(), "#t");
        assert_eq!(
            null_p(&[Value::from_vec(vec![Value::Number(1.0)])])
                .unwrap()
                .to_string(),
            "#f"
        );
    }

    #[test]
    fn pair_p_false_for_nil() {
        assert_eq!(pair_p(&[Value::nil()]).unwrap().to_string(), "#f");
        assert_eq!(
            pair_p(&[Value::from_vec(vec![Value::Number(1.0)])])
                .unwrap()
                .to_string(),
            "#t"
        );
    }

    #[test]
    fn equal_vs_eq_on_strings() {
        let a = Value::string("hi");
        let b = Value::string("hi");
        assert_eq!(equal_p(&[a.clone(), b.clone()]).unwrap().to_string(), "#t");
        assert_eq!(eq_p(&[a, b]).unwrap().to_string(), "#f");
    }
}
