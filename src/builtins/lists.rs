// ABOUTME: Pair/list operations, including proper support for improper (dotted) lists

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;
use std::sync::Arc;

#[builtin(name = "cons", min = 2, max = 2)]
pub fn cons(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

#[builtin(name = "car", min = 1, max = 1)]
pub fn car(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::List { items, .. } if !items.is_empty() => Ok(items[0].clone()),
        Value::List { items, tail: None } if items.is_empty() => {
            Err(EvalError::runtime_error("car", "List has length 0"))
        }
        other => Err(EvalError::type_error("car", "pair", other, 0)),
    }
}

#[builtin(name = "cdr", min = 1, max = 1)]
pub fn cdr(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::List { items, tail } if !items.is_empty() => {
            if items.len() == 1 {
                Ok(tail.as_ref().map(|t| (**t).clone()).unwrap_or_else(Value::nil))
            } else {
                Ok(Value::List {
                    items: items[1..].to_vec(),
                    tail: tail.clone(),
                })
            }
        }
        Value::List { items, tail: None } if items.is_empty() => {
            Err(EvalError::runtime_error("cdr", "List has length 0"))
        }
        other => Err(EvalError::type_error("cdr", "pair", other, 0)),
    }
}

#[builtin(name = "list", min = 0, max = -1)]
pub fn list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::from_vec(args.to_vec()))
}

#[builtin(name = "length", min = 1, max = 1)]
pub fn length(args: &[Value]) -> Result<Value, EvalError> {
    match args[0].to_vec() {
        Some(items) => Ok(Value::Number(items.len() as f64)),
        None => Err(EvalError::type_error("length", "proper list", &args[0], 0)),
    }
}

#[builtin(name = "append", min = 0, max = -1)]
pub fn append(args: &[Value]) -> Result<Value, EvalError> {
    let mut result = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        match arg.to_vec() {
            Some(items) => result.extend(items),
            None => return Err(EvalError::type_error("append", "proper list", arg, i)),
        }
    }
    Ok(Value::from_vec(result))
}

#[builtin(name = "reverse", min = 1, max = 1)]
pub fn reverse(args: &[Value]) -> Result<Value, EvalError> {
    let mut items = args[0]
        .to_vec()
        .ok_or_else(|| EvalError::type_error("reverse", "proper list", &args[0], 0))?;
    items.reverse();
    Ok(Value::from_vec(items))
}

#[builtin(name = "list-ref", min = 2, max = 2)]
pub fn list_ref(args: &[Value]) -> Result<Value, EvalError> {
    let items = args[0]
        .to_vec()
        .ok_or_else(|| EvalError::type_error("list-ref", "proper list", &args[0], 0))?;
    let idx = match &args[1] {
        Value::Number(n) => *n as usize,
        other => return Err(EvalError::type_error("list-ref", "number", other, 1)),
    };
    items
        .get(idx)
        .cloned()
        .ok_or_else(|| EvalError::runtime_error("list-ref", "index out of range"))
}

/// `(map proc list ...)`: applies `proc` across parallel lists, stopping
/// at the shortest one.
#[builtin(name = "map", min = 2, max = -1)]
pub fn map(args: &[Value]) -> Result<Value, EvalError> {
    let proc = args[0].clone();
    let lists = args[1..]
        .iter()
        .enumerate()
        .map(|(i, v)| v.to_vec().ok_or_else(|| EvalError::type_error("map", "proper list", v, i + 1)))
        .collect::<Result<Vec<_>, _>>()?;
    let len = lists.iter().map(|l| l.len()).min().unwrap_or(0);
    let mut result = Vec::with_capacity(len);
    for i in 0..len {
        let call_args: Vec<Value> = lists.iter().map(|l| l[i].clone()).collect();
        result.push(crate::eval::apply_procedure(proc.clone(), call_args)?);
    }
    Ok(Value::from_vec(result))
}

pub fn register(env: &Arc<Environment>) {
    register_cons(env);
    register_car(env);
    register_cdr(env);
    register_list(env);
    register_length(env);
    register_append(env);
    register_reverse(env);
    register_list_ref(env);
    register_map(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cons_onto_proper_list_stays_proper() {
        let v = cons(&[Value::Number(1.0), Value::from_vec(vec![Value::Number(2.0)])]).unwrap();
        assert!(v.is_proper_list());
        assert_eq!(v.to_string(), "(1 2)");
    }

    #[test]
    fn cons_onto_atom_makes_dotted_pair() {
        let v = cons(&[Value::Number(1.0), Value::Number(2.0)]).unwrap();
        assert!(!v.is_proper_list());
        assert_eq!(v.to_string(), "(1 . 2)");
    }

    #[test]
    fn car_cdr_on_empty_list_errors() {
        assert!(car(&[Value::nil()]).is_err());
        assert!(cdr(&[Value::nil()]).is_err());
    }

    #[test]
    fn cdr_of_singleton_improper_list_returns_the_tail() {
        let dotted = Value::cons(Value::Number(1.0), Value::Number(2.0));
        let result = cdr(&[dotted]).unwrap();
        assert_eq!(result.to_string(), "2");
    }

    #[test]
    fn append_concatenates_proper_lists() {
        let a = Value::from_vec(vec![Value::Number(1.0)]);
        let b = Value::from_vec(vec![Value::Number(2.0), Value::Number(3.0)]);
        assert_eq!(append(&[a, b]).unwrap().to_string(), "(1 2 3)");
    }
}
