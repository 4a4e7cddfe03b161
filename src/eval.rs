// ABOUTME: The special-form dispatcher and tail-call trampoline

use crate::env::Environment;
use crate::error::EvalError;
use crate::pattern_engine;
use crate::value::{Closure, Formals, Value};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Evaluates `expr` in `env`, trampolining through tail positions of
/// `if` and closure application instead of recursing, so a loop written
/// as self-tail-calls does not grow the Rust call stack.
pub fn eval(expr: &Value, env: &Arc<Environment>) -> Result<Value, EvalError> {
    let mut expr = expr.clone();
    let mut env = Arc::clone(env);

    loop {
        match &expr {
            Value::Symbol(s) if !s.is_empty() => return env.lookup(s),
            Value::Symbol(_) => return Ok(expr), // the unspecified-value sentinel
            Value::DelayedForm(inner) => return Ok((**inner).clone()),
            Value::List { items, tail: None } if items.is_empty() => return Ok(expr.clone()),
            Value::List { items, tail: None } => {
                let head = items[0].clone();
                if let Value::Symbol(name) = &head {
                    if let Some(step) = eval_special_form(name, &items[1..], &env)? {
                        match step {
                            TailStep::Value(v) => return Ok(v),
                            TailStep::Eval(e, ev) => {
                                expr = e;
                                env = ev;
                                continue;
                            }
                        }
                    }
                    if let Some(transformer) = env.lookup_macro(name) {
                        expr = pattern_engine::expand(&transformer, &expr)?;
                        continue;
                    }
                }

                let operator = eval_as_value(&head, &env);
                let mut args = Vec::with_capacity(items.len() - 1);
                for a in &items[1..] {
                    args.push(eval_as_value(a, &env));
                }

                match operator {
                    Value::Closure(closure) => {
                        let call_env = bind_formals(&closure, &args)?;
                        let (last, init) = closure
                            .body
                            .split_last()
                            .ok_or_else(|| EvalError::MalformedSpecialForm("lambda body".into()))?;
                        for form in init {
                            eval(form, &call_env)?;
                        }
                        expr = last.clone();
                        env = call_env;
                        continue;
                    }
                    Value::Builtin {
                        name,
                        min_arity,
                        max_arity,
                        func,
                    } => {
                        check_arity(name, min_arity, max_arity, args.len())?;
                        return func(&args);
                    }
                    other => return Err(EvalError::NotAProcedure(other.to_string())),
                }
            }
            Value::List { .. } => {
                return Err(EvalError::MalformedSpecialForm(
                    "cannot evaluate an improper list as a call".to_string(),
                ))
            }
            // Every other variant is self-evaluating.
            _ => return Ok(expr),
        }
    }
}

/// Evaluates `expr` the way an operator or argument position of a normal
/// application does: a raised error becomes a `Value::Error` instead of
/// unwinding, so errors are ordinary values that a builtin or special
/// form can observe (`error?`) or simply pass along unchanged.
fn eval_as_value(expr: &Value, env: &Arc<Environment>) -> Value {
    eval(expr, env).unwrap_or_else(|e| Value::Error(e.to_string()))
}

/// Applies an already-evaluated procedure value to already-evaluated
/// arguments, for builtins such as `apply` that receive their operator
/// and arguments as ordinary values rather than as source forms.
pub fn apply_procedure(operator: Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match operator {
        Value::Closure(closure) => {
            let call_env = bind_formals(&closure, &args)?;
            let mut result = Value::unspecified();
            for form in &closure.body {
                result = eval(form, &call_env)?;
            }
            Ok(result)
        }
        Value::Builtin {
            name,
            min_arity,
            max_arity,
            func,
        } => {
            check_arity(name, min_arity, max_arity, args.len())?;
            func(&args)
        }
        other => Err(EvalError::NotAProcedure(other.to_string())),
    }
}

enum TailStep {
    Value(Value),
    Eval(Value, Arc<Environment>),
}

fn check_arity(name: &str, min: usize, max: i64, actual: usize) -> Result<(), EvalError> {
    let ok = actual >= min && (max < 0 || actual as i64 <= max);
    if ok {
        return Ok(());
    }
    let expected = match (min, max) {
        (m, x) if x >= 0 && m as i64 == x => m.to_string(),
        (m, x) if x >= 0 => format!("{m}-{x}"),
        (m, _) => format!("at least {m}"),
    };
    Err(EvalError::arity_error(name, expected, actual))
}

fn bind_formals(closure: &Arc<Closure>, args: &[Value]) -> Result<Arc<Environment>, EvalError> {
    let call_env = Environment::with_parent(Arc::clone(&closure.env));
    match &closure.formals {
        Formals::Fixed(names) => {
            if names.len() != args.len() {
                return Err(EvalError::arity_error(
                    closure.name.as_deref().unwrap_or("#<procedure>"),
                    names.len().to_string(),
                    args.len(),
                ));
            }
            for (name, value) in names.iter().zip(args.iter()) {
                call_env.define(name.clone(), value.clone());
            }
        }
        Formals::Variadic(names, rest) => {
            if args.len() < names.len() {
                return Err(EvalError::arity_error(
                    closure.name.as_deref().unwrap_or("#<procedure>"),
                    format!("at least {}", names.len()),
                    args.len(),
                ));
            }
            for (name, value) in names.iter().zip(args.iter()) {
                call_env.define(name.clone(), value.clone());
            }
            call_env.define(rest.clone(), Value::from_vec(args[names.len()..].to_vec()));
        }
        Formals::Rest(name) => {
            call_env.define(name.clone(), Value::from_vec(args.to_vec()));
        }
    }
    Ok(call_env)
}

/// Parses a `lambda`/`define`'s formal-parameter form into one of the
/// three shapes the language accepts: a fixed list, a dotted list whose
/// tail is a bare symbol (variadic), or a bare symbol (fully variadic).
fn parse_formals(form: &Value) -> Result<Formals, EvalError> {
    match form {
        Value::Symbol(s) => Ok(Formals::Rest(s.clone())),
        Value::List { items, tail: None } => {
            let names = items
                .iter()
                .map(symbol_name)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Formals::Fixed(names))
        }
        Value::List {
            items,
            tail: Some(rest),
        } => {
            let names = items
                .iter()
                .map(symbol_name)
                .collect::<Result<Vec<_>, _>>()?;
            let rest_name = symbol_name(rest)?;
            Ok(Formals::Variadic(names, rest_name))
        }
        _ => Err(EvalError::MalformedSpecialForm(
            "lambda formal parameters".to_string(),
        )),
    }
}

fn symbol_name(v: &Value) -> Result<String, EvalError> {
    match v {
        Value::Symbol(s) => Ok(s.clone()),
        _ => Err(EvalError::MalformedSpecialForm(
            "expected a parameter name".to_string(),
        )),
    }
}

/// Dispatches a special form by name. Returns `Ok(None)` when `name` is
/// not one of the special forms, so the caller falls through to macro
/// lookup and then ordinary application.
fn eval_special_form(
    name: &str,
    args: &[Value],
    env: &Arc<Environment>,
) -> Result<Option<TailStep>, EvalError> {
    match name {
        "quote" => {
            if args.len() != 1 {
                return Err(EvalError::arity_error("quote", "1", args.len()));
            }
            Ok(Some(TailStep::Value(args[0].clone())))
        }
        "if" => {
            if args.len() < 2 || args.len() > 3 {
                return Err(EvalError::arity_error("if", "2-3", args.len()));
            }
            let cond = eval(&args[0], env)?;
            if cond.is_truthy() {
                Ok(Some(TailStep::Eval(args[1].clone(), Arc::clone(env))))
            } else if args.len() == 3 {
                Ok(Some(TailStep::Eval(args[2].clone(), Arc::clone(env))))
            } else {
                Ok(Some(TailStep::Value(Value::unspecified())))
            }
        }
        "define" => {
            if args.is_empty() {
                return Err(EvalError::MalformedSpecialForm("define".to_string()));
            }
            match &args[0] {
                Value::Symbol(target_name) => {
                    let value = match args.get(1) {
                        Some(form) => eval(form, env)?,
                        None => Value::unspecified(),
                    };
                    let value = name_if_closure(value, target_name);
                    env.define(target_name.clone(), value);
                    Ok(Some(TailStep::Value(Value::Symbol(target_name.clone()))))
                }
                Value::List { items, tail } if !items.is_empty() => {
                    // (define (f . formals) body...) sugar for a named lambda.
                    let fn_name = symbol_name(&items[0])?;
                    let formals = if items.len() > 1 {
                        Value::List {
                            items: items[1..].to_vec(),
                            tail: tail.clone(),
                        }
                    } else {
                        match tail {
                            Some(t) => (**t).clone(),
                            None => Value::nil(),
                        }
                    };
                    let closure = make_closure(&formals, &args[1..], env, Some(fn_name.clone()))?;
                    env.define(fn_name.clone(), closure);
                    Ok(Some(TailStep::Value(Value::Symbol(fn_name))))
                }
                _ => Err(EvalError::MalformedSpecialForm("define".to_string())),
            }
        }
        "set!" => {
            if args.len() != 2 {
                return Err(EvalError::arity_error("set!", "2", args.len()));
            }
            let target_name = symbol_name(&args[0])?;
            let value = eval(&args[1], env)?;
            env.assign(&target_name, value)?;
            Ok(Some(TailStep::Value(Value::unspecified())))
        }
        "lambda" => {
            if args.is_empty() {
                return Err(EvalError::MalformedSpecialForm("lambda".to_string()));
            }
            let closure = make_closure(&args[0], &args[1..], env, None)?;
            Ok(Some(TailStep::Value(closure)))
        }
        "define-syntax" => {
            if args.len() != 2 {
                return Err(EvalError::arity_error("define-syntax", "2", args.len()));
            }
            let macro_name = symbol_name(&args[0])?;
            let transformer = pattern_engine::parse_syntax_rules(&args[1])?;
            env.define_macro(macro_name, Arc::new(transformer));
            Ok(Some(TailStep::Value(Value::unspecified())))
        }
        "syntax-rules" => Err(EvalError::MalformedSpecialForm(
            "syntax-rules used outside define-syntax".to_string(),
        )),
        "go" => {
            if args.len() != 1 {
                return Err(EvalError::arity_error("go", "1", args.len()));
            }
            let form = args[0].clone();
            let spawn_env = Arc::clone(env);
            let (sender, receiver) = crossbeam_channel::bounded(0);
            let result_sender = sender.clone();
            thread::spawn(move || {
                let result =
                    eval(&form, &spawn_env).unwrap_or_else(|e| Value::Error(e.to_string()));
                let _ = result_sender.send(result);
            });
            let channel = crate::value::Channel {
                sender,
                receiver,
                closed: Arc::new(std::sync::Mutex::new(false)),
            };
            Ok(Some(TailStep::Value(Value::Channel(channel))))
        }
        "time" => {
            if args.len() != 1 {
                return Err(EvalError::arity_error("time", "1", args.len()));
            }
            let start = Instant::now();
            let result = eval(&args[0], env)?;
            eprintln!("; time: {:?}", start.elapsed());
            Ok(Some(TailStep::Value(result)))
        }
        _ => Ok(None),
    }
}

fn make_closure(
    formals_form: &Value,
    body: &[Value],
    env: &Arc<Environment>,
    name: Option<String>,
) -> Result<Value, EvalError> {
    if body.is_empty() {
        return Err(EvalError::MalformedSpecialForm(
            "lambda body must not be empty".to_string(),
        ));
    }
    let formals = parse_formals(formals_form)?;
    Ok(Value::Closure(Arc::new(Closure {
        formals,
        body: body.to_vec(),
        env: Arc::clone(env),
        name,
    })))
}

fn name_if_closure(value: Value, name: &str) -> Value {
    match value {
        Value::Closure(c) if c.name.is_none() => Value::Closure(Arc::new(Closure {
            formals: c.formals.clone(),
            body: c.body.clone(),
            env: Arc::clone(&c.env),
            name: Some(name.to_string()),
        })),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::reader::read_all;

    fn run(src: &str) -> Value {
        let env = Environment::new();
        register_builtins(&env);
        let mut result = Value::unspecified();
        for form in read_all(src).unwrap() {
            result = eval(&form, &env).unwrap();
        }
        result
    }

    #[test]
    fn arithmetic_and_define() {
        assert_eq!(run("(define x 10) (+ x 5)").to_string(), "15");
    }

    #[test]
    fn if_branches() {
        assert_eq!(run("(if #t 1 2)").to_string(), "1");
        assert_eq!(run("(if #f 1 2)").to_string(), "2");
    }

    #[test]
    fn lambda_and_application() {
        assert_eq!(run("((lambda (x y) (+ x y)) 3 4)").to_string(), "7");
    }

    #[test]
    fn variadic_lambda_collects_rest() {
        assert_eq!(run("((lambda (a . rest) rest) 1 2 3)").to_string(), "(2 3)");
    }

    #[test]
    fn bare_symbol_formals_collect_all_args() {
        assert_eq!(run("((lambda args args) 1 2 3)").to_string(), "(1 2 3)");
    }

    #[test]
    fn named_define_sugar() {
        assert_eq!(run("(define (add a b) (+ a b)) (add 2 3)").to_string(), "5");
    }

    #[test]
    fn set_bang_mutates_existing_binding() {
        assert_eq!(run("(define x 1) (set! x 2) x").to_string(), "2");
    }

    #[test]
    fn tail_recursive_loop_does_not_overflow() {
        let result = run(
            "(define (count n acc) (if (= n 0) acc (count (- n 1) (+ acc 1)))) \
             (count 100000 0)",
        );
        assert_eq!(result.to_string(), "100000");
    }

    #[test]
    fn syntax_rules_macro_expands() {
        let result = run(
            "(define-syntax my-if2 (syntax-rules () ((_ c t e) (if c t e)))) \
             (my-if2 #t 1 2)",
        );
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn quote_prevents_evaluation() {
        assert_eq!(run("(quote (+ 1 2))").to_string(), "(+ 1 2)");
        assert_eq!(run("'(a b c)").to_string(), "(a b c)");
    }

    #[test]
    fn go_returns_a_channel_that_yields_its_result() {
        let value = run("(-> (go (+ 1 2)))");
        assert_eq!(value.to_string(), "3");
    }

    #[test]
    fn unbound_symbol_errors() {
        let env = Environment::new();
        register_builtins(&env);
        let form = read_all("undefined-var").unwrap().remove(0);
        assert!(eval(&form, &env).is_err());
    }

    #[test]
    fn not_a_procedure_errors() {
        let env = Environment::new();
        register_builtins(&env);
        let form = read_all("(1 2 3)").unwrap().remove(0);
        assert!(eval(&form, &env).is_err());
    }
}
