// ABOUTME: syntax-rules pattern matching and ellipsis template expansion

use crate::error::EvalError;
use crate::value::{MacroTransformer, SyntaxRule, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const ELLIPSIS: &str = "...";

/// What a pattern variable is bound to once a match succeeds: either a
/// single form, or (when the variable sits under an ellipsis) the
/// sequence of forms it matched across each repetition.
#[derive(Debug, Clone)]
enum Binding {
    One(Value),
    Many(Vec<Binding>),
}

type Bindings = HashMap<String, Binding>;

/// Parses the body of a `(syntax-rules (literal ...) (pattern template) ...)`
/// form into a `MacroTransformer`.
pub fn parse_syntax_rules(form: &Value) -> Result<MacroTransformer, EvalError> {
    let items = form
        .to_vec()
        .ok_or_else(|| EvalError::MalformedSpecialForm("syntax-rules".to_string()))?;
    if items.len() < 2 || !matches!(&items[0], Value::Symbol(s) if s == "syntax-rules") {
        return Err(EvalError::MalformedSpecialForm("syntax-rules".to_string()));
    }
    let literals = items[1]
        .to_vec()
        .ok_or_else(|| EvalError::MalformedSpecialForm("syntax-rules literals".to_string()))?
        .into_iter()
        .map(|v| match v {
            Value::Symbol(s) => Ok(s),
            _ => Err(EvalError::MalformedSpecialForm(
                "syntax-rules literal must be a symbol".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rules = Vec::new();
    for rule in &items[2..] {
        let parts = rule
            .to_vec()
            .ok_or_else(|| EvalError::MalformedSpecialForm("syntax-rules rule".to_string()))?;
        if parts.len() != 2 {
            return Err(EvalError::MalformedSpecialForm(
                "syntax-rules rule must be (pattern template)".to_string(),
            ));
        }
        rules.push(SyntaxRule {
            pattern: parts[0].clone(),
            template: parts[1].clone(),
        });
    }

    Ok(MacroTransformer { literals, rules })
}

/// Expands a macro call `form` (the whole `(name ...)` call) using
/// `transformer`, trying each rule in order and returning the first
/// template expansion whose pattern matches.
pub fn expand(transformer: &MacroTransformer, form: &Value) -> Result<Value, EvalError> {
    let call_args = match form {
        Value::List { items, tail: None } => &items[1..],
        _ => {
            return Err(EvalError::NoPatternMatched(
                "macro call must be a proper list".to_string(),
            ))
        }
    };

    for rule in &transformer.rules {
        let pattern_args = match &rule.pattern {
            Value::List { items, tail } if !items.is_empty() => {
                (items[1..].to_vec(), tail.clone())
            }
            _ => continue,
        };
        let mut bindings = Bindings::new();
        if match_sequence(
            &pattern_args.0,
            pattern_args.1.as_deref(),
            call_args,
            &transformer.literals,
            &mut bindings,
        ) {
            return instantiate(&rule.template, &bindings);
        }
    }

    Err(EvalError::NoPatternMatched(form.to_string()))
}

fn match_pattern(
    pattern: &Value,
    input: &Value,
    literals: &[String],
    bindings: &mut Bindings,
) -> bool {
    match pattern {
        Value::Symbol(s) if s == "_" => true,
        Value::Symbol(s) if literals.contains(s) => {
            matches!(input, Value::Symbol(i) if i == s)
        }
        Value::Symbol(s) => {
            bindings.insert(s.clone(), Binding::One(input.clone()));
            true
        }
        Value::List {
            items: pitems,
            tail: ptail,
        } => match input {
            Value::List {
                items: iitems,
                tail: itail,
            } => match_sequence(pitems, ptail.as_deref(), iitems, literals, bindings)
                && match (ptail, itail) {
                    (None, None) => true,
                    (Some(pt), Some(it)) => match_pattern(pt, it, literals, bindings),
                    (Some(pt), None) if matches!(pt.as_ref(), Value::Symbol(_)) => {
                        // dotted pattern tail vs proper-list input tail: bind to nil.
                        match_pattern(pt, &Value::nil(), literals, bindings)
                    }
                    _ => false,
                },
            _ => false,
        },
        Value::Vector(pvec) => match input {
            Value::Vector(ivec) => {
                let pitems = pvec.lock().unwrap().clone();
                let iitems = ivec.lock().unwrap().clone();
                match_sequence(&pitems, None, &iitems, literals, bindings)
            }
            _ => false,
        },
        _ => pattern.equal(input),
    }
}

/// Matches a flat sequence of pattern elements (which may contain one
/// ellipsis marker) against a flat sequence of input forms.
fn match_sequence(
    pattern: &[Value],
    pattern_tail: Option<&Value>,
    input: &[Value],
    literals: &[String],
    bindings: &mut Bindings,
) -> bool {
    let ellipsis_pos = pattern.iter().position(is_ellipsis_marker);

    match ellipsis_pos {
        None => {
            if pattern.len() != input.len() {
                return false;
            }
            for (p, i) in pattern.iter().zip(input.iter()) {
                if !match_pattern(p, i, literals, bindings) {
                    return false;
                }
            }
            let _ = pattern_tail;
            true
        }
        Some(pos) => {
            // pattern[pos - 1] is the sub-pattern repeated zero or more times.
            if pos == 0 {
                return false;
            }
            let before = &pattern[..pos - 1];
            let repeated = &pattern[pos - 1];
            let after = &pattern[pos + 1..];

            if input.len() < before.len() + after.len() {
                return false;
            }
            let repeat_count = input.len() - before.len() - after.len();

            for (p, i) in before.iter().zip(input[..before.len()].iter()) {
                if !match_pattern(p, i, literals, bindings) {
                    return false;
                }
            }

            let repeated_vars = pattern_vars(repeated, literals);
            let mut collected: HashMap<String, Vec<Binding>> =
                repeated_vars.iter().map(|v| (v.clone(), Vec::new())).collect();

            for idx in 0..repeat_count {
                let item = &input[before.len() + idx];
                let mut sub_bindings = Bindings::new();
                if !match_pattern(repeated, item, literals, &mut sub_bindings) {
                    return false;
                }
                for var in &repeated_vars {
                    if let Some(b) = sub_bindings.remove(var) {
                        collected.get_mut(var).unwrap().push(b);
                    }
                }
            }
            for (var, seq) in collected {
                bindings.insert(var, Binding::Many(seq));
            }

            let after_input = &input[before.len() + repeat_count..];
            for (p, i) in after.iter().zip(after_input.iter()) {
                if !match_pattern(p, i, literals, bindings) {
                    return false;
                }
            }
            true
        }
    }
}

fn is_ellipsis_marker(v: &Value) -> bool {
    matches!(v, Value::Symbol(s) if s == ELLIPSIS)
}

/// Every pattern variable bound within `pattern` (excluding literals,
/// `_` and the ellipsis marker itself), used to know which bindings to
/// collect per repetition.
fn pattern_vars(pattern: &Value, literals: &[String]) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars(pattern, literals, &mut vars);
    vars
}

fn collect_vars(pattern: &Value, literals: &[String], out: &mut Vec<String>) {
    match pattern {
        Value::Symbol(s) if s == "_" || s == ELLIPSIS || literals.contains(s) => {}
        Value::Symbol(s) => out.push(s.clone()),
        Value::List { items, tail } => {
            for item in items {
                collect_vars(item, literals, out);
            }
            if let Some(t) = tail {
                collect_vars(t, literals, out);
            }
        }
        Value::Vector(v) => {
            for item in v.lock().unwrap().iter() {
                collect_vars(item, literals, out);
            }
        }
        _ => {}
    }
}

fn instantiate(template: &Value, bindings: &Bindings) -> Result<Value, EvalError> {
    match template {
        Value::Symbol(s) => match bindings.get(s) {
            Some(Binding::One(v)) => Ok(v.clone()),
            Some(Binding::Many(_)) => Err(EvalError::TemplateExpansionFailed(format!(
                "{s} used without ellipsis but bound under one"
            ))),
            None => Ok(template.clone()),
        },
        Value::List { items, tail } => {
            let mut out = Vec::new();
            let mut idx = 0;
            while idx < items.len() {
                let has_ellipsis_next =
                    items.get(idx + 1).map(is_ellipsis_marker).unwrap_or(false);
                if has_ellipsis_next {
                    let vars = pattern_vars(&items[idx], &[]);
                    let repeat_len = vars
                        .iter()
                        .filter_map(|v| match bindings.get(v) {
                            Some(Binding::Many(seq)) => Some(seq.len()),
                            _ => None,
                        })
                        .max()
                        .unwrap_or(0);
                    for rep in 0..repeat_len {
                        let mut sub = bindings.clone();
                        for v in &vars {
                            if let Some(Binding::Many(seq)) = bindings.get(v) {
                                if let Some(b) = seq.get(rep) {
                                    sub.insert(v.clone(), b.clone());
                                }
                            }
                        }
                        out.push(instantiate(&items[idx], &sub)?);
                    }
                    idx += 2;
                } else {
                    out.push(instantiate(&items[idx], bindings)?);
                    idx += 1;
                }
            }
            let new_tail = match tail {
                Some(t) => Some(Box::new(instantiate(t, bindings)?)),
                None => None,
            };
            Ok(Value::List {
                items: out,
                tail: new_tail,
            })
        }
        Value::Vector(v) => {
            let items = v.lock().unwrap().clone();
            let mut out = Vec::new();
            let mut idx = 0;
            while idx < items.len() {
                let has_ellipsis_next =
                    items.get(idx + 1).map(is_ellipsis_marker).unwrap_or(false);
                if has_ellipsis_next {
                    let vars = pattern_vars(&items[idx], &[]);
                    let repeat_len = vars
                        .iter()
                        .filter_map(|v| match bindings.get(v) {
                            Some(Binding::Many(seq)) => Some(seq.len()),
                            _ => None,
                        })
                        .max()
                        .unwrap_or(0);
                    for rep in 0..repeat_len {
                        let mut sub = bindings.clone();
                        for v in &vars {
                            if let Some(Binding::Many(seq)) = bindings.get(v) {
                                if let Some(b) = seq.get(rep) {
                                    sub.insert(v.clone(), b.clone());
                                }
                            }
                        }
                        out.push(instantiate(&items[idx], &sub)?);
                    }
                    idx += 2;
                } else {
                    out.push(instantiate(&items[idx], bindings)?);
                    idx += 1;
                }
            }
            Ok(Value::Vector(Arc::new(Mutex::new(out))))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_all;

    fn parse_one(src: &str) -> Value {
        read_all(src).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn expands_simple_swap_macro() {
        let def = parse_one("(syntax-rules () ((_ a b) (list b a)))");
        let transformer = parse_syntax_rules(&def).unwrap();
        let call = parse_one("(swap! 1 2)");
        let expanded = expand(&transformer, &call).unwrap();
        assert_eq!(expanded.to_string(), "(list 2 1)");
    }

    #[test]
    fn expands_ellipsis_into_nested_ifs() {
        let def = parse_one(
            "(syntax-rules () \
               ((_ ) #t) \
               ((_ e) e) \
               ((_ e1 e2 ...) (if e1 (my-and e2 ...) #f)))",
        );
        let transformer = parse_syntax_rules(&def).unwrap();
        let call = parse_one("(my-and 1 2 3)");
        let expanded = expand(&transformer, &call).unwrap();
        assert_eq!(expanded.to_string(), "(if 1 (my-and 2 3) #f)");
    }

    #[test]
    fn vector_pattern_binds_like_a_list() {
        let def = parse_one("(syntax-rules () ((_ #(a b)) (list a b)))");
        let transformer = parse_syntax_rules(&def).unwrap();
        let call = parse_one("(m #(1 2))");
        let expanded = expand(&transformer, &call).unwrap();
        assert_eq!(expanded.to_string(), "(list 1 2)");
    }

    #[test]
    fn vector_pattern_supports_ellipsis() {
        let def = parse_one("(syntax-rules () ((_ #(x ...)) #(x ...)))");
        let transformer = parse_syntax_rules(&def).unwrap();
        let call = parse_one("(m #(1 2 3))");
        let expanded = expand(&transformer, &call).unwrap();
        assert_eq!(expanded.to_string(), "#(1 2 3)");
    }

    #[test]
    fn literal_keyword_must_match_verbatim() {
        let def = parse_one("(syntax-rules (else) ((_ else) (quote matched)))");
        let transformer = parse_syntax_rules(&def).unwrap();
        let good = parse_one("(m else)");
        assert!(expand(&transformer, &good).is_ok());
        let bad = parse_one("(m other)");
        assert!(expand(&transformer, &bad).is_err());
    }
}
