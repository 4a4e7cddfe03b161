// ABOUTME: The tagged-variant value type shared by the reader, evaluator and builtins

use crate::env::Environment;
use crate::error::EvalError;
use std::fmt;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender};

/// A builtin function pointer: receives already-evaluated arguments.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A pattern/template pair inside a `syntax-rules` transformer.
#[derive(Debug, Clone)]
pub struct SyntaxRule {
    pub pattern: Value,
    pub template: Value,
}

/// A `syntax-rules` macro transformer bound by `define-syntax`.
#[derive(Debug, Clone)]
pub struct MacroTransformer {
    pub literals: Vec<String>,
    pub rules: Vec<SyntaxRule>,
}

/// The shape of a closure's formal parameter list, per the three forms
/// `lambda` accepts: a fixed list, a dotted (variadic-tail) list, or a
/// bare symbol that binds the whole argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum Formals {
    Fixed(Vec<String>),
    Variadic(Vec<String>, String),
    Rest(String),
}

#[derive(Clone)]
pub struct Closure {
    pub formals: Formals,
    pub body: Vec<Value>,
    pub env: Arc<Environment>,
    pub name: Option<String>,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("formals", &self.formals)
            .field("name", &self.name)
            .finish()
    }
}

/// A handle to a rendezvous or multi-message channel.
#[derive(Clone)]
pub struct Channel {
    pub sender: Sender<Value>,
    pub receiver: Receiver<Value>,
    pub closed: Arc<Mutex<bool>>,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<channel>")
    }
}

/// Underlying sink/source for a port. Only stdio is implemented; file
/// ports are out of scope, matching the non-goal on OS I/O plumbing.
pub enum PortKind {
    Stdin,
    Stdout,
    Stderr,
}

#[derive(Clone)]
pub struct Port {
    pub kind: Arc<Mutex<PortKind>>,
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &*self.kind.lock().unwrap() {
            PortKind::Stdin => "stdin",
            PortKind::Stdout => "stdout",
            PortKind::Stderr => "stderr",
        };
        write!(f, "<port:{kind}>")
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Symbol(String),
    Bool(bool),
    Character(char),
    String(Arc<Mutex<String>>),
    Byte(u8),
    /// A possibly-improper list. `tail` is `None` for a proper list
    /// (including the empty list, when `items` is empty); `Some(v)` means
    /// the final cdr is `v` rather than the empty list.
    List {
        items: Vec<Value>,
        tail: Option<Box<Value>>,
    },
    Vector(Arc<Mutex<Vec<Value>>>),
    Channel(Channel),
    Port(Port),
    Closure(Arc<Closure>),
    Builtin {
        name: &'static str,
        min_arity: usize,
        max_arity: i64,
        func: BuiltinFn,
    },
    Macro(Arc<MacroTransformer>),
    /// A quoted/unevaluated form passed through the evaluator unchanged,
    /// used for macro templates and `(quote ...)` results.
    DelayedForm(Box<Value>),
    Error(String),
}

impl Value {
    pub fn nil() -> Value {
        Value::List {
            items: vec![],
            tail: None,
        }
    }

    pub fn unspecified() -> Value {
        Value::Symbol(String::new())
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Value::Symbol(s) if s.is_empty())
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Arc::new(Mutex::new(s.into())))
    }

    pub fn from_vec(items: Vec<Value>) -> Value {
        Value::List { items, tail: None }
    }

    pub fn cons(head: Value, tail: Value) -> Value {
        match tail {
            Value::List {
                items: mut rest,
                tail: rest_tail,
            } => {
                rest.insert(0, head);
                Value::List {
                    items: rest,
                    tail: rest_tail,
                }
            }
            other => Value::List {
                items: vec![head],
                tail: Some(Box::new(other)),
            },
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::List { items, tail: None } if items.is_empty())
    }

    pub fn is_proper_list(&self) -> bool {
        matches!(self, Value::List { tail: None, .. })
    }

    /// Returns the elements of a proper list, or `None` if this value is
    /// not a list or is an improper (dotted) list.
    pub fn to_vec(&self) -> Option<Vec<Value>> {
        match self {
            Value::List { items, tail: None } => Some(items.clone()),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::Bool(_) => "boolean",
            Value::Character(_) => "character",
            Value::String(_) => "string",
            Value::Byte(_) => "byte",
            Value::List { items, tail: None } if items.is_empty() => "nil",
            Value::List { .. } => "pair",
            Value::Vector(_) => "vector",
            Value::Channel(_) => "channel",
            Value::Port(_) => "port",
            Value::Closure(_) => "procedure",
            Value::Builtin { .. } => "procedure",
            Value::Macro(_) => "macro",
            Value::DelayedForm(_) => "form",
            Value::Error(_) => "error",
        }
    }

    /// `eq?`: identity for compound values, value equality for atoms that
    /// have value semantics per the data model. Lists are the exception:
    /// this implementation builds a fresh `Value::List` spine for every
    /// quoted form rather than interning them, so comparing by pointer
    /// would make `(eq? '(a b) '(a b))` false purely as an artifact of
    /// representation; lists compare element-wise by `eq` instead.
    pub fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::List { items: a, tail: ta }, Value::List { items: b, tail: tb }) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.eq(y))
                    && match (ta, tb) {
                        (None, None) => true,
                        (Some(x), Some(y)) => x.eq(y),
                        _ => false,
                    }
            }
            (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b),
            (Value::Vector(a), Value::Vector(b)) => Arc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            (Value::Channel(a), Value::Channel(b)) => Arc::ptr_eq(&a.closed, &b.closed),
            (Value::Builtin { name: a, .. }, Value::Builtin { name: b, .. }) => a == b,
            _ => false,
        }
    }

    /// `eqv?`: like `eq?` but kept as a distinct predicate at call sites,
    /// matching the separate names Scheme exposes even though this crate's
    /// atoms already compare by value under `eq`.
    pub fn eqv(&self, other: &Value) -> bool {
        self.eq(other)
    }

    /// `equal?`: structural equality, recursing through lists/vectors and
    /// comparing strings by content.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => *a.lock().unwrap() == *b.lock().unwrap(),
            (
                Value::List {
                    items: a,
                    tail: ta,
                },
                Value::List {
                    items: b,
                    tail: tb,
                },
            ) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
                    && match (ta, tb) {
                        (None, None) => true,
                        (Some(x), Some(y)) => x.equal(y),
                        _ => false,
                    }
            }
            (Value::Vector(a), Value::Vector(b)) => {
                let a = a.lock().unwrap();
                let b = b.lock().unwrap();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
            }
            _ => self.eqv(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::Character(c) => write!(f, "{c}"),
            Value::String(s) => write!(f, "{}", s.lock().unwrap()),
            Value::Byte(b) => write!(f, "{b}"),
            Value::List { items, tail } if tail.is_none() && items.is_empty() => write!(f, "()"),
            Value::List { items, tail } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                if let Some(t) = tail {
                    write!(f, " . {t}")?;
                }
                write!(f, ")")
            }
            Value::Vector(v) => {
                write!(f, "#(")?;
                let v = v.lock().unwrap();
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Channel(_) => write!(f, "#<channel>"),
            Value::Port(p) => write!(f, "{p:?}"),
            Value::Closure(c) => match &c.name {
                Some(n) => write!(f, "#<procedure:{n}>"),
                None => write!(f, "#<procedure>"),
            },
            Value::Builtin { name, .. } => write!(f, "#<builtin:{name}>"),
            Value::Macro(_) => write!(f, "#<macro>"),
            Value::DelayedForm(v) => write!(f, "{v}"),
            Value::Error(msg) => write!(f, "#<error:{msg}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improper_list_display() {
        let v = Value::cons(Value::Number(1.0), Value::Number(2.0));
        assert_eq!(v.to_string(), "(1 . 2)");
        assert!(!v.is_proper_list());
    }

    #[test]
    fn proper_list_round_trips_to_vec() {
        let v = Value::from_vec(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(v.to_vec().unwrap().len(), 2);
    }

    #[test]
    fn vectors_alias() {
        let v = Value::Vector(Arc::new(Mutex::new(vec![Value::Number(1.0)])));
        let alias = v.clone();
        if let Value::Vector(cell) = &alias {
            cell.lock().unwrap().push(Value::Number(2.0));
        }
        if let Value::Vector(cell) = &v {
            assert_eq!(cell.lock().unwrap().len(), 2);
        }
    }

    #[test]
    fn equal_recurses_structurally() {
        let a = Value::from_vec(vec![Value::string("x"), Value::Number(1.0)]);
        let b = Value::from_vec(vec![Value::string("x"), Value::Number(1.0)]);
        assert!(a.equal(&b));
        assert!(!a.eq(&b));
    }
}
