// ABOUTME: syntax-rules pattern matching and ellipsis expansion scenarios

use goscheme_rs::builtins::register_builtins;
use goscheme_rs::env::Environment;
use goscheme_rs::eval::eval;
use goscheme_rs::reader::read_all;
use goscheme_rs::stdlib::load_stdlib;

fn run(src: &str) -> String {
    let env = Environment::new();
    register_builtins(&env);
    load_stdlib(&env);
    let mut result = String::new();
    for form in read_all(src).unwrap() {
        result = eval(&form, &env).unwrap().to_string();
    }
    result
}

#[test]
fn ellipsis_pattern_maps_to_list_builtin() {
    assert_eq!(
        run(
            "(define-syntax collect (syntax-rules () ((_ x ...) (list x ...)))) \
             (collect 1 2 3)"
        ),
        "(1 2 3)"
    );
}

#[test]
fn literal_keyword_gates_which_rule_matches() {
    assert_eq!(
        run(
            "(define-syntax my-cond \
               (syntax-rules (else) \
                 ((_ (else e)) e) \
                 ((_ (c e) rest ...) (if c e (my-cond rest ...))))) \
             (my-cond (#f 1) (else 2))"
        ),
        "2"
    );
}

#[test]
fn stdlib_and_macro_short_circuits_without_evaluating_rest() {
    assert_eq!(run("(and #f (car '()))"), "#f");
}

#[test]
fn stdlib_or_macro_returns_first_truthy() {
    assert_eq!(run("(or #f 0 'found)"), "0");
}

#[test]
fn quote_prevents_evaluation_of_macro_like_forms() {
    assert_eq!(run("(quote (+ 1 2))"), "(+ 1 2)");
}

#[test]
fn nested_let_bindings_via_macro() {
    assert_eq!(run("(let ((x 1) (y 2)) (+ x y))"), "3");
}
