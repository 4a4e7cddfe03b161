// ABOUTME: End-to-end REPL-line scenarios exercising the full lex/read/eval pipeline

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
fn arithmetic_line() {
    assert_eq!(run("(+ 1 2 3)"), "6");
}

#[test]
fn lambda_definition_and_call() {
    assert_eq!(run("(define sq (lambda (x) (* x x))) (sq 7)"), "49");
}

#[test]
fn if_with_quoted_symbols() {
    assert_eq!(run("(if (> 3 2) 'yes 'no)"), "yes");
}

#[test]
fn variadic_lambda_collects_trailing_args() {
    assert_eq!(run("((lambda (x . rest) (cons x rest)) 1 2 3)"), "(1 2 3)");
}

#[test]
fn user_defined_when_macro_with_ellipsis_body() {
    assert_eq!(
        run(
            "(define-syntax when (syntax-rules () ((_ t e ...) (if t (begin e ...) #f)))) \
             (when #t 1 2 3)"
        ),
        "3"
    );
}

#[test]
fn go_and_receive_rendezvous() {
    assert_eq!(run("(let ((c (go (+ 1 2)))) (-> c))"), "3");
}

#[test]
fn vector_set_then_display_shows_sharp_paren_form() {
    assert_eq!(
        run("(define v (make-vector 3 0)) (vector-set! v 1 9) v"),
        "#(0 9 0)"
    );
}

#[test]
fn eq_on_quoted_lists_is_element_wise() {
    assert_eq!(run("(eq? '(a b) '(a b))"), "#t");
}

#[test]
fn car_of_empty_list_errors() {
    let env = Environment::new();
    register_builtins(&env);
    load_stdlib(&env);
    let form = read_all("(car '())").unwrap().remove(0);
    let err = eval(&form, &env).unwrap_err();
    assert_eq!(err.to_string(), "car: List has length 0");
}

#[test]
fn y_combinator_style_recursive_factorial() {
    assert_eq!(
        run(
            "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) \
             (fact 5)"
        ),
        "120"
    );
}

#[test]
fn map_applies_across_parallel_lists() {
    assert_eq!(run("(map + '(1 2 3) '(10 20 30))"), "(11 22 33)");
}
