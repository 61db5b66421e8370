//! End-to-end evaluation tests through the public `Runner`/`eval` API.
//!
//! Programs run against a `CollectConsole` (or `NoConsole` when I/O is
//! irrelevant) and assertions check the final value, the captured output,
//! or the rendered exception.

use pretty_assertions::assert_eq;
use swahili::{
    CollectConsole, ErrorKind, Exception, ExceptionKind, Limits, NoConsole, Object, RecordingTracer, Runner,
    TraceEvent, eval,
};

fn run(source: &str) -> Object {
    eval(source, &mut NoConsole).unwrap_or_else(|err| panic!("program failed:\n{err}"))
}

fn run_collect(source: &str) -> (Object, String) {
    let mut console = CollectConsole::new();
    let value = eval(source, &mut console).unwrap_or_else(|err| panic!("program failed:\n{err}"));
    (value, console.into_output())
}

fn run_err(source: &str) -> Exception {
    eval(source, &mut NoConsole).expect_err("program should have failed")
}

fn error_kind(exception: &Exception) -> ErrorKind {
    match exception.kind() {
        ExceptionKind::Runtime(kind) => kind,
        ExceptionKind::Syntax => panic!("expected a runtime error, got a syntax error: {exception}"),
    }
}

// =============================================================================
// 1. Expressions and precedence
// =============================================================================

/// The evaluator reproduces parser precedence: `2 + 3 * 4` is 14.
#[test]
fn arithmetic_precedence() {
    assert_eq!(run("x = 2 + 3 * 4"), Object::Number(14.0));
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(run("(2 + 3) * 4"), Object::Number(20.0));
}

#[test]
fn power_and_unary_minus() {
    assert_eq!(run("2 ^ 10"), Object::Number(1024.0));
    assert_eq!(run("-3 + 5"), Object::Number(2.0));
}

#[test]
fn comparison_chain_yields_booleans() {
    assert_eq!(run("1 < 2"), Object::Bool(true));
    assert_eq!(run("2 <= 1"), Object::Bool(false));
    assert_eq!(run("\"a\" == \"a\""), Object::Bool(true));
    assert_eq!(run("\"a\" != \"b\""), Object::Bool(true));
}

/// Cross-variant equality is `false` (and `!=` is `true`), never an error.
#[test]
fn cross_variant_equality_is_false() {
    assert_eq!(run("1 == \"1\""), Object::Bool(false));
    assert_eq!(run("tupu != []"), Object::Bool(true));
}

/// Logical operators evaluate BOTH operands; there is no short-circuiting.
/// The right-hand `andika` runs even though the left side already decides.
#[test]
fn logical_operators_do_not_short_circuit() {
    let (value, output) = run_collect("uwongo && andika(\"ilikimbia\")");
    assert_eq!(value, Object::Bool(false));
    assert_eq!(output, "ilikimbia\n");

    let (value, output) = run_collect("kweli || andika(\"pia\")");
    assert_eq!(value, Object::Bool(true));
    assert_eq!(output, "pia\n");
}

#[test]
fn double_negation_is_truthiness() {
    assert_eq!(run("!!5"), Object::Bool(true));
    assert_eq!(run("!!\"\""), Object::Bool(false));
    assert_eq!(run("!![]"), Object::Bool(false));
}

// =============================================================================
// 2. Variables and scope
// =============================================================================

#[test]
fn assignment_returns_and_binds() {
    assert_eq!(run("x = 7; x + 1"), Object::Number(8.0));
}

/// Access returns what the *last* assignment bound.
#[test]
fn last_assignment_wins() {
    assert_eq!(run("x = 1\nx = 2\nx"), Object::Number(2.0));
}

#[test]
fn unbound_name_errors() {
    let err = run_err("haipo + 1");
    assert_eq!(error_kind(&err), ErrorKind::UnboundName);
    assert_eq!(err.message(), "'haipo' is not defined");
}

/// Bindings made inside a function stay local: the call's symbol table is a
/// child of the defining scope and `set` never walks up.
#[test]
fn function_locals_do_not_leak() {
    let err = run_err("shughuli weka() { y = 5 }\nweka()\ny");
    assert_eq!(error_kind(&err), ErrorKind::UnboundName);
}

#[test]
fn parameter_shadows_global() {
    let program = "x = 1\nshughuli f(x) { rudisha x * 10 }\nf(3) + x";
    assert_eq!(run(program), Object::Number(31.0));
}

// =============================================================================
// 3. Functions, calls, closures
// =============================================================================

/// A two-parameter function called with two arguments.
#[test]
fn function_call_returns_product() {
    assert_eq!(run("shughuli mara(a, b) { rudisha a * b }; mara(6, 7)"), Object::Number(42.0));
}

/// Closure capture: the inner function sees `n` through the
/// defining scope of its `shughuli`, not through the caller.
#[test]
fn closures_capture_the_defining_scope() {
    let program = "shughuli ongeza(n) { shughuli jumla(x) { rudisha x + n } }\nongeza(10)(5)";
    assert_eq!(run(program), Object::Number(15.0));
}

/// A function body without `rudisha` evaluates to its last statement.
#[test]
fn implicit_last_statement_value() {
    assert_eq!(run("shughuli f() { 1 + 1 }\nf()"), Object::Number(2.0));
}

#[test]
fn bare_rudisha_returns_null() {
    assert_eq!(run("shughuli f() { rudisha }\nf()"), Object::Null);
}

#[test]
fn anonymous_functions_are_values() {
    assert_eq!(run("f = shughuli (x) { rudisha x + 1 }\nf(41)"), Object::Number(42.0));
}

#[test]
fn arity_mismatch_messages_name_the_function() {
    let err = run_err("shughuli f(a) { a }\nf(1, 2, 3)");
    assert_eq!(error_kind(&err), ErrorKind::ArityMismatch);
    assert_eq!(err.message(), "2 too many args passed into 'f'");

    let err = run_err("shughuli f(a, b) { a }\nf(1)");
    assert_eq!(error_kind(&err), ErrorKind::ArityMismatch);
    assert_eq!(err.message(), "1 too few args passed into 'f'");
}

/// Calling something that is not a function is an illegal operation.
#[test]
fn calling_a_non_function_fails() {
    let err = run_err("x = 4\nx(2)");
    assert_eq!(error_kind(&err), ErrorKind::IllegalOperation);
}

/// `__hoja` exposes the full argument list inside the callee.
#[test]
fn hoja_binds_the_argument_list() {
    assert_eq!(run("shughuli f(a, b) { idadi(__hoja) }\nf(1, 2)"), Object::Number(2.0));
    assert_eq!(run("shughuli f(a) { __hoja / 0 }\nf(9)"), Object::Number(9.0));
}

/// Runaway recursion hits the call depth bound, not the host stack.
#[test]
fn recursion_depth_is_bounded() {
    let runner = Runner::new("shughuli f() { f() }\nf()", "deep.sw").unwrap();
    let limits = Limits::default().with_max_call_depth(100);
    let err = runner.run(limits, &mut NoConsole).unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::CallStackExceeded);
    assert_eq!(err.message(), "Max call stack size exceeded");
}

#[test]
fn recursive_functions_work_within_the_bound() {
    let program = "shughuli fact(n) { kama n < 2 { rudisha 1 }\nrudisha n * fact(n - 1) }\nfact(10)";
    assert_eq!(run(program), Object::Number(3_628_800.0));
}

// =============================================================================
// 4. Control flow
// =============================================================================

#[test]
fn if_elif_else_picks_the_first_true_case() {
    let program = "x = 5\nkama x < 3 { \"ndogo\" } au x < 10 { \"kati\" } sivyo { \"kubwa\" }";
    assert_eq!(run(program), Object::Str("kati".to_owned()));
}

/// No case matches and there is no else: the whole `kama` is `tupu`.
#[test]
fn if_without_match_is_null() {
    assert_eq!(run("kama uwongo { 1 }"), Object::Null);
}

/// The loop prints 1, 2, 3 and collects three values.
#[test]
fn for_loop_prints_and_collects() {
    let (value, output) = run_collect("kwa i = 1 mpaka 4 { andika(i) }");
    assert_eq!(output, "1\n2\n3\n");
    match value {
        Object::List(elements) => assert_eq!(elements.len(), 3),
        other => panic!("expected a list, got {other:?}"),
    }
}

/// The loop result collects each iteration's body value.
#[test]
fn for_loop_collects_body_values() {
    assert_eq!(
        run("kwa i = 0 mpaka 3 { i * 2 }"),
        Object::List(vec![Object::Number(0.0), Object::Number(2.0), Object::Number(4.0)])
    );
}

#[test]
fn for_loop_with_negative_step_counts_down() {
    assert_eq!(run("idadi(kwa i = 5 mpaka 0 hatua -1 { i })"), Object::Number(5.0));
}

#[test]
fn while_loop_collects_values() {
    let program = "x = 0\nwakati x < 3 { x = x + 1 }";
    assert_eq!(
        run(program),
        Object::List(vec![Object::Number(1.0), Object::Number(2.0), Object::Number(3.0)])
    );
}

/// `vunja` ends the loop keeping what was collected so far.
#[test]
fn vunja_stops_the_loop() {
    let program = "z = kwa i = 0 mpaka 10 { kama i == 3 { vunja }; i }\nidadi(z)";
    assert_eq!(run(program), Object::Number(3.0));
}

/// `endelea` skips appending the iteration's value.
#[test]
fn endelea_skips_the_iteration_value() {
    let program = "z = kwa i = 0 mpaka 5 { kama i == 2 { endelea }; i }\nidadi(z)";
    assert_eq!(run(program), Object::Number(4.0));
}

/// `rudisha` unwinds through loops to the nearest call frame.
#[test]
fn rudisha_unwinds_out_of_a_loop() {
    let program = "shughuli tafuta() { kwa i = 0 mpaka 100 { kama i == 7 { rudisha i } } }\ntafuta()";
    assert_eq!(run(program), Object::Number(7.0));
}

#[test]
fn rudisha_outside_a_function_is_an_error() {
    let err = run_err("rudisha 5");
    assert_eq!(error_kind(&err), ErrorKind::IllegalOperation);
    assert_eq!(err.message(), "'rudisha' outside a function");
}

#[test]
fn vunja_outside_a_loop_is_an_error() {
    let err = run_err("shughuli f() { vunja }\nf()");
    assert_eq!(error_kind(&err), ErrorKind::IllegalOperation);
    assert_eq!(err.message(), "'vunja' outside a loop");
}

// =============================================================================
// 5. Loop and recursion bounds
// =============================================================================

/// An unconditional `wakati` trips the default bound.
#[test]
fn while_true_hits_the_iteration_bound() {
    let err = run_err("wakati kweli { 1 }");
    assert_eq!(error_kind(&err), ErrorKind::CallStackExceeded);
    assert_eq!(err.message(), "Max call stack size exceeded");
}

/// The bound is per loop *activation*: a loop re-entered by each call gets
/// a fresh counter, so 3 × 4 iterations pass under a bound of 5.
#[test]
fn loop_bound_is_per_activation() {
    let program = "shughuli mara() { kwa i = 0 mpaka 4 { i } }\nkwa j = 0 mpaka 3 { mara() }\n1";
    let runner = Runner::new(program, "bound.sw").unwrap();
    let limits = Limits::default().with_max_loop_iterations(5);
    assert_eq!(runner.run(limits, &mut NoConsole).unwrap(), Object::Number(1.0));

    let runner = Runner::new("kwa i = 0 mpaka 6 { i }", "bound.sw").unwrap();
    let err = runner.run(limits, &mut NoConsole).unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::CallStackExceeded);
}

// =============================================================================
// 6. Value algebra end to end
// =============================================================================

#[test]
fn division_by_zero_is_overflow() {
    let err = run_err("x = 1 / 0");
    assert_eq!(error_kind(&err), ErrorKind::Overflow);
    assert_eq!(err.message(), "Division by zero");
}

/// Invariant: `(a + b) - b == a` for numbers, modulo IEEE-754 rounding
/// (the operands here are exactly representable).
#[test]
fn add_then_subtract_round_trips() {
    assert_eq!(run("(2.5 + 4.25) - 4.25 == 2.5"), Object::Bool(true));
}

/// Invariant: concatenation adds lengths.
#[test]
fn concat_length_is_additive() {
    assert_eq!(run("idadi(\"he\" + \"llo\") == idadi(\"he\") + idadi(\"llo\")"), Object::Bool(true));
}

/// Invariant: `+` on a list appends exactly one element.
#[test]
fn list_append_grows_by_one() {
    assert_eq!(run("idadi([1, 2] + 99) == idadi([1, 2]) + 1"), Object::Bool(true));
}

#[test]
fn list_element_access_and_removal() {
    assert_eq!(run("[10, 20, 30] / 1"), Object::Number(20.0));
    assert_eq!(run("idadi([10, 20, 30] - 0)"), Object::Number(2.0));
    let err = run_err("[1] / 5");
    assert_eq!(error_kind(&err), ErrorKind::IllegalOperation);
}

#[test]
fn list_concatenation_with_mul() {
    assert_eq!(
        run("[1] * [2, 3]"),
        Object::List(vec![Object::Number(1.0), Object::Number(2.0), Object::Number(3.0)])
    );
}

#[test]
fn string_repetition() {
    assert_eq!(run("\"la\" * 3"), Object::Str("lalala".to_owned()));
    let err = run_err("\"la\" * 1.5");
    assert_eq!(error_kind(&err), ErrorKind::IllegalOperation);
}

#[test]
fn adding_mismatched_variants_is_illegal() {
    let err = run_err("1 + \"moja\"");
    assert_eq!(error_kind(&err), ErrorKind::IllegalOperation);
    assert_eq!(err.message(), "Illegal operation");
}

// =============================================================================
// 7. Tracebacks and rendering
// =============================================================================

/// An error inside a call renders a traceback naming both the program frame
/// and the function, innermost last.
#[test]
fn traceback_walks_the_call_chain() {
    let err = run_err("shughuli gawanya(a) { rudisha a / 0 }\ngawanya(4)");
    let names: Vec<&str> = err.frames().iter().map(|f| f.display_name.as_str()).collect();
    assert_eq!(names, vec!["<programu>", "gawanya"]);
    let rendered = err.to_string();
    assert!(rendered.starts_with("Traceback (most recent call last):"), "{rendered}");
    assert!(rendered.ends_with("Overflow: Division by zero"), "{rendered}");
}

#[test]
fn syntax_errors_carry_position() {
    let err = Runner::new("(1 + ", "broken.sw").unwrap_err();
    assert_eq!(err.kind(), ExceptionKind::Syntax);
    assert_eq!(err.line(), 1);
    assert!(err.to_string().contains("broken.sw"));
}

/// Anonymous functions show up as `<isiyotambuliwa>` in tracebacks.
#[test]
fn anonymous_functions_in_tracebacks() {
    let err = run_err("f = shughuli (x) { x / 0 }\nf(1)");
    let names: Vec<&str> = err.frames().iter().map(|f| f.display_name.as_str()).collect();
    assert_eq!(names, vec!["<programu>", "<isiyotambuliwa>"]);
}

// =============================================================================
// 8. Tracing
// =============================================================================

#[test]
fn tracer_sees_calls_and_loops() {
    let runner = Runner::new("shughuli f() { 1 }\nkwa i = 0 mpaka 2 { f() }", "traced.sw").unwrap();
    let mut tracer = RecordingTracer::new();
    runner
        .run_traced(Limits::default(), &mut NoConsole, &mut tracer)
        .unwrap();
    let events = tracer.events();
    assert!(events.contains(&TraceEvent::LoopIteration { iteration: 0 }));
    assert!(events.contains(&TraceEvent::CallEnter {
        name: "f".to_owned(),
        depth: 0
    }));
    assert!(events.contains(&TraceEvent::CallExit { name: "f".to_owned() }));
}
