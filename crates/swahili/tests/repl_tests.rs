//! Behavioral tests for `ReplSession`, the persistent session type that
//! keeps interpreter state (globals, functions, closures) across multiple
//! `execute()` calls.

use pretty_assertions::assert_eq;
use swahili::{ErrorKind, ExceptionKind, NoConsole, Object, ReplSession};

// =============================================================================
// 1. Session creation
// =============================================================================

/// A fresh session carries the script name it was created with.
#[test]
fn create_session_with_script_name() {
    let session = ReplSession::new("<stdin>");
    assert_eq!(session.script_name(), "<stdin>");
}

/// A fresh session has no user variables; builtins are not listed.
#[test]
fn fresh_session_has_no_user_variables() {
    let session = ReplSession::new("<stdin>");
    let vars = session.list_variables();
    assert!(vars.is_empty(), "fresh session should list nothing, got: {vars:?}");
}

// =============================================================================
// 2. Basic execute
// =============================================================================

/// Assignments are expressions: executing one returns the bound value.
#[test]
fn execute_assignment_returns_the_value() {
    let mut session = ReplSession::new("<stdin>");
    let result = session.execute("x = 42", &mut NoConsole).unwrap();
    assert_eq!(result, Object::Number(42.0));
}

#[test]
fn execute_expression_returns_its_value() {
    let mut session = ReplSession::new("<stdin>");
    let result = session.execute("1 + 2", &mut NoConsole).unwrap();
    assert_eq!(result, Object::Number(3.0));
}

// =============================================================================
// 3. Persistence across lines
// =============================================================================

/// Variables defined in one execute() call persist to the next.
#[test]
fn variable_persists_across_lines() {
    let mut session = ReplSession::new("<stdin>");
    session.execute("a = 10", &mut NoConsole).unwrap();
    session.execute("b = 20", &mut NoConsole).unwrap();
    let result = session.execute("a + b", &mut NoConsole).unwrap();
    assert_eq!(result, Object::Number(30.0));
}

/// A function defined in one line can be called in a subsequent line.
#[test]
fn function_defined_then_called() {
    let mut session = ReplSession::new("<stdin>");
    session
        .execute("shughuli mara_mbili(n) { rudisha n * 2 }", &mut NoConsole)
        .unwrap();
    let result = session.execute("mara_mbili(21)", &mut NoConsole).unwrap();
    assert_eq!(result, Object::Number(42.0));
}

/// A closure made on one line keeps its captured scope alive on later lines.
#[test]
fn closure_survives_across_lines() {
    let mut session = ReplSession::new("<stdin>");
    session
        .execute("shughuli ongeza(n) { shughuli (x) { rudisha x + n } }", &mut NoConsole)
        .unwrap();
    session.execute("wa5 = ongeza(5)", &mut NoConsole).unwrap();
    let result = session.execute("wa5(3)", &mut NoConsole).unwrap();
    assert_eq!(result, Object::Number(8.0));
}

/// Listing shows user bindings sorted, without builtins or constants.
#[test]
fn list_variables_shows_user_bindings() {
    let mut session = ReplSession::new("<stdin>");
    session.execute("zeta = 1", &mut NoConsole).unwrap();
    session.execute("alpha = 2", &mut NoConsole).unwrap();
    assert_eq!(session.list_variables(), vec!["alpha".to_owned(), "zeta".to_owned()]);
}

// =============================================================================
// 4. Errors do not poison the session
// =============================================================================

/// A runtime error on one line leaves earlier bindings intact.
#[test]
fn runtime_error_keeps_state() {
    let mut session = ReplSession::new("<stdin>");
    session.execute("x = 6", &mut NoConsole).unwrap();
    let err = session.execute("1 / 0", &mut NoConsole).unwrap_err();
    assert_eq!(err.kind(), ExceptionKind::Runtime(ErrorKind::Overflow));
    let result = session.execute("x * 7", &mut NoConsole).unwrap();
    assert_eq!(result, Object::Number(42.0));
}

/// A syntax error is reported without evaluating anything.
#[test]
fn syntax_error_keeps_state() {
    let mut session = ReplSession::new("<stdin>");
    session.execute("x = 1", &mut NoConsole).unwrap();
    let err = session.execute("x = ", &mut NoConsole).unwrap_err();
    assert_eq!(err.kind(), ExceptionKind::Syntax);
    let result = session.execute("x", &mut NoConsole).unwrap();
    assert_eq!(result, Object::Number(1.0));
}

// =============================================================================
// 5. Builtins and constants
// =============================================================================

/// The sentinel constants are pre-bound globals, not keywords.
#[test]
fn sentinel_constants_are_bound() {
    let mut session = ReplSession::new("<stdin>");
    assert_eq!(session.execute("kweli", &mut NoConsole).unwrap(), Object::Bool(true));
    assert_eq!(session.execute("uwongo", &mut NoConsole).unwrap(), Object::Bool(false));
    assert_eq!(session.execute("tupu", &mut NoConsole).unwrap(), Object::Null);
}

/// Builtins are ordinary values in the root table.
#[test]
fn builtins_are_values() {
    let mut session = ReplSession::new("<stdin>");
    let result = session.execute("andika", &mut NoConsole).unwrap();
    assert_eq!(
        result,
        Object::Builtin {
            name: "andika".to_owned()
        }
    );
}

// =============================================================================
// 6. Forgetting bindings
// =============================================================================

#[test]
fn forget_removes_a_binding() {
    let mut session = ReplSession::new("<stdin>");
    session.execute("x = 5", &mut NoConsole).unwrap();
    assert!(session.forget("x"));
    assert!(session.list_variables().is_empty());
    let err = session.execute("x", &mut NoConsole).unwrap_err();
    assert_eq!(err.kind(), ExceptionKind::Runtime(ErrorKind::UnboundName));
}

/// Builtins and constants cannot be forgotten.
#[test]
fn forget_refuses_predefined_names() {
    let mut session = ReplSession::new("<stdin>");
    assert!(!session.forget("andika"));
    assert!(!session.forget("kweli"));
    assert!(!session.forget("haipo"));
}
