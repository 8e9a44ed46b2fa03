//! Strictness: evaluation stops at the first failing line and the error
//! names the line and offending token.

use conf::{ConfError, ErrorKind, Parser};

fn line_error(source: &str) -> (usize, conf::LineError) {
    let mut parser = Parser::new();
    match parser.parse_source(source).unwrap_err() {
        ConfError::Line { line, error, .. } => (line, error),
        ConfError::Io(err) => panic!("unexpected io error: {err}"),
    }
}

#[test]
fn unresolved_first_token_is_fatal() {
    let (line, error) = line_error("zig = 4");
    assert_eq!(line, 1);
    assert_eq!(error.kind, ErrorKind::UnresolvedSymbol);
    assert_eq!(error.token, "zig");
}

/// Line numbers count every physical line, including blank ones.
#[test]
fn errors_report_the_failing_line() {
    let (line, error) = line_error("int a = 1\n\nbad = 2");
    assert_eq!(line, 3);
    assert_eq!(error.token, "bad");
}

#[test]
fn closing_an_unopened_scope_underflows() {
    let (line, error) = line_error("int a = 1\n}");
    assert_eq!(line, 2);
    assert_eq!(error.kind, ErrorKind::ScopeUnderflow);
}

/// Assigning a string literal into an int is a type mismatch under the
/// strict overload checking.
#[test]
fn intrinsic_operator_type_mismatch() {
    let (_, error) = line_error("int x = \"hi\"");
    assert_eq!(error.kind, ErrorKind::TypeMismatch);
}

#[test]
fn member_access_to_unknown_member() {
    let (line, error) = line_error("class Point {\n  int x\n}\nPoint p\np.z = 1");
    assert_eq!(line, 5);
    assert_eq!(error.kind, ErrorKind::UnknownMember);
    assert_eq!(error.token, "z");
}

#[test]
fn declaration_needs_a_name() {
    let (_, error) = line_error("int");
    assert_eq!(error.kind, ErrorKind::MissingName);
}

#[test]
fn class_needs_a_name() {
    let (_, error) = line_error("class");
    assert_eq!(error.kind, ErrorKind::MissingName);
}

#[test]
fn unbalanced_parentheses_are_rejected() {
    let (_, error) = line_error("int a = (1");
    assert_eq!(error.kind, ErrorKind::UnbalancedParens);

    let (_, error) = line_error("int a = 1)");
    assert_eq!(error.kind, ErrorKind::UnbalancedParens);
}

/// A multi-element expression with nothing left to apply reports the
/// missing operator instead of looping.
#[test]
fn leftover_elements_without_an_operator() {
    // `#` only comments from column one; mid-line it is an unresolvable
    // token with no operator overload.
    let (_, error) = line_error("int a = 1 # trailing");
    assert_eq!(error.kind, ErrorKind::MissingOperator);
}

#[test]
fn empty_parenthesized_group_is_an_error() {
    let (_, error) = line_error("int a = ()");
    assert_eq!(error.kind, ErrorKind::EmptyExpression);
}

/// Errors render with file context when parsing from a file.
#[test]
fn display_includes_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.conf");
    std::fs::write(&path, "int ok = 1\nboom = 2\n").unwrap();

    let mut parser = Parser::new();
    let err = parser.parse_file(&path).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("broken.conf"), "missing file in: {rendered}");
    assert!(rendered.contains(":2:"), "missing line in: {rendered}");
    assert!(rendered.contains("boom"), "missing token in: {rendered}");
}
