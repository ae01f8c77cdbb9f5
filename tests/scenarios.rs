//! Black-box end-to-end tests driving the compiled `minipl` binary, one
//! fixture program per scenario from the language's end-to-end behavior.

use assert_cmd::Command;

#[test]
fn readme_example_echoes_the_loop_with_the_given_stdin() {
    Command::cargo_bin("minipl")
        .unwrap()
        .arg("tests/fixtures/readme_example.mpl")
        .write_stdin("3\n")
        .assert()
        .success()
        .stdout("How many times? 0 : Hello, World!\n1 : Hello, World!\n2 : Hello, World!\n3 : Hello, World!\n");
}

#[test]
fn string_concat_and_equality_assert_silently() {
    Command::cargo_bin("minipl")
        .unwrap()
        .arg("tests/fixtures/string_concat.mpl")
        .assert()
        .success()
        .stdout("foobar");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    Command::cargo_bin("minipl")
        .unwrap()
        .arg("tests/fixtures/precedence.mpl")
        .assert()
        .success()
        .stdout("7");
}

#[test]
fn unterminated_string_reports_a_lexical_error_and_exits_nonzero() {
    Command::cargo_bin("minipl")
        .unwrap()
        .arg("tests/fixtures/unterminated_string.mpl")
        .assert()
        .failure()
        .stdout("")
        .stderr("LexicalError::Row 1::Column 7::unterminated string\n");
}

#[test]
fn redeclaration_in_the_same_scope_reports_a_semantic_error() {
    Command::cargo_bin("minipl")
        .unwrap()
        .arg("tests/fixtures/redeclaration.mpl")
        .assert()
        .failure()
        .stdout("")
        .stderr("SemanticError::Row 2::Column 1::Variable x already defined in this scope!\n");
}

#[test]
fn inner_for_loop_scope_does_not_leak_its_declarations() {
    // The iterator keeps its last assigned value after the loop (spec.md
    // §9 Open Question 2 resolved toward "end", not "end + 1" — see
    // DESIGN.md); the inner `j` does not survive past `end for`.
    Command::cargo_bin("minipl")
        .unwrap()
        .arg("tests/fixtures/nested_for_scope.mpl")
        .assert()
        .success()
        .stdout("011");
}

#[test]
fn missing_source_file_is_an_io_error_with_nonzero_exit() {
    let output = Command::cargo_bin("minipl")
        .unwrap()
        .arg("tests/fixtures/does_not_exist.mpl")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().starts_with("IOError::"));
}

#[test]
fn missing_argument_exits_nonzero_with_a_usage_message() {
    let output = Command::cargo_bin("minipl").unwrap().output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("Usage"));
}
