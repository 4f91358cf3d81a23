//! Integration tests for ginkgo-convert
//!
//! Runs whole packages through the converter on temporary directories:
//! - Output text of converted files
//! - Suite file provisioning
//! - Destructive and non-destructive writing
//! - Error handling
//! - The command line binary and its exit codes

use ginkgo_convert::ast::visit::{Visit, walk_expr};
use ginkgo_convert::ast::{Expr, Spanned};
use ginkgo_convert::lexer::tokenize;
use ginkgo_convert::parser::parse;
use ginkgo_convert::scaffold::SuiteTemplate;
use ginkgo_convert::{ConvertConfig, ConvertError, RunSummary, convert_package};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const XUNIT_TEST: &str = r#"package fixtures

import (
	"testing"
)

type UselessStruct struct {
	ImportantField string
	T              *testing.T
}

func TestSomethingImportant(t *testing.T) {
	whatever := &UselessStruct{
		T:            t,
		ImportantField: "twisty maze of passages",
	}
	app := "string value"
	something := &UselessStruct{ImportantField: app}

	t.Fail(whatever.ImportantField != "SECRET_PASSWORD")
	assert.Equal(t, whatever.ImportantField, "SECRET_PASSWORD")
	var foo = func(t *testing.T) {}
	foo()
}
"#;

const XUNIT_CONVERTED: &str = r#"package fixtures

import (
	. "github.com/onsi/ginkgo"
	mr "github.com/tjarratt/mr_t"
)

type UselessStruct struct {
	ImportantField string
	T              mr.TestingT
}

func init() {
	Describe("Testing with ginkgo", func() {
		It("TestSomethingImportant", func() {
			whatever := &UselessStruct{
				T:              mr.T(),
				ImportantField: "twisty maze of passages",
			}
			app := "string value"
			something := &UselessStruct{ImportantField: app}

			mr.T().Fail(whatever.ImportantField != "SECRET_PASSWORD")
			assert.Equal(mr.T(), whatever.ImportantField, "SECRET_PASSWORD")
			var foo = func(t mr.TestingT) {}
			foo()
		})
	})
}
"#;

/// Helper to lay out a package tree: `(relative path, contents)`
fn package_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, text) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, text).expect("write fixture");
    }
    dir
}

/// Helper to run a conversion with the in-process suite template
fn run(dir: &Path, config: &ConvertConfig) -> ginkgo_convert::Result<RunSummary> {
    convert_package(&dir.to_string_lossy(), config, &SuiteTemplate)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read output")
}

// ============================================
// Conversion Output
// ============================================

#[test]
fn test_converts_fixture_package() {
    let dir = package_with(&[("xunit_test.go", XUNIT_TEST)]);
    let summary = run(dir.path(), &ConvertConfig::new()).expect("convert");

    let output = dir.path().join("xunit_ginkgo_test.go");
    assert_eq!(summary.converted, vec![output.clone()]);
    assert_eq!(summary.tests, 1);
    assert_eq!(read(&output), XUNIT_CONVERTED);
    // Non-destructive runs never touch the input
    assert_eq!(read(&dir.path().join("xunit_test.go")), XUNIT_TEST);
}

#[test]
fn test_converted_output_parses_and_has_no_free_context_parameter() {
    let dir = package_with(&[(
        "free_test.go",
        "package free\n\nimport \"testing\"\n\nfunc TestA(t *testing.T) {\n\tt.Log(\"a\")\n\tcheck(t, map[string]interface{}{\"t\": t})\n\tgo func() {\n\t\tdefer t.Cleanup(nil)\n\t}()\n\tfor i := 0; i < 3; i++ {\n\t\tt.Logf(\"%d\", i)\n\t}\n}\n\nfunc TestB(t *testing.T) {\n\tswitch {\n\tcase t.Failed():\n\t\tt.FailNow()\n\t}\n}\n",
    )]);
    run(dir.path(), &ConvertConfig::new().create_suite(false)).expect("convert");

    let output = read(&dir.path().join("free_ginkgo_test.go"));
    let file = parse(&output, tokenize(&output).expect("tokenize")).expect("reparse");

    struct FreeUses(usize);
    impl Visit for FreeUses {
        fn visit_expr(&mut self, expr: &Spanned<Expr>) {
            if matches!(&expr.node, Expr::Ident(name) if name == "t") {
                self.0 += 1;
            }
            walk_expr(self, expr);
        }
    }
    let mut uses = FreeUses(0);
    uses.visit_file(&file);
    assert_eq!(uses.0, 0);
    assert_eq!(output.matches("It(\"").count(), 2);
    assert_eq!(output.matches("Describe(").count(), 1);
}

#[test]
fn test_shadowed_parameter_is_left_alone() {
    let dir = package_with(&[(
        "shadow_test.go",
        "package shadow\n\nimport \"testing\"\n\nfunc TestShadow(t *testing.T) {\n\tfor _, t := range cases {\n\t\trun(t)\n\t}\n\tt.Log(\"done\")\n}\n",
    )]);
    run(dir.path(), &ConvertConfig::new().create_suite(false)).expect("convert");

    let output = read(&dir.path().join("shadow_ginkgo_test.go"));
    assert!(output.contains("\t\t\tfor _, t := range cases {\n\t\t\t\trun(t)\n\t\t\t}\n"));
    assert!(output.contains("\t\t\tmr.T().Log(\"done\")\n"));
}

#[test]
fn test_helpers_and_external_test_packages() {
    let dir = package_with(&[
        ("tmp.go", "package tmp\n"),
        (
            "extra_functions_test.go",
            "package tmp\n\nimport \"testing\"\n\nfunc somethingImportant(t *testing.T, message *string) {\n\tt.Log(\"Something important happened in a test: \" + *message)\n}\n\nfunc TestSomethingLessImportant(t *testing.T) {\n\tsomethingImportant(t, &msg)\n}\n",
        ),
        (
            "outside_package_test.go",
            "package tmp_test\n\nimport (\n\t\"testing\"\n)\n\nfunc TestSomethingImportant(t *testing.T) {\n\tt.Fail()\n}\n",
        ),
    ]);
    let summary = run(dir.path(), &ConvertConfig::new()).expect("convert");
    assert_eq!(summary.converted.len(), 2);
    assert_eq!(summary.tests, 2);

    let extra = read(&dir.path().join("extra_functions_ginkgo_test.go"));
    assert!(extra.contains(
        "func somethingImportant(t mr.TestingT, message *string) {\n\tt.Log(\"Something important happened in a test: \" + *message)\n}\n"
    ));
    assert!(extra.contains("\t\t\tsomethingImportant(mr.T(), &msg)\n"));

    let outside = read(&dir.path().join("outside_package_ginkgo_test.go"));
    assert!(outside.starts_with("package tmp_test\n"));
    assert!(dir.path().join("tmp_suite_test.go").is_file());
}

#[test]
fn test_files_without_tests_get_empty_container() {
    let dir = package_with(&[(
        "helpers_test.go",
        "package helpers\n\nimport \"testing\"\n\nfunc newFixture(t *testing.T) *fixture {\n\treturn &fixture{t: t}\n}\n",
    )]);
    let summary = run(dir.path(), &ConvertConfig::new().create_suite(false)).expect("convert");
    let output = dir.path().join("helpers_ginkgo_test.go");
    assert_eq!(summary.converted, vec![output.clone()]);
    assert_eq!(summary.tests, 0);
    assert_eq!(
        read(&output),
        "package helpers\n\nimport (\n\t. \"github.com/onsi/ginkgo\"\n\tmr \"github.com/tjarratt/mr_t\"\n)\n\nfunc newFixture(t mr.TestingT) *fixture {\n\treturn &fixture{t: t}\n}\n\nfunc init() {\n\tDescribe(\"Testing with ginkgo\", func() {})\n}\n"
    );
}

#[test]
fn test_block_comments_survive_conversion() {
    let dir = package_with(&[(
        "header_test.go",
        "/* Copyright 2014 */\n\npackage header\n\nimport \"testing\"\n\nfunc TestA(t *testing.T) {\n\tt.Fail() /* why */\n}\n",
    )]);
    let summary = run(dir.path(), &ConvertConfig::new().create_suite(false)).expect("convert");
    assert_eq!(summary.tests, 1);

    let output = read(&dir.path().join("header_ginkgo_test.go"));
    assert!(output.starts_with("/* Copyright 2014 */\n\npackage header\n"));
    assert!(output.contains("\t\t\tmr.T().Fail() /* why */\n"));
}

#[test]
fn test_generic_helpers_pass_through() {
    let dir = package_with(&[(
        "generic_test.go",
        "package generic\n\nimport \"testing\"\n\ntype Set[T comparable] map[T]struct{}\n\nfunc Keys[K comparable, V any](m map[K]V) []K {\n\treturn nil\n}\n\nfunc TestKeys(t *testing.T) {\n\ts := Set[string]{}\n\tif len(Keys[string, struct{}](s)) != 0 {\n\t\tt.Fail()\n\t}\n}\n",
    )]);
    run(dir.path(), &ConvertConfig::new().create_suite(false)).expect("convert");

    let output = read(&dir.path().join("generic_ginkgo_test.go"));
    assert!(output.contains("type Set[T comparable] map[T]struct{}\n"));
    assert!(output.contains("func Keys[K comparable, V any](m map[K]V) []K {\n"));
    assert!(output.contains("\t\t\ts := Set[string]{}\n\t\t\tif len(Keys[string, struct{}](s)) != 0 {\n\t\t\t\tmr.T().Fail()\n"));
}

// ============================================
// Package Walking and Suite Files
// ============================================

#[test]
fn test_nested_packages_are_converted_and_scaffolded() {
    let dir = package_with(&[
        ("xunit_test.go", XUNIT_TEST),
        (
            "nested/nested_test.go",
            "package nested\n\nimport \"testing\"\n\nfunc TestSomethingLessImportant(t *testing.T) {\n\tt.Fail()\n}\n",
        ),
    ]);
    let summary = run(dir.path(), &ConvertConfig::new()).expect("convert");
    assert_eq!(
        summary.converted,
        vec![
            dir.path().join("xunit_ginkgo_test.go"),
            dir.path().join("nested/nested_ginkgo_test.go"),
        ]
    );
    assert!(dir.path().join("fixtures_suite_test.go").is_file());
    assert!(dir.path().join("nested/nested_suite_test.go").is_file());
}

#[test]
fn test_second_run_keeps_suite_file() {
    let dir = package_with(&[("xunit_test.go", XUNIT_TEST)]);
    let suite = dir.path().join("fixtures_suite_test.go");

    run(dir.path(), &ConvertConfig::new()).expect("first run");
    let first = read(&suite);
    fs::write(&suite, format!("{first}// edited by hand\n")).expect("edit suite");

    run(dir.path(), &ConvertConfig::new()).expect("second run");
    assert!(read(&suite).ends_with("// edited by hand\n"));
    assert_eq!(read(&dir.path().join("xunit_ginkgo_test.go")), XUNIT_CONVERTED);
}

#[test]
fn test_create_suite_disabled() {
    let dir = package_with(&[("xunit_test.go", XUNIT_TEST)]);
    run(dir.path(), &ConvertConfig::new().create_suite(false)).expect("convert");
    assert!(!dir.path().join("fixtures_suite_test.go").exists());
}

// ============================================
// Destructive Mode
// ============================================

#[test]
fn test_destructive_overwrites_input() {
    let dir = package_with(&[("xunit_test.go", XUNIT_TEST)]);
    let config = ConvertConfig::new().destructive(true).create_suite(false);
    let summary = run(dir.path(), &config).expect("convert");

    let input = dir.path().join("xunit_test.go");
    assert_eq!(summary.converted, vec![input.clone()]);
    assert_eq!(read(&input), XUNIT_CONVERTED);
    assert!(!dir.path().join("xunit_ginkgo_test.go").exists());
}

#[cfg(unix)]
#[test]
fn test_destructive_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    for mode in [0o600, 0o640, 0o755] {
        let dir = package_with(&[("xunit_test.go", XUNIT_TEST)]);
        let input = dir.path().join("xunit_test.go");
        fs::set_permissions(&input, fs::Permissions::from_mode(mode)).expect("chmod");

        let config = ConvertConfig::new().destructive(true).create_suite(false);
        run(dir.path(), &config).expect("convert");

        let after = fs::metadata(&input).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(after, mode);
    }
}

// ============================================
// Error Handling
// ============================================

#[test]
fn test_unknown_package_is_resolution_error() {
    let err = convert_package(
        "no/such/package/for/ginkgo-convert",
        &ConvertConfig::new(),
        &SuiteTemplate,
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::Resolve { .. }));
}

#[test]
fn test_parse_error_aborts_with_file_path() {
    let dir = package_with(&[
        ("a_test.go", "package broken\n\nimport \"testing\"\n\nfunc TestA(t *testing.T) {\n\tt.Log(\n}\n"),
        ("b_test.go", XUNIT_TEST),
    ]);
    let err = run(dir.path(), &ConvertConfig::new().create_suite(false)).unwrap_err();
    match &err {
        ConvertError::InFile { path, .. } => assert_eq!(path, &dir.path().join("a_test.go")),
        other => panic!("expected a file error, got {other:?}"),
    }
    assert!(err.span().is_some());
    assert!(!dir.path().join("b_ginkgo_test.go").exists());
}

#[test]
fn test_missing_import_section_names_file() {
    let dir = package_with(&[(
        "bare_test.go",
        "package bare\n\nfunc TestA(t *testing.T) {\n\tt.Fail()\n}\n",
    )]);
    let err = run(dir.path(), &ConvertConfig::new().create_suite(false)).unwrap_err();
    match &err {
        ConvertError::InFile { path, source } => {
            assert_eq!(path, &dir.path().join("bare_test.go"));
            assert!(matches!(source.as_ref(), ConvertError::MissingImports));
        }
        other => panic!("expected a file error, got {other:?}"),
    }
    assert!(!dir.path().join("bare_ginkgo_test.go").exists());
}

// ============================================
// Command Line
// ============================================

fn ginkgo_convert(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ginkgo-convert"))
        .args(args)
        .output()
        .expect("run ginkgo-convert")
}

#[test]
fn test_cli_usage_errors_exit_with_one() {
    let missing = ginkgo_convert(&[]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(!missing.stderr.is_empty());

    let extra = ginkgo_convert(&["one", "two"]);
    assert_eq!(extra.status.code(), Some(1));
}

#[test]
fn test_cli_help_exits_with_zero() {
    let help = ginkgo_convert(&["--help"]);
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("--create-suite"));
}

#[test]
fn test_cli_bare_create_suite_flag() {
    let dir = package_with(&[("xunit_test.go", XUNIT_TEST)]);
    let package = dir.path().to_string_lossy().into_owned();

    let run = ginkgo_convert(&["--create-suite", "--scaffold", "template", &package]);
    assert_eq!(run.status.code(), Some(0));
    assert!(dir.path().join("fixtures_suite_test.go").is_file());
    assert_eq!(read(&dir.path().join("xunit_ginkgo_test.go")), XUNIT_CONVERTED);
}

#[test]
fn test_cli_create_suite_false() {
    let dir = package_with(&[("xunit_test.go", XUNIT_TEST)]);
    let package = dir.path().to_string_lossy().into_owned();

    let run = ginkgo_convert(&["--create-suite=false", &package]);
    assert_eq!(run.status.code(), Some(0));
    assert!(!dir.path().join("fixtures_suite_test.go").exists());
}

#[test]
fn test_cli_conversion_error_exits_with_one() {
    let dir = package_with(&[("bare_test.go", "package bare\n\nfunc TestA(t *testing.T) {}\n")]);
    let package = dir.path().to_string_lossy().into_owned();

    let run = ginkgo_convert(&["--create-suite=false", &package]);
    assert_eq!(run.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&run.stderr);
    assert!(stderr.contains("bare_test.go"));
    assert!(stderr.contains("file has no import declarations"));
}
