//! xUnit to Ginkgo conversion of single files
//!
//! [`rewrite_file`] works on a parsed tree: it finds the `TestXxx(t *testing.T)`
//! functions, moves their bodies into `It` leaves of one `Describe` inside a
//! new `func init()`, and fixes up types and imports. [`convert_file`] wraps
//! it with reading, printing and writing.

pub mod context;
pub mod imports;
pub mod matcher;
pub mod spec_block;

use crate::ast::{Decl, Item, SourceFile};
use crate::config::{ConvertConfig, Conventions};
use crate::error::{ConvertError, Result};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::printer::print_file;
use context::{references_package, rewrite_context, substitute_native_type};
use imports::{ensure_imports, remove_import};
use matcher::{NativeType, find_candidates};
use spec_block::SpecBlockBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where one input file was written and how many tests it held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub output: PathBuf,
    pub tests: usize,
}

/// Read and parse one Go file
pub fn load_file(path: &Path) -> Result<(String, SourceFile)> {
    let source = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    let file = tokenize(&source)
        .and_then(|tokens| parse(&source, tokens))
        .map_err(|e| e.in_file(path))?;
    Ok((source, file))
}

/// Converts every test function of `file` in place.
///
/// Returns the number of tests converted. Every file gets the imports and
/// the `Describe` container, which is empty when no test was found; a file
/// without an import section is an error.
pub fn rewrite_file(file: &mut SourceFile, conventions: &Conventions) -> Result<usize> {
    let native = NativeType::for_file(file, conventions);
    let provider = ensure_imports(file, conventions)?;
    let accessor = provider.accessor_call();

    let candidates = native
        .as_ref()
        .map(|native| find_candidates(file, native))
        .unwrap_or_default();
    debug!(
        tests = ?candidates.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "found test functions"
    );

    let mut slots: Vec<Option<Item>> = std::mem::take(&mut file.items)
        .into_iter()
        .map(Some)
        .collect();
    let mut spec = SpecBlockBuilder::new(conventions);
    for candidate in &candidates {
        let item = slots
            .get_mut(candidate.index)
            .and_then(Option::take)
            .ok_or_else(|| {
                ConvertError::internal(format!("test {} is no longer in the file", candidate.name))
            })?;
        let Decl::Func(func) = item.decl else {
            return Err(ConvertError::internal(format!(
                "test {} is not a function",
                candidate.name
            )));
        };
        let mut body = func.body.ok_or_else(|| {
            ConvertError::internal(format!("test {} has no body", candidate.name))
        })?;
        let uses = rewrite_context(&mut body, &candidate.context_param, &accessor);
        debug!(test = %candidate.name, param = %candidate.context_param, uses, "rewrote context");
        spec.add_leaf(&candidate.name, item.doc, item.comment, body);
    }
    if spec.is_empty() {
        debug!("no test functions; writing an empty container");
    } else {
        debug!(leaves = spec.len(), "built container");
    }
    file.items = slots.into_iter().flatten().collect();
    file.items.push(spec.build());

    if let Some(native) = native {
        let replaced = substitute_native_type(file, &native, &provider.capability_type());
        if replaced > 0 {
            debug!(replaced, "substituted context types");
        }

        if references_package(file, &native.package) {
            warn!(
                package = %native.package,
                "file still refers to the testing package; keeping its import"
            );
        } else {
            remove_import(file, &conventions.testing_path);
        }
    }

    // An added provider import nothing refers to would not compile
    if let (true, Some(qualifier)) = (provider.added, &provider.qualifier) {
        if !references_package(file, qualifier) {
            remove_import(file, &conventions.context_path);
        }
    }

    Ok(candidates.len())
}

/// Where the converted text of `path` is written
pub fn output_path(path: &Path, config: &ConvertConfig) -> PathBuf {
    if config.destructive {
        return path.to_path_buf();
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(config.conventions.converted_file_name(&name))
}

/// Converts one test file on disk.
///
/// In destructive mode the input is overwritten and keeps its permission
/// bits; otherwise the output goes to a `_ginkgo_test.go` sibling created
/// with mode `0666` (before umask) and the input is not touched.
pub fn convert_file(path: &Path, config: &ConvertConfig) -> Result<FileOutcome> {
    let (_, mut file) = load_file(path)?;
    let tests = rewrite_file(&mut file, &config.conventions).map_err(|e| e.in_file(path))?;

    let text = print_file(&file);
    let output = output_path(path, config);
    if config.destructive {
        overwrite(path, &text)?;
    } else {
        write_new(&output, &text)?;
    }
    info!(input = %path.display(), output = %output.display(), tests, "converted");
    Ok(FileOutcome { output, tests })
}

fn overwrite(path: &Path, text: &str) -> Result<()> {
    let permissions = fs::metadata(path)
        .map_err(|e| ConvertError::io(path, e))?
        .permissions();
    fs::write(path, text).map_err(|e| ConvertError::io(path, e))?;
    fs::set_permissions(path, permissions).map_err(|e| ConvertError::io(path, e))
}

/// Create or truncate `path` with the default file mode
pub(crate) fn write_new(path: &Path, text: &str) -> Result<()> {
    use std::io::Write;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }
    let mut out = options.open(path).map_err(|e| ConvertError::io(path, e))?;
    out.write_all(text.as_bytes())
        .map_err(|e| ConvertError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(source: &str) -> (usize, String) {
        let tokens = tokenize(source).expect("tokenize");
        let mut file = parse(source, tokens).expect("parse");
        let tests = rewrite_file(&mut file, &Conventions::default()).expect("rewrite");
        (tests, print_file(&file))
    }

    #[test]
    fn test_converts_scenario() {
        let (tests, out) = convert(
            "package fixtures\n\nimport (\n\t\"testing\"\n)\n\ntype S struct {\n\tT *testing.T\n\tF string\n}\n\nfunc TestSomethingImportant(t *testing.T) {\n\tx := &S{T: t, F: \"a\"}\n\tt.Fail(x.F != \"SECRET\")\n}\n",
        );
        assert_eq!(tests, 1);
        assert_eq!(
            out,
            "package fixtures\n\nimport (\n\t. \"github.com/onsi/ginkgo\"\n\tmr \"github.com/tjarratt/mr_t\"\n)\n\ntype S struct {\n\tT mr.TestingT\n\tF string\n}\n\nfunc init() {\n\tDescribe(\"Testing with ginkgo\", func() {\n\t\tIt(\"TestSomethingImportant\", func() {\n\t\t\tx := &S{T: mr.T(), F: \"a\"}\n\t\t\tmr.T().Fail(x.F != \"SECRET\")\n\t\t})\n\t})\n}\n"
        );
    }

    #[test]
    fn test_other_functions_keep_their_position() {
        let (tests, out) = convert(
            "package foo\n\nimport \"testing\"\n\nfunc helper(t *testing.T, msg *string) {\n\tt.Log(*msg)\n}\n\nfunc TestA(t *testing.T) {\n\thelper(t, nil)\n}\n\nfunc other() {}\n\nfunc TestB(t *testing.T) {}\n",
        );
        assert_eq!(tests, 2);
        assert_eq!(
            out,
            "package foo\n\nimport (\n\t. \"github.com/onsi/ginkgo\"\n\tmr \"github.com/tjarratt/mr_t\"\n)\n\nfunc helper(t mr.TestingT, msg *string) {\n\tt.Log(*msg)\n}\n\nfunc other() {}\n\nfunc init() {\n\tDescribe(\"Testing with ginkgo\", func() {\n\t\tIt(\"TestA\", func() {\n\t\t\thelper(mr.T(), nil)\n\t\t})\n\t\tIt(\"TestB\", func() {})\n\t})\n}\n"
        );
    }

    #[test]
    fn test_keeps_testing_import_when_still_referenced() {
        let (tests, out) = convert(
            "package foo\n\nimport \"testing\"\n\nfunc TestA(t *testing.T) {\n\tif testing.Short() {\n\t\tt.Skip()\n\t}\n}\n",
        );
        assert_eq!(tests, 1);
        assert!(out.contains("\t\"testing\"\n"));
        assert!(out.contains("\t\t\tif testing.Short() {\n\t\t\t\tmr.T().Skip()\n"));
    }

    #[test]
    fn test_file_without_tests_gets_empty_container() {
        let (tests, out) = convert("package foo\n\nimport \"testing\"\n\nfunc helper(t *testing.T) {}\n");
        assert_eq!(tests, 0);
        assert_eq!(
            out,
            "package foo\n\nimport (\n\t. \"github.com/onsi/ginkgo\"\n\tmr \"github.com/tjarratt/mr_t\"\n)\n\nfunc helper(t mr.TestingT) {}\n\nfunc init() {\n\tDescribe(\"Testing with ginkgo\", func() {})\n}\n"
        );
    }

    #[test]
    fn test_file_without_testing_import_keeps_other_imports() {
        let (tests, out) = convert("package foo\n\nimport \"fmt\"\n\nfunc TestA(t *T) {\n\tfmt.Println()\n}\n");
        assert_eq!(tests, 0);
        assert!(out.contains("import (\n\t\"fmt\"\n\t. \"github.com/onsi/ginkgo\"\n)\n"));
        assert!(out.contains("func TestA(t *T) {\n\tfmt.Println()\n}\n"));
        assert!(out.ends_with("\tDescribe(\"Testing with ginkgo\", func() {})\n}\n"));
    }

    #[test]
    fn test_doc_comment_follows_test() {
        let (_, out) = convert(
            "package foo\n\nimport \"testing\"\n\n// TestA checks a\nfunc TestA(t *testing.T) {\n\tt.Log(\"a\")\n}\n",
        );
        assert!(out.contains("\t\t// TestA checks a\n\t\tIt(\"TestA\", func() {\n"));
    }

    #[test]
    fn test_file_without_import_section_is_an_error() {
        let source = "package foo\n\nfunc TestA(t *testing.T) {}\n";
        let mut file = parse(source, tokenize(source).expect("tokenize")).expect("parse");
        let err = rewrite_file(&mut file, &Conventions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingImports));
    }

    #[test]
    fn test_generic_helper_next_to_test() {
        let (tests, out) = convert(
            "package foo\n\nimport \"testing\"\n\nfunc Keys[K comparable, V any](m map[K]V) []K {\n\treturn nil\n}\n\nfunc TestKeys(t *testing.T) {\n\tif len(Keys[string, int](nil)) != 0 {\n\t\tt.Fail()\n\t}\n}\n",
        );
        assert_eq!(tests, 1);
        assert!(out.contains("func Keys[K comparable, V any](m map[K]V) []K {\n\treturn nil\n}\n"));
        assert!(out.contains("\t\t\tif len(Keys[string, int](nil)) != 0 {\n\t\t\t\tmr.T().Fail()\n"));
    }

    #[test]
    fn test_trailing_comments_stay_on_their_line() {
        let (_, out) = convert(
            "package foo\n\nimport (\n\t\"fmt\"     // printing\n\t\"testing\" // std\n)\n\nfunc helper() {} // unused\n\nfunc TestA(t *testing.T) {\n\tm := map[string]int{\n\t\t\"a\": 1, // one\n\t\t\"bb\": 2,\n\t}\n\tfmt.Println(m)\n}\n",
        );
        assert!(out.contains("\t\"fmt\" // printing\n"));
        assert!(!out.contains("// std"));
        assert!(out.contains("func helper() {} // unused\n"));
        assert!(out.contains("\t\t\tm := map[string]int{\n\t\t\t\t\"a\":  1, // one\n\t\t\t\t\"bb\": 2,\n\t\t\t}\n"));
    }

    #[test]
    fn test_output_path() {
        let config = ConvertConfig::new();
        assert_eq!(
            output_path(Path::new("pkg/foo_test.go"), &config),
            PathBuf::from("pkg/foo_ginkgo_test.go")
        );
        let config = config.destructive(true);
        assert_eq!(
            output_path(Path::new("pkg/foo_test.go"), &config),
            PathBuf::from("pkg/foo_test.go")
        );
    }
}
