//! Package resolution and discovery
//!
//! A package is a directory holding `.go` files. Walking starts at the
//! directory named on the command line and descends into every child
//! directory the way `go test ./...` would, collecting test files and
//! provisioning suite files on the way back up.

use crate::config::{ConvertConfig, Conventions};
use crate::convert::{FileOutcome, convert_file};
use crate::error::{ConvertError, Result};
use crate::parser::parse_package_name;
use crate::scaffold::{ScaffoldProvisioner, ensure_scaffold};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// One directory of Go source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub dir: PathBuf,
    /// Name from the `package` clause, without any `_test` suffix
    pub name: String,
    /// Convertible test files, sorted by name
    pub test_files: Vec<PathBuf>,
}

/// Turn a package identifier into a directory.
///
/// An existing directory is taken as is. Anything else is treated as an
/// import path and looked up under `src/` of each `$GOPATH` entry, falling
/// back to `$HOME/go`.
pub fn resolve_package(id: &str) -> Result<PathBuf> {
    let direct = Path::new(id);
    if direct.is_dir() {
        return Ok(direct.to_path_buf());
    }

    let roots: Vec<PathBuf> = match env::var_os("GOPATH") {
        Some(gopath) if !gopath.is_empty() => env::split_paths(&gopath).collect(),
        _ => env::var_os("HOME")
            .map(|home| vec![PathBuf::from(home).join("go")])
            .unwrap_or_default(),
    };
    roots
        .iter()
        .map(|root| root.join("src").join(id))
        .find(|candidate| candidate.is_dir())
        .ok_or_else(|| {
            ConvertError::resolve_error(format!("cannot find package {id:?} in any of {roots:?}"))
        })
}

/// Child directories Go tooling ignores
fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || name == "testdata" || name == "vendor"
}

/// Entries of `dir` sorted by name: `.go` files and walkable subdirectories
fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut go_files = Vec::new();
    let mut children = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ConvertError::io(path, e.into())
        })?;
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if !is_ignored_dir(&name) {
                children.push(entry.path().to_path_buf());
            }
        } else if entry.file_type().is_file() && name.ends_with(".go") {
            go_files.push(entry.path().to_path_buf());
        }
    }
    Ok((go_files, children))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads the package in `dir`; `None` when the directory has no Go files.
pub fn load_package(dir: &Path, conventions: &Conventions) -> Result<Option<Package>> {
    let (go_files, _) = list_dir(dir)?;
    package_from_files(dir, &go_files, conventions)
}

fn package_from_files(
    dir: &Path,
    go_files: &[PathBuf],
    conventions: &Conventions,
) -> Result<Option<Package>> {
    let is_test = |path: &&PathBuf| file_name(path).ends_with(&conventions.test_suffix);
    let Some(first) = go_files
        .iter()
        .find(|path| !is_test(path))
        .or_else(|| go_files.first())
    else {
        return Ok(None);
    };

    let source = fs::read_to_string(first).map_err(|e| ConvertError::io(first, e))?;
    let clause = parse_package_name(&source).map_err(|e| e.in_file(first))?;
    let name = clause
        .strip_suffix("_test")
        .unwrap_or(&clause)
        .to_string();

    let test_files = go_files
        .iter()
        .filter(|path| conventions.is_convertible_test_file(&file_name(path), &name))
        .cloned()
        .collect();
    Ok(Some(Package {
        dir: dir.to_path_buf(),
        name,
        test_files,
    }))
}

/// Recursive package discovery with post-order suite provisioning
pub struct PackageWalker<'a> {
    config: &'a ConvertConfig,
    provisioner: &'a dyn ScaffoldProvisioner,
}

impl<'a> PackageWalker<'a> {
    pub fn new(config: &'a ConvertConfig, provisioner: &'a dyn ScaffoldProvisioner) -> Self {
        Self {
            config,
            provisioner,
        }
    }

    /// Test files of `dir` and every directory below it, parents first.
    ///
    /// Each package's suite file is provisioned after its children have been
    /// walked, when suite creation is enabled.
    pub fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let conventions = &self.config.conventions;
        let (go_files, children) = list_dir(dir)?;
        let package = package_from_files(dir, &go_files, conventions)?;

        let mut found = Vec::new();
        if let Some(package) = &package {
            debug!(
                dir = %dir.display(),
                package = %package.name,
                tests = package.test_files.len(),
                "found package"
            );
            found.extend(package.test_files.iter().cloned());
        }

        for child in children {
            found.extend(self.walk(&child)?);
        }

        if let Some(package) = &package {
            if self.config.create_suite {
                ensure_scaffold(self.provisioner, package, conventions)?;
            }
        }
        Ok(found)
    }
}

/// Files written by one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub converted: Vec<PathBuf>,
    pub tests: usize,
}

/// Converts the package `id` and everything below it.
///
/// Stops at the first error; files converted before it stay converted.
pub fn convert_package(
    id: &str,
    config: &ConvertConfig,
    provisioner: &dyn ScaffoldProvisioner,
) -> Result<RunSummary> {
    let root = resolve_package(id)?;
    info!(package = id, dir = %root.display(), "converting");

    let files = PackageWalker::new(config, provisioner).walk(&root)?;
    let mut summary = RunSummary::default();
    for path in files {
        let FileOutcome { output, tests } = convert_file(&path, config)?;
        summary.converted.push(output);
        summary.tests += tests;
    }
    info!(files = summary.converted.len(), tests = summary.tests, "done");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::SuiteTemplate;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).expect("write fixture");
    }

    #[test]
    fn test_resolve_existing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let id = dir.path().to_string_lossy().into_owned();
        assert_eq!(resolve_package(&id).expect("resolve"), dir.path());
    }

    #[test]
    fn test_resolve_missing_package_fails() {
        let err = resolve_package("definitely/not/a/package/anywhere").unwrap_err();
        assert!(matches!(err, ConvertError::Resolve { .. }));
    }

    #[test]
    fn test_load_package_prefers_non_test_clause() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a_test.go", "package widgets_test\n");
        write(dir.path(), "widgets.go", "package widgets\n");
        write(dir.path(), "widgets_suite_test.go", "package widgets_test\n");
        write(dir.path(), "b_ginkgo_test.go", "package widgets\n");
        write(dir.path(), "notes.txt", "not go\n");

        let package = load_package(dir.path(), &Conventions::default())
            .expect("load")
            .expect("package");
        assert_eq!(package.name, "widgets");
        assert_eq!(package.test_files, vec![dir.path().join("a_test.go")]);
    }

    #[test]
    fn test_load_package_from_external_tests_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a_test.go", "// header\npackage gadgets_test\n");
        let package = load_package(dir.path(), &Conventions::default())
            .expect("load")
            .expect("package");
        assert_eq!(package.name, "gadgets");
    }

    #[test]
    fn test_directory_without_go_files_is_not_a_package() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "README.md", "# docs\n");
        assert!(load_package(dir.path(), &Conventions::default())
            .expect("load")
            .is_none());
    }

    #[test]
    fn test_walk_recurses_and_scaffolds_packages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "root_test.go", "package root\n");
        fs::create_dir_all(root.join("docs/nested")).expect("mkdir");
        write(&root.join("docs/nested"), "n_test.go", "package nested\n");
        fs::create_dir_all(root.join("testdata")).expect("mkdir");
        write(&root.join("testdata"), "x_test.go", "package x\n");
        fs::create_dir_all(root.join(".git")).expect("mkdir");

        let config = ConvertConfig::new();
        let found = PackageWalker::new(&config, &SuiteTemplate)
            .walk(root)
            .expect("walk");
        assert_eq!(
            found,
            vec![root.join("root_test.go"), root.join("docs/nested/n_test.go")]
        );
        assert!(root.join("root_suite_test.go").is_file());
        assert!(root.join("docs/nested/nested_suite_test.go").is_file());
        assert!(!root.join("docs/docs_suite_test.go").exists());
        assert!(!root.join("testdata/x_suite_test.go").exists());
    }

    #[test]
    fn test_walk_without_suite_creation() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a_test.go", "package a\n");
        let config = ConvertConfig::new().create_suite(false);
        let found = PackageWalker::new(&config, &SuiteTemplate)
            .walk(dir.path())
            .expect("walk");
        assert_eq!(found.len(), 1);
        assert!(!dir.path().join("a_suite_test.go").exists());
    }
}
