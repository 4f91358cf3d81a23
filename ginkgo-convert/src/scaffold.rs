//! Suite file provisioning
//!
//! Ginkgo needs one `<package>_suite_test.go` per package to hand control
//! from `go test` to the spec runner. [`ensure_scaffold`] creates it when it
//! is missing, through a [`ScaffoldProvisioner`].

use crate::config::{Conventions, ScaffoldKind};
use crate::convert::write_new;
use crate::error::{ConvertError, Result, ScaffoldError};
use crate::package::Package;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Something that can create a package's suite file
pub trait ScaffoldProvisioner {
    fn provision_scaffold(
        &self,
        package: &Package,
        conventions: &Conventions,
    ) -> std::result::Result<(), ScaffoldError>;
}

/// `<dir>/<package>_suite_test.go`
pub fn scaffold_path(package: &Package, conventions: &Conventions) -> PathBuf {
    package.dir.join(conventions.suite_file_name(&package.name))
}

/// Creates the suite file unless one already exists; returns whether it
/// was created.
pub fn ensure_scaffold(
    provisioner: &dyn ScaffoldProvisioner,
    package: &Package,
    conventions: &Conventions,
) -> Result<bool> {
    let path = scaffold_path(package, conventions);
    if path.exists() {
        debug!(path = %path.display(), "suite file already present");
        return Ok(false);
    }
    provisioner.provision_scaffold(package, conventions)?;
    info!(path = %path.display(), "created suite file");
    Ok(true)
}

pub fn provisioner_for(kind: ScaffoldKind) -> Box<dyn ScaffoldProvisioner> {
    match kind {
        ScaffoldKind::Ginkgo => Box::new(GinkgoBootstrap::default()),
        ScaffoldKind::Template => Box::new(SuiteTemplate),
    }
}

/// Runs `ginkgo bootstrap` with the package directory as its working
/// directory
#[derive(Debug, Clone)]
pub struct GinkgoBootstrap {
    pub program: PathBuf,
}

impl Default for GinkgoBootstrap {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ginkgo"),
        }
    }
}

impl ScaffoldProvisioner for GinkgoBootstrap {
    fn provision_scaffold(
        &self,
        package: &Package,
        _conventions: &Conventions,
    ) -> std::result::Result<(), ScaffoldError> {
        let command = format!("{} bootstrap", self.program.display());
        let output = Command::new(&self.program)
            .arg("bootstrap")
            .current_dir(&package.dir)
            .output()
            .map_err(|source| ScaffoldError::Spawn {
                command: command.clone(),
                dir: package.dir.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ScaffoldError::Failed {
                command,
                dir: package.dir.clone(),
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

/// Writes the bootstrap file without an external tool
#[derive(Debug, Clone, Copy, Default)]
pub struct SuiteTemplate;

impl ScaffoldProvisioner for SuiteTemplate {
    fn provision_scaffold(
        &self,
        package: &Package,
        conventions: &Conventions,
    ) -> std::result::Result<(), ScaffoldError> {
        let path = scaffold_path(package, conventions);
        write_new(&path, &suite_source(&package.name, conventions)).map_err(|e| match e {
            ConvertError::Io { path, source } => ScaffoldError::Write { path, source },
            other => ScaffoldError::Write {
                path: path.clone(),
                source: std::io::Error::other(other.to_string()),
            },
        })
    }
}

/// `my_pkg` -> `MyPkg`
fn pretty_package_name(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Suite file text as `ginkgo bootstrap` writes it
pub fn suite_source(package: &str, conventions: &Conventions) -> String {
    let pretty = pretty_package_name(package);
    format!(
        "package {package}_test\n\nimport (\n\t. \"{bdd}\"\n\t. \"github.com/onsi/gomega\"\n\n\t\"{testing}\"\n)\n\nfunc Test{pretty}(t *testing.T) {{\n\tRegisterFailHandler(Fail)\n\tRunSpecs(t, \"{pretty} Suite\")\n}}\n",
        bdd = conventions.bdd_path,
        testing = conventions.testing_path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting(Cell<usize>);

    impl ScaffoldProvisioner for Counting {
        fn provision_scaffold(
            &self,
            package: &Package,
            conventions: &Conventions,
        ) -> std::result::Result<(), ScaffoldError> {
            self.0.set(self.0.get() + 1);
            SuiteTemplate.provision_scaffold(package, conventions)
        }
    }

    fn package_in(dir: &std::path::Path) -> Package {
        Package {
            dir: dir.to_path_buf(),
            name: "fixtures".into(),
            test_files: Vec::new(),
        }
    }

    #[test]
    fn test_pretty_package_name() {
        assert_eq!(pretty_package_name("fixtures"), "Fixtures");
        assert_eq!(pretty_package_name("my_pkg"), "MyPkg");
        assert_eq!(pretty_package_name("go-thing"), "GoThing");
    }

    #[test]
    fn test_suite_source() {
        let source = suite_source("fixtures", &Conventions::default());
        assert!(source.starts_with("package fixtures_test\n"));
        assert!(source.contains("func TestFixtures(t *testing.T) {\n"));
        assert!(source.contains("RunSpecs(t, \"Fixtures Suite\")"));
    }

    #[test]
    fn test_ensure_scaffold_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let package = package_in(dir.path());
        let conventions = Conventions::default();
        let provisioner = Counting(Cell::new(0));

        assert!(ensure_scaffold(&provisioner, &package, &conventions).expect("first"));
        assert!(!ensure_scaffold(&provisioner, &package, &conventions).expect("second"));
        assert_eq!(provisioner.0.get(), 1);
        assert!(dir.path().join("fixtures_suite_test.go").is_file());
    }

    #[test]
    fn test_existing_suite_file_is_left_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fixtures_suite_test.go");
        std::fs::write(&path, "package fixtures_test\n").expect("write");

        let provisioner = Counting(Cell::new(0));
        let created = ensure_scaffold(&provisioner, &package_in(dir.path()), &Conventions::default())
            .expect("ensure");
        assert!(!created);
        assert_eq!(provisioner.0.get(), 0);
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "package fixtures_test\n");
    }

    #[test]
    fn test_bootstrap_failure_reports_command() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provisioner = GinkgoBootstrap {
            program: dir.path().join("no-such-ginkgo"),
        };
        let err = provisioner
            .provision_scaffold(&package_in(dir.path()), &Conventions::default())
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Spawn { .. }));
        assert!(err.to_string().contains("bootstrap"));
    }
}
