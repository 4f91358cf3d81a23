//! Conversion configuration
//!
//! [`ConvertConfig`] carries the per-run options chosen on the command line;
//! [`Conventions`] names everything the generated code refers to.

use std::fmt;

/// How a package's suite file gets created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ScaffoldKind {
    /// Run `ginkgo bootstrap` inside the package directory
    #[default]
    Ginkgo,
    /// Write the bootstrap file directly
    Template,
}

impl fmt::Display for ScaffoldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaffoldKind::Ginkgo => "ginkgo",
            ScaffoldKind::Template => "template",
        })
    }
}

/// Options for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Overwrite test files in place instead of writing `_ginkgo_test.go` siblings
    pub destructive: bool,
    /// Provision a suite file for every package visited
    pub create_suite: bool,
    pub scaffold: ScaffoldKind,
    pub conventions: Conventions,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            destructive: false,
            create_suite: true,
            scaffold: ScaffoldKind::default(),
            conventions: Conventions::default(),
        }
    }
}

impl ConvertConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set destructive mode
    pub fn destructive(mut self, destructive: bool) -> Self {
        self.destructive = destructive;
        self
    }

    /// Enable or disable suite provisioning
    pub fn create_suite(mut self, create_suite: bool) -> Self {
        self.create_suite = create_suite;
        self
    }

    pub fn scaffold(mut self, scaffold: ScaffoldKind) -> Self {
        self.scaffold = scaffold;
        self
    }
}

/// Fixed names of the source and target frameworks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    /// Import path of the xUnit framework being converted away from
    pub testing_path: String,
    /// Context type inside `testing_path`; tests take a pointer to it
    pub testing_type: String,

    pub bdd_path: String,
    /// Always imported as `.` so `Describe` and `It` need no qualifier
    pub bdd_alias: String,
    pub container_func: String,
    pub container_label: String,
    pub leaf_func: String,
    pub init_func: String,

    pub context_path: String,
    pub context_alias: String,
    /// Zero-argument accessor returning the current context
    pub context_accessor: String,
    /// Interface type replacing `*testing.T` in signatures and fields
    pub capability_type: String,

    pub test_suffix: String,
    pub converted_suffix: String,
    pub suite_suffix: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            testing_path: "testing".into(),
            testing_type: "T".into(),
            bdd_path: "github.com/onsi/ginkgo".into(),
            bdd_alias: ".".into(),
            container_func: "Describe".into(),
            container_label: "Testing with ginkgo".into(),
            leaf_func: "It".into(),
            init_func: "init".into(),
            context_path: "github.com/tjarratt/mr_t".into(),
            context_alias: "mr".into(),
            context_accessor: "T".into(),
            capability_type: "TestingT".into(),
            test_suffix: "_test.go".into(),
            converted_suffix: "_ginkgo_test.go".into(),
            suite_suffix: "_suite_test.go".into(),
        }
    }
}

impl Conventions {
    /// Output file name for a test file name
    ///
    /// `foo_test.go` becomes `foo_ginkgo_test.go`; names without the test
    /// suffix get the converted suffix appended to their stem.
    pub fn converted_file_name(&self, file_name: &str) -> String {
        let stem = file_name
            .strip_suffix(&self.test_suffix)
            .or_else(|| file_name.strip_suffix(".go"))
            .unwrap_or(file_name);
        format!("{stem}{}", self.converted_suffix)
    }

    /// `<package>_suite_test.go`
    pub fn suite_file_name(&self, package: &str) -> String {
        format!("{package}{}", self.suite_suffix)
    }

    /// Files that are test units eligible for conversion
    pub fn is_convertible_test_file(&self, file_name: &str, package: &str) -> bool {
        file_name.ends_with(&self.test_suffix)
            && !file_name.ends_with(&self.converted_suffix)
            && !file_name.starts_with('.')
            && !file_name.starts_with('_')
            && file_name != self.suite_file_name(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert!(!config.destructive);
        assert!(config.create_suite);
        assert_eq!(config.scaffold, ScaffoldKind::Ginkgo);
    }

    #[test]
    fn test_builder_methods() {
        let config = ConvertConfig::new()
            .destructive(true)
            .create_suite(false)
            .scaffold(ScaffoldKind::Template);
        assert!(config.destructive);
        assert!(!config.create_suite);
        assert_eq!(config.scaffold.to_string(), "template");
    }

    #[test]
    fn test_converted_file_name() {
        let names = Conventions::default();
        assert_eq!(names.converted_file_name("foo_test.go"), "foo_ginkgo_test.go");
        assert_eq!(names.converted_file_name("xunit_test.go"), "xunit_ginkgo_test.go");
    }

    #[test]
    fn test_convertible_test_files() {
        let names = Conventions::default();
        assert!(names.is_convertible_test_file("foo_test.go", "foo"));
        assert!(!names.is_convertible_test_file("foo.go", "foo"));
        assert!(!names.is_convertible_test_file("foo_ginkgo_test.go", "foo"));
        assert!(!names.is_convertible_test_file("foo_suite_test.go", "foo"));
        assert!(!names.is_convertible_test_file("_scratch_test.go", "foo"));
        assert!(names.is_convertible_test_file("bar_suite_test.go", "foo"));
    }
}
