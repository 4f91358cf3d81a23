//! Test function recognition

use crate::ast::{Decl, Expr, FuncDecl, SourceFile};
use crate::config::Conventions;
use regex::Regex;
use std::sync::LazyLock;

static TEST_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Test[A-Z]").expect("test name pattern is valid"));

/// `Test` followed by an upper-case letter
pub fn is_test_name(name: &str) -> bool {
    TEST_NAME.is_match(name)
}

/// A top-level function that will become an `It` leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCandidate {
    /// Position in `SourceFile::items`
    pub index: usize,
    pub name: String,
    /// Name the function gives its `*testing.T` parameter
    pub context_param: String,
}

/// The `*testing.T` type as spelled in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Local name of the testing import
    pub package: String,
    pub name: String,
}

impl NativeType {
    /// Looks up how the file imports the testing package.
    ///
    /// Returns `None` when the package is not imported, or imported for side
    /// effects or into the file scope, since no `*pkg.T` can be written then.
    pub fn for_file(file: &SourceFile, conventions: &Conventions) -> Option<Self> {
        let spec = file
            .items
            .iter()
            .filter_map(|item| match &item.decl {
                Decl::Import(group) => group.find(&conventions.testing_path),
                _ => None,
            })
            .next()?;
        match spec.local_name() {
            "_" | "." => None,
            local => Some(Self {
                package: local.to_string(),
                name: conventions.testing_type.clone(),
            }),
        }
    }

    /// `*pkg.T`
    pub fn matches(&self, ty: &Expr) -> bool {
        match ty {
            Expr::Star(inner) => inner.node.is_qualified(&self.package, &self.name),
            _ => false,
        }
    }
}

/// Name of the context parameter if `func` is a convertible test
pub fn context_param<'a>(func: &'a FuncDecl, native: &NativeType) -> Option<&'a str> {
    if func.recv.is_some() || func.body.is_none() || !is_test_name(&func.name.node) {
        return None;
    }
    match func.ty.params.as_slice() {
        [param] if param.names.len() == 1 && native.matches(&param.ty.node) => {
            Some(param.names[0].as_str())
        }
        _ => None,
    }
}

/// Every convertible test of the file, in declaration order
pub fn find_candidates(file: &SourceFile, native: &NativeType) -> Vec<TestCandidate> {
    file.items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match &item.decl {
            Decl::Func(func) => context_param(func, native).map(|param| TestCandidate {
                index,
                name: func.name.node.clone(),
                context_param: param.to_string(),
            }),
            _ => None,
        })
        .collect()
}
