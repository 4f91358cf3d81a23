//! Import section edits

use crate::ast::{Decl, Expr, ImportSpec, SourceFile};
use crate::config::Conventions;
use crate::error::{ConvertError, Result};

/// How generated code refers to the context-provider package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextProvider {
    /// `None` when the package is dot-imported
    pub qualifier: Option<String>,
    /// The import was not in the file before
    pub added: bool,
    accessor: String,
    capability: String,
}

impl ContextProvider {
    /// `mr.T()`
    pub fn accessor_call(&self) -> Expr {
        Expr::call0(Expr::qualified(self.qualifier.as_deref(), &self.accessor))
    }

    /// `mr.TestingT`
    pub fn capability_type(&self) -> Expr {
        Expr::qualified(self.qualifier.as_deref(), &self.capability)
    }
}

/// Adds the BDD and context-provider imports to the file's import section.
///
/// Existing imports of either path are kept as written. The section is the
/// first import declaration of the file; a file without one cannot be
/// converted.
pub fn ensure_imports(file: &mut SourceFile, conventions: &Conventions) -> Result<ContextProvider> {
    let group = file.imports_mut().ok_or(ConvertError::MissingImports)?;
    if group.specs.is_empty() {
        return Err(ConvertError::internal("import declaration has no entries"));
    }

    if !group.contains(&conventions.bdd_path) {
        group.specs.push(ImportSpec::new(
            Some(&conventions.bdd_alias),
            &conventions.bdd_path,
        ));
    }

    let existing = group
        .specs
        .iter_mut()
        .find(|spec| spec.path == conventions.context_path);
    let added = existing.is_none();
    let qualifier = match existing {
        Some(spec) => match spec.alias.as_deref() {
            Some(".") => None,
            Some("_") => {
                spec.alias = Some(conventions.context_alias.clone());
                Some(conventions.context_alias.clone())
            }
            _ => Some(spec.local_name().to_string()),
        },
        None => {
            group.specs.push(ImportSpec::new(
                Some(&conventions.context_alias),
                &conventions.context_path,
            ));
            Some(conventions.context_alias.clone())
        }
    };

    group.specs.sort_by(|a, b| a.path.cmp(&b.path));
    if group.specs.len() > 1 {
        group.parenthesized = true;
    }

    Ok(ContextProvider {
        qualifier,
        added,
        accessor: conventions.context_accessor.clone(),
        capability: conventions.capability_type.clone(),
    })
}

/// Drops every import of `path`; returns whether one was present.
///
/// An import declaration left without entries is removed with it.
pub fn remove_import(file: &mut SourceFile, path: &str) -> bool {
    let mut removed = false;
    for item in &mut file.items {
        if let Decl::Import(group) = &mut item.decl {
            let before = group.specs.len();
            group.specs.retain(|spec| spec.path != path);
            removed |= group.specs.len() != before;
        }
    }
    file.items
        .retain(|item| !matches!(&item.decl, Decl::Import(group) if group.specs.is_empty()));
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn parse_source(source: &str) -> SourceFile {
        parse(source, tokenize(source).expect("tokenize")).expect("parse")
    }

    fn paths(file: &SourceFile) -> Vec<(Option<String>, String)> {
        file.imports()
            .map(|group| {
                group
                    .specs
                    .iter()
                    .map(|spec| (spec.alias.clone(), spec.path.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_adds_bdd_and_provider_imports() {
        let mut file = parse_source("package foo\n\nimport \"testing\"\n");
        let provider = ensure_imports(&mut file, &Conventions::default()).expect("imports");

        assert_eq!(provider.qualifier.as_deref(), Some("mr"));
        assert_eq!(
            paths(&file),
            vec![
                (Some(".".into()), "github.com/onsi/ginkgo".into()),
                (Some("mr".into()), "github.com/tjarratt/mr_t".into()),
                (None, "testing".into()),
            ]
        );
        assert!(file.imports().is_some_and(|group| group.parenthesized));
    }

    #[test]
    fn test_existing_imports_are_not_duplicated() {
        let mut file = parse_source(
            "package foo\n\nimport (\n\t. \"github.com/onsi/ginkgo\"\n\tmr \"github.com/tjarratt/mr_t\"\n\t\"testing\"\n)\n",
        );
        ensure_imports(&mut file, &Conventions::default()).expect("imports");
        assert_eq!(paths(&file).len(), 3);
    }

    #[test]
    fn test_provider_alias_is_honoured() {
        let mut file = parse_source(
            "package foo\n\nimport (\n\t. \"github.com/tjarratt/mr_t\"\n\t\"testing\"\n)\n",
        );
        let provider = ensure_imports(&mut file, &Conventions::default()).expect("imports");
        assert_eq!(provider.qualifier, None);
        assert!(matches!(provider.accessor_call(), Expr::Call { .. }));
        assert!(matches!(provider.capability_type(), Expr::Ident(name) if name == "TestingT"));

        let mut file = parse_source(
            "package foo\n\nimport (\n\tmrt \"github.com/tjarratt/mr_t\"\n\t\"testing\"\n)\n",
        );
        let provider = ensure_imports(&mut file, &Conventions::default()).expect("imports");
        assert_eq!(provider.qualifier.as_deref(), Some("mrt"));
        assert!(provider.capability_type().is_qualified("mrt", "TestingT"));
    }

    #[test]
    fn test_missing_import_section_is_fatal() {
        let mut file = parse_source("package foo\n\nfunc TestFoo(t *testing.T) {}\n");
        let err = ensure_imports(&mut file, &Conventions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingImports));
    }

    #[test]
    fn test_empty_import_declaration_is_internal_error() {
        let mut file = parse_source("package foo\n\nimport ()\n");
        let err = ensure_imports(&mut file, &Conventions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Internal { .. }));
    }

    #[test]
    fn test_remove_import() {
        let mut file = parse_source("package foo\n\nimport (\n\t\"fmt\"\n\t\"testing\"\n)\n");
        assert!(remove_import(&mut file, "testing"));
        assert_eq!(paths(&file), vec![(None, "fmt".into())]);
        assert!(!remove_import(&mut file, "testing"));
    }

    #[test]
    fn test_remove_last_import_drops_declaration() {
        let mut file = parse_source("package foo\n\nimport \"testing\"\n\nvar x = 1\n");
        assert!(remove_import(&mut file, "testing"));
        assert!(file.imports().is_none());
        assert_eq!(file.items.len(), 1);
    }
}
