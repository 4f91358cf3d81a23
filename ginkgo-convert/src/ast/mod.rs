//! Abstract Syntax Tree definitions for Go source files

mod expr;
mod span;
mod stmt;
mod types;
pub mod visit;

pub use expr::*;
pub use span::*;
pub use stmt::*;
pub use types::*;

use serde::{Deserialize, Serialize};

/// One parsed `.go` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Comments above the `package` clause (license headers, build tags)
    pub header: Vec<Comment>,
    pub package: Spanned<String>,
    /// Top-level declarations in source order
    pub items: Vec<Item>,
    /// Comments after the last declaration
    pub trailing: Vec<Comment>,
    #[serde(skip)]
    pub lines: LineIndex,
}

impl SourceFile {
    /// The first import declaration, which acts as the file's import section.
    pub fn imports(&self) -> Option<&ImportGroup> {
        self.items.iter().find_map(|item| match &item.decl {
            Decl::Import(group) => Some(group),
            _ => None,
        })
    }

    pub fn imports_mut(&mut self) -> Option<&mut ImportGroup> {
        self.items.iter_mut().find_map(|item| match &mut item.decl {
            Decl::Import(group) => Some(group),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.items.iter().filter_map(|item| match &item.decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}

/// A top-level declaration together with its doc comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub decl: Decl,
    pub doc: Vec<Comment>,
    /// Comment at the end of the declaration's last line
    pub comment: Option<Comment>,
    pub span: Span,
}

impl Item {
    pub fn new(decl: Decl, span: Span) -> Self {
        Self {
            decl,
            doc: Vec::new(),
            comment: None,
            span,
        }
    }
}

/// Top-level declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Import(ImportGroup),
    Func(FuncDecl),
    Type(TypeDecl),
    Var(ValueDecl),
    Const(ValueDecl),
}

/// `import "path"` or `import ( ... )`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportGroup {
    pub specs: Vec<ImportSpec>,
    pub parenthesized: bool,
}

impl ImportGroup {
    pub fn find(&self, path: &str) -> Option<&ImportSpec> {
        self.specs.iter().find(|spec| spec.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }
}

/// Single import entry; `path` is unquoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// `.`, `_` or a package alias
    pub alias: Option<String>,
    pub path: String,
    pub comment: Option<Comment>,
}

impl ImportSpec {
    pub fn new(alias: Option<&str>, path: &str) -> Self {
        Self {
            alias: alias.map(str::to_string),
            path: path.to_string(),
            comment: None,
        }
    }

    /// Name this import is referred to by inside the file.
    ///
    /// Without an alias this is the last path element, which matches the
    /// package name for every package laid out the conventional way.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// Function or method declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: Spanned<String>,
    /// `[K comparable, V any]`; constraints are kept as written
    pub type_params: Vec<Field>,
    pub ty: FuncType,
    /// `None` for declarations implemented outside Go
    pub body: Option<Block>,
}

/// `type X ...` or `type ( ... )`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub specs: Vec<TypeSpec>,
    pub grouped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: String,
    pub type_params: Vec<Field>,
    /// `type A = B`
    pub alias: bool,
    pub ty: Spanned<Expr>,
    /// Line comment after the spec inside a group
    pub comment: Option<Comment>,
}

/// `var`/`const` declaration, single or grouped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDecl {
    pub specs: Vec<ValueSpec>,
    pub grouped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub ty: Option<Spanned<Expr>>,
    pub values: Vec<Spanned<Expr>>,
    /// Line comment after the spec inside a group
    pub comment: Option<Comment>,
}

/// Source comment, text kept verbatim including its delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

impl Comment {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_local_name_defaults_to_last_path_element() {
        assert_eq!(ImportSpec::new(None, "testing").local_name(), "testing");
        assert_eq!(
            ImportSpec::new(None, "github.com/onsi/ginkgo").local_name(),
            "ginkgo"
        );
    }

    #[test]
    fn test_import_local_name_prefers_alias() {
        let spec = ImportSpec::new(Some("mr"), "github.com/tjarratt/mr_t");
        assert_eq!(spec.local_name(), "mr");
    }

    #[test]
    fn test_import_group_find() {
        let group = ImportGroup {
            specs: vec![ImportSpec::new(None, "fmt"), ImportSpec::new(None, "testing")],
            parenthesized: true,
        };
        assert!(group.contains("testing"));
        assert!(!group.contains("os"));
    }
}
