//! Field lists and function signatures

use super::{Comment, Expr, Spanned};
use serde::{Deserialize, Serialize};

/// One entry of a parameter, result, struct or interface list
///
/// `a, b int` is a single field with two names. Embedded struct fields and
/// unnamed parameters have no names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: Spanned<Expr>,
    /// Struct tag, verbatim
    pub tag: Option<String>,
    /// Line comment after a struct field or interface method
    pub comment: Option<Comment>,
}

impl Field {
    pub fn new(names: Vec<String>, ty: Spanned<Expr>) -> Self {
        Self {
            names,
            ty,
            tag: None,
            comment: None,
        }
    }
}

/// Function signature
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

impl FuncType {
    /// Number of parameters, counting every name of a grouped field
    pub fn param_count(&self) -> usize {
        self.params.iter().map(|field| field.names.len().max(1)).sum()
    }

    /// Every field of the signature, parameters first
    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.params.iter_mut().chain(self.results.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Spanned<Expr> {
        Spanned::detached(Expr::ident("int"))
    }

    #[test]
    fn test_param_count_counts_grouped_names() {
        let ty = FuncType {
            params: vec![
                Field::new(vec!["a".into(), "b".into()], int()),
                Field::new(vec!["c".into()], int()),
            ],
            results: Vec::new(),
        };
        assert_eq!(ty.param_count(), 3);
    }

    #[test]
    fn test_param_count_counts_unnamed_params() {
        let ty = FuncType {
            params: vec![Field::new(Vec::new(), int()), Field::new(Vec::new(), int())],
            results: Vec::new(),
        };
        assert_eq!(ty.param_count(), 2);
    }
}
