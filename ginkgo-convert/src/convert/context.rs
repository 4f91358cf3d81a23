//! Context parameter rewriting and `*testing.T` type substitution

use super::matcher::NativeType;
use crate::ast::visit::{
    Visit, VisitMut, walk_block_mut, walk_expr, walk_expr_mut, walk_field_mut,
    walk_func_type_mut, walk_stmt_mut,
};
use crate::ast::{AssignOp, Block, Decl, Expr, Field, SourceFile, Spanned, Stmt, ValueSpec};

/// Replaces free uses of a test's context parameter with an accessor call
///
/// Tracks one flag per lexical scope recording whether the scope declares
/// its own binding of the parameter name. The outermost scope is the test
/// body. Inside the generated closure the parameter no longer exists, so a
/// `t, err := ...` in the body declares a fresh `t` there and later uses
/// refer to it.
struct ContextRewriter<'a> {
    param: &'a str,
    replacement: &'a Expr,
    scopes: Vec<bool>,
    rewritten: usize,
}

impl<'a> ContextRewriter<'a> {
    fn new(param: &'a str, replacement: &'a Expr) -> Self {
        Self {
            param,
            replacement,
            scopes: Vec::new(),
            rewritten: 0,
        }
    }

    fn visible(&self) -> bool {
        !self.scopes.iter().any(|shadowed| *shadowed)
    }

    fn declare(&mut self, name: &str) {
        if name != self.param {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            *scope = true;
        }
    }

    fn scoped(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(false);
        f(self);
        self.scopes.pop();
    }

    fn rewrite_body(&mut self, body: &mut Block) {
        self.scoped(|this| walk_block_mut(this, body));
    }

    /// Assignment targets: bare names are bindings, not uses
    fn visit_targets(&mut self, targets: &mut [Spanned<Expr>], define: bool) {
        for target in targets {
            match &target.node {
                Expr::Ident(name) => {
                    if define {
                        self.declare(name);
                    }
                }
                _ => self.visit_expr_mut(target),
            }
        }
    }

    fn visit_value_decl(&mut self, specs: &mut [ValueSpec]) {
        for spec in specs {
            if let Some(ty) = &mut spec.ty {
                self.visit_expr_mut(ty);
            }
            for value in &mut spec.values {
                self.visit_expr_mut(value);
            }
            for name in &spec.names {
                self.declare(name);
            }
        }
    }
}

impl VisitMut for ContextRewriter<'_> {
    fn visit_block_mut(&mut self, block: &mut Block) {
        self.scoped(|this| walk_block_mut(this, block));
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Spanned<Stmt>) {
        match &mut stmt.node {
            Stmt::Assign { lhs, op, rhs } => {
                for value in rhs.iter_mut() {
                    self.visit_expr_mut(value);
                }
                let define = *op == AssignOp::Define;
                self.visit_targets(lhs, define);
            }
            Stmt::Decl(Decl::Var(decl) | Decl::Const(decl)) => {
                self.visit_value_decl(&mut decl.specs);
            }
            Stmt::Decl(Decl::Type(decl)) => {
                for spec in &mut decl.specs {
                    self.declare(&spec.name);
                    self.visit_expr_mut(&mut spec.ty);
                }
            }
            Stmt::If { .. } | Stmt::For { .. } | Stmt::Switch { .. } => {
                self.scoped(|this| walk_stmt_mut(this, stmt));
            }
            Stmt::Range {
                key,
                value,
                define,
                expr,
                body,
            } => {
                self.visit_expr_mut(expr);
                let define = *define;
                self.scoped(|this| {
                    for target in key.iter_mut().chain(value.iter_mut()) {
                        this.visit_targets(std::slice::from_mut(target), define);
                    }
                    this.visit_block_mut(body);
                });
            }
            Stmt::TypeSwitch {
                init,
                binding,
                expr,
                clauses,
            } => {
                self.scoped(|this| {
                    if let Some(init) = init {
                        this.visit_stmt_mut(init);
                    }
                    this.visit_expr_mut(expr);
                    for clause in clauses {
                        for ty in &mut clause.exprs {
                            this.visit_expr_mut(ty);
                        }
                        this.scoped(|this| {
                            if let Some(binding) = binding.as_deref() {
                                this.declare(binding);
                            }
                            this.visit_block_mut(&mut clause.body);
                        });
                    }
                });
            }
            Stmt::Select { clauses } => {
                for clause in clauses {
                    self.scoped(|this| {
                        if let Some(comm) = &mut clause.comm {
                            this.visit_stmt_mut(comm);
                        }
                        this.visit_block_mut(&mut clause.body);
                    });
                }
            }
            _ => walk_stmt_mut(self, stmt),
        }
    }

    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        match &mut expr.node {
            Expr::Ident(name) if name.as_str() == self.param && self.visible() => {
                expr.node = self.replacement.clone();
                self.rewritten += 1;
            }
            Expr::FuncLit { ty, body } => {
                self.scoped(|this| {
                    for field in ty.params.iter().chain(&ty.results) {
                        for name in &field.names {
                            this.declare(name);
                        }
                    }
                    walk_func_type_mut(this, ty);
                    this.visit_block_mut(body);
                });
            }
            // Keys of struct literals are field names
            Expr::KeyValue { key, value } => {
                if !matches!(key.node, Expr::Ident(_)) {
                    self.visit_expr_mut(key);
                }
                self.visit_expr_mut(value);
            }
            _ => walk_expr_mut(self, expr),
        }
    }
}

/// Rewrites every free occurrence of `param` in `body`.
///
/// Returns the number of occurrences replaced. The blank identifier names no
/// binding and is never rewritten.
pub fn rewrite_context(body: &mut Block, param: &str, replacement: &Expr) -> usize {
    if param == "_" {
        return 0;
    }
    let mut rewriter = ContextRewriter::new(param, replacement);
    rewriter.rewrite_body(body);
    rewriter.rewritten
}

/// Replaces `*testing.T` field and parameter types
struct TypeSubstitution<'a> {
    native: &'a NativeType,
    replacement: &'a Expr,
    replaced: usize,
}

impl VisitMut for TypeSubstitution<'_> {
    fn visit_field_mut(&mut self, field: &mut Field) {
        if self.native.matches(&field.ty.node) {
            field.ty.node = self.replacement.clone();
            self.replaced += 1;
        } else {
            walk_field_mut(self, field);
        }
    }
}

/// Substitutes the capability type for `*testing.T` in every struct field,
/// parameter and result list of the file
pub fn substitute_native_type(file: &mut SourceFile, native: &NativeType, replacement: &Expr) -> usize {
    let mut substitution = TypeSubstitution {
        native,
        replacement,
        replaced: 0,
    };
    substitution.visit_file_mut(file);
    substitution.replaced
}

struct PackageReferences<'a> {
    package: &'a str,
    found: bool,
}

impl Visit for PackageReferences<'_> {
    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if self.found {
            return;
        }
        if let Expr::Selector { expr: base, .. } = &expr.node {
            if matches!(&base.node, Expr::Ident(name) if name == self.package) {
                self.found = true;
                return;
            }
        }
        walk_expr(self, expr);
    }
}

/// Whether anything in the file still names `package.X`
pub fn references_package(file: &SourceFile, package: &str) -> bool {
    let mut references = PackageReferences {
        package,
        found: false,
    };
    references.visit_file(file);
    references.found
}
