//! Depth-first traversal of the syntax tree
//!
//! [`Visit`] walks a tree by shared reference, [`VisitMut`] by mutable
//! reference. Every `visit_*` method defaults to the matching `walk_*`
//! function, which visits the node's children in source order; an override
//! that still wants the children visited calls the `walk_*` function itself.

use super::{
    Block, CaseClause, CommClause, Decl, Expr, Field, FuncType, SourceFile, Spanned, Stmt,
    ValueDecl,
};

/// Read-only visitor
pub trait Visit {
    fn visit_file(&mut self, file: &SourceFile) {
        walk_file(self, file);
    }

    fn visit_decl(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_func_type(&mut self, ty: &FuncType) {
        walk_func_type(self, ty);
    }

    fn visit_field(&mut self, field: &Field) {
        walk_field(self, field);
    }
}

pub fn walk_file<V: Visit + ?Sized>(v: &mut V, file: &SourceFile) {
    for item in &file.items {
        v.visit_decl(&item.decl);
    }
}

pub fn walk_decl<V: Visit + ?Sized>(v: &mut V, decl: &Decl) {
    match decl {
        Decl::Import(_) => {}
        Decl::Func(func) => {
            if let Some(recv) = &func.recv {
                v.visit_field(recv);
            }
            for param in &func.type_params {
                v.visit_field(param);
            }
            v.visit_func_type(&func.ty);
            if let Some(body) = &func.body {
                v.visit_block(body);
            }
        }
        Decl::Type(types) => {
            for spec in &types.specs {
                for param in &spec.type_params {
                    v.visit_field(param);
                }
                v.visit_expr(&spec.ty);
            }
        }
        Decl::Var(values) | Decl::Const(values) => walk_value_decl(v, values),
    }
}

fn walk_value_decl<V: Visit + ?Sized>(v: &mut V, values: &ValueDecl) {
    for spec in &values.specs {
        if let Some(ty) = &spec.ty {
            v.visit_expr(ty);
        }
        for value in &spec.values {
            v.visit_expr(value);
        }
    }
}

pub fn walk_block<V: Visit + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

fn walk_case_clauses<V: Visit + ?Sized>(v: &mut V, clauses: &[CaseClause]) {
    for clause in clauses {
        for expr in &clause.exprs {
            v.visit_expr(expr);
        }
        v.visit_block(&clause.body);
    }
}

fn walk_comm_clauses<V: Visit + ?Sized>(v: &mut V, clauses: &[CommClause]) {
    for clause in clauses {
        if let Some(comm) = &clause.comm {
            v.visit_stmt(comm);
        }
        v.visit_block(&clause.body);
    }
}

pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => v.visit_expr(expr),
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs) {
                v.visit_expr(expr);
            }
        }
        Stmt::IncDec { expr, .. } => v.visit_expr(expr),
        Stmt::Send { channel, value } => {
            v.visit_expr(channel);
            v.visit_expr(value);
        }
        Stmt::Decl(decl) => v.visit_decl(decl),
        Stmt::Return(results) => {
            for expr in results {
                v.visit_expr(expr);
            }
        }
        Stmt::Branch { .. } | Stmt::Empty => {}
        Stmt::Block(block) => v.visit_block(block),
        Stmt::If {
            init,
            cond,
            then_branch,
            else_branch,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(cond);
            v.visit_block(then_branch);
            if let Some(else_branch) = else_branch {
                v.visit_stmt(else_branch);
            }
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            if let Some(post) = post {
                v.visit_stmt(post);
            }
            v.visit_block(body);
        }
        Stmt::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            for target in key.iter().chain(value) {
                v.visit_expr(target);
            }
            v.visit_expr(expr);
            v.visit_block(body);
        }
        Stmt::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(tag) = tag {
                v.visit_expr(tag);
            }
            walk_case_clauses(v, clauses);
        }
        Stmt::TypeSwitch {
            init,
            expr,
            clauses,
            ..
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(expr);
            walk_case_clauses(v, clauses);
        }
        Stmt::Select { clauses } => walk_comm_clauses(v, clauses),
        Stmt::Labeled { stmt, .. } => v.visit_stmt(stmt),
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Spanned<Expr>) {
    match &expr.node {
        Expr::Ident(_) | Expr::BasicLit(_) => {}
        Expr::CompositeLit { ty, elts, .. } => {
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
            for elt in elts {
                v.visit_expr(elt);
            }
        }
        Expr::FuncLit { ty, body } => {
            v.visit_func_type(ty);
            v.visit_block(body);
        }
        Expr::Paren(inner) | Expr::Star(inner) => v.visit_expr(inner),
        Expr::Selector { expr, .. } => v.visit_expr(expr),
        Expr::Index { expr, index } => {
            v.visit_expr(expr);
            v.visit_expr(index);
        }
        Expr::IndexList { expr, indices } => {
            v.visit_expr(expr);
            for index in indices {
                v.visit_expr(index);
            }
        }
        Expr::Slice {
            expr,
            low,
            high,
            max,
            ..
        } => {
            v.visit_expr(expr);
            for bound in [low, high, max].into_iter().flatten() {
                v.visit_expr(bound);
            }
        }
        Expr::TypeAssert { expr, ty } => {
            v.visit_expr(expr);
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
        }
        Expr::Call { func, args, .. } => {
            v.visit_expr(func);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Unary { expr, .. } => v.visit_expr(expr),
        Expr::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::KeyValue { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        Expr::ArrayType { len, elem } => {
            if let Some(len) = len {
                v.visit_expr(len);
            }
            v.visit_expr(elem);
        }
        Expr::Ellipsis(elem) => {
            if let Some(elem) = elem {
                v.visit_expr(elem);
            }
        }
        Expr::MapType { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        Expr::ChanType { elem, .. } => v.visit_expr(elem),
        Expr::FuncType(ty) => v.visit_func_type(ty),
        Expr::StructType { fields, .. } | Expr::InterfaceType { methods: fields, .. } => {
            for field in fields {
                v.visit_field(field);
            }
        }
    }
}

pub fn walk_func_type<V: Visit + ?Sized>(v: &mut V, ty: &FuncType) {
    for field in ty.params.iter().chain(&ty.results) {
        v.visit_field(field);
    }
}

pub fn walk_field<V: Visit + ?Sized>(v: &mut V, field: &Field) {
    v.visit_expr(&field.ty);
}

/// Mutating visitor
pub trait VisitMut {
    fn visit_file_mut(&mut self, file: &mut SourceFile) {
        walk_file_mut(self, file);
    }

    fn visit_decl_mut(&mut self, decl: &mut Decl) {
        walk_decl_mut(self, decl);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Spanned<Stmt>) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        walk_expr_mut(self, expr);
    }

    fn visit_func_type_mut(&mut self, ty: &mut FuncType) {
        walk_func_type_mut(self, ty);
    }

    fn visit_field_mut(&mut self, field: &mut Field) {
        walk_field_mut(self, field);
    }
}

pub fn walk_file_mut<V: VisitMut + ?Sized>(v: &mut V, file: &mut SourceFile) {
    for item in &mut file.items {
        v.visit_decl_mut(&mut item.decl);
    }
}

pub fn walk_decl_mut<V: VisitMut + ?Sized>(v: &mut V, decl: &mut Decl) {
    match decl {
        Decl::Import(_) => {}
        Decl::Func(func) => {
            if let Some(recv) = &mut func.recv {
                v.visit_field_mut(recv);
            }
            for param in &mut func.type_params {
                v.visit_field_mut(param);
            }
            v.visit_func_type_mut(&mut func.ty);
            if let Some(body) = &mut func.body {
                v.visit_block_mut(body);
            }
        }
        Decl::Type(types) => {
            for spec in &mut types.specs {
                for param in &mut spec.type_params {
                    v.visit_field_mut(param);
                }
                v.visit_expr_mut(&mut spec.ty);
            }
        }
        Decl::Var(values) | Decl::Const(values) => {
            for spec in &mut values.specs {
                if let Some(ty) = &mut spec.ty {
                    v.visit_expr_mut(ty);
                }
                for value in &mut spec.values {
                    v.visit_expr_mut(value);
                }
            }
        }
    }
}

pub fn walk_block_mut<V: VisitMut + ?Sized>(v: &mut V, block: &mut Block) {
    for stmt in &mut block.stmts {
        v.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Spanned<Stmt>) {
    match &mut stmt.node {
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => v.visit_expr_mut(expr),
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter_mut().chain(rhs.iter_mut()) {
                v.visit_expr_mut(expr);
            }
        }
        Stmt::IncDec { expr, .. } => v.visit_expr_mut(expr),
        Stmt::Send { channel, value } => {
            v.visit_expr_mut(channel);
            v.visit_expr_mut(value);
        }
        Stmt::Decl(decl) => v.visit_decl_mut(decl),
        Stmt::Return(results) => {
            for expr in results {
                v.visit_expr_mut(expr);
            }
        }
        Stmt::Branch { .. } | Stmt::Empty => {}
        Stmt::Block(block) => v.visit_block_mut(block),
        Stmt::If {
            init,
            cond,
            then_branch,
            else_branch,
        } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            v.visit_expr_mut(cond);
            v.visit_block_mut(then_branch);
            if let Some(else_branch) = else_branch {
                v.visit_stmt_mut(else_branch);
            }
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            if let Some(cond) = cond {
                v.visit_expr_mut(cond);
            }
            if let Some(post) = post {
                v.visit_stmt_mut(post);
            }
            v.visit_block_mut(body);
        }
        Stmt::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            for target in key.iter_mut().chain(value.iter_mut()) {
                v.visit_expr_mut(target);
            }
            v.visit_expr_mut(expr);
            v.visit_block_mut(body);
        }
        Stmt::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            if let Some(tag) = tag {
                v.visit_expr_mut(tag);
            }
            for clause in clauses {
                for expr in &mut clause.exprs {
                    v.visit_expr_mut(expr);
                }
                v.visit_block_mut(&mut clause.body);
            }
        }
        Stmt::TypeSwitch {
            init,
            expr,
            clauses,
            ..
        } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            v.visit_expr_mut(expr);
            for clause in clauses {
                for expr in &mut clause.exprs {
                    v.visit_expr_mut(expr);
                }
                v.visit_block_mut(&mut clause.body);
            }
        }
        Stmt::Select { clauses } => {
            for clause in clauses {
                if let Some(comm) = &mut clause.comm {
                    v.visit_stmt_mut(comm);
                }
                v.visit_block_mut(&mut clause.body);
            }
        }
        Stmt::Labeled { stmt, .. } => v.visit_stmt_mut(stmt),
    }
}

pub fn walk_expr_mut<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Spanned<Expr>) {
    match &mut expr.node {
        Expr::Ident(_) | Expr::BasicLit(_) => {}
        Expr::CompositeLit { ty, elts, .. } => {
            if let Some(ty) = ty {
                v.visit_expr_mut(ty);
            }
            for elt in elts {
                v.visit_expr_mut(elt);
            }
        }
        Expr::FuncLit { ty, body } => {
            v.visit_func_type_mut(ty);
            v.visit_block_mut(body);
        }
        Expr::Paren(inner) | Expr::Star(inner) => v.visit_expr_mut(inner),
        Expr::Selector { expr, .. } => v.visit_expr_mut(expr),
        Expr::Index { expr, index } => {
            v.visit_expr_mut(expr);
            v.visit_expr_mut(index);
        }
        Expr::IndexList { expr, indices } => {
            v.visit_expr_mut(expr);
            for index in indices {
                v.visit_expr_mut(index);
            }
        }
        Expr::Slice {
            expr,
            low,
            high,
            max,
            ..
        } => {
            v.visit_expr_mut(expr);
            for bound in [low, high, max].into_iter().flatten() {
                v.visit_expr_mut(bound);
            }
        }
        Expr::TypeAssert { expr, ty } => {
            v.visit_expr_mut(expr);
            if let Some(ty) = ty {
                v.visit_expr_mut(ty);
            }
        }
        Expr::Call { func, args, .. } => {
            v.visit_expr_mut(func);
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        Expr::Unary { expr, .. } => v.visit_expr_mut(expr),
        Expr::Binary { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        Expr::KeyValue { key, value } => {
            v.visit_expr_mut(key);
            v.visit_expr_mut(value);
        }
        Expr::ArrayType { len, elem } => {
            if let Some(len) = len {
                v.visit_expr_mut(len);
            }
            v.visit_expr_mut(elem);
        }
        Expr::Ellipsis(elem) => {
            if let Some(elem) = elem {
                v.visit_expr_mut(elem);
            }
        }
        Expr::MapType { key, value } => {
            v.visit_expr_mut(key);
            v.visit_expr_mut(value);
        }
        Expr::ChanType { elem, .. } => v.visit_expr_mut(elem),
        Expr::FuncType(ty) => v.visit_func_type_mut(ty),
        Expr::StructType { fields, .. } | Expr::InterfaceType { methods: fields, .. } => {
            for field in fields {
                v.visit_field_mut(field);
            }
        }
    }
}

pub fn walk_func_type_mut<V: VisitMut + ?Sized>(v: &mut V, ty: &mut FuncType) {
    for field in ty.fields_mut() {
        v.visit_field_mut(field);
    }
}

pub fn walk_field_mut<V: VisitMut + ?Sized>(v: &mut V, field: &mut Field) {
    v.visit_expr_mut(&mut field.ty);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    struct IdentCounter(usize);

    impl Visit for IdentCounter {
        fn visit_expr(&mut self, expr: &Spanned<Expr>) {
            if matches!(expr.node, Expr::Ident(_)) {
                self.0 += 1;
            }
            walk_expr(self, expr);
        }
    }

    struct Upcase;

    impl VisitMut for Upcase {
        fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
            if let Expr::Ident(name) = &mut expr.node {
                *name = name.to_uppercase();
            }
            walk_expr_mut(self, expr);
        }
    }

    fn ident(name: &str) -> Spanned<Expr> {
        Spanned::new(Expr::ident(name), Span::new(0, 1))
    }

    fn call(func: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
        Spanned::detached(Expr::Call {
            func: Box::new(ident(func)),
            args,
            ellipsis: false,
            parens: Span::DETACHED,
        })
    }

    #[test]
    fn test_visit_reaches_nested_function_literal() {
        let inner = Block::detached(vec![Spanned::detached(Stmt::Expr(call("g", vec![ident("x")])))]);
        let lit = Spanned::detached(Expr::FuncLit {
            ty: FuncType::default(),
            body: inner,
        });
        let outer = call("f", vec![lit]);

        let mut counter = IdentCounter(0);
        counter.visit_expr(&outer);
        assert_eq!(counter.0, 3);
    }

    #[test]
    fn test_visit_mut_rewrites_every_level() {
        let mut expr = call("f", vec![call("g", vec![ident("x")])]);
        Upcase.visit_expr_mut(&mut expr);

        let mut names = Vec::new();
        struct Collect<'a>(&'a mut Vec<String>);
        impl Visit for Collect<'_> {
            fn visit_expr(&mut self, expr: &Spanned<Expr>) {
                if let Expr::Ident(name) = &expr.node {
                    self.0.push(name.clone());
                }
                walk_expr(self, expr);
            }
        }
        Collect(&mut names).visit_expr(&expr);
        assert_eq!(names, vec!["F", "G", "X"]);
    }
}
