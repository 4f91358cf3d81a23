//! The `func init()` holding the converted tests

use crate::ast::{
    Block, BlockComment, Comment, CommentAnchor, Decl, Expr, FuncDecl, FuncType, Item, Span,
    Spanned, Stmt,
};
use crate::config::Conventions;

/// Collects `It` leaves and assembles them into
/// `func init() { Describe("...", func() { ... }) }`
pub struct SpecBlockBuilder<'a> {
    conventions: &'a Conventions,
    leaves: Vec<Spanned<Stmt>>,
    comments: Vec<BlockComment>,
}

impl<'a> SpecBlockBuilder<'a> {
    pub fn new(conventions: &'a Conventions) -> Self {
        Self {
            conventions,
            leaves: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Appends `It("<name>", func() { <body> })`; the test's doc comment is
    /// kept above the leaf and a comment trailing the test after it.
    pub fn add_leaf(
        &mut self,
        name: &str,
        doc: Vec<Comment>,
        trailing: Option<Comment>,
        body: Block,
    ) {
        let index = self.leaves.len();
        self.comments.extend(doc.into_iter().map(|comment| BlockComment {
            anchor: CommentAnchor::Before(index),
            comment,
        }));
        self.comments.extend(trailing.map(|comment| BlockComment {
            anchor: CommentAnchor::After(index),
            comment,
        }));
        let leaf = labeled_call(&self.conventions.leaf_func, name, body);
        self.leaves.push(Spanned::detached(Stmt::Expr(Spanned::detached(leaf))));
    }

    pub fn build(self) -> Item {
        let container_body = Block {
            stmts: self.leaves,
            comments: self.comments,
            span: Span::DETACHED,
        };
        let container = labeled_call(
            &self.conventions.container_func,
            &self.conventions.container_label,
            container_body,
        );
        let init = FuncDecl {
            recv: None,
            name: Spanned::detached(self.conventions.init_func.clone()),
            type_params: Vec::new(),
            ty: FuncType::default(),
            body: Some(Block::detached(vec![Spanned::detached(Stmt::Expr(
                Spanned::detached(container),
            ))])),
        };
        Item::new(Decl::Func(init), Span::DETACHED)
    }
}

/// `func_name("label", func() { body })`
fn labeled_call(func_name: &str, label: &str, body: Block) -> Expr {
    let callback = Expr::FuncLit {
        ty: FuncType::default(),
        body,
    };
    Expr::Call {
        func: Box::new(Spanned::detached(Expr::ident(func_name))),
        args: vec![
            Spanned::detached(Expr::string_lit(label)),
            Spanned::detached(callback),
        ],
        ellipsis: false,
        parens: Span::DETACHED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::printer::print_file;

    fn print_with(item: Item) -> String {
        let source = "package foo\n";
        let mut file = parse(source, tokenize(source).expect("tokenize")).expect("parse");
        file.items.push(item);
        print_file(&file)
    }

    fn call_stmt(name: &str) -> Spanned<Stmt> {
        Spanned::detached(Stmt::Expr(Spanned::detached(Expr::call0(Expr::ident(name)))))
    }

    #[test]
    fn test_empty_container() {
        let conventions = Conventions::default();
        let builder = SpecBlockBuilder::new(&conventions);
        assert!(builder.is_empty());
        assert_eq!(
            print_with(builder.build()),
            "package foo\n\nfunc init() {\n\tDescribe(\"Testing with ginkgo\", func() {})\n}\n"
        );
    }

    #[test]
    fn test_leaves_in_order() {
        let conventions = Conventions::default();
        let mut builder = SpecBlockBuilder::new(&conventions);
        builder.add_leaf(
            "TestOne",
            Vec::new(),
            Some(Comment::new("// flaky", Span::DETACHED)),
            Block::detached(vec![call_stmt("one")]),
        );
        builder.add_leaf(
            "TestTwo",
            vec![Comment::new("// second", Span::DETACHED)],
            None,
            Block::detached(vec![call_stmt("two")]),
        );
        assert_eq!(builder.len(), 2);

        assert_eq!(
            print_with(builder.build()),
            "package foo\n\nfunc init() {\n\tDescribe(\"Testing with ginkgo\", func() {\n\t\tIt(\"TestOne\", func() {\n\t\t\tone()\n\t\t}) // flaky\n\t\t// second\n\t\tIt(\"TestTwo\", func() {\n\t\t\ttwo()\n\t\t})\n\t})\n}\n"
        );
    }
}
