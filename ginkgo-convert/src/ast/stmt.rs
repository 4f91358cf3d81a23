//! Statement AST nodes

use super::{Comment, Decl, Expr, Span, Spanned};
use serde::{Deserialize, Serialize};

/// Brace-delimited statement list
///
/// Case clause bodies reuse this type; their span covers the whole clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
    pub comments: Vec<BlockComment>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Spanned<Stmt>>, span: Span) -> Self {
        Self {
            stmts,
            comments: Vec::new(),
            span,
        }
    }

    pub fn detached(stmts: Vec<Spanned<Stmt>>) -> Self {
        Self::new(stmts, Span::DETACHED)
    }
}

/// A comment positioned relative to the statements of a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockComment {
    pub anchor: CommentAnchor,
    pub comment: Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentAnchor {
    /// On its own line(s) before statement `n`
    Before(usize),
    /// At the end of the line of statement `n`
    After(usize),
    /// After the last statement, before the closing brace
    End,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression statement
    Expr(Spanned<Expr>),

    /// `lhs op rhs` for `=`, `:=` and compound assignments
    Assign {
        lhs: Vec<Spanned<Expr>>,
        op: AssignOp,
        rhs: Vec<Spanned<Expr>>,
    },

    /// `x++` / `x--`
    IncDec { expr: Spanned<Expr>, inc: bool },

    /// `ch <- v`
    Send {
        channel: Spanned<Expr>,
        value: Spanned<Expr>,
    },

    /// `var`, `const` or `type` inside a function
    Decl(Decl),

    Go(Spanned<Expr>),
    Defer(Spanned<Expr>),
    Return(Vec<Spanned<Expr>>),

    /// `break`, `continue`, `goto`, `fallthrough`
    Branch {
        kind: BranchKind,
        label: Option<String>,
    },

    Block(Block),

    If {
        init: Option<Box<Spanned<Stmt>>>,
        cond: Spanned<Expr>,
        then_branch: Block,
        /// Either another `If` or a `Block`
        else_branch: Option<Box<Spanned<Stmt>>>,
    },

    /// Three-clause, condition-only and infinite loops
    For {
        init: Option<Box<Spanned<Stmt>>>,
        cond: Option<Spanned<Expr>>,
        post: Option<Box<Spanned<Stmt>>>,
        body: Block,
    },

    /// `for k, v := range x`
    Range {
        key: Option<Spanned<Expr>>,
        value: Option<Spanned<Expr>>,
        define: bool,
        expr: Spanned<Expr>,
        body: Block,
    },

    Switch {
        init: Option<Box<Spanned<Stmt>>>,
        tag: Option<Spanned<Expr>>,
        clauses: Vec<CaseClause>,
    },

    /// `switch v := x.(type)`
    TypeSwitch {
        init: Option<Box<Spanned<Stmt>>>,
        binding: Option<String>,
        /// The `x` of `x.(type)`
        expr: Spanned<Expr>,
        clauses: Vec<CaseClause>,
    },

    Select { clauses: Vec<CommClause> },

    Labeled {
        label: String,
        stmt: Box<Spanned<Stmt>>,
    },

    Empty,
}

/// `case a, b:` or `default:` of a switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseClause {
    /// Empty for `default`
    pub exprs: Vec<Spanned<Expr>>,
    pub body: Block,
}

/// `case v := <-ch:` or `default:` of a select
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommClause {
    /// `None` for `default`
    pub comm: Option<Box<Spanned<Stmt>>>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `op=`
    Compound(super::BinOp),
}

impl std::fmt::Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignOp::Assign => f.write_str("="),
            AssignOp::Define => f.write_str(":="),
            AssignOp::Compound(op) => write!(f, "{op}="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl std::fmt::Display for BranchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        })
    }
}
