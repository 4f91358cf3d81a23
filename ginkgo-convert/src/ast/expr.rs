//! Expression AST nodes
//!
//! Go uses the same syntax for types and expressions in many positions
//! (conversions, composite literal types, `*T` vs `*p`), so type expressions
//! are variants of [`Expr`] as well.

use super::{Block, Comment, Field, FuncType, Span, Spanned};
use serde::{Deserialize, Serialize};

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// Identifier reference
    Ident(String),

    /// Literal, verbatim source text
    BasicLit(String),

    /// `T{a, b}`, `T{k: v}`, or `{...}` with an elided type
    CompositeLit {
        ty: Option<Box<Spanned<Expr>>>,
        elts: Vec<Spanned<Expr>>,
        /// From `{` to `}`
        braces: Span,
        /// Line comments ending element lines
        comments: Vec<ElementComment>,
    },

    /// `func(params) results { body }`
    FuncLit { ty: FuncType, body: Block },

    /// `(x)`
    Paren(Box<Spanned<Expr>>),

    /// `x.field`
    Selector {
        expr: Box<Spanned<Expr>>,
        field: String,
    },

    /// `x[i]`
    Index {
        expr: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },

    /// `F[A, B]`, an instantiation with several type arguments
    IndexList {
        expr: Box<Spanned<Expr>>,
        indices: Vec<Spanned<Expr>>,
    },

    /// `x[lo:hi]` or `x[lo:hi:max]`
    Slice {
        expr: Box<Spanned<Expr>>,
        low: Option<Box<Spanned<Expr>>>,
        high: Option<Box<Spanned<Expr>>>,
        max: Option<Box<Spanned<Expr>>>,
        three_index: bool,
    },

    /// `x.(T)`; `ty` is `None` for `x.(type)` in type switches
    TypeAssert {
        expr: Box<Spanned<Expr>>,
        ty: Option<Box<Spanned<Expr>>>,
    },

    /// `f(args)` or `f(args...)`
    Call {
        func: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
        ellipsis: bool,
        /// From `(` to `)`
        parens: Span,
    },

    /// `*x`, both pointer type and dereference
    Star(Box<Spanned<Expr>>),

    /// Unary operation
    Unary { op: UnOp, expr: Box<Spanned<Expr>> },

    /// Binary operation
    Binary {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },

    /// `key: value` inside a composite literal
    KeyValue {
        key: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },

    /// `[]T`, `[N]T`, or `[...]T` (length is an `Ellipsis`)
    ArrayType {
        len: Option<Box<Spanned<Expr>>>,
        elem: Box<Spanned<Expr>>,
    },

    /// `...T` in a parameter list, or bare `...` as an array length
    Ellipsis(Option<Box<Spanned<Expr>>>),

    /// `map[K]V`
    MapType {
        key: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },

    /// `chan T`, `<-chan T`, `chan<- T`
    ChanType { dir: ChanDir, elem: Box<Spanned<Expr>> },

    /// `func(params) results`
    FuncType(FuncType),

    /// `struct { fields }`
    StructType { fields: Vec<Field>, braces: Span },

    /// `interface { methods }`; methods are fields whose type is a `FuncType`
    InterfaceType { methods: Vec<Field>, braces: Span },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    /// `pkg.Name`, or just `Name` when the package is dot-imported
    pub fn qualified(qualifier: Option<&str>, name: &str) -> Self {
        match qualifier {
            Some(pkg) => Expr::Selector {
                expr: Box::new(Spanned::detached(Expr::ident(pkg))),
                field: name.to_string(),
            },
            None => Expr::ident(name),
        }
    }

    /// Zero-argument call of `func`
    pub fn call0(func: Expr) -> Self {
        Expr::Call {
            func: Box::new(Spanned::detached(func)),
            args: Vec::new(),
            ellipsis: false,
            parens: Span::DETACHED,
        }
    }

    /// String literal with Go quoting
    pub fn string_lit(value: &str) -> Self {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        for c in value.chars() {
            match c {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\n' => quoted.push_str("\\n"),
                '\t' => quoted.push_str("\\t"),
                _ => quoted.push(c),
            }
        }
        quoted.push('"');
        Expr::BasicLit(quoted)
    }

    /// Matches `pkg.Name` exactly
    pub fn is_qualified(&self, pkg: &str, name: &str) -> bool {
        match self {
            Expr::Selector { expr, field } => {
                field == name && matches!(&expr.node, Expr::Ident(p) if p == pkg)
            }
            _ => false,
        }
    }
}

/// `// ...` after the comma of element `index`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementComment {
    pub index: usize,
    pub comment: Comment,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// `+`
    Pos,
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `^`
    Xor,
    /// `&`
    Addr,
    /// `<-`
    Recv,
    /// `~`
    Tilde,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnOp::Pos => "+",
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::Xor => "^",
            UnOp::Addr => "&",
            UnOp::Recv => "<-",
            UnOp::Tilde => "~",
        })
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    OrOr,
    AndAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinOp {
    /// Go operator precedence, 5 binds tightest
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::OrOr => 1,
            BinOp::AndAnd => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::Add | BinOp::Sub | BinOp::Or | BinOp::Xor => 4,
            BinOp::Mul
            | BinOp::Div
            | BinOp::Rem
            | BinOp::Shl
            | BinOp::Shr
            | BinOp::And
            | BinOp::AndNot => 5,
        }
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinOp::OrOr => "||",
            BinOp::AndAnd => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::And => "&",
            BinOp::AndNot => "&^",
        })
    }
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}
