//! Statements and blocks

use super::Parser;
use crate::ast::{
    AssignOp, BinOp, Block, BlockComment, BranchKind, CaseClause, CommClause, CommentAnchor,
    Expr, Span, Spanned, Stmt,
};
use crate::error::{ConvertError, Result};
use crate::lexer::Token;

/// Result of a simple statement in a `for` header, where `range` may appear
enum SimpleStmt {
    Stmt(Spanned<Stmt>),
    Range {
        key: Option<Spanned<Expr>>,
        value: Option<Spanned<Expr>>,
        define: bool,
        expr: Spanned<Expr>,
    },
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    Some(match token {
        Token::Eq => AssignOp::Assign,
        Token::ColonEq => AssignOp::Define,
        Token::PlusEq => AssignOp::Compound(BinOp::Add),
        Token::MinusEq => AssignOp::Compound(BinOp::Sub),
        Token::StarEq => AssignOp::Compound(BinOp::Mul),
        Token::SlashEq => AssignOp::Compound(BinOp::Div),
        Token::PercentEq => AssignOp::Compound(BinOp::Rem),
        Token::AmpEq => AssignOp::Compound(BinOp::And),
        Token::PipeEq => AssignOp::Compound(BinOp::Or),
        Token::CaretEq => AssignOp::Compound(BinOp::Xor),
        Token::ShlEq => AssignOp::Compound(BinOp::Shl),
        Token::ShrEq => AssignOp::Compound(BinOp::Shr),
        Token::AmpCaretEq => AssignOp::Compound(BinOp::AndNot),
        _ => return None,
    })
}

impl Parser<'_> {
    /// Function body; composite literals are allowed again inside it
    pub(crate) fn parse_body(&mut self) -> Result<Block> {
        let outer = std::mem::replace(&mut self.expr_lev, 0);
        let block = self.parse_block();
        self.expr_lev = outer;
        block
    }

    pub(crate) fn parse_block(&mut self) -> Result<Block> {
        let open = self.expect(&Token::LBrace)?;
        let (stmts, mut comments) = self.parse_stmt_list()?;
        let close_start = self.peek_start();
        comments.extend(
            self.take_comments_before(close_start)
                .into_iter()
                .map(|comment| BlockComment {
                    anchor: CommentAnchor::End,
                    comment,
                }),
        );
        let close = self.expect(&Token::RBrace)?;
        Ok(Block {
            stmts,
            comments,
            span: open.merge(close),
        })
    }

    /// Statements up to a closing brace or the next case clause
    fn parse_stmt_list(&mut self) -> Result<(Vec<Spanned<Stmt>>, Vec<BlockComment>)> {
        let mut stmts = Vec::new();
        let mut comments = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::RBrace) | Some(Token::Case) | Some(Token::Default) => break,
                Some(Token::Semi) => {
                    self.bump()?;
                    continue;
                }
                _ => {}
            }

            let index = stmts.len();
            let leading = self.take_comments_before(self.peek_start());
            comments.extend(leading.into_iter().map(|comment| BlockComment {
                anchor: CommentAnchor::Before(index),
                comment,
            }));

            let stmt = self.parse_stmt()?;
            // Comments buried inside an expression move above the statement
            let inner = self.take_comments_before(stmt.span.end);
            comments.extend(inner.into_iter().map(|comment| BlockComment {
                anchor: CommentAnchor::Before(index),
                comment,
            }));
            if let Some(comment) = self.take_trailing_comment(stmt.span.end) {
                comments.push(BlockComment {
                    anchor: CommentAnchor::After(index),
                    comment,
                });
            }
            stmts.push(stmt);

            match self.peek() {
                Some(Token::Case) | Some(Token::Default) => {}
                _ => self.expect_semi()?,
            }
        }
        Ok((stmts, comments))
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.peek_start();
        let stmt = match self.peek() {
            Some(Token::Var) | Some(Token::Const) | Some(Token::Type) => {
                Stmt::Decl(self.parse_gen_decl()?)
            }
            Some(Token::Ident(_)) if self.peek_nth(1) == Some(&Token::Colon) => {
                let label = self.expect_ident()?.node;
                self.expect(&Token::Colon)?;
                let inner = match self.peek() {
                    Some(Token::RBrace) => Spanned::new(Stmt::Empty, self.span_from(start)),
                    _ => self.parse_stmt()?,
                };
                Stmt::Labeled {
                    label,
                    stmt: Box::new(inner),
                }
            }
            Some(Token::Go) => {
                self.bump()?;
                Stmt::Go(self.parse_expr()?)
            }
            Some(Token::Defer) => {
                self.bump()?;
                Stmt::Defer(self.parse_expr()?)
            }
            Some(Token::Return) => {
                self.bump()?;
                match self.peek() {
                    Some(Token::Semi) | Some(Token::RBrace) | None => Stmt::Return(Vec::new()),
                    _ => Stmt::Return(self.parse_expr_list()?),
                }
            }
            Some(Token::Break) | Some(Token::Continue) | Some(Token::Goto) => {
                let (token, _) = self.bump()?;
                let kind = match token {
                    Token::Break => BranchKind::Break,
                    Token::Continue => BranchKind::Continue,
                    _ => BranchKind::Goto,
                };
                let label = if self.at_ident() {
                    Some(self.expect_ident()?.node)
                } else {
                    None
                };
                Stmt::Branch { kind, label }
            }
            Some(Token::Fallthrough) => {
                self.bump()?;
                Stmt::Branch {
                    kind: BranchKind::Fallthrough,
                    label: None,
                }
            }
            Some(Token::LBrace) => Stmt::Block(self.parse_block()?),
            Some(Token::If) => return self.parse_if(),
            Some(Token::For) => return self.parse_for(),
            Some(Token::Switch) => return self.parse_switch(),
            Some(Token::Select) => return self.parse_select(),
            _ => return self.parse_simple_stmt(),
        };
        Ok(Spanned::new(stmt, self.span_from(start)))
    }

    fn parse_simple_stmt(&mut self) -> Result<Spanned<Stmt>> {
        match self.parse_simple_or_range(false)? {
            SimpleStmt::Stmt(stmt) => Ok(stmt),
            SimpleStmt::Range { expr, .. } => {
                Err(ConvertError::parser("unexpected range clause", expr.span))
            }
        }
    }

    fn parse_simple_or_range(&mut self, range_ok: bool) -> Result<SimpleStmt> {
        let start = self.peek_start();
        if range_ok && self.eat(&Token::Range) {
            let expr = self.parse_expr()?;
            return Ok(SimpleStmt::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let mut lhs = self.parse_expr_list()?;
        let stmt = if let Some(op) = self.peek().and_then(assign_op) {
            self.bump()?;
            if range_ok && !matches!(op, AssignOp::Compound(_)) && self.eat(&Token::Range) {
                let expr = self.parse_expr()?;
                if lhs.len() > 2 {
                    return Err(ConvertError::parser(
                        "range clause permits at most two iteration variables",
                        self.span_from(start),
                    ));
                }
                let mut vars = lhs.into_iter();
                return Ok(SimpleStmt::Range {
                    key: vars.next(),
                    value: vars.next(),
                    define: op == AssignOp::Define,
                    expr,
                });
            }
            let rhs = self.parse_expr_list()?;
            Stmt::Assign { lhs, op, rhs }
        } else {
            match self.peek() {
                Some(Token::Inc) | Some(Token::Dec) => {
                    let (token, _) = self.bump()?;
                    let expr = self.single(&mut lhs, start)?;
                    Stmt::IncDec {
                        expr,
                        inc: token == Token::Inc,
                    }
                }
                Some(Token::Arrow) => {
                    self.bump()?;
                    let channel = self.single(&mut lhs, start)?;
                    let value = self.parse_expr()?;
                    Stmt::Send { channel, value }
                }
                _ => Stmt::Expr(self.single(&mut lhs, start)?),
            }
        };
        Ok(SimpleStmt::Stmt(Spanned::new(stmt, self.span_from(start))))
    }

    fn single(&self, exprs: &mut Vec<Spanned<Expr>>, start: usize) -> Result<Spanned<Expr>> {
        if exprs.len() != 1 {
            return Err(ConvertError::parser(
                "expected 1 expression",
                self.span_from(start),
            ));
        }
        exprs
            .pop()
            .ok_or_else(|| ConvertError::parser("expected expression", self.span_from(start)))
    }

    fn parse_if(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(&Token::If)?.start;
        let outer = std::mem::replace(&mut self.expr_lev, -1);

        let header = if self.at(&Token::Semi) {
            None
        } else {
            Some(self.parse_simple_stmt()?)
        };
        let (init, cond) = if self.eat(&Token::Semi) {
            (header, self.parse_expr()?)
        } else {
            match header {
                Some(Spanned {
                    node: Stmt::Expr(cond),
                    ..
                }) => (None, cond),
                _ => {
                    self.expr_lev = outer;
                    return Err(self.unexpected("condition in if statement"));
                }
            }
        };
        self.expr_lev = outer;

        let then_branch = self.parse_block()?;
        let else_branch = if self.eat(&Token::Else) {
            match self.peek() {
                Some(Token::If) => Some(Box::new(self.parse_if()?)),
                Some(Token::LBrace) => {
                    let block_start = self.peek_start();
                    let block = self.parse_block()?;
                    Some(Box::new(Spanned::new(
                        Stmt::Block(block),
                        self.span_from(block_start),
                    )))
                }
                _ => return Err(self.unexpected("`if` or block after else")),
            }
        } else {
            None
        };

        Ok(Spanned::new(
            Stmt::If {
                init: init.map(Box::new),
                cond,
                then_branch,
                else_branch,
            },
            self.span_from(start),
        ))
    }

    fn parse_for(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(&Token::For)?.start;
        let outer = std::mem::replace(&mut self.expr_lev, -1);

        let mut init = None;
        let mut cond = None;
        let mut post = None;
        let mut range = None;

        if !self.at(&Token::LBrace) {
            let first = if self.at(&Token::Semi) {
                None
            } else {
                Some(self.parse_simple_or_range(true)?)
            };
            match first {
                Some(SimpleStmt::Range {
                    key,
                    value,
                    define,
                    expr,
                }) => range = Some((key, value, define, expr)),
                first => {
                    let first = first.map(|simple| match simple {
                        SimpleStmt::Stmt(stmt) => Ok(stmt),
                        SimpleStmt::Range { expr, .. } => {
                            Err(ConvertError::parser("unexpected range clause", expr.span))
                        }
                    });
                    let first = first.transpose()?;
                    if self.eat(&Token::Semi) {
                        init = first;
                        if !self.at(&Token::Semi) {
                            cond = Some(self.parse_expr()?);
                        }
                        self.expect(&Token::Semi)?;
                        if !self.at(&Token::LBrace) {
                            post = Some(self.parse_simple_stmt()?);
                        }
                    } else {
                        match first {
                            Some(Spanned {
                                node: Stmt::Expr(expr),
                                ..
                            }) => cond = Some(expr),
                            _ => {
                                self.expr_lev = outer;
                                return Err(self.unexpected("for loop condition"));
                            }
                        }
                    }
                }
            }
        }
        self.expr_lev = outer;

        let body = self.parse_block()?;
        let stmt = match range {
            Some((key, value, define, expr)) => Stmt::Range {
                key,
                value,
                define,
                expr,
                body,
            },
            None => Stmt::For {
                init: init.map(Box::new),
                cond,
                post: post.map(Box::new),
                body,
            },
        };
        Ok(Spanned::new(stmt, self.span_from(start)))
    }

    fn parse_switch(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(&Token::Switch)?.start;
        let outer = std::mem::replace(&mut self.expr_lev, -1);

        let mut init = None;
        let mut header = None;
        if !self.at(&Token::LBrace) {
            if !self.at(&Token::Semi) {
                header = Some(self.parse_simple_stmt()?);
            }
            if self.eat(&Token::Semi) {
                init = header.take();
                if !self.at(&Token::LBrace) {
                    header = Some(self.parse_simple_stmt()?);
                }
            }
        }
        self.expr_lev = outer;

        let type_switch = match header.as_ref().map(|stmt| &stmt.node) {
            Some(Stmt::Assign {
                lhs,
                op: AssignOp::Define,
                rhs,
            }) => lhs.len() == 1 && rhs.len() == 1 && is_type_switch_guard(&rhs[0].node),
            Some(Stmt::Expr(expr)) => is_type_switch_guard(&expr.node),
            _ => false,
        };

        self.expect(&Token::LBrace)?;
        let mut clauses = Vec::new();
        while !self.at(&Token::RBrace) {
            clauses.push(self.parse_case_clause()?);
        }
        self.expect(&Token::RBrace)?;

        let init = init.map(Box::new);
        let stmt = if type_switch {
            let (binding, guard) = match header.map(|stmt| stmt.node) {
                Some(Stmt::Assign { mut lhs, mut rhs, .. }) => {
                    let binding = match lhs.pop().map(|expr| expr.node) {
                        Some(Expr::Ident(name)) => Some(name),
                        _ => {
                            return Err(ConvertError::parser(
                                "type switch binding must be an identifier",
                                self.span_from(start),
                            ));
                        }
                    };
                    (binding, rhs.pop())
                }
                Some(Stmt::Expr(expr)) => (None, Some(expr)),
                _ => (None, None),
            };
            let expr = match guard.map(|guard| guard.node) {
                Some(Expr::TypeAssert { expr, .. }) => *expr,
                _ => {
                    return Err(ConvertError::parser(
                        "malformed type switch guard",
                        self.span_from(start),
                    ));
                }
            };
            Stmt::TypeSwitch {
                init,
                binding,
                expr,
                clauses,
            }
        } else {
            let tag = match header.map(|stmt| stmt.node) {
                None => None,
                Some(Stmt::Expr(expr)) => Some(expr),
                Some(_) => {
                    return Err(ConvertError::parser(
                        "switch expression must be an expression",
                        self.span_from(start),
                    ));
                }
            };
            Stmt::Switch { init, tag, clauses }
        };
        Ok(Spanned::new(stmt, self.span_from(start)))
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause> {
        let start = self.peek_start();
        let exprs = match self.peek() {
            Some(Token::Case) => {
                self.bump()?;
                self.parse_expr_list()?
            }
            Some(Token::Default) => {
                self.bump()?;
                Vec::new()
            }
            _ => return Err(self.unexpected("`case` or `default`")),
        };
        self.expect(&Token::Colon)?;
        let body = self.parse_clause_body(start)?;
        Ok(CaseClause { exprs, body })
    }

    fn parse_select(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(&Token::Select)?.start;
        self.expect(&Token::LBrace)?;
        let mut clauses = Vec::new();
        while !self.at(&Token::RBrace) {
            let clause_start = self.peek_start();
            let comm = match self.peek() {
                Some(Token::Case) => {
                    self.bump()?;
                    Some(Box::new(self.parse_simple_stmt()?))
                }
                Some(Token::Default) => {
                    self.bump()?;
                    None
                }
                _ => return Err(self.unexpected("`case` or `default`")),
            };
            self.expect(&Token::Colon)?;
            let body = self.parse_clause_body(clause_start)?;
            clauses.push(CommClause { comm, body });
        }
        self.expect(&Token::RBrace)?;
        Ok(Spanned::new(Stmt::Select { clauses }, self.span_from(start)))
    }

    /// Statements of a case clause; the block span covers the whole clause
    fn parse_clause_body(&mut self, start: usize) -> Result<Block> {
        let (stmts, mut comments) = self.parse_stmt_list()?;
        if matches!(self.peek(), Some(Token::RBrace)) {
            let close_start = self.peek_start();
            comments.extend(
                self.take_comments_before(close_start)
                    .into_iter()
                    .map(|comment| BlockComment {
                        anchor: CommentAnchor::End,
                        comment,
                    }),
            );
        }
        Ok(Block {
            stmts,
            comments,
            span: Span::new(start, self.last_end.max(start)),
        })
    }
}

fn is_type_switch_guard(expr: &Expr) -> bool {
    matches!(expr, Expr::TypeAssert { ty: None, .. })
}
