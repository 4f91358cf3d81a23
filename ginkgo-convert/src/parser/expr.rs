//! Expressions and type expressions

use super::Parser;
use crate::ast::{BinOp, ChanDir, ElementComment, Expr, Field, Spanned, UnOp};
use crate::error::{ConvertError, Result};
use crate::lexer::Token;

fn binary_op(token: &Token) -> Option<BinOp> {
    Some(match token {
        Token::OrOr => BinOp::OrOr,
        Token::AndAnd => BinOp::AndAnd,
        Token::EqEq => BinOp::Eq,
        Token::NotEq => BinOp::Ne,
        Token::Lt => BinOp::Lt,
        Token::LtEq => BinOp::Le,
        Token::Gt => BinOp::Gt,
        Token::GtEq => BinOp::Ge,
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Pipe => BinOp::Or,
        Token::Caret => BinOp::Xor,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::Percent => BinOp::Rem,
        Token::Shl => BinOp::Shl,
        Token::Shr => BinOp::Shr,
        Token::Amp => BinOp::And,
        Token::AmpCaret => BinOp::AndNot,
        _ => return None,
    })
}

/// Operand forms that may be followed by `{` to form a composite literal
fn is_literal_type(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) | Expr::ArrayType { .. } | Expr::MapType { .. } | Expr::StructType { .. } => {
            true
        }
        Expr::Selector { expr, .. } => matches!(expr.node, Expr::Ident(_)),
        Expr::Index { expr, .. } | Expr::IndexList { expr, .. } => is_type_name(&expr.node),
        _ => false,
    }
}

/// `T`, `pkg.T`, or an instantiation of either
fn is_type_name(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Selector { expr, .. } => matches!(expr.node, Expr::Ident(_)),
        Expr::Index { expr, .. } | Expr::IndexList { expr, .. } => is_type_name(&expr.node),
        _ => false,
    }
}

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<Spanned<Expr>> {
        self.parse_binary(1)
    }

    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Spanned<Expr>>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(&Token::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Spanned<Expr>> {
        let mut left = self.parse_unary()?;
        loop {
            let Some(op) = self.peek().and_then(binary_op) else {
                break;
            };
            if op.precedence() < min_prec {
                break;
            }
            self.bump()?;
            let right = self.parse_binary(op.precedence() + 1)?;
            let span = left.span.merge(right.span);
            left = Spanned::new(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Spanned<Expr>> {
        let start = self.peek_start();
        let op = match self.peek() {
            Some(Token::Plus) => UnOp::Pos,
            Some(Token::Minus) => UnOp::Neg,
            Some(Token::Bang) => UnOp::Not,
            Some(Token::Caret) => UnOp::Xor,
            Some(Token::Amp) => UnOp::Addr,
            Some(Token::Tilde) => UnOp::Tilde,
            Some(Token::Arrow) => {
                if self.peek_nth(1) == Some(&Token::Chan) {
                    let ty = self.parse_type()?;
                    return self.parse_primary_suffixes(ty);
                }
                UnOp::Recv
            }
            Some(Token::Star) => {
                self.bump()?;
                let operand = self.parse_unary()?;
                return Ok(Spanned::new(
                    Expr::Star(Box::new(operand)),
                    self.span_from(start),
                ));
            }
            _ => return self.parse_primary(),
        };
        self.bump()?;
        let operand = self.parse_unary()?;
        Ok(Spanned::new(
            Expr::Unary {
                op,
                expr: Box::new(operand),
            },
            self.span_from(start),
        ))
    }

    fn parse_primary(&mut self) -> Result<Spanned<Expr>> {
        let operand = self.parse_operand()?;
        self.parse_primary_suffixes(operand)
    }

    fn parse_operand(&mut self) -> Result<Spanned<Expr>> {
        let start = self.peek_start();
        match self.peek() {
            Some(Token::Ident(_)) => {
                let name = self.expect_ident()?;
                Ok(name.map(Expr::Ident))
            }
            Some(Token::Number(_)) | Some(Token::Str(_)) | Some(Token::Char(_)) => {
                let (token, span) = self.bump()?;
                let text = match token {
                    Token::Number(text) | Token::Str(text) | Token::Char(text) => text,
                    _ => return Err(ConvertError::parser("expected literal", span)),
                };
                Ok(Spanned::new(Expr::BasicLit(text), span))
            }
            Some(Token::LParen) => {
                self.bump()?;
                self.expr_lev += 1;
                let inner = self.parse_expr()?;
                self.expr_lev -= 1;
                self.expect(&Token::RParen)?;
                Ok(Spanned::new(
                    Expr::Paren(Box::new(inner)),
                    self.span_from(start),
                ))
            }
            Some(Token::Func) => {
                self.bump()?;
                let ty = self.parse_signature()?;
                if self.at(&Token::LBrace) {
                    self.expr_lev += 1;
                    let body = self.parse_body()?;
                    self.expr_lev -= 1;
                    Ok(Spanned::new(Expr::FuncLit { ty, body }, self.span_from(start)))
                } else {
                    Ok(Spanned::new(Expr::FuncType(ty), self.span_from(start)))
                }
            }
            Some(Token::LBracket)
            | Some(Token::Map)
            | Some(Token::Chan)
            | Some(Token::Struct)
            | Some(Token::Interface) => self.parse_type(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_primary_suffixes(&mut self, mut x: Spanned<Expr>) -> Result<Spanned<Expr>> {
        let start = x.span.start;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.bump()?;
                    if self.eat(&Token::LParen) {
                        let ty = if self.eat(&Token::Type) {
                            None
                        } else {
                            Some(Box::new(self.parse_type()?))
                        };
                        self.expect(&Token::RParen)?;
                        x = Spanned::new(
                            Expr::TypeAssert {
                                expr: Box::new(x),
                                ty,
                            },
                            self.span_from(start),
                        );
                    } else {
                        let field = self.expect_ident()?;
                        x = Spanned::new(
                            Expr::Selector {
                                expr: Box::new(x),
                                field: field.node,
                            },
                            self.span_from(start),
                        );
                    }
                }
                Some(Token::LBracket) => {
                    x = self.parse_index_or_slice(x)?;
                }
                Some(Token::LParen) => {
                    x = self.parse_call(x)?;
                }
                Some(Token::LBrace)
                    if is_literal_type(&x.node)
                        && (self.expr_lev >= 0 || !is_type_name(&x.node)) =>
                {
                    x = self.parse_composite_lit(Some(x))?;
                }
                _ => return Ok(x),
            }
        }
    }

    fn parse_index_or_slice(&mut self, x: Spanned<Expr>) -> Result<Spanned<Expr>> {
        let start = x.span.start;
        self.expect(&Token::LBracket)?;
        self.expr_lev += 1;

        let mut bounds: [Option<Box<Spanned<Expr>>>; 3] = [None, None, None];
        let mut colons = 0;
        if !self.at(&Token::Colon) {
            let first = self.parse_expr()?;
            if self.at(&Token::Comma) {
                let mut indices = vec![first];
                while self.eat(&Token::Comma) {
                    if self.at(&Token::RBracket) {
                        break;
                    }
                    indices.push(self.parse_expr()?);
                }
                self.expr_lev -= 1;
                self.expect(&Token::RBracket)?;
                return Ok(Spanned::new(
                    Expr::IndexList {
                        expr: Box::new(x),
                        indices,
                    },
                    self.span_from(start),
                ));
            }
            bounds[0] = Some(Box::new(first));
        }
        while colons < 2 && self.eat(&Token::Colon) {
            colons += 1;
            if !self.at(&Token::Colon) && !self.at(&Token::RBracket) {
                bounds[colons] = Some(Box::new(self.parse_expr()?));
            }
        }

        self.expr_lev -= 1;
        self.expect(&Token::RBracket)?;
        let span = self.span_from(start);

        if colons == 0 {
            let [index, _, _] = bounds;
            let Some(index) = index else {
                return Err(ConvertError::parser("expected operand", span));
            };
            return Ok(Spanned::new(
                Expr::Index {
                    expr: Box::new(x),
                    index,
                },
                span,
            ));
        }

        let [low, high, max] = bounds;
        if colons == 2 && (high.is_none() || max.is_none()) {
            return Err(ConvertError::parser(
                "middle and final index required in 3-index slice",
                span,
            ));
        }
        Ok(Spanned::new(
            Expr::Slice {
                expr: Box::new(x),
                low,
                high,
                max,
                three_index: colons == 2,
            },
            span,
        ))
    }

    fn parse_call(&mut self, func: Spanned<Expr>) -> Result<Spanned<Expr>> {
        let start = func.span.start;
        let open = self.expect(&Token::LParen)?;
        self.expr_lev += 1;
        let mut args = Vec::new();
        let mut ellipsis = false;
        while !self.at(&Token::RParen) {
            args.push(self.parse_expr()?);
            if self.eat(&Token::Ellipsis) {
                ellipsis = true;
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expr_lev -= 1;
        let close = self.expect(&Token::RParen)?;
        Ok(Spanned::new(
            Expr::Call {
                func: Box::new(func),
                args,
                ellipsis,
                parens: open.merge(close),
            },
            self.span_from(start),
        ))
    }

    /// `{ elements }`, with `ty` absent for elided inner literals
    fn parse_composite_lit(&mut self, ty: Option<Spanned<Expr>>) -> Result<Spanned<Expr>> {
        let open = self.expect(&Token::LBrace)?;
        let start = ty.as_ref().map_or(open.start, |ty| ty.span.start);
        self.expr_lev += 1;
        let mut elts = Vec::new();
        let mut comments = Vec::new();
        while !self.at(&Token::RBrace) {
            elts.push(self.parse_element()?);
            if !self.eat(&Token::Comma) {
                break;
            }
            if let Some(comment) = self.take_trailing_line_comment(self.last_end) {
                comments.push(ElementComment {
                    index: elts.len() - 1,
                    comment,
                });
            }
        }
        self.expr_lev -= 1;
        let close = self.expect(&Token::RBrace)?;
        Ok(Spanned::new(
            Expr::CompositeLit {
                ty: ty.map(Box::new),
                elts,
                braces: open.merge(close),
                comments,
            },
            self.span_from(start),
        ))
    }

    fn parse_element(&mut self) -> Result<Spanned<Expr>> {
        let key = self.parse_element_value()?;
        if !self.eat(&Token::Colon) {
            return Ok(key);
        }
        let value = self.parse_element_value()?;
        let span = key.span.merge(value.span);
        Ok(Spanned::new(
            Expr::KeyValue {
                key: Box::new(key),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_element_value(&mut self) -> Result<Spanned<Expr>> {
        if self.at(&Token::LBrace) {
            self.parse_composite_lit(None)
        } else {
            self.parse_expr()
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub(crate) fn parse_type(&mut self) -> Result<Spanned<Expr>> {
        let start = self.peek_start();
        let node = match self.peek() {
            Some(Token::Ident(_)) => {
                let name = self.expect_ident()?;
                let base = if self.at(&Token::Dot)
                    && matches!(self.peek_nth(1), Some(Token::Ident(_)))
                {
                    self.bump()?;
                    let field = self.expect_ident()?;
                    Expr::Selector {
                        expr: Box::new(name.map(Expr::Ident)),
                        field: field.node,
                    }
                } else {
                    Expr::Ident(name.node)
                };
                if self.at(&Token::LBracket) {
                    let base = Spanned::new(base, self.span_from(start));
                    return self.parse_type_args(base);
                }
                base
            }
            Some(Token::Star) => {
                self.bump()?;
                Expr::Star(Box::new(self.parse_type()?))
            }
            Some(Token::LParen) => {
                self.bump()?;
                let inner = self.parse_type()?;
                self.expect(&Token::RParen)?;
                Expr::Paren(Box::new(inner))
            }
            Some(Token::LBracket) => {
                self.bump()?;
                let len = match self.peek() {
                    Some(Token::RBracket) => None,
                    Some(Token::Ellipsis) => {
                        let (_, span) = self.bump()?;
                        Some(Box::new(Spanned::new(Expr::Ellipsis(None), span)))
                    }
                    _ => {
                        self.expr_lev += 1;
                        let len = self.parse_expr()?;
                        self.expr_lev -= 1;
                        Some(Box::new(len))
                    }
                };
                self.expect(&Token::RBracket)?;
                let elem = self.parse_type()?;
                Expr::ArrayType {
                    len,
                    elem: Box::new(elem),
                }
            }
            Some(Token::Map) => {
                self.bump()?;
                self.expect(&Token::LBracket)?;
                let key = self.parse_type()?;
                self.expect(&Token::RBracket)?;
                let value = self.parse_type()?;
                Expr::MapType {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            Some(Token::Chan) => {
                self.bump()?;
                let dir = if self.eat(&Token::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Expr::ChanType {
                    dir,
                    elem: Box::new(self.parse_type()?),
                }
            }
            Some(Token::Arrow) => {
                self.bump()?;
                self.expect(&Token::Chan)?;
                Expr::ChanType {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                }
            }
            Some(Token::Func) => {
                self.bump()?;
                Expr::FuncType(self.parse_signature()?)
            }
            Some(Token::Struct) => {
                self.bump()?;
                let open = self.expect(&Token::LBrace)?;
                let fields = self.parse_struct_fields()?;
                let close = self.expect(&Token::RBrace)?;
                Expr::StructType {
                    fields,
                    braces: open.merge(close),
                }
            }
            Some(Token::Interface) => {
                self.bump()?;
                let open = self.expect(&Token::LBrace)?;
                let methods = self.parse_interface_elems()?;
                let close = self.expect(&Token::RBrace)?;
                Expr::InterfaceType {
                    methods,
                    braces: open.merge(close),
                }
            }
            _ => return Err(self.unexpected("type")),
        };
        Ok(Spanned::new(node, self.span_from(start)))
    }

    /// `Name[A]` or `Name[A, B]`
    fn parse_type_args(&mut self, base: Spanned<Expr>) -> Result<Spanned<Expr>> {
        let start = base.span.start;
        self.expect(&Token::LBracket)?;
        let mut args = vec![self.parse_type()?];
        while self.eat(&Token::Comma) {
            if self.at(&Token::RBracket) {
                break;
            }
            args.push(self.parse_type()?);
        }
        self.expect(&Token::RBracket)?;
        let node = if args.len() == 1 {
            Expr::Index {
                expr: Box::new(base),
                index: Box::new(args.remove(0)),
            }
        } else {
            Expr::IndexList {
                expr: Box::new(base),
                indices: args,
            }
        };
        Ok(Spanned::new(node, self.span_from(start)))
    }

    /// Type constraint: a union of `T` and `~T` terms
    pub(crate) fn parse_constraint(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.parse_constraint_term()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_constraint_term()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(
                Expr::Binary {
                    left: Box::new(left),
                    op: BinOp::Or,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_constraint_term(&mut self) -> Result<Spanned<Expr>> {
        let start = self.peek_start();
        if !self.eat(&Token::Tilde) {
            return self.parse_type();
        }
        let ty = self.parse_type()?;
        Ok(Spanned::new(
            Expr::Unary {
                op: UnOp::Tilde,
                expr: Box::new(ty),
            },
            self.span_from(start),
        ))
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<Field>> {
        let mut fields = Vec::new();
        loop {
            if self.eat(&Token::Semi) {
                continue;
            }
            if self.at(&Token::RBrace) {
                return Ok(fields);
            }
            let embedded = match self.peek() {
                Some(Token::Star) => true,
                Some(Token::Ident(_)) => matches!(
                    self.peek_nth(1),
                    Some(Token::Dot) | Some(Token::Semi) | Some(Token::RBrace) | Some(Token::Str(_))
                ),
                _ => return Err(self.unexpected("field name or embedded type")),
            };
            let mut field = if embedded {
                Field::new(Vec::new(), self.parse_type()?)
            } else {
                let mut names = vec![self.expect_ident()?.node];
                while self.eat(&Token::Comma) {
                    names.push(self.expect_ident()?.node);
                }
                Field::new(names, self.parse_type()?)
            };
            if let Some(Token::Str(_)) = self.peek() {
                if let (Token::Str(tag), _) = self.bump()? {
                    field.tag = Some(tag);
                }
            }
            field.comment = self.take_trailing_comment(self.last_end);
            fields.push(field);
            self.expect_semi()?;
        }
    }

    fn parse_interface_elems(&mut self) -> Result<Vec<Field>> {
        let mut methods = Vec::new();
        loop {
            if self.eat(&Token::Semi) {
                continue;
            }
            if self.at(&Token::RBrace) {
                return Ok(methods);
            }
            if self.at_ident() && self.peek_nth(1) == Some(&Token::LParen) {
                let name = self.expect_ident()?;
                let start = self.peek_start();
                let sig = self.parse_signature()?;
                let ty = Spanned::new(Expr::FuncType(sig), self.span_from(start));
                methods.push(Field::new(vec![name.node], ty));
            } else {
                methods.push(Field::new(Vec::new(), self.parse_constraint()?));
            }
            if let Some(method) = methods.last_mut() {
                method.comment = self.take_trailing_comment(self.last_end);
            }
            self.expect_semi()?;
        }
    }
}

