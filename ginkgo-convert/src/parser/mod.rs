//! Recursive-descent parser for Go source files
//!
//! Covers the language as it appears in test files, type parameters
//! included. Comments are split out of the token stream and attached to the
//! node they precede, or to the node they trail on the same line, so the
//! printer can put them back. A comment buried inside an expression moves
//! above the enclosing statement or declaration.

mod expr;
mod stmt;


use crate::ast::{
    Comment, Decl, Expr, Field, FuncDecl, FuncType, ImportGroup, ImportSpec, Item, LineIndex,
    SourceFile, Span, Spanned, TypeDecl, TypeSpec, ValueDecl, ValueSpec,
};
use crate::error::{ConvertError, Result};
use crate::lexer::Token;

/// Parse tokens into a source file
pub fn parse(source: &str, tokens: Vec<(Token, Span)>) -> Result<SourceFile> {
    Parser::new(source, tokens).parse_file()
}

/// Read just the `package` clause of a file
pub fn parse_package_name(source: &str) -> Result<String> {
    let tokens = crate::lexer::tokenize(source)?;
    let mut significant = tokens.into_iter().filter(|(tok, _)| !tok.is_comment());
    match (significant.next(), significant.next()) {
        (Some((Token::Package, _)), Some((Token::Ident(name), _))) => Ok(name),
        (Some((_, span)), _) => Err(ConvertError::parser("expected package clause", span)),
        (None, _) => Err(ConvertError::parser("empty source file", Span::new(0, 0))),
    }
}

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
    /// End of the last consumed token that was not a semicolon
    last_end: usize,
    /// Below zero inside `if`/`for`/`switch` headers, where `T{` opens a block
    expr_lev: i32,
    comments: Vec<Comment>,
    next_comment: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, tokens: Vec<(Token, Span)>) -> Self {
        let mut comments = Vec::new();
        let mut significant = Vec::with_capacity(tokens.len());
        for (token, span) in tokens {
            match token {
                Token::LineComment(text) | Token::BlockComment(text) => {
                    comments.push(Comment::new(text, span));
                }
                _ => significant.push((token, span)),
            }
        }
        Self {
            source,
            tokens: significant,
            pos: 0,
            last_end: 0,
            expr_lev: 0,
            comments,
            next_comment: 0,
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn at_ident(&self) -> bool {
        matches!(self.peek(), Some(Token::Ident(_)))
    }

    /// Start offset of the next token, or end of input
    fn peek_start(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |(_, span)| span.start)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or(Span::new(self.source.len(), self.source.len()), |(_, span)| *span)
    }

    fn bump(&mut self) -> Result<(Token, Span)> {
        let Some((token, span)) = self.tokens.get(self.pos).cloned() else {
            return Err(self.error("unexpected end of file"));
        };
        self.pos += 1;
        if token != Token::Semi {
            self.last_end = span.end;
        }
        Ok((token, span))
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.pos += 1;
            if *token != Token::Semi {
                self.last_end = self.tokens[self.pos - 1].1.end;
            }
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<Span> {
        if self.at(token) {
            let (_, span) = self.bump()?;
            Ok(span)
        } else {
            Err(self.unexpected(&format!("`{token}`")))
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>> {
        match self.peek() {
            Some(Token::Ident(_)) => {
                let (token, span) = self.bump()?;
                let Token::Ident(name) = token else {
                    return Err(ConvertError::parser("expected identifier", span));
                };
                Ok(Spanned::new(name, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Statement terminator; may be omitted before a closing `)` or `}`.
    fn expect_semi(&mut self) -> Result<()> {
        match self.peek() {
            Some(Token::Semi) => {
                self.pos += 1;
                Ok(())
            }
            Some(Token::RParen) | Some(Token::RBrace) | None => Ok(()),
            _ => Err(self.unexpected("`;` or newline")),
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn error(&self, message: &str) -> ConvertError {
        ConvertError::parser(message, self.current_span())
    }

    fn unexpected(&self, expected: &str) -> ConvertError {
        let found = match self.tokens.get(self.pos) {
            Some((Token::Semi, span)) if span.start == span.end || self.is_newline(*span) => {
                "newline".to_string()
            }
            Some((token, _)) => format!("`{token}`"),
            None => "end of file".to_string(),
        };
        self.error(&format!("expected {expected}, found {found}"))
    }

    fn is_newline(&self, span: Span) -> bool {
        self.source.get(span.start..span.end) == Some("\n")
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// All not yet attached comments starting before `offset`
    fn take_comments_before(&mut self, offset: usize) -> Vec<Comment> {
        let mut taken = Vec::new();
        while let Some(comment) = self.comments.get(self.next_comment) {
            if comment.span.start >= offset {
                break;
            }
            taken.push(comment.clone());
            self.next_comment += 1;
        }
        taken
    }

    /// The next comment when it sits on the same line right after `offset`
    fn take_trailing_comment(&mut self, offset: usize) -> Option<Comment> {
        let comment = self.comments.get(self.next_comment)?;
        let gap = self.source.get(offset..comment.span.start)?;
        if gap.contains('\n') {
            return None;
        }
        self.next_comment += 1;
        Some(comment.clone())
    }

    /// Same as `take_trailing_comment`, for `//` comments only
    fn take_trailing_line_comment(&mut self, offset: usize) -> Option<Comment> {
        let comment = self.comments.get(self.next_comment)?;
        if !comment.text.starts_with("//") {
            return None;
        }
        self.take_trailing_comment(offset)
    }

    fn take_remaining_comments(&mut self) -> Vec<Comment> {
        let rest = self.comments[self.next_comment..].to_vec();
        self.next_comment = self.comments.len();
        rest
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_file(mut self) -> Result<SourceFile> {
        let header = self.take_comments_before(self.peek_start());
        let package_start = self.expect(&Token::Package)?.start;
        let name = self.expect_ident()?;
        let package = Spanned::new(name.node, self.span_from(package_start));
        self.expect_semi()?;

        let mut items = Vec::new();
        while self.peek().is_some() {
            if self.eat(&Token::Semi) {
                continue;
            }
            let mut doc = self.take_comments_before(self.peek_start());
            let mut item = self.parse_top_level_decl()?;
            doc.extend(self.take_comments_before(item.span.end));
            item.doc = doc;
            item.comment = self.take_trailing_comment(item.span.end);
            items.push(item);
            self.expect_semi()?;
        }

        let trailing = self.take_remaining_comments();
        Ok(SourceFile {
            header,
            package,
            items,
            trailing,
            lines: LineIndex::new(self.source),
        })
    }

    fn parse_top_level_decl(&mut self) -> Result<Item> {
        let start = self.peek_start();
        let decl = match self.peek() {
            Some(Token::Import) => Decl::Import(self.parse_import_decl()?),
            Some(Token::Func) => Decl::Func(self.parse_func_decl()?),
            Some(Token::Type) | Some(Token::Var) | Some(Token::Const) => self.parse_gen_decl()?,
            _ => return Err(self.unexpected("declaration")),
        };
        Ok(Item::new(decl, self.span_from(start)))
    }

    fn parse_import_decl(&mut self) -> Result<ImportGroup> {
        self.expect(&Token::Import)?;
        if self.eat(&Token::LParen) {
            let mut specs = Vec::new();
            while !self.at(&Token::RParen) {
                if self.eat(&Token::Semi) {
                    continue;
                }
                specs.push(self.parse_import_spec()?);
                self.expect_semi()?;
            }
            self.expect(&Token::RParen)?;
            Ok(ImportGroup {
                specs,
                parenthesized: true,
            })
        } else {
            Ok(ImportGroup {
                specs: vec![self.parse_import_spec()?],
                parenthesized: false,
            })
        }
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec> {
        let alias = match self.peek() {
            Some(Token::Dot) => {
                self.bump()?;
                Some(".".to_string())
            }
            Some(Token::Ident(_)) => Some(self.expect_ident()?.node),
            _ => None,
        };
        match self.peek() {
            Some(Token::Str(_)) => {
                let (token, span) = self.bump()?;
                let Token::Str(quoted) = token else {
                    return Err(ConvertError::parser("expected import path", span));
                };
                let path = quoted.trim_matches(|c| c == '"' || c == '`').to_string();
                if path.is_empty() {
                    return Err(ConvertError::parser("empty import path", span));
                }
                let comment = self.take_trailing_comment(span.end);
                Ok(ImportSpec {
                    alias,
                    path,
                    comment,
                })
            }
            _ => Err(self.unexpected("import path")),
        }
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        self.expect(&Token::Func)?;
        let recv = if self.at(&Token::LParen) {
            let span = self.current_span();
            let mut fields = self.parse_params()?;
            if fields.len() != 1 {
                return Err(ConvertError::parser("method has multiple receivers", span));
            }
            fields.pop()
        } else {
            None
        };
        let name = self.expect_ident()?;
        let type_params = if self.at(&Token::LBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let ty = self.parse_signature()?;
        let body = if self.at(&Token::LBrace) {
            Some(self.parse_body()?)
        } else {
            None
        };
        Ok(FuncDecl {
            recv,
            name,
            type_params,
            ty,
            body,
        })
    }

    /// `type`, `var` or `const`, single or grouped
    pub(crate) fn parse_gen_decl(&mut self) -> Result<Decl> {
        let (keyword, _) = self.bump()?;
        let grouped = self.eat(&Token::LParen);
        let mut type_specs = Vec::new();
        let mut value_specs = Vec::new();

        loop {
            if grouped {
                if self.eat(&Token::Semi) {
                    continue;
                }
                if self.at(&Token::RParen) {
                    break;
                }
            }
            match keyword {
                Token::Type => type_specs.push(self.parse_type_spec()?),
                _ => value_specs.push(self.parse_value_spec()?),
            }
            if !grouped {
                break;
            }
            let comment = self.take_trailing_comment(self.last_end);
            match keyword {
                Token::Type => {
                    if let Some(spec) = type_specs.last_mut() {
                        spec.comment = comment;
                    }
                }
                _ => {
                    if let Some(spec) = value_specs.last_mut() {
                        spec.comment = comment;
                    }
                }
            }
            self.expect_semi()?;
        }
        if grouped {
            self.expect(&Token::RParen)?;
        }

        Ok(match keyword {
            Token::Type => Decl::Type(TypeDecl {
                specs: type_specs,
                grouped,
            }),
            Token::Var => Decl::Var(ValueDecl {
                specs: value_specs,
                grouped,
            }),
            _ => Decl::Const(ValueDecl {
                specs: value_specs,
                grouped,
            }),
        })
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec> {
        let name = self.expect_ident()?;
        // `type A [N]int` is an array; `type L[T any]` declares parameters
        let type_params = if self.at(&Token::LBracket)
            && matches!(self.peek_nth(1), Some(Token::Ident(_)))
            && matches!(
                self.peek_nth(2),
                Some(Token::Ident(_))
                    | Some(Token::Comma)
                    | Some(Token::Tilde)
                    | Some(Token::Interface)
                    | Some(Token::Func)
                    | Some(Token::Map)
                    | Some(Token::Chan)
                    | Some(Token::Struct)
            ) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let alias = self.eat(&Token::Eq);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name: name.node,
            type_params,
            alias,
            ty,
            comment: None,
        })
    }

    fn parse_value_spec(&mut self) -> Result<ValueSpec> {
        let mut names = vec![self.expect_ident()?.node];
        while self.eat(&Token::Comma) {
            names.push(self.expect_ident()?.node);
        }
        let ty = match self.peek() {
            Some(Token::Eq) | Some(Token::Semi) | Some(Token::RParen) | None => None,
            _ => Some(self.parse_type()?),
        };
        let values = if self.eat(&Token::Eq) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(ValueSpec {
            names,
            ty,
            values,
            comment: None,
        })
    }

    // ------------------------------------------------------------------
    // Signatures
    // ------------------------------------------------------------------

    pub(crate) fn parse_signature(&mut self) -> Result<FuncType> {
        let params = self.parse_params()?;
        let results = if self.at(&Token::LParen) {
            self.parse_params()?
        } else if self.at_type_start() {
            vec![Field::new(Vec::new(), self.parse_type()?)]
        } else {
            Vec::new()
        };
        Ok(FuncType { params, results })
    }

    /// Parenthesized parameter list with Go's name grouping rules
    ///
    /// `(a, b int)` and `(int, string)` are only told apart once the whole
    /// list has been read: if any entry has both a name and a type, bare
    /// identifiers are names sharing the next type.
    fn parse_params(&mut self) -> Result<Vec<Field>> {
        let open = self.expect(&Token::LParen)?;
        let mut entries: Vec<(Option<Spanned<String>>, Option<Spanned<Expr>>)> = Vec::new();

        while !self.at(&Token::RParen) {
            let entry = if self.at_ident() {
                match self.peek_nth(1) {
                    Some(Token::Comma) | Some(Token::RParen) => {
                        (Some(self.expect_ident()?), None)
                    }
                    Some(Token::Dot) => (None, Some(self.parse_type()?)),
                    _ => {
                        let name = self.expect_ident()?;
                        (Some(name), Some(self.parse_param_type()?))
                    }
                }
            } else {
                (None, Some(self.parse_param_type()?))
            };
            entries.push(entry);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        let named = entries
            .iter()
            .any(|(name, ty)| name.is_some() && ty.is_some());
        if !named {
            return Ok(entries
                .into_iter()
                .map(|(name, ty)| {
                    let ty = match (name, ty) {
                        (_, Some(ty)) => ty,
                        (Some(name), None) => name.map(Expr::Ident),
                        (None, None) => Spanned::detached(Expr::ident("_")),
                    };
                    Field::new(Vec::new(), ty)
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending = Vec::new();
        for (name, ty) in entries {
            match (name, ty) {
                (Some(name), None) => pending.push(name.node),
                (Some(name), Some(ty)) => {
                    pending.push(name.node);
                    fields.push(Field::new(std::mem::take(&mut pending), ty));
                }
                (None, _) => {
                    return Err(ConvertError::parser(
                        "mixed named and unnamed parameters",
                        self.span_from(open.start),
                    ));
                }
            }
        }
        if !pending.is_empty() {
            return Err(ConvertError::parser(
                "mixed named and unnamed parameters",
                self.span_from(open.start),
            ));
        }
        Ok(fields)
    }

    /// `[K comparable, V any]`; names sharing a constraint are grouped
    fn parse_type_params(&mut self) -> Result<Vec<Field>> {
        let open = self.expect(&Token::LBracket)?;
        let mut fields = Vec::new();
        let mut pending = Vec::new();
        while !self.at(&Token::RBracket) {
            pending.push(self.expect_ident()?.node);
            if !self.at(&Token::Comma) && !self.at(&Token::RBracket) {
                let constraint = self.parse_constraint()?;
                fields.push(Field::new(std::mem::take(&mut pending), constraint));
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBracket)?;
        if !pending.is_empty() || fields.is_empty() {
            return Err(ConvertError::parser(
                "type parameter without constraint",
                self.span_from(open.start),
            ));
        }
        Ok(fields)
    }

    fn parse_param_type(&mut self) -> Result<Spanned<Expr>> {
        if self.at(&Token::Ellipsis) {
            let start = self.bump()?.1.start;
            let elem = self.parse_type()?;
            return Ok(Spanned::new(
                Expr::Ellipsis(Some(Box::new(elem))),
                self.span_from(start),
            ));
        }
        self.parse_type()
    }

    fn at_type_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Ident(_))
                | Some(Token::Star)
                | Some(Token::LBracket)
                | Some(Token::Map)
                | Some(Token::Chan)
                | Some(Token::Func)
                | Some(Token::Struct)
                | Some(Token::Interface)
                | Some(Token::Arrow)
                | Some(Token::LParen)
        )
    }
}
