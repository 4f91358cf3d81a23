//! Statements and blocks

use super::{Printer, tabs};
use crate::ast::{Block, BlockComment, CaseClause, CommentAnchor, Expr, Spanned, Stmt};

/// Longest function body kept on one line
const MAX_ONE_LINE_BODY: usize = 100;

impl Printer<'_> {
    /// `{ ... }` with statements one level deeper than `indent`
    pub(crate) fn block(&self, block: &Block, indent: usize) -> String {
        if block.stmts.is_empty() && block.comments.is_empty() {
            return if block.span.is_detached()
                || self.same_line(block.span.start, block.span.end.saturating_sub(1))
            {
                "{}".to_string()
            } else {
                format!("{{\n{}}}", tabs(indent))
            };
        }
        format!(
            "{{\n{}{}}}",
            self.stmt_list(&block.stmts, &block.comments, indent + 1),
            tabs(indent)
        )
    }

    /// Function bodies written on one line stay on one line
    pub(crate) fn func_body(&self, block: &Block, indent: usize) -> String {
        let one_line = !block.span.is_detached()
            && block.comments.is_empty()
            && self.same_line(block.span.start, block.span.end.saturating_sub(1));
        if one_line {
            if block.stmts.is_empty() {
                return "{}".to_string();
            }
            let joined = block
                .stmts
                .iter()
                .map(|stmt| self.stmt(stmt, indent + 1))
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.contains('\n') && joined.len() <= MAX_ONE_LINE_BODY {
                return format!("{{ {joined} }}");
            }
        }
        self.block(block, indent)
    }

    /// One line per statement at `indent`, each ending in a newline
    fn stmt_list(
        &self,
        stmts: &[Spanned<Stmt>],
        comments: &[BlockComment],
        indent: usize,
    ) -> String {
        let mut out = String::new();
        let mut prev_end: Option<usize> = None;

        for (i, stmt) in stmts.iter().enumerate() {
            let leading: Vec<_> = comments
                .iter()
                .filter(|c| c.anchor == CommentAnchor::Before(i))
                .map(|c| &c.comment)
                .collect();
            let start = leading.first().map_or(stmt.span.start, |c| c.span.start);
            if prev_end.is_some_and(|end| self.blank_between(end, start)) {
                out.push('\n');
            }

            let mut cursor: Option<usize> = None;
            for comment in &leading {
                if cursor.is_some_and(|end| self.blank_between(end, comment.span.start)) {
                    out.push('\n');
                }
                out.push_str(&tabs(indent));
                out.push_str(&comment.text);
                out.push('\n');
                cursor = Some(comment.span.end);
            }
            if cursor.is_some_and(|end| self.blank_between(end, stmt.span.start)) {
                out.push('\n');
            }

            match &stmt.node {
                Stmt::Labeled { label, stmt: inner } => {
                    // Labels sit one level left of the statement they name
                    out.push_str(&tabs(indent.saturating_sub(1)));
                    out.push_str(label);
                    out.push(':');
                    if !matches!(inner.node, Stmt::Empty) {
                        out.push('\n');
                        out.push_str(&tabs(indent));
                        out.push_str(&self.stmt(inner, indent));
                    }
                }
                _ => {
                    out.push_str(&tabs(indent));
                    out.push_str(&self.stmt(stmt, indent));
                }
            }

            let mut end = stmt.span.end;
            for trailing in comments.iter().filter(|c| c.anchor == CommentAnchor::After(i)) {
                out.push(' ');
                out.push_str(&trailing.comment.text);
                end = trailing.comment.span.end;
            }
            out.push('\n');
            prev_end = Some(end);
        }

        let mut cursor = prev_end;
        for comment in comments.iter().filter(|c| c.anchor == CommentAnchor::End) {
            if cursor.is_some_and(|end| self.blank_between(end, comment.comment.span.start)) {
                out.push('\n');
            }
            out.push_str(&tabs(indent));
            out.push_str(&comment.comment.text);
            out.push('\n');
            cursor = Some(comment.comment.span.end);
        }
        out
    }

    fn list(&self, exprs: &[Spanned<Expr>], depth: usize, indent: usize) -> String {
        exprs
            .iter()
            .map(|expr| self.expr0(expr, depth, indent))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Statement text starting at the current column, without a newline
    pub(crate) fn stmt(&self, stmt: &Spanned<Stmt>, indent: usize) -> String {
        match &stmt.node {
            Stmt::Expr(expr) => self.expr0(expr, 1, indent),
            Stmt::Assign { lhs, op, rhs } => {
                let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
                format!(
                    "{} {op} {}",
                    self.list(lhs, depth, indent),
                    self.list(rhs, depth, indent)
                )
            }
            Stmt::IncDec { expr, inc } => {
                let op = if *inc { "++" } else { "--" };
                format!("{}{op}", self.expr0(expr, 2, indent))
            }
            Stmt::Send { channel, value } => format!(
                "{} <- {}",
                self.expr0(channel, 1, indent),
                self.expr0(value, 1, indent)
            ),
            Stmt::Decl(decl) => self.decl(decl, indent),
            Stmt::Go(call) => format!("go {}", self.expr(call, indent)),
            Stmt::Defer(call) => format!("defer {}", self.expr(call, indent)),
            Stmt::Return(results) if results.is_empty() => "return".to_string(),
            Stmt::Return(results) => format!("return {}", self.list(results, 1, indent)),
            Stmt::Branch { kind, label } => match label {
                Some(label) => format!("{kind} {label}"),
                None => kind.to_string(),
            },
            Stmt::Block(block) => self.block(block, indent),
            Stmt::If {
                init,
                cond,
                then_branch,
                else_branch,
            } => {
                let mut out = String::from("if ");
                if let Some(init) = init {
                    out.push_str(&self.stmt(init, indent));
                    out.push_str("; ");
                }
                out.push_str(&self.expr(cond, indent));
                out.push(' ');
                out.push_str(&self.block(then_branch, indent));
                if let Some(else_branch) = else_branch {
                    out.push_str(" else ");
                    out.push_str(&self.stmt(else_branch, indent));
                }
                out
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                let header = if init.is_none() && post.is_none() {
                    match cond {
                        Some(cond) => format!("for {} ", self.expr(cond, indent)),
                        None => "for ".to_string(),
                    }
                } else {
                    let init = init.as_ref().map(|s| self.stmt(s, indent)).unwrap_or_default();
                    let cond = cond.as_ref().map(|c| self.expr(c, indent)).unwrap_or_default();
                    let post = post.as_ref().map(|s| self.stmt(s, indent)).unwrap_or_default();
                    let mut header = format!("for {init}; {cond}; ");
                    if !post.is_empty() {
                        header.push_str(&post);
                        header.push(' ');
                    }
                    header
                };
                format!("{header}{}", self.block(body, indent))
            }
            Stmt::Range {
                key,
                value,
                define,
                expr,
                body,
            } => {
                let mut out = String::from("for ");
                if let Some(key) = key {
                    out.push_str(&self.expr(key, indent));
                    if let Some(value) = value {
                        out.push_str(", ");
                        out.push_str(&self.expr(value, indent));
                    }
                    out.push_str(if *define { " := " } else { " = " });
                }
                out.push_str("range ");
                out.push_str(&self.expr(expr, indent));
                out.push(' ');
                out.push_str(&self.block(body, indent));
                out
            }
            Stmt::Switch { init, tag, clauses } => {
                let mut out = String::from("switch ");
                if let Some(init) = init {
                    out.push_str(&self.stmt(init, indent));
                    out.push_str("; ");
                }
                if let Some(tag) = tag {
                    out.push_str(&self.expr(tag, indent));
                    out.push(' ');
                }
                out.push_str(&self.case_clauses(clauses, indent));
                out
            }
            Stmt::TypeSwitch {
                init,
                binding,
                expr,
                clauses,
            } => {
                let mut out = String::from("switch ");
                if let Some(init) = init {
                    out.push_str(&self.stmt(init, indent));
                    out.push_str("; ");
                }
                if let Some(binding) = binding {
                    out.push_str(binding);
                    out.push_str(" := ");
                }
                out.push_str(&self.expr(expr, indent));
                out.push_str(".(type) ");
                out.push_str(&self.case_clauses(clauses, indent));
                out
            }
            Stmt::Select { clauses } => {
                let mut out = String::from("select {\n");
                let mut prev_end: Option<usize> = None;
                for clause in clauses {
                    if prev_end.is_some_and(|end| self.blank_between(end, clause.body.span.start)) {
                        out.push('\n');
                    }
                    out.push_str(&tabs(indent));
                    match &clause.comm {
                        Some(comm) => {
                            out.push_str("case ");
                            out.push_str(&self.stmt(comm, indent));
                            out.push(':');
                        }
                        None => out.push_str("default:"),
                    }
                    out.push('\n');
                    out.push_str(&self.stmt_list(
                        &clause.body.stmts,
                        &clause.body.comments,
                        indent + 1,
                    ));
                    prev_end = Some(clause.body.span.end);
                }
                out.push_str(&tabs(indent));
                out.push('}');
                out
            }
            Stmt::Labeled { label, stmt } => match stmt.node {
                Stmt::Empty => format!("{label}:"),
                _ => format!("{label}: {}", self.stmt(stmt, indent)),
            },
            Stmt::Empty => String::new(),
        }
    }

    /// `{ case ...: ... }` of a switch, with clauses at the switch's level
    fn case_clauses(&self, clauses: &[CaseClause], indent: usize) -> String {
        let mut out = String::from("{\n");
        let mut prev_end: Option<usize> = None;
        for clause in clauses {
            if prev_end.is_some_and(|end| self.blank_between(end, clause.body.span.start)) {
                out.push('\n');
            }
            out.push_str(&tabs(indent));
            if clause.exprs.is_empty() {
                out.push_str("default:");
            } else {
                out.push_str("case ");
                out.push_str(&self.list(&clause.exprs, 1, indent));
                out.push(':');
            }
            out.push('\n');
            out.push_str(&self.stmt_list(&clause.body.stmts, &clause.body.comments, indent + 1));
            prev_end = Some(clause.body.span.end);
        }
        out.push_str(&tabs(indent));
        out.push('}');
        out
    }
}
