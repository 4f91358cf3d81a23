//! Expressions, with gofmt's operator spacing and list layout

use super::{Printer, align_rows, tabs};
use crate::ast::{BinOp, ChanDir, ElementComment, Expr, Span, Spanned, UnOp};

const UNARY_PREC: u8 = 6;
const HIGHEST_PREC: u8 = 7;

/// Key widths up to this size always align
const SMALL_SIZE: usize = 40;

fn reduce_depth(depth: usize) -> usize {
    depth.saturating_sub(1).max(1)
}

fn diff_prec(expr: &Expr, prec: u8) -> usize {
    match expr {
        Expr::Binary { op, .. } if op.precedence() == prec => 0,
        _ => 1,
    }
}

/// Operator classes present in a binary tree, and the tightest precedence
/// that must keep blanks to avoid forming another token (`x / *p`, `a - -b`)
fn walk_binary(expr: &Expr) -> (bool, bool, u8) {
    let Expr::Binary { left, op, right } = expr else {
        return (false, false, 0);
    };
    let prec = op.precedence();
    let mut has4 = prec == 4;
    let mut has5 = prec == 5;
    let mut max_problem = 0;

    if let Expr::Binary { op: left_op, .. } = &left.node {
        if left_op.precedence() >= prec {
            let (h4, h5, mp) = walk_binary(&left.node);
            has4 |= h4;
            has5 |= h5;
            max_problem = max_problem.max(mp);
        }
    }

    match &right.node {
        Expr::Binary { op: right_op, .. } => {
            if right_op.precedence() > prec {
                let (h4, h5, mp) = walk_binary(&right.node);
                has4 |= h4;
                has5 |= h5;
                max_problem = max_problem.max(mp);
            }
        }
        Expr::Star(_) if *op == BinOp::Div => max_problem = 5,
        Expr::Unary { op: right_op, .. } => match (op, right_op) {
            (BinOp::And, UnOp::Addr) | (BinOp::And, UnOp::Xor) => max_problem = 5,
            (BinOp::Add, UnOp::Pos) | (BinOp::Sub, UnOp::Neg) => max_problem = max_problem.max(4),
            _ => {}
        },
        _ => {}
    }
    (has4, has5, max_problem)
}

/// Operators with precedence below the cutoff are surrounded by blanks
fn cutoff(expr: &Expr, depth: usize) -> u8 {
    let (has4, has5, max_problem) = walk_binary(expr);
    if max_problem > 0 {
        return max_problem + 1;
    }
    match (has4 && has5, depth == 1) {
        (true, true) => 5,
        (true, false) => 4,
        (false, true) => 6,
        (false, false) => 4,
    }
}

/// One output line of a multi-line list
struct Row {
    cells: Vec<String>,
    /// Starts a new alignment section
    flush: bool,
    blank_before: bool,
    comment: Option<String>,
}

impl Printer<'_> {
    pub(crate) fn expr(&self, e: &Spanned<Expr>, indent: usize) -> String {
        self.expr1(e, 0, 1, indent)
    }

    pub(crate) fn expr0(&self, e: &Spanned<Expr>, depth: usize, indent: usize) -> String {
        self.expr1(e, 0, depth, indent)
    }

    fn expr1(&self, e: &Spanned<Expr>, prec1: u8, depth: usize, indent: usize) -> String {
        match &e.node {
            Expr::Ident(name) => name.clone(),
            Expr::BasicLit(text) => text.clone(),
            Expr::Binary { .. } => {
                let depth = depth.max(1);
                self.binary(e, prec1, cutoff(&e.node, depth), depth, indent)
            }
            Expr::Unary { op, expr } => {
                if UNARY_PREC < prec1 {
                    format!("({})", self.expr0(e, reduce_depth(depth), indent))
                } else {
                    format!("{op}{}", self.expr1(expr, UNARY_PREC, depth, indent))
                }
            }
            Expr::Star(expr) => {
                if UNARY_PREC < prec1 {
                    format!("({})", self.expr0(e, reduce_depth(depth), indent))
                } else {
                    format!("*{}", self.expr(expr, indent))
                }
            }
            Expr::Paren(inner) => match &inner.node {
                Expr::Paren(_) => self.expr0(inner, depth, indent),
                _ => format!("({})", self.expr0(inner, reduce_depth(depth), indent)),
            },
            Expr::Selector { expr, field } => {
                format!("{}.{field}", self.expr1(expr, HIGHEST_PREC, depth, indent))
            }
            Expr::TypeAssert { expr, ty } => {
                let target = match ty {
                    Some(ty) => self.expr(ty, indent),
                    None => "type".to_string(),
                };
                format!("{}.({target})", self.expr1(expr, HIGHEST_PREC, depth, indent))
            }
            Expr::Index { expr, index } => format!(
                "{}[{}]",
                self.expr1(expr, HIGHEST_PREC, 1, indent),
                self.expr0(index, depth + 1, indent)
            ),
            Expr::IndexList { expr, indices } => format!(
                "{}[{}]",
                self.expr1(expr, HIGHEST_PREC, 1, indent),
                indices
                    .iter()
                    .map(|index| self.expr0(index, depth + 1, indent))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Expr::Slice {
                expr,
                low,
                high,
                max,
                three_index,
            } => {
                let mut indices = vec![low.as_deref(), high.as_deref()];
                if *three_index {
                    indices.push(max.as_deref());
                }
                let needs_blanks = depth <= 1
                    && indices.iter().flatten().count() > 1
                    && indices
                        .iter()
                        .flatten()
                        .any(|index| matches!(index.node, Expr::Binary { .. }));

                let mut out = self.expr1(expr, HIGHEST_PREC, 1, indent);
                out.push('[');
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        if indices[i - 1].is_some() && needs_blanks {
                            out.push(' ');
                        }
                        out.push(':');
                        if index.is_some() && needs_blanks {
                            out.push(' ');
                        }
                    }
                    if let Some(index) = index {
                        out.push_str(&self.expr0(index, depth + 1, indent));
                    }
                }
                out.push(']');
                out
            }
            Expr::Call {
                func,
                args,
                ellipsis,
                parens,
            } => {
                let depth = if args.len() > 1 { depth + 1 } else { depth };
                let suffix = if *ellipsis { "..." } else { "" };
                format!(
                    "{}({})",
                    self.expr1(func, HIGHEST_PREC, depth, indent),
                    self.expr_list(args, &[], *parens, depth, indent, suffix)
                )
            }
            Expr::CompositeLit {
                ty,
                elts,
                braces,
                comments,
            } => {
                let ty = match ty {
                    Some(ty) => self.expr1(ty, HIGHEST_PREC, depth, indent),
                    None => String::new(),
                };
                let elts = self.expr_list(elts, comments, *braces, 1, indent, "");
                format!("{ty}{{{elts}}}")
            }
            Expr::FuncLit { ty, body } => format!(
                "func{} {}",
                self.signature(ty, indent),
                self.func_body(body, indent)
            ),
            Expr::KeyValue { key, value } => {
                format!("{}: {}", self.expr(key, indent), self.expr(value, indent))
            }
            Expr::ArrayType { len, elem } => {
                let len = match len {
                    Some(len) => self.expr(len, indent),
                    None => String::new(),
                };
                format!("[{len}]{}", self.expr(elem, indent))
            }
            Expr::Ellipsis(elem) => match elem {
                Some(elem) => format!("...{}", self.expr(elem, indent)),
                None => "...".to_string(),
            },
            Expr::MapType { key, value } => format!(
                "map[{}]{}",
                self.expr(key, indent),
                self.expr(value, indent)
            ),
            Expr::ChanType { dir, elem } => {
                let elem = self.expr(elem, indent);
                match dir {
                    ChanDir::Both => format!("chan {elem}"),
                    ChanDir::Send => format!("chan<- {elem}"),
                    ChanDir::Recv => format!("<-chan {elem}"),
                }
            }
            Expr::FuncType(ty) => format!("func{}", self.signature(ty, indent)),
            Expr::StructType { fields, braces } => {
                self.field_block("struct", fields, self.one_line(*braces), indent)
            }
            Expr::InterfaceType { methods, braces } => {
                self.field_block("interface", methods, self.one_line(*braces), indent)
            }
        }
    }

    /// Delimiters written on one source line, or generated
    fn one_line(&self, delims: Span) -> bool {
        delims.is_detached() || self.same_line(delims.start, delims.end.saturating_sub(1))
    }

    fn binary(&self, e: &Spanned<Expr>, prec1: u8, cutoff: u8, depth: usize, indent: usize) -> String {
        let Expr::Binary { left, op, right } = &e.node else {
            return self.expr0(e, depth, indent);
        };
        let prec = op.precedence();
        if prec < prec1 {
            return format!("({})", self.expr0(e, reduce_depth(depth), indent));
        }

        let blank = if prec < cutoff { " " } else { "" };
        let broken = matches!(
            (self.line(left.span.end), self.line(right.span.start)),
            (Some(l), Some(r)) if r > l
        );
        let left_text = self.expr1(left, prec, depth + diff_prec(&left.node, prec), indent);
        let right_indent = if broken { indent + 1 } else { indent };
        let right_text = self.expr1(right, prec + 1, depth + 1, right_indent);

        if broken {
            format!("{left_text}{blank}{op}\n{}{right_text}", tabs(indent + 1))
        } else {
            format!("{left_text}{blank}{op}{blank}{right_text}")
        }
    }

    /// Call arguments or composite literal elements, without delimiters
    ///
    /// When the delimiters sit on different source lines, elements keep the
    /// line breaks they had, consecutive `key: value` lines get their values
    /// aligned, and a closing delimiter on its own line gets a trailing comma.
    /// Line comments after an element's comma end that element's line.
    fn expr_list(
        &self,
        elts: &[Spanned<Expr>],
        comments: &[ElementComment],
        delims: Span,
        depth: usize,
        indent: usize,
        suffix: &str,
    ) -> String {
        let Some(last) = elts.last() else {
            return String::new();
        };
        if self.one_line(delims) {
            let mut out = elts
                .iter()
                .map(|elt| self.expr0(elt, depth, indent))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(suffix);
            return out;
        }

        let mut head = String::new();
        let mut head_comment = None;
        let mut rows: Vec<Row> = Vec::new();
        let mut prev_line = self.line(delims.start);
        let mut prev_break: Option<usize> = None;
        let mut size = 0usize;
        let mut ln_sum = 0f64;
        let mut count = 0usize;

        for (i, elt) in elts.iter().enumerate() {
            let line = self.line(elt.span.start);
            let needs_break = matches!((prev_line, line), (Some(p), Some(l)) if p < l);
            let elt_indent = if needs_break || !rows.is_empty() { indent + 1 } else { indent };
            let mut text = self.expr0(elt, depth, elt_indent);
            if i + 1 == elts.len() {
                text.push_str(suffix);
            }

            let pair = match &elt.node {
                Expr::KeyValue { key, value } if !text.contains('\n') => Some((key, value)),
                _ => None,
            };
            let prev_size = size;
            size = match pair {
                _ if text.contains('\n') => 0,
                Some((key, _)) => self.expr(key, elt_indent).chars().count(),
                None => text.chars().count(),
            };

            let mut flush = true;
            if prev_size > 0 && size > 0 {
                if count == 0 || (prev_size <= SMALL_SIZE && size <= SMALL_SIZE) {
                    flush = false;
                } else {
                    let geomean = (ln_sum / count as f64).exp();
                    let ratio = size as f64 / geomean;
                    flush = 2.5 * ratio <= 1.0 || 2.5 <= ratio;
                }
            }

            if needs_break {
                let blank_before = matches!((prev_line, line), (Some(p), Some(l)) if l - p > 1);
                let flush = flush || prev_break.is_none_or(|b| b + 1 < i) || blank_before;
                if blank_before {
                    ln_sum = 0.0;
                    count = 0;
                }
                prev_break = Some(i);
                let cells = match pair {
                    Some((key, value)) if elts.len() > 1 && size > 0 => {
                        let mut value = self.expr(value, elt_indent);
                        if i + 1 == elts.len() {
                            value.push_str(suffix);
                        }
                        vec![format!("{}:", self.expr(key, elt_indent)), value]
                    }
                    _ => vec![text],
                };
                rows.push(Row {
                    cells,
                    flush,
                    blank_before,
                    comment: None,
                });
            } else if let Some(row) = rows.last_mut() {
                if let Some(cell) = row.cells.last_mut() {
                    cell.push_str(", ");
                    cell.push_str(&text);
                }
            } else {
                if i > 0 {
                    head.push_str(", ");
                }
                head.push_str(&text);
            }

            if let Some(comment) = comments.iter().find(|c| c.index == i) {
                let text = Some(comment.comment.text.clone());
                match rows.last_mut() {
                    Some(row) => row.comment = text,
                    None => head_comment = text,
                }
            }

            if size > 0 {
                ln_sum += (size as f64).ln();
                count += 1;
            }
            prev_line = self.line(elt.span.end);
        }

        let close_line = self.line(delims.end.saturating_sub(1));
        let closes_on_new_line =
            matches!((self.line(last.span.end), close_line), (Some(l), Some(c)) if c > l);

        // Commas go before a line's comment, so they are part of the cells
        let row_count = rows.len();
        for (i, row) in rows.iter_mut().enumerate() {
            if i + 1 < row_count || closes_on_new_line {
                if let Some(cell) = row.cells.last_mut() {
                    cell.push(',');
                }
            }
            row.cells.extend(row.comment.take());
        }

        let mut out = head;
        if !out.is_empty() && (row_count > 0 || closes_on_new_line) {
            out.push(',');
        }
        if let Some(comment) = head_comment {
            out.push(' ');
            out.push_str(&comment);
        }
        let mut section: Vec<Vec<String>> = Vec::new();
        let mut section_blank: Vec<bool> = Vec::new();
        let mut lines: Vec<(bool, String)> = Vec::new();
        let mut flush_section = |section: &mut Vec<Vec<String>>, blanks: &mut Vec<bool>| {
            for (blank, line) in blanks.drain(..).zip(align_rows(section)) {
                lines.push((blank, line));
            }
            section.clear();
        };
        for row in rows {
            if row.flush {
                flush_section(&mut section, &mut section_blank);
            }
            section.push(row.cells);
            section_blank.push(row.blank_before);
        }
        flush_section(&mut section, &mut section_blank);

        for (blank, line) in lines {
            out.push('\n');
            if blank {
                out.push('\n');
            }
            out.push_str(&tabs(indent + 1));
            out.push_str(&line);
        }

        if closes_on_new_line {
            out.push('\n');
            out.push_str(&tabs(indent));
        }
        out
    }
}
