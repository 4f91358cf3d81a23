//! gofmt-style printer
//!
//! Layout decisions that gofmt derives from token positions (multi-line
//! composite literals, blank lines between statements, one-line function
//! bodies) are taken from node spans here. Nodes built by the converter carry
//! detached spans and get the default layout.

mod expr;
mod stmt;


use crate::ast::{
    Comment, Decl, Expr, Field, FuncDecl, FuncType, ImportGroup, ImportSpec, LineIndex,
    SourceFile, TypeDecl, ValueDecl,
};

/// Render a source file as Go text
pub fn print_file(file: &SourceFile) -> String {
    Printer::new(&file.lines).file(file)
}

/// Source-position-aware printer for one file
pub(crate) struct Printer<'a> {
    lines: &'a LineIndex,
}

pub(crate) fn tabs(n: usize) -> String {
    "\t".repeat(n)
}

fn decl_keyword(decl: &Decl) -> &'static str {
    match decl {
        Decl::Import(_) => "import",
        Decl::Func(_) => "func",
        Decl::Type(_) => "type",
        Decl::Var(_) => "var",
        Decl::Const(_) => "const",
    }
}

impl<'a> Printer<'a> {
    pub(crate) fn new(lines: &'a LineIndex) -> Self {
        Self { lines }
    }

    fn line(&self, offset: usize) -> Option<usize> {
        self.lines.line(offset)
    }

    /// Both offsets known and on the same line
    fn same_line(&self, a: usize, b: usize) -> bool {
        matches!((self.line(a), self.line(b)), (Some(x), Some(y)) if x == y)
    }

    /// The source had at least one empty line between the two offsets
    fn blank_between(&self, from: usize, to: usize) -> bool {
        self.lines.lines_between(from, to).is_some_and(|n| n > 1)
    }

    fn file(&self, file: &SourceFile) -> String {
        let mut out = String::new();

        self.comments(&mut out, &file.header, 0);
        if let Some(last) = file.header.last() {
            if self.blank_between(last.span.end, file.package.span.start) {
                out.push('\n');
            }
        }
        out.push_str("package ");
        out.push_str(&file.package.node);
        out.push('\n');

        let mut prev_end = file.package.span.end;
        let mut prev_keyword = None;
        for item in &file.items {
            let keyword = decl_keyword(&item.decl);
            let start = item.doc.first().map_or(item.span.start, |c| c.span.start);
            let min = if prev_keyword != Some(keyword) || !item.doc.is_empty() {
                2
            } else {
                1
            };
            let breaks = self
                .lines
                .lines_between(prev_end, start)
                .map_or(2, |n| n.clamp(min, 2));
            out.push_str(&"\n".repeat(breaks - 1));

            self.comments(&mut out, &item.doc, 0);
            if let Some(last) = item.doc.last() {
                if self.blank_between(last.span.end, item.span.start) {
                    out.push('\n');
                }
            }
            out.push_str(&self.decl(&item.decl, 0));
            prev_end = item.span.end;
            if let Some(comment) = &item.comment {
                out.push(' ');
                out.push_str(&comment.text);
                prev_end = comment.span.end;
            }
            out.push('\n');

            prev_keyword = Some(keyword);
        }

        if let Some(first) = file.trailing.first() {
            if self.blank_between(prev_end, first.span.start) {
                out.push('\n');
            }
            self.comments(&mut out, &file.trailing, 0);
        }
        out
    }

    /// Comment lines, keeping single empty lines between them
    fn comments(&self, out: &mut String, comments: &[Comment], indent: usize) {
        let mut prev_end: Option<usize> = None;
        for comment in comments {
            if prev_end.is_some_and(|end| self.blank_between(end, comment.span.start)) {
                out.push('\n');
            }
            out.push_str(&tabs(indent));
            out.push_str(&comment.text);
            out.push('\n');
            prev_end = Some(comment.span.end);
        }
    }

    pub(crate) fn decl(&self, decl: &Decl, indent: usize) -> String {
        match decl {
            Decl::Import(group) => self.import_decl(group),
            Decl::Func(func) => self.func_decl(func, indent),
            Decl::Type(decl) => self.type_decl(decl, indent),
            Decl::Var(decl) => self.value_decl("var", decl, indent),
            Decl::Const(decl) => self.value_decl("const", decl, indent),
        }
    }

    fn import_decl(&self, group: &ImportGroup) -> String {
        let row = |spec: &ImportSpec| -> Vec<String> {
            let mut cells = vec![import_spec(spec)];
            cells.extend(spec.comment.as_ref().map(|c| c.text.clone()));
            cells
        };
        if !group.parenthesized && group.specs.len() == 1 {
            return format!("import {}", row(&group.specs[0]).join(" "));
        }
        let rows: Vec<Vec<String>> = group.specs.iter().map(row).collect();
        let mut out = String::from("import (\n");
        for line in align_rows(&rows) {
            out.push('\t');
            out.push_str(&line);
            out.push('\n');
        }
        out.push(')');
        out
    }

    fn func_decl(&self, func: &FuncDecl, indent: usize) -> String {
        let mut out = String::from("func ");
        if let Some(recv) = &func.recv {
            out.push('(');
            out.push_str(&self.field_list(std::slice::from_ref(recv), indent));
            out.push_str(") ");
        }
        out.push_str(&func.name.node);
        out.push_str(&self.type_params(&func.type_params, indent));
        out.push_str(&self.signature(&func.ty, indent));
        if let Some(body) = &func.body {
            out.push(' ');
            out.push_str(&self.func_body(body, indent));
        }
        out
    }

    /// `(params) results`
    pub(crate) fn signature(&self, ty: &FuncType, indent: usize) -> String {
        let mut out = format!("({})", self.field_list(&ty.params, indent));
        match ty.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                out.push(' ');
                out.push_str(&self.expr(&single.ty, indent));
            }
            results => {
                out.push_str(&format!(" ({})", self.field_list(results, indent)));
            }
        }
        out
    }

    /// `[K comparable, V any]`, or nothing
    fn type_params(&self, params: &[Field], indent: usize) -> String {
        if params.is_empty() {
            return String::new();
        }
        format!("[{}]", self.field_list(params, indent))
    }

    fn field_list(&self, fields: &[Field], indent: usize) -> String {
        fields
            .iter()
            .map(|field| {
                let ty = self.expr(&field.ty, indent);
                if field.names.is_empty() {
                    ty
                } else {
                    format!("{} {ty}", field.names.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn type_decl(&self, decl: &TypeDecl, indent: usize) -> String {
        let rows: Vec<Vec<String>> = decl
            .specs
            .iter()
            .map(|spec| {
                let ty = self.expr(&spec.ty, indent + usize::from(decl.grouped));
                let ty = if spec.alias { format!("= {ty}") } else { ty };
                let name = format!("{}{}", spec.name, self.type_params(&spec.type_params, indent));
                let mut row = vec![name, ty];
                row.extend(spec.comment.as_ref().map(|c| c.text.clone()));
                row
            })
            .collect();
        self.gen_decl("type", rows, decl.grouped, indent)
    }

    fn value_decl(&self, keyword: &str, decl: &ValueDecl, indent: usize) -> String {
        let inner = indent + usize::from(decl.grouped);
        let keep_type = decl.grouped && decl.specs.iter().any(|spec| spec.ty.is_some());
        let rows: Vec<Vec<String>> = decl
            .specs
            .iter()
            .map(|spec| {
                let mut row = vec![spec.names.join(", ")];
                match &spec.ty {
                    Some(ty) => row.push(self.expr(ty, inner)),
                    None if keep_type => row.push(String::new()),
                    None => {}
                }
                if !spec.values.is_empty() {
                    let values = spec
                        .values
                        .iter()
                        .map(|value| self.expr(value, inner))
                        .collect::<Vec<_>>()
                        .join(", ");
                    row.push(format!("= {values}"));
                }
                row.extend(spec.comment.as_ref().map(|c| c.text.clone()));
                row
            })
            .collect();
        self.gen_decl(keyword, rows, decl.grouped, indent)
    }

    fn gen_decl(&self, keyword: &str, rows: Vec<Vec<String>>, grouped: bool, indent: usize) -> String {
        if !grouped {
            let spec = rows
                .into_iter()
                .next()
                .map(|cells| cells.join(" "))
                .unwrap_or_default();
            return format!("{keyword} {spec}");
        }
        if rows.is_empty() {
            return format!("{keyword} ()");
        }
        let mut out = format!("{keyword} (\n");
        for line in align_rows(&rows) {
            out.push_str(&tabs(indent + 1));
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&tabs(indent));
        out.push(')');
        out
    }

    /// `struct { ... }` and `interface { ... }` bodies
    pub(crate) fn field_block(
        &self,
        keyword: &str,
        fields: &[Field],
        one_line_source: bool,
        indent: usize,
    ) -> String {
        let is_struct = keyword == "struct";
        let row = |field: &Field| -> Vec<String> {
            let mut cells = Vec::new();
            if is_struct {
                if !field.names.is_empty() {
                    cells.push(field.names.join(", "));
                }
                cells.push(self.expr(&field.ty, indent + 1));
            } else {
                match (&field.names[..], &field.ty.node) {
                    ([name], Expr::FuncType(sig)) => {
                        cells.push(format!("{name}{}", self.signature(sig, indent + 1)));
                    }
                    _ => cells.push(self.expr(&field.ty, indent + 1)),
                }
            }
            if let Some(tag) = &field.tag {
                cells.push(tag.clone());
            }
            cells.extend(field.comment.as_ref().map(|c| c.text.clone()));
            cells
        };

        match fields {
            [] if one_line_source => format!("{keyword}{{}}"),
            [] => format!("{keyword} {{\n{}}}", tabs(indent)),
            [field] if one_line_source && field.comment.is_none() => {
                let cells = row(field);
                if cells.iter().all(|cell| !cell.contains('\n')) {
                    return format!("{keyword}{{ {} }}", cells.join(" "));
                }
                self.field_block(keyword, fields, false, indent)
            }
            _ => {
                let rows: Vec<Vec<String>> = fields.iter().map(row).collect();
                let mut out = format!("{keyword} {{\n");
                for line in align_rows(&rows) {
                    out.push_str(&tabs(indent + 1));
                    out.push_str(&line);
                    out.push('\n');
                }
                out.push_str(&tabs(indent));
                out.push('}');
                out
            }
        }
    }
}

fn import_spec(spec: &ImportSpec) -> String {
    match &spec.alias {
        Some(alias) => format!("{alias} \"{}\"", spec.path),
        None => format!("\"{}\"", spec.path),
    }
}

/// Column layout in the manner of gofmt's tabwriter
///
/// Every cell but the last of a row is padded to the widest cell of its
/// column plus one space. A column block is a run of consecutive rows that
/// have a cell after that column; rows spanning several lines break blocks
/// and are joined with single spaces.
pub(crate) fn align_rows(rows: &[Vec<String>]) -> Vec<String> {
    let width = |cell: &str| cell.chars().count();
    let single_line = |row: &[String]| row.iter().all(|cell| !cell.contains('\n'));
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);

    let mut widths: Vec<Vec<usize>> = rows.iter().map(|row| vec![0; row.len()]).collect();
    for col in 0..columns.saturating_sub(1) {
        let in_block = |row: &Vec<String>| row.len() > col + 1 && single_line(row);
        let mut i = 0;
        while i < rows.len() {
            if !in_block(&rows[i]) {
                i += 1;
                continue;
            }
            let mut j = i;
            while j < rows.len() && in_block(&rows[j]) {
                j += 1;
            }
            let max = rows[i..j]
                .iter()
                .map(|row| width(&row[col]))
                .max()
                .unwrap_or(0);
            for row_widths in &mut widths[i..j] {
                row_widths[col] = max;
            }
            i = j;
        }
    }

    rows.iter()
        .zip(&widths)
        .map(|(row, row_widths)| {
            if !single_line(row) {
                return row.join(" ");
            }
            let mut line = String::new();
            for (col, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if col + 1 < row.len() {
                    let pad = row_widths[col].max(width(cell)) - width(cell) + 1;
                    line.push_str(&" ".repeat(pad));
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}
