use unicode_width::UnicodeWidthStr;

/// How a column's cells are justified. Headers are always left-justified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

struct Column {
    header: String,
    align: Align,
    data: Vec<String>,
}

/// A builder for aligned tabular output.
///
/// Columns are added with `column()` (right-justified, for numeric data)
/// or `column_left()` (for labels and symbols). `render()` returns the
/// formatted table; `print()` writes it to stdout.
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Table { columns: Vec::new() }
    }

    /// Add a right-justified column with the given header and data rows.
    pub fn column(self, header: impl Into<String>, data: Vec<String>) -> Self {
        self.add(header.into(), Align::Right, data)
    }

    /// Add a left-justified column.
    pub fn column_left(self, header: impl Into<String>, data: Vec<String>) -> Self {
        self.add(header.into(), Align::Left, data)
    }

    fn add(mut self, header: String, align: Align, data: Vec<String>) -> Self {
        self.columns.push(Column { header, align, data });
        self
    }

    /// Render the table with aligned columns: a header line, a rule, then
    /// one line per row. Missing cells render as "-".
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }

        // Column width: max of header and cell widths, by display width so
        // condition symbols and non-ASCII place names stay aligned.
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|col| {
                let max_data = col.data.iter().map(|v| v.width()).max().unwrap_or(0);
                col.header.width().max(max_data)
            })
            .collect();

        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| pad(&col.header, w, Align::Left))
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');

        let num_rows = self.columns.iter().map(|c| c.data.len()).max().unwrap_or(0);
        for row_idx in 0..num_rows {
            let row: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, &w)| {
                    let val = col.data.get(row_idx).map(|s| s.as_str()).unwrap_or("-");
                    pad(val, w, col.align)
                })
                .collect();
            out.push_str(row.join("  ").trim_end());
            out.push('\n');
        }
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

/// Justify `s` to `width` using Unicode display width.
fn pad(s: &str, width: usize, align: Align) -> String {
    let current = s.width();
    if current >= width {
        return s.to_string();
    }
    let fill = " ".repeat(width - current);
    match align {
        Align::Left => format!("{s}{fill}"),
        Align::Right => format!("{fill}{s}"),
    }
}
