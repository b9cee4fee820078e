//! Column-aligned tables.

use console::measure_text_width;

/// Rows of cells printed with aligned columns.
///
/// Cells may contain ANSI styling; widths are measured on visible text.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(measure_text_width(cell));
            }
        }
        widths
    }

    /// Render with a header line and a rule under it. `style_header` is
    /// applied to each header cell after padding.
    pub fn render_with(&self, style_header: impl Fn(&str) -> String) -> String {
        let widths = self.widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 2);

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| style_header(&pad(h, *w)))
            .collect();
        lines.push(header.join("  ").trim_end().to_string());

        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        lines.push(style_header(&rule.join("  ")));

        for row in &self.rows {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| pad(row.get(i).map(String::as_str).unwrap_or(""), *w))
                .collect();
            lines.push(cells.join("  ").trim_end().to_string());
        }

        lines.join("\n")
    }

    /// Render without styling.
    pub fn render(&self) -> String {
        self.render_with(str::to_string)
    }
}

fn pad(cell: &str, width: usize) -> String {
    let visible = measure_text_width(cell);
    format!("{}{}", cell, " ".repeat(width.saturating_sub(visible)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let mut table = Table::new(["Package", "Version"]);
        table.add_row(["flask", "3.0.0"]);
        table.add_row(["typing-extensions", "4.9.0"]);

        let rendered = table.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Package            Version");
        assert_eq!(lines[2], "flask              3.0.0");
        assert_eq!(lines[3], "typing-extensions  4.9.0");
    }

    #[test]
    fn missing_cells_are_blank() {
        let mut table = Table::new(["A", "B"]);
        table.add_row(["only"]);
        assert_eq!(table.render().lines().last(), Some("only"));
    }

    #[test]
    fn styled_cells_measure_visible_width() {
        let mut table = Table::new(["Status", "Name"]);
        table.add_row(["\u{1b}[32mok\u{1b}[0m", "x"]);
        let rendered = table.render();
        assert!(rendered.lines().last().unwrap().ends_with("      x"));
    }

    #[test]
    fn empty_table_still_has_header() {
        let table = Table::new(["Name"]);
        assert!(table.is_empty());
        assert!(table.render().starts_with("Name"));
    }
}
