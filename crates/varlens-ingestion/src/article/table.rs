//! Fixed-width text rendering of HTML data tables.

/// Renders a header row and body rows as a pipe-delimited text table.
///
/// Column widths are the widest cell (in characters) of each column across
/// the header and all rows. Rows are padded with empty cells or truncated
/// to the header's column count. Without a header the column count comes
/// from the widest row and only data lines are emitted.
pub fn to_markdown(header: &[String], rows: &[Vec<String>]) -> String {
    let has_header = !header.is_empty();
    let columns = if has_header {
        header.len()
    } else {
        rows.iter().map(Vec::len).max().unwrap_or(0)
    };
    if columns == 0 {
        return String::new();
    }

    let rows: Vec<Vec<&str>> = rows.iter().map(|row| fit_row(row, columns)).collect();
    let header = fit_row(header, columns);

    let mut widths = vec![0usize; columns];
    for row in rows.iter().chain(std::iter::once(&header)) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if has_header {
        lines.push(render_line(&header, &widths));
        let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let dashes: Vec<&str> = dashes.iter().map(String::as_str).collect();
        lines.push(render_line(&dashes, &widths));
    }
    for row in &rows {
        lines.push(render_line(row, &widths));
    }
    lines.join("\n")
}

fn fit_row(row: &[String], columns: usize) -> Vec<&str> {
    let mut cells: Vec<&str> = row.iter().take(columns).map(String::as_str).collect();
    cells.resize(columns, "");
    cells
}

fn render_line(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    format!("| {} |", padded.join(" | "))
}
