use clap::error::ErrorKind;
use pressroom_orm::ColumnInfo;
use url::Url;

/// Exit status for a rejected command line: 0 for `--help`/`--version`,
/// 1 for everything else. Neither binary uses clap's own status 2.
pub fn parse_failure_code(error: &clap::Error) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Replace the password in a database URL for display
pub fn mask_database_url(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable database url>".to_string(),
    }
}

/// Whether the URL's host contains the expected provider fragment.
///
/// `None` when the URL cannot be parsed or has no host.
pub fn host_matches(url_str: &str, expected: &str) -> Option<bool> {
    let url = Url::parse(url_str).ok()?;
    let host = url.host_str()?;
    Some(host.contains(expected))
}

/// Render columns as an aligned text table
pub fn render_column_table(columns: &[ColumnInfo]) -> String {
    const HEADERS: [&str; 4] = ["column_name", "data_type", "is_nullable", "column_default"];

    let rows: Vec<[&str; 4]> = columns
        .iter()
        .map(|c| {
            [
                c.column_name.as_str(),
                c.data_type.as_str(),
                c.is_nullable.as_str(),
                c.column_default.as_deref().unwrap_or(""),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 4]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!(" {:<width$} ", cell, width = *width))
            .collect::<Vec<_>>()
            .join("|")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(format_row(HEADERS));
    lines.push(separator);
    for row in rows {
        lines.push(format_row(row));
    }
    lines.push(format!("({} rows)", columns.len()));
    lines.join("\n")
}
