use crate::core::TickerTable;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Renders a ticker table with one row per date.
pub fn render_ticker_table(table: &TickerTable) -> String {
    let mut rendered = new_styled_table();

    let mut header = vec![header_cell("Date")];
    header.extend(table.columns().iter().map(|c| header_cell(c)));
    rendered.set_header(header);

    for row in table.rows() {
        let mut cells = vec![Cell::new(row.date.format("%Y-%m-%d"))];
        cells.extend(
            row.values
                .iter()
                .map(|v| format_optional_cell(*v, |p| format!("{p:.2}"))),
        );
        rendered.add_row(cells);
    }

    rendered.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TableRow;
    use chrono::NaiveDate;

    #[test]
    fn test_render_ticker_table() {
        let table = TickerTable::new(
            vec!["Close".to_string(), "Volume".to_string()],
            vec![TableRow {
                date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                values: vec![Some(3257.8512), None],
            }],
        );

        let output = render_ticker_table(&table);
        assert!(output.contains("Date"));
        assert!(output.contains("Close"));
        assert!(output.contains("2020-01-02"));
        assert!(output.contains("3257.85"));
        assert!(output.contains("N/A"));
    }
}
