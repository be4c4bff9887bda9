//! Table rendering for list displays.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

/// Borderless table with upper-cased headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Table preceded by a count line, or a "none found" line.
pub fn render_list(entity_name: &str, table: Table, total: usize) -> String {
    if total == 0 {
        return format!("No {}s found.", entity_name);
    }
    let noun = if total == 1 {
        entity_name.to_string()
    } else {
        format!("{}s", entity_name)
    };
    format!("{} {}:\n{}", total, noun, table)
}
