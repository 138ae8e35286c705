use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use memeraki_model::{FieldKind, RunSummary, Schema};

use crate::commands::UploadOutcome;

pub fn print_summary(outcome: &UploadOutcome) {
    println!("Source: {}", outcome.csv.display());
    if outcome.dry_run {
        println!("Collection: {} (dry run, nothing written)", outcome.collection);
    } else {
        println!("Collection: {}", outcome.collection);
    }
    println!("{}", summary_table(&outcome.summary));
    println!("{}", outcome.summary);
}

/// Counts of one run, failures highlighted.
pub fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("Rows read"), Cell::new(summary.rows_read)]);
    table.add_row(vec![
        Cell::new("Rows rejected"),
        count_cell(summary.rows_rejected, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Documents committed"),
        Cell::new(summary.documents_committed)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("  created"),
        Cell::new(summary.documents_created),
    ]);
    table.add_row(vec![
        Cell::new("  updated"),
        Cell::new(summary.documents_updated),
    ]);
    table.add_row(vec![
        Cell::new("Documents in failed batches"),
        count_cell(summary.documents_failed, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Batches committed"),
        Cell::new(summary.batches_committed),
    ]);
    table.add_row(vec![
        Cell::new("Batches failed"),
        count_cell(summary.batches_failed, Color::Red),
    ]);
    table.add_row(vec![
        dim_cell("Elapsed"),
        dim_cell(format!(
            "{:.1}s ({:.0} rows/s)",
            summary.elapsed.as_secs_f64(),
            summary.rows_per_second()
        )),
    ]);
    table
}

/// Column reference for a pipeline.
pub fn schema_table(schema: &Schema) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Required"),
        header_cell("Allowed values"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for field in schema.fields {
        let natural_key = schema.natural_key.contains(&field.name);
        let name = if natural_key {
            Cell::new(format!("{} (id)", field.name))
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(field.name)
        };
        let allowed = match field.kind {
            FieldKind::Enum(values) => Cell::new(values.join(", ")),
            FieldKind::List => dim_cell("separated by |"),
            _ => dim_cell("-"),
        };
        table.add_row(vec![
            name,
            Cell::new(field.kind.label()),
            if field.required {
                Cell::new("yes").fg(Color::Green)
            } else {
                dim_cell("no")
            },
            allowed,
        ]);
    }
    table
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
