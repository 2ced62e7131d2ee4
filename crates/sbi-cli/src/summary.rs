//! Human-readable summaries printed to stdout.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sbi_ingest::{ImportReport, SweepReport};
use sbi_sync::{ExportReport, SyncReport};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn print_import_summary(reports: &[ImportReport]) {
    if reports.is_empty() {
        println!("No packets to import.");
        return;
    }
    for report in reports {
        println!("Packet: {}", report.packet);
        if report.already_processed {
            println!("  already processed, skipped");
            continue;
        }
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Kind"),
            header_cell("Inserted"),
            header_cell("Updated"),
            header_cell("Deleted"),
            header_cell("Skipped"),
        ]);
        apply_table_style(&mut table);
        for index in 1..=4 {
            align_column(&mut table, index, CellAlignment::Right);
        }
        for (kind, stats) in &report.kinds {
            let skipped_cell = if stats.skipped > 0 {
                Cell::new(stats.skipped).fg(Color::Yellow)
            } else {
                Cell::new(stats.skipped)
            };
            table.add_row(vec![
                Cell::new(kind),
                Cell::new(stats.inserted),
                Cell::new(stats.updated),
                Cell::new(stats.deleted),
                skipped_cell,
            ]);
        }
        println!("{table}");
        if !report.skipped_tables.is_empty() {
            println!("  tables skipped: {}", report.skipped_tables.join(", "));
        }
    }
}

pub fn print_sweep_summary(report: &SweepReport) {
    println!(
        "Swept {} expired packet(s), removed {} attached file(s).",
        report.packets_removed, report.files_removed
    );
}

pub fn print_sync_summary(report: &SyncReport) {
    println!(
        "Sync: {} workbook(s) created, {} removed; {} dependent(s) imported, {} skipped.",
        report.roots_created,
        report.roots_removed,
        report.dependents_imported,
        report.dependents_skipped
    );
}

pub fn print_export_summary(report: Option<&ExportReport>) {
    match report {
        Some(report) => println!(
            "Exported {} workbook(s), {} query(ies), {} chart(s), {} dashboard(s).",
            report.workbooks, report.queries, report.charts, report.dashboards
        ),
        None => println!("No default workbooks to export."),
    }
}
