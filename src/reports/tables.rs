use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tourforge::api::Algorithm;
use tourforge::solver::SolveOutcome;

pub fn stats(name: &str, outcome: &SolveOutcome) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new("Value"),
    ]);
    for (key, value) in outcome.stats.iter() {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }
    println!("\n{}", table);
}

/// Aggregated runs of one registered variant.
#[derive(Debug, Clone)]
pub struct CompareRow {
    pub algorithm: Algorithm,
    pub level: u8,
    pub runs: usize,
    pub successes: usize,
    pub verified: usize,
    pub total_time: f64,
    pub total_steps: usize,
}

pub fn comparison(n: usize, rows: &[CompareRow]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Algorithm").add_attribute(Attribute::Bold),
        Cell::new("Level"),
        Cell::new("Runs"),
        Cell::new("Success").fg(Color::Green),
        Cell::new("Verified"),
        Cell::new("Avg Steps"),
        Cell::new("Coverage"),
        Cell::new("Avg Time (s)").fg(Color::Cyan),
    ]);
    for i in 1..=7 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    let area = (n * n).max(1) as f64;
    for row in rows {
        let runs = row.runs.max(1) as f64;
        let avg_steps = row.total_steps as f64 / runs;

        let success = Cell::new(format!("{}/{}", row.successes, row.runs));
        let success = if row.successes == row.runs {
            success.fg(Color::Green)
        } else {
            success
        };

        table.add_row(vec![
            Cell::new(row.algorithm).add_attribute(Attribute::Bold),
            Cell::new(row.level),
            Cell::new(row.runs),
            success,
            Cell::new(format!("{}/{}", row.verified, row.runs)),
            Cell::new(format!("{:.1}", avg_steps)),
            Cell::new(format!("{:.1}%", 100.0 * avg_steps / area)),
            Cell::new(format!("{:.4}", row.total_time / runs)).fg(Color::Cyan),
        ]);
    }
    println!("\n{}", table);
}
