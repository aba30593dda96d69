use comfy_table::presets::ASCII_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use tourforge::board::Board;
use tourforge::core_types::Position;

/// Boards wider than this are summarised instead of drawn.
const MAX_DRAWN_BOARD: usize = 16;

/// Draws the board with each cell holding the step at which it was visited.
pub fn print_tour(n: usize, path: &[Position]) {
    if n > MAX_DRAWN_BOARD {
        println!("\n({}x{} board, {} cells visited)", n, n, path.len());
        return;
    }

    let mut board = Board::new(n);
    for (step, &pos) in path.iter().enumerate() {
        board.mark(pos, step);
    }

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for row in board.rows() {
        let cells: Vec<Cell> = row
            .iter()
            .map(|&step| {
                let label = if step < 0 {
                    ".".to_string()
                } else {
                    step.to_string()
                };
                Cell::new(label).set_alignment(CellAlignment::Right)
            })
            .collect();
        table.add_row(cells);
    }
    println!("\n{}", table);
}
