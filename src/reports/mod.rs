mod grid;
mod tables;

pub use self::grid::print_tour as print_tour_grid;
pub use self::tables::{comparison as print_comparison_report, stats as print_stats_report, CompareRow};
