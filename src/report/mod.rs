pub mod amount;
pub mod builder;
pub mod csv_writer;
pub mod table;

pub use builder::{
    Alignment, CellColor, ChainReport, Column, Overflow, ReportBuilder, ReportMode, RowValues,
    OVERFLOW_CELL,
};
pub use csv_writer::{csv_path, save_csv};
