pub mod model;
pub mod report;

pub use model::load_raw_bin;
pub use report::{ir_lines, ir_listing, IrLine};
