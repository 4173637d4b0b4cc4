//! Module for additional computational capabilities
pub mod math_utils;
pub mod sci_format;
pub mod test_helper;
pub mod uom_macros;
pub use math_utils::usize_to_f64;
