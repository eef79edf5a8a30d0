pub mod field_types;
pub mod types;

pub use field_types::*;
pub use types::*;
