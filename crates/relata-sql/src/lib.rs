pub mod serializer;
pub use serializer::{Compiled, Params, Placeholder, Serializer};

mod extract;
pub use extract::{extract_expr_values, extract_source_values, extract_values};

pub use relata_core::stmt;
