pub mod example;
pub mod normalize;
pub mod table;

pub use example::{ExampleSynthesizer, STRING_PLACEHOLDER, VALUE_PLACEHOLDER, synthesize_schema};
pub use normalize::{normalize, representative_branch};
pub use table::{render_rows, render_table};
