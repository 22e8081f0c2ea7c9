pub mod config;
pub mod error;
pub mod parse;
pub mod resolve;
pub mod schema;

pub use error::{ConvertError, ParseError, ResolveError};
pub use parse::Document;
