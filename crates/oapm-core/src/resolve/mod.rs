pub mod deref;
pub mod pointer;

pub use deref::{CIRCULAR_REF_KEY, Dereferencer, dereference_all, is_reference_free};
pub use pointer::{RefResolver, Referable, ref_name};
