pub mod document;
pub mod schema;
pub mod validation;

pub use document::{ComponentFilter, Document};
pub use schema::DocumentData;
pub use validation::validate;
