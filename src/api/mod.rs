pub mod validate;

pub use validate::{Validate, Validator};
