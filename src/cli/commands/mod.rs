//! One module per operation.

pub mod add;
pub mod extract;
