pub mod incident;

pub use incident::*;
