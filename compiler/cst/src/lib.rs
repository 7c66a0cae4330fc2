pub use tree::*;
pub use visitor::*;

pub mod tree;
pub mod visitor;
