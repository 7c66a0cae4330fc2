pub use ast_def::*;
pub use print_ast::*;
pub use symbol_table::*;
pub use visitor::*;

mod ast_def;
mod print_ast;
mod symbol_table;
mod visitor;
