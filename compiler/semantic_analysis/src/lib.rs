pub use ast_gen::*;
pub use sem_err::*;

mod ast_gen;
mod scope;
mod sem_err;
