pub use lex::*;

mod lex;
