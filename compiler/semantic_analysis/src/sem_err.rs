use thiserror::Error;

use ast::AstError;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SemErr {
    #[error("Undeclared variable '{name}' at {line}:{col}")]
    UndeclaredVariable { name: String, line: i32, col: i32 },
    #[error("Undeclared function '{name}' at {line}:{col}")]
    UndeclaredFunction { name: String, line: i32, col: i32 },
    #[error("Duplicate function definition '{name}' at {line}:{col}")]
    DuplicateFunction { name: String, line: i32, col: i32 },
    #[error("Duplicate parameter '{name}' at {line}:{col}")]
    DuplicateParameter { name: String, line: i32, col: i32 },
    #[error("Global variable '{name}' at {line}:{col} has the same name as a function")]
    GlobalNamesFunction { name: String, line: i32, col: i32 },
    #[error("'break' outside of a loop")]
    BreakOutsideLoop,
    #[error(transparent)]
    Ast(#[from] AstError),
}

pub type SemanticResult<T> = Result<T, SemErr>;
