use crate::tree::*;

/// Top-down dispatch over the parse tree.
///
/// `'t` is the lifetime of the tree being walked, so a visitor may hold on to
/// sub-trees (for example to revisit a function body later).
pub trait ParseTreeVisitor<'t> {
    type Output;

    fn visit_compile_unit(&mut self, ctx: &'t CompileUnit) -> Self::Output;
    fn visit_function_definition(&mut self, ctx: &'t FunctionDefinition) -> Self::Output;
    fn visit_formal_arguments(&mut self, ctx: &'t FormalArguments) -> Self::Output;
    fn visit_actual_arguments(&mut self, ctx: &'t ActualArguments) -> Self::Output;

    fn visit_expression_statement(&mut self, ctx: &'t Expression) -> Self::Output;
    fn visit_condition_statement(&mut self, ctx: &'t ConditionStatement) -> Self::Output;
    fn visit_repetition_statement(&mut self, ctx: &'t RepetitionStatement) -> Self::Output;
    fn visit_break_statement(&mut self) -> Self::Output;
    fn visit_return_statement(&mut self, ctx: &'t Expression) -> Self::Output;
    fn visit_compound_statement_empty(&mut self) -> Self::Output;
    fn visit_compound_statement_not_empty(&mut self, statements: &'t [Statement]) -> Self::Output;

    fn visit_expression(&mut self, ctx: &'t Expression) -> Self::Output;
    fn visit_terminal(&mut self, terminal: &'t Terminal) -> Self::Output;
}

impl Statement {
    pub fn accept<'t, V: ParseTreeVisitor<'t> + ?Sized>(&'t self, visitor: &mut V) -> V::Output {
        match self {
            Statement::Expression(expr) => visitor.visit_expression_statement(expr),
            Statement::Condition(ctx) => visitor.visit_condition_statement(ctx),
            Statement::Repetition(ctx) => visitor.visit_repetition_statement(ctx),
            Statement::Break => visitor.visit_break_statement(),
            Statement::Return(expr) => visitor.visit_return_statement(expr),
            Statement::Compound(compound) => compound.accept(visitor),
        }
    }
}

impl CompoundStatement {
    pub fn accept<'t, V: ParseTreeVisitor<'t> + ?Sized>(&'t self, visitor: &mut V) -> V::Output {
        match self {
            CompoundStatement::Empty => visitor.visit_compound_statement_empty(),
            CompoundStatement::NotEmpty(statements) => {
                visitor.visit_compound_statement_not_empty(statements)
            }
        }
    }

    pub fn statements(&self) -> &[Statement] {
        match self {
            CompoundStatement::Empty => &[],
            CompoundStatement::NotEmpty(statements) => statements,
        }
    }
}
