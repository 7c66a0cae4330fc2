use std::collections::VecDeque;

use log::{debug, trace};

use ast::{Ast, NodeId, NodeKind, Slot, TableId};
use cst::*;

use crate::scope::Scope;
use crate::sem_err::{SemErr, SemanticResult};

/// Builds the resolved AST for a whole compile unit.
pub fn resolve(unit: &CompileUnit) -> SemanticResult<Ast> {
    let mut generator = AstGenerator::new();
    generator.visit_compile_unit(unit)?;
    Ok(generator.ast)
}

/// Walks the parse tree top-down, creating AST nodes and binding identifiers as it goes.
///
/// Function bodies are queued while their signatures are resolved and only
/// walked once every function name is known.
struct AstGenerator<'t> {
    ast: Ast,
    scope: Scope,
    /// Where the next created node is attached.
    context: Vec<(NodeId, Slot)>,
    deferred: VecDeque<(NodeId, &'t [Statement])>,
    loop_depth: usize,
}

impl<'t> AstGenerator<'t> {
    fn new() -> Self {
        let mut ast = Ast::new();
        let scope = Scope::new(&mut ast);

        Self {
            ast,
            scope,
            context: vec![],
            deferred: VecDeque::new(),
            loop_depth: 0,
        }
    }

    fn enter_context(&mut self, node: NodeId, slot: Slot) {
        self.context.push((node, slot));
    }

    fn leave_context(&mut self) {
        self.context.pop();
    }

    fn current_context(&self) -> (NodeId, Slot) {
        *self
            .context
            .last()
            .unwrap_or_else(|| panic!("Internal Error: node created outside of any context"))
    }

    fn attach(&mut self, node: NodeId) {
        let (parent, slot) = self.current_context();
        self.ast.add_child(parent, slot, node);
    }

    /// Creates a composite under the current context and attaches it there.
    fn new_composite(&mut self, kind: NodeKind) -> NodeId {
        let (parent, _) = self.current_context();
        let node = self.ast.add_composite(kind, Some(parent));
        self.attach(node);
        node
    }

    fn owned_table(&self, node: NodeId) -> TableId {
        self.ast
            .table_of(node)
            .unwrap_or_else(|| panic!("Internal Error: {} has no symbol table", self.ast.label(node)))
    }

    fn visit_statements(&mut self, statements: &'t [Statement]) -> SemanticResult<()> {
        for statement in statements {
            statement.accept(self)?;
        }
        Ok(())
    }

    fn resolve_deferred_bodies(&mut self) -> SemanticResult<()> {
        while let Some((body, statements)) = self.deferred.pop_front() {
            debug!("Resolving deferred body {}", self.ast.label(body));

            let table = self.owned_table(body);
            self.scope.enter(&mut self.ast, table);
            self.enter_context(body, Slot::Statements);
            self.visit_statements(statements)?;
            self.leave_context();
            self.scope.leave(&self.ast);
        }

        Ok(())
    }

    fn visit_unary(&mut self, kind: NodeKind, operand: &'t Expression) -> SemanticResult<()> {
        let node = self.new_composite(kind);
        self.enter_context(node, Slot::Expression);
        self.visit_expression(operand)?;
        self.leave_context();
        Ok(())
    }

    fn visit_binary(
        &mut self,
        kind: NodeKind,
        left: &'t Expression,
        right: &'t Expression,
    ) -> SemanticResult<()> {
        let node = self.new_composite(kind);

        self.enter_context(node, Slot::LeftExpression);
        self.visit_expression(left)?;
        self.leave_context();

        self.enter_context(node, Slot::RightExpression);
        self.visit_expression(right)?;
        self.leave_context();

        Ok(())
    }

    fn declare(&mut self, table: TableId, terminal: &Terminal, site: NodeId) -> NodeId {
        let decl = self.ast.add_identifier(terminal.text.as_str(), Some(site));
        self.ast.table_mut(table).insert(terminal.text.as_str(), decl);
        trace!("Declared {} in table {}", self.ast.label(decl), table.index());
        decl
    }

    fn is_global_table(&self, table: TableId) -> bool {
        self.ast.root().and_then(|unit| self.ast.table_of(unit)) == Some(table)
    }

    /// Binds an identifier according to the role its position gives it.
    fn resolve_identifier(&mut self, terminal: &Terminal) -> SemanticResult<NodeId> {
        let (parent, slot) = self.current_context();
        let name = terminal.text.as_str();

        match (self.ast.kind(parent), slot) {
            (NodeKind::FunctionDefinition, Slot::Identifier) => {
                let functions = self.scope.functions();
                if self.ast.table(functions).contains(name) {
                    return Err(SemErr::DuplicateFunction {
                        name: name.to_string(),
                        line: terminal.line,
                        col: terminal.col,
                    });
                }
                Ok(self.declare(functions, terminal, parent))
            }
            (NodeKind::FormalArguments, _) => {
                let current = self.scope.current();
                if self.ast.table(current).contains(name) {
                    return Err(SemErr::DuplicateParameter {
                        name: name.to_string(),
                        line: terminal.line,
                        col: terminal.col,
                    });
                }
                Ok(self.declare(current, terminal, parent))
            }
            (NodeKind::FunctionCall, Slot::Identifier) => self
                .ast
                .table(self.scope.functions())
                .get(name)
                .ok_or_else(|| SemErr::UndeclaredFunction {
                    name: name.to_string(),
                    line: terminal.line,
                    col: terminal.col,
                }),
            (NodeKind::Assignment, Slot::Identifier) => match self.scope.lookup(&self.ast, name) {
                Some(decl) => Ok(decl),
                None => {
                    let current = self.scope.current();

                    // globals and procedures share one MASM namespace
                    if self.is_global_table(current)
                        && self.ast.table(self.scope.functions()).contains(name)
                    {
                        return Err(SemErr::GlobalNamesFunction {
                            name: name.to_string(),
                            line: terminal.line,
                            col: terminal.col,
                        });
                    }

                    Ok(self.declare(current, terminal, parent))
                }
            },
            _ => self
                .scope
                .lookup(&self.ast, name)
                .ok_or_else(|| SemErr::UndeclaredVariable {
                    name: name.to_string(),
                    line: terminal.line,
                    col: terminal.col,
                }),
        }
    }
}

impl<'t> ParseTreeVisitor<'t> for AstGenerator<'t> {
    type Output = SemanticResult<()>;

    fn visit_compile_unit(&mut self, ctx: &'t CompileUnit) -> SemanticResult<()> {
        let unit = self.ast.add_composite(NodeKind::CompileUnit, None);

        self.enter_context(unit, Slot::FunctionDefinitions);
        for function in &ctx.function_definitions {
            self.visit_function_definition(function)?;
        }
        self.leave_context();

        let globals = self.owned_table(unit);
        self.scope.enter(&mut self.ast, globals);

        self.enter_context(unit, Slot::Statements);
        self.visit_statements(&ctx.statements)?;
        self.leave_context();

        self.resolve_deferred_bodies()?;

        self.scope.leave(&self.ast);

        Ok(())
    }

    fn visit_function_definition(&mut self, ctx: &'t FunctionDefinition) -> SemanticResult<()> {
        let node = self.new_composite(NodeKind::FunctionDefinition);

        self.enter_context(node, Slot::Identifier);
        self.visit_terminal(&ctx.name)?;
        self.leave_context();

        let table = self.owned_table(node);
        self.scope.enter(&mut self.ast, table);

        self.enter_context(node, Slot::FormalArguments);
        self.visit_formal_arguments(&ctx.formal_arguments)?;
        self.leave_context();

        self.enter_context(node, Slot::CompoundStatement);
        ctx.body.accept(self)?;
        self.leave_context();

        self.scope.leave(&self.ast);

        Ok(())
    }

    fn visit_formal_arguments(&mut self, ctx: &'t FormalArguments) -> SemanticResult<()> {
        let node = self.new_composite(NodeKind::FormalArguments);

        self.enter_context(node, Slot::Identifiers);
        for identifier in &ctx.identifiers {
            self.visit_terminal(identifier)?;
        }
        self.leave_context();

        Ok(())
    }

    fn visit_actual_arguments(&mut self, ctx: &'t ActualArguments) -> SemanticResult<()> {
        let node = self.new_composite(NodeKind::ActualArguments);

        self.enter_context(node, Slot::Expressions);
        for expression in &ctx.expressions {
            self.visit_expression(expression)?;
        }
        self.leave_context();

        Ok(())
    }

    fn visit_expression_statement(&mut self, ctx: &'t Expression) -> SemanticResult<()> {
        self.visit_expression(ctx)
    }

    fn visit_condition_statement(&mut self, ctx: &'t ConditionStatement) -> SemanticResult<()> {
        let node = self.new_composite(NodeKind::Condition);

        self.enter_context(node, Slot::Expression);
        self.visit_expression(&ctx.condition)?;
        self.leave_context();

        self.enter_context(node, Slot::Statement);
        ctx.then.accept(self)?;
        self.leave_context();

        if let Some(otherwise) = &ctx.otherwise {
            self.enter_context(node, Slot::StatementElse);
            otherwise.accept(self)?;
            self.leave_context();
        }

        Ok(())
    }

    fn visit_repetition_statement(&mut self, ctx: &'t RepetitionStatement) -> SemanticResult<()> {
        let node = self.new_composite(NodeKind::Repetition);

        self.enter_context(node, Slot::Expression);
        self.visit_expression(&ctx.condition)?;
        self.leave_context();

        self.loop_depth += 1;
        self.enter_context(node, Slot::CompoundStatement);
        ctx.body.accept(self)?;
        self.leave_context();
        self.loop_depth -= 1;

        Ok(())
    }

    fn visit_break_statement(&mut self) -> SemanticResult<()> {
        if self.loop_depth == 0 {
            return Err(SemErr::BreakOutsideLoop);
        }
        self.new_composite(NodeKind::Break);
        Ok(())
    }

    fn visit_return_statement(&mut self, ctx: &'t Expression) -> SemanticResult<()> {
        self.visit_unary(NodeKind::Return, ctx)
    }

    fn visit_compound_statement_empty(&mut self) -> SemanticResult<()> {
        self.new_composite(NodeKind::CompoundEmpty);
        Ok(())
    }

    fn visit_compound_statement_not_empty(&mut self, statements: &'t [Statement]) -> SemanticResult<()> {
        let (parent, _) = self.current_context();

        if self.ast.kind(parent) == NodeKind::FunctionDefinition {
            let table = self.owned_table(parent);
            let body = self
                .ast
                .add_composite_sharing(NodeKind::CompoundNotEmpty, Some(parent), table);
            self.attach(body);

            debug!("Deferring body of {}", self.ast.label(parent));
            self.deferred.push_back((body, statements));
            return Ok(());
        }

        let node = self.new_composite(NodeKind::CompoundNotEmpty);
        let table = self.owned_table(node);

        self.scope.enter(&mut self.ast, table);
        self.enter_context(node, Slot::Statements);
        self.visit_statements(statements)?;
        self.leave_context();
        self.scope.leave(&self.ast);

        Ok(())
    }

    fn visit_expression(&mut self, ctx: &'t Expression) -> SemanticResult<()> {
        match ctx {
            Expression::Number(terminal) | Expression::Identifier(terminal) => {
                self.visit_terminal(terminal)
            }
            Expression::FunctionCall { callee, arguments } => {
                let node = self.new_composite(NodeKind::FunctionCall);

                self.enter_context(node, Slot::Identifier);
                self.visit_terminal(callee)?;
                self.leave_context();

                self.enter_context(node, Slot::ActualArguments);
                self.visit_actual_arguments(arguments)?;
                self.leave_context();

                Ok(())
            }
            Expression::Parenthesis(inner) => self.visit_expression(inner),
            Expression::LogicalNot(inner) => self.visit_unary(NodeKind::LogicalNot, inner),
            Expression::Positive(inner) => self.visit_unary(NodeKind::Positive, inner),
            Expression::Negative(inner) => self.visit_unary(NodeKind::Negative, inner),
            Expression::Multiplicative { op, left, right } => {
                let kind = match op {
                    MultiplicativeOp::Multiply => NodeKind::Multiplication,
                    MultiplicativeOp::Divide => NodeKind::Division,
                };
                self.visit_binary(kind, left, right)
            }
            Expression::Additive { op, left, right } => {
                let kind = match op {
                    AdditiveOp::Add => NodeKind::Addition,
                    AdditiveOp::Subtract => NodeKind::Subtraction,
                };
                self.visit_binary(kind, left, right)
            }
            Expression::Comparative { op, left, right } => {
                let kind = match op {
                    ComparativeOp::Equal => NodeKind::Equal,
                    ComparativeOp::NotEqual => NodeKind::NotEqual,
                    ComparativeOp::Greater => NodeKind::Greater,
                    ComparativeOp::GreaterEqual => NodeKind::GreaterEqual,
                    ComparativeOp::Less => NodeKind::Less,
                    ComparativeOp::LessEqual => NodeKind::LessEqual,
                };
                self.visit_binary(kind, left, right)
            }
            Expression::LogicalAnd { left, right } => {
                self.visit_binary(NodeKind::LogicalAnd, left, right)
            }
            Expression::LogicalOr { left, right } => {
                self.visit_binary(NodeKind::LogicalOr, left, right)
            }
            Expression::Assignment { target, value } => {
                let node = self.new_composite(NodeKind::Assignment);

                // The target is bound first, so `x = x + 1` declares `x` before reading it.
                self.enter_context(node, Slot::Identifier);
                self.visit_terminal(target)?;
                self.leave_context();

                self.enter_context(node, Slot::Expression);
                self.visit_expression(value)?;
                self.leave_context();

                Ok(())
            }
        }
    }

    fn visit_terminal(&mut self, terminal: &'t Terminal) -> SemanticResult<()> {
        let leaf = match terminal.kind {
            TerminalKind::Number => {
                let (parent, _) = self.current_context();
                self.ast.add_number(terminal.text.as_str(), Some(parent))?
            }
            TerminalKind::Identifier => self.resolve_identifier(terminal)?,
        };

        self.attach(leaf);
        Ok(())
    }
}
