use crate::ast_def::{Ast, NodeId};

/// Double dispatch over the closed set of node kinds.
///
/// Every `visit_*` operation defaults to [`AstVisitor::visit_children`], so an
/// implementor only overrides the kinds it cares about.
pub trait AstVisitor {
    type Output: Default;
    type Params: ?Sized;

    fn visit(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        ast.accept(node, self, params)
    }

    /// Visits every slot in declaration order, folding results with [`AstVisitor::summarize`].
    fn visit_children(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        let mut result = Self::Output::default();

        for child in ast.all_children(node) {
            let latest = self.visit(ast, child, params);
            result = self.summarize(result, latest);
        }

        result
    }

    /// Keeps the most recent child's result.
    fn summarize(&mut self, _accumulated: Self::Output, latest: Self::Output) -> Self::Output {
        latest
    }

    fn visit_compile_unit(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_function_definition(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_formal_arguments(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_actual_arguments(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_return(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_function_call(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_logical_not(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_logical_and(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_logical_or(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_equal(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_not_equal(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_greater(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_greater_equal(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_less(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_less_equal(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_multiplication(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_division(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_addition(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_subtraction(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_positive(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_negative(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_assignment(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_condition(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_repetition(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_compound_empty(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_compound_not_empty(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_break(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_identifier(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }

    fn visit_number(&mut self, ast: &Ast, node: NodeId, params: &Self::Params) -> Self::Output {
        self.visit_children(ast, node, params)
    }
}
