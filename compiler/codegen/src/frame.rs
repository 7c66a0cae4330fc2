use std::collections::{HashMap, HashSet};

use ast::{Ast, AstVisitor, NodeId, Slot};
use lir::{Operand, WORD_SIZE};

/// Frame layout and holder counter of the procedure being lowered.
///
/// A fresh context is made for every procedure, so no slot or holder number
/// leaks from one procedure into the next.
#[derive(Debug, Default)]
pub struct FunctionContext {
    slots: HashMap<NodeId, i32>,
    locals: usize,
    next_temp: usize,
}

impl FunctionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters sit above the return address and the saved `ebp`.
    pub fn add_param(&mut self, decl: NodeId, index: usize) -> i32 {
        let offset = 2 * WORD_SIZE + WORD_SIZE * index as i32;
        self.slots.insert(decl, offset);
        offset
    }

    pub fn add_local(&mut self, decl: NodeId) -> i32 {
        self.locals += 1;
        let offset = -WORD_SIZE * self.locals as i32;
        self.slots.insert(decl, offset);
        offset
    }

    pub fn slot(&self, decl: NodeId) -> Option<i32> {
        self.slots.get(&decl).copied()
    }

    pub fn locals(&self) -> usize {
        self.locals
    }

    pub fn make_temp(&mut self) -> Operand {
        let temp = Operand::Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }
}

/// Declarations first introduced by an assignment under `roots`, in tree order.
pub fn collect_locals(ast: &Ast, roots: &[NodeId], excluded: &HashSet<NodeId>) -> Vec<NodeId> {
    let mut collector = LocalCollector {
        excluded,
        seen: HashSet::new(),
        locals: vec![],
    };

    for root in roots {
        collector.visit(ast, *root, &());
    }

    collector.locals
}

struct LocalCollector<'a> {
    excluded: &'a HashSet<NodeId>,
    seen: HashSet<NodeId>,
    locals: Vec<NodeId>,
}

impl AstVisitor for LocalCollector<'_> {
    type Output = ();
    type Params = ();

    fn visit_assignment(&mut self, ast: &Ast, node: NodeId, params: &()) {
        let target = ast.child(node, Slot::Identifier, 0);

        if !self.excluded.contains(&target) && self.seen.insert(target) {
            self.locals.push(target);
        }

        self.visit_children(ast, node, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_ascend_and_locals_descend() {
        let mut ast = Ast::new();
        let ids: Vec<_> = ["p1", "p2", "x", "y"]
            .iter()
            .map(|name| ast.add_identifier(*name, None))
            .collect();

        let mut frame = FunctionContext::new();
        assert_eq!(frame.add_param(ids[0], 0), 8);
        assert_eq!(frame.add_param(ids[1], 1), 12);
        assert_eq!(frame.add_local(ids[2]), -4);
        assert_eq!(frame.add_local(ids[3]), -8);

        assert_eq!(frame.slot(ids[1]), Some(12));
        assert_eq!(frame.locals(), 2);
    }

    #[test]
    fn holders_are_numbered_per_context() {
        let mut first = FunctionContext::new();
        assert_eq!(first.make_temp(), Operand::Temp(0));
        assert_eq!(first.make_temp(), Operand::Temp(1));

        let mut second = FunctionContext::new();
        assert_eq!(second.make_temp(), Operand::Temp(0));
    }
}
