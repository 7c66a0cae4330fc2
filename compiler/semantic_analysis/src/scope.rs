use ast::{Ast, NodeId, TableId};

/// The active chain of lexical tables plus the flat function namespace.
///
/// The chain itself is threaded through the tables' parent links: entering a
/// table makes the current one its parent, leaving restores that parent.
pub struct Scope {
    current: Option<TableId>,
    functions: TableId,
}

impl Scope {
    pub fn new(ast: &mut Ast) -> Self {
        Self {
            current: None,
            functions: ast.add_table(),
        }
    }

    pub fn enter(&mut self, ast: &mut Ast, table: TableId) {
        ast.table_mut(table).set_parent(self.current);
        self.current = Some(table);
    }

    pub fn leave(&mut self, ast: &Ast) {
        let current = self.current();
        self.current = ast.table(current).parent();
    }

    pub fn current(&self) -> TableId {
        self.current
            .unwrap_or_else(|| panic!("Internal Error: no scope has been entered"))
    }

    pub fn lookup(&self, ast: &Ast, name: &str) -> Option<NodeId> {
        self.current.and_then(|table| ast.lookup(table, name))
    }

    pub fn functions(&self) -> TableId {
        self.functions
    }
}
