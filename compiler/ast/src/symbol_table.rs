use indexmap::IndexMap;

use crate::ast_def::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(usize);

impl TableId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Maps names to the leaf that declares them.
///
/// Entries keep insertion order so the data section lists globals in the order
/// they were first seen.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, NodeId>,
    parent: Option<TableId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Returns the previous declaration if the name was already taken; the new one wins.
    pub fn insert<S: Into<String>>(&mut self, name: S, declaration: NodeId) -> Option<NodeId> {
        self.symbols.insert(name.into(), declaration)
    }

    pub fn parent(&self) -> Option<TableId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<TableId>) {
        self.parent = parent;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.symbols.iter().map(|(name, decl)| (name.as_str(), *decl))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ast;

    #[test]
    fn names_keep_insertion_order() {
        let mut ast = Ast::new();
        let table = ast.add_table();
        for name in ["zeta", "alpha", "mid"] {
            let decl = ast.add_identifier(name, None);
            ast.table_mut(table).insert(name, decl);
        }

        let names: Vec<_> = ast.table(table).names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
