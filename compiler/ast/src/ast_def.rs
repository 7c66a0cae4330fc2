use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::symbol_table::{SymbolTable, TableId};
use crate::visitor::AstVisitor;

/// Defines the arena backed AST.
///
/// Composite nodes own their children through slots; a child may only be
/// reached from its parent's slots. Declaration leaves are the exception:
/// every identifier occurrence bound to a declaration stores the declaration's
/// `NodeId`, so comparing ids tells whether two occurrences name the same thing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    CompileUnit,

    FunctionDefinition,
    FormalArguments,
    ActualArguments,
    Return,

    FunctionCall,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Multiplication,
    Division,
    Addition,
    Subtraction,
    Positive,
    Negative,
    Assignment,

    Condition,
    Repetition,
    CompoundEmpty,
    CompoundNotEmpty,
    Break,

    Identifier,
    Number,
}

/// Named child positions. Which ones a node has depends on its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Statements,
    FunctionDefinitions,
    Identifier,
    Identifiers,
    FormalArguments,
    ActualArguments,
    CompoundStatement,
    Expressions,
    Expression,
    LeftExpression,
    RightExpression,
    Statement,
    StatementElse,
}

const BINARY_SLOTS: &[Slot] = &[Slot::LeftExpression, Slot::RightExpression];
const UNARY_SLOTS: &[Slot] = &[Slot::Expression];

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::CompileUnit => "COMPILE_UNIT",
            NodeKind::FunctionDefinition => "FUNCTION_DEFINITION",
            NodeKind::FormalArguments => "FORMAL_ARGUMENTS",
            NodeKind::ActualArguments => "ACTUAL_ARGUMENTS",
            NodeKind::Return => "RETURN",
            NodeKind::FunctionCall => "EXPRESSION_FUNCTION_CALL",
            NodeKind::LogicalNot => "EXPRESSION_LOGICAL_NOT",
            NodeKind::LogicalAnd => "EXPRESSION_LOGICAL_AND",
            NodeKind::LogicalOr => "EXPRESSION_LOGICAL_OR",
            NodeKind::Equal => "EXPRESSION_LOGICAL_EQUAL",
            NodeKind::NotEqual => "EXPRESSION_LOGICAL_NEQUAL",
            NodeKind::Greater => "EXPRESSION_LOGICAL_GT",
            NodeKind::GreaterEqual => "EXPRESSION_LOGICAL_GTE",
            NodeKind::Less => "EXPRESSION_LOGICAL_LT",
            NodeKind::LessEqual => "EXPRESSION_LOGICAL_LTE",
            NodeKind::Multiplication => "EXPRESSION_MULTIPLICATION",
            NodeKind::Division => "EXPRESSION_DIVISION",
            NodeKind::Addition => "EXPRESSION_ADDITION",
            NodeKind::Subtraction => "EXPRESSION_SUBTRACTION",
            NodeKind::Positive => "EXPRESSION_POSITIVE",
            NodeKind::Negative => "EXPRESSION_NEGATIVE",
            NodeKind::Assignment => "EXPRESSION_ASSIGNMENT",
            NodeKind::Condition => "STATEMENT_CONDITION",
            NodeKind::Repetition => "STATEMENT_REPETITION",
            NodeKind::CompoundEmpty => "STATEMENT_COMPOUND_EMPTY",
            NodeKind::CompoundNotEmpty => "STATEMENT_COMPOUND_NOT_EMPTY",
            NodeKind::Break => "BREAK",
            NodeKind::Identifier => "IDENTIFIER",
            NodeKind::Number => "NUMBER",
        }
    }

    /// Numeric tag, in declaration order.
    pub fn tag(self) -> usize {
        self as usize
    }

    /// The slots this kind declares, in traversal order.
    pub fn slots(self) -> &'static [Slot] {
        match self {
            NodeKind::CompileUnit => &[Slot::Statements, Slot::FunctionDefinitions],
            NodeKind::FunctionDefinition => &[
                Slot::Identifier,
                Slot::FormalArguments,
                Slot::CompoundStatement,
            ],
            NodeKind::FormalArguments => &[Slot::Identifiers],
            NodeKind::ActualArguments => &[Slot::Expressions],
            NodeKind::FunctionCall => &[Slot::Identifier, Slot::ActualArguments],
            NodeKind::Return
            | NodeKind::LogicalNot
            | NodeKind::Positive
            | NodeKind::Negative => UNARY_SLOTS,
            NodeKind::LogicalAnd
            | NodeKind::LogicalOr
            | NodeKind::Equal
            | NodeKind::NotEqual
            | NodeKind::Greater
            | NodeKind::GreaterEqual
            | NodeKind::Less
            | NodeKind::LessEqual
            | NodeKind::Multiplication
            | NodeKind::Division
            | NodeKind::Addition
            | NodeKind::Subtraction => BINARY_SLOTS,
            NodeKind::Assignment => &[Slot::Identifier, Slot::Expression],
            NodeKind::Condition => &[Slot::Expression, Slot::Statement, Slot::StatementElse],
            NodeKind::Repetition => &[Slot::Expression, Slot::CompoundStatement],
            NodeKind::CompoundNotEmpty => &[Slot::Statements],
            NodeKind::CompoundEmpty
            | NodeKind::Break
            | NodeKind::Identifier
            | NodeKind::Number => &[],
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Identifier | NodeKind::Number)
    }

    /// Kinds that introduce a lexical symbol table.
    pub fn owns_table(self) -> bool {
        matches!(
            self,
            NodeKind::CompileUnit | NodeKind::FunctionDefinition | NodeKind::CompoundNotEmpty
        )
    }

    fn slot_index(self, slot: Slot) -> Option<usize> {
        self.slots().iter().position(|s| *s == slot)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum AstError {
    #[error("Invalid number literal '{0}'")]
    InvalidNumberLiteral(String),
    #[error("{kind} nodes have no {slot:?} slot")]
    SlotOutOfRange { kind: NodeKind, slot: Slot },
    #[error("{slot:?} slot of {label} has no child at index {index}")]
    ChildOutOfRange {
        label: String,
        slot: Slot,
        index: usize,
    },
}

#[derive(Debug, Clone)]
enum NodeData {
    Composite {
        children: Vec<Vec<NodeId>>,
        table: Option<TableId>,
    },
    Leaf {
        literal: String,
        value: Option<i32>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    serial: usize,
    parent: Option<NodeId>,
    data: NodeData,
}

#[derive(Debug, Default, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    tables: Vec<SymbolTable>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The compile unit, once one has been created.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Creates a composite node. Kinds that own a symbol table get a fresh, unparented one.
    pub fn add_composite(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let table = kind.owns_table().then(|| self.add_table());
        self.push_composite(kind, parent, table)
    }

    /// Creates a composite node that shares an existing table instead of owning a new one.
    ///
    /// Used for a function body, which declares into its function's table.
    pub fn add_composite_sharing(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        table: TableId,
    ) -> NodeId {
        if !kind.owns_table() {
            panic!("Internal Error: {} nodes cannot carry a symbol table", kind);
        }
        self.push_composite(kind, parent, Some(table))
    }

    pub fn add_identifier<S: Into<String>>(&mut self, literal: S, parent: Option<NodeId>) -> NodeId {
        self.push_node(
            NodeKind::Identifier,
            parent,
            NodeData::Leaf {
                literal: literal.into(),
                value: None,
            },
        )
    }

    /// Creates a number leaf; the literal must fit a signed 32-bit integer.
    pub fn add_number<S: Into<String>>(
        &mut self,
        literal: S,
        parent: Option<NodeId>,
    ) -> Result<NodeId, AstError> {
        let literal = literal.into();
        let value = literal
            .parse::<i32>()
            .map_err(|_| AstError::InvalidNumberLiteral(literal.clone()))?;

        Ok(self.push_node(
            NodeKind::Number,
            parent,
            NodeData::Leaf {
                literal,
                value: Some(value),
            },
        ))
    }

    /// Appends `child` to `slot` of `parent`. Panics if the parent's kind lacks that slot.
    pub fn add_child(&mut self, parent: NodeId, slot: Slot, child: NodeId) {
        let kind = self.kind(parent);
        let index = kind
            .slot_index(slot)
            .unwrap_or_else(|| panic!("Internal Error: {} nodes have no {:?} slot", kind, slot));

        match &mut self.nodes[parent.0].data {
            NodeData::Composite { children, .. } => children[index].push(child),
            NodeData::Leaf { .. } => unreachable!("Internal Error: leaves declare no slots"),
        }
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }

    pub fn serial(&self, node: NodeId) -> usize {
        self.node(node).serial
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Source text of a leaf, `None` for composites.
    pub fn literal(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).data {
            NodeData::Leaf { literal, .. } => Some(literal),
            NodeData::Composite { .. } => None,
        }
    }

    pub fn number_value(&self, node: NodeId) -> Option<i32> {
        match &self.node(node).data {
            NodeData::Leaf { value, .. } => *value,
            NodeData::Composite { .. } => None,
        }
    }

    pub fn try_children(&self, node: NodeId, slot: Slot) -> Result<&[NodeId], AstError> {
        let kind = self.kind(node);
        let index = kind
            .slot_index(slot)
            .ok_or(AstError::SlotOutOfRange { kind, slot })?;

        match &self.node(node).data {
            NodeData::Composite { children, .. } => Ok(&children[index]),
            NodeData::Leaf { .. } => Err(AstError::SlotOutOfRange { kind, slot }),
        }
    }

    pub fn children(&self, node: NodeId, slot: Slot) -> &[NodeId] {
        self.try_children(node, slot)
            .unwrap_or_else(|e| panic!("Internal Error: {}", e))
    }

    pub fn try_child(&self, node: NodeId, slot: Slot, index: usize) -> Result<NodeId, AstError> {
        self.try_children(node, slot)?
            .get(index)
            .copied()
            .ok_or_else(|| AstError::ChildOutOfRange {
                label: self.label(node),
                slot,
                index,
            })
    }

    pub fn child(&self, node: NodeId, slot: Slot, index: usize) -> NodeId {
        self.try_child(node, slot, index)
            .unwrap_or_else(|e| panic!("Internal Error: {}", e))
    }

    /// The single child of an optional slot, such as an `else` branch.
    pub fn first_child(&self, node: NodeId, slot: Slot) -> Option<NodeId> {
        self.children(node, slot).first().copied()
    }

    /// Every child in slot order, then in insertion order within each slot.
    pub fn all_children(&self, node: NodeId) -> Vec<NodeId> {
        match &self.node(node).data {
            NodeData::Composite { children, .. } => children.iter().flatten().copied().collect(),
            NodeData::Leaf { .. } => vec![],
        }
    }

    pub fn table_of(&self, node: NodeId) -> Option<TableId> {
        match &self.node(node).data {
            NodeData::Composite { table, .. } => *table,
            NodeData::Leaf { .. } => None,
        }
    }

    pub fn add_table(&mut self) -> TableId {
        self.tables.push(SymbolTable::new());
        TableId::new(self.tables.len() - 1)
    }

    pub fn table(&self, table: TableId) -> &SymbolTable {
        &self.tables[table.index()]
    }

    pub fn table_mut(&mut self, table: TableId) -> &mut SymbolTable {
        &mut self.tables[table.index()]
    }

    /// Searches `table`, then each enclosing table, returning the first declaration named `name`.
    pub fn lookup(&self, table: TableId, name: &str) -> Option<NodeId> {
        let mut current = Some(table);
        while let Some(t) = current {
            let symbols = self.table(t);
            if let Some(decl) = symbols.get(name) {
                return Some(decl);
            }
            current = symbols.parent();
        }
        None
    }

    /// `KIND(tag)-S<serial>`, prefixed with the literal for leaves.
    pub fn label(&self, node: NodeId) -> String {
        let n = self.node(node);
        let base = format!("{}({})-S{}", n.kind.name(), n.kind.tag(), n.serial);

        match &n.data {
            NodeData::Leaf { literal, .. } => format!("{}-{}", literal, base),
            NodeData::Composite { .. } => base,
        }
    }

    /// Calls the visitor operation matching the node's kind.
    pub fn accept<V: AstVisitor + ?Sized>(
        &self,
        node: NodeId,
        visitor: &mut V,
        params: &V::Params,
    ) -> V::Output {
        match self.kind(node) {
            NodeKind::CompileUnit => visitor.visit_compile_unit(self, node, params),
            NodeKind::FunctionDefinition => visitor.visit_function_definition(self, node, params),
            NodeKind::FormalArguments => visitor.visit_formal_arguments(self, node, params),
            NodeKind::ActualArguments => visitor.visit_actual_arguments(self, node, params),
            NodeKind::Return => visitor.visit_return(self, node, params),
            NodeKind::FunctionCall => visitor.visit_function_call(self, node, params),
            NodeKind::LogicalNot => visitor.visit_logical_not(self, node, params),
            NodeKind::LogicalAnd => visitor.visit_logical_and(self, node, params),
            NodeKind::LogicalOr => visitor.visit_logical_or(self, node, params),
            NodeKind::Equal => visitor.visit_equal(self, node, params),
            NodeKind::NotEqual => visitor.visit_not_equal(self, node, params),
            NodeKind::Greater => visitor.visit_greater(self, node, params),
            NodeKind::GreaterEqual => visitor.visit_greater_equal(self, node, params),
            NodeKind::Less => visitor.visit_less(self, node, params),
            NodeKind::LessEqual => visitor.visit_less_equal(self, node, params),
            NodeKind::Multiplication => visitor.visit_multiplication(self, node, params),
            NodeKind::Division => visitor.visit_division(self, node, params),
            NodeKind::Addition => visitor.visit_addition(self, node, params),
            NodeKind::Subtraction => visitor.visit_subtraction(self, node, params),
            NodeKind::Positive => visitor.visit_positive(self, node, params),
            NodeKind::Negative => visitor.visit_negative(self, node, params),
            NodeKind::Assignment => visitor.visit_assignment(self, node, params),
            NodeKind::Condition => visitor.visit_condition(self, node, params),
            NodeKind::Repetition => visitor.visit_repetition(self, node, params),
            NodeKind::CompoundEmpty => visitor.visit_compound_empty(self, node, params),
            NodeKind::CompoundNotEmpty => visitor.visit_compound_not_empty(self, node, params),
            NodeKind::Break => visitor.visit_break(self, node, params),
            NodeKind::Identifier => visitor.visit_identifier(self, node, params),
            NodeKind::Number => visitor.visit_number(self, node, params),
        }
    }

    fn node(&self, node: NodeId) -> &Node {
        self.nodes
            .get(node.0)
            .unwrap_or_else(|| panic!("Internal Error: node {} is not in this tree", node.0))
    }

    fn push_composite(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        table: Option<TableId>,
    ) -> NodeId {
        if kind.is_leaf() {
            panic!("Internal Error: {} is a leaf kind", kind);
        }

        let id = self.push_node(
            kind,
            parent,
            NodeData::Composite {
                children: vec![vec![]; kind.slots().len()],
                table,
            },
        );

        if kind == NodeKind::CompileUnit && self.root.is_none() {
            self.root = Some(id);
        }

        id
    }

    fn push_node(&mut self, kind: NodeKind, parent: Option<NodeId>, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            kind,
            serial: unique_ident::next_serial(),
            parent,
            data,
        });
        NodeId(self.nodes.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_kinds_declare_left_then_right() {
        assert_eq!(
            NodeKind::Division.slots(),
            &[Slot::LeftExpression, Slot::RightExpression]
        );
        assert_eq!(NodeKind::Number.slots(), &[] as &[Slot]);
    }

    #[test]
    fn slots_keep_children_in_order() {
        let mut ast = Ast::new();
        let unit = ast.add_composite(NodeKind::CompileUnit, None);
        let args = ast.add_composite(NodeKind::ActualArguments, Some(unit));
        let a = ast.add_number("1", Some(args)).unwrap();
        let b = ast.add_number("2", Some(args)).unwrap();
        ast.add_child(args, Slot::Expressions, a);
        ast.add_child(args, Slot::Expressions, b);

        assert_eq!(ast.root(), Some(unit));
        assert_eq!(ast.children(args, Slot::Expressions), &[a, b]);
        assert_eq!(ast.child(args, Slot::Expressions, 1), b);
        assert_eq!(ast.parent(b), Some(args));
        assert_eq!(ast.number_value(b), Some(2));
    }

    #[test]
    fn out_of_range_requests_are_errors() {
        let mut ast = Ast::new();
        let neg = ast.add_composite(NodeKind::Negative, None);

        assert_eq!(
            ast.try_children(neg, Slot::Statements),
            Err(AstError::SlotOutOfRange {
                kind: NodeKind::Negative,
                slot: Slot::Statements
            })
        );
        assert!(matches!(
            ast.try_child(neg, Slot::Expression, 0),
            Err(AstError::ChildOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "Internal Error")]
    fn adding_to_undeclared_slot_panics() {
        let mut ast = Ast::new();
        let brk = ast.add_composite(NodeKind::Break, None);
        let n = ast.add_number("1", Some(brk)).unwrap();
        ast.add_child(brk, Slot::Expression, n);
    }

    #[test]
    fn number_literal_must_fit_i32() {
        let mut ast = Ast::new();
        assert_eq!(
            ast.add_number("2147483648", None),
            Err(AstError::InvalidNumberLiteral("2147483648".to_string()))
        );
        assert!(ast.add_number("2147483647", None).is_ok());
    }

    #[test]
    fn labels_carry_kind_tag_and_serial() {
        let mut ast = Ast::new();
        let unit = ast.add_composite(NodeKind::CompileUnit, None);
        let x = ast.add_identifier("x", Some(unit));

        assert_eq!(
            ast.label(unit),
            format!("COMPILE_UNIT(0)-S{}", ast.serial(unit))
        );
        assert_eq!(
            ast.label(x),
            format!("x-IDENTIFIER(27)-S{}", ast.serial(x))
        );
        assert!(ast.serial(x) > ast.serial(unit));
    }

    #[test]
    fn lookup_walks_enclosing_tables() {
        let mut ast = Ast::new();
        let outer = ast.add_table();
        let inner = ast.add_table();
        ast.table_mut(inner).set_parent(Some(outer));

        let x_outer = ast.add_identifier("x", None);
        let x_inner = ast.add_identifier("x", None);
        let y = ast.add_identifier("y", None);
        ast.table_mut(outer).insert("x", x_outer);
        ast.table_mut(outer).insert("y", y);
        ast.table_mut(inner).insert("x", x_inner);

        assert_eq!(ast.lookup(inner, "x"), Some(x_inner));
        assert_eq!(ast.lookup(inner, "y"), Some(y));
        assert_eq!(ast.lookup(outer, "x"), Some(x_outer));
        assert_eq!(ast.lookup(inner, "z"), None);
    }
}
