/// Defines the concrete parse tree handed to semantic analysis.
///
/// Rule contexts mirror the MiniC grammar one to one; terminals keep their raw text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Identifier,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub kind: TerminalKind,
    pub text: String,
    pub line: i32,
    pub col: i32,
}

impl Terminal {
    pub fn identifier<S: Into<String>>(text: S) -> Self {
        Self {
            kind: TerminalKind::Identifier,
            text: text.into(),
            line: 0,
            col: 0,
        }
    }

    pub fn number<S: Into<String>>(text: S) -> Self {
        Self {
            kind: TerminalKind::Number,
            text: text.into(),
            line: 0,
            col: 0,
        }
    }

    pub fn at(mut self, line: i32, col: i32) -> Self {
        self.line = line;
        self.col = col;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileUnit {
    pub function_definitions: Vec<FunctionDefinition>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: Terminal,
    pub formal_arguments: FormalArguments,
    pub body: CompoundStatement,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormalArguments {
    pub identifiers: Vec<Terminal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActualArguments {
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Expression(Expression),
    Condition(ConditionStatement),
    Repetition(RepetitionStatement),
    Break,
    Return(Expression),
    Compound(CompoundStatement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionStatement {
    pub condition: Expression,
    pub then: Box<Statement>,
    pub otherwise: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepetitionStatement {
    pub condition: Expression,
    pub body: CompoundStatement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompoundStatement {
    Empty,
    NotEmpty(Vec<Statement>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplicativeOp {
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditiveOp {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparativeOp {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Number(Terminal),
    Identifier(Terminal),
    FunctionCall {
        callee: Terminal,
        arguments: ActualArguments,
    },
    Parenthesis(Box<Expression>),
    LogicalNot(Box<Expression>),
    Positive(Box<Expression>),
    Negative(Box<Expression>),
    Multiplicative {
        op: MultiplicativeOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Additive {
        op: AdditiveOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Comparative {
        op: ComparativeOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LogicalAnd {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LogicalOr {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Assignment {
        target: Terminal,
        value: Box<Expression>,
    },
}
