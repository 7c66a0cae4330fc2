use std::fmt::{Display, Formatter};

use itertools::{peek_nth, PeekNth};
use thiserror::Error;

use cst::*;
use lexer::*;

#[derive(Error, Clone, Debug)]
pub struct ParseError {
    message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ParseError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

macro_rules! match_token_types {
    ($( $token:pat ),+ ) => {
        $(
        Some(Token{ kind: $token, ..})
        )|+
    };
}

pub struct Parser {
    tokens: PeekNth<std::vec::IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: peek_nth(tokens),
        }
    }

    pub fn parse(&mut self) -> Result<CompileUnit, ParseError> {
        let mut unit = CompileUnit::default();

        while let Some(token) = self.tokens.peek() {
            if token.kind == TokenType::Function {
                unit.function_definitions.push(self.parse_function_definition()?);
            } else {
                unit.statements.push(self.parse_stmt()?);
            }
        }

        Ok(unit)
    }

    fn parse_function_definition(&mut self) -> Result<FunctionDefinition, ParseError> {
        self.expect(TokenType::Function)?;
        let name = self.parse_terminal(TokenType::Identifier)?;

        self.expect(TokenType::OpenParen)?;
        let formal_arguments = self.parse_formal_arguments()?;
        self.expect(TokenType::CloseParen)?;

        let body = self.parse_compound()?;

        Ok(FunctionDefinition {
            name,
            formal_arguments,
            body,
        })
    }

    fn parse_formal_arguments(&mut self) -> Result<FormalArguments, ParseError> {
        let mut identifiers = vec![];

        if self.next_is(TokenType::CloseParen) {
            return Ok(FormalArguments { identifiers });
        }

        identifiers.push(self.parse_terminal(TokenType::Identifier)?);
        while self.next_is(TokenType::Comma) {
            self.tokens.next();
            identifiers.push(self.parse_terminal(TokenType::Identifier)?);
        }

        Ok(FormalArguments { identifiers })
    }

    fn parse_actual_arguments(&mut self) -> Result<ActualArguments, ParseError> {
        let mut expressions = vec![];

        if self.next_is(TokenType::CloseParen) {
            return Ok(ActualArguments { expressions });
        }

        expressions.push(self.parse_expr(0)?);
        while self.next_is(TokenType::Comma) {
            self.tokens.next();
            expressions.push(self.parse_expr(0)?);
        }

        Ok(ActualArguments { expressions })
    }

    fn parse_compound(&mut self) -> Result<CompoundStatement, ParseError> {
        self.expect(TokenType::OpenBrace)?;

        if self.next_is(TokenType::CloseBrace) {
            self.tokens.next();
            return Ok(CompoundStatement::Empty);
        }

        let mut statements = vec![];

        while self
            .tokens
            .peek()
            .is_some_and(|t| t.kind != TokenType::CloseBrace)
        {
            statements.push(self.parse_stmt()?);
        }

        self.expect(TokenType::CloseBrace)?;

        Ok(CompoundStatement::NotEmpty(statements))
    }

    fn parse_stmt(&mut self) -> Result<Statement, ParseError> {
        let is_assignment = self.nth_is(1, TokenType::Equal);

        match self.tokens.peek() {
            match_token_types!(TokenType::If) => self.parse_condition(),
            match_token_types!(TokenType::While) => {
                self.tokens.next();
                self.expect(TokenType::OpenParen)?;
                let condition = self.parse_expr(0)?;
                self.expect(TokenType::CloseParen)?;
                let body = self.parse_compound()?;

                Ok(Statement::Repetition(RepetitionStatement { condition, body }))
            }
            match_token_types!(TokenType::Break) => {
                self.tokens.next();
                self.expect(TokenType::Semicolon)?;
                Ok(Statement::Break)
            }
            match_token_types!(TokenType::Return) => {
                self.tokens.next();
                let expr = self.parse_expr(0)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Statement::Return(expr))
            }
            match_token_types!(TokenType::OpenBrace) => Ok(Statement::Compound(self.parse_compound()?)),
            match_token_types!(TokenType::Identifier) if is_assignment => {
                let target = self.parse_terminal(TokenType::Identifier)?;
                self.expect(TokenType::Equal)?;
                let value = self.parse_expr(0)?;
                self.expect(TokenType::Semicolon)?;

                Ok(Statement::Expression(Expression::Assignment {
                    target,
                    value: Box::new(value),
                }))
            }
            Some(_) => {
                let expr = self.parse_expr(0)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Statement::Expression(expr))
            }
            None => Err(ParseError::new(
                "Expected a statement, but found end of file instead".to_string(),
            )),
        }
    }

    fn parse_condition(&mut self) -> Result<Statement, ParseError> {
        self.expect(TokenType::If)?;
        self.expect(TokenType::OpenParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenType::CloseParen)?;

        let then = Box::new(self.parse_stmt()?);

        let otherwise = if self.next_is(TokenType::Else) {
            self.tokens.next();
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Statement::Condition(ConditionStatement {
            condition,
            then,
            otherwise,
        }))
    }

    fn parse_expr(&mut self, min_prec: i32) -> Result<Expression, ParseError> {
        let mut left = self.parse_factor()?;

        while let Some(prec) = self.tokens.peek().and_then(|t| get_precedence(t.kind)) {
            if prec < min_prec {
                break;
            }

            let operator = self.tokens.next().map(|t| t.kind);
            let right = Box::new(self.parse_expr(prec + 1)?);
            let left_box = Box::new(left);

            left = match operator {
                Some(TokenType::Star) => Expression::Multiplicative {
                    op: MultiplicativeOp::Multiply,
                    left: left_box,
                    right,
                },
                Some(TokenType::Slash) => Expression::Multiplicative {
                    op: MultiplicativeOp::Divide,
                    left: left_box,
                    right,
                },
                Some(TokenType::Plus) => Expression::Additive {
                    op: AdditiveOp::Add,
                    left: left_box,
                    right,
                },
                Some(TokenType::Minus) => Expression::Additive {
                    op: AdditiveOp::Subtract,
                    left: left_box,
                    right,
                },
                Some(TokenType::AmpAmp) => Expression::LogicalAnd {
                    left: left_box,
                    right,
                },
                Some(TokenType::PipePipe) => Expression::LogicalOr {
                    left: left_box,
                    right,
                },
                Some(kind) => Expression::Comparative {
                    op: get_comparative(kind),
                    left: left_box,
                    right,
                },
                None => unreachable!("Internal Error: operator token vanished after peek"),
            };
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expression, ParseError> {
        match self.tokens.peek() {
            match_token_types!(TokenType::Minus) => {
                self.tokens.next();
                Ok(Expression::Negative(Box::new(self.parse_factor()?)))
            }
            match_token_types!(TokenType::Plus) => {
                self.tokens.next();
                Ok(Expression::Positive(Box::new(self.parse_factor()?)))
            }
            match_token_types!(TokenType::Bang) => {
                self.tokens.next();
                Ok(Expression::LogicalNot(Box::new(self.parse_factor()?)))
            }
            Some(_) => self.parse_primary_expr(),
            None => Err(ParseError::new(
                "Expected an expression, but found end of file instead".to_string(),
            )),
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expression, ParseError> {
        match self.tokens.peek() {
            match_token_types!(TokenType::OpenParen) => {
                self.tokens.next();
                let expr = self.parse_expr(0)?;
                self.expect(TokenType::CloseParen)?;

                Ok(Expression::Parenthesis(Box::new(expr)))
            }
            match_token_types!(TokenType::Number) => {
                Ok(Expression::Number(self.parse_terminal(TokenType::Number)?))
            }
            match_token_types!(TokenType::Identifier) => {
                let ident = self.parse_terminal(TokenType::Identifier)?;

                if self.next_is(TokenType::OpenParen) {
                    self.tokens.next();
                    let arguments = self.parse_actual_arguments()?;
                    self.expect(TokenType::CloseParen)?;

                    Ok(Expression::FunctionCall {
                        callee: ident,
                        arguments,
                    })
                } else if self.next_is(TokenType::Equal) {
                    Err(ParseError::new(format!(
                        "Assignment to '{}' at {}:{} cannot be used as a value",
                        ident.text, ident.line, ident.col
                    )))
                } else {
                    Ok(Expression::Identifier(ident))
                }
            }
            t => Err(ParseError::new(format!(
                "Expected a factor, found '{:?}'",
                t
            ))),
        }
    }

    fn parse_terminal(&mut self, expected: TokenType) -> Result<Terminal, ParseError> {
        let token = self.expect(expected)?;

        let terminal = match (token.kind, token.text()) {
            (TokenType::Identifier, Some(text)) => Terminal::identifier(text),
            (TokenType::Number, Some(text)) => Terminal::number(text),
            _ => {
                return Err(ParseError::new(format!(
                    "Expected an identifier or number, but found {:?}",
                    token
                )))
            }
        };

        Ok(terminal.at(token.line, token.col))
    }

    /// Checks if next token is of correct expected type
    fn expect(&mut self, expected: TokenType) -> Result<Token, ParseError> {
        match self.tokens.next() {
            Some(t) if t.kind == expected => Ok(t),
            Some(t) => Err(ParseError::new(format!(
                "Expected {:?}, but found {:?} at {}:{}",
                expected, t.kind, t.line, t.col
            ))),
            None => Err(ParseError::new(format!(
                "Expected {:?}, but found end of file",
                expected
            ))),
        }
    }

    fn next_is(&mut self, kind: TokenType) -> bool {
        self.nth_is(0, kind)
    }

    fn nth_is(&mut self, n: usize, kind: TokenType) -> bool {
        self.tokens.peek_nth(n).is_some_and(|t| t.kind == kind)
    }
}

fn get_precedence(token: TokenType) -> Option<i32> {
    match token {
        TokenType::Star | TokenType::Slash => Some(50),
        TokenType::Plus | TokenType::Minus => Some(45),
        TokenType::Less
        | TokenType::LessEqual
        | TokenType::Greater
        | TokenType::GreaterEqual
        | TokenType::EqualEqual
        | TokenType::BangEqual => Some(35),
        TokenType::AmpAmp => Some(10),
        TokenType::PipePipe => Some(5),
        _ => None,
    }
}

fn get_comparative(token_type: TokenType) -> ComparativeOp {
    match token_type {
        TokenType::EqualEqual => ComparativeOp::Equal,
        TokenType::BangEqual => ComparativeOp::NotEqual,
        TokenType::Greater => ComparativeOp::Greater,
        TokenType::GreaterEqual => ComparativeOp::GreaterEqual,
        TokenType::Less => ComparativeOp::Less,
        TokenType::LessEqual => ComparativeOp::LessEqual,

        _ => unreachable!("Not a comparison operator: '{:?}'", token_type),
    }
}

#[cfg(test)]
mod tests {
    use lexer::*;

    use super::*;

    fn parser(src: &str) -> Parser {
        let tokens = Lexer::new(src).tokenize().collect();
        Parser::new(tokens)
    }

    fn num(text: &str) -> Box<Expression> {
        Box::new(Expression::Number(Terminal::number(text)))
    }

    fn ident(text: &str) -> Box<Expression> {
        Box::new(Expression::Identifier(Terminal::identifier(text)))
    }

    /// Terminal positions are irrelevant for shape comparisons
    fn strip_positions(expr: Expression) -> Expression {
        match expr {
            Expression::Number(t) => Expression::Number(Terminal::number(t.text)),
            Expression::Identifier(t) => Expression::Identifier(Terminal::identifier(t.text)),
            Expression::Additive { op, left, right } => Expression::Additive {
                op,
                left: Box::new(strip_positions(*left)),
                right: Box::new(strip_positions(*right)),
            },
            Expression::Multiplicative { op, left, right } => Expression::Multiplicative {
                op,
                left: Box::new(strip_positions(*left)),
                right: Box::new(strip_positions(*right)),
            },
            Expression::Comparative { op, left, right } => Expression::Comparative {
                op,
                left: Box::new(strip_positions(*left)),
                right: Box::new(strip_positions(*right)),
            },
            Expression::LogicalAnd { left, right } => Expression::LogicalAnd {
                left: Box::new(strip_positions(*left)),
                right: Box::new(strip_positions(*right)),
            },
            Expression::LogicalOr { left, right } => Expression::LogicalOr {
                left: Box::new(strip_positions(*left)),
                right: Box::new(strip_positions(*right)),
            },
            Expression::Negative(inner) => Expression::Negative(Box::new(strip_positions(*inner))),
            Expression::Parenthesis(inner) => {
                Expression::Parenthesis(Box::new(strip_positions(*inner)))
            }
            other => other,
        }
    }

    #[test]
    fn mul_binds_tighter_than_add() {
        let ast = parser("2 + 3 * 4").parse_expr(0).unwrap();

        assert_eq!(
            strip_positions(ast),
            Expression::Additive {
                op: AdditiveOp::Add,
                left: num("2"),
                right: Box::new(Expression::Multiplicative {
                    op: MultiplicativeOp::Multiply,
                    left: num("3"),
                    right: num("4"),
                }),
            }
        )
    }

    #[test]
    fn subtraction_is_left_associative() {
        let ast = parser("a - b - c").parse_expr(0).unwrap();

        assert_eq!(
            strip_positions(ast),
            Expression::Additive {
                op: AdditiveOp::Subtract,
                left: Box::new(Expression::Additive {
                    op: AdditiveOp::Subtract,
                    left: ident("a"),
                    right: ident("b"),
                }),
                right: ident("c"),
            }
        )
    }

    #[test]
    fn logical_precedence() {
        let ast = parser("a < 1 || b && c == 2").parse_expr(0).unwrap();

        assert_eq!(
            strip_positions(ast),
            Expression::LogicalOr {
                left: Box::new(Expression::Comparative {
                    op: ComparativeOp::Less,
                    left: ident("a"),
                    right: num("1"),
                }),
                right: Box::new(Expression::LogicalAnd {
                    left: ident("b"),
                    right: Box::new(Expression::Comparative {
                        op: ComparativeOp::Equal,
                        left: ident("c"),
                        right: num("2"),
                    }),
                }),
            }
        )
    }

    #[test]
    fn negated_parenthesis() {
        let ast = parser("-(a + 1)").parse_expr(0).unwrap();

        assert_eq!(
            strip_positions(ast),
            Expression::Negative(Box::new(Expression::Parenthesis(Box::new(
                Expression::Additive {
                    op: AdditiveOp::Add,
                    left: ident("a"),
                    right: num("1"),
                }
            ))))
        )
    }

    #[test]
    fn assignment_statement() {
        let unit = parser("x = 2 + 3;").parse().unwrap();

        assert_eq!(unit.statements.len(), 1);
        assert!(matches!(
            &unit.statements[0],
            Statement::Expression(Expression::Assignment { target, .. }) if target.text == "x"
        ));
    }

    #[test]
    fn identifier_statements_split_on_lookahead() {
        let unit = parser("f(1); x = 1; x == 1;").parse().unwrap();

        assert!(matches!(
            &unit.statements[0],
            Statement::Expression(Expression::FunctionCall { callee, .. }) if callee.text == "f"
        ));
        assert!(matches!(
            &unit.statements[1],
            Statement::Expression(Expression::Assignment { .. })
        ));
        assert!(matches!(
            &unit.statements[2],
            Statement::Expression(Expression::Comparative {
                op: ComparativeOp::Equal,
                ..
            })
        ));
    }

    #[test]
    fn assignment_as_value_is_rejected() {
        assert!(parser("y = (x = 3);").parse().is_err());
    }

    #[test]
    fn function_definitions_are_split_from_statements() {
        let src = "x = f(1, 2);\nfunction f(a, b) { return a + b; }\nfunction g() { }";
        let unit = parser(src).parse().unwrap();

        assert_eq!(unit.statements.len(), 1);
        assert_eq!(unit.function_definitions.len(), 2);

        let f = &unit.function_definitions[0];
        assert_eq!(f.name.text, "f");
        assert_eq!((f.name.line, f.name.col), (2, 10));
        let params: Vec<_> = f
            .formal_arguments
            .identifiers
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(params, vec!["a", "b"]);

        let g = &unit.function_definitions[1];
        assert!(g.formal_arguments.identifiers.is_empty());
        assert_eq!(g.body, CompoundStatement::Empty);
    }

    #[test]
    fn if_else_and_while() {
        let src = "while (i < 10) { if (i == 5) break; else i = i + 1; }";
        let unit = parser(src).parse().unwrap();

        let Statement::Repetition(RepetitionStatement { body, .. }) = &unit.statements[0] else {
            panic!("expected a while statement");
        };
        let Statement::Condition(cond) = &body.statements()[0] else {
            panic!("expected an if statement");
        };
        assert_eq!(*cond.then, Statement::Break);
        assert!(cond.otherwise.is_some());
    }

    #[test]
    fn while_requires_compound_body() {
        assert!(parser("while (1) x = 1;").parse().is_err());
    }

    #[test]
    fn missing_semicolon() {
        assert!(parser("x = 1").parse().is_err());
    }
}
