use std::collections::HashSet;

use log::debug;

use ast::{Ast, AstVisitor, NodeId, Slot};
use lir::*;
use unique_ident::LabelGenerator;

use crate::fix_instructions::fix_invalid_instructions;
use crate::frame::{collect_locals, FunctionContext};
use crate::replace_temps::replace_temps;

mod fix_instructions;
mod frame;
mod replace_temps;

/// Name of the procedure holding the top-level statements.
pub const ENTRY_PROCEDURE: &str = "MAIN";

pub fn gen_assm(ast: &Ast) -> Program {
    let unit = ast
        .root()
        .unwrap_or_else(|| panic!("Internal Error: tree has no compile unit"));

    let mut generator = CodeGenerator::new(ast, unit);
    let program = generator.gen_program(ast, unit);

    let replaced = replace_temps(&program);

    fix_invalid_instructions(&replaced)
}

struct CodeGenerator {
    globals: HashSet<NodeId>,
    labels: LabelGenerator,
    loop_exits: Vec<String>,
    return_label: String,
    frame: FunctionContext,
    instructions: Vec<Instruction>,
}

impl CodeGenerator {
    fn new(ast: &Ast, unit: NodeId) -> Self {
        let globals = match ast.table_of(unit) {
            Some(table) => ast.table(table).iter().map(|(_, decl)| decl).collect(),
            None => HashSet::new(),
        };

        Self {
            globals,
            labels: LabelGenerator::new(),
            loop_exits: vec![],
            return_label: String::new(),
            frame: FunctionContext::new(),
            instructions: vec![],
        }
    }

    fn gen_program(&mut self, ast: &Ast, unit: NodeId) -> Program {
        let globals = match ast.table_of(unit) {
            Some(table) => ast.table(table).names().map(String::from).collect(),
            None => vec![],
        };

        let mut procedures = vec![self.gen_entry(ast, unit)];

        for func in ast.children(unit, Slot::FunctionDefinitions) {
            procedures.push(self.gen_function(ast, *func));
        }

        Program {
            globals,
            procedures,
        }
    }

    fn gen_entry(&mut self, ast: &Ast, unit: NodeId) -> Procedure {
        let statements = ast.children(unit, Slot::Statements);

        self.begin_procedure(ENTRY_PROCEDURE);
        self.declare_locals(ast, statements, &[]);

        for statement in statements {
            self.visit(ast, *statement, &());
        }

        self.finish_procedure(ENTRY_PROCEDURE, ProcedureKind::Entry)
    }

    fn gen_function(&mut self, ast: &Ast, func: NodeId) -> Procedure {
        let name = literal(ast, ast.child(func, Slot::Identifier, 0)).to_string();
        let formals = ast.child(func, Slot::FormalArguments, 0);
        let params = ast.children(formals, Slot::Identifiers);
        let body = ast.child(func, Slot::CompoundStatement, 0);

        self.begin_procedure(&name);

        for (index, param) in params.iter().enumerate() {
            let offset = self.frame.add_param(*param, index);
            self.emit(Instruction::Comment(format!(
                "{} is {}",
                frame_address(offset),
                literal(ast, *param)
            )));
        }

        self.declare_locals(ast, &[body], params);

        self.visit(ast, body, &());

        self.finish_procedure(&name, ProcedureKind::Function)
    }

    fn begin_procedure(&mut self, name: &str) {
        debug!("Lowering procedure {}", name);

        self.frame = FunctionContext::new();
        self.instructions = vec![];
        self.return_label = self.labels.make_label(&format!("{}_return", name));
    }

    fn finish_procedure(&mut self, name: &str, kind: ProcedureKind) -> Procedure {
        let return_label = std::mem::take(&mut self.return_label);
        self.emit(Instruction::Label(return_label));
        self.emit(match kind {
            ProcedureKind::Entry => Instruction::Exit,
            ProcedureKind::Function => Instruction::Ret,
        });

        let frame = std::mem::take(&mut self.frame);

        Procedure {
            name: name.to_string(),
            kind,
            locals: frame.locals(),
            frame_size: 0,
            instructions: std::mem::take(&mut self.instructions),
        }
    }

    /// Gives every variable first assigned under `roots` a zeroed slot below `ebp`.
    fn declare_locals(&mut self, ast: &Ast, roots: &[NodeId], params: &[NodeId]) {
        let mut excluded = self.globals.clone();
        excluded.extend(params.iter().copied());

        for decl in collect_locals(ast, roots, &excluded) {
            let offset = self.frame.add_local(decl);
            self.emit(Instruction::Comment(format!(
                "{} is {}",
                frame_address(offset),
                literal(ast, decl)
            )));
            self.emit(Instruction::Mov {
                src: Operand::Imm(0),
                dest: Operand::Frame(offset),
            });
        }
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Lowers an expression that must produce a value.
    fn operand(&mut self, ast: &Ast, node: NodeId) -> Operand {
        self.visit(ast, node, &()).unwrap_or_else(|| {
            panic!(
                "Internal Error: {} does not produce a value",
                ast.label(node)
            )
        })
    }

    /// Where a resolved identifier lives: a frame slot of this procedure or a global cell.
    fn locate(&self, ast: &Ast, decl: NodeId) -> Operand {
        match self.frame.slot(decl) {
            Some(offset) => Operand::Frame(offset),
            None if self.globals.contains(&decl) => Operand::Data(literal(ast, decl).to_string()),
            None => panic!(
                "Internal Error: {} has no storage in this procedure",
                ast.label(decl)
            ),
        }
    }

    fn gen_arithmetic(&mut self, ast: &Ast, node: NodeId, op: BinaryOp) -> Option<Operand> {
        let left = self.operand(ast, ast.child(node, Slot::LeftExpression, 0));
        let right = self.operand(ast, ast.child(node, Slot::RightExpression, 0));

        let holder = self.frame.make_temp();
        self.emit(Instruction::Mov {
            src: left,
            dest: holder.clone(),
        });
        self.emit(Instruction::Binary {
            op,
            src: right,
            dest: holder.clone(),
        });

        Some(holder)
    }

    fn gen_comparison(&mut self, ast: &Ast, node: NodeId, condition: Condition) -> Option<Operand> {
        let left = self.operand(ast, ast.child(node, Slot::LeftExpression, 0));
        let right = self.operand(ast, ast.child(node, Slot::RightExpression, 0));

        let holder = self.frame.make_temp();
        self.emit(Instruction::Mov {
            src: Operand::Imm(0),
            dest: holder.clone(),
        });
        self.emit(Instruction::Cmp(left, right));
        self.emit(Instruction::SetCond {
            condition,
            dest: holder.clone(),
        });

        Some(holder)
    }

    /// `&&` and `||`: the right operand is only evaluated when the left one does not decide.
    fn gen_short_circuit(&mut self, ast: &Ast, node: NodeId, is_and: bool) -> Option<Operand> {
        let (prefix, decided, undecided, jump_on) = if is_and {
            ("and_end", 0, 1, Condition::E)
        } else {
            ("or_end", 1, 0, Condition::NE)
        };
        let end_label = self.labels.make_label(prefix);

        let left = self.operand(ast, ast.child(node, Slot::LeftExpression, 0));
        let holder = self.frame.make_temp();
        self.emit(Instruction::Mov {
            src: Operand::Imm(decided),
            dest: holder.clone(),
        });
        self.emit(Instruction::Cmp(left, Operand::Imm(0)));
        self.emit(Instruction::JmpCond {
            condition: jump_on,
            label: end_label.clone(),
        });

        let right = self.operand(ast, ast.child(node, Slot::RightExpression, 0));
        self.emit(Instruction::Cmp(right, Operand::Imm(0)));
        self.emit(Instruction::JmpCond {
            condition: jump_on,
            label: end_label.clone(),
        });

        self.emit(Instruction::Mov {
            src: Operand::Imm(undecided),
            dest: holder.clone(),
        });
        self.emit(Instruction::Label(end_label));

        Some(holder)
    }
}

impl AstVisitor for CodeGenerator {
    type Output = Option<Operand>;
    type Params = ();

    fn visit_compound_not_empty(&mut self, ast: &Ast, node: NodeId, params: &()) -> Option<Operand> {
        self.emit(Instruction::EnterBlock);
        self.visit_children(ast, node, params);
        self.emit(Instruction::LeaveBlock);
        None
    }

    fn visit_identifier(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        Some(self.locate(ast, node))
    }

    fn visit_number(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        let value = ast.number_value(node).unwrap_or_else(|| {
            panic!("Internal Error: {} carries no value", ast.label(node))
        });
        Some(Operand::Imm(value))
    }

    fn visit_addition(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_arithmetic(ast, node, BinaryOp::Add)
    }

    fn visit_subtraction(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_arithmetic(ast, node, BinaryOp::Sub)
    }

    fn visit_multiplication(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_arithmetic(ast, node, BinaryOp::Mult)
    }

    fn visit_division(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        let dividend = self.operand(ast, ast.child(node, Slot::LeftExpression, 0));
        let divisor = self.operand(ast, ast.child(node, Slot::RightExpression, 0));

        self.emit(Instruction::Mov {
            src: dividend,
            dest: Operand::Register(Register::AX),
        });
        self.emit(Instruction::Cdq);
        self.emit(Instruction::Idiv(divisor));

        // eax is overwritten by the next division, so the quotient gets its own holder
        let holder = self.frame.make_temp();
        self.emit(Instruction::Mov {
            src: Operand::Register(Register::AX),
            dest: holder.clone(),
        });

        Some(holder)
    }

    fn visit_positive(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        Some(self.operand(ast, ast.child(node, Slot::Expression, 0)))
    }

    fn visit_negative(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        let value = self.operand(ast, ast.child(node, Slot::Expression, 0));

        let holder = self.frame.make_temp();
        self.emit(Instruction::Mov {
            src: value,
            dest: holder.clone(),
        });
        self.emit(Instruction::Unary {
            op: UnaryOp::Neg,
            dest: holder.clone(),
        });

        Some(holder)
    }

    fn visit_equal(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_comparison(ast, node, Condition::E)
    }

    fn visit_not_equal(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_comparison(ast, node, Condition::NE)
    }

    fn visit_greater(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_comparison(ast, node, Condition::G)
    }

    fn visit_greater_equal(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_comparison(ast, node, Condition::GE)
    }

    fn visit_less(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_comparison(ast, node, Condition::L)
    }

    fn visit_less_equal(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_comparison(ast, node, Condition::LE)
    }

    fn visit_logical_not(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        let value = self.operand(ast, ast.child(node, Slot::Expression, 0));

        let holder = self.frame.make_temp();
        self.emit(Instruction::Mov {
            src: Operand::Imm(0),
            dest: holder.clone(),
        });
        self.emit(Instruction::Cmp(value, Operand::Imm(0)));
        self.emit(Instruction::SetCond {
            condition: Condition::E,
            dest: holder.clone(),
        });

        Some(holder)
    }

    fn visit_logical_and(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_short_circuit(ast, node, true)
    }

    fn visit_logical_or(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        self.gen_short_circuit(ast, node, false)
    }

    fn visit_assignment(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        let target = ast.child(node, Slot::Identifier, 0);
        let value = self.operand(ast, ast.child(node, Slot::Expression, 0));
        let dest = self.locate(ast, target);

        self.emit(Instruction::Mov { src: value, dest });

        None
    }

    fn visit_function_call(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        let callee = literal(ast, ast.child(node, Slot::Identifier, 0)).to_string();
        let actuals = ast.child(node, Slot::ActualArguments, 0);
        let arguments = ast.children(actuals, Slot::Expressions);

        // Rightmost first, so the first argument ends up just above the return address
        for argument in arguments.iter().rev() {
            let value = self.operand(ast, *argument);
            self.emit(Instruction::Push(value));
        }

        self.emit(Instruction::Call(callee));
        if !arguments.is_empty() {
            self.emit(Instruction::DeallocateStack(
                WORD_SIZE * arguments.len() as i32,
            ));
        }

        let holder = self.frame.make_temp();
        self.emit(Instruction::Mov {
            src: Operand::Register(Register::AX),
            dest: holder.clone(),
        });

        Some(holder)
    }

    fn visit_return(&mut self, ast: &Ast, node: NodeId, _params: &()) -> Option<Operand> {
        let value = self.operand(ast, ast.child(node, Slot::Expression, 0));

        self.emit(Instruction::Mov {
            src: value,
            dest: Operand::Register(Register::AX),
        });
        self.emit(Instruction::Jmp {
            label: self.return_label.clone(),
        });

        None
    }

    fn visit_condition(&mut self, ast: &Ast, node: NodeId, params: &()) -> Option<Operand> {
        let test = self.operand(ast, ast.child(node, Slot::Expression, 0));
        let otherwise = ast.first_child(node, Slot::StatementElse);

        let else_label = otherwise.map(|_| self.labels.make_label("if_else"));
        let end_label = self.labels.make_label("if_end");

        self.emit(Instruction::Cmp(test, Operand::Imm(0)));
        self.emit(Instruction::JmpCond {
            condition: Condition::E,
            label: else_label.clone().unwrap_or_else(|| end_label.clone()),
        });

        self.visit(ast, ast.child(node, Slot::Statement, 0), params);

        if let (Some(otherwise), Some(else_label)) = (otherwise, else_label) {
            self.emit(Instruction::Jmp {
                label: end_label.clone(),
            });
            self.emit(Instruction::Label(else_label));
            self.visit(ast, otherwise, params);
        }

        self.emit(Instruction::Label(end_label));

        None
    }

    fn visit_repetition(&mut self, ast: &Ast, node: NodeId, params: &()) -> Option<Operand> {
        let top_label = self.labels.make_label("while_top");
        let exit_label = self.labels.make_label("while_exit");

        self.emit(Instruction::Label(top_label.clone()));

        let test = self.operand(ast, ast.child(node, Slot::Expression, 0));
        self.emit(Instruction::Cmp(test, Operand::Imm(0)));
        self.emit(Instruction::JmpCond {
            condition: Condition::E,
            label: exit_label.clone(),
        });

        self.loop_exits.push(exit_label.clone());
        self.visit(ast, ast.child(node, Slot::CompoundStatement, 0), params);
        self.loop_exits.pop();

        self.emit(Instruction::Jmp { label: top_label });
        self.emit(Instruction::Label(exit_label));

        None
    }

    fn visit_break(&mut self, _ast: &Ast, _node: NodeId, _params: &()) -> Option<Operand> {
        let label = self
            .loop_exits
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("Internal Error: break outside of a loop reached codegen"));

        self.emit(Instruction::Jmp { label });

        None
    }
}

fn literal(ast: &Ast, node: NodeId) -> &str {
    ast.literal(node)
        .unwrap_or_else(|| panic!("Internal Error: {} is not a leaf", ast.label(node)))
}

#[cfg(test)]
mod tests {
    use lexer::Lexer;
    use parser::Parser;
    use semantic_analysis::resolve;

    use super::*;

    fn resolved(src: &str) -> Ast {
        let _ = env_logger::builder().is_test(true).try_init();

        let tokens = Lexer::new(src).tokenize().collect();
        let unit = Parser::new(tokens).parse().unwrap();
        resolve(&unit).unwrap()
    }

    /// Lowering only, before holders get slots and before fix-ups.
    fn lowered(src: &str) -> Program {
        let ast = resolved(src);
        let unit = ast.root().unwrap();
        CodeGenerator::new(&ast, unit).gen_program(&ast, unit)
    }

    fn procedure<'p>(program: &'p Program, name: &str) -> &'p Procedure {
        program
            .procedures
            .iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    fn mov(src: Operand, dest: Operand) -> Instruction {
        Instruction::Mov { src, dest }
    }

    fn data(name: &str) -> Operand {
        Operand::Data(name.to_string())
    }

    const EAX: Operand = Operand::Register(Register::AX);

    #[test]
    fn top_level_expression_lowering() {
        let program = lowered("x = 2 + 3 * 4;");
        let main = procedure(&program, ENTRY_PROCEDURE);

        assert_eq!(program.globals, vec!["x".to_string()]);
        assert_eq!(main.kind, ProcedureKind::Entry);
        assert_eq!(main.locals, 0);
        assert_eq!(
            main.instructions,
            vec![
                mov(Operand::Imm(3), Operand::Temp(0)),
                Instruction::Binary {
                    op: BinaryOp::Mult,
                    src: Operand::Imm(4),
                    dest: Operand::Temp(0)
                },
                mov(Operand::Imm(2), Operand::Temp(1)),
                Instruction::Binary {
                    op: BinaryOp::Add,
                    src: Operand::Temp(0),
                    dest: Operand::Temp(1)
                },
                mov(Operand::Temp(1), data("x")),
                Instruction::Label("MAIN_return$0".to_string()),
                Instruction::Exit,
            ]
        );
    }

    #[test]
    fn frame_offsets_follow_declaration_order() {
        let src = "function f(p1, p2) { x = p1; y = p2; x = y; return x; }";
        let ast = resolved(src);
        let unit = ast.root().unwrap();

        let first = CodeGenerator::new(&ast, unit).gen_program(&ast, unit);
        let f = procedure(&first, "f");

        assert_eq!(f.locals, 2);
        assert_eq!(
            &f.instructions[..7],
            &[
                Instruction::Comment("[ebp + 8] is p1".to_string()),
                Instruction::Comment("[ebp + 12] is p2".to_string()),
                Instruction::Comment("[ebp - 4] is x".to_string()),
                mov(Operand::Imm(0), Operand::Frame(-4)),
                Instruction::Comment("[ebp - 8] is y".to_string()),
                mov(Operand::Imm(0), Operand::Frame(-8)),
                Instruction::EnterBlock,
            ]
        );
        assert_eq!(f.instructions[7], mov(Operand::Frame(8), Operand::Frame(-4)));
        assert_eq!(f.instructions[8], mov(Operand::Frame(12), Operand::Frame(-8)));

        let second = CodeGenerator::new(&ast, unit).gen_program(&ast, unit);
        assert_eq!(first, second);
        assert_eq!(gen_assm(&ast), gen_assm(&ast));
    }

    #[test]
    fn function_context_does_not_leak() {
        let program = lowered("function f(a) { t = a + 1; return t; } function g(b) { return b * 2; }");
        let g = procedure(&program, "g");

        assert_eq!(g.locals, 0);
        assert!(g
            .instructions
            .contains(&mov(Operand::Frame(8), Operand::Temp(0))));
    }

    #[test]
    fn dividend_is_placed_in_eax_first() {
        let cases = [
            ("x = 7; y = x / 2;", data("x")),
            ("{ z = 7; y = z / 2; }", Operand::Frame(-4)),
            ("y = (1 + 6) / 2;", Operand::Temp(0)),
        ];

        for (src, dividend) in cases {
            let program = lowered(src);
            let main = procedure(&program, ENTRY_PROCEDURE);
            let start = main
                .instructions
                .iter()
                .position(|i| *i == Instruction::Cdq)
                .unwrap();

            assert_eq!(main.instructions[start - 1], mov(dividend, EAX), "{}", src);
            assert_eq!(main.instructions[start + 1], Instruction::Idiv(Operand::Imm(2)));
            assert!(matches!(
                &main.instructions[start + 2],
                Instruction::Mov { src, dest: Operand::Temp(_) } if *src == EAX
            ));
        }
    }

    #[test]
    fn unary_plus_is_a_pass_through() {
        let program = lowered("x = +5;");
        let main = procedure(&program, ENTRY_PROCEDURE);
        assert_eq!(main.instructions[0], mov(Operand::Imm(5), data("x")));
    }

    #[test]
    fn calls_push_right_to_left_and_clean_up() {
        let program = lowered("r = f(1, 2); function f(a, b) { return a - b; }");
        let main = procedure(&program, ENTRY_PROCEDURE);

        assert_eq!(
            &main.instructions[..5],
            &[
                Instruction::Push(Operand::Imm(2)),
                Instruction::Push(Operand::Imm(1)),
                Instruction::Call("f".to_string()),
                Instruction::DeallocateStack(8),
                mov(EAX, Operand::Temp(0)),
            ]
        );

        let f = procedure(&program, "f");
        assert!(f.instructions.contains(&mov(Operand::Temp(0), EAX)));
        assert!(f.instructions.contains(&Instruction::Jmp {
            label: "f_return$1".to_string()
        }));
        assert_eq!(f.instructions.last(), Some(&Instruction::Ret));
    }

    #[test]
    fn while_with_break() {
        let program = lowered("i = 0; while (1) { if (i == 3) break; i = i + 1; }");
        let main = procedure(&program, ENTRY_PROCEDURE);

        let labels: Vec<_> = main
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Label(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["while_top$1", "if_end$3", "while_exit$2", "MAIN_return$0"]);

        assert!(main.instructions.contains(&Instruction::Jmp {
            label: "while_exit$2".to_string()
        }));
        assert!(main.instructions.contains(&Instruction::Jmp {
            label: "while_top$1".to_string()
        }));
    }

    #[test]
    fn if_else_jumps_to_else_label() {
        let program = lowered("x = 1; if (x < 2) x = 3; else x = 4;");
        let main = procedure(&program, ENTRY_PROCEDURE);

        assert!(main.instructions.contains(&Instruction::SetCond {
            condition: Condition::L,
            dest: Operand::Temp(0)
        }));
        assert!(main.instructions.contains(&Instruction::JmpCond {
            condition: Condition::E,
            label: "if_else$1".to_string()
        }));
        assert!(main.instructions.contains(&Instruction::Jmp {
            label: "if_end$2".to_string()
        }));
    }

    #[test]
    fn logical_and_short_circuits() {
        let program = lowered("a = 0; b = a && 1;");
        let main = procedure(&program, ENTRY_PROCEDURE);

        let jumps = main
            .instructions
            .iter()
            .filter(|i| {
                matches!(i, Instruction::JmpCond { condition: Condition::E, label } if label == "and_end$1")
            })
            .count();
        assert_eq!(jumps, 2);
        assert!(main
            .instructions
            .contains(&mov(Operand::Imm(1), Operand::Temp(0))));
    }

    #[test]
    fn break_leaves_only_the_innermost_loop() {
        let program = lowered("a = 1; while (a) { while (1) { break; } break; }");
        let main = procedure(&program, ENTRY_PROCEDURE);

        let jumps: Vec<_> = main
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Jmp { label } => Some(label.as_str()),
                _ => None,
            })
            .collect();

        // inner break, inner back edge, outer break, outer back edge
        assert_eq!(
            jumps,
            vec!["while_exit$4", "while_top$3", "while_exit$2", "while_top$1"]
        );
    }

    #[test]
    fn logical_or_short_circuits() {
        let program = lowered("a = 0; b = a || 1;");
        let main = procedure(&program, ENTRY_PROCEDURE);
        let or_end = "or_end$1".to_string();

        assert_eq!(
            main.instructions,
            vec![
                mov(Operand::Imm(0), data("a")),
                mov(Operand::Imm(1), Operand::Temp(0)),
                Instruction::Cmp(data("a"), Operand::Imm(0)),
                Instruction::JmpCond {
                    condition: Condition::NE,
                    label: or_end.clone()
                },
                Instruction::Cmp(Operand::Imm(1), Operand::Imm(0)),
                Instruction::JmpCond {
                    condition: Condition::NE,
                    label: or_end.clone()
                },
                mov(Operand::Imm(0), Operand::Temp(0)),
                Instruction::Label(or_end),
                mov(Operand::Temp(0), data("b")),
                Instruction::Label("MAIN_return$0".to_string()),
                Instruction::Exit,
            ]
        );
    }

    #[test]
    fn logical_not_compares_with_zero() {
        let program = lowered("y = 5; x = !y;");
        let main = procedure(&program, ENTRY_PROCEDURE);

        assert_eq!(
            &main.instructions[1..5],
            &[
                mov(Operand::Imm(0), Operand::Temp(0)),
                Instruction::Cmp(data("y"), Operand::Imm(0)),
                Instruction::SetCond {
                    condition: Condition::E,
                    dest: Operand::Temp(0)
                },
                mov(Operand::Temp(0), data("x")),
            ]
        );
    }

    #[test]
    fn holders_and_locals_share_one_allocation() {
        let ast = resolved("{ y = 1; z = y * 2; }");
        let program = gen_assm(&ast);
        let main = procedure(&program, ENTRY_PROCEDURE);

        assert_eq!(main.frame_size, 12);
        assert_eq!(main.instructions[0], Instruction::AllocateStack(12));
        assert!(!main
            .instructions
            .iter()
            .any(|i| format!("{:?}", i).contains("Temp")));
    }
}
