use lir::*;

const SCRATCH: Operand = Operand::Register(Register::CX);
const MUL_SCRATCH: Operand = Operand::Register(Register::DX);

/// Reserves each frame and rewrites operand combinations x86 cannot encode.
pub fn fix_invalid_instructions(program: &Program) -> Program {
    Program {
        globals: program.globals.clone(),
        procedures: program.procedures.iter().map(fix_procedure).collect(),
    }
}

fn fix_procedure(procedure: &Procedure) -> Procedure {
    let mut instructions = vec![];

    if procedure.frame_size > 0 {
        instructions.push(Instruction::AllocateStack(procedure.frame_size));
    }
    instructions.append(&mut fix_instructions(&procedure.instructions));

    Procedure {
        name: procedure.name.clone(),
        kind: procedure.kind,
        locals: procedure.locals,
        frame_size: procedure.frame_size,
        instructions,
    }
}

fn fix_instructions(instructions: &[Instruction]) -> Vec<Instruction> {
    let mut fixed_instr = vec![];

    for i in instructions {
        match i {
            Instruction::Mov { src, dest } if src.is_memory() && dest.is_memory() => {
                fixed_instr.push(Instruction::Mov {
                    src: src.clone(),
                    dest: SCRATCH,
                });
                fixed_instr.push(Instruction::Mov {
                    src: SCRATCH,
                    dest: dest.clone(),
                });
            }
            // imul cannot write to memory
            Instruction::Binary {
                op: BinaryOp::Mult,
                src,
                dest,
            } if dest.is_memory() => {
                fixed_instr.push(Instruction::Mov {
                    src: dest.clone(),
                    dest: MUL_SCRATCH,
                });
                fixed_instr.push(Instruction::Binary {
                    op: BinaryOp::Mult,
                    src: src.clone(),
                    dest: MUL_SCRATCH,
                });
                fixed_instr.push(Instruction::Mov {
                    src: MUL_SCRATCH,
                    dest: dest.clone(),
                });
            }
            Instruction::Binary { op, src, dest } if src.is_memory() && dest.is_memory() => {
                fixed_instr.push(Instruction::Mov {
                    src: src.clone(),
                    dest: SCRATCH,
                });
                fixed_instr.push(Instruction::Binary {
                    op: *op,
                    src: SCRATCH,
                    dest: dest.clone(),
                });
            }
            Instruction::Idiv(divisor @ Operand::Imm(_)) => {
                fixed_instr.push(Instruction::Mov {
                    src: divisor.clone(),
                    dest: SCRATCH,
                });
                fixed_instr.push(Instruction::Idiv(SCRATCH));
            }
            Instruction::Cmp(first, second)
                if matches!(first, Operand::Imm(_)) || (first.is_memory() && second.is_memory()) =>
            {
                fixed_instr.push(Instruction::Mov {
                    src: first.clone(),
                    dest: SCRATCH,
                });
                fixed_instr.push(Instruction::Cmp(SCRATCH, second.clone()));
            }
            _ => fixed_instr.push(i.clone()),
        }
    }

    fixed_instr
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(offset: i32) -> Operand {
        Operand::Frame(offset)
    }

    #[test]
    fn memory_to_memory_goes_through_ecx() {
        let fixed = fix_instructions(&[Instruction::Binary {
            op: BinaryOp::Sub,
            src: frame(-4),
            dest: Operand::Data("x".to_string()),
        }]);

        assert_eq!(
            fixed,
            vec![
                Instruction::Mov {
                    src: frame(-4),
                    dest: SCRATCH
                },
                Instruction::Binary {
                    op: BinaryOp::Sub,
                    src: SCRATCH,
                    dest: Operand::Data("x".to_string())
                },
            ]
        );
    }

    #[test]
    fn multiply_into_memory_uses_edx() {
        let fixed = fix_instructions(&[Instruction::Binary {
            op: BinaryOp::Mult,
            src: Operand::Imm(4),
            dest: frame(-8),
        }]);

        assert_eq!(fixed.len(), 3);
        assert_eq!(
            fixed[1],
            Instruction::Binary {
                op: BinaryOp::Mult,
                src: Operand::Imm(4),
                dest: MUL_SCRATCH
            }
        );
    }

    #[test]
    fn immediate_divisor_and_compare() {
        let fixed = fix_instructions(&[
            Instruction::Idiv(Operand::Imm(3)),
            Instruction::Cmp(Operand::Imm(1), Operand::Imm(0)),
            Instruction::Cmp(frame(-4), Operand::Imm(0)),
        ]);

        assert_eq!(
            fixed,
            vec![
                Instruction::Mov {
                    src: Operand::Imm(3),
                    dest: SCRATCH
                },
                Instruction::Idiv(SCRATCH),
                Instruction::Mov {
                    src: Operand::Imm(1),
                    dest: SCRATCH
                },
                Instruction::Cmp(SCRATCH, Operand::Imm(0)),
                Instruction::Cmp(frame(-4), Operand::Imm(0)),
            ]
        );
    }

    #[test]
    fn frame_is_reserved_first() {
        let program = Program {
            globals: vec![],
            procedures: vec![Procedure {
                name: "MAIN".to_string(),
                kind: ProcedureKind::Entry,
                locals: 0,
                frame_size: 8,
                instructions: vec![Instruction::Exit],
            }],
        };

        let fixed = fix_invalid_instructions(&program);
        assert_eq!(
            fixed.procedures[0].instructions,
            vec![Instruction::AllocateStack(8), Instruction::Exit]
        );
    }
}
