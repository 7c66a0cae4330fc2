use std::collections::HashMap;

use lir::*;

#[derive(Debug)]
struct ReplacementState {
    // Offset from ebp, grows downward past the named locals
    current_offset: i32,
    offset_map: HashMap<usize, i32>,
}

/// Gives every holder its own frame slot below the procedure's locals.
pub fn replace_temps(program: &Program) -> Program {
    Program {
        globals: program.globals.clone(),
        procedures: program.procedures.iter().map(replace_procedure).collect(),
    }
}

fn replace_procedure(procedure: &Procedure) -> Procedure {
    let mut state = ReplacementState {
        current_offset: -WORD_SIZE * procedure.locals as i32,
        offset_map: HashMap::new(),
    };

    let instructions = procedure
        .instructions
        .iter()
        .map(|instr| replace_instruction(instr, &mut state))
        .collect();

    Procedure {
        name: procedure.name.clone(),
        kind: procedure.kind,
        locals: procedure.locals,
        frame_size: -state.current_offset,
        instructions,
    }
}

fn replace_instruction(instruction: &Instruction, state: &mut ReplacementState) -> Instruction {
    match instruction {
        Instruction::Mov { src, dest } => Instruction::Mov {
            src: replace_operand(src, state),
            dest: replace_operand(dest, state),
        },
        Instruction::Unary { op, dest } => Instruction::Unary {
            op: *op,
            dest: replace_operand(dest, state),
        },
        Instruction::Binary { op, src, dest } => Instruction::Binary {
            op: *op,
            src: replace_operand(src, state),
            dest: replace_operand(dest, state),
        },
        Instruction::Cmp(first, second) => {
            let first = replace_operand(first, state);
            let second = replace_operand(second, state);
            Instruction::Cmp(first, second)
        }
        Instruction::Idiv(op) => Instruction::Idiv(replace_operand(op, state)),
        Instruction::SetCond { condition, dest } => Instruction::SetCond {
            condition: *condition,
            dest: replace_operand(dest, state),
        },
        Instruction::Push(op) => Instruction::Push(replace_operand(op, state)),
        _ => instruction.clone(),
    }
}

fn replace_operand(operand: &Operand, state: &mut ReplacementState) -> Operand {
    match operand {
        Operand::Temp(n) => match state.offset_map.get(n) {
            // Already assigned a stack slot
            Some(offset) => Operand::Frame(*offset),
            None => {
                state.current_offset -= WORD_SIZE;
                state.offset_map.insert(*n, state.current_offset);
                Operand::Frame(state.current_offset)
            }
        },
        _ => operand.clone(),
    }
}
