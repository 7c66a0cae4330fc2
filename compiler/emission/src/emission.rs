use std::fs::File;
use std::io::{BufWriter, Write};

use lir::*;

type IOResult = std::io::Result<()>;

const SP: &str = Register::SP.name();
const BP: &str = Register::BP.name();

pub fn output(path: &str, assm: &Program) -> IOResult {
    let output = File::create(path)?;
    let mut writer = BufWriter::new(output);

    emit_program(&mut writer, assm)?;

    writer.flush()?;

    Ok(())
}

/// Renders the whole program to a string, as `output` would write it.
pub fn render(assm: &Program) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    emit_program(&mut buffer, assm)?;

    String::from_utf8(buffer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

pub fn emit_program<W: Write>(writer: &mut W, assm: &Program) -> IOResult {
    writeln!(writer, "INCLUDE Irvine32.inc")?;
    writeln!(writer)?;

    writeln!(writer, ".DATA")?;
    for global in &assm.globals {
        writeln!(writer, "{} DWORD ? ", global)?;
    }
    writeln!(writer)?;

    writeln!(writer, ".CODE")?;
    for procedure in &assm.procedures {
        emit_procedure(writer, procedure)?;
        writeln!(writer)?;
    }

    match assm
        .procedures
        .iter()
        .find(|p| p.kind == ProcedureKind::Entry)
    {
        Some(entry) => writeln!(writer, "END {}", entry.name)?,
        None => writeln!(writer, "END")?,
    }

    Ok(())
}

fn emit_procedure<W: Write>(writer: &mut W, procedure: &Procedure) -> IOResult {
    writeln!(writer, "{} PROC", procedure.name)?;
    writeln!(writer, "\tPUSH {}", BP)?;
    writeln!(writer, "\tMOV {}, {}", BP, SP)?;

    let mut depth = 1;
    for instruction in &procedure.instructions {
        match instruction {
            Instruction::EnterBlock => depth += 1,
            Instruction::LeaveBlock => depth -= 1,
            _ => emit_instruction(writer, instruction, depth)?,
        }
    }

    writeln!(writer, "{} ENDP", procedure.name)?;

    Ok(())
}

fn emit_instruction<W: Write>(writer: &mut W, instruction: &Instruction, depth: usize) -> IOResult {
    let indent = "\t".repeat(depth);

    match instruction {
        Instruction::Mov { src, dest } => writeln!(writer, "{}MOV {}, {}", indent, dest, src)?,
        Instruction::Unary { op, dest } => {
            writeln!(writer, "{}{} {}", indent, show_unary(op), dest)?;
        }
        Instruction::Binary { op, src, dest } => {
            writeln!(writer, "{}{} {}, {}", indent, show_binary(op), dest, src)?;
        }
        Instruction::Cmp(first, second) => {
            writeln!(writer, "{}CMP {}, {}", indent, first, second)?;
        }
        Instruction::Idiv(op) => writeln!(writer, "{}IDIV {}", indent, op)?,
        Instruction::Cdq => writeln!(writer, "{}CDQ", indent)?,
        Instruction::Jmp { label } => writeln!(writer, "{}JMP {}", indent, label)?,
        Instruction::JmpCond { condition, label } => {
            writeln!(writer, "{}J{} {}", indent, condition.suffix(), label)?;
        }
        Instruction::SetCond { condition, dest } => {
            writeln!(
                writer,
                "{}SET{} {}",
                indent,
                condition.suffix(),
                show_byte_operand(dest)
            )?;
        }
        Instruction::Label(label) => writeln!(writer, "{}:", label)?,
        Instruction::Push(op) => writeln!(writer, "{}PUSH {}", indent, op)?,
        Instruction::Call(name) => writeln!(writer, "{}CALL {}", indent, name)?,
        Instruction::AllocateStack(amt) => writeln!(writer, "{}SUB {}, {}", indent, SP, amt)?,
        Instruction::DeallocateStack(amt) => writeln!(writer, "{}ADD {}, {}", indent, SP, amt)?,
        Instruction::Comment(text) => writeln!(writer, "{}; {}", indent, text)?,
        Instruction::Ret => {
            writeln!(writer, "{}MOV {}, {}", indent, SP, BP)?;
            writeln!(writer, "{}POP {}", indent, BP)?;
            writeln!(writer, "{}RET", indent)?;
        }
        Instruction::Exit => writeln!(writer, "{}EXIT", indent)?,
        Instruction::EnterBlock | Instruction::LeaveBlock => {}
    }

    Ok(())
}

fn show_unary(op: &UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "NEG",
    }
}

fn show_binary(op: &BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "ADD",
        BinaryOp::Sub => "SUB",
        BinaryOp::Mult => "IMUL",
    }
}

fn show_byte_operand(op: &Operand) -> String {
    match op {
        Operand::Register(reg) => reg.byte_name().to_string(),
        Operand::Frame(offset) => format!("BYTE PTR {}", frame_address(*offset)),
        Operand::Data(name) => format!("BYTE PTR {}", name),
        Operand::Imm(_) | Operand::Temp(_) => {
            panic!("Internal Error: {:?} cannot be the target of SETcc", op)
        }
    }
}
