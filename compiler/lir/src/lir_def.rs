use std::fmt::{Display, Formatter};

/// Defines assembly tree datatypes for 32-bit x86 in MASM syntax.
///
/// Two-operand instructions keep Intel order: `dest` (or the first compare
/// operand) is written first when emitted.

pub const WORD_SIZE: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// One uninitialised DWORD per top-level identifier, in declaration order.
    pub globals: Vec<String>,
    /// The entry procedure first, then one per function definition.
    pub procedures: Vec<Procedure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    /// Top-level statements; ends the program instead of returning.
    Entry,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub name: String,
    pub kind: ProcedureKind,
    /// Number of named locals at the top of the frame. Holders go below them.
    pub locals: usize,
    /// Bytes reserved below the saved frame pointer, known once holders have slots.
    pub frame_size: i32,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Mov {
        src: Operand,
        dest: Operand,
    },
    Unary {
        op: UnaryOp,
        dest: Operand,
    },
    Binary {
        op: BinaryOp,
        src: Operand,
        dest: Operand,
    },
    Cmp(Operand, Operand),
    Idiv(Operand),
    Cdq,
    Jmp {
        label: String,
    },
    JmpCond {
        condition: Condition,
        label: String,
    },
    SetCond {
        condition: Condition,
        dest: Operand,
    },
    Label(String),
    Push(Operand),
    Call(String),
    AllocateStack(i32),
    DeallocateStack(i32),
    Comment(String),
    /// Presentational nesting only.
    EnterBlock,
    LeaveBlock,
    Ret,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mult,
}

/// Where a value lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Imm(i32),
    Register(Register),
    /// An intermediate value holder, numbered per procedure.
    Temp(usize),
    /// `[ebp + offset]`
    Frame(i32),
    /// A global cell in the data section.
    Data(String),
}

impl Operand {
    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Frame(_) | Operand::Data(_) | Operand::Temp(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    AX,
    CX,
    DX,
    SP,
    BP,
}

impl Register {
    pub const fn name(self) -> &'static str {
        match self {
            Register::AX => "eax",
            Register::CX => "ecx",
            Register::DX => "edx",
            Register::SP => "esp",
            Register::BP => "ebp",
        }
    }

    /// Low byte, for `SETcc`.
    pub fn byte_name(self) -> &'static str {
        match self {
            Register::AX => "al",
            Register::CX => "cl",
            Register::DX => "dl",
            Register::SP | Register::BP => {
                panic!("Internal Error: {} has no byte register", self.name())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    E,
    NE,
    G,
    GE,
    L,
    LE,
}

impl Condition {
    pub fn suffix(self) -> &'static str {
        match self {
            Condition::E => "E",
            Condition::NE => "NE",
            Condition::G => "G",
            Condition::GE => "GE",
            Condition::L => "L",
            Condition::LE => "LE",
        }
    }
}

/// Formats the frame address part of an operand, e.g. `[ebp - 4]`.
pub fn frame_address(offset: i32) -> String {
    if offset < 0 {
        format!("[{} - {}]", Register::BP.name(), -offset)
    } else {
        format!("[{} + {}]", Register::BP.name(), offset)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Imm(val) => write!(f, "{}", val),
            Operand::Register(reg) => write!(f, "{}", reg.name()),
            Operand::Frame(offset) => write!(f, "DWORD PTR {}", frame_address(*offset)),
            Operand::Data(name) => write!(f, "{}", name),
            Operand::Temp(n) => panic!("Internal Error: holder t{} was never given a frame slot", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_render_in_masm_syntax() {
        assert_eq!(Operand::Imm(-3).to_string(), "-3");
        assert_eq!(Operand::Register(Register::AX).to_string(), "eax");
        assert_eq!(Operand::Frame(8).to_string(), "DWORD PTR [ebp + 8]");
        assert_eq!(Operand::Frame(-12).to_string(), "DWORD PTR [ebp - 12]");
        assert_eq!(Operand::Data("total".to_string()).to_string(), "total");
    }

    #[test]
    fn memory_operands() {
        assert!(Operand::Frame(-4).is_memory());
        assert!(Operand::Data("x".to_string()).is_memory());
        assert!(!Operand::Imm(1).is_memory());
        assert!(!Operand::Register(Register::CX).is_memory());
    }
}
