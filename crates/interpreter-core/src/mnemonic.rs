//! Opcode table and case-insensitive mnemonic lookup.

/// Every instruction understood by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Opcode {
    Mov,
    Inc,
    Dec,
    Add,
    Sub,
    Mul,
    Div,
    Jmp,
    Jnz,
    Cmp,
    Je,
    Jne,
    Jg,
    Jge,
    Jl,
    Jle,
    Call,
    Ret,
    Msg,
    End,
}

/// Number of operands an opcode accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many operands.
    Fixed(usize),
    /// Any number of operands, including zero.
    Variadic,
}

impl Opcode {
    /// Every opcode, in mnemonic table order.
    pub const ALL: [Self; 20] = [
        Self::Mov,
        Self::Inc,
        Self::Dec,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Jmp,
        Self::Jnz,
        Self::Cmp,
        Self::Je,
        Self::Jne,
        Self::Jg,
        Self::Jge,
        Self::Jl,
        Self::Jle,
        Self::Call,
        Self::Ret,
        Self::Msg,
        Self::End,
    ];

    /// Canonical lower-case mnemonic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mov => "mov",
            Self::Inc => "inc",
            Self::Dec => "dec",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Jmp => "jmp",
            Self::Jnz => "jnz",
            Self::Cmp => "cmp",
            Self::Je => "je",
            Self::Jne => "jne",
            Self::Jg => "jg",
            Self::Jge => "jge",
            Self::Jl => "jl",
            Self::Jle => "jle",
            Self::Call => "call",
            Self::Ret => "ret",
            Self::Msg => "msg",
            Self::End => "end",
        }
    }

    /// Operand count accepted by this opcode.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::Ret | Self::End => Arity::Fixed(0),
            Self::Inc
            | Self::Dec
            | Self::Jmp
            | Self::Je
            | Self::Jne
            | Self::Jg
            | Self::Jge
            | Self::Jl
            | Self::Jle
            | Self::Call => Arity::Fixed(1),
            Self::Mov
            | Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Jnz
            | Self::Cmp => Arity::Fixed(2),
            Self::Msg => Arity::Variadic,
        }
    }
}

/// Looks up a mnemonic, ignoring ASCII case.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<Opcode> {
    Opcode::ALL
        .into_iter()
        .find(|opcode| opcode.name().eq_ignore_ascii_case(name))
}
