use std::fmt;

/// The two value representations this compiler ever puts on the stack.
/// Integers are i64. Booleans are i32 with 0 = false and 1 = true.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WasmValType {
    I32,
    I64,
}

impl WasmValType {
    pub fn name(self) -> &'static str {
        match self {
            WasmValType::I32 => "i32",
            WasmValType::I64 => "i64",
        }
    }
}

impl fmt::Display for WasmValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumOp {
    Add,
    Sub,
    Mul,
}

impl fmt::Display for NumOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumOp::Add => "add",
            NumOp::Sub => "sub",
            NumOp::Mul => "mul",
        })
    }
}

/// Signed comparisons only. The source languages have no unsigned integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    LtS,
    LeS,
    GtS,
    GeS,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelOp::Eq => "eq",
            RelOp::Ne => "ne",
            RelOp::LtS => "lt_s",
            RelOp::LeS => "le_s",
            RelOp::GtS => "gt_s",
            RelOp::GeS => "ge_s",
        })
    }
}

/// A symbolic name in the emitted module (a local or a function).
/// Renders with the `$` sigil in the text format.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WasmId(String);

impl WasmId {
    pub fn new(name: impl Into<String>) -> Self {
        WasmId(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WasmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LabelRole {
    LoopStart,
    LoopEnd,
}

/// Names one structured construct a branch can target.
///
/// Branches in the binary format are resolved by nesting depth rather than
/// by name, so labels only need to be unique enough that the encoder can
/// find the right enclosing frame. One pair gets allocated per loop, which
/// keeps nested loops from capturing each other's branches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLabel {
    id: u32,
    role: LabelRole,
}

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            LabelRole::LoopStart => write!(f, "$L{}_start", self.id),
            LabelRole::LoopEnd => write!(f, "$L{}_end", self.id),
        }
    }
}

/// Hands out a fresh label pair for every loop in a module.
#[derive(Debug, Default)]
pub struct LabelAlloc {
    next: u32,
}

impl LabelAlloc {
    pub fn new() -> Self {
        LabelAlloc { next: 0 }
    }

    /// Returns (loop-start, loop-end) labels for one loop.
    pub fn next_loop(&mut self) -> (BlockLabel, BlockLabel) {
        let id = self.next;
        self.next += 1;
        (
            BlockLabel {
                id,
                role: LabelRole::LoopStart,
            },
            BlockLabel {
                id,
                role: LabelRole::LoopEnd,
            },
        )
    }
}

/// One instruction of the structured stack machine both language variants
/// lower into. Structured constructs own their bodies, so an instruction
/// sequence is always a tree, never a flat list with paired delimiters.
#[derive(Clone, Debug, PartialEq)]
pub enum WasmInstr {
    /// Push a constant. Booleans are stored in the i64 payload as 0 or 1.
    Const(WasmValType, i64),
    LocalGet(WasmId),
    LocalSet(WasmId),
    NumBinOp(WasmValType, NumOp),
    IntRelOp(WasmValType, RelOp),
    If {
        result: Option<WasmValType>,
        then_body: Vec<WasmInstr>,
        else_body: Vec<WasmInstr>,
    },
    Block {
        label: BlockLabel,
        result: Option<WasmValType>,
        body: Vec<WasmInstr>,
    },
    Loop {
        label: BlockLabel,
        body: Vec<WasmInstr>,
    },
    Branch {
        target: BlockLabel,
        conditional: bool,
    },
    Call(WasmId),
}
