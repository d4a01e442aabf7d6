use serde::{Deserialize, Serialize};

/// A straight-line program: assignments and expression statements,
/// executed once from top to bottom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    /// An expression evaluated for its side effect only
    Exp(Exp),
    Assign { target: String, value: Exp },
}

/// Everything here is an integer. The variant with booleans and control
/// flow lives in [`crate::compiler::lang_loop`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exp {
    IntConst(i64),
    Name(String),
    UnOp {
        op: UnaryOp,
        operand: Box<Exp>,
    },
    BinOp {
        op: BinaryOp,
        left: Box<Exp>,
        right: Box<Exp>,
    },
    Call {
        name: String,
        args: Vec<Exp>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}
