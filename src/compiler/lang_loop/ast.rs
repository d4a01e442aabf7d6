use serde::{Deserialize, Serialize};

/// A whole program: the top-level statement sequence and nothing else.
/// There are no user-defined functions in this language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    /// An expression evaluated for its side effect only
    Exp(Exp),
    Assign {
        target: String,
        value: Exp,
    },
    If {
        cond: Exp,
        then_body: Vec<Stmt>,
        #[serde(default)]
        else_body: Vec<Stmt>,
    },
    While {
        cond: Exp,
        body: Vec<Stmt>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exp {
    IntConst(i64),
    BoolConst(bool),
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
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    And,
    Or,
}
