//! A small interpreter over the structured instruction set.
//!
//! Lowering tests use this to pin down what a compiled program actually
//! does (what it prints, which operands ran, where values end up) without
//! dragging a real runtime into the test suite. Semantics follow the
//! target machine: locals default to zero, branches resolve to enclosing
//! constructs, a branch to a loop's start label re-runs the loop body.

use crate::compiler::wasm::instructions::{BlockLabel, NumOp, RelOp, WasmInstr};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// What one instruction sequence did when it ran
enum Outcome {
    /// Ran to the end
    Done,
    /// A branch fired and is still looking for its target construct
    Branched(BlockLabel),
}

pub struct Harness {
    locals: FxHashMap<String, i64>,
    stack: Vec<i64>,
    inputs: VecDeque<i64>,

    /// Every value passed to the print host function, in call order
    pub printed: Vec<i64>,
    /// How many times the input host function was consulted
    pub input_calls: usize,
}

impl Harness {
    pub fn new() -> Self {
        Harness {
            locals: FxHashMap::default(),
            stack: Vec::new(),
            inputs: VecDeque::new(),
            printed: Vec::new(),
            input_calls: 0,
        }
    }

    pub fn with_inputs(inputs: &[i64]) -> Self {
        let mut harness = Harness::new();
        harness.inputs = inputs.iter().copied().collect();
        harness
    }

    /// Runs a whole instruction sequence. Panics if a branch escapes the
    /// program, since lowering must always nest branches inside their
    /// target construct.
    pub fn run(&mut self, instructions: &[WasmInstr]) {
        match self.run_instrs(instructions) {
            Outcome::Done => {}
            Outcome::Branched(label) => panic!("branch to {label} escaped the program"),
        }
    }

    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    /// Reads a local the way the target would: unset means zero
    pub fn local(&self, name: &str) -> i64 {
        self.locals.get(name).copied().unwrap_or(0)
    }

    fn run_instrs(&mut self, instructions: &[WasmInstr]) -> Outcome {
        for instruction in instructions {
            match self.step(instruction) {
                Outcome::Done => {}
                branched => return branched,
            }
        }
        Outcome::Done
    }

    fn step(&mut self, instruction: &WasmInstr) -> Outcome {
        match instruction {
            WasmInstr::Const(_, value) => self.stack.push(*value),

            WasmInstr::LocalGet(id) => {
                let value = self.locals.get(id.name()).copied().unwrap_or(0);
                self.stack.push(value);
            }

            WasmInstr::LocalSet(id) => {
                let value = self.pop();
                self.locals.insert(id.name().to_string(), value);
            }

            WasmInstr::NumBinOp(_, op) => {
                let right = self.pop();
                let left = self.pop();
                self.stack.push(match op {
                    NumOp::Add => left.wrapping_add(right),
                    NumOp::Sub => left.wrapping_sub(right),
                    NumOp::Mul => left.wrapping_mul(right),
                });
            }

            WasmInstr::IntRelOp(_, op) => {
                let right = self.pop();
                let left = self.pop();
                self.stack.push(i64::from(match op {
                    RelOp::Eq => left == right,
                    RelOp::Ne => left != right,
                    RelOp::LtS => left < right,
                    RelOp::LeS => left <= right,
                    RelOp::GtS => left > right,
                    RelOp::GeS => left >= right,
                }));
            }

            WasmInstr::If {
                then_body,
                else_body,
                ..
            } => {
                let cond = self.pop();
                let body = if cond != 0 { then_body } else { else_body };
                return self.run_instrs(body);
            }

            WasmInstr::Block { label, body, .. } => {
                return match self.run_instrs(body) {
                    // A branch to a block's label jumps past its end
                    Outcome::Branched(target) if target == *label => Outcome::Done,
                    other => other,
                };
            }

            WasmInstr::Loop { label, body } => loop {
                match self.run_instrs(body) {
                    // A branch to a loop's label re-runs it from the top
                    Outcome::Branched(target) if target == *label => continue,
                    other => return other,
                }
            },

            WasmInstr::Branch {
                target,
                conditional,
            } => {
                if *conditional && self.pop() == 0 {
                    return Outcome::Done;
                }
                return Outcome::Branched(*target);
            }

            WasmInstr::Call(id) => match id.name() {
                "print_i64" => {
                    let value = self.pop();
                    self.printed.push(value);
                }
                "input_i64" => {
                    self.input_calls += 1;
                    let value = self.inputs.pop_front().unwrap_or(0);
                    self.stack.push(value);
                }
                other => panic!("test program called unknown host function '{other}'"),
            },
        }

        Outcome::Done
    }

    fn pop(&mut self) -> i64 {
        self.stack.pop().expect("value stack underflow in test program")
    }
}

/// Runs a full program body and hands back the harness for inspection
pub fn run_program(instructions: &[WasmInstr]) -> Harness {
    let mut harness = Harness::new();
    harness.run(instructions);
    harness
}

pub fn run_program_with_inputs(instructions: &[WasmInstr], inputs: &[i64]) -> Harness {
    let mut harness = Harness::with_inputs(inputs);
    harness.run(instructions);
    harness
}

/// Evaluates a lowered expression and asserts it leaves exactly one value
pub fn eval_exp(instructions: &[WasmInstr]) -> i64 {
    let mut harness = Harness::new();
    harness.run(instructions);
    assert_eq!(
        harness.stack().len(),
        1,
        "an expression should leave exactly one value on the stack"
    );
    harness.stack()[0]
}
