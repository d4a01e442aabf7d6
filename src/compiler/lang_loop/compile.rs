use crate::compiler::compiler_errors::CompileError;
use crate::compiler::compiler_warnings::CompilerWarning;
use crate::compiler::host_functions::lookup_host_function;
use crate::compiler::lang_loop::ast::{BinaryOp, Exp, Module, Stmt, UnaryOp};
use crate::compiler::lang_loop::tychecker::{self, Type};
use crate::compiler::wasm::instructions::{
    LabelAlloc, NumOp, RelOp, WasmId, WasmInstr, WasmValType,
};
use crate::compiler::wasm::module::WasmModule;
use crate::return_rule_error;
use crate::settings::{Config, STMT_TO_INSTR_RATIO};

/// Checks a program and lowers it to a complete module descriptor.
///
/// Every local comes straight out of the symbol table, Ints as i64 and
/// Bools as i32, in first-assignment order.
pub fn compile_module(
    module: &Module,
    config: &Config,
    warnings: &mut Vec<CompilerWarning>,
) -> Result<WasmModule, CompileError> {
    let symbols = tychecker::check_module(module, warnings)?;

    let mut labels = LabelAlloc::new();
    let body = compile_stmts(&module.body, &mut labels)?;

    let locals = symbols
        .iter()
        .map(|(name, ty)| {
            let val_type = match ty {
                Type::Int => WasmValType::I64,
                Type::Bool => WasmValType::I32,
            };
            (WasmId::new(name), val_type)
        })
        .collect();

    Ok(WasmModule::with_entry(locals, body, config.max_mem_pages))
}

pub fn compile_stmts(
    stmts: &[Stmt],
    labels: &mut LabelAlloc,
) -> Result<Vec<WasmInstr>, CompileError> {
    let mut instructions = Vec::with_capacity(stmts.len() * STMT_TO_INSTR_RATIO);

    for stmt in stmts {
        instructions.extend(compile_stmt(stmt, labels)?);
    }

    Ok(instructions)
}

fn compile_stmt(stmt: &Stmt, labels: &mut LabelAlloc) -> Result<Vec<WasmInstr>, CompileError> {
    match stmt {
        Stmt::Exp(exp) => compile_exp(exp),

        Stmt::Assign { target, value } => {
            let mut instructions = compile_exp(value)?;
            instructions.push(WasmInstr::LocalSet(WasmId::new(target)));
            Ok(instructions)
        }

        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            let mut instructions = compile_exp(cond)?;
            instructions.push(WasmInstr::If {
                result: None,
                then_body: compile_stmts(then_body, labels)?,
                else_body: compile_stmts(else_body, labels)?,
            });
            Ok(instructions)
        }

        Stmt::While { cond, body } => {
            // block $Ln_end
            //   loop $Ln_start
            //     <cond>
            //     if else br $Ln_end end
            //     <body>
            //     br $Ln_start
            //
            // The labels are allocated before the body lowers so an inner
            // loop can never reuse this loop's pair.
            let (loop_start, loop_end) = labels.next_loop();

            let mut loop_body = compile_exp(cond)?;
            loop_body.push(WasmInstr::If {
                result: None,
                then_body: Vec::new(),
                else_body: vec![WasmInstr::Branch {
                    target: loop_end,
                    conditional: false,
                }],
            });
            loop_body.extend(compile_stmts(body, labels)?);
            loop_body.push(WasmInstr::Branch {
                target: loop_start,
                conditional: false,
            });

            Ok(vec![WasmInstr::Block {
                label: loop_end,
                result: None,
                body: vec![WasmInstr::Loop {
                    label: loop_start,
                    body: loop_body,
                }],
            }])
        }
    }
}

/// Lowers one expression to the instructions that leave its value on the
/// stack. Operands always evaluate left to right; only `and` / `or` defer
/// their right side, behind an `if` arm, so it can short-circuit away.
pub fn compile_exp(exp: &Exp) -> Result<Vec<WasmInstr>, CompileError> {
    match exp {
        Exp::IntConst(value) => Ok(vec![WasmInstr::Const(WasmValType::I64, *value)]),

        Exp::BoolConst(value) => Ok(vec![WasmInstr::Const(
            WasmValType::I32,
            i64::from(*value),
        )]),

        Exp::Name(name) => Ok(vec![WasmInstr::LocalGet(WasmId::new(name))]),

        Exp::UnOp { op, operand } => match op {
            // 0 - x, since there is no i64.neg
            UnaryOp::Neg => {
                let mut instructions = vec![WasmInstr::Const(WasmValType::I64, 0)];
                instructions.extend(compile_exp(operand)?);
                instructions.push(WasmInstr::NumBinOp(WasmValType::I64, NumOp::Sub));
                Ok(instructions)
            }
            // x == 0 flips a boolean
            UnaryOp::Not => {
                let mut instructions = compile_exp(operand)?;
                instructions.push(WasmInstr::Const(WasmValType::I32, 0));
                instructions.push(WasmInstr::IntRelOp(WasmValType::I32, RelOp::Eq));
                Ok(instructions)
            }
        },

        Exp::BinOp { op, left, right } => {
            let mut instructions = compile_exp(left)?;

            match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                    let num_op = match op {
                        BinaryOp::Add => NumOp::Add,
                        BinaryOp::Sub => NumOp::Sub,
                        _ => NumOp::Mul,
                    };
                    instructions.extend(compile_exp(right)?);
                    instructions.push(WasmInstr::NumBinOp(WasmValType::I64, num_op));
                }

                BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
                    let rel_op = match op {
                        BinaryOp::Less => RelOp::LtS,
                        BinaryOp::LessEq => RelOp::LeS,
                        BinaryOp::Greater => RelOp::GtS,
                        _ => RelOp::GeS,
                    };
                    instructions.extend(compile_exp(right)?);
                    instructions.push(WasmInstr::IntRelOp(WasmValType::I64, rel_op));
                }

                BinaryOp::Eq => {
                    // Two boolean literals compare at their own width.
                    // Everything else, variables included, widens to i64
                    let width = if matches!(**left, Exp::BoolConst(_))
                        && matches!(**right, Exp::BoolConst(_))
                    {
                        WasmValType::I32
                    } else {
                        WasmValType::I64
                    };
                    instructions.extend(compile_exp(right)?);
                    instructions.push(WasmInstr::IntRelOp(width, RelOp::Eq));
                }

                BinaryOp::NotEq => {
                    instructions.extend(compile_exp(right)?);
                    instructions.push(WasmInstr::IntRelOp(WasmValType::I64, RelOp::Ne));
                }

                // The right side only evaluates when the left side hasn't
                // already decided the answer
                BinaryOp::And => {
                    instructions.push(WasmInstr::If {
                        result: Some(WasmValType::I32),
                        then_body: compile_exp(right)?,
                        else_body: vec![WasmInstr::Const(WasmValType::I32, 0)],
                    });
                }

                BinaryOp::Or => {
                    instructions.push(WasmInstr::If {
                        result: Some(WasmValType::I32),
                        then_body: vec![WasmInstr::Const(WasmValType::I32, 1)],
                        else_body: compile_exp(right)?,
                    });
                }
            }

            Ok(instructions)
        }

        Exp::Call { name, args } => compile_call(name, args),
    }
}

/// Lowers a host function call: arguments left to right, then the call.
///
/// The checker has already validated every call it saw, but lowering is
/// reachable on its own (tests drive it directly), so the registry lookup
/// and arity check are repeated here rather than assumed.
fn compile_call(name: &str, args: &[Exp]) -> Result<Vec<WasmInstr>, CompileError> {
    let Some(def) = lookup_host_function(name) else {
        return_rule_error!(
            format!("There is no function called '{name}' in this language"),
            { PrimarySuggestion => "The only callable functions are 'print' and 'input_int'" }
        );
    };

    if args.len() != def.arity() {
        return_rule_error!(format!(
            "Wrong number of arguments for '{}': expected {}, found {}",
            def.name,
            def.arity(),
            args.len()
        ));
    }

    let mut instructions = Vec::new();
    for arg in args {
        instructions.extend(compile_exp(arg)?);
    }
    instructions.push(WasmInstr::Call(def.wasm_id()));

    Ok(instructions)
}
