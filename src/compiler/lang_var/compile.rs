use crate::compiler::compiler_errors::CompileError;
use crate::compiler::compiler_warnings::CompilerWarning;
use crate::compiler::host_functions::lookup_host_function;
use crate::compiler::lang_var::ast::{BinaryOp, Exp, Module, Stmt, UnaryOp};
use crate::compiler::lang_var::tychecker;
use crate::compiler::wasm::instructions::{NumOp, WasmId, WasmInstr, WasmValType};
use crate::compiler::wasm::module::WasmModule;
use crate::return_rule_error;
use crate::settings::{Config, STMT_TO_INSTR_RATIO};

/// Checks a straight-line program and lowers it to a complete module
/// descriptor. Every variable becomes an i64 local.
pub fn compile_module(
    module: &Module,
    config: &Config,
    warnings: &mut Vec<CompilerWarning>,
) -> Result<WasmModule, CompileError> {
    let symbols = tychecker::check_module(module, warnings)?;

    let body = compile_stmts(&module.body)?;

    let locals = symbols
        .iter()
        .map(|name| (WasmId::new(name), WasmValType::I64))
        .collect();

    Ok(WasmModule::with_entry(locals, body, config.max_mem_pages))
}

pub fn compile_stmts(stmts: &[Stmt]) -> Result<Vec<WasmInstr>, CompileError> {
    let mut instructions = Vec::with_capacity(stmts.len() * STMT_TO_INSTR_RATIO);

    for stmt in stmts {
        match stmt {
            Stmt::Exp(exp) => instructions.extend(compile_exp(exp)?),

            Stmt::Assign { target, value } => {
                instructions.extend(compile_exp(value)?);
                instructions.push(WasmInstr::LocalSet(WasmId::new(target)));
            }
        }
    }

    Ok(instructions)
}

/// Lowers one expression, operands left to right. Nothing in this variant
/// short-circuits, so the output is always a flat run of instructions.
pub fn compile_exp(exp: &Exp) -> Result<Vec<WasmInstr>, CompileError> {
    match exp {
        Exp::IntConst(value) => Ok(vec![WasmInstr::Const(WasmValType::I64, *value)]),

        Exp::Name(name) => Ok(vec![WasmInstr::LocalGet(WasmId::new(name))]),

        // 0 - x, since there is no i64.neg
        Exp::UnOp {
            op: UnaryOp::Neg,
            operand,
        } => {
            let mut instructions = vec![WasmInstr::Const(WasmValType::I64, 0)];
            instructions.extend(compile_exp(operand)?);
            instructions.push(WasmInstr::NumBinOp(WasmValType::I64, NumOp::Sub));
            Ok(instructions)
        }

        Exp::BinOp { op, left, right } => {
            let num_op = match op {
                BinaryOp::Add => NumOp::Add,
                BinaryOp::Sub => NumOp::Sub,
                BinaryOp::Mul => NumOp::Mul,
            };
            let mut instructions = compile_exp(left)?;
            instructions.extend(compile_exp(right)?);
            instructions.push(WasmInstr::NumBinOp(WasmValType::I64, num_op));
            Ok(instructions)
        }

        Exp::Call { name, args } => compile_call(name, args),
    }
}

/// Lowers a host function call: arguments left to right, then the call.
/// The registry checks repeat here because tests drive lowering without
/// running the checker first.
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
