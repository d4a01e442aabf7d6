//! Tests for the straight-line language: checking, lowering and the
//! shape of the modules it compiles into.

use crate::compiler::compiler_errors::ErrorType;
use crate::compiler::compiler_warnings::WarningKind;
use crate::compiler::lang_var::ast::{BinaryOp, Exp, Module, Stmt, UnaryOp};
use crate::compiler::lang_var::compile::{compile_exp, compile_module, compile_stmts};
use crate::compiler::lang_var::tychecker::check_module;
use crate::compiler::wasm::instructions::{NumOp, WasmId, WasmInstr, WasmValType};
use crate::compiler::wasm::module::WasmImportDesc;
use crate::compiler_tests::test_support::{run_program, run_program_with_inputs};
use crate::settings::{Config, DEFAULT_MAX_MEM_PAGES};

fn int(value: i64) -> Exp {
    Exp::IntConst(value)
}

fn name(name: &str) -> Exp {
    Exp::Name(name.to_string())
}

fn neg(operand: Exp) -> Exp {
    Exp::UnOp {
        op: UnaryOp::Neg,
        operand: Box::new(operand),
    }
}

fn binop(op: BinaryOp, left: Exp, right: Exp) -> Exp {
    Exp::BinOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn call(name: &str, args: Vec<Exp>) -> Exp {
    Exp::Call {
        name: name.to_string(),
        args,
    }
}

fn assign(target: &str, value: Exp) -> Stmt {
    Stmt::Assign {
        target: target.to_string(),
        value,
    }
}

fn module(body: Vec<Stmt>) -> Module {
    Module { body }
}

#[cfg(test)]
mod lowering_tests {
    use super::*;

    #[test]
    fn test_int_constant_lowers_to_i64_const() {
        let instructions = compile_exp(&int(7)).expect("constant should lower");
        assert_eq!(instructions, vec![WasmInstr::Const(WasmValType::I64, 7)]);
    }

    #[test]
    fn test_negation_subtracts_from_zero() {
        let instructions = compile_exp(&neg(int(3))).expect("negation should lower");
        assert_eq!(
            instructions,
            vec![
                WasmInstr::Const(WasmValType::I64, 0),
                WasmInstr::Const(WasmValType::I64, 3),
                WasmInstr::NumBinOp(WasmValType::I64, NumOp::Sub),
            ]
        );
    }

    #[test]
    fn test_operands_lower_left_to_right() {
        let instructions =
            compile_exp(&binop(BinaryOp::Sub, int(10), int(4))).expect("subtraction should lower");
        assert_eq!(
            instructions,
            vec![
                WasmInstr::Const(WasmValType::I64, 10),
                WasmInstr::Const(WasmValType::I64, 4),
                WasmInstr::NumBinOp(WasmValType::I64, NumOp::Sub),
            ]
        );
    }

    #[test]
    fn test_nested_expressions_lower_depth_first() {
        // 2 + 3 * 4
        let exp = binop(BinaryOp::Add, int(2), binop(BinaryOp::Mul, int(3), int(4)));

        let instructions = compile_exp(&exp).expect("nested expression should lower");
        assert_eq!(
            instructions,
            vec![
                WasmInstr::Const(WasmValType::I64, 2),
                WasmInstr::Const(WasmValType::I64, 3),
                WasmInstr::Const(WasmValType::I64, 4),
                WasmInstr::NumBinOp(WasmValType::I64, NumOp::Mul),
                WasmInstr::NumBinOp(WasmValType::I64, NumOp::Add),
            ]
        );
    }

    #[test]
    fn test_assignment_lowers_value_then_local_set() {
        let instructions =
            compile_stmts(&[assign("x", int(5))]).expect("assignment should lower");
        assert_eq!(
            instructions,
            vec![
                WasmInstr::Const(WasmValType::I64, 5),
                WasmInstr::LocalSet(WasmId::new("x")),
            ]
        );
    }

    #[test]
    fn test_call_lowers_arguments_before_the_call() {
        let instructions =
            compile_exp(&call("print", vec![int(1)])).expect("print call should lower");
        assert_eq!(
            instructions,
            vec![
                WasmInstr::Const(WasmValType::I64, 1),
                WasmInstr::Call(WasmId::new("print_i64")),
            ]
        );
    }

    #[test]
    fn test_input_call_lowers_to_a_bare_call() {
        let instructions =
            compile_exp(&call("input_int", vec![])).expect("input call should lower");
        assert_eq!(instructions, vec![WasmInstr::Call(WasmId::new("input_i64"))]);
    }

    #[test]
    fn test_unknown_function_is_rejected_in_lowering() {
        let error = compile_exp(&call("shout", vec![int(1)]))
            .expect_err("unknown function should not lower");
        assert_eq!(error.error_type, ErrorType::Rule);
        assert!(error.msg.contains("shout"), "error should name the function");
    }

    #[test]
    fn test_wrong_arity_is_rejected_in_lowering() {
        let error =
            compile_exp(&call("print", vec![])).expect_err("print with no argument is invalid");
        assert_eq!(error.error_type, ErrorType::Rule);
        assert!(error.msg.contains("expected 1, found 0"));
    }
}

#[cfg(test)]
mod checker_tests {
    use super::*;

    #[test]
    fn test_read_before_assignment_is_rejected() {
        let program = module(vec![Stmt::Exp(call("print", vec![name("x")]))]);

        let mut warnings = Vec::new();
        let error = check_module(&program, &mut warnings)
            .expect_err("reading an unassigned variable should fail");
        assert_eq!(error.error_type, ErrorType::Rule);
        assert!(error.msg.contains("'x'"));
    }

    #[test]
    fn test_assignment_then_read_is_accepted() {
        let program = module(vec![
            assign("x", int(1)),
            Stmt::Exp(call("print", vec![name("x")])),
        ]);

        let mut warnings = Vec::new();
        let symbols = check_module(&program, &mut warnings).expect("program should check");
        assert!(symbols.contains("x"));
        assert!(warnings.is_empty(), "a read variable should not warn");
    }

    #[test]
    fn test_symbol_table_keeps_first_assignment_order() {
        let program = module(vec![
            assign("second", int(2)),
            assign("first", int(1)),
            // Re-assignment must not move a variable to the back
            assign("second", name("first")),
            Stmt::Exp(call("print", vec![name("second")])),
        ]);

        let mut warnings = Vec::new();
        let symbols = check_module(&program, &mut warnings).expect("program should check");
        assert_eq!(symbols.iter().collect::<Vec<_>>(), vec!["second", "first"]);
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn test_bare_value_expression_is_rejected() {
        let program = module(vec![Stmt::Exp(binop(BinaryOp::Add, int(1), int(2)))]);

        let mut warnings = Vec::new();
        let error = check_module(&program, &mut warnings)
            .expect_err("a statement that leaves a value should fail");
        assert_eq!(error.error_type, ErrorType::Type);
    }

    #[test]
    fn test_bare_print_call_is_accepted() {
        let program = module(vec![Stmt::Exp(call("print", vec![int(1)]))]);

        let mut warnings = Vec::new();
        assert!(check_module(&program, &mut warnings).is_ok());
    }

    #[test]
    fn test_bare_input_call_is_rejected() {
        // input_int produces a value, so it can't stand alone
        let program = module(vec![Stmt::Exp(call("input_int", vec![]))]);

        let mut warnings = Vec::new();
        let error = check_module(&program, &mut warnings)
            .expect_err("discarding an input value should fail");
        assert_eq!(error.error_type, ErrorType::Type);
    }

    #[test]
    fn test_print_result_cannot_be_an_argument() {
        let program = module(vec![Stmt::Exp(call(
            "print",
            vec![call("print", vec![int(1)])],
        ))]);

        let mut warnings = Vec::new();
        let error = check_module(&program, &mut warnings)
            .expect_err("print has no result to pass along");
        assert_eq!(error.error_type, ErrorType::Type);
    }

    #[test]
    fn test_unused_variable_warns() {
        let program = module(vec![assign("x", int(1))]);

        let mut warnings = Vec::new();
        check_module(&program, &mut warnings).expect("program should check");

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].warning_kind, WarningKind::UnusedVariable);
        assert_eq!(warnings[0].msg, "x");
    }

    #[test]
    fn test_reassignment_is_allowed() {
        let program = module(vec![
            assign("x", int(1)),
            assign("x", binop(BinaryOp::Add, name("x"), int(1))),
            Stmt::Exp(call("print", vec![name("x")])),
        ]);

        let mut warnings = Vec::new();
        let symbols = check_module(&program, &mut warnings).expect("program should check");
        assert_eq!(symbols.len(), 1);
    }
}

#[cfg(test)]
mod module_tests {
    use super::*;

    fn compile(program: &Module) -> crate::compiler::wasm::module::WasmModule {
        let mut warnings = Vec::new();
        compile_module(program, &Config::default(), &mut warnings).expect("program should compile")
    }

    #[test]
    fn test_module_has_host_imports_and_one_entry_function() {
        let program = module(vec![
            assign("x", binop(BinaryOp::Add, int(2), binop(BinaryOp::Mul, int(3), int(4)))),
            Stmt::Exp(call("print", vec![name("x")])),
        ]);

        let compiled = compile(&program);

        assert_eq!(compiled.imports.len(), 3);
        let WasmImportDesc::Func { id, .. } = &compiled.imports[0].desc else {
            panic!("first import should be the print function");
        };
        assert_eq!(id.name(), "print_i64");
        let WasmImportDesc::Func { id, .. } = &compiled.imports[1].desc else {
            panic!("second import should be the input function");
        };
        assert_eq!(id.name(), "input_i64");
        assert_eq!(
            compiled.imports[2].desc,
            WasmImportDesc::Memory {
                min_pages: DEFAULT_MAX_MEM_PAGES
            }
        );

        assert_eq!(compiled.exports.len(), 1);
        assert_eq!(compiled.exports[0].name, "main");

        assert_eq!(compiled.funcs.len(), 1);
        let entry = &compiled.funcs[0];
        assert!(entry.params.is_empty(), "the entry function takes nothing");
        assert!(entry.result.is_none(), "the entry function returns nothing");
        assert_eq!(entry.locals, vec![(WasmId::new("x"), WasmValType::I64)]);
    }

    #[test]
    fn test_locals_follow_first_assignment_order() {
        let program = module(vec![
            assign("b", int(1)),
            assign("a", name("b")),
            Stmt::Exp(call("print", vec![name("a")])),
        ]);

        let compiled = compile(&program);
        let locals: Vec<&str> = compiled.funcs[0]
            .locals
            .iter()
            .map(|(id, _)| id.name())
            .collect();
        assert_eq!(locals, vec!["b", "a"]);
    }

    #[test]
    fn test_program_prints_the_computed_value() {
        let program = module(vec![
            assign("x", binop(BinaryOp::Add, int(2), binop(BinaryOp::Mul, int(3), int(4)))),
            Stmt::Exp(call("print", vec![name("x")])),
        ]);

        let compiled = compile(&program);
        let harness = run_program(&compiled.funcs[0].body);

        assert_eq!(harness.printed, vec![14]);
        assert!(harness.stack().is_empty(), "a program leaves the stack empty");
    }

    #[test]
    fn test_negation_prints_a_negative_value() {
        let program = module(vec![Stmt::Exp(call("print", vec![neg(int(3))]))]);

        let compiled = compile(&program);
        let harness = run_program(&compiled.funcs[0].body);

        assert_eq!(harness.printed, vec![-3]);
    }

    #[test]
    fn test_input_flows_through_arithmetic() {
        let program = module(vec![
            assign("x", call("input_int", vec![])),
            Stmt::Exp(call("print", vec![binop(BinaryOp::Add, name("x"), int(1))])),
        ]);

        let compiled = compile(&program);
        let harness = run_program_with_inputs(&compiled.funcs[0].body, &[41]);

        assert_eq!(harness.input_calls, 1);
        assert_eq!(harness.printed, vec![42]);
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let program = module(vec![
            assign("x", int(1)),
            assign("y", binop(BinaryOp::Mul, name("x"), int(3))),
            Stmt::Exp(call("print", vec![name("y")])),
        ]);

        assert_eq!(compile(&program), compile(&program));
    }
}
