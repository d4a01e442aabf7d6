use crate::compiler::compiler_errors::CompileError;
use crate::compiler::compiler_warnings::{CompilerWarning, WarningKind};
use crate::compiler::host_functions::lookup_host_function;
use crate::compiler::lang_var::ast::{Exp, Module, Stmt};
use crate::compiler::wasm::instructions::WasmValType;
use crate::{return_rule_error, return_type_error, symbol_log};
use rustc_hash::FxHashMap;

/// The variables of a straight-line program in first-assignment order.
/// Every one of them is an integer, so all this table tracks per name is
/// whether anything ever read it back.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    read: FxHashMap<String, bool>,
}

impl SymbolTable {
    pub fn contains(&self, name: &str) -> bool {
        self.read.contains_key(name)
    }

    /// Variable names in first-assignment order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn declare(&mut self, name: &str) {
        if !self.read.contains_key(name) {
            self.names.push(name.to_string());
            self.read.insert(name.to_string(), false);
        }
    }

    /// Marks a read. False means the name was never assigned.
    fn mark_read(&mut self, name: &str) -> bool {
        match self.read.get_mut(name) {
            Some(read) => {
                *read = true;
                true
            }
            None => false,
        }
    }
}

/// Checks a straight-line program and collects its variables.
///
/// With one value type and no control flow, checking reduces to three
/// rules: reads follow assignments, a bare expression statement leaves
/// nothing on the stack, and calls match the host registry.
pub fn check_module(
    module: &Module,
    warnings: &mut Vec<CompilerWarning>,
) -> Result<SymbolTable, CompileError> {
    let mut symbols = SymbolTable::default();

    for stmt in &module.body {
        match stmt {
            Stmt::Exp(exp) => {
                if check_exp(exp, &mut symbols)? {
                    return_type_error!(
                        "This expression produces an Int that nothing consumes. \
                         Only calls without a result can stand alone as a statement",
                        { PrimarySuggestion => "Assign the value to a variable" }
                    );
                }
            }

            Stmt::Assign { target, value } => {
                require_value(check_exp(value, &mut symbols)?, "The right side of '='")?;
                symbols.declare(target);
            }
        }
    }

    for name in &symbols.names {
        if symbols.read.get(name) == Some(&false) {
            warnings.push(CompilerWarning::new(name, WarningKind::UnusedVariable));
        }
    }

    symbol_log!("Symbol table: ", #symbols);
    Ok(symbols)
}

fn require_value(produces_value: bool, context: &str) -> Result<(), CompileError> {
    if !produces_value {
        return_type_error!(format!("{context} needs a value, but this call produces none"));
    }
    Ok(())
}

/// Returns whether the expression leaves a value on the stack. The only
/// expressions that don't are calls to result-less host functions.
fn check_exp(exp: &Exp, symbols: &mut SymbolTable) -> Result<bool, CompileError> {
    match exp {
        Exp::IntConst(_) => Ok(true),

        Exp::Name(name) => {
            if symbols.mark_read(name) {
                Ok(true)
            } else {
                return_rule_error!(
                    format!("'{name}' is read before anything was assigned to it"),
                    { PrimarySuggestion => "Assign a value to it on an earlier line" }
                );
            }
        }

        // All operators in this variant are Int in, Int out, so operands
        // only need to produce a value at all
        Exp::UnOp { operand, .. } => {
            require_value(check_exp(operand, symbols)?, "A unary operator")?;
            Ok(true)
        }

        Exp::BinOp { left, right, .. } => {
            require_value(check_exp(left, symbols)?, "An operand")?;
            require_value(check_exp(right, symbols)?, "An operand")?;
            Ok(true)
        }

        Exp::Call { name, args } => check_call(name, args, symbols),
    }
}

fn check_call(name: &str, args: &[Exp], symbols: &mut SymbolTable) -> Result<bool, CompileError> {
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

    for (position, (arg, param)) in args.iter().zip(def.params).enumerate() {
        require_value(check_exp(arg, symbols)?, "An argument")?;
        if *param != WasmValType::I64 {
            return_type_error!(
                format!(
                    "'{}' expects {} for argument {}, and this language variant only has integers",
                    def.name,
                    param,
                    position + 1
                ),
                { FoundType => "Int" }
            );
        }
    }

    Ok(def.result.is_some())
}
