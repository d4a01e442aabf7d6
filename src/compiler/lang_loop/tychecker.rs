use crate::compiler::compiler_errors::CompileError;
use crate::compiler::compiler_warnings::{CompilerWarning, WarningKind};
use crate::compiler::host_functions::lookup_host_function;
use crate::compiler::lang_loop::ast::{BinaryOp, Exp, Module, Stmt, UnaryOp};
use crate::compiler::wasm::instructions::WasmValType;
use crate::{return_rule_error, return_type_error, symbol_log};
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Type {
    Int,
    Bool,
}

impl Type {
    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "Int",
            Type::Bool => "Bool",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a host function's value types look from inside the language
fn host_value_type(ty: WasmValType) -> Type {
    match ty {
        WasmValType::I64 => Type::Int,
        WasmValType::I32 => Type::Bool,
    }
}

#[derive(Debug)]
struct SymbolInfo {
    ty: Type,
    read: bool,
}

/// Everything the checker learned about the program's variables.
///
/// Iteration follows first-assignment order, so the locals declared from
/// this table come out identical on every build of the same program.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    info: FxHashMap<String, SymbolInfo>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<Type> {
        self.info.get(name).map(|info| info.ty)
    }

    /// Variables in first-assignment order with their types
    pub fn iter(&self) -> impl Iterator<Item = (&str, Type)> {
        self.names
            .iter()
            .filter_map(|name| self.info.get(name).map(|info| (name.as_str(), info.ty)))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn declare(&mut self, name: &str, ty: Type) {
        if !self.info.contains_key(name) {
            self.names.push(name.to_string());
            self.info.insert(name.to_string(), SymbolInfo { ty, read: false });
        }
    }

    /// Look a variable up for reading and remember that it was read
    fn read(&mut self, name: &str) -> Option<Type> {
        self.info.get_mut(name).map(|info| {
            info.read = true;
            info.ty
        })
    }
}

/// Type checks a whole program and builds its symbol table.
///
/// The first violation aborts checking. Everything downstream of this
/// function trusts the table unconditionally, so the rules here carry the
/// full weight of keeping the lowered module well typed: conditions are
/// Bool, operators get the operand types they expect, a variable never
/// changes type, and nothing is read before its first assignment.
pub fn check_module(
    module: &Module,
    warnings: &mut Vec<CompilerWarning>,
) -> Result<SymbolTable, CompileError> {
    let mut symbols = SymbolTable::default();
    check_stmts(&module.body, &mut symbols, warnings)?;

    for name in &symbols.names {
        if symbols.info.get(name).is_some_and(|info| !info.read) {
            warnings.push(CompilerWarning::new(name, WarningKind::UnusedVariable));
        }
    }

    symbol_log!("Symbol table: ", #symbols);
    Ok(symbols)
}

fn check_stmts(
    stmts: &[Stmt],
    symbols: &mut SymbolTable,
    warnings: &mut Vec<CompilerWarning>,
) -> Result<(), CompileError> {
    for stmt in stmts {
        match stmt {
            Stmt::Exp(exp) => {
                // A value left behind by a bare expression would dangle on
                // the operand stack forever, so only no-result calls like
                // print(..) can stand alone
                if let Some(ty) = check_exp(exp, symbols)? {
                    return_type_error!(
                        format!(
                            "This expression produces a {ty} that nothing consumes. \
                             Only calls without a result can stand alone as a statement"
                        ),
                        { PrimarySuggestion => "Assign the value to a variable" }
                    );
                }
            }

            Stmt::Assign { target, value } => {
                let ty = require_value(check_exp(value, symbols)?, "The right side of '='")?;
                match symbols.get(target) {
                    Some(existing) if existing != ty => {
                        return_type_error!(
                            format!(
                                "'{target}' is a {existing} and can't be re-assigned to a {ty}"
                            ),
                            {
                                ExpectedType => existing.name(),
                                FoundType => ty.name(),
                            }
                        );
                    }
                    Some(_) => {}
                    None => symbols.declare(target, ty),
                }
            }

            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                require_bool_cond(cond, symbols, "if")?;
                check_stmts(then_body, symbols, warnings)?;
                check_stmts(else_body, symbols, warnings)?;
            }

            Stmt::While { cond, body } => {
                require_bool_cond(cond, symbols, "while")?;

                if let Exp::BoolConst(value) = cond {
                    let msg = if *value {
                        "This while condition is always true, the loop can never exit"
                    } else {
                        "This while condition is always false, the body will never run"
                    };
                    warnings.push(CompilerWarning::new(msg, WarningKind::ConstantCondition));
                }

                check_stmts(body, symbols, warnings)?;
            }
        }
    }

    Ok(())
}

fn require_bool_cond(
    cond: &Exp,
    symbols: &mut SymbolTable,
    construct: &str,
) -> Result<(), CompileError> {
    let ty = require_value(check_exp(cond, symbols)?, "A condition")?;
    if ty != Type::Bool {
        return_type_error!(
            format!("The condition of '{construct}' must be a Bool, found {ty}"),
            {
                ExpectedType => "Bool",
                FoundType => ty.name(),
            }
        );
    }
    Ok(())
}

fn require_value(ty: Option<Type>, context: &str) -> Result<Type, CompileError> {
    match ty {
        Some(ty) => Ok(ty),
        None => return_type_error!(format!("{context} needs a value, but this call produces none")),
    }
}

/// Infers an expression's type. `None` means the expression produces no
/// value at all (a call to a result-less host function).
fn check_exp(exp: &Exp, symbols: &mut SymbolTable) -> Result<Option<Type>, CompileError> {
    match exp {
        Exp::IntConst(_) => Ok(Some(Type::Int)),
        Exp::BoolConst(_) => Ok(Some(Type::Bool)),

        Exp::Name(name) => match symbols.read(name) {
            Some(ty) => Ok(Some(ty)),
            None => return_rule_error!(
                format!("'{name}' is read before anything was assigned to it"),
                { PrimarySuggestion => "Assign a value to it on an earlier line" }
            ),
        },

        Exp::UnOp { op, operand } => {
            let ty = require_value(check_exp(operand, symbols)?, "A unary operator")?;
            match op {
                UnaryOp::Neg if ty == Type::Int => Ok(Some(Type::Int)),
                UnaryOp::Not if ty == Type::Bool => Ok(Some(Type::Bool)),
                UnaryOp::Neg => return_type_error!(
                    format!("'-' negates an Int, found {ty}"),
                    { ExpectedType => "Int", FoundType => ty.name() }
                ),
                UnaryOp::Not => return_type_error!(
                    format!("'not' inverts a Bool, found {ty}"),
                    { ExpectedType => "Bool", FoundType => ty.name() }
                ),
            }
        }

        Exp::BinOp { op, left, right } => {
            let left_ty = require_value(check_exp(left, symbols)?, "An operand")?;
            let right_ty = require_value(check_exp(right, symbols)?, "An operand")?;

            match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                    require_both(*op, left_ty, right_ty, Type::Int)?;
                    Ok(Some(Type::Int))
                }

                BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
                    require_both(*op, left_ty, right_ty, Type::Int)?;
                    Ok(Some(Type::Bool))
                }

                BinaryOp::Eq | BinaryOp::NotEq => {
                    if left_ty != right_ty {
                        return_type_error!(
                            format!(
                                "Both sides of a comparison must have the same type, \
                                 found {left_ty} and {right_ty}"
                            ),
                            { ExpectedType => left_ty.name(), FoundType => right_ty.name() }
                        );
                    }

                    // Boolean equality is narrower than it looks: the emitted
                    // comparison only matches the boolean representation when
                    // both sides are written as literals, so everything else
                    // gets rejected here instead of producing a module that
                    // can't validate
                    if left_ty == Type::Bool {
                        let both_literals = matches!(**left, Exp::BoolConst(_))
                            && matches!(**right, Exp::BoolConst(_));
                        if *op != BinaryOp::Eq || !both_literals {
                            return_rule_error!(
                                "Bools can only be compared with '==' between the literals \
                                 'true' and 'false'",
                                { PrimarySuggestion => "Use 'and', 'or' and 'not' to combine Bools" }
                            );
                        }
                    }

                    Ok(Some(Type::Bool))
                }

                BinaryOp::And | BinaryOp::Or => {
                    require_both(*op, left_ty, right_ty, Type::Bool)?;
                    Ok(Some(Type::Bool))
                }
            }
        }

        Exp::Call { name, args } => check_call(name, args, symbols),
    }
}

fn require_both(
    op: BinaryOp,
    left: Type,
    right: Type,
    expected: Type,
) -> Result<(), CompileError> {
    for found in [left, right] {
        if found != expected {
            return_type_error!(
                format!("{op:?} takes two {expected} operands, found {found}"),
                { ExpectedType => expected.name(), FoundType => found.name() }
            );
        }
    }
    Ok(())
}

fn check_call(
    name: &str,
    args: &[Exp],
    symbols: &mut SymbolTable,
) -> Result<Option<Type>, CompileError> {
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
        let found = require_value(check_exp(arg, symbols)?, "An argument")?;
        let expected = host_value_type(*param);
        if found != expected {
            return_type_error!(
                format!(
                    "'{}' expects {} for argument {}, found {}",
                    def.name,
                    expected,
                    position + 1,
                    found
                ),
                { ExpectedType => expected.name(), FoundType => found.name() }
            );
        }
    }

    Ok(def.result.map(host_value_type))
}
