use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::instructions::{BlockLabel, NumOp, RelOp, WasmInstr, WasmValType};
use crate::compiler::wasm::module::{WasmFunc, WasmImportDesc, WasmModule};
use crate::return_compiler_error;
use rustc_hash::FxHashMap;
use wasm_encoder::{
    BlockType, CodeSection, DataSection, ExportKind, ExportSection, Function, FunctionSection,
    GlobalSection, ImportSection, Instruction, Module, TypeSection, ValType,
};

/// Registered function signature, for type deduplication
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FuncType {
    params: Vec<ValType>,
    results: Vec<ValType>,
}

/// One structured construct a branch has to cross on its way out.
///
/// `if` arms never carry a label in this IR, but they still count one
/// nesting level in the binary format's relative branch depths, so they
/// have to sit on the frame stack like everything else.
enum Frame {
    Block(BlockLabel),
    Loop(BlockLabel),
    IfArm,
}

/// Encodes a module descriptor into WASM bytes.
///
/// Function types are deduplicated, imported functions take the first
/// function indices, and sections are written in the binary format's
/// required order. Branches come in naming a label and leave as relative
/// depths, resolved against the stack of enclosing frames.
pub fn encode_module(module: &WasmModule) -> Result<Vec<u8>, CompileError> {
    let mut type_section = TypeSection::new();
    let mut type_cache: FxHashMap<FuncType, u32> = FxHashMap::default();
    let mut import_section = ImportSection::new();
    let mut function_section = FunctionSection::new();
    let mut global_section = GlobalSection::new();
    let mut export_section = ExportSection::new();
    let mut code_section = CodeSection::new();
    let mut data_section = DataSection::new();

    // Imported functions are indexed before module-defined functions
    let mut func_indices: FxHashMap<String, u32> = FxHashMap::default();
    let mut import_function_count: u32 = 0;

    for import in &module.imports {
        match &import.desc {
            WasmImportDesc::Func { id, params, result } => {
                let type_idx = add_function_type(
                    &mut type_section,
                    &mut type_cache,
                    params.iter().map(|ty| val_type(*ty)).collect(),
                    result.iter().map(|ty| val_type(*ty)).collect(),
                );
                import_section.import(
                    &import.module,
                    &import.name,
                    wasm_encoder::EntityType::Function(type_idx),
                );
                if func_indices
                    .insert(id.name().to_string(), import_function_count)
                    .is_some()
                {
                    return_compiler_error!("Duplicate function id {} in the import list", id);
                }
                import_function_count += 1;
            }
            WasmImportDesc::Memory { min_pages } => {
                import_section.import(
                    &import.module,
                    &import.name,
                    wasm_encoder::EntityType::Memory(wasm_encoder::MemoryType {
                        minimum: *min_pages,
                        maximum: None,
                        memory64: false,
                        shared: false,
                        page_size_log2: None,
                    }),
                );
            }
        }
    }

    // All function indices have to be known before any body is encoded,
    // otherwise calls can't be resolved in one pass
    for (offset, func) in module.funcs.iter().enumerate() {
        let index = import_function_count + offset as u32;
        if func_indices
            .insert(func.id.name().to_string(), index)
            .is_some()
        {
            return_compiler_error!("Duplicate function id {}", func.id);
        }
    }

    for func in &module.funcs {
        let type_idx = add_function_type(
            &mut type_section,
            &mut type_cache,
            func.params.iter().map(|(_, ty)| val_type(*ty)).collect(),
            func.result.iter().map(|ty| val_type(*ty)).collect(),
        );
        function_section.function(type_idx);
        code_section.function(&encode_func(func, &func_indices)?);
    }

    for global in &module.globals {
        let init = match global.ty {
            WasmValType::I32 => wasm_encoder::ConstExpr::i32_const(global.init as i32),
            WasmValType::I64 => wasm_encoder::ConstExpr::i64_const(global.init),
        };
        global_section.global(
            wasm_encoder::GlobalType {
                val_type: val_type(global.ty),
                mutable: global.mutable,
                shared: false,
            },
            &init,
        );
    }

    if !module.func_table.is_empty() {
        // Neither language variant has indirect calls,
        // so there is no element segment encoding here at all
        return_compiler_error!("Indirect function tables are not part of this target");
    }

    for export in &module.exports {
        let Some(index) = func_indices.get(export.func.name()) else {
            return_compiler_error!(
                "Export '{}' refers to unknown function {}",
                export.name,
                export.func,
            );
        };
        export_section.export(&export.name, ExportKind::Func, *index);
    }

    for data in &module.data {
        data_section.active(
            0,
            &wasm_encoder::ConstExpr::i32_const(data.offset as i32),
            data.bytes.iter().copied(),
        );
    }

    // Sections in the required WASM binary order
    let mut out = Module::new();
    out.section(&type_section);
    out.section(&import_section);
    out.section(&function_section);
    if !module.globals.is_empty() {
        out.section(&global_section);
    }
    out.section(&export_section);
    out.section(&code_section);
    if !module.data.is_empty() {
        out.section(&data_section);
    }

    Ok(out.finish())
}

/// Add a function type and return its index.
/// Uses type deduplication to avoid duplicate type entries.
fn add_function_type(
    type_section: &mut TypeSection,
    type_cache: &mut FxHashMap<FuncType, u32>,
    params: Vec<ValType>,
    results: Vec<ValType>,
) -> u32 {
    let func_type = FuncType {
        params: params.clone(),
        results: results.clone(),
    };

    if let Some(&existing_index) = type_cache.get(&func_type) {
        return existing_index;
    }

    let type_index = type_cache.len() as u32;
    type_section.ty().function(params, results);
    type_cache.insert(func_type, type_index);

    type_index
}

fn encode_func(func: &WasmFunc, func_indices: &FxHashMap<String, u32>) -> Result<Function, CompileError> {
    // Params take the first local indices, declared locals follow
    let mut local_indices: FxHashMap<String, u32> = FxHashMap::default();
    for (id, _) in func.params.iter().chain(&func.locals) {
        let index = local_indices.len() as u32;
        if local_indices.insert(id.name().to_string(), index).is_some() {
            return_compiler_error!("Duplicate local {} in function {}", id, func.id);
        }
    }

    // Locals compress to (count, type) runs in the binary format
    let mut local_runs: Vec<(u32, ValType)> = Vec::new();
    for (_, ty) in &func.locals {
        let vt = val_type(*ty);
        match local_runs.last_mut() {
            Some((count, last)) if *last == vt => *count += 1,
            _ => local_runs.push((1, vt)),
        }
    }

    let mut function = Function::new(local_runs);
    let mut frames: Vec<Frame> = Vec::new();
    encode_instrs(&mut function, &func.body, &local_indices, func_indices, &mut frames)?;
    function.instruction(&Instruction::End);

    Ok(function)
}

fn encode_instrs(
    function: &mut Function,
    instrs: &[WasmInstr],
    locals: &FxHashMap<String, u32>,
    funcs: &FxHashMap<String, u32>,
    frames: &mut Vec<Frame>,
) -> Result<(), CompileError> {
    for instr in instrs {
        match instr {
            WasmInstr::Const(WasmValType::I64, value) => {
                function.instruction(&Instruction::I64Const(*value));
            }
            WasmInstr::Const(WasmValType::I32, value) => {
                function.instruction(&Instruction::I32Const(*value as i32));
            }

            WasmInstr::LocalGet(id) => {
                let Some(index) = locals.get(id.name()) else {
                    return_compiler_error!("local.get on undeclared local {}", id);
                };
                function.instruction(&Instruction::LocalGet(*index));
            }
            WasmInstr::LocalSet(id) => {
                let Some(index) = locals.get(id.name()) else {
                    return_compiler_error!("local.set on undeclared local {}", id);
                };
                function.instruction(&Instruction::LocalSet(*index));
            }

            WasmInstr::NumBinOp(ty, op) => {
                function.instruction(&num_bin_op(*ty, *op));
            }
            WasmInstr::IntRelOp(ty, op) => {
                function.instruction(&int_rel_op(*ty, *op));
            }

            WasmInstr::If {
                result,
                then_body,
                else_body,
            } => {
                if result.is_some() && else_body.is_empty() {
                    return_compiler_error!(
                        "An if that produces a value needs both arms, one arm is missing"
                    );
                }
                function.instruction(&Instruction::If(block_type(*result)));
                frames.push(Frame::IfArm);
                encode_instrs(function, then_body, locals, funcs, frames)?;
                if !else_body.is_empty() {
                    function.instruction(&Instruction::Else);
                    encode_instrs(function, else_body, locals, funcs, frames)?;
                }
                frames.pop();
                function.instruction(&Instruction::End);
            }

            WasmInstr::Block {
                label,
                result,
                body,
            } => {
                function.instruction(&Instruction::Block(block_type(*result)));
                frames.push(Frame::Block(*label));
                encode_instrs(function, body, locals, funcs, frames)?;
                frames.pop();
                function.instruction(&Instruction::End);
            }

            WasmInstr::Loop { label, body } => {
                function.instruction(&Instruction::Loop(BlockType::Empty));
                frames.push(Frame::Loop(*label));
                encode_instrs(function, body, locals, funcs, frames)?;
                frames.pop();
                function.instruction(&Instruction::End);
            }

            WasmInstr::Branch {
                target,
                conditional,
            } => {
                let Some(depth) = branch_depth(frames, *target) else {
                    return_compiler_error!(
                        "Branch to {} has no enclosing block or loop with that label",
                        target,
                    );
                };
                if *conditional {
                    function.instruction(&Instruction::BrIf(depth));
                } else {
                    function.instruction(&Instruction::Br(depth));
                }
            }

            WasmInstr::Call(id) => {
                let Some(index) = funcs.get(id.name()) else {
                    return_compiler_error!("Call to unknown function {}", id);
                };
                function.instruction(&Instruction::Call(*index));
            }
        }
    }

    Ok(())
}

/// Relative depth of the frame a branch targets, counted from the
/// innermost frame outwards. This is the binary format's branch operand.
fn branch_depth(frames: &[Frame], target: BlockLabel) -> Option<u32> {
    for (depth, frame) in frames.iter().rev().enumerate() {
        match frame {
            Frame::Block(label) | Frame::Loop(label) if *label == target => {
                return Some(depth as u32);
            }
            _ => {}
        }
    }
    None
}

fn val_type(ty: WasmValType) -> ValType {
    match ty {
        WasmValType::I32 => ValType::I32,
        WasmValType::I64 => ValType::I64,
    }
}

fn block_type(result: Option<WasmValType>) -> BlockType {
    match result {
        Some(ty) => BlockType::Result(val_type(ty)),
        None => BlockType::Empty,
    }
}

fn num_bin_op(ty: WasmValType, op: NumOp) -> Instruction<'static> {
    match (ty, op) {
        (WasmValType::I64, NumOp::Add) => Instruction::I64Add,
        (WasmValType::I64, NumOp::Sub) => Instruction::I64Sub,
        (WasmValType::I64, NumOp::Mul) => Instruction::I64Mul,
        (WasmValType::I32, NumOp::Add) => Instruction::I32Add,
        (WasmValType::I32, NumOp::Sub) => Instruction::I32Sub,
        (WasmValType::I32, NumOp::Mul) => Instruction::I32Mul,
    }
}

fn int_rel_op(ty: WasmValType, op: RelOp) -> Instruction<'static> {
    match (ty, op) {
        (WasmValType::I64, RelOp::Eq) => Instruction::I64Eq,
        (WasmValType::I64, RelOp::Ne) => Instruction::I64Ne,
        (WasmValType::I64, RelOp::LtS) => Instruction::I64LtS,
        (WasmValType::I64, RelOp::LeS) => Instruction::I64LeS,
        (WasmValType::I64, RelOp::GtS) => Instruction::I64GtS,
        (WasmValType::I64, RelOp::GeS) => Instruction::I64GeS,
        (WasmValType::I32, RelOp::Eq) => Instruction::I32Eq,
        (WasmValType::I32, RelOp::Ne) => Instruction::I32Ne,
        (WasmValType::I32, RelOp::LtS) => Instruction::I32LtS,
        (WasmValType::I32, RelOp::LeS) => Instruction::I32LeS,
        (WasmValType::I32, RelOp::GtS) => Instruction::I32GtS,
        (WasmValType::I32, RelOp::GeS) => Instruction::I32GeS,
    }
}
