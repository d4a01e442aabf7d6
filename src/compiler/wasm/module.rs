use crate::compiler::host_functions::HOST_FUNCTIONS;
use crate::compiler::wasm::instructions::{WasmId, WasmInstr, WasmValType};
use crate::settings::{ENTRY_FUNC_NAME, HOST_MEMORY_NAME, HOST_MODULE_NAME};

#[derive(Clone, Debug, PartialEq)]
pub struct WasmImport {
    pub module: String,
    pub name: String,
    pub desc: WasmImportDesc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WasmImportDesc {
    Func {
        id: WasmId,
        params: Vec<WasmValType>,
        result: Option<WasmValType>,
    },
    Memory {
        min_pages: u64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct WasmExport {
    pub name: String,
    pub func: WasmId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WasmGlobal {
    pub id: WasmId,
    pub ty: WasmValType,
    pub mutable: bool,
    pub init: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WasmData {
    pub offset: u32,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WasmFunc {
    pub id: WasmId,
    pub params: Vec<(WasmId, WasmValType)>,
    pub result: Option<WasmValType>,
    pub locals: Vec<(WasmId, WasmValType)>,
    pub body: Vec<WasmInstr>,
}

/// Everything that ends up in the emitted module.
///
/// Globals, data segments and the indirect function table are always empty
/// for both language variants, but they stay in the descriptor so the
/// output type states the whole module contract rather than implying it.
#[derive(Clone, Debug, PartialEq)]
pub struct WasmModule {
    pub imports: Vec<WasmImport>,
    pub exports: Vec<WasmExport>,
    pub globals: Vec<WasmGlobal>,
    pub data: Vec<WasmData>,
    pub func_table: Vec<WasmId>,
    pub funcs: Vec<WasmFunc>,
}

impl WasmModule {
    /// Assembles the one-entry-function module shape both variants share:
    /// host imports from the registry plus linear memory, one
    /// unparameterized function holding the lowered program, exported under
    /// the fixed entry name so every harness can find it.
    pub fn with_entry(
        locals: Vec<(WasmId, WasmValType)>,
        body: Vec<WasmInstr>,
        max_mem_pages: u64,
    ) -> WasmModule {
        let mut imports: Vec<WasmImport> = HOST_FUNCTIONS
            .iter()
            .map(|def| WasmImport {
                module: def.import_module.to_string(),
                name: def.import_name.to_string(),
                desc: WasmImportDesc::Func {
                    id: def.wasm_id(),
                    params: def.params.to_vec(),
                    result: def.result,
                },
            })
            .collect();

        imports.push(WasmImport {
            module: HOST_MODULE_NAME.to_string(),
            name: HOST_MEMORY_NAME.to_string(),
            desc: WasmImportDesc::Memory {
                min_pages: max_mem_pages,
            },
        });

        let entry = WasmId::new(ENTRY_FUNC_NAME);

        WasmModule {
            imports,
            exports: vec![WasmExport {
                name: ENTRY_FUNC_NAME.to_string(),
                func: entry.clone(),
            }],
            globals: Vec::new(),
            data: Vec::new(),
            func_table: Vec::new(),
            funcs: vec![WasmFunc {
                id: entry,
                params: Vec::new(),
                result: None,
                locals,
                body,
            }],
        }
    }
}
