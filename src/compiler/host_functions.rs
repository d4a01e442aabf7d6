use crate::compiler::wasm::instructions::{WasmId, WasmValType};
use crate::settings::HOST_MODULE_NAME;

/// Definition of one function the runtime provides to compiled programs.
///
/// The registry is the single source of truth for the host boundary:
/// call dispatch resolves callee names against it, the type checkers take
/// argument counts and types from it, and module assembly derives the
/// function import list from it (in registration order).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostFunctionDef {
    /// Name the source language calls it by
    pub name: &'static str,
    pub params: &'static [WasmValType],
    pub result: Option<WasmValType>,

    /// Where the import comes from at runtime
    pub import_module: &'static str,
    pub import_name: &'static str,

    pub description: &'static str,
}

impl HostFunctionDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The id call instructions use for this function inside the module
    pub fn wasm_id(&self) -> WasmId {
        WasmId::new(self.import_name)
    }
}

/// Every host function either language variant can reach.
/// Keep this list short: each entry becomes an import in every single
/// module this compiler ever emits, whether the program calls it or not.
pub const HOST_FUNCTIONS: &[HostFunctionDef] = &[
    HostFunctionDef {
        name: "print",
        params: &[WasmValType::I64],
        result: None,
        import_module: HOST_MODULE_NAME,
        import_name: "print_i64",
        description: "Print one 64-bit integer followed by a newline",
    },
    HostFunctionDef {
        name: "input_int",
        params: &[],
        result: Some(WasmValType::I64),
        import_module: HOST_MODULE_NAME,
        import_name: "input_i64",
        description: "Read one 64-bit integer from the host's input",
    },
];

/// Resolve a source-level callee name. A `None` here is fatal for
/// compilation: there are no user-defined functions to fall back to.
pub fn lookup_host_function(name: &str) -> Option<&'static HostFunctionDef> {
    HOST_FUNCTIONS.iter().find(|def| def.name == name)
}
