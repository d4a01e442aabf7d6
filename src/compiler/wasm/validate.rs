use crate::compiler::compiler_errors::CompileError;
use crate::return_wasm_generation_error;

/// Validates an encoded module with wasmparser before it gets written
/// anywhere.
///
/// The type checkers are supposed to make this impossible to fail: every
/// program they accept should lower and encode to a valid module. A failure
/// here is a codegen bug, so it surfaces as a WasmGeneration error with
/// wasmparser's own message and byte offset attached, which is usually
/// enough to find the broken instruction in the encoder.
pub fn validate_module(wasm_bytes: &[u8]) -> Result<(), CompileError> {
    match wasmparser::validate(wasm_bytes) {
        Ok(_) => Ok(()),
        Err(e) => return_wasm_generation_error!(
            "Generated module failed validation at offset {}: {}",
            e.offset(),
            e.message(),
        ),
    }
}
