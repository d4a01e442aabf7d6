use crate::compiler::wasm::instructions::WasmInstr;
use crate::compiler::wasm::module::{WasmFunc, WasmImport, WasmImportDesc, WasmModule};

/// Renders a module in the WebAssembly text format.
///
/// The module shell uses s-expressions and instruction bodies use the
/// linear form, which is what wat2wasm round-trips to and the easiest
/// thing to read next to a stack trace. Symbolic `$` names are kept so
/// the text lines up with the instruction IR in debug dumps.
pub fn render_module(module: &WasmModule) -> String {
    let mut out = String::new();
    out.push_str("(module\n");

    for import in &module.imports {
        render_import(&mut out, import);
    }

    for export in &module.exports {
        out.push_str(&format!(
            "  (export \"{}\" (func {}))\n",
            export.name, export.func
        ));
    }

    for global in &module.globals {
        let mutability = if global.mutable {
            format!("(mut {})", global.ty)
        } else {
            global.ty.to_string()
        };
        out.push_str(&format!(
            "  (global {} {} ({}.const {}))\n",
            global.id, mutability, global.ty, global.init
        ));
    }

    for data in &module.data {
        out.push_str(&format!(
            "  (data (i32.const {}) \"{}\")\n",
            data.offset,
            escape_data(&data.bytes)
        ));
    }

    if !module.func_table.is_empty() {
        out.push_str(&format!(
            "  (table funcref (elem {}))\n",
            module
                .func_table
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }

    for func in &module.funcs {
        render_func(&mut out, func);
    }

    out.push_str(")\n");
    out
}

fn render_import(out: &mut String, import: &WasmImport) {
    match &import.desc {
        WasmImportDesc::Func { id, params, result } => {
            let mut sig = String::new();
            for param in params {
                sig.push_str(&format!(" (param {param})"));
            }
            if let Some(result) = result {
                sig.push_str(&format!(" (result {result})"));
            }
            out.push_str(&format!(
                "  (import \"{}\" \"{}\" (func {}{}))\n",
                import.module, import.name, id, sig
            ));
        }
        WasmImportDesc::Memory { min_pages } => {
            out.push_str(&format!(
                "  (import \"{}\" \"{}\" (memory {}))\n",
                import.module, import.name, min_pages
            ));
        }
    }
}

fn render_func(out: &mut String, func: &WasmFunc) {
    out.push_str(&format!("  (func {}", func.id));
    for (id, ty) in &func.params {
        out.push_str(&format!(" (param {id} {ty})"));
    }
    if let Some(result) = &func.result {
        out.push_str(&format!(" (result {result})"));
    }
    out.push('\n');

    for (id, ty) in &func.locals {
        out.push_str(&format!("    (local {id} {ty})\n"));
    }

    render_instrs(out, &func.body, 2);
    out.push_str("  )\n");
}

fn render_instrs(out: &mut String, instrs: &[WasmInstr], depth: usize) {
    for instr in instrs {
        let indent = "  ".repeat(depth);
        match instr {
            WasmInstr::Const(ty, value) => {
                out.push_str(&format!("{indent}{ty}.const {value}\n"));
            }
            WasmInstr::LocalGet(id) => {
                out.push_str(&format!("{indent}local.get {id}\n"));
            }
            WasmInstr::LocalSet(id) => {
                out.push_str(&format!("{indent}local.set {id}\n"));
            }
            WasmInstr::NumBinOp(ty, op) => {
                out.push_str(&format!("{indent}{ty}.{op}\n"));
            }
            WasmInstr::IntRelOp(ty, op) => {
                out.push_str(&format!("{indent}{ty}.{op}\n"));
            }
            WasmInstr::If {
                result,
                then_body,
                else_body,
            } => {
                match result {
                    Some(ty) => out.push_str(&format!("{indent}if (result {ty})\n")),
                    None => out.push_str(&format!("{indent}if\n")),
                }
                render_instrs(out, then_body, depth + 1);
                if !else_body.is_empty() {
                    out.push_str(&format!("{indent}else\n"));
                    render_instrs(out, else_body, depth + 1);
                }
                out.push_str(&format!("{indent}end\n"));
            }
            WasmInstr::Block {
                label,
                result,
                body,
            } => {
                match result {
                    Some(ty) => out.push_str(&format!("{indent}block {label} (result {ty})\n")),
                    None => out.push_str(&format!("{indent}block {label}\n")),
                }
                render_instrs(out, body, depth + 1);
                out.push_str(&format!("{indent}end\n"));
            }
            WasmInstr::Loop { label, body } => {
                out.push_str(&format!("{indent}loop {label}\n"));
                render_instrs(out, body, depth + 1);
                out.push_str(&format!("{indent}end\n"));
            }
            WasmInstr::Branch {
                target,
                conditional,
            } => {
                let op = if *conditional { "br_if" } else { "br" };
                out.push_str(&format!("{indent}{op} {target}\n"));
            }
            WasmInstr::Call(id) => {
                out.push_str(&format!("{indent}call {id}\n"));
            }
        }
    }
}

fn escape_data(bytes: &[u8]) -> String {
    let mut escaped = String::new();
    for byte in bytes {
        match byte {
            b'"' => escaped.push_str("\\\""),
            b'\\' => escaped.push_str("\\\\"),
            0x20..=0x7e => escaped.push(*byte as char),
            _ => escaped.push_str(&format!("\\{byte:02x}")),
        }
    }
    escaped
}
