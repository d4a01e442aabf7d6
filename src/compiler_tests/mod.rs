// Test modules for the sapling compiler

#[cfg(test)]
pub mod test_support;

// Per-language frontend and lowering tests
#[cfg(test)]
pub mod lang_var_tests;


// Document loading, binary encoding and text format tests
#[cfg(test)]
pub mod ast_loader_tests;
