//! Tests for deserializing `.ast` documents handed over by the course
//! frontend.

use crate::compiler::ast_loader::{AstDocument, load_ast_file, parse_ast_str};
use crate::compiler::compiler_errors::{ErrorMetaDataKey, ErrorType};
use crate::compiler::{lang_loop, lang_var};
use std::path::Path;

#[cfg(test)]
mod ast_loader_tests {
    use super::*;

    #[test]
    fn test_var_document_parses() {
        let source = r#"{
            "language": "var",
            "body": [
                { "assign": { "target": "x", "value": { "int_const": 5 } } },
                { "exp": { "call": { "name": "print", "args": [{ "name": "x" }] } } }
            ]
        }"#;

        let document = parse_ast_str(source).expect("document should parse");
        let AstDocument::Var(module) = document else {
            panic!("the language tag should pick the var pipeline");
        };

        assert_eq!(
            module.body[0],
            lang_var::ast::Stmt::Assign {
                target: "x".to_string(),
                value: lang_var::ast::Exp::IntConst(5),
            }
        );
        assert_eq!(
            module.body[1],
            lang_var::ast::Stmt::Exp(lang_var::ast::Exp::Call {
                name: "print".to_string(),
                args: vec![lang_var::ast::Exp::Name("x".to_string())],
            })
        );
    }

    #[test]
    fn test_loop_document_parses_with_control_flow() {
        let source = r#"{
            "language": "loop",
            "body": [
                { "assign": { "target": "x", "value": { "int_const": 3 } } },
                { "while": {
                    "cond": { "bin_op": {
                        "op": "less",
                        "left": { "int_const": 0 },
                        "right": { "name": "x" }
                    } },
                    "body": [
                        { "assign": { "target": "x", "value": { "bin_op": {
                            "op": "sub",
                            "left": { "name": "x" },
                            "right": { "int_const": 1 }
                        } } } }
                    ]
                } }
            ]
        }"#;

        let document = parse_ast_str(source).expect("document should parse");
        let AstDocument::Loop(module) = document else {
            panic!("the language tag should pick the loop pipeline");
        };

        let lang_loop::ast::Stmt::While { cond, body } = &module.body[1] else {
            panic!("second statement should be a while loop");
        };
        assert!(matches!(
            cond,
            lang_loop::ast::Exp::BinOp {
                op: lang_loop::ast::BinaryOp::Less,
                ..
            }
        ));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_else_body_defaults_to_empty() {
        let source = r#"{
            "language": "loop",
            "body": [
                { "if": {
                    "cond": { "bool_const": true },
                    "then_body": []
                } }
            ]
        }"#;

        let document = parse_ast_str(source).expect("document should parse");
        let AstDocument::Loop(module) = document else {
            panic!("the language tag should pick the loop pipeline");
        };
        let lang_loop::ast::Stmt::If { else_body, .. } = &module.body[0] else {
            panic!("statement should be an if");
        };
        assert!(else_body.is_empty());
    }

    #[test]
    fn test_var_documents_reject_loop_only_nodes() {
        // The two languages never mix: booleans don't exist in var
        let source = r#"{
            "language": "var",
            "body": [{ "exp": { "bool_const": true } }]
        }"#;

        let error = parse_ast_str(source).expect_err("bool_const is not a var expression");
        assert_eq!(error.error_type, ErrorType::Syntax);
    }

    #[test]
    fn test_unknown_language_tag_is_a_syntax_error() {
        let source = r#"{ "language": "basic", "body": [] }"#;

        let error = parse_ast_str(source).expect_err("unknown language should fail");
        assert_eq!(error.error_type, ErrorType::Syntax);
        assert!(error.msg.contains("Malformed AST document"));
    }

    #[test]
    fn test_malformed_json_is_a_syntax_error() {
        let error = parse_ast_str("{ not json").expect_err("broken JSON should fail");
        assert_eq!(error.error_type, ErrorType::Syntax);
        assert_eq!(
            error.metadata.get(&ErrorMetaDataKey::CompilationStage),
            Some(&"Loading")
        );
    }

    #[test]
    fn test_unknown_operator_keeps_the_serde_detail() {
        let source = r#"{
            "language": "var",
            "body": [{ "exp": { "bin_op": {
                "op": "div",
                "left": { "int_const": 1 },
                "right": { "int_const": 2 }
            } } }]
        }"#;

        let error = parse_ast_str(source).expect_err("div is not an operator");
        assert!(
            error.msg.contains("div"),
            "the serde message should name the bad operator: {}",
            error.msg
        );
    }

    #[test]
    fn test_missing_file_is_a_file_error() {
        let error = load_ast_file(Path::new("/definitely/not/here.ast"))
            .expect_err("missing file should fail");
        assert_eq!(error.error_type, ErrorType::File);
        assert!(error.file.is_some(), "file errors should carry the path");
    }
}
