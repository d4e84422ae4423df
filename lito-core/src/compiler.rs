use std::fs;
use std::path::Path;

use crate::emitter::Emitter;
use crate::error::CoreError;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Result of one translation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationArtifact {
    pub c_source: String,
}

impl CompilationArtifact {
    /// Commits the generated source to disk in a single write.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        fs::write(path, &self.c_source)?;
        Ok(())
    }
}

/// Translates a Lito program into a standalone C source file.
pub fn compile_c(source: &str) -> Result<CompilationArtifact, CoreError> {
    let parser = Parser::new(Lexer::new(source), Emitter::new())?;
    let c_source = parser.translate()?;
    Ok(CompilationArtifact { c_source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    fn compile(source: &str) -> String {
        compile_c(source).expect("compile should succeed").c_source
    }

    #[test]
    fn opens_a_main_wrapper_in_the_header() {
        let code = compile("print \"hi\"\n");
        assert!(code.starts_with("#include <stdio.h>\nint main(void){\n"));
        assert!(code.ends_with("return 0;\n}\n"));
    }

    #[test]
    fn translates_assignment_and_print() {
        let code = compile("let x = 5\nprint x\n");
        assert_eq!(code.matches("float x;").count(), 1);
        assert!(code.contains("x = 5;"));
        assert!(code.contains("printf(\"%f\", (float)(x));"));
        // The declaration lands in the header, before any body code.
        assert!(code.find("float x;").expect("decl") < code.find("x = 5;").expect("assign"));
    }

    #[test]
    fn does_not_duplicate_declarations() {
        let code = compile("let x = 5\nlet x = 6\ninput x\n");
        assert_eq!(code.matches("float x;").count(), 1);
    }

    #[test]
    fn declares_variables_in_first_seen_order() {
        let code = compile("let b = 1\nlet a = 2\n");
        assert!(code.find("float b;").expect("b") < code.find("float a;").expect("a"));
    }

    #[test]
    fn emits_if_else_branches() {
        let code = compile("let x = 1\nif x == 1 {\nprint \"yes\"\n} else {\nprint \"no\"\n}\n");
        assert!(code.contains("if(x == 1){"));
        assert!(code.contains("} else {"));
        assert_eq!(code.matches("printf").count(), 2);
    }

    #[test]
    fn chains_else_if_without_extra_nesting() {
        let code = compile(
            "let x = 3\nif x == 1 {\nprint 1\n} else if x == 2 {\nprint 2\n} else {\nprint 3\n}\n",
        );
        assert!(code.contains("} else if(x == 2){"));
        assert_eq!(code.matches("{\n").count(), code.matches("}").count());
    }

    #[test]
    fn emits_while_loop() {
        let code = compile("let i = 0\nwhile i < 10 {\nlet i = i + 1\n}\n");
        assert!(code.contains("while(i < 10){"));
        assert!(code.contains("i = i + 1;"));
    }

    #[test]
    fn casts_modulo_operands_to_int() {
        let code = compile("let y = 7 % 2\n");
        assert!(code.contains("y = (int)(7) % (int)(2);"));
    }

    #[test]
    fn modulo_casts_cover_the_accumulated_left_operand() {
        let code = compile("let y = 2 * 3 % 4\n");
        assert!(code.contains("y = (int)(2 * 3) % (int)(4);"));
    }

    #[test]
    fn print_takes_a_mixed_run_of_fragments() {
        let code = compile("let x = 2\nprint \"x is \" x \"!\"\n");
        assert!(code.contains("printf(\"x is \");"));
        assert!(code.contains("printf(\"%f\", (float)(x));"));
        assert!(code.contains("printf(\"!\");"));
    }

    #[test]
    fn input_declares_and_reads_each_identifier() {
        let code = compile("input a b\n");
        assert!(code.contains("float a;"));
        assert!(code.contains("float b;"));
        assert!(code.contains("scanf(\"%f\", &a);"));
        assert!(code.contains("scanf(\"%f\", &b);"));
    }

    #[test]
    fn emits_unary_sign() {
        let code = compile("let x = -5\n");
        assert!(code.contains("x = -5;"));
    }

    #[test]
    fn top_level_return_suppresses_the_default() {
        let code = compile("return 1\n");
        assert!(code.contains("return 1;"));
        assert!(!code.contains("return 0;"));
    }

    #[test]
    fn return_inside_a_block_keeps_the_default() {
        let code = compile("let x = 1\nif x == 1 {\nreturn 2\n}\n");
        assert!(code.contains("return 2;"));
        assert!(code.contains("return 0;"));
    }

    #[test]
    fn accepts_source_without_trailing_newline() {
        let code = compile("let x = 5");
        assert!(code.contains("x = 5;"));
    }

    #[test]
    fn reports_undefined_variable() {
        let err = compile_c("let x = y + 1\n").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Parse(ParseError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn reports_lexical_errors() {
        let err = compile_c("let x = 3.\n").unwrap_err();
        assert!(matches!(err, CoreError::Parse(ParseError::Lex(_))));
    }

    #[test]
    fn writes_artifact_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.c");
        let artifact = compile_c("print \"hi\"\n").expect("compile should succeed");
        artifact.write_to(&path).expect("write");
        let written = fs::read_to_string(&path).expect("read back");
        assert_eq!(written, artifact.c_source);
    }
}
