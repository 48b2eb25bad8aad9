//! File-level orchestration around the compiler core: read the source,
//! drive the parser, then write (or truncate) the two output artifacts
//! depending on whether semantic analysis aborted (§4.7/§7).
//!
//! Collapsed from the teacher driver's nine-phase pipeline down to the
//! single lex→parse→analyze pass this core performs; there is no
//! codegen/link stage to orchestrate.

use std::path::{Path, PathBuf};

use quadc_par::Parser;
use quadc_sem::Compiler;
use tracing::{debug, info};

use crate::error::{QuadcError, Result};

/// `<base>.sym` / `<base>.quad`, derived by stripping the input's extension.
fn output_paths(input: &Path) -> Result<(PathBuf, PathBuf)> {
    if input.file_name().is_none() {
        return Err(QuadcError::NoFileName(input.to_path_buf()));
    }
    let base = input.with_extension("");
    Ok((base.with_extension("sym"), base.with_extension("quad")))
}

/// Compiles `input`, writing its symbol-table log and quad IR next to it.
///
/// Returns `Ok(true)` on success, `Ok(false)` if a fatal semantic error
/// aborted analysis (both artifacts are truncated in that case, per
/// §4.7). IO failures surface as `Err`.
pub fn compile_file(input: &Path) -> Result<bool> {
    let (sym_path, quad_path) = output_paths(input)?;

    info!(path = %input.display(), "reading source");
    let source = std::fs::read_to_string(input)
        .map_err(|source| QuadcError::ReadInput { path: input.to_path_buf(), source })?;

    let mut compiler = Compiler::new();
    debug!("parsing and analyzing");
    Parser::new(&source, &mut compiler).parse_program();

    let aborted = compiler.aborted();
    let (sym_log, quad_log) = compiler.take_outputs();

    let (sym_text, quad_text) = if aborted {
        info!("semantic analysis aborted; truncating artifacts");
        (String::new(), String::new())
    } else {
        (sym_log, quad_log)
    };

    std::fs::write(&sym_path, sym_text)
        .map_err(|source| QuadcError::WriteOutput { path: sym_path.clone(), source })?;
    std::fs::write(&quad_path, quad_text)
        .map_err(|source| QuadcError::WriteOutput { path: quad_path, source })?;

    Ok(!aborted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn output_paths_strip_extension() {
        let (sym, quad) = output_paths(Path::new("/tmp/prog.qd")).unwrap();
        assert_eq!(sym, Path::new("/tmp/prog.sym"));
        assert_eq!(quad, Path::new("/tmp/prog.quad"));
    }

    #[test]
    fn successful_compile_writes_nonempty_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), "prog.qd", "const int x := 3 + 4;\n");

        let ok = compile_file(&input).unwrap();
        assert!(ok);

        let sym = std::fs::read_to_string(dir.path().join("prog.sym")).unwrap();
        let quad = std::fs::read_to_string(dir.path().join("prog.quad")).unwrap();
        assert!(sym.contains("Id. Name"));
        assert!(!quad.is_empty());
    }

    #[test]
    fn fatal_error_truncates_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(
            dir.path(),
            "prog.qd",
            "func f(int x, int y) : int begin return x + y; end f(1, 2, 3);\n",
        );

        let ok = compile_file(&input).unwrap();
        assert!(!ok);

        let sym = std::fs::read_to_string(dir.path().join("prog.sym")).unwrap();
        let quad = std::fs::read_to_string(dir.path().join("prog.quad")).unwrap();
        assert!(sym.is_empty());
        assert!(quad.is_empty());
    }

    #[test]
    fn missing_file_name_is_rejected() {
        let err = output_paths(Path::new("/")).unwrap_err();
        assert!(matches!(err, QuadcError::NoFileName(_)));
    }
}
