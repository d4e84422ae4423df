use std::fs;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lito_core::compile_c;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, help = "Lito source file (stdin when omitted)")]
    input: Option<PathBuf>,

    #[arg(short, long, help = "Output path (derived from the input name by default)")]
    output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "bin",
        help = "Output format: bin (build an executable), c (generated C source only)"
    )]
    emit: String,

    #[arg(short, long, help = "Keep the intermediate C file next to the output")]
    debug: bool,

    #[arg(
        long,
        value_name = "NAME",
        default_value = "gcc",
        help = "C compiler used to build the executable"
    )]
    cc: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let source = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let artifact = compile_c(&source)?;

    match cli.emit.as_str() {
        "c" => {
            let output = output_path(&cli, "out.c", |input| input.with_extension("c"));
            prepare_parent(&output)?;
            artifact
                .write_to(&output)
                .with_context(|| format!("failed to write output file {}", output.display()))?;
        }
        "bin" => {
            let output = output_path(&cli, "a.out", |input| input.with_extension(""));
            prepare_parent(&output)?;
            build_executable(&cli, &artifact.c_source, &output)?;
        }
        other => bail!("unsupported emit format: {other}"),
    }

    Ok(())
}

fn output_path(cli: &Cli, stdin_default: &str, derive: impl Fn(PathBuf) -> PathBuf) -> PathBuf {
    match (&cli.output, &cli.input) {
        (Some(output), _) => output.clone(),
        (None, Some(input)) => derive(input.clone()),
        (None, None) => PathBuf::from(stdin_default),
    }
}

fn prepare_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Writes the intermediate C file and hands it to the external C
/// compiler. Without `--debug` the intermediate lives in the system
/// temp directory and is removed once the build finishes.
fn build_executable(cli: &Cli, c_source: &str, output: &Path) -> Result<()> {
    if cli.debug {
        let c_path = output.with_extension("c");
        fs::write(&c_path, c_source)
            .with_context(|| format!("failed to write intermediate file {}", c_path.display()))?;
        run_cc(&cli.cc, &c_path, output)
    } else {
        let c_file = tempfile::Builder::new()
            .suffix(".c")
            .tempfile()
            .context("failed to create temporary file")?;
        fs::write(c_file.path(), c_source).context("failed to write intermediate file")?;
        run_cc(&cli.cc, c_file.path(), output)
    }
}

fn run_cc(cc: &str, c_path: &Path, output: &Path) -> Result<()> {
    let result = Command::new(cc).arg(c_path).arg("-o").arg(output).output();

    let built = match result {
        Err(err) if err.kind() == ErrorKind::NotFound => {
            bail!("C compiler `{cc}` was not found; install it or pass --cc");
        }
        other => other.with_context(|| format!("failed to run {cc}"))?,
    };

    if !built.status.success() {
        bail!(
            "{cc} exited with {}:\n{}",
            built.status,
            String::from_utf8_lossy(&built.stderr)
        );
    }
    Ok(())
}
