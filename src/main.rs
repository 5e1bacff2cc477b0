//! # Toy Compiler (toyc) Executable
//!
//! The main entry point for the Toy compiler's command-line interface. It
//! uses the `clap` crate to parse a source path and an output path, then
//! runs the full pipeline and writes the generated NASM assembly.

use clap::{Arg, Command};
use std::path::PathBuf;
use std::process;
use toyc::debug;

fn main() {
    let matches = Command::new("toyc")
        .version("0.1.0")
        .about("Toy language compiler: lowers Toy source to x86-64 NASM assembly")
        .arg(
            Arg::new("source")
                .required(true)
                .value_name("SOURCE")
                .help("Toy source file to compile"),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .value_name("OUTPUT")
                .help("Path to write the generated NASM assembly"),
        )
        .get_matches();

    let source_path = PathBuf::from(matches.get_one::<String>("source").unwrap());
    let output_path = PathBuf::from(matches.get_one::<String>("output").unwrap());

    if let Err(message) = run(&source_path, &output_path) {
        eprintln!("toyc: {message}");
        process::exit(1);
    }
}

fn run(source_path: &PathBuf, output_path: &PathBuf) -> Result<(), String> {
    if debug::is_debug_enabled() {
        eprintln!("🔍 DRIVER: reading {source_path:?}");
    }

    let source = std::fs::read_to_string(source_path)
        .map_err(|e| format!("could not read {source_path:?}: {e}"))?;

    let asm = toyc::compile_to_asm(&source).map_err(|e| e.to_string())?;

    std::fs::write(output_path, asm).map_err(|e| format!("could not write {output_path:?}: {e}"))?;

    if debug::is_debug_enabled() {
        eprintln!("🔍 DRIVER: wrote {output_path:?}");
    }
    Ok(())
}
