use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use uvm::asm::{encode_program, fmt_bytes_hex, parse_document_as, to_ir, SourceFormat};
use uvm::disasm::listing;
use uvm_asm::{ir_lines, ir_listing, load_raw_bin};

#[derive(Parser, Debug)]
#[command(author, version, about = "uvm assembler (JSON/YAML program -> binary) and disassembler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a program document into a binary
    Build {
        /// Program document: {"program": [{"cmd": ..., ...}, ...]} (.yaml/.yml read as YAML)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Output binary path
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        /// Print the IR and the emitted bytes
        #[arg(long)]
        test: bool,
        /// Format of the --test report
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Disassemble a binary
    Dis {
        #[arg(value_name = "BINFILE")]
        input: PathBuf,
        /// Skip N bytes at start of file before decoding
        #[arg(long, default_value_t = 0usize)]
        skip: usize,
        /// Limit bytes decoded (default: to EOF after --skip)
        #[arg(long)]
        len: Option<usize>,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(serde::Serialize)]
struct BuildReport {
    ir: Vec<uvm_asm::IrLine>,
    bytes: Vec<u8>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().cmd {
        Command::Build { input, output, test, format } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let entries = parse_document_as(&text, SourceFormat::from_path(&input))?;
            let ir = to_ir(&entries)?;
            let bin = encode_program(&ir)?;
            fs::write(&output, &bin).with_context(|| format!("writing {}", output.display()))?;
            info!(entries = ir.len(), bytes = bin.len(), "assembled");

            match (test, format) {
                (false, _) => println!("Wrote binary '{}' ({} bytes).", output.display(), bin.len()),
                (true, OutputFormat::Text) => {
                    println!("=== IR ===");
                    for line in ir_listing(&ir)? {
                        println!("{line}");
                    }
                    println!("Wrote binary '{}' ({} bytes).", output.display(), bin.len());
                    println!("Bytes (hex):");
                    println!("{}", fmt_bytes_hex(&bin));
                }
                (true, OutputFormat::Json) => {
                    let report = BuildReport { ir: ir_lines(&ir), bytes: bin };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
        }
        Command::Dis { input, skip, len, show_bytes, out } => {
            let code = load_raw_bin(&input, skip, len)?;
            let text = listing(&code, show_bytes).join("\n");
            match out {
                Some(path) => fs::write(&path, text + "\n")
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{text}"),
            }
        }
    }
    Ok(())
}
