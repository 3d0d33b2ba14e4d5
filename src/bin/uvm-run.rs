use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use uvm::dump::write_csv;
use uvm::{execute, DumpRange, DumpRow, MachineConfig, Word};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a program binary on the uvm interpreter")]
struct Opts {
    /// Program binary (4-byte little-endian words)
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Write the memory dump to this CSV file (address,value)
    #[arg(value_name = "DUMP_CSV")]
    dump_csv: Option<PathBuf>,
    /// Inclusive dump range, start-end (e.g. 100-220); positional only after DUMP_CSV
    #[arg(value_name = "RANGE")]
    range: Option<DumpRange>,
    /// Inclusive dump range, usable without a CSV path
    #[arg(long = "range", value_name = "RANGE", conflicts_with = "range")]
    range_flag: Option<DumpRange>,
    /// Data memory size in words
    #[arg(long)]
    mem_size: Option<usize>,
    /// Number of registers
    #[arg(long)]
    regs: Option<usize>,
    /// Stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,
    /// Machine configuration (JSON); flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    retired: u64,
    registers: &'a [Word],
    dump: Vec<DumpRow>,
}

fn load_config(opts: &Opts) -> Result<MachineConfig> {
    let mut cfg = match &opts.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => MachineConfig::default(),
    };
    if let Some(n) = opts.regs {
        cfg.register_count = n;
    }
    if let Some(n) = opts.mem_size {
        cfg.memory_size = n;
    }
    if opts.max_steps.is_some() {
        cfg.max_steps = opts.max_steps;
    }
    if let Some(range) = opts.range.or(opts.range_flag) {
        cfg.dump_range = Some(range);
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let cfg = load_config(&opts)?;
    if opts.dump_csv.is_some() && cfg.dump_range.is_none() {
        bail!("a dump range (start-end) is required when writing a dump");
    }
    // Reject a bad range before running anything or creating the CSV.
    if let Some(range) = cfg.dump_range {
        range.validate(cfg.memory_size)?;
    }

    let code = fs::read(&opts.input)
        .with_context(|| format!("reading program {}", opts.input.display()))?;
    let machine = execute(&code, cfg)?;
    info!(retired = machine.cpu.retired, "program executed");

    let rows = match cfg.dump_range {
        Some(range) => machine.dump(range)?,
        None => Vec::new(),
    };
    if let Some(path) = &opts.dump_csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_csv(BufWriter::new(file), &rows)?;
    }

    match opts.format {
        OutputFormat::Text => {
            println!("Program executed ({} instruction(s)).", machine.cpu.retired);
            if let Some(path) = &opts.dump_csv {
                println!("Dump written to {}", path.display());
            } else {
                for row in &rows {
                    println!("{},{}", row.address, row.value);
                }
            }
        }
        OutputFormat::Json => {
            let report = Report {
                retired: machine.cpu.retired,
                registers: machine.registers(),
                dump: rows,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Opts {
        Opts::try_parse_from(std::iter::once("uvm-run").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn range_flag_without_csv_path() {
        let opts = parse(&["prog.bin", "--range", "100-220"]);
        assert_eq!(opts.dump_csv, None);
        let cfg = load_config(&opts).unwrap();
        assert_eq!(cfg.dump_range, Some(DumpRange::new(100, 220)));
    }

    #[test]
    fn positional_range_after_csv_path() {
        let opts = parse(&["prog.bin", "out.csv", "5-7", "--mem-size", "64"]);
        assert_eq!(opts.dump_csv, Some(PathBuf::from("out.csv")));
        let cfg = load_config(&opts).unwrap();
        assert_eq!(cfg.dump_range, Some(DumpRange::new(5, 7)));
        assert_eq!(cfg.memory_size, 64);
    }

    #[test]
    fn both_range_forms_conflict() {
        let args = ["uvm-run", "prog.bin", "out.csv", "1-2", "--range", "3-4"];
        assert!(Opts::try_parse_from(args).is_err());
    }
}
