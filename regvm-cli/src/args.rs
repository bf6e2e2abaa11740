//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "regvm", version, about = "Deploy, run and inspect regvm contracts")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    #[clap(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Directory holding contract records.
    #[clap(
        long,
        value_name = "DIR",
        global = true,
        env = "REGVM_STORE",
        default_value = "regvm-store"
    )]
    pub store: PathBuf,

    /// Engine configuration (TOML).
    #[clap(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace). Without it, RUST_LOG applies.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "deploy", about = "Validate a bytecode file and store it as a contract")]
    Deploy(DeployArgs),

    #[clap(name = "run", about = "Run a stored contract")]
    Run(RunArgs),

    #[clap(name = "validate", about = "Validate a stored contract")]
    Validate(ValidateArgs),

    #[clap(name = "disassemble", about = "List a stored contract or a bytecode file")]
    Disassemble(DisassembleArgs),
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Address to store the contract under.
    pub address: String,

    /// Raw bytecode file.
    pub bytecode: PathBuf,

    /// Function table entry as NAME:OFFSET. Repeatable; defaults to main:0.
    #[clap(long = "function", short = 'f', value_name = "NAME:OFFSET", value_parser = parse_function)]
    pub functions: Vec<FunctionEntry>,

    #[clap(long, default_value = "")]
    pub owner: String,

    #[clap(long, default_value_t = 0)]
    pub balance: i64,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    pub address: String,

    /// Parameters made available to DATA.
    pub params: Vec<String>,

    /// Start at a named function instead of offset 0.
    #[clap(long, short = 'f')]
    pub function: Option<String>,

    #[clap(long, default_value_t = 10_000)]
    pub gas: u64,

    /// Value sent with the call, reported by DYN.
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    pub amount: i64,

    /// Print the outcome as JSON.
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    pub address: String,

    /// Also apply the strict operand rules.
    #[clap(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct DisassembleArgs {
    #[clap(required_unless_present = "file", conflicts_with = "file")]
    pub address: Option<String>,

    /// Raw bytecode file to list instead of a stored contract.
    #[clap(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// A `NAME:OFFSET` function table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: String,
    pub offset: usize,
}

fn parse_function(s: &str) -> Result<FunctionEntry, String> {
    let (name, offset) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:OFFSET, got '{s}'"))?;
    if name.is_empty() {
        return Err("function name is empty".to_string());
    }
    let offset = offset
        .parse()
        .map_err(|_| format!("invalid offset '{offset}'"))?;
    Ok(FunctionEntry {
        name: name.to_string(),
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_entries() {
        let entry = parse_function("main:0").unwrap();
        assert_eq!((entry.name.as_str(), entry.offset), ("main", 0));
        let entry = parse_function("a:b:12").unwrap();
        assert_eq!((entry.name.as_str(), entry.offset), ("a:b", 12));
        assert!(parse_function("main").is_err());
        assert!(parse_function(":3").is_err());
        assert!(parse_function("main:x").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
