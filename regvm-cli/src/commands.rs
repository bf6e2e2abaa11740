//! CLI command implementations.
//!
//! Each command returns `Err(exit_code)` after printing its own diagnostics.

use crate::args::{DeployArgs, DisassembleArgs, GlobalArgs, RunArgs, ValidateArgs};
use regvm_common::ContractRecord;
use regvm_validator::{validate_with, OperandRules, PermissiveRules, StrictRules};
use regvm_vm::{ContractStore, Engine, EngineError, FileStore, MemoryHost, VmConfig};
use std::fs;
use tracing::info;

type CliEngine = Engine<FileStore, MemoryHost>;

/// Validate a bytecode file and store it as a contract.
pub fn deploy(global: &GlobalArgs, args: &DeployArgs) -> Result<(), i32> {
    let bytecode = fs::read(&args.bytecode).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", args.bytecode.display());
        1
    })?;

    let mut record = ContractRecord::new(bytecode, args.owner.clone()).with_balance(args.balance);
    if args.functions.is_empty() {
        record = record.with_function("main", 0);
    }
    for f in &args.functions {
        record = record.with_function(f.name.clone(), f.offset);
    }

    let mut engine = open_engine(global)?;
    engine
        .deploy(&args.address, &record)
        .map_err(report_engine_error)?;

    println!(
        "deployed {} ({} bytes, {} function(s))",
        args.address,
        record.byte_code_len,
        record.functions.len()
    );
    Ok(())
}

/// Run a stored contract and print its outcome.
pub fn run(global: &GlobalArgs, args: &RunArgs) -> Result<(), i32> {
    let mut engine = open_engine(global)?;
    let outcome = match &args.function {
        Some(name) => engine.run_function(&args.address, name, &args.params, args.amount, args.gas),
        None => engine.run(&args.address, &args.params, args.amount, args.gas),
    }
    .map_err(report_engine_error)?;

    info!(address = %args.address, result = %outcome.result, "run complete");

    engine.store().save_ledger(engine.host()).map_err(|e| {
        eprintln!("error: cannot save ledger: {e}");
        1
    })?;

    if args.json {
        let json = serde_json::to_string(&outcome).map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;
        println!("{json}");
    } else {
        println!("result: {}", outcome.result);
        println!("gas_used: {}", outcome.gas_used);
        println!("gas_remaining: {}", outcome.gas_remaining);
        println!("steps: {}", outcome.steps);
        println!("pc: {}", outcome.pc);
        println!("persisted: {}", outcome.persisted);
    }

    if outcome.result.is_ok() {
        Ok(())
    } else {
        Err(3)
    }
}

/// Validate a stored contract.
pub fn validate(global: &GlobalArgs, args: &ValidateArgs) -> Result<(), i32> {
    let store = open_store(global)?;
    let record = store.load(&args.address).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let rules: &dyn OperandRules = if args.strict {
        &StrictRules
    } else {
        &PermissiveRules
    };
    match validate_with(&record, rules) {
        Ok(()) => {
            println!(
                "OK: {} ({} bytes, {} function(s))",
                args.address,
                record.code().len(),
                record.functions.len()
            );
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("error: {e}");
            }
            Err(2)
        }
    }
}

/// Print a listing of a stored contract or a raw bytecode file.
pub fn disassemble(global: &GlobalArgs, args: &DisassembleArgs) -> Result<(), i32> {
    let text = match (&args.file, &args.address) {
        (Some(path), _) => {
            let code = fs::read(path).map_err(|e| {
                eprintln!("error: cannot read '{}': {e}", path.display());
                1
            })?;
            regvm_disassembler::disassemble(&code)
        }
        (None, Some(address)) => {
            let record = open_store(global)?.load(address).map_err(|e| {
                eprintln!("error: {e}");
                1
            })?;
            regvm_disassembler::disassemble_record(&record)
        }
        (None, None) => {
            eprintln!("error: disassemble needs an address or --file");
            return Err(1);
        }
    };
    print!("{text}");
    Ok(())
}

fn open_store(global: &GlobalArgs) -> Result<FileStore, i32> {
    FileStore::open(&global.store).map_err(|e| {
        eprintln!("error: cannot open store '{}': {e}", global.store.display());
        1
    })
}

fn open_engine(global: &GlobalArgs) -> Result<CliEngine, i32> {
    let config = match &global.config {
        Some(path) => VmConfig::load(path).map_err(|e| {
            eprintln!("error: {}: {e}", path.display());
            1
        })?,
        None => VmConfig::default(),
    };
    let store = open_store(global)?;
    let ledger = store.load_ledger().map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    Engine::with_config(store, ledger, config).map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}

/// Print an engine error and pick its exit code.
fn report_engine_error(err: EngineError) -> i32 {
    match err {
        EngineError::Validation(errors) => {
            eprintln!("error: contract failed validation");
            for e in &errors {
                eprintln!("error: {e}");
            }
            2
        }
        other => {
            eprintln!("error: {other}");
            1
        }
    }
}
