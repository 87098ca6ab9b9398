//! Ohmgrid - DC breadboard solver
//!
//! Reads a board description, solves it and prints every component's
//! voltage drop and current.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug ohmgrid divider.board --max-chain-depth 16
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::info;
use ohmgrid_core::{
    circuit::Circuit,
    components::Component,
    dsl,
    error::Result,
    solver::{DEFAULT_MAX_CHAIN_DEPTH, DEFAULT_PIVOT_TOLERANCE},
    CalculationStatus, Calculator, CalculatorConfig,
};

/// DC breadboard circuit solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the board description file
    #[arg(value_name = "BOARD_FILE")]
    board_file: PathBuf,

    /// Maximum number of voltage sources chained in one supernode
    #[arg(long, default_value_t = DEFAULT_MAX_CHAIN_DEPTH)]
    max_chain_depth: usize,

    /// Relative pivot tolerance for the linear solve
    #[arg(long, default_value_t = DEFAULT_PIVOT_TOLERANCE)]
    pivot_tolerance: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Parse the board file
    let ast = dsl::parse_file(&args.board_file)?;

    // Build the board
    let mut circuit = Circuit::from_ast(ast)?;
    info!(
        "loaded {} with {} components on {} spots",
        args.board_file.display(),
        circuit.components.len(),
        circuit.populated_spots().len()
    );

    let config = CalculatorConfig::new()
        .with_max_chain_depth(args.max_chain_depth)
        .with_pivot_tolerance(args.pivot_tolerance);
    let calculator = Calculator::with_config(config);

    match circuit.recalculate_with(&calculator) {
        CalculationStatus::Solved => {
            print_table(&circuit);
            Ok(())
        }
        CalculationStatus::Incomplete => {
            println!("board is incomplete: every used spot needs at least two connections");
            Ok(())
        }
        CalculationStatus::Failed(e) => Err(e),
    }
}

fn print_table(circuit: &Circuit) {
    println!(
        "{:<12} {:<15} {:>12} {:>14} {:>14}",
        "NAME", "KIND", "VALUE", "DROP (V)", "CURRENT (A)"
    );
    for component in circuit.components.iter() {
        println!(
            "{:<12} {:<15} {:>12} {:>14.6} {:>14.6}",
            component.name,
            component.kind.name(),
            format_value(component),
            component.voltage_drop,
            component.current_through
        );
    }
}

fn format_value(component: &Component) -> String {
    match component.kind.unit() {
        Some(unit) => format!("{} {}", component.value, unit),
        None => "-".to_string(),
    }
}
