// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! VMM verification testbench.
//!
//! Draws random conductance matrices and input vectors, programs them through the
//! array engine with every non-ideality disabled, reads them back and compares the
//! result against the golden-model `reference_vmm`. Exits 1 on any mismatch.

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use memsim::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingConfig};
use memsim::prelude::*;
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

const G_ON: f64 = 1e-4;
const G_OFF: f64 = 1e-3;

struct Args {
    cases: usize,
    seed: u64,
    max_dim: usize,
    batch: usize,
    tolerance: f64,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: verify_vmm [--cases <n>] [--seed <n>] [--max-dim <n>] [--batch <n>] [--tolerance <amps>]\n\n\
         Defaults:\n\
         - cases: 100\n\
         - seed: 2024\n\
         - max-dim: 16\n\
         - batch: 2\n\
         - tolerance: 1e-12\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> T {
    let value = value.unwrap_or_else(|| usage_and_exit());
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid value for {flag}: {value}");
        usage_and_exit();
    })
}

fn parse_args() -> Args {
    let mut parsed = Args {
        cases: 100,
        seed: 2024,
        max_dim: 16,
        batch: 2,
        tolerance: 1e-12,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--cases" => parsed.cases = parse_value(&arg, args.next()),
            "--seed" => parsed.seed = parse_value(&arg, args.next()),
            "--max-dim" => parsed.max_dim = parse_value(&arg, args.next()),
            "--batch" => parsed.batch = parse_value(&arg, args.next()),
            "--tolerance" => parsed.tolerance = parse_value(&arg, args.next()),
            "-h" | "--help" => usage_and_exit(),
            // Handled by parse_debug_flags
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    if parsed.max_dim == 0 || parsed.batch == 0 {
        eprintln!("--max-dim and --batch must be positive");
        usage_and_exit();
    }
    parsed
}

/// Program random targets, read a random input, return the worst absolute error
fn run_case(index: usize, args: &Args, rng: &mut StdRng) -> Result<f64> {
    let rows = rng.gen_range(1..=args.max_dim);
    let cols = rng.gen_range(1..=args.max_dim);
    let profile = Arc::new(DeviceProfile::ideal(G_ON, G_OFF));

    let mut array = MemristorArray::configure(
        args.batch,
        ArrayShape::new(rows, cols)?,
        profile.clone(),
        NonIdealities::ideal(),
        Some(args.seed.wrapping_add(index as u64)),
    )
    .with_context(|| format!("case {index}: configure {rows}x{cols}"))?;

    // The ideal device moves by exactly (v - 1) from the off state
    let targets = Array3::from_shape_fn((args.batch, rows, cols), |_| rng.gen_range(0.0..=1.0));
    let write_voltage = targets.mapv(|x| 1.0 + x);
    array
        .write_at(write_voltage.view(), 1.0)
        .with_context(|| format!("case {index}: program"))?;

    let input = Array3::from_shape_fn((args.batch, 1, rows), |_| {
        rng.gen_range(profile.v_on..=profile.v_off)
    });
    let modeled = array
        .read(input.view())
        .with_context(|| format!("case {index}: read"))?;

    let golden = targets.mapv(|x| profile.conductance_at(x));
    let reference = reference_vmm(input.view(), golden.view())?;
    let errors = compare(reference.view(), modeled.view(), args.tolerance)
        .with_context(|| format!("case {index}: {rows}x{cols} exceeds tolerance"))?;

    let worst = errors.iter().fold(0.0_f64, |acc, e| acc.max(e.abs()));
    info!(case = index, rows, cols, worst_error = worst, "VMM case passed");
    Ok(worst)
}

fn main() {
    let args = parse_args();
    let debug_flags = parse_debug_flags();
    let _logging = match init_logging(&debug_flags, &LoggingConfig::default()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            process::exit(2);
        }
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut failures = 0usize;
    let mut worst = 0.0_f64;

    for index in 0..args.cases {
        match run_case(index, &args, &mut rng) {
            Ok(error) => worst = worst.max(error),
            Err(e) => {
                failures += 1;
                error!("{e:#}");
            }
        }
    }

    info!(
        cases = args.cases,
        failures,
        worst_error = worst,
        tolerance = args.tolerance,
        "VMM verification finished"
    );
    if failures > 0 {
        process::exit(1);
    }
}
