use codepulse_core::replay::TxLog;
use codepulse_core::tx::{Receipt, Value};
use std::env;
use std::fs;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

fn usage() {
    eprintln!("usage: codepulse-replay --log <tx-log.json> [--snapshot] [--quiet]");
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut log_path: Option<String> = None;
    let mut print_snapshot = false;
    let mut quiet = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log" => log_path = args.next(),
            "--snapshot" => print_snapshot = true,
            "--quiet" => quiet = true,
            "-h" | "--help" => {
                usage();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("unknown arg {}", arg);
                usage();
                return ExitCode::from(2);
            }
        }
    }

    match run(log_path, print_snapshot, quiet) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(log_path: Option<String>, print_snapshot: bool, quiet: bool) -> Result<(), String> {
    let log_path = log_path.ok_or("missing --log")?;
    let data = fs::read_to_string(&log_path).map_err(|e| format!("{}: {}", log_path, e))?;
    let log = TxLog::from_json(&data)?;

    let outcome = log.replay();

    if !quiet {
        for step in &outcome.steps {
            let tx = &log.transactions[step.index];
            let result = match &step.receipt {
                Receipt::Ok {
                    value: Value::Uint(v),
                } => format!("ok u{}", v),
                Receipt::Ok {
                    value: Value::Bool(b),
                } => format!("ok {}", b),
                Receipt::Err { code, message, .. } => format!("err u{} ({})", code, message),
            };
            println!(
                "{:>4} {} {:<18} {} root={}",
                step.index,
                &hex::encode(step.tx_hash)[..16],
                tx.call.op_name(),
                result,
                &hex::encode(step.state_root)[..16],
            );
        }
    }

    println!("state_root {}", hex::encode(outcome.final_root()));

    if print_snapshot {
        let json = serde_json::to_string_pretty(&outcome.ledger.snapshot())
            .map_err(|e| format!("{}", e))?;
        println!("{}", json);
    }
    Ok(())
}
