//! # Tillbook Entry Point
//!
//! ```bash
//! tillbook                      # platform config file
//! tillbook --config ./shop.toml # explicit config file
//! ```
//!
//! The actual setup is in lib.rs.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: tillbook [--config <PATH>]");
                return ExitCode::SUCCESS;
            }
            _ => {}
        }
        i += 1;
    }

    match tillbook::run(config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tillbook: {}", e);
            ExitCode::FAILURE
        }
    }
}
