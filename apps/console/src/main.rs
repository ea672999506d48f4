//! # Balcão Console Entry Point
//!
//! The actual setup is in lib.rs.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    balcao_console::run().await
}
