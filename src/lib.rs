pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod interview;
pub mod router;
pub mod session;

use anyhow::Result;

pub fn run() -> Result<()> {
    cli::run()
}
