#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use anyhow::Result;
use clap::Parser;

mod actions;
mod cli;
mod config;
mod constants;
mod errors;
mod git;
mod graph;
mod resolve;
mod session;
mod subcommands;
mod tool;
mod ui;
mod view;
mod watch;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::parse().run().await
}
