// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use crate::error::EvmDeployResult;

mod deploy;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Deploy a contract if needed and verify it
    #[clap(visible_alias = "d")]
    Deploy(deploy::Args),
}

pub async fn exec(cmd: Command) -> EvmDeployResult {
    match cmd {
        Command::Deploy(args) => deploy::exec(args).await,
    }
}
