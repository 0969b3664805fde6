use self::{
    args::{ToolArgs, ToolSubcommand},
    config::Configuration,
};
use clap::Parser;

mod args;
mod config;
mod logging;
mod parse_header;
mod sign;
mod util;
mod verify;

fn report(err: eyre::Report) -> miette::Report {
    miette::miette!("{err:?}")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let args = ToolArgs::parse();
    logging::initialise().map_err(report)?;

    let config = match args.config {
        Some(ref path) => Configuration::load(path).await.map_err(report)?,
        None => Configuration::default(),
    };

    match args.subcommand {
        ToolSubcommand::ParseHeader(args) => parse_header::do_it(args.header),
        ToolSubcommand::Sign(args) => sign::do_it(args, &config).await,
        ToolSubcommand::Verify(args) => verify::do_it(args, &config).await,
    }
}
