// SPDX-License-Identifier: Apache-2.0

mod apply;
mod error;
mod plan;
mod show;
mod state;

use netrec::NetrecLogLevel;

pub(crate) use self::error::CliError;
use self::{apply::CommandApply, plan::CommandPlan, show::CommandShow};

const DEFAULT_HOST_FILE: &str = "nrt_host.yml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let mut cli_cmd = clap::Command::new("nrt")
        .about("netrec CLI")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .action(clap::ArgAction::SetTrue)
                .help("Disable logging")
                .global(true),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .action(clap::ArgAction::Count)
                .help("Increase verbose level")
                .global(true),
        )
        .arg(
            clap::Arg::new("HOST_FILE")
                .long("host")
                .short('H')
                .default_value(DEFAULT_HOST_FILE)
                .help("YAML file holding network state of simulated host")
                .global(true),
        )
        .subcommand(CommandShow::new_cmd())
        .subcommand(CommandApply::new_cmd())
        .subcommand(CommandPlan::new_cmd());

    let matches = cli_cmd.get_matches_mut();

    if !matches.get_flag("quiet") {
        let log_level: log::LevelFilter = NetrecLogLevel::default()
            .increase(matches.get_count("verbose"))
            .into();
        let mut log_builder = env_logger::Builder::new();
        for log_group in ["netrec", "nrt"] {
            log_builder.filter(Some(log_group), log_level);
        }
        log_builder.init();
    }

    log::info!("nrt version: {}", clap::crate_version!());

    if let Err(e) = call_subcommand(&matches).await {
        eprintln!("{e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn call_subcommand(matches: &clap::ArgMatches) -> Result<(), CliError> {
    let host_file = matches
        .get_one::<String>("HOST_FILE")
        .map(String::as_str)
        .unwrap_or(DEFAULT_HOST_FILE);
    if let Some(matches) = matches.subcommand_matches(CommandShow::CMD) {
        CommandShow::handle(matches, host_file).await
    } else if let Some(matches) = matches.subcommand_matches(CommandApply::CMD)
    {
        CommandApply::handle(matches, host_file).await
    } else if let Some(matches) = matches.subcommand_matches(CommandPlan::CMD)
    {
        CommandPlan::handle(matches, host_file).await
    } else {
        Err(CliError::from("Unknown command"))
    }
}
