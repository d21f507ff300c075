// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use netrec::{NetrecApplyOption, NetrecEngine, Operation};
use tokio_util::sync::CancellationToken;

use super::{
    state::{load_host, save_host, state_from_file},
    CliError,
};

pub(crate) struct CommandApply;

impl CommandApply {
    pub(crate) const CMD: &str = "apply";

    pub(crate) fn new_cmd() -> clap::Command {
        clap::Command::new("apply")
            .alias("a")
            .about("Apply network state")
            .arg(
                clap::Arg::new("STATE_FILE")
                    .required(false)
                    .index(1)
                    .default_value("-")
                    .help("Network state file, `-` for stdin"),
            )
            .arg(
                clap::Arg::new("NO_VERIFY")
                    .long("no-verify")
                    .action(clap::ArgAction::SetTrue)
                    .help(
                        "Do not verify that the state was completely set, \
                         changes are only rolled back on failure of backend.",
                    ),
            )
            .arg(
                clap::Arg::new("COMMIT_TIMEOUT")
                    .long("commit-timeout")
                    .short('t')
                    .value_parser(clap::value_parser!(u64))
                    .help("Checkpoint lease in milliseconds"),
            )
            .arg(
                clap::Arg::new("APPLY_TIMEOUT")
                    .long("apply-timeout")
                    .value_parser(clap::value_parser!(u64))
                    .help("Roll back if not finished in milliseconds"),
            )
            .arg(
                clap::Arg::new("CONFIG")
                    .long("config")
                    .short('c')
                    .help("YAML file holding apply options"),
            )
    }

    pub(crate) async fn handle(
        matches: &clap::ArgMatches,
        host_file: &str,
    ) -> Result<(), CliError> {
        let opt = apply_option_from_args(matches).await?;
        let desired_state = state_from_file(
            matches
                .get_one::<String>("STATE_FILE")
                .map(String::as_str)
                .unwrap_or("-"),
        )?;

        let backend = load_host(host_file).await?;
        let engine = NetrecEngine::new(backend.clone());

        let token = CancellationToken::new();
        let ctrl_c_token = token.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, cancelling");
                ctrl_c_token.cancel();
            }
        });
        let result = engine
            .apply_with_cancel(&desired_state, &opt, token)
            .await;
        ctrl_c.abort();

        // Failed apply is rolled back, the host file still reflects the
        // post-rollback state.
        save_host(&backend, host_file).await?;
        print_operations(&result?)
    }
}

async fn apply_option_from_args(
    matches: &clap::ArgMatches,
) -> Result<NetrecApplyOption, CliError> {
    let mut opt = if let Some(path) = matches.get_one::<String>("CONFIG") {
        let content = tokio::fs::read_to_string(path).await?;
        serde_yaml::from_str::<NetrecApplyOption>(&content)?
    } else {
        NetrecApplyOption::new()
    };
    if matches.get_flag("NO_VERIFY") {
        opt = opt.no_verify(true);
    }
    if let Some(ms) = matches.get_one::<u64>("COMMIT_TIMEOUT") {
        opt = opt.commit_timeout(Duration::from_millis(*ms));
    }
    if let Some(ms) = matches.get_one::<u64>("APPLY_TIMEOUT") {
        opt = opt.apply_timeout(Duration::from_millis(*ms));
    }
    log::debug!("Apply option: {opt}");
    Ok(opt)
}

fn print_operations(ops: &[Operation]) -> Result<(), CliError> {
    if ops.is_empty() {
        println!("Nothing changed");
    } else {
        println!("Applied operations:\n---\n{}", serde_yaml::to_string(ops)?);
    }
    Ok(())
}
