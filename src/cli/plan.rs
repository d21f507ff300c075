// SPDX-License-Identifier: Apache-2.0

use netrec::NetrecEngine;

use super::{
    state::{load_host, state_from_file},
    CliError,
};

pub(crate) struct CommandPlan;

impl CommandPlan {
    pub(crate) const CMD: &str = "plan";

    pub(crate) fn new_cmd() -> clap::Command {
        clap::Command::new("plan")
            .alias("p")
            .about("Show operations required without changing anything")
            .arg(
                clap::Arg::new("STATE_FILE")
                    .required(false)
                    .index(1)
                    .default_value("-")
                    .help("Network state file, `-` for stdin"),
            )
            .arg(
                clap::Arg::new("BRIEF")
                    .long("brief")
                    .short('b')
                    .action(clap::ArgAction::SetTrue)
                    .help("One line per operation"),
            )
    }

    pub(crate) async fn handle(
        matches: &clap::ArgMatches,
        host_file: &str,
    ) -> Result<(), CliError> {
        let desired_state = state_from_file(
            matches
                .get_one::<String>("STATE_FILE")
                .map(String::as_str)
                .unwrap_or("-"),
        )?;
        let engine = NetrecEngine::new(load_host(host_file).await?);
        let ops = engine.plan(&desired_state).await?;

        if ops.is_empty() {
            println!("Nothing to change");
        } else if matches.get_flag("BRIEF") {
            for op in ops {
                println!("{op}");
            }
        } else {
            print!("{}", serde_yaml::to_string(&ops)?);
        }
        Ok(())
    }
}
