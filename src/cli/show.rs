// SPDX-License-Identifier: Apache-2.0

use netrec::NetrecEngine;

use crate::{state::load_host, CliError};

pub(crate) struct CommandShow;

impl CommandShow {
    pub(crate) const CMD: &str = "show";

    pub(crate) fn new_cmd() -> clap::Command {
        clap::Command::new("show")
            .alias("s")
            .about("Query network state")
            .arg(
                clap::Arg::new("IFNAME")
                    .required(false)
                    .num_args(0..)
                    .index(1)
                    .help("Show only specified interfaces"),
            )
    }

    pub(crate) async fn handle(
        matches: &clap::ArgMatches,
        host_file: &str,
    ) -> Result<(), CliError> {
        let engine = NetrecEngine::new(load_host(host_file).await?);
        let net_state = if let Some(iface_names) =
            matches.get_many::<String>("IFNAME")
        {
            let iface_names: Vec<&str> =
                iface_names.map(String::as_str).collect();
            engine.show_only(iface_names.as_slice()).await?
        } else {
            engine.show().await?
        };

        print!("{}", net_state.to_yaml()?);
        Ok(())
    }
}
