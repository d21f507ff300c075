// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use netrec::{NetrecMemoryBackend, NetworkState};

use super::CliError;

pub(crate) fn state_from_file(
    file_path: &str,
) -> Result<NetworkState, CliError> {
    if file_path == "-" {
        state_from_fd(&mut std::io::stdin())
    } else {
        state_from_fd(&mut std::fs::File::open(file_path)?)
    }
}

fn state_from_fd<R>(fd: &mut R) -> Result<NetworkState, CliError>
where
    R: Read,
{
    let mut content = String::new();
    // Replace non-breaking space '\u{A0}'  to normal space
    fd.read_to_string(&mut content)?;
    let content = content.replace('\u{A0}', " ");

    Ok(NetworkState::new_from_yaml(&content)?)
}

/// Host file not found is treated as host without any interface.
pub(crate) async fn load_host(
    host_file: &str,
) -> Result<NetrecMemoryBackend, CliError> {
    match tokio::fs::read_to_string(host_file).await {
        Ok(content) => Ok(NetrecMemoryBackend::new_from_yaml(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Host file {host_file} not found, starting empty");
            Ok(NetrecMemoryBackend::default())
        }
        Err(e) => Err(CliError::from(format!(
            "Failed to read host file {host_file}: {e}"
        ))),
    }
}

pub(crate) async fn save_host(
    backend: &NetrecMemoryBackend,
    host_file: &str,
) -> Result<(), CliError> {
    let content = backend.state()?.to_yaml()?;
    tokio::fs::write(host_file, content).await.map_err(|e| {
        CliError::from(format!("Failed to write host file {host_file}: {e}"))
    })?;
    log::debug!("Host state saved to {host_file}");
    Ok(())
}
