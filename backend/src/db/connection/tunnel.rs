//! SSH port-forward provider.
//!
//! Runs `ssh -N -L` as a child process and hands out the loopback end of the
//! forward. At most one tunnel is alive per provider; it is reused across
//! queries and restarted when the child process has exited.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::Mutex;

use super::{ConnectionProvider, Endpoint, ProviderState};
use crate::db::config::TunnelSettings;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const READY_PROBE_TIMEOUT: Duration = Duration::from_millis(250);
const STDERR_TAIL_LINES: usize = 20;

/// Most recent lines ssh wrote to stderr.
type StderrTail = Arc<Mutex<VecDeque<String>>>;

/// Provider owning an SSH tunnel to the database host.
pub struct TunnelProvider {
    settings: TunnelSettings,
    inner: Mutex<TunnelInner>,
}

struct TunnelInner {
    state: ProviderState,
    process: Option<TunnelProcess>,
    last_error: Option<String>,
}

/// A running ssh child. Dropping it kills the process.
///
/// stderr is drained for the whole life of the child so a chatty ssh never
/// blocks on a full pipe.
struct TunnelProcess {
    child: Child,
    local_port: u16,
    stderr_tail: StderrTail,
    stderr_reader: Option<JoinHandle<()>>,
}

impl TunnelProcess {
    fn new(mut child: Child, local_port: u16) -> Self {
        let stderr_tail = StderrTail::default();
        let stderr_reader = drain_stderr(&mut child, Arc::clone(&stderr_tail));
        Self {
            child,
            local_port,
            stderr_tail,
            stderr_reader,
        }
    }

    /// stderr collected so far, waiting for the reader when the child has exited.
    fn stderr_output(&mut self) -> String {
        if let Some(reader) = self.stderr_reader.take() {
            let _ = reader.join();
        }
        let lines = self.stderr_tail.lock();
        lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

impl Drop for TunnelProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl TunnelProvider {
    pub fn new(settings: TunnelSettings) -> Self {
        Self {
            settings,
            inner: Mutex::new(TunnelInner {
                state: ProviderState::Closed,
                process: None,
                last_error: None,
            }),
        }
    }

    pub fn settings(&self) -> &TunnelSettings {
        &self.settings
    }

    /// Loopback port of the live tunnel, if any.
    pub fn local_port(&self) -> Option<u16> {
        self.inner.lock().process.as_ref().map(|p| p.local_port)
    }

    /// Message of the last failed connection attempt.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    fn start(&self) -> RepositoryResult<TunnelProcess> {
        let local_port = free_local_port().map_err(|e| {
            self.error(
                "reserve_local_port",
                format!("Failed to reserve a local port: {}", e),
            )
        })?;

        let args = ssh_args(&self.settings, local_port);
        debug!("Running: {} {}", self.settings.ssh_binary, args.join(" "));

        let child = Command::new(&self.settings.ssh_binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                self.error(
                    "spawn_ssh",
                    format!("Failed to start '{}': {}", self.settings.ssh_binary, e),
                )
            })?;

        let mut process = TunnelProcess::new(child, local_port);
        wait_until_ready(&mut process, self.settings.ready_timeout())
            .map_err(|message| self.error("wait_for_tunnel", message))?;

        Ok(process)
    }

    fn error(&self, operation: &str, message: String) -> RepositoryError {
        RepositoryError::connection_with_context(
            message,
            ErrorContext::new(operation)
                .with_entity("tunnel")
                .with_entity_id(format!(
                    "{}@{}:{}",
                    self.settings.ssh_user, self.settings.ssh_host, self.settings.ssh_port
                )),
        )
    }
}

impl ConnectionProvider for TunnelProvider {
    fn acquire(&self) -> RepositoryResult<Endpoint> {
        let mut inner = self.inner.lock();

        if inner.state == ProviderState::Open {
            if let Some(process) = inner.process.as_mut() {
                match process.child.try_wait() {
                    Ok(None) => return Ok(Endpoint::loopback(process.local_port)),
                    Ok(Some(status)) => {
                        warn!("SSH tunnel exited ({}); reconnecting", status)
                    }
                    Err(e) => warn!("Failed to poll SSH tunnel: {}; reconnecting", e),
                }
            }
            inner.process = None;
        }

        inner.state = ProviderState::Connecting;
        match self.start() {
            Ok(process) => {
                let endpoint = Endpoint::loopback(process.local_port);
                info!(
                    "SSH tunnel open: {} -> {}:{} via {}",
                    endpoint, self.settings.remote_host, self.settings.remote_port, self.settings.ssh_host
                );
                inner.process = Some(process);
                inner.state = ProviderState::Open;
                inner.last_error = None;
                Ok(endpoint)
            }
            Err(e) => {
                warn!("SSH tunnel failed: {}", e);
                inner.state = ProviderState::Failed;
                inner.last_error = Some(e.message().to_string());
                Err(e)
            }
        }
    }

    fn release(&self, _endpoint: &Endpoint) {}

    fn state(&self) -> ProviderState {
        self.inner.lock().state
    }

    fn shutdown(&self) {
        let mut inner = self.inner.lock();
        if inner.process.take().is_some() {
            info!("SSH tunnel to {} closed", self.settings.ssh_host);
        }
        inner.state = ProviderState::Closed;
    }
}

/// Arguments for `ssh` forwarding `127.0.0.1:local_port` to the remote database.
pub(crate) fn ssh_args(settings: &TunnelSettings, local_port: u16) -> Vec<String> {
    let mut args = vec![
        "-N".to_string(),
        "-L".to_string(),
        format!(
            "127.0.0.1:{}:{}:{}",
            local_port, settings.remote_host, settings.remote_port
        ),
        "-p".to_string(),
        settings.ssh_port.to_string(),
        "-o".to_string(),
        "ExitOnForwardFailure=yes".to_string(),
        "-o".to_string(),
        "BatchMode=yes".to_string(),
    ];
    if let Some(key) = &settings.key_path {
        args.push("-i".to_string());
        args.push(key.display().to_string());
    }
    args.push(format!("{}@{}", settings.ssh_user, settings.ssh_host));
    args
}

fn free_local_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

fn wait_until_ready(process: &mut TunnelProcess, timeout: Duration) -> Result<(), String> {
    let addr = SocketAddr::from(([127, 0, 0, 1], process.local_port));
    let deadline = Instant::now() + timeout;

    loop {
        match process.child.try_wait() {
            Ok(Some(status)) => {
                let stderr = process.stderr_output();
                return Err(format!(
                    "ssh exited before the tunnel was ready ({}){}",
                    status,
                    if stderr.is_empty() {
                        String::new()
                    } else {
                        format!(": {}", stderr)
                    }
                ));
            }
            Ok(None) => {}
            Err(e) => return Err(format!("Failed to poll ssh: {}", e)),
        }

        if TcpStream::connect_timeout(&addr, READY_PROBE_TIMEOUT).is_ok() {
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(format!(
                "Tunnel port {} not ready after {}s",
                process.local_port,
                timeout.as_secs()
            ));
        }
        thread::sleep(READY_POLL_INTERVAL);
    }
}

/// Forwards ssh diagnostics to `debug!` and keeps the last few lines for error messages.
fn drain_stderr(child: &mut Child, tail: StderrTail) -> Option<JoinHandle<()>> {
    let stderr = child.stderr.take()?;
    let spawned = thread::Builder::new()
        .name("ssh-stderr".to_string())
        .spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                debug!("ssh: {}", line);
                let mut lines = tail.lock();
                if lines.len() == STDERR_TAIL_LINES {
                    lines.pop_front();
                }
                lines.push_back(line);
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to start ssh stderr reader: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unreachable_settings() -> TunnelSettings {
        let mut settings = TunnelSettings::new("bastion.invalid", "db.internal");
        settings.ssh_binary = "/nonexistent/ssh-binary-for-tests".to_string();
        settings.ready_timeout_sec = 1;
        settings
    }

    #[test]
    fn test_ssh_args_without_key() {
        let settings = TunnelSettings::new("bastion.example.com", "db.internal");
        let args = ssh_args(&settings, 40000);

        assert_eq!(args[0], "-N");
        assert_eq!(args[2], "127.0.0.1:40000:db.internal:5432");
        assert!(args.windows(2).any(|w| w[0] == "-p" && w[1] == "22"));
        assert!(!args.contains(&"-i".to_string()));
        assert_eq!(args.last().unwrap(), "ec2-user@bastion.example.com");
    }

    #[test]
    fn test_ssh_args_with_key() {
        let mut settings = TunnelSettings::new("bastion", "db");
        settings.key_path = Some(PathBuf::from("/keys/id_ed25519"));
        settings.ssh_user = "ops".to_string();
        settings.ssh_port = 2222;
        settings.remote_port = 6432;

        let args = ssh_args(&settings, 41000);
        assert_eq!(args[2], "127.0.0.1:41000:db:6432");
        assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == "/keys/id_ed25519"));
        assert!(args.windows(2).any(|w| w[0] == "-p" && w[1] == "2222"));
        assert_eq!(args.last().unwrap(), "ops@bastion");
    }

    #[test]
    fn test_new_provider_is_closed() {
        let provider = TunnelProvider::new(unreachable_settings());
        assert_eq!(provider.state(), ProviderState::Closed);
        assert!(provider.local_port().is_none());
        assert!(provider.last_error().is_none());
    }

    #[test]
    fn test_spawn_failure_moves_to_failed() {
        let provider = TunnelProvider::new(unreachable_settings());

        let err = provider.acquire().unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert_eq!(err.context().entity.as_deref(), Some("tunnel"));
        assert_eq!(provider.state(), ProviderState::Failed);
        assert!(provider.last_error().unwrap().contains("Failed to start"));
        assert!(provider.local_port().is_none());
    }

    #[test]
    fn test_failed_provider_retries_and_shuts_down() {
        let provider = TunnelProvider::new(unreachable_settings());
        assert!(provider.acquire().is_err());
        assert!(provider.acquire().is_err());
        assert_eq!(provider.state(), ProviderState::Failed);

        provider.shutdown();
        assert_eq!(provider.state(), ProviderState::Closed);
    }

    #[cfg(unix)]
    #[test]
    fn test_noisy_ssh_is_drained_until_exit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ssh");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             i=0\n\
             while [ \"$i\" -lt 3000 ]; do\n\
             echo \"debug1: channel $i: open failed: connect failed: Connection refused\" >&2\n\
             i=$((i + 1))\n\
             done\n\
             exit 255\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut settings = unreachable_settings();
        settings.ssh_binary = script.display().to_string();
        settings.ready_timeout_sec = 15;
        let provider = TunnelProvider::new(settings);

        let err = provider.acquire().unwrap_err();
        let message = err.message().to_string();
        assert!(message.contains("exited before the tunnel was ready"), "{}", message);
        assert!(message.contains("channel 2999:"), "{}", message);
        assert!(!message.contains("channel 0:"), "{}", message);
        assert_eq!(err.context().operation.as_deref(), Some("wait_for_tunnel"));
        assert_eq!(provider.state(), ProviderState::Failed);
    }

    #[test]
    fn test_free_local_port_is_nonzero() {
        assert_ne!(free_local_port().unwrap(), 0);
    }
}
