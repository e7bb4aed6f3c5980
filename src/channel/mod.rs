// src/channel/mod.rs

//! Channel Manager: subprocess lifecycle plus the handshake-verified
//! control connection to one running service pack.
//!
//! The channel owns the subprocess: every exit path (success, dispense
//! failure, wire error, interrupt) must end with the child terminated,
//! which `close` guarantees and `kill_on_drop` backstops.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::errors::{HostError, Result};
use crate::exec::Invocation;
use crate::proto::{
    COOKIE_ENV, COOKIE_VALUE, RUN_PROBES_OPERATION, Request, Response, parse_handshake,
};

/// How long a freshly launched pack gets to produce its handshake line.
/// Probe runs themselves are unbounded; only startup is.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(60);

/// A live, handshake-verified control connection to one running pack.
pub struct PackChannel {
    pack: String,
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    closed: bool,
}

impl PackChannel {
    /// Start the subprocess and perform the handshake.
    ///
    /// Failure to spawn or a broken pipe is a connection error; a missing,
    /// malformed, or mismatching handshake line is a handshake error. In
    /// both cases the child is terminated before returning.
    pub async fn connect(invocation: &Invocation) -> Result<Self> {
        let pack = invocation.pack.clone();

        debug!(pack = %pack, cmd = %invocation, "launching service pack");

        let mut child = Command::new(&invocation.binary)
            .args(&invocation.args)
            .env(COOKIE_ENV, COOKIE_VALUE)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HostError::Connection {
                pack: pack.clone(),
                source: e,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill().await;
            return Err(HostError::Connection {
                pack,
                source: std::io::Error::other("child stdio pipes were not available"),
            });
        };
        let stderr = child.stderr.take();

        // Always consume stderr so buffers don't fill; log at debug.
        if let Some(stderr) = stderr {
            let pack = pack.clone();
            tokio::spawn(async move {
                let reader = BufReader::new(stderr);
                let mut lines = reader.lines();

                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(pack = %pack, "stderr: {}", line);
                }
            });
        }

        let mut channel = PackChannel {
            pack,
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            closed: false,
        };

        if let Err(err) = channel.handshake().await {
            channel.close().await;
            return Err(err);
        }

        Ok(channel)
    }

    async fn handshake(&mut self) -> Result<()> {
        let line = match timeout(HANDSHAKE_TIMEOUT, self.lines.next_line()).await {
            Err(_) => {
                return Err(self.handshake_failed(format!(
                    "no handshake within {}s",
                    HANDSHAKE_TIMEOUT.as_secs()
                )));
            }
            Ok(Err(e)) => {
                return Err(HostError::Connection {
                    pack: self.pack.clone(),
                    source: e,
                });
            }
            Ok(Ok(None)) => {
                return Err(self.handshake_failed("pack exited before the handshake".into()));
            }
            Ok(Ok(Some(line))) => line,
        };

        let frame = parse_handshake(&line).map_err(|reason| self.handshake_failed(reason))?;
        frame
            .verify()
            .map_err(|reason| self.handshake_failed(reason))?;

        debug!(
            pack = %self.pack,
            capabilities = ?frame.capabilities,
            "handshake verified"
        );
        Ok(())
    }

    fn handshake_failed(&self, reason: String) -> HostError {
        HostError::Handshake {
            pack: self.pack.clone(),
            reason,
        }
    }

    /// Request the named capability from the pack.
    ///
    /// A pack that answers with an error, or with anything other than a
    /// dispense confirmation, does not expose the capability.
    pub async fn dispense(&mut self, capability: &str) -> Result<()> {
        self.send(&Request::Dispense {
            capability: capability.to_string(),
        })
        .await?;

        match self.recv().await? {
            Response::Dispensed { capability: got } if got == capability => {
                debug!(pack = %self.pack, capability, "capability dispensed");
                Ok(())
            }
            Response::Error { message } => {
                debug!(pack = %self.pack, capability, message = %message, "dispense refused");
                Err(HostError::CapabilityNotExposed {
                    pack: self.pack.clone(),
                    capability: capability.to_string(),
                })
            }
            other => Err(self.wire_error(format!("unexpected reply to dispense: {other:?}"))),
        }
    }

    /// Invoke the pack's probe run and block until it reports back.
    ///
    /// There is deliberately no timeout here: probe runs lasting minutes
    /// are expected. `Ok(Some(_))` carries the pack's own failure report.
    pub async fn run_probes(&mut self) -> Result<Option<String>> {
        info!(pack = %self.pack, "invoking probe run");

        self.send(&Request::Invoke {
            operation: RUN_PROBES_OPERATION.to_string(),
        })
        .await?;

        match self.recv().await? {
            Response::Result { error } => Ok(error),
            other => Err(self.wire_error(format!("unexpected reply to invoke: {other:?}"))),
        }
    }

    async fn send(&mut self, request: &Request) -> Result<()> {
        let mut payload = serde_json::to_vec(request).map_err(|e| self.wire_error(e.to_string()))?;
        payload.push(b'\n');

        self.stdin
            .write_all(&payload)
            .await
            .map_err(|e| HostError::Connection {
                pack: self.pack.clone(),
                source: e,
            })?;
        self.stdin.flush().await.map_err(|e| HostError::Connection {
            pack: self.pack.clone(),
            source: e,
        })
    }

    async fn recv(&mut self) -> Result<Response> {
        match self.lines.next_line().await {
            Err(e) => Err(HostError::Connection {
                pack: self.pack.clone(),
                source: e,
            }),
            Ok(None) => Err(self.wire_error("pack closed the channel mid-exchange".into())),
            Ok(Some(line)) => {
                serde_json::from_str(&line).map_err(|e| self.wire_error(e.to_string()))
            }
        }
    }

    fn wire_error(&self, message: String) -> HostError {
        HostError::Connection {
            pack: self.pack.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, message),
        }
    }

    /// Release the connection and terminate the subprocess if still
    /// running. Safe to call multiple times.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // Best-effort polite shutdown; the pack may already be gone.
        if let Ok(farewell) = serde_json::to_vec(&Request::Shutdown) {
            let _ = self.stdin.write_all(&farewell).await;
            let _ = self.stdin.write_all(b"\n").await;
            let _ = self.stdin.flush().await;
        }

        if let Err(e) = self.child.kill().await {
            warn!(pack = %self.pack, error = %e, "failed to terminate pack process");
        }
        debug!(pack = %self.pack, "channel released");
    }
}
