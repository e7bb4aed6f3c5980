// src/exec/connector.rs

//! Pluggable pack connector abstraction.
//!
//! The batch loop talks to a `PackConnector` instead of spawning processes
//! directly. This keeps the orchestration semantics testable against a fake
//! connector while the production implementation lives in [`crate::channel`].
//!
//! - `RealConnector` is the default implementation used by `packhost`. It
//!   launches the binary, performs the handshake, and dispenses the
//!   `service_pack` capability.
//! - Tests can provide their own `PackConnector` that, for example, records
//!   which packs were connected and returns scripted probe outcomes.

use std::future::Future;
use std::pin::Pin;

use crate::channel::PackChannel;
use crate::errors::Result;
use crate::exec::Invocation;
use crate::proto::SERVICE_PACK_CAPABILITY;

/// A dispensed service pack capability: a typed remote handle to the one
/// operation a pack exports.
///
/// This feels like a normal interface implementation but runs over the
/// pack's control channel. Dropping the handle without `close` still kills
/// the subprocess; `close` exists so release happens at a chosen point and
/// is idempotent.
pub trait ServicePack: Send {
    /// Invoke the pack's probe run, blocking until the pack reports back.
    ///
    /// `Ok(None)` means full success. `Ok(Some(report))` means the pack ran
    /// and its own probes failed; that is a legitimate outcome, not an
    /// infrastructure fault. `Err` means the channel itself broke.
    fn run_probes(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>>;

    /// Release the channel and terminate the subprocess if still running.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Trait abstracting how a pack invocation becomes a live capability.
pub trait PackConnector: Send {
    /// Launch the invocation, perform the handshake, and dispense the
    /// pack-execution capability.
    fn connect<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ServicePack>>> + Send + 'a>>;
}

/// Production connector: spawns the real subprocess and speaks the JSON
/// control protocol over its stdio.
#[derive(Debug, Default)]
pub struct RealConnector;

impl PackConnector for RealConnector {
    fn connect<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ServicePack>>> + Send + 'a>> {
        Box::pin(async move {
            let mut channel = PackChannel::connect(invocation).await?;

            if let Err(err) = channel.dispense(SERVICE_PACK_CAPABILITY).await {
                channel.close().await;
                return Err(err);
            }

            Ok(Box::new(DispensedPack { channel }) as Box<dyn ServicePack>)
        })
    }
}

/// The production `ServicePack` implementation: a dispensed capability
/// backed by a live [`PackChannel`].
struct DispensedPack {
    channel: PackChannel,
}

impl ServicePack for DispensedPack {
    fn run_probes(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
        Box::pin(async move { self.channel.run_probes().await })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move { self.channel.close().await })
    }
}
