//! Reply correlation by address.
//!
//! OSC has no request ids: a reply comes back on the address that was
//! queried. The correlator keeps at most one waiter per address and hands
//! the next message on that address to it.
//!
//! Per query:
//!
//! ```text
//! Idle ──register──▶ Registered ──reply──────▶ Fulfilled
//!                        │ ───deadline───▶ TimedOut
//!                        └───close()─────▶ Cancelled
//! ```
//!
//! Every terminal state removes the waiter. Removal is keyed by a per-waiter
//! token, so a second removal (timeout racing a late reply) or a removal
//! after a newer waiter took the address is a no-op.
//!
//! A second query on an address that already has a waiter is rejected with
//! [`ClientError::Busy`]; the first caller keeps its slot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::trace;

use crate::error::ClientError;
use crate::packet::{OscArg, OscMessage};

/// Deadline used when `now + timeout` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// What the listener hands a waiter
#[derive(Debug)]
enum Delivery {
    Reply(Vec<OscArg>),
    Closed,
}

/// A registered waiter's half of the rendezvous
struct Slot {
    token: u64,
    tx: oneshot::Sender<Delivery>,
}

#[derive(Default)]
struct Registry {
    waiters: HashMap<String, Slot>,
    next_token: u64,
    closed: bool,
}

/// Thread-safe address → waiter registry.
///
/// The lock is never held across an await point or while waking a waiter.
#[derive(Default)]
pub struct Correlator {
    registry: Mutex<Registry>,
}

impl Correlator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Nothing panics while holding the lock, and the map stays
        // consistent even if something did
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claim `address` for one reply.
    ///
    /// Fails with `Busy` if a waiter already holds the address and with
    /// `ConnectionClosed` once [`close`](Self::close) has run.
    pub fn register(self: &Arc<Self>, address: &str, timeout: Duration) -> Result<Waiter, ClientError> {
        let (tx, rx) = oneshot::channel();

        let token = {
            let mut registry = self.registry();
            if registry.closed {
                return Err(ClientError::ConnectionClosed {
                    address: address.to_string(),
                });
            }
            if registry.waiters.contains_key(address) {
                return Err(ClientError::Busy {
                    address: address.to_string(),
                });
            }

            let token = registry.next_token;
            registry.next_token += 1;
            registry
                .waiters
                .insert(address.to_string(), Slot { token, tx });
            token
        };

        trace!("Registered waiter {} on {}", token, address);

        Ok(Waiter {
            correlator: Arc::clone(self),
            address: address.to_string(),
            token,
            timeout,
            deadline: deadline_after(timeout),
            rx,
        })
    }

    /// Hand `message` to the waiter on its address.
    ///
    /// Returns the message back if nobody is waiting (unsolicited push or a
    /// reply whose caller already gave up).
    pub fn deliver(&self, message: OscMessage) -> Option<OscMessage> {
        let slot = self.registry().waiters.remove(&message.address);

        match slot {
            Some(slot) => {
                if slot.tx.send(Delivery::Reply(message.args)).is_err() {
                    // Caller hit its deadline between our lookup and the send
                    trace!("Waiter {} on {} gone before delivery", slot.token, message.address);
                }
                None
            }
            None => Some(message),
        }
    }

    /// Wake every waiter with a closed signal and refuse new registrations.
    ///
    /// Returns how many waiters were cancelled. Safe to call repeatedly.
    pub fn close(&self) -> usize {
        let drained: Vec<(String, Slot)> = {
            let mut registry = self.registry();
            registry.closed = true;
            registry.waiters.drain().collect()
        };

        let count = drained.len();
        for (address, slot) in drained {
            trace!("Cancelling waiter {} on {}", slot.token, address);
            let _ = slot.tx.send(Delivery::Closed);
        }
        count
    }

    pub fn is_closed(&self) -> bool {
        self.registry().closed
    }

    /// Number of live waiters
    pub fn pending(&self) -> usize {
        self.registry().waiters.len()
    }

    /// Whether `address` currently has a waiter
    pub fn is_waiting(&self, address: &str) -> bool {
        self.registry().waiters.contains_key(address)
    }

    /// Remove the waiter only if it is still the one identified by `token`.
    fn deregister(&self, address: &str, token: u64) -> bool {
        let mut registry = self.registry();
        match registry.waiters.get(address) {
            Some(slot) if slot.token == token => {
                registry.waiters.remove(address);
                true
            }
            _ => false,
        }
    }
}

/// `now + timeout`, saturating at [`FAR_FUTURE`] for huge timeouts.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

/// One in-flight query's claim on an address.
///
/// Owned by the calling task; dropping it (after completion, or because the
/// caller's future was dropped) releases the address.
pub struct Waiter {
    correlator: Arc<Correlator>,
    address: String,
    token: u64,
    timeout: Duration,
    deadline: Instant,
    rx: oneshot::Receiver<Delivery>,
}

impl Waiter {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Wait for the reply until the deadline fixed at registration.
    pub async fn wait(mut self) -> Result<Vec<OscArg>, ClientError> {
        match tokio::time::timeout_at(self.deadline, &mut self.rx).await {
            Ok(Ok(Delivery::Reply(args))) => Ok(args),
            Ok(Ok(Delivery::Closed)) | Ok(Err(_)) => Err(ClientError::ConnectionClosed {
                address: self.address.clone(),
            }),
            Err(_) => Err(ClientError::Timeout {
                address: self.address.clone(),
                timeout: self.timeout,
            }),
        }
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if self.correlator.deregister(&self.address, self.token) {
            trace!("Deregistered waiter {} on {}", self.token, self.address);
        }
    }
}
