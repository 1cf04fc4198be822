use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use super::{ActionFilter, Signal};
use crate::{lock_or_recover, log_debug};

/// Handler invoked on the dispatch thread for each matching signal.
pub trait SignalReceiver: Send {
    fn on_receive(&mut self, signal: &Signal);
}

impl<F> SignalReceiver for F
where
    F: FnMut(&Signal) + Send,
{
    fn on_receive(&mut self, signal: &Signal) {
        self(signal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifetime {
    /// Removed from the registry in the same critical section that selects it.
    OneShot,
    /// Lives until its [`Subscription`] handle is disposed or dropped.
    UntilDisposed,
}

type SharedReceiver = Arc<Mutex<Box<dyn SignalReceiver>>>;

struct Registration {
    id: SubscriptionId,
    filter: ActionFilter,
    lifetime: Lifetime,
    receiver: SharedReceiver,
}

struct BusInner {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
    queue_tx: Sender<Signal>,
    queue_rx: Receiver<Signal>,
}

impl BusInner {
    fn dispose(&self, id: SubscriptionId) -> bool {
        let mut registrations = lock_or_recover(&self.registrations, "signal registry");
        let before = registrations.len();
        registrations.retain(|reg| reg.id != id);
        registrations.len() != before
    }
}

/// Process-wide publish/subscribe bus keyed by action identifier.
///
/// `emit` only enqueues. Receivers run when the owner of the event-dispatch
/// thread calls [`SignalBus::dispatch_pending`], one signal at a time, each
/// receiver to completion. The registry lock is released before receivers run.
#[derive(Clone)]
pub struct SignalBus {
    inner: Arc<BusInner>,
}

/// Emit-only handle; carries no reference to any receiver.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: Sender<Signal>,
}

impl SignalSender {
    /// Fire-and-forget. Nothing is returned and nothing is acknowledged.
    pub fn emit(&self, signal: impl Into<Signal>) {
        let signal = signal.into();
        tracing::debug!(action = signal.identifier(), "signal emitted");
        // The bus owns the receiving end, so this only fails once the bus is gone.
        let _ = self.tx.send(signal);
    }
}

impl SignalBus {
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = unbounded();
        Self {
            inner: Arc::new(BusInner {
                registrations: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                queue_tx,
                queue_rx,
            }),
        }
    }

    /// The bus shared by every component in this process.
    pub fn global() -> &'static SignalBus {
        static GLOBAL: OnceLock<SignalBus> = OnceLock::new();
        GLOBAL.get_or_init(SignalBus::new)
    }

    pub fn sender(&self) -> SignalSender {
        SignalSender {
            tx: self.inner.queue_tx.clone(),
        }
    }

    pub fn emit(&self, signal: impl Into<Signal>) {
        self.sender().emit(signal);
    }

    /// Register a receiver for the lifetime of the returned handle.
    pub fn subscribe<R>(&self, filter: ActionFilter, receiver: R) -> Subscription
    where
        R: SignalReceiver + 'static,
    {
        let id = self.register(filter, Lifetime::UntilDisposed, Box::new(receiver));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Register a receiver that the bus disposes after its first matching delivery.
    pub fn subscribe_once<R>(&self, filter: ActionFilter, receiver: R) -> SubscriptionId
    where
        R: SignalReceiver + 'static,
    {
        self.register(filter, Lifetime::OneShot, Box::new(receiver))
    }

    fn register(
        &self,
        filter: ActionFilter,
        lifetime: Lifetime,
        receiver: Box<dyn SignalReceiver>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        log_debug(&format!(
            "signal registration {id:?} ({lifetime:?}) for {:?}",
            filter.actions()
        ));
        lock_or_recover(&self.inner.registrations, "signal registry").push(Registration {
            id,
            filter,
            lifetime,
            receiver: Arc::new(Mutex::new(receiver)),
        });
        id
    }

    pub fn is_registered(&self, id: SubscriptionId) -> bool {
        lock_or_recover(&self.inner.registrations, "signal registry")
            .iter()
            .any(|reg| reg.id == id)
    }

    pub fn registration_count(&self) -> usize {
        lock_or_recover(&self.inner.registrations, "signal registry").len()
    }

    /// Signals emitted but not yet dispatched.
    pub fn pending(&self) -> usize {
        self.inner.queue_rx.len()
    }

    /// Deliver every signal that was queued when the call started. Signals
    /// emitted by receivers during this call wait for the next one.
    /// Returns the number of signals dequeued.
    pub fn dispatch_pending(&self) -> usize {
        let queued = self.inner.queue_rx.len();
        let mut dispatched = 0;
        while dispatched < queued {
            let Ok(signal) = self.inner.queue_rx.try_recv() else {
                break;
            };
            self.deliver(&signal);
            dispatched += 1;
        }
        dispatched
    }

    /// Invoke every receiver currently registered for the signal's action.
    /// Returns how many receivers ran.
    ///
    /// Not re-entrant: a receiver is locked while it runs, so it must emit
    /// instead of delivering to itself.
    pub(super) fn deliver(&self, signal: &Signal) -> usize {
        let matching: Vec<(SubscriptionId, Lifetime, SharedReceiver)> = {
            let mut registrations = lock_or_recover(&self.inner.registrations, "signal registry");
            let mut matching = Vec::new();
            registrations.retain(|reg| {
                if !reg.filter.matches(signal) {
                    return true;
                }
                matching.push((reg.id, reg.lifetime, Arc::clone(&reg.receiver)));
                reg.lifetime == Lifetime::UntilDisposed
            });
            matching
        };

        if matching.is_empty() {
            log_debug(&format!("no receivers for {}", signal.identifier()));
            return 0;
        }

        let mut invoked = 0;
        for (id, lifetime, receiver) in matching {
            // An earlier receiver may have disposed a later one.
            if lifetime == Lifetime::UntilDisposed && !self.is_registered(id) {
                continue;
            }
            lock_or_recover(&receiver, "signal receiver").on_receive(signal);
            invoked += 1;
        }
        tracing::debug!(
            action = signal.identifier(),
            receivers = invoked,
            "signal delivered"
        );
        invoked
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("registrations", &self.registration_count())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Handle for a service-lifetime registration. Dropping it disposes the registration.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if bus.dispose(self.id) {
                log_debug(&format!("signal registration {:?} disposed", self.id));
            }
        }
    }
}
