// ── Status observation engine ──
//
// Three nested layers, each owned by exactly one parent emission:
//
//   account ──> connectivity ──> poll loop
//
// A new upstream value drops the whole descendant future before deriving
// work from the new one (switch semantics). In tokio terms each layer's
// subtree is a future owned by one `select!` branch of its parent, so
// dropping that future at an await point is the layer's cancellation —
// there is no token bookkeeping to race. One `CancellationToken` remains
// for whole-engine shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use garagio_api::{DeviceClient, Door};

use crate::account::Account;
use crate::gate::RefreshGate;
use crate::policy::RefreshPolicy;
use crate::status::Status;

const STATUS_CHANNEL_SIZE: usize = 64;

/// How long the connectivity signal must hold `true` before the link is
/// trusted; transitions to offline apply immediately.
const ONLINE_DEBOUNCE: Duration = Duration::from_millis(1_000);

/// Builds a configured device client from an account.
///
/// The engine uses [`DeviceClient::new`] by default; tests inject a
/// factory that skips the https-only check to point at mock servers.
pub type ClientFactory =
    Box<dyn Fn(&Account) -> Result<DeviceClient, garagio_api::Error> + Send + Sync>;

struct Sources {
    accounts: watch::Receiver<Account>,
    connectivity: watch::Receiver<bool>,
}

struct EngineInner {
    factory: ClientFactory,
    /// Written by the account layer, read by the poll loop and door
    /// commands. `None` until an account configures successfully.
    client: Mutex<Option<DeviceClient>>,
    policy: Mutex<RefreshPolicy>,
    gate: RefreshGate,
    status_tx: broadcast::Sender<Status>,
    latest_tx: watch::Sender<Option<Status>>,
    cancel: CancellationToken,
    sources: Mutex<Option<Sources>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// The status-observation engine.
///
/// Cheaply cloneable handle. Construct with the account and connectivity
/// sources, [`start`](Self::start) the pipeline, then consume emissions
/// via [`subscribe`](Self::subscribe) and issue door commands from any
/// task.
#[derive(Clone)]
pub struct StatusEngine {
    inner: Arc<EngineInner>,
}

impl StatusEngine {
    /// Create an engine over the given sources.
    ///
    /// Both receivers follow the usual watch contract: the current value
    /// is delivered immediately, every later change thereafter.
    pub fn new(accounts: watch::Receiver<Account>, connectivity: watch::Receiver<bool>) -> Self {
        Self::with_client_factory(
            accounts,
            connectivity,
            Box::new(|account: &Account| {
                let password = account
                    .password
                    .clone()
                    .unwrap_or_else(|| secrecy::SecretString::from(String::new()));
                DeviceClient::new(&account.base_url, &account.username, password)
            }),
        )
    }

    /// Create an engine with a custom device-client factory.
    pub fn with_client_factory(
        accounts: watch::Receiver<Account>,
        connectivity: watch::Receiver<bool>,
        factory: ClientFactory,
    ) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_SIZE);
        let (latest_tx, _) = watch::channel(None);

        Self {
            inner: Arc::new(EngineInner {
                factory,
                client: Mutex::new(None),
                policy: Mutex::new(RefreshPolicy::new()),
                gate: RefreshGate::new(),
                status_tx,
                latest_tx,
                cancel: CancellationToken::new(),
                sources: Mutex::new(Some(Sources {
                    accounts,
                    connectivity,
                })),
                task: Mutex::new(None),
            }),
        }
    }

    /// Start the pipeline task. Calling `start` again is a no-op.
    pub async fn start(&self) {
        let Some(sources) = self.inner.sources.lock().await.take() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(run_pipeline(inner, sources.accounts, sources.connectivity));
        *self.inner.task.lock().await = Some(handle);
    }

    /// Cancel the pipeline and wait for it to wind down.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handle = self.inner.task.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        debug!("status engine shut down");
    }

    /// Subscribe to the status emission stream.
    ///
    /// Subscribe before [`start`](Self::start) to observe the very first
    /// emission; a late subscriber only sees emissions from that point on.
    pub fn subscribe(&self) -> broadcast::Receiver<Status> {
        self.inner.status_tx.subscribe()
    }

    /// Observe the most recent status. `None` until the first emission.
    pub fn latest(&self) -> watch::Receiver<Option<Status>> {
        self.inner.latest_tx.subscribe()
    }

    /// Command a door to open. On success the poll loop is woken for an
    /// immediate refresh and the policy counters are reset.
    pub async fn open_door(&self, door: Door) -> bool {
        self.command(door, DoorAction::Open).await
    }

    /// Command a door to close. Same refresh behavior as
    /// [`open_door`](Self::open_door).
    pub async fn close_door(&self, door: Door) -> bool {
        self.command(door, DoorAction::Close).await
    }

    async fn command(&self, door: Door, action: DoorAction) -> bool {
        let client = self.inner.client.lock().await.clone();
        let Some(client) = client else {
            warn!(%door, "door command with no device configured");
            return false;
        };

        let result = match action {
            DoorAction::Open => client.open_door(door).await,
            DoorAction::Close => client.close_door(door).await,
        };

        match result {
            Ok(()) => {
                debug!(%door, ?action, "door command accepted; requesting refresh");
                self.inner.gate.signal();
                self.inner.policy.lock().await.reset();
                true
            }
            Err(e) => {
                warn!(%door, ?action, error = %e, "door command failed");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DoorAction {
    Open,
    Close,
}

// ── Layer 1: account ─────────────────────────────────────────────────

async fn run_pipeline(
    inner: Arc<EngineInner>,
    mut accounts: watch::Receiver<Account>,
    connectivity: watch::Receiver<bool>,
) {
    loop {
        let account = accounts.borrow_and_update().clone();

        tokio::select! {
            biased;

            () = inner.cancel.cancelled() => break,

            changed = accounts.changed() => {
                if changed.is_err() {
                    break;
                }
                // newest account wins; the dropped branch below was the
                // previous account's whole subscription chain
            }

            () = run_account(&inner, account, connectivity.clone()) => {
                // configuration failed; idle until the account changes
                tokio::select! {
                    biased;
                    () = inner.cancel.cancelled() => break,
                    changed = accounts.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
    debug!("status pipeline stopped");
}

/// Configure the device client for one account value, then run the
/// connectivity layer for as long as this account stays current.
/// Returns only when configuration fails or the connectivity source is
/// gone.
async fn run_account(
    inner: &EngineInner,
    account: Account,
    mut connectivity: watch::Receiver<bool>,
) {
    let client = match (inner.factory)(&account) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "account configuration rejected");
            *inner.client.lock().await = None;
            emit(inner, Status::AccountError(e.to_string()));
            return;
        }
    };

    info!(base_url = %account.base_url, username = %account.username, "device configured");
    *inner.client.lock().await = Some(client);

    // a freshly configured device starts from clean backoff state
    inner.policy.lock().await.reset();

    run_connectivity(inner, &mut connectivity).await;
}

// ── Layer 2: connectivity ────────────────────────────────────────────

async fn run_connectivity(inner: &EngineInner, online: &mut watch::Receiver<bool>) {
    // last value accepted past the de-duplication stage
    let mut last: Option<bool> = None;

    loop {
        let connected = *online.borrow_and_update();
        if last == Some(connected) {
            if online.changed().await.is_err() {
                return;
            }
            continue;
        }

        if !connected {
            last = Some(false);
            debug!("connectivity lost; polling suspended");
            emit(inner, Status::OfflineError);
            continue;
        }

        match hold_online(online).await {
            Some(true) => {}
            Some(false) => continue,
            None => return,
        }

        last = Some(true);
        debug!("connectivity held; polling resumes");

        let poll = poll_loop(inner);
        tokio::pin!(poll);
        loop {
            tokio::select! {
                changed = online.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*online.borrow_and_update() {
                        break;
                    }
                    // duplicate online values leave the running loop alone
                }
                () = &mut poll => return,
            }
        }
    }
}

/// Debounce an online transition: the value must hold `true` for the
/// full window, measured from its first sighting — duplicate `true`
/// deliveries do not reset the deadline.
///
/// `Some(true)`: held for the window. `Some(false)`: flipped offline
/// inside it. `None`: the connectivity source is gone.
async fn hold_online(online: &mut watch::Receiver<bool>) -> Option<bool> {
    let deadline = Instant::now() + ONLINE_DEBOUNCE;
    loop {
        tokio::select! {
            () = time::sleep_until(deadline) => return Some(true),
            changed = online.changed() => {
                if changed.is_err() {
                    return None;
                }
                if !*online.borrow_and_update() {
                    return Some(false);
                }
            }
        }
    }
}

// ── Layer 3: poll loop ───────────────────────────────────────────────

/// The sole producer of status emissions: fetch, emit, feed the policy,
/// wait out the interval (or a manual-refresh signal), repeat. At most
/// one fetch is ever in flight.
async fn poll_loop(inner: &EngineInner) {
    loop {
        let status = poll_once(inner).await;
        emit(inner, status.clone());

        let interval = {
            let mut policy = inner.policy.lock().await;
            policy.apply(&status);
            policy.interval()
        };
        inner.gate.wait_or_timeout(interval).await;
    }
}

async fn poll_once(inner: &EngineInner) -> Status {
    let client = inner.client.lock().await.clone();
    match client {
        Some(client) => match client.fetch_status().await {
            Ok(snapshot) => Status::Ok(snapshot),
            Err(e) => Status::from(e),
        },
        None => Status::OtherError("no device configured".into()),
    }
}

fn emit(inner: &EngineInner, status: Status) {
    debug!(%status, "status emitted");
    let _ = inner.status_tx.send(status.clone());
    inner.latest_tx.send_replace(Some(status));
}
