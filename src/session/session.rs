//! WalletSession: connection state machine over a WalletProvider.

use alloy_primitives::U256;
use futures::task::{LocalFutureObj, LocalSpawn};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

use super::config::SessionConfig;
use super::error::{ErrorKind, ProviderRpcError, SessionError, SessionResult};
use super::provider::{
    EventHandler, EventKind, ProviderCapabilities, ProviderEvent, SubscriptionId, WalletProvider,
};
use super::state::{Connection, SessionSnapshot, SessionState, SessionStatus};
use crate::core::chains::NetworkTable;
use crate::core::rpc::methods;
use crate::core::units::parse_quantity;

type Observer = Rc<dyn Fn(&SessionSnapshot)>;
type ErrorObserver = Rc<dyn Fn(&SessionError)>;

/// Handle for a registered state or error observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Shared {
    provider: Option<Rc<dyn WalletProvider>>,
    capabilities: ProviderCapabilities,
    config: SessionConfig,
    networks: NetworkTable,
    spawner: Rc<dyn LocalSpawn>,
    inner: RefCell<Inner>,
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    /// Bumped on every connect attempt and every disconnect; replies from an
    /// older epoch are dropped.
    epoch: u64,
    /// Chain/balance reads are numbered; a reply older than the last one
    /// committed is dropped.
    reads_issued: u64,
    reads_committed: u64,
    /// Account the wallet last reported; refreshes read this one.
    wallet_account: Option<String>,
    listeners_attached: bool,
    subscriptions: Vec<SubscriptionId>,
    observers: Vec<(ListenerId, Observer)>,
    error_observers: Vec<(ListenerId, ErrorObserver)>,
    next_listener: u64,
}

/// Wallet connection session. Cheap to clone; clones share state.
///
/// All methods run on one thread. Provider events are handed to `spawner`
/// so they are processed on the same executor as user actions.
#[derive(Clone)]
pub struct WalletSession {
    shared: Rc<Shared>,
}

impl WalletSession {
    pub fn new(provider: Option<Rc<dyn WalletProvider>>, spawner: Rc<dyn LocalSpawn>) -> Self {
        Self::with_config(provider, spawner, SessionConfig::default())
    }

    pub fn with_config(
        provider: Option<Rc<dyn WalletProvider>>,
        spawner: Rc<dyn LocalSpawn>,
        config: SessionConfig,
    ) -> Self {
        let capabilities = provider.as_ref().map(|p| p.capabilities()).unwrap_or_default();
        tracing::debug!(
            has_provider = provider.is_some(),
            events = capabilities.events,
            disconnect = capabilities.disconnect,
            "wallet session created"
        );
        let networks = config.network_table();
        Self {
            shared: Rc::new(Shared {
                provider,
                capabilities,
                config,
                networks,
                spawner,
                inner: RefCell::new(Inner::default()),
            }),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn status(&self) -> SessionStatus {
        self.shared.inner.borrow().state.status()
    }

    pub fn account(&self) -> Option<String> {
        self.shared.inner.borrow().state.connection().map(|c| c.account.clone())
    }

    pub fn chain_id(&self) -> Option<String> {
        self.shared.inner.borrow().state.connection().map(|c| c.chain_id.clone())
    }

    pub fn balance_wei(&self) -> Option<U256> {
        self.shared.inner.borrow().state.connection().map(|c| c.balance_wei)
    }

    pub fn listeners_attached(&self) -> bool {
        self.shared.inner.borrow().listeners_attached
    }

    pub fn has_provider(&self) -> bool {
        self.shared.provider.is_some()
    }

    pub fn capabilities(&self) -> ProviderCapabilities {
        self.shared.capabilities
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.shared.inner.borrow();
        SessionSnapshot::build(&inner.state, &self.shared.networks, &self.shared.config)
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Called synchronously with a fresh snapshot after every mutation.
    pub fn subscribe(&self, observer: impl Fn(&SessionSnapshot) + 'static) -> ListenerId {
        let mut inner = self.shared.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.observers.push((id, Rc::new(observer)));
        id
    }

    /// Called with errors raised while handling provider events, where no
    /// caller is waiting on a `Result`.
    pub fn on_error(&self, observer: impl Fn(&SessionError) + 'static) -> ListenerId {
        let mut inner = self.shared.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.error_observers.push((id, Rc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.shared.inner.borrow_mut();
        let before = inner.observers.len() + inner.error_observers.len();
        inner.observers.retain(|(i, _)| *i != id);
        inner.error_observers.retain(|(i, _)| *i != id);
        before != inner.observers.len() + inner.error_observers.len()
    }

    fn notify(&self) {
        let observers: Vec<Observer> = self
            .shared
            .inner
            .borrow()
            .observers
            .iter()
            .map(|(_, o)| o.clone())
            .collect();
        if observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in observers {
            observer(&snapshot);
        }
    }

    fn report(&self, err: &SessionError) {
        let observers: Vec<ErrorObserver> = self
            .shared
            .inner
            .borrow()
            .error_observers
            .iter()
            .map(|(_, o)| o.clone())
            .collect();
        for observer in observers {
            observer(err);
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Ask the wallet for account access (always prompting), then load chain
    /// and balance.
    pub async fn connect(&self) -> SessionResult<SessionSnapshot> {
        let provider = self.shared.provider.clone().ok_or(SessionError::NoProviderAvailable)?;

        let (previous, epoch) = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.state.status() == SessionStatus::Connecting {
                return Err(SessionError::RequestPending("connect already in progress".into()));
            }
            inner.epoch += 1;
            (std::mem::replace(&mut inner.state, SessionState::Connecting), inner.epoch)
        };
        tracing::info!("requesting wallet permission");
        self.notify();

        let outcome = self.authorize(provider.as_ref()).await;

        let mut inner = self.shared.inner.borrow_mut();
        if inner.epoch != epoch {
            drop(inner);
            tracing::info!("connect attempt superseded");
            return Err(SessionError::Superseded);
        }
        match outcome {
            Ok(connection) => {
                tracing::info!(
                    account = %connection.account,
                    chain_id = %connection.chain_id,
                    "wallet connected"
                );
                inner.wallet_account = Some(connection.account.clone());
                inner.state = SessionState::Connected(connection);
                drop(inner);
                self.notify();
                Ok(self.snapshot())
            }
            Err(err) => {
                // A pending request is the wallet's business, not ours: leave
                // the session as it was.
                inner.state = match err.kind() {
                    ErrorKind::RequestPending => previous,
                    _ => SessionState::Disconnected,
                };
                drop(inner);
                tracing::warn!(kind = ?err.kind(), error = %err, "wallet connect failed");
                self.notify();
                Err(err)
            }
        }
    }

    async fn authorize(&self, provider: &dyn WalletProvider) -> SessionResult<Connection> {
        provider.request(methods::REQUEST_PERMISSIONS, permission_params()).await?;

        let accounts = provider.request(methods::ACCOUNTS, json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(accounts).map_err(ProviderRpcError::from)?;
        let account = accounts.into_iter().next().ok_or(SessionError::NoAccountAuthorized)?;

        self.attach_listeners(provider);

        let (chain_id, balance_wei) = read_chain_and_balance(provider, &account).await?;
        Ok(Connection { account, chain_id, balance_wei })
    }

    /// Forget the connection locally. Provider permissions are left alone.
    pub async fn disconnect(&self) {
        let was = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.state == SessionState::Disconnected {
                return;
            }
            inner.epoch += 1;
            inner.wallet_account = None;
            std::mem::take(&mut inner.state).status()
        };
        tracing::info!(from = was.as_str(), "wallet disconnected");
        self.notify();

        if self.shared.capabilities.disconnect {
            if let Some(provider) = self.shared.provider.clone() {
                if let Err(err) = provider.disconnect().await {
                    tracing::warn!(error = %err, "provider disconnect failed");
                }
            }
        }
    }

    /// Re-read chain and balance. No-op unless connected.
    pub async fn refresh(&self) -> SessionResult<()> {
        let account = {
            let inner = self.shared.inner.borrow();
            match (&inner.wallet_account, inner.state.connection()) {
                (Some(account), Some(_)) => account.clone(),
                (None, Some(c)) => c.account.clone(),
                _ => return Ok(()),
            }
        };
        self.load_account(account).await
    }

    /// Read chain and balance for `account`, then commit all three at once.
    /// On failure the current connection is left untouched.
    async fn load_account(&self, account: String) -> SessionResult<()> {
        let Some(provider) = self.shared.provider.clone() else {
            return Ok(());
        };
        let (epoch, seq) = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.state.connection().is_none() {
                return Ok(());
            }
            inner.reads_issued += 1;
            (inner.epoch, inner.reads_issued)
        };

        let (chain_id, balance_wei) = read_chain_and_balance(provider.as_ref(), &account).await?;

        let previous = {
            let mut inner = self.shared.inner.borrow_mut();
            let fresh = inner.epoch == epoch && seq > inner.reads_committed;
            let replaced = match &mut inner.state {
                SessionState::Connected(c) if fresh => Some(std::mem::replace(
                    c,
                    Connection { account: account.clone(), chain_id, balance_wei },
                )),
                _ => None,
            };
            if replaced.is_some() {
                inner.reads_committed = seq;
            }
            replaced
        };
        let Some(previous) = previous else {
            tracing::debug!(%account, seq, "dropping stale chain/balance reply");
            return Ok(());
        };

        if previous.account != account {
            tracing::info!(from = %previous.account, to = %account, "account changed");
        }
        self.notify();
        Ok(())
    }

    /// Disconnect and remove every provider subscription.
    pub async fn close(&self) {
        self.disconnect().await;
        self.detach_listeners();
    }

    // =========================================================================
    // Provider events
    // =========================================================================

    /// React to a provider notification. Ignored unless connected.
    pub async fn handle_event(&self, event: ProviderEvent) {
        if self.status() != SessionStatus::Connected {
            tracing::debug!(event = event.kind().as_str(), "ignoring provider event while not connected");
            return;
        }
        let result = match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    self.shared.inner.borrow_mut().wallet_account = Some(account.clone());
                    self.load_account(account).await
                }
                None => {
                    self.disconnect().await;
                    Ok(())
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                tracing::info!(%chain_id, "chain changed");
                self.refresh().await
            }
        };
        if let Err(err) = result {
            tracing::warn!(kind = ?err.kind(), error = %err, "provider event handling failed");
            self.report(&err);
        }
    }

    fn attach_listeners(&self, provider: &dyn WalletProvider) {
        if self.shared.inner.borrow().listeners_attached {
            return;
        }
        if !self.shared.capabilities.events {
            tracing::debug!("provider has no event support; not subscribing");
            return;
        }

        let handler = self.event_handler();
        let mut ids = Vec::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL {
            match provider.subscribe(kind, handler.clone()) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    tracing::warn!(event = kind.as_str(), error = %err, "provider subscription failed");
                    for id in ids {
                        provider.unsubscribe(id);
                    }
                    return;
                }
            }
        }

        let mut inner = self.shared.inner.borrow_mut();
        inner.subscriptions = ids;
        inner.listeners_attached = true;
    }

    fn detach_listeners(&self) {
        let ids = {
            let mut inner = self.shared.inner.borrow_mut();
            inner.listeners_attached = false;
            std::mem::take(&mut inner.subscriptions)
        };
        if let Some(provider) = &self.shared.provider {
            for id in ids {
                provider.unsubscribe(id);
            }
        }
    }

    /// Handler given to the provider. Holds the session weakly so the
    /// provider never keeps it alive.
    fn event_handler(&self) -> EventHandler {
        let weak = Rc::downgrade(&self.shared);
        Rc::new(move |event: ProviderEvent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let session = WalletSession { shared };
            let spawner = session.shared.spawner.clone();
            let task = async move { session.handle_event(event).await };
            if let Err(err) = spawner.spawn_local_obj(LocalFutureObj::new(Box::new(task))) {
                tracing::warn!(error = ?err, "dropping provider event: executor unavailable");
            }
        })
    }
}

fn permission_params() -> Value {
    let mut scope = Map::new();
    scope.insert(methods::ACCOUNTS_SCOPE.to_string(), json!({}));
    Value::Array(vec![Value::Object(scope)])
}

async fn read_chain_and_balance(
    provider: &dyn WalletProvider,
    account: &str,
) -> SessionResult<(String, U256)> {
    let chain_id = match provider.request(methods::CHAIN_ID, json!([])).await? {
        Value::String(id) => id,
        other => {
            return Err(ProviderRpcError::invalid_response(format!("bad chain id {}", other)).into())
        }
    };
    let balance = provider
        .request(methods::GET_BALANCE, json!([account, methods::LATEST]))
        .await?;
    let balance_wei = parse_quantity(&balance).map_err(ProviderRpcError::from)?;
    Ok((chain_id, balance_wei))
}
