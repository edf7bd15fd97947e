//! Scripted in-memory wallet provider for session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wallet_session::{
    EventHandler, EventKind, ProviderCapabilities, ProviderEvent, ProviderRpcError, SessionSnapshot,
    SessionStatus, SubscriptionId, WalletProvider, WalletSession,
};

pub const ALICE: &str = "0xABC0000000000000000000000000000000000001";
pub const BOB: &str = "0xB0B0000000000000000000000000000000000002";
/// 1.5 ETH in wei
pub const ONE_AND_A_HALF_ETH: &str = "0x14d1120d7b160000";
/// 0.25 ETH in wei
pub const QUARTER_ETH: &str = "0x3782dace9d90000";

pub struct MockProvider {
    pub accounts: RefCell<Vec<String>>,
    pub chain_id: RefCell<String>,
    pub balances: RefCell<HashMap<String, String>>,
    failures: RefCell<HashMap<String, ProviderRpcError>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    calls: RefCell<Vec<String>>,
    handlers: RefCell<Vec<(SubscriptionId, EventKind, EventHandler)>>,
    capabilities: ProviderCapabilities,
    next_id: Cell<u64>,
    disconnects: Cell<usize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_capabilities(ProviderCapabilities { events: true, disconnect: false })
    }

    pub fn with_capabilities(capabilities: ProviderCapabilities) -> Self {
        Self {
            accounts: RefCell::new(Vec::new()),
            chain_id: RefCell::new("0x1".into()),
            balances: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashMap::new()),
            gates: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            handlers: RefCell::new(Vec::new()),
            capabilities,
            next_id: Cell::new(0),
            disconnects: Cell::new(0),
        }
    }

    pub fn with_account(self, account: &str, balance: &str) -> Self {
        self.accounts.borrow_mut().push(account.to_string());
        self.balances.borrow_mut().insert(account.to_string(), balance.to_string());
        self
    }

    pub fn on_chain(self, chain_id: &str) -> Self {
        *self.chain_id.borrow_mut() = chain_id.to_string();
        self
    }

    /// Make the next call to `method` fail with `code`.
    pub fn fail_next(&self, method: &str, code: i64, message: &str) {
        self.failures
            .borrow_mut()
            .insert(method.to_string(), ProviderRpcError::new(code, message));
    }

    /// Park the next call to `method` until the returned sender fires. The
    /// reply is computed after release, from the state at that time.
    pub fn hold(&self, method: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(method.to_string(), rx);
        tx
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| m.as_str() == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn subscriptions(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.get()
    }

    /// Deliver an event to every matching handler, as the wallet would.
    pub fn emit(&self, event: ProviderEvent) {
        let handlers: Vec<EventHandler> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind())
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(event.clone());
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.calls.borrow_mut().push(method.to_string());
        let gate = self.gates.borrow_mut().remove(method);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.failures.borrow_mut().remove(method) {
            return Err(err);
        }
        match method {
            "wallet_requestPermissions" => Ok(json!([{ "parentCapability": "eth_accounts" }])),
            "eth_accounts" => Ok(json!(self.accounts.borrow().clone())),
            "eth_chainId" => Ok(json!(self.chain_id.borrow().clone())),
            "eth_getBalance" => {
                let account = params[0].as_str().unwrap_or_default();
                let balance = self
                    .balances
                    .borrow()
                    .get(account)
                    .cloned()
                    .unwrap_or_else(|| "0x0".to_string());
                Ok(json!(balance))
            }
            other => Err(ProviderRpcError::unsupported(other)),
        }
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Result<SubscriptionId, ProviderRpcError> {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, kind, handler));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().retain(|(i, _, _)| *i != id);
    }

    async fn disconnect(&self) -> Result<(), ProviderRpcError> {
        self.disconnects.set(self.disconnects.get() + 1);
        Ok(())
    }
}

pub fn session_for(provider: &Rc<MockProvider>, pool: &LocalPool) -> WalletSession {
    WalletSession::new(
        Some(provider.clone() as Rc<dyn WalletProvider>),
        Rc::new(pool.spawner()),
    )
}

/// Collect every snapshot the session emits.
pub fn record(session: &WalletSession) -> Rc<RefCell<Vec<SessionSnapshot>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    session.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.clone()));
    log
}

pub fn statuses(log: &Rc<RefCell<Vec<SessionSnapshot>>>) -> Vec<SessionStatus> {
    log.borrow().iter().map(|s| s.status).collect()
}

/// Connected iff account, chain and balance are all present.
pub fn assert_consistent(session: &WalletSession) {
    let present = [
        session.account().is_some(),
        session.chain_id().is_some(),
        session.balance_wei().is_some(),
    ];
    let connected = session.status() == SessionStatus::Connected;
    assert!(present.iter().all(|p| *p == connected), "status {:?} with fields {:?}", session.status(), present);
}

pub fn assert_snapshot_consistent(snapshot: &SessionSnapshot) {
    let fields = [
        snapshot.account.is_some(),
        snapshot.chain_id.is_some(),
        snapshot.network.is_some(),
        snapshot.balance_wei.is_some(),
        snapshot.balance.is_some(),
    ];
    assert!(fields.iter().all(|f| *f == snapshot.is_connected()), "inconsistent snapshot {:?}", snapshot);
}
