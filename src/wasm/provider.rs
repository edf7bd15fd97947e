//! InjectedProvider: `window.ethereum` behind the WalletProvider trait.
//!
//! Capabilities are probed once, when the provider is wrapped.

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::core::rpc::codes;
use crate::session::{
    EventHandler, EventKind, ProviderCapabilities, ProviderEvent, ProviderRpcError, SubscriptionId,
    WalletProvider,
};

struct Listener {
    kind: EventKind,
    callback: Closure<dyn FnMut(JsValue)>,
}

pub struct InjectedProvider {
    ethereum: JsValue,
    capabilities: ProviderCapabilities,
    listeners: RefCell<HashMap<SubscriptionId, Listener>>,
    next_id: Cell<u64>,
}

impl InjectedProvider {
    /// Wrap `window.ethereum`, if a wallet injected one.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self::from_js(ethereum))
    }

    pub fn from_js(ethereum: JsValue) -> Self {
        let capabilities = ProviderCapabilities {
            events: function(&ethereum, "on").is_some(),
            disconnect: function(&ethereum, "disconnect").is_some(),
        };
        tracing::debug!(
            events = capabilities.events,
            disconnect = capabilities.disconnect,
            "injected provider capabilities"
        );
        Self {
            ethereum,
            capabilities,
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }
}

fn function(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn to_js(value: &Value) -> Result<JsValue, ProviderRpcError> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| ProviderRpcError::invalid_response(e.to_string()))
}

fn from_js(value: JsValue) -> Result<Value, ProviderRpcError> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| ProviderRpcError::invalid_response(e.to_string()))
}

/// Read `{code, message, data}` off whatever the provider threw.
fn rpc_error(err: JsValue) -> ProviderRpcError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).ok();
    let code = field("code")
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or(codes::INTERNAL);
    let message = field("message")
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    let data = field("data")
        .filter(|d| !d.is_undefined())
        .and_then(|d| serde_wasm_bindgen::from_value(d).ok());
    ProviderRpcError { code, message, data }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let request = function(&self.ethereum, "request").ok_or_else(|| ProviderRpcError::unsupported(method))?;
        let args = to_js(&json!({ "method": method, "params": params }))?;
        let pending = request.call1(&self.ethereum, &args).map_err(rpc_error)?;
        let result = JsFuture::from(Promise::resolve(&pending)).await.map_err(rpc_error)?;
        from_js(result)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Result<SubscriptionId, ProviderRpcError> {
        let on = function(&self.ethereum, "on").ok_or_else(|| ProviderRpcError::unsupported("on"))?;
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            match from_js(payload).and_then(|value| ProviderEvent::decode(kind, value)) {
                Ok(event) => handler(event),
                Err(err) => tracing::warn!(event = kind.as_str(), error = %err, "dropping malformed provider event"),
            }
        });
        on.call2(&self.ethereum, &JsValue::from_str(kind.as_str()), callback.as_ref())
            .map_err(rpc_error)?;

        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, Listener { kind, callback });
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let Some(listener) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        let remove = function(&self.ethereum, "removeListener").or_else(|| function(&self.ethereum, "off"));
        let removed = remove.map(|f| {
            f.call2(
                &self.ethereum,
                &JsValue::from_str(listener.kind.as_str()),
                listener.callback.as_ref(),
            )
            .is_ok()
        });
        if removed != Some(true) {
            // Still registered on the JS side: keep the closure alive. The
            // session handler behind it only holds a weak reference.
            tracing::warn!(event = listener.kind.as_str(), "could not remove provider listener");
            listener.callback.forget();
        }
    }

    async fn disconnect(&self) -> Result<(), ProviderRpcError> {
        let Some(disconnect) = function(&self.ethereum, "disconnect") else {
            return Ok(());
        };
        let pending = disconnect.call0(&self.ethereum).map_err(rpc_error)?;
        JsFuture::from(Promise::resolve(&pending)).await.map_err(rpc_error)?;
        Ok(())
    }
}

impl Drop for InjectedProvider {
    fn drop(&mut self) {
        let ids: Vec<SubscriptionId> = self.listeners.borrow().keys().copied().collect();
        for id in ids {
            self.unsubscribe(id);
        }
    }
}
