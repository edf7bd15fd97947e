//! WalletWidget: binds a WalletSession to the page.
//!
//! # Usage from JavaScript
//!
//! ```javascript
//! import init, { WalletWidget } from 'wallet_session';
//!
//! await init();
//! // Binds #connectWallet, #disconnectWallet, #copyAddressBtn, ...
//! const widget = new WalletWidget();
//!
//! // Or with other element ids / extra networks
//! const widget = new WalletWidget({
//!     elements: { connectButton: 'login' },
//!     session: { networks: [{ chainId: '0x539', name: 'Local Devnet' }] },
//! });
//!
//! const snapshot = widget.snapshot(); // { status, account, chainId, network, balance, ... }
//! ```

use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlElement};

use super::provider::InjectedProvider;
use super::spawner::BrowserSpawner;
use crate::core::notice::Notice;
use crate::core::widget::WidgetConfig;
use crate::session::{ListenerId, SessionSnapshot, WalletProvider, WalletSession};

/// DOM side of the widget: element lookup, notices, rendering.
struct Page {
    document: Document,
    config: WidgetConfig,
    /// Incremented per notice; a delayed hide only applies to its own notice.
    notice_seq: Cell<u64>,
    last_account: RefCell<Option<String>>,
}

impl Page {
    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn show_notice(self: &Rc<Self>, notice: &Notice) {
        let ids = &self.config.elements;
        let Some(alert) = self.element(&ids.status) else {
            tracing::warn!(element = %ids.status, notice = %notice.text, "status element missing");
            return;
        };
        alert.set_class_name(&self.config.alert_class_for(notice.level.as_str()));
        self.set_text(&ids.status_message, &notice.text);

        let seq = self.notice_seq.get() + 1;
        self.notice_seq.set(seq);
        if notice.auto_hides() {
            self.hide_later(seq);
        }
    }

    fn hide_later(self: &Rc<Self>, seq: u64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let page = Rc::clone(self);
        let callback = Closure::once_into_js(move || {
            if page.notice_seq.get() != seq {
                return;
            }
            if let Some(alert) = page.element(&page.config.elements.status) {
                let _ = alert.class_list().add_1(&page.config.hidden_class);
            }
        });
        let delay = i32::try_from(self.config.success_hide_ms).unwrap_or(i32::MAX);
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay) {
            tracing::warn!(error = ?e, "could not schedule notice hide");
        }
    }

    fn render(self: &Rc<Self>, snapshot: &SessionSnapshot) {
        let ids = &self.config.elements;
        if let Some(info) = self.element(&ids.wallet_info) {
            let classes = info.class_list();
            let _ = if snapshot.is_connected() {
                classes.remove_1(&self.config.hidden_class)
            } else {
                classes.add_1(&self.config.hidden_class)
            };
        }
        self.set_text(&ids.wallet_address, snapshot.account.as_deref().unwrap_or_default());
        self.set_text(&ids.network_name, snapshot.network.as_deref().unwrap_or_default());
        self.set_text(&ids.balance, snapshot.balance.as_deref().unwrap_or_default());

        let switched = {
            let mut last = self.last_account.borrow_mut();
            let switched = matches!(
                (last.as_deref(), snapshot.account.as_deref()),
                (Some(prev), Some(now)) if prev != now
            );
            *last = snapshot.account.clone();
            switched
        };
        if switched {
            self.show_notice(&Notice::account_changed());
        }
    }
}

async fn run_connect(session: WalletSession, page: Rc<Page>) -> Result<SessionSnapshot, JsValue> {
    page.show_notice(&Notice::connecting());
    match session.connect().await {
        Ok(snapshot) => {
            page.show_notice(&Notice::connected());
            Ok(snapshot)
        }
        Err(err) => {
            page.show_notice(&Notice::from_error(&err, &page.config.install_url));
            Err(JsValue::from_str(&format!("{}", err)))
        }
    }
}

async fn run_disconnect(session: WalletSession, page: Rc<Page>) {
    session.disconnect().await;
    page.show_notice(&Notice::disconnected());
}

async fn run_copy(session: WalletSession, page: Rc<Page>) {
    let Some(account) = session.account() else {
        return;
    };
    match write_clipboard(&account).await {
        Ok(()) => page.show_notice(&Notice::copied()),
        Err(reason) => page.show_notice(&Notice::copy_failed(&reason)),
    }
}

async fn write_clipboard(text: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let clipboard = Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))
        .map_err(|e| format!("{:?}", e))?;
    let write = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or("clipboard unavailable")?;
    let pending = write
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(|e| format!("{:?}", e))?;
    JsFuture::from(Promise::resolve(&pending))
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| format!("{:?}", e)))?;
    Ok(())
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).unwrap_or(JsValue::NULL)
}

/// Wallet connect widget with JS bindings
#[wasm_bindgen]
pub struct WalletWidget {
    session: WalletSession,
    page: Rc<Page>,
    observers: Vec<ListenerId>,
    handlers: Vec<(HtmlElement, Closure<dyn FnMut()>)>,
}

#[wasm_bindgen]
impl WalletWidget {
    /// Bind to the page. `config` is an optional partial WidgetConfig object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WalletWidget, JsValue> {
        let config: WidgetConfig = if config.is_undefined() || config.is_null() {
            WidgetConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let provider = InjectedProvider::detect().map(|p| Rc::new(p) as Rc<dyn WalletProvider>);
        tracing::info!(detected = provider.is_some(), "wallet provider lookup");
        let session = WalletSession::with_config(provider, Rc::new(BrowserSpawner), config.session.clone());

        let page = Rc::new(Page {
            document,
            config,
            notice_seq: Cell::new(0),
            last_account: RefCell::new(None),
        });

        let mut widget = Self {
            session,
            page,
            observers: Vec::new(),
            handlers: Vec::new(),
        };
        widget.bind()?;
        widget.page.render(&widget.session.snapshot());
        Ok(widget)
    }

    fn bind(&mut self) -> Result<(), JsValue> {
        let page = self.page.clone();
        self.observers.push(self.session.subscribe(move |snapshot| page.render(snapshot)));

        let page = self.page.clone();
        self.observers.push(self.session.on_error(move |err| {
            page.show_notice(&Notice::from_error(err, &page.config.install_url))
        }));

        let ids = self.page.config.elements.clone();

        let (session, page) = (self.session.clone(), self.page.clone());
        self.bind_click(&ids.connect_button, move || {
            let (session, page) = (session.clone(), page.clone());
            spawn_local(async move {
                let _ = run_connect(session, page).await;
            });
        })?;

        let (session, page) = (self.session.clone(), self.page.clone());
        self.bind_click(&ids.disconnect_button, move || {
            spawn_local(run_disconnect(session.clone(), page.clone()));
        })?;

        let (session, page) = (self.session.clone(), self.page.clone());
        self.bind_click(&ids.copy_button, move || {
            spawn_local(run_copy(session.clone(), page.clone()));
        })?;

        Ok(())
    }

    fn bind_click(&mut self, id: &str, action: impl FnMut() + 'static) -> Result<(), JsValue> {
        let element: HtmlElement = self
            .page
            .element(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing element #{}", id)))?
            .dyn_into()
            .map_err(|_| JsValue::from_str(&format!("#{} is not an HTML element", id)))?;
        let closure = Closure::<dyn FnMut()>::new(action);
        element.set_onclick(Some(closure.as_ref().unchecked_ref()));
        self.handlers.push((element, closure));
        Ok(())
    }

    /// Connect (always prompts the wallet). Resolves to the snapshot.
    #[wasm_bindgen]
    pub async fn connect(&self) -> Result<JsValue, JsValue> {
        let snapshot = run_connect(self.session.clone(), self.page.clone()).await?;
        Ok(to_js(&snapshot))
    }

    #[wasm_bindgen]
    pub async fn disconnect(&self) {
        run_disconnect(self.session.clone(), self.page.clone()).await;
    }

    /// Re-read chain and balance.
    #[wasm_bindgen]
    pub async fn refresh(&self) -> Result<JsValue, JsValue> {
        self.session
            .refresh()
            .await
            .map_err(|e| JsValue::from_str(&format!("{}", e)))?;
        Ok(self.snapshot())
    }

    #[wasm_bindgen]
    pub fn snapshot(&self) -> JsValue {
        to_js(&self.session.snapshot())
    }

    #[wasm_bindgen(js_name = "hasProvider")]
    pub fn has_provider(&self) -> bool {
        self.session.has_provider()
    }

    /// Unbind from the page and drop provider subscriptions.
    #[wasm_bindgen]
    pub fn close(&mut self) {
        for (element, _) in self.handlers.drain(..) {
            element.set_onclick(None);
        }
        for id in self.observers.drain(..) {
            self.session.unsubscribe(id);
        }
        let session = self.session.clone();
        spawn_local(async move { session.close().await });
    }
}
