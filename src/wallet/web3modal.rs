use async_trait::async_trait;
use js_sys::Uint8Array;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use super::{Transfer, WalletError, WalletProvider};
use crate::config::Config;

#[wasm_bindgen(module = "/src/wallet/web3modal.js")]
extern "C" {
    #[wasm_bindgen(catch, js_name = initModal)]
    fn init_modal(project_id: &str, metadata: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = subscribeWallet)]
    fn subscribe_wallet(callback: &Closure<dyn FnMut(JsValue)>) -> Result<js_sys::Function, JsValue>;

    #[wasm_bindgen(js_name = publicKey)]
    fn public_key() -> Option<String>;

    #[wasm_bindgen(js_name = hasConnection)]
    fn has_connection() -> bool;

    #[wasm_bindgen(catch, js_name = getBalance)]
    async fn get_balance() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = signMessage)]
    async fn sign_message(bytes: &Uint8Array) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = getLatestBlockhash)]
    async fn get_latest_blockhash() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = sendTransfer)]
    async fn send_transfer(transfer: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
    description: &'a str,
    url: &'a str,
    icons: [&'a str; 1],
}

/// Wallet state pushed by the modal whenever the provider changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletEvent {
    pub address: Option<String>,
    pub chain_id: Option<String>,
    pub has_provider: bool,
}

/// Creates the connect modal. Must run once before any wallet call.
pub fn init(config: &Config) -> Result<(), JsValue> {
    let metadata = serde_wasm_bindgen::to_value(&Metadata {
        name: &config.app_name,
        description: &config.app_description,
        url: &config.app_url,
        icons: [&config.app_icon],
    })?;
    init_modal(&config.project_id, &metadata)
}

/// Keeps a callback registered until dropped. `unsubscribe` runs before the
/// handle is released, so the other side never calls into a freed callback.
pub struct Subscription<H> {
    unsubscribe: Option<Box<dyn FnOnce()>>,
    _handle: H,
}

impl<H> Subscription<H> {
    pub fn new(handle: H, unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
            _handle: handle,
        }
    }
}

impl<H> Drop for Subscription<H> {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

pub type WalletSubscription = Subscription<Closure<dyn FnMut(JsValue)>>;

/// Registers `on_change` for provider updates until the subscription is dropped.
pub fn subscribe(
    mut on_change: impl FnMut(WalletEvent) + 'static,
) -> Result<WalletSubscription, JsValue> {
    let callback = Closure::wrap(Box::new(move |state: JsValue| {
        match serde_wasm_bindgen::from_value::<WalletEvent>(state) {
            Ok(event) => {
                debug!("wallet event: {:?}", event);
                on_change(event)
            }
            Err(e) => error!("unreadable wallet event: {}", e),
        }
    }) as Box<dyn FnMut(JsValue)>);
    let unsubscribe = subscribe_wallet(&callback)?;
    Ok(Subscription::new(callback, move || {
        if let Err(e) = unsubscribe.call0(&JsValue::NULL) {
            error!("wallet unsubscribe failed: {:?}", e);
        }
    }))
}

/// The provider behind the Web3Modal session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Web3ModalWallet;

#[async_trait(?Send)]
impl WalletProvider for Web3ModalWallet {
    fn public_key(&self) -> Option<String> {
        public_key()
    }

    fn has_connection(&self) -> bool {
        has_connection()
    }

    async fn balance_lamports(&self) -> Result<u64, WalletError> {
        let value = get_balance().await?;
        value
            .as_f64()
            .map(|lamports| lamports as u64)
            .ok_or_else(|| WalletError::Decode(format!("balance {:?}", value)))
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        let signature = sign_message(&Uint8Array::from(message)).await?;
        Ok(Uint8Array::new(&signature).to_vec())
    }

    async fn latest_blockhash(&self) -> Result<String, WalletError> {
        let value = get_latest_blockhash().await?;
        value
            .as_string()
            .ok_or_else(|| WalletError::Decode(format!("blockhash {:?}", value)))
    }

    async fn send_transfer(&self, transfer: &Transfer) -> Result<String, WalletError> {
        let transfer = serde_wasm_bindgen::to_value(transfer)
            .map_err(|e| WalletError::Decode(e.to_string()))?;
        let value = send_transfer(transfer).await?;
        value
            .as_string()
            .ok_or_else(|| WalletError::Decode(format!("signature {:?}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Handle(Rc<RefCell<Vec<&'static str>>>);

    impl Drop for Handle {
        fn drop(&mut self) {
            self.0.borrow_mut().push("released");
        }
    }

    #[test]
    fn unsubscribes_before_releasing_the_callback() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let unsubscribe_log = log.clone();
        let subscription = Subscription::new(Handle(log.clone()), move || {
            unsubscribe_log.borrow_mut().push("unsubscribed")
        });
        assert!(log.borrow().is_empty());

        drop(subscription);
        assert_eq!(*log.borrow(), vec!["unsubscribed", "released"]);
    }
}
