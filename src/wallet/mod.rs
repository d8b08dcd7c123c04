use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::bridge::protocol::WalletInfo;
use crate::utils::parse_float;

pub mod ops;
pub mod web3modal;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WalletError {
    #[error("walletProvider or address is undefined")]
    NotConnected,
    #[error("connection not set")]
    NoConnection,
    #[error("wallet call failed: {0}")]
    Js(String),
    #[error("unexpected wallet response: {0}")]
    Decode(String),
}

impl From<JsValue> for WalletError {
    fn from(value: JsValue) -> Self {
        let message = js_sys::Reflect::get(&value, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .or_else(|| value.as_string())
            .unwrap_or_else(|| format!("{:?}", value));
        WalletError::Js(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxVersion {
    Legacy,
    V0,
}

/// A single system-program transfer, built here and signed by the wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub lamports: u64,
    pub fee_payer: String,
    pub recent_blockhash: String,
    pub version: TxVersion,
}

/// Key custody, signing and RPC access, owned by the external wallet.
#[async_trait(?Send)]
pub trait WalletProvider {
    fn public_key(&self) -> Option<String>;
    fn has_connection(&self) -> bool;
    async fn balance_lamports(&self) -> Result<u64, WalletError>;
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError>;
    async fn latest_blockhash(&self) -> Result<String, WalletError>;
    async fn send_transfer(&self, transfer: &Transfer) -> Result<String, WalletError>;
}

/// What the rest of the page currently knows about the wallet.
#[derive(Clone, Default)]
pub struct Session {
    pub wallet: Option<Rc<dyn WalletProvider>>,
    pub address: Option<String>,
    pub chain_id: Option<String>,
    /// Balance in SOL, as shown on the page.
    pub balance: String,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.wallet.is_some()
    }

    /// Applies a provider update. The shown balance belongs to the previous
    /// account, so it is cleared whenever the wallet or address changes.
    pub fn switch_account(
        &mut self,
        wallet: Option<Rc<dyn WalletProvider>>,
        address: Option<String>,
        chain_id: Option<String>,
    ) {
        if wallet.is_none() || address != self.address {
            self.balance.clear();
        }
        self.wallet = wallet;
        self.address = address;
        self.chain_id = chain_id;
    }

    pub fn wallet_info(&self) -> WalletInfo {
        WalletInfo {
            address: self.address.clone(),
            balance: parse_float(&self.balance),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[test]
    fn connected_only_with_a_wallet() {
        assert!(!Session::default().is_connected());
        let session = session_with(Rc::new(MockWallet::connected("Addr1")), "1.5");
        assert!(session.is_connected());
    }

    #[test]
    fn wallet_info_parses_balance_text() {
        let session = session_with(Rc::new(MockWallet::connected("Addr1")), "2.0");
        assert_eq!(
            session.wallet_info(),
            WalletInfo { address: Some("Addr1".into()), balance: Some(2.0) }
        );
        assert_eq!(Session::default().wallet_info().balance, None);
    }

    #[test]
    fn account_switch_drops_previous_balance() {
        let first = Rc::new(MockWallet::connected("Addr1"));
        let mut session = session_with(first, "2.0");

        let second: Rc<dyn WalletProvider> = Rc::new(MockWallet::connected("Addr2"));
        session.switch_account(Some(second), Some("Addr2".into()), None);
        assert_eq!(
            session.wallet_info(),
            WalletInfo { address: Some("Addr2".into()), balance: None }
        );
    }

    #[test]
    fn same_account_update_keeps_balance() {
        let wallet = Rc::new(MockWallet::connected("Addr1"));
        let mut session = session_with(wallet.clone(), "2.0");
        session.switch_account(Some(wallet), Some("Addr1".into()), Some("devnet".into()));
        assert_eq!(session.balance, "2.0");
        assert_eq!(session.chain_id.as_deref(), Some("devnet"));

        session.switch_account(None, None, None);
        assert!(!session.is_connected());
        assert_eq!(session.balance, "");
    }

    #[test]
    fn transfer_serializes_for_the_wallet_glue() {
        let transfer = Transfer {
            from: "A".into(),
            to: "B".into(),
            lamports: 5,
            fee_payer: "A".into(),
            recent_blockhash: "H".into(),
            version: TxVersion::V0,
        };
        let json = serde_json::to_value(&transfer).unwrap();
        assert_eq!(json["recentBlockhash"], "H");
        assert_eq!(json["feePayer"], "A");
        assert_eq!(json["version"], "v0");
    }
}
