use std::rc::Rc;

use log::info;

use super::{Session, Transfer, TxVersion, WalletError, WalletProvider};
use crate::utils::{format_number, lamports_to_sol};

pub const GREETING: &str = "Cybor Solana";
pub const RECIPIENT: &str = "DG1Bq6muEMqaW6MHzWZFfQ8MmHiwvEuQcjVefVmPoV3j";
/// 0.01 SOL
pub const TRANSFER_LAMPORTS: u64 = 10_000_000;
pub const BALANCE_REFRESH_MS: u32 = 8_000;

fn signer(session: &Session) -> Result<(&Rc<dyn WalletProvider>, &str), WalletError> {
    match (&session.wallet, &session.address) {
        (Some(wallet), Some(address)) => Ok((wallet, address.as_str())),
        _ => Err(WalletError::NotConnected),
    }
}

fn with_connection(session: &Session) -> Result<(&Rc<dyn WalletProvider>, &str), WalletError> {
    if !session.wallet.as_ref().is_some_and(|w| w.has_connection()) {
        return Err(WalletError::NoConnection);
    }
    signer(session)
}

/// Current balance in SOL, formatted for display.
pub async fn fetch_balance(session: &Session) -> Result<String, WalletError> {
    let (wallet, _) = signer(session)?;
    if !wallet.has_connection() {
        return Err(WalletError::NotConnected);
    }
    let lamports = wallet.balance_lamports().await?;
    let sol = format_number(lamports_to_sol(lamports));
    info!("Balance: {} SOL", sol);
    Ok(sol)
}

/// Signs the greeting and returns the base58 signature.
pub async fn sign_greeting(session: &Session) -> Result<String, WalletError> {
    let (wallet, _) = signer(session)?;
    let signature = wallet.sign_message(GREETING.as_bytes()).await?;
    Ok(bs58::encode(signature).into_string())
}

pub fn transfer_to_recipient(from: &str, recent_blockhash: String, version: TxVersion) -> Transfer {
    Transfer {
        from: from.to_string(),
        to: RECIPIENT.to_string(),
        lamports: TRANSFER_LAMPORTS,
        fee_payer: from.to_string(),
        recent_blockhash,
        version,
    }
}

/// Sends 0.01 SOL to the demo recipient and returns the transaction signature.
pub async fn send_transfer(session: &Session, version: TxVersion) -> Result<String, WalletError> {
    let (wallet, _) = with_connection(session)?;
    let from = wallet.public_key().ok_or(WalletError::NotConnected)?;
    let blockhash = wallet.latest_blockhash().await?;
    let transfer = transfer_to_recipient(&from, blockhash, version);
    let signature = wallet.send_transfer(&transfer).await?;
    info!("{:?} transfer sent: {}", version, signature);
    Ok(signature)
}

/// No contract reads exist yet; only the preconditions are checked.
pub fn read_contract(session: &Session) -> Result<(), WalletError> {
    with_connection(session).map(|_| ())
}
