use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::entity::Cybor;

/// Unity object and method receiving host messages.
pub const GAME_CHANNEL_OBJECT: &str = "WebGLChannel";
pub const GAME_CHANNEL_METHOD: &str = "WaitReactCallMe";

pub const MINT_NOT_READY: &str = "Account is not ready to mint";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed game message: {0}")]
    MalformedMessage(#[source] serde_json::Error),
    #[error("malformed request body for `{act}`: {source}")]
    MalformedRequest {
        act: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode `{act}` payload: {source}")]
    Encode {
        act: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Event categories exchanged with the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Display)]
pub enum Act {
    #[strum(serialize = "wallet_info")]
    WalletInfo,
    #[strum(serialize = "all_my_cybors")]
    AllMyCybors,
    #[strum(serialize = "mint_cybor")]
    MintCybor,
    #[strum(serialize = "uplevel_cybor")]
    UplevelCybor,
    #[strum(serialize = "mint_error")]
    MintError,
}

/// Host to game wire shape. `Resp` holds the JSON encoded payload.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    #[serde(rename = "Act")]
    pub act: String,
    #[serde(rename = "Resp")]
    pub resp: String,
}

impl OutboundMessage {
    pub fn new<P: Serialize + ?Sized>(act: &str, payload: &P) -> Result<Self, BridgeError> {
        let resp = serde_json::to_string(payload).map_err(|source| BridgeError::Encode {
            act: act.to_string(),
            source,
        })?;
        Ok(Self { act: act.to_string(), resp })
    }

    pub fn encode(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(|source| BridgeError::Encode {
            act: self.act.clone(),
            source,
        })
    }
}

/// Game to host wire shape. `req` holds the JSON encoded request body.
#[derive(Debug, Deserialize)]
pub struct InboundRequest {
    pub act: String,
    pub req: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameRequest {
    WalletInfo,
    AllMyCybors,
    MintCybor { race: Option<String> },
    UplevelCybor { cybor_id: Option<Value> },
    Unhandled(String),
}

impl GameRequest {
    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        let request: InboundRequest =
            serde_json::from_str(raw).map_err(BridgeError::MalformedMessage)?;
        let body: Value =
            serde_json::from_str(&request.req).map_err(|source| BridgeError::MalformedRequest {
                act: request.act.clone(),
                source,
            })?;

        Ok(match Act::from_str(&request.act) {
            Ok(Act::WalletInfo) => GameRequest::WalletInfo,
            Ok(Act::AllMyCybors) => GameRequest::AllMyCybors,
            Ok(Act::MintCybor) => GameRequest::MintCybor {
                race: body.get("race").and_then(Value::as_str).map(str::to_lowercase),
            },
            Ok(Act::UplevelCybor) => GameRequest::UplevelCybor {
                cybor_id: body.get("cybor_id").cloned(),
            },
            Ok(Act::MintError) | Err(_) => GameRequest::Unhandled(request.act),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, serialize_with = "serialize_js_number")]
    pub balance: Option<f64>,
}

pub type CyborList = Vec<Cybor>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintError {
    pub message: String,
}

/// Numbers as the game's JSON parser expects them: integral values carry no
/// fraction and non-finite values become `null`.
fn serialize_js_number<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    match value {
        Some(v) if !v.is_finite() => serializer.serialize_none(),
        Some(v) if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER => {
            serializer.serialize_i64(*v as i64)
        }
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act_names_match_the_game_channel() {
        assert_eq!(Act::WalletInfo.as_ref(), "wallet_info");
        assert_eq!(Act::MintError.to_string(), "mint_error");
        assert_eq!(Act::from_str("uplevel_cybor").unwrap(), Act::UplevelCybor);
    }

    #[test]
    fn outbound_wraps_encoded_payload() {
        let msg = OutboundMessage::new("all_my_cybors", &CyborList::new()).unwrap();
        assert_eq!(msg.encode().unwrap(), r#"{"Act":"all_my_cybors","Resp":"[]"}"#);
    }

    #[test]
    fn wallet_info_decodes_on_the_game_side() {
        let info = WalletInfo { address: Some("Addr1".into()), balance: Some(1.5) };
        let msg = OutboundMessage::new(Act::WalletInfo.as_ref(), &info).unwrap();
        let wire = msg.encode().unwrap();

        let received: OutboundMessage = serde_json::from_str(&wire).unwrap();
        let decoded: WalletInfo = serde_json::from_str(&received.resp).unwrap();
        assert_eq!(decoded, WalletInfo { address: Some("Addr1".into()), balance: Some(1.5) });
    }

    #[test]
    fn wallet_info_drops_missing_address_and_nan_balance() {
        let info = WalletInfo { address: None, balance: Some(f64::NAN) };
        assert_eq!(serde_json::to_string(&info).unwrap(), r#"{"balance":null}"#);
    }

    #[test]
    fn integral_balance_has_no_fraction() {
        let info = WalletInfo { address: Some("A".into()), balance: Some(2.0) };
        assert_eq!(serde_json::to_string(&info).unwrap(), r#"{"address":"A","balance":2}"#);
    }

    #[test]
    fn decodes_known_requests() {
        let mint = GameRequest::decode(r#"{"act":"mint_cybor","req":"{\"race\":\"Human\"}"}"#).unwrap();
        assert_eq!(mint, GameRequest::MintCybor { race: Some("human".into()) });

        let up = GameRequest::decode(r#"{"act":"uplevel_cybor","req":"{\"cybor_id\":42}"}"#).unwrap();
        assert_eq!(up, GameRequest::UplevelCybor { cybor_id: Some(Value::from(42)) });
    }

    #[test]
    fn unknown_and_outbound_only_acts_are_unhandled() {
        let req = GameRequest::decode(r#"{"act":"unknown_thing","req":"{}"}"#).unwrap();
        assert_eq!(req, GameRequest::Unhandled("unknown_thing".into()));
        let req = GameRequest::decode(r#"{"act":"mint_error","req":"{}"}"#).unwrap();
        assert_eq!(req, GameRequest::Unhandled("mint_error".into()));
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = GameRequest::decode(r#"{"act":"wallet_info","req":"{oops"}"#).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedRequest { ref act, .. } if act == "wallet_info"));
        let err = GameRequest::decode("not json").unwrap_err();
        assert!(matches!(err, BridgeError::MalformedMessage(_)));
    }
}
