//! Message relay between the page and the embedded game.
//!
//! Outbound messages are best effort: anything sent before the game reports
//! ready is dropped. Inbound messages that fail to parse are logged and
//! dropped without a reply.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, info, warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Window};

use crate::wallet::Session;

pub mod protocol;
pub mod runtime;

use protocol::{
    Act, CyborList, GameRequest, MintError, OutboundMessage, GAME_CHANNEL_METHOD,
    GAME_CHANNEL_OBJECT, MINT_NOT_READY,
};
use runtime::GameRuntime;

/// Custom event the game build raises on `window` for every request.
pub const INBOUND_EVENT: &str = "MessageFromUnity";

pub struct Bridge<R: GameRuntime> {
    runtime: R,
    session: RefCell<Session>,
}

impl<R: GameRuntime> Bridge<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            session: RefCell::new(Session::default()),
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn update_session(&self, update: impl FnOnce(&mut Session)) {
        update(&mut self.session.borrow_mut());
    }

    /// Sends `payload` to the game under `act`. Dropped if the game is not ready.
    pub fn notify<P: Serialize + ?Sized>(&self, act: &str, payload: &P) {
        if !self.runtime.is_ready() {
            debug!("game not ready, dropping `{}`", act);
            return;
        }
        match OutboundMessage::new(act, payload).and_then(|msg| msg.encode()) {
            Ok(msg) => {
                debug!("CallUnity MSG: {}", msg);
                self.runtime
                    .send_message(GAME_CHANNEL_OBJECT, GAME_CHANNEL_METHOD, &msg);
            }
            Err(e) => error!("{}", e),
        }
    }

    pub fn notify_wallet_info(&self) {
        let info = self.session.borrow().wallet_info();
        info!("Wallet-Info: {:?} {:?}", info.address, info.balance);
        self.notify(Act::WalletInfo.as_ref(), &info);
    }

    /// Handles one raw request from the game.
    pub fn receive(&self, raw: &str) {
        debug!("message from game: {}", raw);
        match GameRequest::decode(raw) {
            Ok(request) => self.handle(request),
            Err(e) => debug!("dropping game message: {}", e),
        }
    }

    fn handle(&self, request: GameRequest) {
        match request {
            GameRequest::WalletInfo => self.notify_wallet_info(),
            GameRequest::AllMyCybors => {
                // TODO: read owned cybors once the on-chain program exposes them
                self.notify(Act::AllMyCybors.as_ref(), &CyborList::new());
            }
            GameRequest::MintCybor { race } => {
                let ready = {
                    let session = self.session.borrow();
                    session.address.is_some() && session.is_connected()
                };
                if ready {
                    info!("mint requested for race {:?}; minting is not available yet", race);
                } else {
                    error!("{}", MINT_NOT_READY);
                    self.notify(
                        Act::MintError.as_ref(),
                        &MintError { message: MINT_NOT_READY.to_string() },
                    );
                }
            }
            GameRequest::UplevelCybor { cybor_id } => {
                info!("uplevel_cybor: {:?}", cybor_id);
            }
            GameRequest::Unhandled(act) => {
                warn!("unhandled game request `{}`", act);
            }
        }
    }
}

impl<R: GameRuntime + 'static> Bridge<R> {
    /// Starts delivering the game's requests to this bridge until the
    /// returned listener is dropped.
    pub fn listen(self: &Rc<Self>) -> Result<InboundListener, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let bridge = Rc::downgrade(self);
        let callback = Closure::wrap(Box::new(move |event: CustomEvent| {
            let Some(bridge) = bridge.upgrade() else {
                return;
            };
            match event.detail().as_string() {
                Some(raw) => bridge.receive(&raw),
                None => debug!("dropping non-string game message"),
            }
        }) as Box<dyn FnMut(CustomEvent)>);
        window.add_event_listener_with_callback(INBOUND_EVENT, callback.as_ref().unchecked_ref())?;
        Ok(InboundListener { window, callback })
    }
}

pub struct InboundListener {
    window: Window,
    callback: Closure<dyn FnMut(CustomEvent)>,
}

impl Drop for InboundListener {
    fn drop(&mut self) {
        let _ = self.window.remove_event_listener_with_callback(
            INBOUND_EVENT,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}
