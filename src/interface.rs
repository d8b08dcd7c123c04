use std::rc::Rc;

// Frontend
use bounce::*;
use gloo_timers::callback::Timeout;
use log::{error, info};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, HtmlTextAreaElement};
use yew::prelude::*;
use yew::{function_component, html, Html, Properties};
use yew_hooks::use_window_size;

use crate::bridge::runtime::UnityRuntime;
use crate::bridge::Bridge;
use crate::config::{Config, UnityBuild, FAUCET_URL, GITHUB_URL, WEBSITE_URL};
use crate::utils::game_container_size;
use crate::wallet::ops::{self, BALANCE_REFRESH_MS};
use crate::wallet::web3modal::{self, Web3ModalWallet};
use crate::wallet::{Session, TxVersion, WalletProvider};

// what the page renders about the wallet, mirrored from the bridge session
#[derive(Clone, PartialEq, Default, Atom)]
struct WalletState {
    connected: bool,
    address: Option<String>,
    chain_id: Option<String>,
    balance: String,
}

impl From<&Session> for WalletState {
    fn from(session: &Session) -> Self {
        Self {
            connected: session.is_connected(),
            address: session.address.clone(),
            chain_id: session.chain_id.clone(),
            balance: session.balance.clone(),
        }
    }
}

#[derive(Clone, PartialEq, Default, Atom)]
struct GameLoaded(bool);

/// Handles shared by the page's buttons and effects.
#[derive(Clone)]
struct Page {
    bridge: Rc<Bridge<UnityRuntime>>,
    wallet: UseAtomHandle<WalletState>,
    console: NodeRef,
}

impl Page {
    fn print(&self, msg: &str) {
        if let Some(console) = self.console.cast::<HtmlTextAreaElement>() {
            console.set_value(msg);
        }
        info!("{}", msg);
    }

    fn sync(&self) {
        self.wallet.set(WalletState::from(&self.bridge.session()));
    }

    fn refresh_balance(&self) {
        let page = self.clone();
        spawn_local(async move {
            match ops::fetch_balance(&page.bridge.session()).await {
                Ok(sol) => {
                    page.bridge.update_session(|s| s.balance = sol);
                    page.sync();
                }
                Err(e) => page.print(&e.to_string()),
            }
        });
    }

    fn sign(&self) {
        let page = self.clone();
        spawn_local(async move {
            match ops::sign_greeting(&page.bridge.session()).await {
                Ok(signature) => page.print(&format!("Signature: {}", signature)),
                Err(e) => page.print(&e.to_string()),
            }
        });
    }

    fn transfer(&self, version: TxVersion) {
        let page = self.clone();
        spawn_local(async move {
            match ops::send_transfer(&page.bridge.session(), version).await {
                Ok(signature) => {
                    let later = page.clone();
                    Timeout::new(BALANCE_REFRESH_MS, move || later.refresh_balance()).forget();
                    page.print(&signature);
                }
                Err(e) => {
                    error!("transfer failed: {}", e);
                    page.print(&e.to_string());
                }
            }
        });
    }
}

fn open_faucet() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.open_with_url_and_target(FAUCET_URL, "_blank") {
            error!("could not open faucet: {:?}", e);
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct MainProps {
    pub config: Rc<Config>,
}

#[function_component(Main)]
pub fn main(props: &MainProps) -> Html {
    let wallet_state = use_atom::<WalletState>();
    let game_loaded = use_atom::<GameLoaded>();
    let bridge = use_memo((), |_| Bridge::new(UnityRuntime::new()));
    let console = use_node_ref();
    let page = Page {
        bridge: bridge.clone(),
        wallet: wallet_state.clone(),
        console: console.clone(),
    };

    // game requests
    {
        let bridge = bridge.clone();
        use_effect_with((), move |_| {
            let listener = bridge
                .listen()
                .map_err(|e| error!("could not listen for game messages: {:?}", e))
                .ok();
            move || drop(listener)
        });
    }

    // wallet provider changes
    {
        let page = page.clone();
        use_effect_with((), move |_| {
            let subscription = web3modal::subscribe(move |event| {
                let wallet = event
                    .has_provider
                    .then(|| Rc::new(Web3ModalWallet) as Rc<dyn WalletProvider>);
                page.bridge
                    .update_session(|s| s.switch_account(wallet, event.address, event.chain_id));
                page.sync();
            })
            .map_err(|e| error!("could not subscribe to wallet: {:?}", e))
            .ok();
            move || drop(subscription)
        });
    }

    {
        let page = page.clone();
        let account = (wallet_state.connected, wallet_state.address.clone());
        use_effect_with(account, move |(connected, _)| {
            if *connected {
                page.refresh_balance();
            }
        });
    }

    // keep the game's view of the wallet current
    {
        let bridge = bridge.clone();
        use_effect_with(((*wallet_state).clone(), game_loaded.0), move |(_, loaded)| {
            if *loaded {
                bridge.notify_wallet_info();
            }
        });
    }

    let (window_width, window_height) = use_window_size();
    let (width, height) = game_container_size(window_width, window_height);

    let on_ready = {
        let game_loaded = game_loaded.clone();
        Callback::from(move |loaded: bool| game_loaded.set(GameLoaded(loaded)))
    };
    let on_faucet = Callback::from(|_: MouseEvent| open_faucet());
    let on_balance = {
        let page = page.clone();
        Callback::from(move |_: MouseEvent| page.refresh_balance())
    };
    let on_sign = {
        let page = page.clone();
        Callback::from(move |_: MouseEvent| page.sign())
    };
    let on_legacy = {
        let page = page.clone();
        Callback::from(move |_: MouseEvent| page.transfer(TxVersion::Legacy))
    };
    let on_v0 = {
        let page = page.clone();
        Callback::from(move |_: MouseEvent| page.transfer(TxVersion::V0))
    };

    html! {
        <div class={classes!("App", "center-content")}>
            <h2>{"Cybor + Solana"}</h2>
            <p>
                <w3m-button balance="hide" />
            </p>
            { if wallet_state.connected {
                html! {
                    <>
                    <div class={classes!("btn-container")}>
                        <p>{"Balance: "}{ &wallet_state.balance }</p>
                        <button onclick={on_faucet}>{"Solana faucet"}</button>
                        <button onclick={on_balance}>{"Update Balance"}</button>
                        <button onclick={on_sign}>{"Sign MSG"}</button>
                        <button onclick={on_legacy}>{"Mint Rodriguez"}</button>
                        <button onclick={on_v0}>{"Mint Nguyen"}</button>
                    </div>
                    <br/>
                    <div style={format!("width: {}px; height: {}px", width, height)}>
                        <Game
                            runtime={bridge.runtime().clone()}
                            build={props.config.build.clone()}
                            on_ready={on_ready}
                        />
                        <textarea class={classes!("console")} ref={console} readonly={true}></textarea>
                    </div>
                    </>
                }
            } else {
                html! {}
            }}
            <a href={WEBSITE_URL} target="_blank">{"Web site"}</a>
            {"\u{00a0}\u{00a0}\u{00a0}"}
            <a href={GITHUB_URL} target="_blank">{"Github"}</a>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GameProps {
    pub runtime: UnityRuntime,
    pub build: UnityBuild,
    pub on_ready: Callback<bool>,
}

#[function_component(Game)]
pub fn game(props: &GameProps) -> Html {
    let canvas_ref = use_node_ref();
    {
        let canvas_ref = canvas_ref.clone();
        let runtime = props.runtime.clone();
        let build = props.build.clone();
        let on_ready = props.on_ready.clone();
        use_effect_with((), move |_| {
            match canvas_ref.cast::<HtmlCanvasElement>() {
                Some(canvas) => {
                    let ready = on_ready.clone();
                    if let Err(e) = runtime.load(canvas, &build, move || ready.emit(true)) {
                        error!("could not load game: {:?}", e);
                    }
                }
                None => error!("game canvas missing"),
            }
            move || {
                runtime.unload();
                on_ready.emit(false);
            }
        });
    }
    html! {
        <canvas
            id="unity-canvas"
            ref={canvas_ref}
            style="width: 90%; height: 80%; padding-top: 0%; padding-left: 1%; padding-right: 0%"
        />
    }
}
