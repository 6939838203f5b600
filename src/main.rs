use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message};
use tokio::sync::Mutex;

mod defaults;
mod entries;
mod helpers;
mod message_handlers;
mod responder;
mod store;

use defaults::*;
use entries::*;
use helpers::*;
use message_handlers::*;
use responder::*;
use store::*;

const DEFAULT_DATA_FILE: &str = "kitaplar.json";
const DEFAULT_JSONBIN_BASE_URL: &str = "https://api.jsonbin.io/v3";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
const EXPORT_FILENAME: &str = "kitaplar.json";
const LOG_PREVIEW_CHARS: usize = 120;
const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Clone)]
struct Config {
    token: String,
    store: StoreConfig,
    http_timeout: Duration,
    triggers: Vec<Trigger>,
    audio: HashMap<String, Url>,
    images: HashMap<String, Url>,
}

#[derive(Debug, Clone, PartialEq)]
enum StoreConfig {
    Local {
        path: PathBuf,
    },
    Remote {
        base_url: Url,
        api_key: String,
        bin_id: String,
    },
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    token: Option<String>,
    http_timeout_seconds: Option<u64>,
    #[serde(default)]
    store: StoreFile,
    #[serde(default)]
    audio: HashMap<String, String>,
    #[serde(default)]
    images: HashMap<String, String>,
    #[serde(default)]
    triggers: Vec<TriggerFile>,
}

#[derive(Debug, Deserialize, Default)]
struct StoreFile {
    backend: Option<BackendKind>,
    data_file: Option<PathBuf>,
    api_key: Option<String>,
    bin_id: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum BackendKind {
    Local,
    Remote,
}

#[derive(Debug, Deserialize, Clone)]
struct TriggerFile {
    phrase: String,
    text: Option<String>,
    variants: Option<Vec<String>>,
    audio: Option<String>,
    image: Option<String>,
}

#[derive(Parser, Debug)]
struct Args {
    /// Optional TOML file with store settings, assets and triggers.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// A lowercase phrase and the response it fires.
#[derive(Debug, Clone, PartialEq)]
struct Trigger {
    phrase: String,
    response: Response,
}

#[derive(Debug, Clone, PartialEq)]
struct Response {
    text: Option<ReplyText>,
    audio: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum ReplyText {
    Fixed(String),
    /// Never empty; one is drawn per firing.
    Variants(Vec<String>),
}

struct AppState {
    config: Config,
    store: EntryStore,
    http: reqwest::Client,
    rng: Mutex<StdRng>,
    // Held across load -> mutate -> save so commands in this process never
    // overwrite each other. Separate processes sharing a backend still can.
    write_lock: Mutex<()>,
    // Commands addressed as `/cmd@other_bot` are left alone.
    bot_username: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("build http client")?;
    let store = EntryStore::from_config(&config.store, http.clone());
    info!(
        "starting with {} store, {} triggers",
        store.describe(),
        config.triggers.len()
    );

    let bot = Bot::new(config.token.clone());
    let me = bot.get_me().await.context("fetch bot identity")?;
    let bot_username = me.username().to_string();
    info!("logged in as @{}", bot_username);

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        http,
        rng: Mutex::new(StdRng::from_entropy()),
        write_lock: Mutex::new(()),
        bot_username,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
