use super::*;

pub(super) fn load_config(path: Option<&Path>) -> Result<Config> {
    let file = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            toml::from_str(&contents).context("parse config")?
        }
        None => ConfigFile::default(),
    };
    resolve_config(file, |key| std::env::var(key).ok())
}

/// Merges the config file with environment overrides and validates the result.
/// Anything wrong here is fatal: the bot must not start half-configured.
pub(super) fn resolve_config<F>(file: ConfigFile, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let token = non_empty(env("BOT_TOKEN"))
        .or_else(|| non_empty(file.token))
        .ok_or_else(|| anyhow!("BOT_TOKEN is not set; refusing to start"))?;

    let store = resolve_store(file.store, &env)?;
    let http_timeout = Duration::from_secs(
        file.http_timeout_seconds
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .max(1),
    );

    let mut audio_raw = default_audio();
    audio_raw.extend(file.audio);
    let mut images_raw = default_images();
    images_raw.extend(file.images);
    let audio = parse_asset_table(audio_raw, "audio")?;
    let images = parse_asset_table(images_raw, "image")?;

    let trigger_files = if file.triggers.is_empty() {
        default_triggers()
    } else {
        file.triggers
    };
    let triggers = trigger_files
        .into_iter()
        .map(|raw| build_trigger(raw, &audio, &images))
        .collect::<Result<Vec<_>>>()?;

    Ok(Config {
        token,
        store,
        http_timeout,
        triggers,
        audio,
        images,
    })
}

fn resolve_store<F>(file: StoreFile, env: &F) -> Result<StoreConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let backend = match non_empty(env("STORE_BACKEND")) {
        Some(raw) => Some(parse_backend(&raw)?),
        None => file.backend,
    };
    let api_key = non_empty(env("JSONBIN_API_KEY")).or_else(|| non_empty(file.api_key));
    let bin_id = non_empty(env("JSONBIN_BIN_ID")).or_else(|| non_empty(file.bin_id));

    let backend = backend.unwrap_or(if api_key.is_some() && bin_id.is_some() {
        BackendKind::Remote
    } else {
        BackendKind::Local
    });

    match backend {
        BackendKind::Local => {
            let path = non_empty(env("DATA_FILE"))
                .map(PathBuf::from)
                .or(file.data_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
            Ok(StoreConfig::Local { path })
        }
        BackendKind::Remote => {
            let api_key = api_key
                .ok_or_else(|| anyhow!("remote store selected but JSONBIN_API_KEY is not set"))?;
            let bin_id = bin_id
                .ok_or_else(|| anyhow!("remote store selected but JSONBIN_BIN_ID is not set"))?;
            let raw_url = non_empty(env("JSONBIN_BASE_URL"))
                .or_else(|| non_empty(file.base_url))
                .unwrap_or_else(|| DEFAULT_JSONBIN_BASE_URL.to_string());
            let base_url = Url::parse(&raw_url)
                .with_context(|| format!("parse store base_url {}", raw_url))?;
            Ok(StoreConfig::Remote {
                base_url,
                api_key,
                bin_id,
            })
        }
    }
}

fn parse_backend(raw: &str) -> Result<BackendKind> {
    match raw.trim().to_lowercase().as_str() {
        "local" => Ok(BackendKind::Local),
        "remote" => Ok(BackendKind::Remote),
        other => Err(anyhow!(
            "unknown STORE_BACKEND {:?} (expected local or remote)",
            other
        )),
    }
}

fn parse_asset_table(raw: HashMap<String, String>, kind: &str) -> Result<HashMap<String, Url>> {
    raw.into_iter()
        .map(|(key, url)| -> Result<(String, Url)> {
            let parsed = Url::parse(url.trim())
                .with_context(|| format!("parse {} asset {:?} url {}", kind, key, url))?;
            Ok((key, parsed))
        })
        .collect()
}

fn build_trigger(
    raw: TriggerFile,
    audio: &HashMap<String, Url>,
    images: &HashMap<String, Url>,
) -> Result<Trigger> {
    let phrase = raw.phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return Err(anyhow!("trigger phrase must not be empty"));
    }

    let text = match (raw.variants, non_empty(raw.text)) {
        (Some(variants), _) => {
            let variants: Vec<String> = variants
                .into_iter()
                .filter(|v| !v.trim().is_empty())
                .collect();
            if variants.is_empty() {
                return Err(anyhow!("trigger {:?} has an empty variants list", phrase));
            }
            Some(ReplyText::Variants(variants))
        }
        (None, Some(text)) => Some(ReplyText::Fixed(text)),
        (None, None) => None,
    };

    if let Some(key) = &raw.audio {
        if !audio.contains_key(key) {
            return Err(anyhow!("trigger {:?} references unknown audio {:?}", phrase, key));
        }
    }
    if let Some(key) = &raw.image {
        if !images.contains_key(key) {
            return Err(anyhow!("trigger {:?} references unknown image {:?}", phrase, key));
        }
    }
    if text.is_none() && raw.audio.is_none() && raw.image.is_none() {
        return Err(anyhow!("trigger {:?} has nothing to reply with", phrase));
    }

    Ok(Trigger {
        phrase,
        response: Response {
            text,
            audio: raw.audio,
            image: raw.image,
        },
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A `/name[@bot]` command. The name is lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct BotCommand<'a> {
    pub(super) name: String,
    pub(super) addressee: Option<&'a str>,
}

impl BotCommand<'_> {
    pub(super) fn is_for(&self, bot_username: &str) -> bool {
        self.addressee
            .map_or(true, |addressee| addressee.eq_ignore_ascii_case(bot_username))
    }
}

pub(super) fn parse_command(text: &str) -> Option<BotCommand<'_>> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    let cmd = first.trim_start_matches('/');
    let (name, addressee) = match cmd.split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (cmd, None),
    };
    Some(BotCommand {
        name: name.to_lowercase(),
        addressee,
    })
}

pub(super) fn command_rest(text: &str) -> &str {
    text.splitn(2, |c: char| c.is_whitespace())
        .nth(1)
        .unwrap_or("")
        .trim()
}

pub(super) fn preview_for_log(text: &str) -> String {
    let mut preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview.replace('\n', " ")
}

/// Splits `text` into messages of at most `limit` UTF-16 units, breaking on
/// newlines. A single line longer than `limit` is cut wherever it must be.
pub(super) fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    if utf16_len(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for line in text.split('\n') {
        let line_len = utf16_len(line);
        if line_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current_len = 0;
            for ch in line.chars() {
                if current_len + ch.len_utf16() > limit {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += ch.len_utf16();
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(line);
            current_len = line_len;
        } else if current_len + 1 + line_len > limit {
            chunks.push(std::mem::replace(&mut current, line.to_string()));
            current_len = line_len;
        } else {
            current.push('\n');
            current.push_str(line);
            current_len += 1 + line_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
