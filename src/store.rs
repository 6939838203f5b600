use super::*;

/// Where the entry list lives. Reads never fail: a backend that cannot be read
/// yields an empty list and a warning in the log.
pub(super) enum EntryStore {
    Local(LocalFileStore),
    Remote(RemoteStore),
}

impl EntryStore {
    pub(super) fn from_config(config: &StoreConfig, http: reqwest::Client) -> Self {
        match config {
            StoreConfig::Local { path } => EntryStore::Local(LocalFileStore { path: path.clone() }),
            StoreConfig::Remote {
                base_url,
                api_key,
                bin_id,
            } => EntryStore::Remote(RemoteStore {
                http,
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                bin_id: bin_id.clone(),
            }),
        }
    }

    pub(super) fn describe(&self) -> String {
        match self {
            EntryStore::Local(store) => format!("local file {}", store.path.display()),
            EntryStore::Remote(store) => format!("remote bin {}", store.bin_id),
        }
    }

    pub(super) async fn load(&self) -> Vec<String> {
        match self {
            EntryStore::Local(store) => store.load(),
            EntryStore::Remote(store) => store.load().await,
        }
    }

    pub(super) async fn save(&self, entries: &[String]) -> Result<()> {
        match self {
            EntryStore::Local(store) => store.save(entries),
            EntryStore::Remote(store) => store.save(entries).await,
        }
    }
}

pub(super) struct LocalFileStore {
    pub(super) path: PathBuf,
}

impl LocalFileStore {
    pub(super) fn load(&self) -> Vec<String> {
        match read_entries_file(&self.path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("treating {} as empty: {:#}", self.path.display(), err);
                Vec::new()
            }
        }
    }

    pub(super) fn save(&self, entries: &[String]) -> Result<()> {
        let data = serialize_entries(entries)?;
        atomic_write(&self.path, &data)
    }
}

pub(super) fn read_entries_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read file {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse json in {}", path.display()))?;
    normalize_document(value).ok_or_else(|| anyhow!("{} is not a list of strings", path.display()))
}

pub(super) fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(data).context("write temp file")?;
    tmp.flush().context("flush temp file")?;
    tmp.as_file_mut().sync_all().context("sync temp file")?;
    tmp.persist(path)
        .map_err(|e| anyhow!("persist temp file: {}", e))?;
    Ok(())
}

/// JSONBin v3 style document store: `GET /b/{id}/latest` returns
/// `{"record": <document>, "metadata": {...}}`, `PUT /b/{id}` replaces it.
pub(super) struct RemoteStore {
    pub(super) http: reqwest::Client,
    pub(super) base_url: Url,
    pub(super) api_key: String,
    pub(super) bin_id: String,
}

impl RemoteStore {
    fn bin_url(&self) -> String {
        format!(
            "{}/b/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.bin_id
        )
    }

    pub(super) async fn load(&self) -> Vec<String> {
        match self.fetch().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!("remote bin {} unavailable, treating as empty: {:#}", self.bin_id, err);
                Vec::new()
            }
        }
    }

    pub(super) async fn fetch(&self) -> Result<Vec<String>> {
        let url = format!("{}/latest", self.bin_url());
        let resp = self
            .http
            .get(&url)
            .header("X-Master-Key", &self.api_key)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(anyhow!("GET {} returned {}", url, status));
        }
        let body: Value = resp.json().await.context("decode bin body")?;
        let record = match body {
            Value::Object(mut map) => map
                .remove("record")
                .ok_or_else(|| anyhow!("bin body has no record field"))?,
            _ => return Err(anyhow!("bin body is not an object")),
        };
        normalize_document(record).ok_or_else(|| anyhow!("bin record is not a list of strings"))
    }

    /// One attempt; the caller logs and reports failures.
    pub(super) async fn save(&self, entries: &[String]) -> Result<()> {
        let url = self.bin_url();
        self.http
            .put(&url)
            .header("X-Master-Key", &self.api_key)
            .json(entries)
            .send()
            .await
            .with_context(|| format!("PUT {}", url))?
            .error_for_status()
            .with_context(|| format!("PUT {} rejected", url))?;
        Ok(())
    }
}

/// Accepts the canonical flat array and the older `{"data": [...]}` shape.
/// Anything else (including non-string items) is `None`.
pub(super) fn normalize_document(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Array(_)) => normalize_document(inner),
            _ => None,
        },
        _ => None,
    }
}
