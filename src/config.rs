use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use toml::Value;
use toml_edit::{DocumentMut, Item, Table, value};
use tracing::{debug, warn};

use crate::templates;

/// Name of the settings section every key is read from.
pub const SECTION: &str = "templateGenerator";

pub const AUTHOR_KEY: &str = "fields.author";
pub const EMAIL_KEY: &str = "fields.email";
pub const LINK_KEY: &str = "fields.link";
pub const TEMPLATES_PATH_KEY: &str = "templatesPath";

const KNOWN_KEYS: [&str; 4] = [AUTHOR_KEY, EMAIL_KEY, LINK_KEY, TEMPLATES_PATH_KEY];

/// Read access to the `templateGenerator` settings section.
///
/// Lookups never fail: a missing key, an unreadable backing store or a
/// non-string value all read as `None`.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory settings, mostly useful for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapConfig {
    values: BTreeMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }
}

impl ConfigSource for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Settings stored in a TOML file under a `[templateGenerator]` table.
///
/// The file is read again on every lookup so edits made while the process is
/// running are picked up without a reload step.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: Utf8PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn section(&self) -> Option<Value> {
        if !self.path.exists() {
            debug!(path = %self.path, "settings file not found");
            return None;
        }
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %self.path, error = %err, "reading settings failed");
                return None;
            }
        };
        let mut doc: Value = match toml::from_str(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(path = %self.path, error = %err, "parsing settings failed");
                return None;
            }
        };
        doc.as_table_mut().and_then(|table| table.remove(SECTION))
    }
}

impl ConfigSource for FileConfig {
    fn get(&self, key: &str) -> Option<String> {
        let section = self.section()?;
        lookup(&section, key)
    }
}

/// Resolve `key` in a settings table. A quoted flat key (`"fields.author"`)
/// wins over the nested form (`[fields] author`).
fn lookup(section: &Value, key: &str) -> Option<String> {
    let table = section.as_table()?;
    if let Some(flat) = table.get(key) {
        return flat.as_str().map(str::to_owned);
    }

    let mut current = section;
    for part in key.split('.') {
        current = current.as_table()?.get(part)?;
    }
    current.as_str().map(str::to_owned)
}

/// Default settings location: `<config dir>/template-generator/settings.toml`.
pub fn default_path() -> Option<Utf8PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("template-generator");
    path.push("settings.toml");
    Utf8PathBuf::from_path_buf(path).ok()
}

pub fn write_example_config(path: &Utf8Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists; rerun with --force to overwrite", path);
    }

    templates::write_example_settings(path)
}

/// Set `key` inside the `[templateGenerator]` table, creating the file and any
/// intermediate tables as needed. Existing comments and layout are preserved.
pub fn set_value(path: &Utf8Path, key: &str, new_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|part| part.trim().is_empty()) {
        bail!("invalid settings key `{}`", key);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent))?;
    }

    let mut doc: DocumentMut = if path.exists() {
        let raw = fs::read_to_string(path).with_context(|| format!("reading settings {}", path))?;
        raw.parse()
            .with_context(|| format!("parsing settings {}", path))?
    } else {
        DocumentMut::new()
    };

    let mut table = doc.as_table_mut();
    for part in std::iter::once(SECTION).chain(parts[..parts.len() - 1].iter().copied()) {
        let item = table.entry(part).or_insert(Item::Table(Table::new()));
        table = item
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("settings entry `{}` is not a table", part))?;
    }
    table.insert(parts[parts.len() - 1], value(new_value));

    fs::write(path, doc.to_string()).with_context(|| format!("writing settings {}", path))
}

pub fn format_summary(config: &dyn ConfigSource) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", SECTION);
    for key in KNOWN_KEYS {
        let shown = config.get(key);
        let _ = writeln!(out, "  {} = {}", key, shown.as_deref().unwrap_or("<unset>"));
    }
    out
}
