//! Host workspace attributes available to `${key}` path tokens.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute names populated by [`Workspace::from_root`].
pub const ROOT_PATH: &str = "rootPath";
pub const WORKSPACE_ROOT: &str = "workspaceRoot";
pub const NAME: &str = "name";

/// Snapshot of the host workspace: a bag of named attributes plus the user's
/// home directory. Attributes can hold any JSON value; only strings are
/// usable as path tokens.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
    #[serde(default)]
    home: Option<Utf8PathBuf>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workspace rooted at `root`, with the home directory taken from the OS.
    pub fn from_root(root: &Utf8Path) -> Self {
        let mut workspace = Self::new().with_home(detect_home());
        workspace.set_attribute(ROOT_PATH, Value::String(root.to_string()));
        workspace.set_attribute(WORKSPACE_ROOT, Value::String(root.to_string()));
        if let Some(name) = root.file_name() {
            workspace.set_attribute(NAME, Value::String(name.to_owned()));
        }
        workspace
    }

    pub fn with_home(mut self, home: Option<Utf8PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value.into());
        self
    }

    pub fn set_attribute(&mut self, key: &str, value: Value) {
        self.attributes.insert(key.to_owned(), value);
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// The attribute as a path token: present, a string, and not empty.
    pub fn token(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn home(&self) -> Option<&Utf8Path> {
        self.home.as_deref()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Home directory reported by the OS, when it is valid UTF-8.
pub fn detect_home() -> Option<Utf8PathBuf> {
    dirs::home_dir().and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
}
