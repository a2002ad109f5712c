use std::fmt;
use std::path::MAIN_SEPARATOR_STR;
use std::sync::{Arc, OnceLock};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use regex::Regex;
use tracing::{debug, trace};

use crate::config::{ConfigSource, TEMPLATES_PATH_KEY};
use crate::fields::Fields;
use crate::workspace::Workspace;

/// Templates folder used when `templatesPath` is not configured, relative to
/// the home directory.
const DEFAULT_TEMPLATES_DIR: [&str; 2] = [".vscode", "templates"];

/// Generation context: where output goes, the fields of the file being
/// generated, and where templates are looked up.
///
/// Build one per session and pass it by reference to whatever renders
/// templates.
pub struct Environment {
    target_folder_path: Option<Utf8PathBuf>,
    fields: Fields,
    config: Arc<dyn ConfigSource>,
    workspace: Workspace,
}

impl Environment {
    pub fn new(config: Arc<dyn ConfigSource>, workspace: Workspace) -> Self {
        Self {
            target_folder_path: None,
            fields: Fields::new(Arc::clone(&config)),
            config,
            workspace,
        }
    }

    /// Forward a new file name to the fields, resetting every derived view.
    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.fields.set_name(file_name);
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn target_folder_path(&self) -> Option<&Utf8Path> {
        self.target_folder_path.as_deref()
    }

    pub fn set_target_folder_path(&mut self, path: impl Into<Utf8PathBuf>) {
        self.target_folder_path = Some(path.into());
    }

    pub fn config(&self) -> &dyn ConfigSource {
        self.config.as_ref()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Folder holding the templates, recomputed from settings on every call.
    pub fn templates_folder_path(&self) -> Utf8PathBuf {
        match self
            .config
            .get(TEMPLATES_PATH_KEY)
            .filter(|configured| !configured.is_empty())
        {
            Some(configured) => resolve_templates_path(&configured, &self.workspace),
            None => default_templates_path(self.workspace.home()),
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("target_folder_path", &self.target_folder_path)
            .field("fields", &self.fields)
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

fn default_templates_path(home: Option<&Utf8Path>) -> Utf8PathBuf {
    let mut path = match home {
        Some(home) => home.to_path_buf(),
        None => {
            debug!("no home directory known; templates folder is relative");
            Utf8PathBuf::new()
        }
    };
    for part in DEFAULT_TEMPLATES_DIR {
        path.push(part);
    }
    path
}

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"^\$\{(\S*)\}$").expect("token pattern compiles"))
}

/// The key of a `${key}` segment, or `None` for an ordinary segment.
fn token_key(segment: &str) -> Option<&str> {
    token_pattern()
        .captures(segment)
        .and_then(|captures| captures.get(1))
        .map(|key| key.as_str())
}

/// Expand `${key}` segments of a `/`-separated settings value and join the
/// result into a path.
///
/// A token segment whose key is not a non-empty string attribute of the
/// workspace is dropped. Every other segment is kept verbatim.
pub fn resolve_templates_path(configured: &str, workspace: &Workspace) -> Utf8PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for segment in configured.split('/') {
        match token_key(segment) {
            Some(key) => match workspace.token(key) {
                Some(value) => {
                    trace!(key, value, "expanded templates path token");
                    segments.push(value);
                }
                None => debug!(key, "dropping unresolved templates path token"),
            },
            None => segments.push(segment),
        }
    }
    join_segments(configured.starts_with('/'), &segments)
}

/// Join segments the way a platform path join does: a rooted settings value
/// stays rooted even when every segment after the root was dropped, empty
/// segments vanish, and the result is normalized.
fn join_segments(rooted: bool, segments: &[&str]) -> Utf8PathBuf {
    let mut joined = Utf8PathBuf::new();
    if rooted {
        joined.push(MAIN_SEPARATOR_STR);
    }

    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        if joined.as_str().is_empty() {
            joined.push(*segment);
            continue;
        }
        let relative = segment.trim_start_matches(std::path::is_separator);
        if !relative.is_empty() {
            joined.push(relative);
        }
    }

    normalize(&joined)
}

/// Lexically drop `.` components and fold `..` into its parent.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                let last_is_normal = matches!(
                    out.components().next_back(),
                    Some(Utf8Component::Normal(_))
                );
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    if out.as_str().is_empty() {
        out.push(".");
    }
    out
}
