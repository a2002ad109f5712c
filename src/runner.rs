use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{Cli, Command, ConfigCommand, OutputFormat};
use crate::config::{self, FileConfig};
use crate::environment::Environment;
use crate::fields::FieldSnapshot;
use crate::templates;
use crate::workspace::{self, Workspace};

/// Project-local settings file, looked up from the workspace root upwards.
const LOCAL_SETTINGS: [&str; 2] = [".vscode", "tplgen.toml"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ConfigPathSource {
    Explicit,
    Discovered,
    UserDefault,
}

impl ConfigPathSource {
    fn as_str(&self) -> &'static str {
        match self {
            ConfigPathSource::Explicit => "explicit",
            ConfigPathSource::Discovered => "discovered",
            ConfigPathSource::UserDefault => "user-default",
        }
    }
}

#[derive(Clone, Debug)]
struct ResolvedConfigPath {
    path: Utf8PathBuf,
    source: ConfigPathSource,
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from(&cli);
    match cli.command {
        Command::Config { command } => handle_config_only(&ctx, command),
        Command::Fields {
            name,
            target,
            format,
        } => {
            let mut state = AppState::new(ctx)?;
            handle_fields(&mut state, name, target, format)
        }
        Command::Path => {
            let state = AppState::new(ctx)?;
            println!("{}", state.env.templates_folder_path());
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldsReport<'a> {
    #[serde(flatten)]
    fields: FieldSnapshot,
    target_folder_path: Option<&'a Utf8Path>,
    templates_folder_path: Utf8PathBuf,
}

fn fields_report(env: &Environment) -> FieldsReport<'_> {
    FieldsReport {
        fields: env.fields().snapshot(),
        target_folder_path: env.target_folder_path(),
        templates_folder_path: env.templates_folder_path(),
    }
}

fn handle_fields(
    state: &mut AppState,
    name: String,
    target: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    state.env.set_file_name(name);
    if let Some(target) = target {
        let target = utf8_path(target, "target folder")?;
        state.env.set_target_folder_path(target);
    }

    let report = fields_report(&state.env);
    match format {
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(&report).context("serializing template fields")?;
            println!("{}", rendered);
        }
        OutputFormat::Text => {
            for (key, value) in report.fields.entries() {
                println!("{:<20} {}", key, value.unwrap_or("<null>"));
            }
            if let Some(target) = report.target_folder_path {
                println!("{:<20} {}", "targetFolderPath", target);
            }
            println!("{:<20} {}", "templatesFolderPath", report.templates_folder_path);
        }
    }
    Ok(())
}

fn handle_config_only(ctx: &CliContext, command: Option<ConfigCommand>) -> Result<()> {
    let resolved = ctx.resolve_config_path(&ctx.search_root()?)?;
    let config_path = resolved.path;
    match command {
        Some(ConfigCommand::Path) => {
            println!("Settings path: {} ({})", config_path, resolved.source.as_str());
            Ok(())
        }
        None | Some(ConfigCommand::Show) => {
            if !config_path.exists() {
                println!("No settings found at {}.", config_path);
                println!("Use `tplgen config init` to scaffold a default settings file.");
                return Ok(());
            }
            let settings = FileConfig::new(config_path.clone());
            println!("Settings path: {} ({})", config_path, resolved.source.as_str());
            print!("{}", config::format_summary(&settings));
            Ok(())
        }
        Some(ConfigCommand::Example) => {
            print!("{}", templates::example_settings()?);
            Ok(())
        }
        Some(ConfigCommand::Init { force }) => {
            config::write_example_config(&config_path, force)?;
            if force {
                println!("Overwrote settings at {}", config_path);
            } else {
                println!("Wrote example settings to {}", config_path);
            }
            Ok(())
        }
        Some(ConfigCommand::Set { key, value }) => {
            config::set_value(&config_path, &key, &value)?;
            info!(%config_path, %key, "updated setting");
            println!("Set `{}` in {}", key, config_path);
            Ok(())
        }
    }
}

fn utf8_path(path: PathBuf, what: &str) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|_| anyhow!("{} must be valid UTF-8", what))
}

fn current_working_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("determining current directory")?;
    utf8_path(cwd, "current directory")
}

#[derive(Clone, Debug)]
struct CliContext {
    file: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    workspace_file: Option<PathBuf>,
}

impl CliContext {
    /// Directory settings discovery starts from: the workspace root when
    /// given, the current directory otherwise.
    fn search_root(&self) -> Result<Utf8PathBuf> {
        let cwd = current_working_dir()?;
        match &self.workspace_root {
            Some(root) => Ok(cwd.join(utf8_path(root.clone(), "workspace root")?)),
            None => Ok(cwd),
        }
    }

    fn resolve_config_path(&self, start: &Utf8Path) -> Result<ResolvedConfigPath> {
        if let Some(path) = &self.file {
            return Ok(ResolvedConfigPath {
                path: utf8_path(path.clone(), "settings path")?,
                source: ConfigPathSource::Explicit,
            });
        }

        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = LOCAL_SETTINGS
                .iter()
                .fold(dir.to_path_buf(), |path, part| path.join(part));
            if candidate.exists() {
                return Ok(ResolvedConfigPath {
                    path: candidate,
                    source: ConfigPathSource::Discovered,
                });
            }
            current = dir.parent();
        }

        let path = config::default_path()
            .ok_or_else(|| anyhow!("unable to determine the user config directory"))?;
        Ok(ResolvedConfigPath {
            path,
            source: ConfigPathSource::UserDefault,
        })
    }

    fn load_workspace(&self) -> Result<Workspace> {
        let Some(file) = &self.workspace_file else {
            return Ok(Workspace::from_root(&self.search_root()?));
        };

        let file = utf8_path(file.clone(), "workspace file")?;
        let raw = fs::read_to_string(&file).with_context(|| format!("reading {}", file))?;
        let workspace: Workspace =
            serde_json::from_str(&raw).with_context(|| format!("parsing workspace {}", file))?;
        if workspace.home().is_some() {
            return Ok(workspace);
        }
        Ok(workspace.with_home(workspace::detect_home()))
    }
}

impl From<&Cli> for CliContext {
    fn from(cli: &Cli) -> Self {
        Self {
            file: cli.file.clone(),
            workspace_root: cli.workspace_root.clone(),
            workspace_file: cli.workspace_file.clone(),
        }
    }
}

struct AppState {
    env: Environment,
}

impl AppState {
    fn new(ctx: CliContext) -> Result<Self> {
        let resolved = ctx.resolve_config_path(&ctx.search_root()?)?;
        debug!(
            path = %resolved.path,
            source = resolved.source.as_str(),
            "using settings file"
        );
        let workspace = ctx.load_workspace()?;
        let env = Environment::new(Arc::new(FileConfig::new(resolved.path)), workspace);
        Ok(Self { env })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir() -> Utf8PathBuf {
        let mut dir = std::env::temp_dir();
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("tplgen-runner-test-{ts}"));
        Utf8PathBuf::from_path_buf(dir).unwrap()
    }

    fn context(file: Option<&Utf8Path>, workspace_root: Option<&Utf8Path>) -> CliContext {
        CliContext {
            file: file.map(|path| path.as_std_path().to_path_buf()),
            workspace_root: workspace_root.map(|path| path.as_std_path().to_path_buf()),
            workspace_file: None,
        }
    }

    #[test]
    fn resolve_config_prefers_explicit_file() {
        let root = unique_temp_dir();
        let explicit = root.join("explicit.toml");
        let ctx = context(Some(&explicit), None);

        let resolved = ctx.resolve_config_path(&root).unwrap();
        assert_eq!(resolved.source, ConfigPathSource::Explicit);
        assert!(resolved.path.ends_with("explicit.toml"));
    }

    #[test]
    fn resolve_config_prefers_nearest_discovered() {
        let root = unique_temp_dir();
        let nested = root.join("a").join("b");
        fs::create_dir_all(nested.as_std_path()).unwrap();
        fs::create_dir_all(root.join(".vscode").as_std_path()).unwrap();
        fs::write(
            root.join(".vscode").join("tplgen.toml").as_std_path(),
            "[templateGenerator]\n",
        )
        .unwrap();

        let ctx = context(None, None);
        let resolved = ctx.resolve_config_path(&nested).unwrap();
        assert_eq!(resolved.source, ConfigPathSource::Discovered);
        assert!(resolved.path.ends_with(".vscode/tplgen.toml"));

        let _ = fs::remove_dir_all(root.as_std_path());
    }

    #[test]
    fn app_state_wires_settings_and_workspace() {
        let root = unique_temp_dir();
        let proj = root.join("proj");
        fs::create_dir_all(proj.as_std_path()).unwrap();
        let settings = root.join("settings.toml");
        fs::write(
            settings.as_std_path(),
            r#"[templateGenerator]
templatesPath = "${workspaceRoot}/tpl/${name}"

[templateGenerator.fields]
author = "Ada"
"#,
        )
        .unwrap();

        let mut state = AppState::new(context(Some(&settings), Some(&proj))).unwrap();
        state.env.set_file_name("user-profile");
        state.env.set_target_folder_path(proj.join("src"));

        let report = fields_report(&state.env);
        assert_eq!(report.templates_folder_path, proj.join("tpl").join("proj"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pascalCaseName"], "UserProfile");
        assert_eq!(json["author"], "Ada");
        assert_eq!(json["omitLine"], serde_json::Value::Null);
        assert_eq!(json["targetFolderPath"], proj.join("src").as_str());

        let _ = fs::remove_dir_all(root.as_std_path());
    }

    #[test]
    fn workspace_file_supplies_attributes() {
        let root = unique_temp_dir();
        fs::create_dir_all(root.as_std_path()).unwrap();
        let ws = root.join("workspace.json");
        fs::write(
            ws.as_std_path(),
            r#"{ "attributes": { "rootPath": "/srv/app" }, "home": "/home/ada" }"#,
        )
        .unwrap();

        let ctx = CliContext {
            file: None,
            workspace_root: None,
            workspace_file: Some(ws.as_std_path().to_path_buf()),
        };
        let workspace = ctx.load_workspace().unwrap();
        assert_eq!(workspace.token("rootPath"), Some("/srv/app"));
        assert_eq!(workspace.home(), Some(Utf8Path::new("/home/ada")));

        let _ = fs::remove_dir_all(root.as_std_path());
    }
}
