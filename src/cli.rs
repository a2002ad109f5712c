use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "tplgen",
    version,
    about = "Template fields and templates folder resolution"
)]
pub struct Cli {
    /// Settings file (defaults to the nearest `.vscode/tplgen.toml`, then the user config dir).
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,
    /// Workspace root exposed to `${rootPath}`, `${workspaceRoot}` and `${name}` tokens.
    #[arg(long = "workspace-root", global = true, conflicts_with = "workspace_file")]
    pub workspace_root: Option<PathBuf>,
    /// JSON file describing workspace attributes and the home directory.
    #[arg(long = "workspace-file", global = true)]
    pub workspace_file: Option<PathBuf>,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every template field derived from a file name.
    Fields {
        name: String,
        /// Folder the generated file would be written to.
        #[arg(long = "target")]
        target: Option<PathBuf>,
        #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the folder templates are loaded from.
    Path,
    /// Settings display and editing.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Path,
    /// Print the example settings file.
    Example,
    /// Write the example settings file.
    Init {
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
    /// Set a key in the `[templateGenerator]` table, e.g. `fields.author`.
    Set { key: String, value: String },
}

/// Helper entry point so `main` can stay minimal.
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fields_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tplgen",
            "fields",
            "my-cool_file",
            "--format",
            "json",
            "--workspace-root",
            "/proj",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.workspace_root, Some(PathBuf::from("/proj")));
        match cli.command {
            Command::Fields { name, format, target } => {
                assert_eq!(name, "my-cool_file");
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(target, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_config_subcommands() {
        let cli = Cli::try_parse_from(["tplgen", "config", "example"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                command: Some(ConfigCommand::Example)
            }
        ));

        let cli = Cli::try_parse_from(["tplgen", "-f", "s.toml", "config", "path"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("s.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                command: Some(ConfigCommand::Path)
            }
        ));

        assert!(Cli::try_parse_from(["tplgen", "fields", "x", "--json"]).is_err());
    }

    #[test]
    fn workspace_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "tplgen",
            "path",
            "--workspace-root",
            "/proj",
            "--workspace-file",
            "ws.json",
        ]);
        assert!(result.is_err());
    }
}
