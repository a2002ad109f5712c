//! Case-converted template fields and templates-folder resolution for a
//! template-based file generator.
//!
//! A caller builds one [`Environment`], assigns the name of the file being
//! generated with [`Environment::set_file_name`], and reads the derived
//! [`Fields`] and [`Environment::templates_folder_path`] while rendering.

pub mod case;
pub mod cli;
pub mod config;
pub mod environment;
pub mod fields;
pub mod logging;
pub mod runner;
pub mod templates;
pub mod workspace;

pub use config::{ConfigSource, FileConfig, MapConfig};
pub use environment::Environment;
pub use fields::{FieldSnapshot, Fields};
pub use workspace::Workspace;
