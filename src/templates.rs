//! Files bundled into the binary.

use std::borrow::Cow;
use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use rust_embed::RustEmbed;

const EXAMPLE_SETTINGS: &str = "settings.example.toml";

#[derive(RustEmbed)]
#[folder = "templates"]
struct Bundled;

fn bundled(name: &str) -> Result<Cow<'static, [u8]>> {
    Bundled::get(name)
        .map(|file| file.data)
        .ok_or_else(|| anyhow!("bundled file `{}` missing", name))
}

/// The commented example settings file.
pub fn example_settings() -> Result<String> {
    let data = bundled(EXAMPLE_SETTINGS)?;
    String::from_utf8(data.into_owned()).context("decoding bundled example settings")
}

pub fn write_example_settings(destination: &Utf8Path) -> Result<()> {
    let data = bundled(EXAMPLE_SETTINGS)?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent))?;
    }
    fs::write(destination, data.as_ref()).with_context(|| format!("writing {}", destination))
}
