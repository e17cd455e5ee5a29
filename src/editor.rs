//! External editor support for editing the whole list via `$EDITOR`.

use std::env;
use std::fs;
use std::process::Command;

use anyhow::{Context, Result};

use crate::document::parse_list;
use crate::pairs::PairList;

/// Opens the list in the user's `$EDITOR`, waits for save & quit,
/// then reads back and parses the result.
pub fn edit_list_in_editor(list: &PairList) -> Result<PairList> {
    let editor = env::var("EDITOR")
        .or_else(|_| env::var("VISUAL"))
        .unwrap_or_else(|_| "vi".to_string());

    let json = serde_json::to_string_pretty(list).context("serializing list for editor")?;

    let tmp = tempfile::Builder::new()
        .prefix("keypair-")
        .suffix(".json")
        .tempfile()
        .context("creating temp file")?;

    fs::write(tmp.path(), &json).context("writing temp file")?;

    let status = Command::new(&editor)
        .arg(tmp.path())
        .status()
        .with_context(|| format!("launching editor '{editor}'"))?;

    if !status.success() {
        anyhow::bail!("editor exited with {status}");
    }

    let edited = fs::read_to_string(tmp.path()).context("reading edited file")?;
    parse_list(&edited).context("parsing edited list")
}
