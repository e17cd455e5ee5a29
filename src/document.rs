//! Loading and saving the pair list file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use json_comments::StripComments;
use tracing::info;

use crate::pairs::PairList;

/// A pair list file on disk.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    /// Whether the list changed since the last load/save.
    dirty: bool,
}

impl Document {
    /// Loads the list at `path`. A missing or blank file yields an empty list.
    pub fn load(path: &Path) -> Result<(Self, PairList)> {
        let list = if path.exists() {
            let contents =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            parse_list(&contents).with_context(|| format!("parsing {}", path.display()))?
        } else {
            PairList::default()
        };
        info!(path = %path.display(), entries = list.len(), "loaded pair list");

        let doc = Self {
            path: path.to_path_buf(),
            dirty: false,
        };
        Ok((doc, list))
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(home.join(".config").join("keypair").join("pairs.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Writes the list as formatted JSON.
    pub fn save(&mut self, list: &PairList) -> Result<()> {
        let json = serde_json::to_string_pretty(list).context("serializing pair list")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }

        fs::write(&self.path, json + "\n")
            .with_context(|| format!("writing {}", self.path.display()))?;

        info!(path = %self.path.display(), entries = list.len(), "saved pair list");
        self.dirty = false;
        Ok(())
    }
}

/// Parses an array of single-key objects. `//` and `/* */` comments are allowed.
pub fn parse_list(contents: &str) -> Result<PairList> {
    if contents.trim().is_empty() {
        return Ok(PairList::default());
    }
    let list = serde_json::from_reader(StripComments::new(contents.as_bytes()))?;
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::Entry;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_existing_file() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"[{{"Authorization": "Bearer x"}}, {{"": ""}}]"#).unwrap();

        let (doc, list) = Document::load(f.path()).unwrap();
        assert_eq!(
            list.entries(),
            &[Entry::new("Authorization", "Bearer x"), Entry::default()]
        );
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_load_missing_file() {
        let (_, list) = Document::load(Path::new("/tmp/nonexistent-keypair-test.json")).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_load_blank_file() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "  \n").unwrap();
        let (_, list) = Document::load(f.path()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_load_with_comments() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"[
    // request headers
    {{"Accept": "application/json"}} /* trailing */
]"#
        )
        .unwrap();
        let (_, list) = Document::load(f.path()).unwrap();
        assert_eq!(list.entries(), &[Entry::new("Accept", "application/json")]);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(Document::load(f.path()).is_err());
    }

    #[test]
    fn test_load_rejects_multi_key_entry() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"[{{"a": "1", "b": "2"}}]"#).unwrap();
        let err = Document::load(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("second key"));
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pairs.json");

        let (mut doc, _) = Document::load(&path).unwrap();
        let list = PairList::new(vec![Entry::new("a", "1"), Entry::new("b", "")]);
        doc.mark_dirty();
        doc.save(&list).unwrap();
        assert!(!doc.is_dirty());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("]\n"));

        let (_, reloaded) = Document::load(&path).unwrap();
        assert_eq!(reloaded, list);
    }

    #[test]
    fn test_default_path() {
        let path = Document::default_path().unwrap();
        assert!(path.ends_with(".config/keypair/pairs.json"));
    }
}
