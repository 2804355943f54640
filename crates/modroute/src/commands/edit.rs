//! Edit command: apply enabled extensions' archive edits to a JSON file

use anyhow::{Context, Result};
use modroute_common::config::ModrouteConfig;
use modroute_core::{ModManager, RouteError};
use serde_json::Value;
use starbase::AppResult;
use std::fs;
use std::path::{Path, PathBuf};

use super::{fail, fail_build};

fn read_archive(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read archive: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse archive: {:?}", path))
}

fn write_archive(archive: &Value, output: Option<&Path>) -> Result<()> {
    let content = serde_json::to_string_pretty(archive).context("Failed to serialize archive")?;
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write archive: {:?}", path))
        }
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

/// Run the edit command
pub fn run_edit(config: &ModrouteConfig, input: PathBuf, output: Option<PathBuf>) -> AppResult {
    let archive = match read_archive(&input) {
        Ok(archive) => archive,
        Err(e) => return fail(format!("{:#}", e)),
    };

    let mut manager = ModManager::from_config(config);
    let edited = match manager.edit_archive(archive) {
        Ok(edited) => edited,
        Err(RouteError::Edit(e)) => return fail(e),
        Err(e) => return fail_build(&e, manager.disabled()),
    };

    if let Err(e) = write_archive(&edited, output.as_deref()) {
        return fail(format!("{:#}", e));
    }
    if let Some(path) = output {
        eprintln!("Wrote edited archive to {:?}", path);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_edit_archive_file() {
        let temp = tempdir().unwrap();
        let mods = temp.path().join("assets/mods");
        fs::create_dir_all(&mods).unwrap();
        fs::write(
            mods.join("retitle.toml"),
            r#"
[[edit]]
op = "set"
path = "/title"
value = "Edited"
"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("settings.json"),
            r#"{ "localData": { "settings": { "modListEnabled": ["retitle.toml"] } } }"#,
        )
        .unwrap();
        let input = temp.path().join("archive.json");
        fs::write(&input, r#"{ "title": "Original", "pages": [] }"#).unwrap();
        let output = temp.path().join("out.json");

        let mut config = ModrouteConfig::default();
        config.assets.asset_dir = temp.path().join("assets");
        config.settings.path = Some(temp.path().join("settings.json"));

        assert_eq!(run_edit(&config, input, Some(output.clone())).unwrap(), None);
        let edited: Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(edited, json!({ "title": "Edited", "pages": [] }));
    }

    #[test]
    fn test_missing_input() {
        let temp = tempdir().unwrap();
        let config = ModrouteConfig::default();
        assert_eq!(
            run_edit(&config, temp.path().join("nope.json"), None).unwrap(),
            Some(1)
        );
    }
}
