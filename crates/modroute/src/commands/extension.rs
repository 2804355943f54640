//! Extension command for managing installed extensions
//!
//! This module lists installed extensions, edits the enabled list in the
//! settings store and shows what individual extensions contribute.

use modroute_common::config::ModrouteConfig;
use modroute_core::ModManager;
use owo_colors::OwoColorize;
use starbase::AppResult;

use super::{fail, fail_build};

/// Run the extension list command
pub fn run_extension_list(config: &ModrouteConfig) -> AppResult {
    let manager = ModManager::from_config(config);
    let enabled = match manager.enabled_extensions() {
        Ok(enabled) => enabled,
        Err(e) => return fail(format!("Failed to read enabled extensions: {}", e)),
    };

    if manager.catalog().is_empty() && enabled.is_empty() {
        println!("No extensions installed in {:?}", config.extensions_dir());
        return Ok(None);
    }

    println!("{:<30} {:<10} {}", "ID", "PRIORITY", "TITLE");
    println!("{}", "-".repeat(60));

    for (index, id) in enabled.iter().enumerate() {
        match manager.catalog().get(id) {
            Some(entry) => println!("{:<30} {:<10} {}", id.green(), index, entry.label),
            None => println!(
                "{:<30} {:<10} {}",
                id.red(),
                index,
                "(missing or broken)".dimmed()
            ),
        }
    }

    for (id, entry) in manager.catalog().iter() {
        if !enabled.iter().any(|e| e == id) {
            println!("{:<30} {:<10} {}", id, "-", entry.label);
        }
    }

    println!();
    println!(
        "{} installed, {} enabled",
        manager.catalog().len(),
        enabled.len()
    );
    Ok(None)
}

/// Run the extension enable command
pub fn run_extension_enable(config: &ModrouteConfig, id: String, priority: Option<usize>) -> AppResult {
    let mut manager = ModManager::from_config(config);
    if !manager.catalog().contains(&id) {
        return fail(format!(
            "Extension '{}' is not installed (or fails to load) in {:?}",
            id,
            config.extensions_dir()
        ));
    }

    if let Err(e) = manager.enable(&id, priority) {
        return fail(format!("Failed to enable extension: {}", e));
    }

    // Bake now so a broken extension is caught immediately
    if let Err(e) = manager.rebuild() {
        return fail_build(&e, manager.disabled());
    }

    let position = manager
        .enabled_extensions()
        .ok()
        .and_then(|ids| ids.iter().position(|e| *e == id))
        .unwrap_or_default();
    println!("{} Enabled extension '{}' at priority {}", "✓".green(), id, position);
    Ok(None)
}

/// Run the extension disable command
pub fn run_extension_disable(config: &ModrouteConfig, id: String) -> AppResult {
    let mut manager = ModManager::from_config(config);
    match manager.disable(&id) {
        Ok(true) => {
            println!("{} Disabled extension '{}'", "✓".green(), id);
            Ok(None)
        }
        Ok(false) => {
            println!("Extension '{}' is not enabled", id);
            Ok(None)
        }
        Err(e) => fail(format!("Failed to disable extension: {}", e)),
    }
}

/// Run the extension clear command
pub fn run_extension_clear(config: &ModrouteConfig) -> AppResult {
    let mut manager = ModManager::from_config(config);
    if let Err(e) = manager.clear() {
        return fail(format!("Failed to clear enabled extensions: {}", e));
    }
    println!("{} Disabled all extensions", "✓".green());
    Ok(None)
}

/// Run the extension info command
pub fn run_extension_info(config: &ModrouteConfig, id: String) -> AppResult {
    let manager = ModManager::from_config(config);
    let descriptor = match manager.info(&id) {
        Ok(descriptor) => descriptor,
        Err(e) => return fail(e),
    };

    let form = if descriptor.single_file {
        "single file"
    } else {
        "package"
    };

    println!("{}", descriptor.display_title().bold());
    println!("  id:      {}", descriptor.id);
    println!("  form:    {}", form);
    if let Some(desc) = &descriptor.desc {
        println!("  desc:    {}", desc);
    }

    if !descriptor.trees.is_empty() {
        println!("  trees:");
        for (tree, target) in &descriptor.trees {
            println!("    {:<30} -> {}", tree, target);
        }
    }
    if !descriptor.routes.is_empty() {
        println!("  routes:");
        for (route, local) in &descriptor.routes {
            println!("    {:<30} -> {}", route, local);
        }
    }
    if !descriptor.styles.is_empty() {
        println!("  styles:  {}", descriptor.styles.join(", "));
    }
    if !descriptor.hooks.is_empty() {
        println!("  hooks:   {}", descriptor.hooks.len());
    }
    if !descriptor.edit.is_empty() {
        println!("  edits:   {}", descriptor.edit.len());
    }
    Ok(None)
}

/// Run the extension styles command
pub fn run_extension_styles(config: &ModrouteConfig) -> AppResult {
    let mut manager = ModManager::from_config(config);
    let styles = match manager.styles() {
        Ok(styles) => styles,
        Err(e) => return fail_build(&e, manager.disabled()),
    };

    if styles.is_empty() {
        println!("No stylesheets from enabled extensions");
    }
    for link in styles {
        println!("{}", link);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn setup() -> (TempDir, ModrouteConfig) {
        let temp = tempdir().unwrap();
        let mods = temp.path().join("assets/mods");
        fs::create_dir_all(mods.join("hq")).unwrap();
        fs::write(mods.join("hq/mod.toml"), "title = 'HQ'\nstyles = ['hq.css']").unwrap();
        fs::write(mods.join("hq/hq.css"), "").unwrap();
        fs::write(mods.join("fix.json"), r#"{ "title": "Fix" }"#).unwrap();

        let mut config = ModrouteConfig::default();
        config.assets.asset_dir = temp.path().join("assets");
        config.settings.path = Some(temp.path().join("settings.json"));
        (temp, config)
    }

    fn enabled(config: &ModrouteConfig) -> Vec<String> {
        ModManager::from_config(config).enabled_extensions().unwrap()
    }

    #[test]
    fn test_enable_and_disable() {
        let (_temp, config) = setup();

        assert_eq!(run_extension_enable(&config, "hq".into(), None).unwrap(), None);
        assert_eq!(run_extension_enable(&config, "fix.json".into(), Some(0)).unwrap(), None);
        assert_eq!(enabled(&config), vec!["fix.json", "hq"]);

        assert_eq!(run_extension_list(&config).unwrap(), None);
        assert_eq!(run_extension_styles(&config).unwrap(), None);

        assert_eq!(run_extension_disable(&config, "hq".into()).unwrap(), None);
        assert_eq!(enabled(&config), vec!["fix.json"]);

        assert_eq!(run_extension_clear(&config).unwrap(), None);
        assert!(enabled(&config).is_empty());
    }

    #[test]
    fn test_enable_unknown_extension() {
        let (_temp, config) = setup();
        assert_eq!(run_extension_enable(&config, "ghost".into(), None).unwrap(), Some(1));
        assert!(enabled(&config).is_empty());
    }

    #[test]
    fn test_enable_broken_extension_disables_all() {
        let (temp, config) = setup();
        let bad = temp.path().join("assets/mods/bad.toml");
        fs::write(&bad, r#"routes = { "asset://x" = "asset://nowhere.png" }"#).unwrap();

        assert_eq!(run_extension_enable(&config, "hq".into(), None).unwrap(), None);
        assert_eq!(run_extension_enable(&config, "bad.toml".into(), None).unwrap(), Some(1));
        assert!(enabled(&config).is_empty());
    }

    #[test]
    fn test_info() {
        let (_temp, config) = setup();
        assert_eq!(run_extension_info(&config, "hq".into()).unwrap(), None);
        assert_eq!(run_extension_info(&config, "ghost".into()).unwrap(), Some(1));
    }
}
