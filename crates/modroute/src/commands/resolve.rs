//! Resolve command: look up a single virtual URL

use modroute_common::config::ModrouteConfig;
use modroute_core::ModManager;
use modroute_core::extensions::virtual_url::{VIRTUAL_SCHEME, is_virtual};
use starbase::AppResult;

use super::{fail, fail_build};

/// Run the resolve command
pub fn run_resolve(config: &ModrouteConfig, url: &str) -> AppResult {
    if !is_virtual(url) {
        return fail(format!("'{}' is not a {} URL", url, VIRTUAL_SCHEME));
    }

    let mut manager = ModManager::from_config(config);
    match manager.resolve(url) {
        Ok(Some(physical)) => println!("{}", physical),
        Ok(None) => println!("No override for {}", url),
        Err(e) => return fail_build(&e, manager.disabled()),
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rejects_non_virtual_url() {
        let config = ModrouteConfig::default();
        assert_eq!(run_resolve(&config, "file:///etc/passwd").unwrap(), Some(1));
    }

    #[test]
    fn test_no_override() {
        let temp = tempdir().unwrap();
        let mut config = ModrouteConfig::default();
        config.assets.asset_dir = temp.path().to_path_buf();
        config.settings.path = Some(temp.path().join("settings.json"));
        assert_eq!(run_resolve(&config, "asset://music/a.mp3").unwrap(), None);
    }
}
