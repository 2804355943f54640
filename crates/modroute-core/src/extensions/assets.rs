//! Base-asset resolution used to validate built route tables

use modroute_common::vfs::Vfs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use url::Url;

use super::virtual_url::{MODS_ROOT, VIRTUAL_SCHEME};
use crate::error::AssetResolveError;

/// Where a physical URL ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAsset {
    /// A file on disk
    File(PathBuf),
    /// A URL on a scheme the base resolver does not serve; accepted as-is
    External(String),
}

/// Capability that resolves physical URLs to real assets
pub trait AssetBase: Send + Sync {
    fn resolve_url(&self, url: &str) -> Result<ResolvedAsset, AssetResolveError>;
}

/// Serves `asset://` URLs from directories on a [`Vfs`]
///
/// - `asset://mods/<rest>` maps to `<extensions_dir>/<rest>`
/// - any other `asset://<rest>` maps to `<asset_dir>/<rest>`
/// - `file://` URLs must point at an existing file
/// - other schemes are external and always accepted
pub struct DirectoryAssets {
    vfs: Arc<dyn Vfs>,
    asset_dir: PathBuf,
    extensions_dir: PathBuf,
}

impl DirectoryAssets {
    pub fn new(vfs: Arc<dyn Vfs>, asset_dir: PathBuf, extensions_dir: PathBuf) -> Self {
        Self {
            vfs,
            asset_dir,
            extensions_dir,
        }
    }

    /// Filesystem location of an `asset://` URL, without checking it exists
    pub fn local_path(&self, url: &Url) -> Result<PathBuf, AssetResolveError> {
        let malformed = |message: &str| AssetResolveError::Malformed {
            url: url.to_string(),
            message: message.to_string(),
        };

        // Drop query and fragment, keep host and path
        let mut rest = url
            .as_str()
            .strip_prefix(VIRTUAL_SCHEME)
            .ok_or_else(|| malformed("expected an asset:// URL"))?;
        if let Some(end) = rest.find(['?', '#']) {
            rest = &rest[..end];
        }

        let (base, rest) = match rest.strip_prefix(&MODS_ROOT[VIRTUAL_SCHEME.len()..]) {
            Some(inside) => (&self.extensions_dir, inside),
            None => (&self.asset_dir, rest),
        };

        let decoded = urlencoding::decode(rest).map_err(|e| malformed(&e.to_string()))?;
        let relative = Path::new(decoded.as_ref());
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(malformed("path escapes the asset root"));
        }
        Ok(base.join(relative))
    }

    fn existing(&self, url: &str, path: PathBuf) -> Result<ResolvedAsset, AssetResolveError> {
        if self.vfs.is_file(&path) {
            Ok(ResolvedAsset::File(path))
        } else {
            Err(AssetResolveError::Missing {
                url: url.to_string(),
                path,
            })
        }
    }
}

impl AssetBase for DirectoryAssets {
    fn resolve_url(&self, url: &str) -> Result<ResolvedAsset, AssetResolveError> {
        let parsed = Url::parse(url).map_err(|e| AssetResolveError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match parsed.scheme() {
            "asset" => {
                let path = self.local_path(&parsed)?;
                self.existing(url, path)
            }
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| AssetResolveError::Malformed {
                        url: url.to_string(),
                        message: "not a local file path".to_string(),
                    })?;
                self.existing(url, path)
            }
            _ => Ok(ResolvedAsset::External(url.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modroute_common::vfs::MemoryVfs;

    fn assets() -> DirectoryAssets {
        let vfs = MemoryVfs::new()
            .with_file("/game/assets/music/title.mp3", "")
            .with_file("/game/mods/hq/music/my song.mp3", "");
        DirectoryAssets::new(
            Arc::new(vfs),
            PathBuf::from("/game/assets"),
            PathBuf::from("/game/mods"),
        )
    }

    #[test]
    fn test_base_assets() {
        assert_eq!(
            assets().resolve_url("asset://music/title.mp3").unwrap(),
            ResolvedAsset::File(PathBuf::from("/game/assets/music/title.mp3"))
        );
    }

    #[test]
    fn test_extension_assets_are_decoded() {
        assert_eq!(
            assets()
                .resolve_url("asset://mods/hq/music/my%20song.mp3")
                .unwrap(),
            ResolvedAsset::File(PathBuf::from("/game/mods/hq/music/my song.mp3"))
        );
    }

    #[test]
    fn test_missing_asset() {
        assert!(matches!(
            assets().resolve_url("asset://mods/hq/music/gone.mp3"),
            Err(AssetResolveError::Missing { .. })
        ));
    }

    #[test]
    fn test_escaping_path_is_malformed() {
        assert!(matches!(
            assets().resolve_url("asset://mods/hq/..%2F..%2Fsecret"),
            Err(AssetResolveError::Malformed { .. })
        ));
    }

    #[test]
    fn test_asset_scheme_without_authority_is_malformed() {
        for url in ["asset:x", "asset:/é", "asset:"] {
            assert!(
                matches!(
                    assets().resolve_url(url),
                    Err(AssetResolveError::Malformed { .. })
                ),
                "{} should be malformed",
                url
            );
        }
    }

    #[test]
    fn test_encoded_reserved_characters() {
        let vfs = MemoryVfs::new().with_file("/game/mods/m/music/track #1 ?50%.mp3", "");
        let assets = DirectoryAssets::new(
            Arc::new(vfs),
            PathBuf::from("/game/assets"),
            PathBuf::from("/game/mods"),
        );
        assert_eq!(
            assets
                .resolve_url("asset://mods/m/music/track%20%231%20%3F50%25.mp3")
                .unwrap(),
            ResolvedAsset::File(PathBuf::from("/game/mods/m/music/track #1 ?50%.mp3"))
        );
    }

    #[test]
    fn test_external_and_malformed_urls() {
        assert_eq!(
            assets().resolve_url("https://example.com/a.png").unwrap(),
            ResolvedAsset::External("https://example.com/a.png".into())
        );
        assert!(matches!(
            assets().resolve_url("not a url"),
            Err(AssetResolveError::Malformed { .. })
        ));
    }
}
