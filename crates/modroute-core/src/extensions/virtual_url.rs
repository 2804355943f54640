//! Helpers for URLs on the `asset://` scheme
//!
//! Every extension owns the virtual directory `asset://mods/<id>/`; its local
//! paths (tree files, manual routes, style links) are resolved against it with
//! ordinary relative-URL rules.

use url::Url;

/// Scheme prefix every virtual URL starts with
pub const VIRTUAL_SCHEME: &str = "asset://";

/// Virtual directory holding every extension's own files
pub const MODS_ROOT: &str = "asset://mods/";

/// Whether `url` is on the virtual scheme
pub fn is_virtual(url: &str) -> bool {
    url.starts_with(VIRTUAL_SCHEME)
}

/// `asset://mods/<id>/`
pub fn mod_root_url(id: &str) -> Result<Url, url::ParseError> {
    let mut root = Url::parse(MODS_ROOT)?.join(id)?;
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    Ok(root)
}

/// Resolve `reference` against `base`; absolute URLs are returned unchanged
pub fn resolve(base: &Url, reference: &str) -> Result<Url, url::ParseError> {
    base.join(reference)
}

/// Append a `/`-separated file path to the directory URL `dir`
///
/// Each segment is percent-encoded, so names containing `#`, `?` or `%` stay
/// part of the path. `None` if `dir` cannot hold path segments.
pub fn append_segments(dir: &Url, relative: &str) -> Option<Url> {
    let mut url = dir.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(relative.split('/'));
    Some(url)
}
