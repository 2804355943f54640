//! Host-facing hooks contributed by enabled extensions
//!
//! The core does not inject anything into the UI itself. It only turns the
//! enabled descriptors into stylesheet URLs, component hook sets and archive
//! edits, ordered so the host can apply them naively.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::descriptor::ExtensionDescriptor;
use crate::error::{EditError, StructuralViolation};

/// A component hook: which components it targets and what it overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiHook {
    /// Shorthand for an exact component-name match; wins over `match`
    #[serde(default, alias = "matchName")]
    pub match_name: Option<String>,

    /// Glob pattern over component names
    #[serde(default, rename = "match")]
    pub match_pattern: Option<String>,

    /// Computed property overrides
    #[serde(default)]
    pub computed: IndexMap<String, Value>,

    /// Data overrides
    #[serde(default)]
    pub data: IndexMap<String, Value>,
}

impl UiHook {
    /// Whether this hook applies to the component called `component`
    pub fn matches(&self, component: &str) -> bool {
        if let Some(name) = &self.match_name {
            return name == component;
        }
        match &self.match_pattern {
            Some(pattern) => glob::Pattern::new(pattern)
                .map(|p| p.matches(component))
                .unwrap_or(false),
            None => false,
        }
    }

    /// Overwrite the component's data with this hook's overrides
    pub fn apply_data(&self, state: &mut Map<String, Value>) {
        for (key, value) in &self.data {
            state.insert(key.clone(), value.clone());
        }
    }

    pub fn computed_override(&self, property: &str) -> Option<&Value> {
        self.computed.get(property)
    }
}

/// All hooks of one extension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookSet {
    pub extension: String,
    pub hooks: Vec<UiHook>,
}

/// One declarative edit on a JSON archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ArchiveEdit {
    /// Insert or replace the value at `path`
    Set { path: String, value: Value },
    /// Delete the value at `path`
    Remove { path: String },
    /// Shallow-merge an object into the object at `path`
    Merge { path: String, value: Value },
}

impl ArchiveEdit {
    pub fn path(&self) -> &str {
        match self {
            ArchiveEdit::Set { path, .. }
            | ArchiveEdit::Remove { path }
            | ArchiveEdit::Merge { path, .. } => path,
        }
    }

    /// Apply this edit on behalf of extension `id`
    pub fn apply(&self, id: &str, archive: &mut Value) -> Result<(), EditError> {
        let path = self.path();
        let missing = || EditError::MissingPath {
            id: id.to_string(),
            path: path.to_string(),
        };
        if !path.is_empty() && !path.starts_with('/') {
            return Err(EditError::InvalidPath {
                id: id.to_string(),
                path: path.to_string(),
            });
        }

        match self {
            ArchiveEdit::Set { value, .. } => {
                let Some((parent, key)) = split_pointer(path) else {
                    *archive = value.clone();
                    return Ok(());
                };
                match archive.pointer_mut(parent).ok_or_else(missing)? {
                    Value::Object(object) => {
                        object.insert(key, value.clone());
                    }
                    Value::Array(items) => {
                        if key == "-" {
                            items.push(value.clone());
                        } else {
                            let slot = key
                                .parse::<usize>()
                                .ok()
                                .and_then(|i| items.get_mut(i))
                                .ok_or_else(missing)?;
                            *slot = value.clone();
                        }
                    }
                    _ => return Err(missing()),
                }
            }
            ArchiveEdit::Remove { .. } => {
                let (parent, key) = split_pointer(path).ok_or_else(missing)?;
                let removed = match archive.pointer_mut(parent).ok_or_else(missing)? {
                    Value::Object(object) => object.remove(&key).is_some(),
                    Value::Array(items) => match key.parse::<usize>() {
                        Ok(i) if i < items.len() => {
                            items.remove(i);
                            true
                        }
                        _ => false,
                    },
                    _ => false,
                };
                if !removed {
                    return Err(missing());
                }
            }
            ArchiveEdit::Merge { value, .. } => {
                let target = archive.pointer_mut(path).ok_or_else(missing)?;
                let (Value::Object(target), Value::Object(patch)) = (target, value) else {
                    return Err(EditError::NotAnObject {
                        id: id.to_string(),
                        path: path.to_string(),
                    });
                };
                for (key, value) in patch {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}

/// Split a JSON pointer into its parent pointer and unescaped last token
fn split_pointer(path: &str) -> Option<(&str, String)> {
    let index = path.rfind('/')?;
    let token = path[index + 1..].replace("~1", "/").replace("~0", "~");
    Some((&path[..index], token))
}

/// Stylesheet URLs of every descriptor, highest priority first
pub fn styles(descriptors: &[ExtensionDescriptor]) -> Result<Vec<String>, StructuralViolation> {
    let mut links = Vec::new();
    for descriptor in descriptors {
        let root = descriptor.root_url()?;
        for style in &descriptor.styles {
            links.push(descriptor.resolve_local(&root, style)?.to_string());
        }
    }
    Ok(links)
}

/// Hook sets ordered lowest priority first, so later sets override earlier ones
pub fn hook_sets(descriptors: &[ExtensionDescriptor]) -> Vec<HookSet> {
    descriptors
        .iter()
        .rev()
        .map(|descriptor| HookSet {
            extension: descriptor.id.clone(),
            hooks: descriptor.hooks.clone(),
        })
        .collect()
}

/// Apply every descriptor's edits, lowest priority first
///
/// The highest-priority extension edits last, so its changes win.
pub fn edit_archive(
    descriptors: &[ExtensionDescriptor],
    mut archive: Value,
) -> Result<Value, EditError> {
    for descriptor in descriptors.iter().rev() {
        for edit in &descriptor.edit {
            edit.apply(&descriptor.id, &mut archive)?;
        }
    }
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(id: &str) -> ExtensionDescriptor {
        ExtensionDescriptor {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_hook_matching() {
        let by_name = UiHook {
            match_name: Some("Page".into()),
            match_pattern: Some("*".into()),
            ..Default::default()
        };
        assert!(by_name.matches("Page"));
        assert!(!by_name.matches("PageNav"));

        let by_pattern = UiHook {
            match_pattern: Some("Page*".into()),
            ..Default::default()
        };
        assert!(by_pattern.matches("PageNav"));
        assert!(!by_pattern.matches("Log"));

        assert!(!UiHook::default().matches("Page"));
    }

    #[test]
    fn test_apply_data() {
        let hook = UiHook {
            data: IndexMap::from([("pageSize".to_string(), json!(20))]),
            computed: IndexMap::from([("title".to_string(), json!("Hi"))]),
            ..Default::default()
        };
        let mut state = Map::new();
        state.insert("pageSize".into(), json!(10));
        state.insert("other".into(), json!(true));
        hook.apply_data(&mut state);

        assert_eq!(state.get("pageSize"), Some(&json!(20)));
        assert_eq!(state.get("other"), Some(&json!(true)));
        assert_eq!(hook.computed_override("title"), Some(&json!("Hi")));
    }

    #[test]
    fn test_styles_in_priority_order() {
        let mut high = descriptor("high");
        high.styles = vec!["a.css".into(), "asset://shared/b.css".into()];
        let mut low = descriptor("low");
        low.styles = vec!["css/c.css".into()];

        assert_eq!(
            styles(&[high, low]).unwrap(),
            vec![
                "asset://mods/high/a.css",
                "asset://shared/b.css",
                "asset://mods/low/css/c.css"
            ]
        );
    }

    #[test]
    fn test_hook_sets_lowest_first() {
        let sets = hook_sets(&[descriptor("high"), descriptor("low")]);
        let order: Vec<_> = sets.iter().map(|s| s.extension.as_str()).collect();
        assert_eq!(order, vec!["low", "high"]);
    }

    #[test]
    fn test_edits_highest_priority_wins() {
        let mut high = descriptor("high");
        high.edit = vec![ArchiveEdit::Set {
            path: "/meta/title".into(),
            value: json!("High"),
        }];
        let mut low = descriptor("low");
        low.edit = vec![
            ArchiveEdit::Set {
                path: "/meta/title".into(),
                value: json!("Low"),
            },
            ArchiveEdit::Merge {
                path: "/meta".into(),
                value: json!({ "edited": true }),
            },
            ArchiveEdit::Remove {
                path: "/pages/0".into(),
            },
            ArchiveEdit::Set {
                path: "/pages/-".into(),
                value: json!("p9"),
            },
        ];

        let archive = json!({ "meta": { "title": "Base" }, "pages": ["p1", "p2"] });
        let edited = edit_archive(&[high, low], archive).unwrap();
        assert_eq!(
            edited,
            json!({ "meta": { "title": "High", "edited": true }, "pages": ["p2", "p9"] })
        );
    }

    #[test]
    fn test_edit_errors() {
        let mut archive = json!({ "a": 1 });
        let missing = ArchiveEdit::Remove { path: "/b".into() };
        assert!(matches!(
            missing.apply("x", &mut archive),
            Err(EditError::MissingPath { .. })
        ));

        let merge = ArchiveEdit::Merge {
            path: "/a".into(),
            value: json!({}),
        };
        assert!(matches!(
            merge.apply("x", &mut archive),
            Err(EditError::NotAnObject { .. })
        ));

        let invalid = ArchiveEdit::Set {
            path: "a".into(),
            value: json!(2),
        };
        assert!(matches!(
            invalid.apply("x", &mut archive),
            Err(EditError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_parse_edit_ops() {
        let edits: Vec<ArchiveEdit> = serde_json::from_str(
            r#"[{ "op": "remove", "path": "/x" }, { "op": "merge", "path": "", "value": { "k": 1 } }]"#,
        )
        .unwrap();
        assert_eq!(edits[0], ArchiveEdit::Remove { path: "/x".into() });
        assert_eq!(edits[1].path(), "");
    }
}
