//! CSS property and at-directive schema for keyword completion
//!
//! A trimmed schema ships inside the binary; a full one in the same JSON
//! layout can be loaded from disk through `[completion] schema`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

const BUNDLED_JSON: &str = include_str!("../data/css-schema.json");

static BUNDLED: LazyLock<CssSchema> = LazyLock::new(|| {
    CssSchema::from_json(BUNDLED_JSON).unwrap_or_else(|err| {
        tracing::error!("bundled CSS schema is invalid: {}", err);
        CssSchema::default()
    })
});

/// Browser keys in display order.
const BROWSER_NAMES: &[(&str, &str)] = &[
    ("E", "Edge"),
    ("FF", "Firefox"),
    ("S", "Safari"),
    ("C", "Chrome"),
    ("IE", "IE"),
    ("O", "Opera"),
];

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("Failed to read schema: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CssSchema {
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
    #[serde(default, rename = "atdirectives")]
    pub at_directives: Vec<AtDirective>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Support list such as `E12,FF1,S1`, or `all`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browsers: Option<String>,
    /// `e` experimental, `n` nonstandard, `o` obsolete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(default)]
    pub values: Vec<ValueEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtDirective {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browsers: Option<String>,
}

impl CssSchema {
    /// Schema embedded in the binary.
    pub fn bundled() -> &'static CssSchema {
        &BUNDLED
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyEntry> {
        self.properties.iter().find(|entry| entry.name == name)
    }
}

fn status_prefix(status: &str) -> &'static str {
    match status {
        "e" => "⚠️ Property is experimental. Be cautious when using it.\n\n",
        "n" => "🚨️ Property is nonstandard. Avoid using it.\n\n",
        "o" => "🚨️ Property is obsolete. Avoid using it.\n\n",
        _ => "",
    }
}

/// Human readable support list, `None` for `all` or an empty list.
pub fn browser_label(browsers: &str) -> Option<String> {
    let browsers = browsers.trim();
    if browsers.is_empty() || browsers == "all" {
        return None;
    }

    let versions: Vec<(&str, &str)> = browsers
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let split = entry.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(entry.len());
            entry.split_at(split)
        })
        .collect();

    let labels: Vec<String> = BROWSER_NAMES
        .iter()
        .filter_map(|(key, name)| {
            let (_, version) = versions.iter().find(|(k, _)| k == key)?;
            Some(if version.is_empty() { name.to_string() } else { format!("{} {}", name, version) })
        })
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels.join(", "))
    }
}

impl PropertyEntry {
    /// Markdown-free description with status, browser support and syntax,
    /// or `None` when the entry has no description.
    pub fn description(&self) -> Option<String> {
        let desc = self.desc.as_deref().filter(|d| !d.is_empty())?;

        let mut out = String::new();
        if let Some(status) = &self.status {
            out.push_str(status_prefix(status));
        }
        out.push_str(desc);
        if let Some(label) = self.browsers.as_deref().and_then(browser_label) {
            out.push_str(&format!("\n({})", label));
        }
        if let Some(syntax) = &self.syntax {
            out.push_str(&format!("\n\nSyntax: {}", syntax));
        }
        Some(out)
    }
}
