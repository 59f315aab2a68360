//! Locale tables loaded once at startup.
//!
//! Responsibility:
//! - Parse `messages/<locale>.json` (builtin or from a directory).
//! - Refuse to start when a locale misses any `MessageKey`.
//! - Resolve a key for a locale, falling back to the default locale.
//! - Pick the best supported locale from an `Accept-Language` header.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::keys::MessageKey;

const BUILTIN: &[(&str, &str)] = &[
    ("en", include_str!("../../messages/en.json")),
    ("fr", include_str!("../../messages/fr.json")),
    ("es", include_str!("../../messages/es.json")),
    ("de", include_str!("../../messages/de.json")),
    ("pt", include_str!("../../messages/pt.json")),
    ("hi", include_str!("../../messages/hi.json")),
];

type Table = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read messages from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid message file for locale '{locale}': {source}")]
    Parse {
        locale: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("default locale '{0}' is not available")]
    MissingDefault(String),
    #[error("locale '{locale}' is missing message key {key}")]
    MissingKey { locale: String, key: &'static str },
}

#[derive(Debug)]
pub struct Catalog {
    default_locale: String,
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// Locale files compiled into the binary.
    pub fn builtin(default_locale: &str) -> Result<Self, CatalogError> {
        let mut tables = HashMap::new();
        for (locale, raw) in BUILTIN {
            tables.insert(normalize_tag(locale), parse_table(locale, raw)?);
        }
        Self::from_tables(default_locale, tables)
    }

    /// Every `*.json` file in `dir`; the file stem is the locale tag.
    pub fn from_dir(dir: &Path, default_locale: &str) -> Result<Self, CatalogError> {
        let io_err = |source: std::io::Error| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut tables = HashMap::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            tables.insert(normalize_tag(locale), parse_table(locale, &raw)?);
        }

        Self::from_tables(default_locale, tables)
    }

    fn from_tables(default_locale: &str, tables: HashMap<String, Table>) -> Result<Self, CatalogError> {
        let default_locale = normalize_tag(default_locale);
        if !tables.contains_key(&default_locale) {
            return Err(CatalogError::MissingDefault(default_locale));
        }

        let mut locales: Vec<&String> = tables.keys().collect();
        locales.sort();
        for locale in locales {
            let table = &tables[locale];
            if let Some(key) = MessageKey::ALL
                .iter()
                .find(|key| !table.contains_key(key.as_str()))
            {
                return Err(CatalogError::MissingKey {
                    locale: locale.clone(),
                    key: key.as_str(),
                });
            }
        }

        Ok(Self {
            default_locale,
            tables,
        })
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    pub fn resolve(&self, key: MessageKey, locale: &str) -> &str {
        self.lookup(key, locale)
            .or_else(|| self.lookup(key, &self.default_locale))
            .unwrap_or(key.as_str())
    }

    fn lookup(&self, key: MessageKey, locale: &str) -> Option<&str> {
        self.tables
            .get(locale)
            .and_then(|table| table.get(key.as_str()))
            .map(String::as_str)
    }

    /// Returns the supported locale that best matches `accept_language`.
    pub fn negotiate(&self, accept_language: Option<&str>) -> &str {
        let Some(header) = accept_language else {
            return &self.default_locale;
        };

        let mut ranges: Vec<(String, f32)> = header.split(',').filter_map(parse_range).collect();
        // sort_by is stable: equal weights keep header order
        ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        for (tag, _) in &ranges {
            if tag == "*" {
                return &self.default_locale;
            }
            if let Some((locale, _)) = self.tables.get_key_value(tag.as_str()) {
                return locale;
            }
            if let Some(primary) = tag.split('-').next()
                && let Some((locale, _)) = self.tables.get_key_value(primary)
            {
                return locale;
            }
        }

        &self.default_locale
    }
}

fn parse_table(locale: &str, raw: &str) -> Result<Table, CatalogError> {
    serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
        locale: locale.to_string(),
        source,
    })
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

// "fr-CH;q=0.9" -> ("fr-ch", 0.9); zero or malformed weights are dropped
fn parse_range(raw: &str) -> Option<(String, f32)> {
    let mut parts = raw.split(';');
    let tag = normalize_tag(parts.next()?);
    if tag.is_empty() {
        return None;
    }

    let mut weight = 1.0_f32;
    for param in parts {
        if let Some(q) = param.trim().strip_prefix("q=") {
            weight = q.trim().parse().ok()?;
        }
    }

    (weight > 0.0).then_some((tag, weight))
}
