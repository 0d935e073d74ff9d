//! Locale-keyed display strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A display string localized per locale tag (e.g., `"en"`, `"de-DE"`).
///
/// Lookup degrades gracefully: exact tag, then the bare language part, then
/// `"en"`, then whichever entry exists. Catalog content is frequently only
/// partially translated, so callers should always get *something* to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedString(BTreeMap<String, String>);

impl LocalizedString {
    /// Create an empty localized string.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Create a localized string with a single entry.
    #[must_use]
    pub fn from_single(locale: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(locale.into(), value.into());
        Self(map)
    }

    /// Insert or replace the value for a locale.
    pub fn insert(&mut self, locale: impl Into<String>, value: impl Into<String>) {
        self.0.insert(locale.into(), value.into());
    }

    /// Look up the best value for `locale`.
    ///
    /// Falls back from the exact tag to the bare language, to `"en"`, to any
    /// entry at all. Returns `None` only when no translation exists.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&str> {
        if let Some(value) = self.0.get(locale) {
            return Some(value);
        }

        let language = locale
            .split_once(['-', '_'])
            .map_or(locale, |(language, _)| language);
        if let Some(value) = self.0.get(language) {
            return Some(value);
        }

        if let Some(value) = self.0.get("en") {
            return Some(value);
        }

        self.0.values().next().map(String::as_str)
    }

    /// Whether no translation exists at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for LocalizedString {
    fn from_iter<T: IntoIterator<Item = (L, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(locale, value)| (locale.into(), value.into()))
                .collect(),
        )
    }
}
