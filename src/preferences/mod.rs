/*!
 * User preferences and their persistence.
 *
 * The preference store is the source of truth; the engine keeps a cached copy
 * that is reconciled on demand. Each preference lives under its own key so
 * updates are field-level upserts, and a missing or malformed stored value
 * falls back to its documented default instead of failing.
 */

use futures::future::join_all;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod dictionary;
pub mod store;

pub use dictionary::{DictionaryEntry, PREDEFINED_DICTIONARIES};
pub use store::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};

/// How readings are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToneType {
    /// Tone marks on the vowel, e.g. `hàn`
    #[default]
    Symbol,
    /// Trailing tone digit, e.g. `han4`
    #[serde(alias = "numeric")]
    Num,
    /// No tone information, e.g. `han`
    None,
}

impl std::fmt::Display for ToneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Symbol => "symbol",
            Self::Num => "num",
            Self::None => "none",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ToneType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "symbol" => Ok(Self::Symbol),
            "num" | "numeric" => Ok(Self::Num),
            "none" => Ok(Self::None),
            _ => Err(anyhow::anyhow!("Invalid tone type: {}", s)),
        }
    }
}

/// Where the reading sits relative to the character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReadingPosition {
    #[default]
    Over,
    Under,
}

impl ReadingPosition {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::Under => "under",
        }
    }
}

impl std::str::FromStr for ReadingPosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "over" => Ok(Self::Over),
            "under" => Ok(Self::Under),
            _ => Err(anyhow::anyhow!("Invalid reading position: {}", s)),
        }
    }
}

/// Storage keys, one per preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    ToneType,
    ObserverEnabled,
    IgnoredNodes,
    DictLinkEnabled,
    SelectedDict,
    CustomDictUrl,
    RubyPosition,
    AutoAnnotate,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 8] = [
        Self::ToneType,
        Self::ObserverEnabled,
        Self::IgnoredNodes,
        Self::DictLinkEnabled,
        Self::SelectedDict,
        Self::CustomDictUrl,
        Self::RubyPosition,
        Self::AutoAnnotate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToneType => "toneType",
            Self::ObserverEnabled => "observerEnabled",
            Self::IgnoredNodes => "ignoredNodes",
            Self::DictLinkEnabled => "dictLinkEnabled",
            Self::SelectedDict => "selectedDict",
            Self::CustomDictUrl => "customDictUrl",
            Self::RubyPosition => "rubyPosition",
            Self::AutoAnnotate => "autoAnnotate",
        }
    }
}

/// Runtime copy of the user's settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(rename = "toneType", alias = "toneRepresentation")]
    pub tone_type: ToneType,

    /// Keep annotating content that appears after an Annotate action
    #[serde(rename = "observerEnabled", alias = "monitorEnabled")]
    pub monitor_enabled: bool,

    #[serde(rename = "rubyPosition", alias = "readingPosition")]
    pub reading_position: ReadingPosition,

    #[serde(rename = "autoAnnotate", alias = "autoAnnotateOnLoad")]
    pub auto_annotate_on_load: bool,

    /// Upper-cased tag names; empty means the built-in default list
    #[serde(rename = "ignoredNodes", alias = "ignoredTagNames")]
    pub ignored_tag_names: Vec<String>,

    #[serde(rename = "dictLinkEnabled", alias = "dictionaryLinkEnabled")]
    pub dictionary_link_enabled: bool,

    /// Site key of the selected entry in [`PREDEFINED_DICTIONARIES`]
    #[serde(rename = "selectedDict", alias = "selectedDictionary")]
    pub selected_dictionary: String,

    /// Template with a `{word}` placeholder, used when the "custom" entry is selected
    #[serde(rename = "customDictUrl", alias = "customDictionaryUrlTemplate")]
    pub custom_dictionary_url_template: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            tone_type: ToneType::Symbol,
            monitor_enabled: true,
            reading_position: ReadingPosition::Over,
            auto_annotate_on_load: false,
            ignored_tag_names: Vec::new(),
            dictionary_link_enabled: true,
            selected_dictionary: PREDEFINED_DICTIONARIES[0].site.to_string(),
            custom_dictionary_url_template: String::new(),
        }
    }
}

impl UserPreferences {
    /// Read every key from `store`, keeping defaults for anything missing or malformed
    pub async fn load(store: &dyn PreferenceStore) -> Self {
        let values = join_all(PreferenceKey::ALL.iter().map(|key| store.get(key.as_str()))).await;
        let mut prefs = Self::default();

        for (key, value) in PreferenceKey::ALL.iter().zip(values) {
            let value = match value {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Failed to read preference '{}': {}", key.as_str(), e);
                    continue;
                }
            };
            match key {
                PreferenceKey::ToneType => set_parsed(&mut prefs.tone_type, *key, value),
                PreferenceKey::ObserverEnabled => set_parsed(&mut prefs.monitor_enabled, *key, value),
                PreferenceKey::IgnoredNodes => {
                    let mut tags: Vec<String> = Vec::new();
                    set_parsed(&mut tags, *key, value);
                    prefs.ignored_tag_names = normalize_tag_names(&tags);
                }
                PreferenceKey::DictLinkEnabled => {
                    set_parsed(&mut prefs.dictionary_link_enabled, *key, value)
                }
                PreferenceKey::SelectedDict => set_parsed(&mut prefs.selected_dictionary, *key, value),
                PreferenceKey::CustomDictUrl => {
                    set_parsed(&mut prefs.custom_dictionary_url_template, *key, value)
                }
                PreferenceKey::RubyPosition => set_parsed(&mut prefs.reading_position, *key, value),
                PreferenceKey::AutoAnnotate => set_parsed(&mut prefs.auto_annotate_on_load, *key, value),
            }
        }

        prefs
    }

    /// Resolved dictionary link template, when links are enabled and one is configured
    pub fn dictionary_link_template(&self) -> Option<String> {
        if !self.dictionary_link_enabled {
            return None;
        }
        let entry = DictionaryEntry::by_site(&self.selected_dictionary)?;
        let template = if entry.is_custom() {
            self.custom_dictionary_url_template.trim()
        } else {
            entry.url
        };
        (!template.is_empty()).then(|| template.to_string())
    }
}

fn set_parsed<T: DeserializeOwned>(slot: &mut T, key: PreferenceKey, value: Value) {
    match serde_json::from_value::<T>(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(
            "Ignoring malformed preference '{}', keeping default: {}",
            key.as_str(),
            e
        ),
    }
}

/// Upper-case, trim and de-duplicate tag names, keeping first occurrences in order
pub fn normalize_tag_names(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_ascii_uppercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// A subset of preferences, as carried by an `update_options` message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialPreferences {
    #[serde(rename = "toneType", alias = "toneRepresentation", skip_serializing_if = "Option::is_none")]
    pub tone_type: Option<ToneType>,

    #[serde(rename = "observerEnabled", alias = "monitorEnabled", skip_serializing_if = "Option::is_none")]
    pub monitor_enabled: Option<bool>,

    #[serde(rename = "rubyPosition", alias = "readingPosition", skip_serializing_if = "Option::is_none")]
    pub reading_position: Option<ReadingPosition>,

    #[serde(rename = "autoAnnotate", alias = "autoAnnotateOnLoad", skip_serializing_if = "Option::is_none")]
    pub auto_annotate_on_load: Option<bool>,

    #[serde(rename = "ignoredNodes", alias = "ignoredTagNames", skip_serializing_if = "Option::is_none")]
    pub ignored_tag_names: Option<Vec<String>>,

    #[serde(rename = "dictLinkEnabled", alias = "dictionaryLinkEnabled", skip_serializing_if = "Option::is_none")]
    pub dictionary_link_enabled: Option<bool>,

    #[serde(rename = "selectedDict", alias = "selectedDictionary", skip_serializing_if = "Option::is_none")]
    pub selected_dictionary: Option<String>,

    #[serde(rename = "customDictUrl", alias = "customDictionaryUrlTemplate", skip_serializing_if = "Option::is_none")]
    pub custom_dictionary_url_template: Option<String>,
}

impl PartialPreferences {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Key/value pairs for the fields that are present
    pub fn entries(&self) -> Vec<(PreferenceKey, Value)> {
        let mut entries = Vec::new();
        if let Some(tone) = self.tone_type {
            entries.push((PreferenceKey::ToneType, Value::from(tone.to_string())));
        }
        if let Some(enabled) = self.monitor_enabled {
            entries.push((PreferenceKey::ObserverEnabled, Value::from(enabled)));
        }
        if let Some(position) = self.reading_position {
            entries.push((PreferenceKey::RubyPosition, Value::from(position.as_css())));
        }
        if let Some(auto) = self.auto_annotate_on_load {
            entries.push((PreferenceKey::AutoAnnotate, Value::from(auto)));
        }
        if let Some(tags) = &self.ignored_tag_names {
            entries.push((PreferenceKey::IgnoredNodes, Value::from(normalize_tag_names(tags))));
        }
        if let Some(enabled) = self.dictionary_link_enabled {
            entries.push((PreferenceKey::DictLinkEnabled, Value::from(enabled)));
        }
        if let Some(site) = &self.selected_dictionary {
            entries.push((PreferenceKey::SelectedDict, Value::from(site.as_str())));
        }
        if let Some(template) = &self.custom_dictionary_url_template {
            entries.push((PreferenceKey::CustomDictUrl, Value::from(template.as_str())));
        }
        entries
    }

    /// Overwrite the present fields of `prefs`, leaving the rest alone
    pub fn apply_to(&self, prefs: &mut UserPreferences) {
        if let Some(tone) = self.tone_type {
            prefs.tone_type = tone;
        }
        if let Some(enabled) = self.monitor_enabled {
            prefs.monitor_enabled = enabled;
        }
        if let Some(position) = self.reading_position {
            prefs.reading_position = position;
        }
        if let Some(auto) = self.auto_annotate_on_load {
            prefs.auto_annotate_on_load = auto;
        }
        if let Some(tags) = &self.ignored_tag_names {
            prefs.ignored_tag_names = normalize_tag_names(tags);
        }
        if let Some(enabled) = self.dictionary_link_enabled {
            prefs.dictionary_link_enabled = enabled;
        }
        if let Some(site) = &self.selected_dictionary {
            prefs.selected_dictionary = site.clone();
        }
        if let Some(template) = &self.custom_dictionary_url_template {
            prefs.custom_dictionary_url_template = template.clone();
        }
    }
}
