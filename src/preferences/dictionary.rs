/*!
 * Online dictionaries a reading can link to.
 */

use url::form_urlencoded;

/// Placeholder replaced by the looked-up word
pub const WORD_PLACEHOLDER: &str = "{word}";

/// One selectable dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// URL template containing [`WORD_PLACEHOLDER`]; empty for the custom entry
    pub url: &'static str,
    /// Display name
    pub desc: &'static str,
    /// Stable key stored in preferences
    pub site: &'static str,
}

pub const PREDEFINED_DICTIONARIES: &[DictionaryEntry] = &[
    DictionaryEntry {
        url: "https://www.zdic.net/hans/{word}",
        desc: "汉典",
        site: "zdic.net",
    },
    DictionaryEntry {
        url: "https://www.moedict.tw/{word}",
        desc: "萌典",
        site: "moedict.tw",
    },
    DictionaryEntry {
        url: "https://www.mdbg.net/chinese/dictionary?page=worddict&wdqb={word}",
        desc: "MDBG",
        site: "mdbg.net",
    },
    DictionaryEntry {
        url: "https://dictionary.cambridge.org/dictionary/chinese-traditional-english/{word}",
        desc: "Cambridge",
        site: "dictionary.cambridge.org",
    },
    DictionaryEntry {
        url: "https://hk.dictionary.search.yahoo.com/search?p={word}",
        desc: "Yahoo",
        site: "hk.dictionary.search.yahoo.com",
    },
    DictionaryEntry {
        url: "https://translate.google.com/?hl=zh-TW&sl=zh-TW&tl=en&text={word}&op=translate",
        desc: "Google Translate",
        site: "translate.google.com",
    },
    DictionaryEntry {
        url: "https://www.putonghuaweb.com/charDict/{word}",
        desc: "Putonghua Web",
        site: "putonghuaweb.com",
    },
    DictionaryEntry {
        url: "",
        desc: "Custom",
        site: "custom",
    },
];

impl DictionaryEntry {
    pub fn by_site(site: &str) -> Option<&'static DictionaryEntry> {
        PREDEFINED_DICTIONARIES.iter().find(|entry| entry.site == site)
    }

    pub fn is_custom(&self) -> bool {
        self.site == "custom"
    }
}

/// Fill `template` with the URL-encoded `word`
pub fn build_dictionary_link(template: &str, word: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(word.as_bytes()).collect();
    template.replace(WORD_PLACEHOLDER, &encoded)
}
