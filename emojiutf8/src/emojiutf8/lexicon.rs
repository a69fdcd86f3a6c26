use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::slice;

use log::{error, warn};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Variation selector forcing text (monochrome) presentation.
pub const TEXT_SELECTOR: char = '\u{FE0E}';
/// Variation selector forcing emoji presentation.
pub const EMOJI_SELECTOR: char = '\u{FE0F}';

/// Legacy ASCII smileys recognized next to shortnames.
pub const SMILEYS: &[(&str, char)] = &[
    ("8-O", '\u{1F62F}'),
    ("8-o", '\u{1F62F}'),
    (":-\\", '\u{1F615}'),
    (":-?", '\u{1F616}'),
    (":-|", '\u{1F601}'),
    ("^_^", '\u{1F604}'),
    (":?:", '\u{2753}'),
    (":!:", '\u{26A0}'),
];

pub fn smiley(token: &str) -> Option<char> {
    SMILEYS
        .iter()
        .find(|(key, _)| *key == token)
        .map(|(_, glyph)| *glyph)
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("reading emoji data at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing emoji data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiEntry {
    pub shortname: String,
    pub codepoints: Vec<char>,
    pub aliases: Vec<String>,
    pub keywords: Vec<String>,
}

impl EmojiEntry {
    /// Shortname without its surrounding colons.
    pub fn name(&self) -> &str {
        self.shortname.trim_matches(':')
    }

    pub fn glyph(&self) -> String {
        self.codepoints.iter().collect()
    }
}

/// One record of an emoji strategy file, keyed by name in the enclosing object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiRecord {
    pub shortname: String,
    pub unicode: String,
    #[serde(default, deserialize_with = "terms")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "terms")]
    pub keywords: Vec<String>,
}

impl From<&EmojiEntry> for EmojiRecord {
    fn from(entry: &EmojiEntry) -> Self {
        let unicode = entry
            .codepoints
            .iter()
            .map(|c| format!("{:x}", *c as u32))
            .collect::<Vec<_>>()
            .join("-");

        EmojiRecord {
            shortname: entry.shortname.clone(),
            unicode,
            aliases: entry.aliases.clone(),
            keywords: entry.keywords.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Terms {
    List(Vec<Option<String>>),
    Words(String),
}

// emojione ships aliases/keywords either as arrays or as one space-separated string.
fn terms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Terms>::deserialize(deserializer)? {
        None => vec![],
        Some(Terms::List(list)) => list.into_iter().flatten().collect(),
        Some(Terms::Words(words)) => words.split_whitespace().map(str::to_string).collect(),
    })
}

fn is_bracketed(token: &str) -> bool {
    token.len() > 2 && token.starts_with(':') && token.ends_with(':')
}

/// Parse `1f604` or `1f1e8-1f1f3` into scalar values.
pub fn parse_codepoints(hex: &str) -> Option<Vec<char>> {
    let codepoints = hex
        .split('-')
        .map(|part| u32::from_str_radix(part.trim(), 16).ok().and_then(char::from_u32))
        .collect::<Option<Vec<char>>>()?;

    if codepoints.is_empty() {
        None
    } else {
        Some(codepoints)
    }
}

/// Immutable table of every known shortname. Built once, then shared read-only.
#[derive(Debug, Default)]
pub struct Lexicon {
    entries: Vec<EmojiEntry>,
    by_shortname: HashMap<String, usize>,
    /// Bracketed aliases that resolve like shortnames. Shortnames win on conflict.
    by_alias: HashMap<String, usize>,
    by_glyph: HashMap<Vec<char>, usize>,
}

impl Lexicon {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Like [`Lexicon::load`], but a missing or broken file only disables
    /// shortname support instead of failing the caller.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(lexicon) => lexicon,
            Err(err) => {
                error!("emoji lexicon unavailable: {err}");
                Self::empty()
            }
        }
    }

    pub fn from_json(src: &str) -> Result<Self, DataError> {
        let records: BTreeMap<String, EmojiRecord> = serde_json::from_str(src)?;
        Ok(Self::from_records(records.into_values()))
    }

    pub fn from_records(records: impl IntoIterator<Item = EmojiRecord>) -> Self {
        Self::from_entries(records.into_iter().filter_map(|record| {
            let Some(codepoints) = parse_codepoints(&record.unicode) else {
                warn!(
                    "skipping {}: bad code point sequence {:?}",
                    record.shortname, record.unicode
                );
                return None;
            };

            Some(EmojiEntry {
                shortname: record.shortname,
                codepoints,
                aliases: record.aliases,
                keywords: record.keywords,
            })
        }))
    }

    /// Lexicon backed by the Unicode table compiled into the `emojis` crate.
    pub fn bundled() -> Self {
        Self::from_entries(emojis::iter().filter_map(|emoji| {
            let mut shortcodes = emoji.shortcodes();
            let shortname = format!(":{}:", shortcodes.next()?);
            let aliases = shortcodes.map(|code| format!(":{code}:")).collect();
            let keywords = emoji
                .name()
                .split_whitespace()
                .map(str::to_lowercase)
                .collect();
            // Selectors are dropped so rendered output scans back to itself.
            let codepoints = emoji
                .as_str()
                .chars()
                .filter(|c| *c != EMOJI_SELECTOR)
                .collect();

            Some(EmojiEntry {
                shortname,
                codepoints,
                aliases,
                keywords,
            })
        }))
    }

    fn from_entries(entries: impl IntoIterator<Item = EmojiEntry>) -> Self {
        let mut lexicon = Self::default();
        for entry in entries {
            lexicon.insert(entry);
        }
        lexicon
    }

    fn insert(&mut self, entry: EmojiEntry) {
        if entry.codepoints.is_empty() {
            warn!("skipping {}: no code points", entry.shortname);
            return;
        }
        if self.by_shortname.contains_key(&entry.shortname) {
            warn!("skipping duplicate shortname {}", entry.shortname);
            return;
        }
        if smiley(&entry.shortname).is_some() {
            warn!("skipping {}: collides with a smiley", entry.shortname);
            return;
        }

        let index = self.entries.len();
        self.by_shortname.insert(entry.shortname.clone(), index);
        self.by_alias.remove(&entry.shortname);
        for alias in &entry.aliases {
            if !is_bracketed(alias)
                || self.by_shortname.contains_key(alias)
                || smiley(alias).is_some()
            {
                continue;
            }
            self.by_alias.entry(alias.clone()).or_insert(index);
        }
        self.by_glyph.entry(entry.codepoints.clone()).or_insert(index);
        self.entries.push(entry);
    }

    pub fn get(&self, shortname: &str) -> Option<&EmojiEntry> {
        self.by_shortname
            .get(shortname)
            .or_else(|| self.by_alias.get(shortname))
            .map(|&index| &self.entries[index])
    }

    pub fn resolve(&self, shortname: &str) -> Option<&[char]> {
        self.get(shortname).map(|entry| entry.codepoints.as_slice())
    }

    pub fn glyph(&self, shortname: &str) -> Option<String> {
        self.get(shortname).map(EmojiEntry::glyph)
    }

    /// Reverse lookup from a selector-free code point sequence.
    pub fn by_glyph(&self, codepoints: &[char]) -> Option<&EmojiEntry> {
        self.by_glyph
            .get(codepoints)
            .map(|&index| &self.entries[index])
    }

    pub fn entries(&self) -> slice::Iter<'_, EmojiEntry> {
        self.entries.iter()
    }

    pub fn shortnames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.shortname.as_str())
    }

    /// Every `:token:` that [`Lexicon::get`] resolves: shortnames plus aliases.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.shortnames().chain(self.by_alias.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records keyed by name, the same shape [`Lexicon::from_json`] reads.
    pub fn to_records(&self) -> BTreeMap<String, EmojiRecord> {
        self.entries
            .iter()
            .map(|entry| (entry.name().to_string(), EmojiRecord::from(entry)))
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn fixture() -> Lexicon {
    Lexicon::from_json(
        r#"{
            "cn": {"shortname": ":cn:", "unicode": "1f1e8-1f1f3", "aliases": [":flag_cn:"], "keywords": ["china", "flag"]},
            "grinning": {"shortname": ":grinning:", "unicode": "1f600", "aliases": [":smiley:"], "keywords": ["face", "grin"]},
            "heart": {"shortname": ":heart:", "unicode": "2764", "keywords": "love like"},
            "slight_smile": {"shortname": ":slight_smile:", "unicode": "1f642", "aliases": null, "keywords": ["face"]},
            "smile": {"shortname": ":smile:", "unicode": "1f604", "aliases": [], "keywords": ["happy", "joy"]},
            "smile_cat": {"shortname": ":smile_cat:", "unicode": "1f638", "keywords": ["cat", "happy"]},
            "thumbsup": {"shortname": ":thumbsup:", "unicode": "1f44d", "aliases": [":+1:"], "keywords": ["approve", "ok"]}
        }"#,
    )
    .expect("fixture lexicon")
}
