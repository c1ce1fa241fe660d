//! Sessions and the words guests submit to them.
//!
//! The store is a plain in-memory document (`{ sessions, words }`, both keyed
//! by session id) that can be snapshotted to a JSON file. Layout never reads
//! the store directly; it takes a point-in-time list of submissions through
//! [`WordSource`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::layout::normalize_word;
use crate::theme::{DEFAULT_STYLE_ID, Theme};

static PIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;
const PIN_ATTEMPTS: usize = 1000;

pub const QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no session with id {0:?}")]
    UnknownSession(String),
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("word is empty after normalization")]
    EmptyWord,
    #[error("invalid PIN {0:?}: expected exactly six digits")]
    InvalidPin(String),
    #[error("could not find a free PIN")]
    PinSpaceExhausted,
    #[error("session store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session store {path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub pin: String,
    pub topic: String,
    pub style_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
}

impl Session {
    pub fn theme(&self) -> Theme {
        Theme::for_session(Some(&self.style_id), self.font_family.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub id: String,
    pub text: String,
    pub created_at: u64,
}

/// Anything that can hand the layout a snapshot of raw submissions.
pub trait WordSource {
    fn submissions(&self, session_id: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStore {
    #[serde(default)]
    sessions: BTreeMap<String, Session>,
    #[serde(default)]
    words: BTreeMap<String, Vec<WordEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a store snapshot. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no session store yet, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SessionError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&contents).map_err(|source| SessionError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the snapshot next to `path` first and renames it into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| SessionError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    pub fn create_session(&mut self, topic: &str) -> Result<&Session> {
        self.create_session_with(topic, now_secs(), &mut rand::thread_rng())
    }

    /// Like [`Self::create_session`] with an explicit clock reading and
    /// random source.
    pub fn create_session_with<R: Rng + ?Sized>(
        &mut self,
        topic: &str,
        created_at: u64,
        rng: &mut R,
    ) -> Result<&Session> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SessionError::EmptyTopic);
        }
        let pin = self.free_pin(rng)?;
        let id = loop {
            let candidate = random_id(rng);
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        tracing::info!(session = %id, pin = %pin, topic, "session created");
        let session = Session {
            id: id.clone(),
            pin,
            topic: topic.to_string(),
            style_id: DEFAULT_STYLE_ID.to_string(),
            font_family: None,
            created_at,
        };
        Ok(self.sessions.entry(id).or_insert(session))
    }

    fn free_pin<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        for _ in 0..PIN_ATTEMPTS {
            let pin = rng.gen_range(100_000..=999_999u32).to_string();
            if self.sessions.values().all(|session| session.pin != pin) {
                return Ok(pin);
            }
        }
        Err(SessionError::PinSpaceExhausted)
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn find_by_pin(&self, pin: &str) -> Result<Option<&Session>> {
        if !PIN_RE.is_match(pin) {
            return Err(SessionError::InvalidPin(pin.to_string()));
        }
        Ok(self.sessions.values().find(|session| session.pin == pin))
    }

    /// Resolves either a session id or a six-digit PIN.
    pub fn lookup(&self, key: &str) -> Option<&Session> {
        let key = key.trim();
        if PIN_RE.is_match(key)
            && let Ok(Some(session)) = self.find_by_pin(key)
        {
            return Some(session);
        }
        self.get(key)
    }

    /// Newest first; ties fall back to id order.
    pub fn list(&self) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self.sessions.values().collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    pub fn set_style(&mut self, session_id: &str, style_id: &str) -> Result<()> {
        let session = self.session_mut(session_id)?;
        if Theme::by_id(style_id).is_none() {
            tracing::warn!(
                session = session_id,
                style_id,
                "unknown style, default theme will be used"
            );
        }
        session.style_id = style_id.to_string();
        Ok(())
    }

    pub fn set_font(&mut self, session_id: &str, font_family: Option<&str>) -> Result<()> {
        let session = self.session_mut(session_id)?;
        session.font_family = font_family
            .map(str::trim)
            .filter(|family| !family.is_empty())
            .map(str::to_string);
        Ok(())
    }

    /// Removes the session together with all of its words.
    pub fn delete_session(&mut self, session_id: &str) -> Result<Session> {
        let session = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
        let removed = self.words.remove(session_id).map_or(0, |words| words.len());
        tracing::info!(session = session_id, words = removed, "session deleted");
        Ok(session)
    }

    pub fn submit_word(&mut self, session_id: &str, text: &str) -> Result<&WordEntry> {
        self.submit_word_with(session_id, text, now_secs(), &mut rand::thread_rng())
    }

    pub fn submit_word_with<R: Rng + ?Sized>(
        &mut self,
        session_id: &str,
        text: &str,
        created_at: u64,
        rng: &mut R,
    ) -> Result<&WordEntry> {
        if !self.sessions.contains_key(session_id) {
            return Err(SessionError::UnknownSession(session_id.to_string()));
        }
        let text = normalize_word(text).ok_or(SessionError::EmptyWord)?;
        tracing::debug!(session = session_id, word = %text, "word submitted");
        let words = self.words.entry(session_id.to_string()).or_default();
        words.push(WordEntry {
            id: random_id(rng),
            text,
            created_at,
        });
        Ok(&words[words.len() - 1])
    }

    pub fn words(&self, session_id: &str) -> &[WordEntry] {
        self.words.get(session_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn session_mut(&mut self, session_id: &str) -> Result<&mut Session> {
        self.sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))
    }
}

impl WordSource for SessionStore {
    fn submissions(&self, session_id: &str) -> Result<Vec<String>> {
        if !self.sessions.contains_key(session_id) {
            return Err(SessionError::UnknownSession(session_id.to_string()));
        }
        Ok(self
            .words(session_id)
            .iter()
            .map(|entry| entry.text.clone())
            .collect())
    }
}

/// Guest entry link: `<base>/<pin>`.
pub fn join_url(base: &str, pin: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), pin)
}

/// Image URL of a square QR code pointing at `target`.
pub fn qr_code_url(target: &str, size: u32) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("size", &format!("{size}x{size}"))
        .append_pair("data", target)
        .finish();
    format!("{QR_ENDPOINT}?{query}")
}

fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn store_with_session() -> (SessionStore, String) {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let id = store
            .create_session_with("Retro", 100, &mut rng)
            .unwrap()
            .id
            .clone();
        (store, id)
    }

    #[test]
    fn new_session_has_id_pin_and_default_style() {
        let (store, id) = store_with_session();
        let session = store.get(&id).unwrap();
        assert_eq!(session.id.len(), 9);
        assert!(session.id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(PIN_RE.is_match(&session.pin));
        assert_eq!(session.style_id, DEFAULT_STYLE_ID);
        assert_eq!(session.topic, "Retro");
    }

    #[test]
    fn blank_topic_is_rejected() {
        let mut store = SessionStore::new();
        assert!(matches!(store.create_session("   "), Err(SessionError::EmptyTopic)));
    }

    #[test]
    fn pins_are_unique() {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(9);
        for idx in 0..200 {
            store
                .create_session_with(&format!("topic {idx}"), idx, &mut rng)
                .unwrap();
        }
        let mut pins: Vec<&str> = store.list().iter().map(|s| s.pin.as_str()).collect();
        pins.sort_unstable();
        pins.dedup();
        assert_eq!(pins.len(), 200);
    }

    #[test]
    fn pin_lookup_validates_format() {
        let (store, id) = store_with_session();
        let pin = store.get(&id).unwrap().pin.clone();
        assert_eq!(store.find_by_pin(&pin).unwrap().unwrap().id, id);
        assert!(store.find_by_pin("000000").unwrap().is_none());
        assert!(matches!(store.find_by_pin("12345"), Err(SessionError::InvalidPin(_))));
        assert!(matches!(store.find_by_pin("12a456"), Err(SessionError::InvalidPin(_))));
        assert_eq!(store.lookup(&pin).unwrap().id, id);
        assert_eq!(store.lookup(&id).unwrap().id, id);
        assert!(store.lookup("nothing").is_none());
    }

    #[test]
    fn list_is_newest_first() {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        store.create_session_with("old", 10, &mut rng).unwrap();
        store.create_session_with("new", 30, &mut rng).unwrap();
        store.create_session_with("mid", 20, &mut rng).unwrap();
        let topics: Vec<&str> = store.list().iter().map(|s| s.topic.as_str()).collect();
        assert_eq!(topics, ["new", "mid", "old"]);
    }

    #[test]
    fn submitted_words_are_normalized() {
        let (mut store, id) = store_with_session();
        let mut rng = StdRng::seed_from_u64(5);
        store.submit_word_with(&id, "  Team  Spirit ", 101, &mut rng).unwrap();
        store.submit_word_with(&id, "FUN", 102, &mut rng).unwrap();
        assert_eq!(store.submissions(&id).unwrap(), ["team spirit", "fun"]);
        assert!(matches!(
            store.submit_word_with(&id, "   ", 103, &mut rng),
            Err(SessionError::EmptyWord)
        ));
        assert!(matches!(
            store.submit_word("missing", "x"),
            Err(SessionError::UnknownSession(_))
        ));
    }

    #[test]
    fn delete_removes_words_too() {
        let (mut store, id) = store_with_session();
        store.submit_word(&id, "gone").unwrap();
        let removed = store.delete_session(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.get(&id).is_none());
        assert!(store.words(&id).is_empty());
        assert!(matches!(store.submissions(&id), Err(SessionError::UnknownSession(_))));
    }

    #[test]
    fn style_and_font_drive_session_theme() {
        let (mut store, id) = store_with_session();
        store.set_style(&id, "style-3").unwrap();
        store.set_font(&id, Some("Georgia, serif")).unwrap();
        let theme = store.get(&id).unwrap().theme();
        assert_eq!(theme.id, "style-3");
        assert_eq!(theme.font_family, "Georgia, serif");
        store.set_font(&id, Some("  ")).unwrap();
        assert_eq!(store.get(&id).unwrap().font_family, None);
        assert!(store.set_style("missing", "style-2").is_err());
    }

    #[test]
    fn store_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        assert_eq!(SessionStore::load(&path).unwrap(), SessionStore::default());

        let (mut store, id) = store_with_session();
        store.submit_word(&id, "persisted").unwrap();
        store.save(&path).unwrap();
        let loaded = SessionStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert!(!dir.path().join("store.json.tmp").exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"styleId\""));
    }

    #[test]
    fn corrupt_store_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SessionStore::load(&path), Err(SessionError::Format { .. })));
    }

    #[test]
    fn links_are_encoded() {
        let join = join_url("https://cloud.example.org/", "123456");
        assert_eq!(join, "https://cloud.example.org/123456");
        assert_eq!(
            qr_code_url(&join, 150),
            "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data=https%3A%2F%2Fcloud.example.org%2F123456"
        );
    }
}
