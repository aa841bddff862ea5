//! URL-fragment-backed [`KeyValueStorage`] implementations.
//!
//! The fragment is one shared mutable string. [`FragmentField`] multiplexes
//! named fields into it as `name%base64(value)` segments joined by `--`, so
//! several stores can share one link. [`RawFragment`] is the single-document
//! variant that treats the whole fragment as one base64 payload.

use std::sync::{Arc, Mutex};

use base64::Engine;

use crate::storage::{KeyValueStorage, StorageError};

/// Separator between `name%payload` segments in the fragment string.
pub const SEGMENT_SEPARATOR: &str = "--";

/// Delimiter between a segment's field name and its base64 payload.
///
/// `'%'` is disjoint from the standard base64 alphabet and its `=` padding,
/// so splitting on the first occurrence can never split inside a payload.
pub const FIELD_DELIMITER: char = '%';

/// A shared mutable fragment string, the stand-in for `location.hash`.
///
/// Clones share the underlying string, so several codecs bound to different
/// field names read and rewrite the same state. A browser host keeps this in
/// sync with the real location fragment; tests and native hosts use it as-is.
#[derive(Clone, Default)]
pub struct Fragment {
    hash: Arc<Mutex<String>>,
}

impl Fragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fragment seeded with an existing hash string, e.g. the
    /// fragment of a shared link being opened.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self {
            hash: Arc::new(Mutex::new(hash.into())),
        }
    }

    /// Returns the current fragment string.
    pub fn read(&self) -> String {
        self.hash.lock().unwrap().clone()
    }

    /// Replaces the entire fragment string.
    pub fn write(&self, hash: impl Into<String>) {
        *self.hash.lock().unwrap() = hash.into();
    }
}

/// [`KeyValueStorage`] over one named field of a [`Fragment`].
///
/// The field name is fixed at construction; the `key` arguments of the trait
/// are ignored. Writing re-serializes the whole fragment: the matching
/// segment is replaced in place, other fields' segments are left untouched,
/// and a field not yet present is appended. Fields are never deleted.
///
/// # Examples
///
/// ```
/// use livepen_core::fragment::{Fragment, FragmentField};
/// use livepen_core::storage::KeyValueStorage;
///
/// let fragment = Fragment::new();
/// let js = FragmentField::new("js", fragment.clone());
/// js.set_item("js", "x = 1").unwrap();
/// assert_eq!(fragment.read(), "js%eCA9IDE=");
/// assert_eq!(js.get_item("js").unwrap().as_deref(), Some("x = 1"));
/// ```
pub struct FragmentField {
    field: String,
    fragment: Fragment,
}

impl FragmentField {
    pub fn new(field: impl Into<String>, fragment: Fragment) -> Self {
        Self {
            field: field.into(),
            fragment,
        }
    }

    /// The field name this codec reads and writes.
    pub fn field(&self) -> &str {
        &self.field
    }

    fn segment(&self, encoded: &str) -> String {
        format!("{}{}{}", self.field, FIELD_DELIMITER, encoded)
    }
}

impl KeyValueStorage for FragmentField {
    /// Scans the fragment for this codec's field and decodes its payload.
    ///
    /// If duplicate segments carry the same name the last one wins; earlier
    /// duplicates are not decoded at all, so a malformed stale duplicate
    /// cannot fail a read the last one satisfies. A segment without a
    /// delimiter is malformed: it never matches, even when its whole text
    /// equals the field name.
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        let hash = self.fragment.read();
        let mut encoded = None;
        for segment in hash.split(SEGMENT_SEPARATOR).filter(|s| !s.is_empty()) {
            let Some((name, payload)) = segment.split_once(FIELD_DELIMITER) else {
                continue;
            };
            if name == self.field {
                encoded = Some(payload);
            }
        }
        match encoded {
            Some(payload) => decode_payload(payload).map(Some),
            None => Ok(None),
        }
    }

    /// Full read-modify-write of the fragment string.
    ///
    /// Empty segments are preserved when rebuilding so other fields keep
    /// their positions; only the matching scan skips them.
    fn set_item(&self, _key: &str, value: &str) -> Result<(), StorageError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(value.as_bytes());
        let current = self.fragment.read();
        let mut replaced = false;
        let rebuilt: Vec<String> = current
            .split(SEGMENT_SEPARATOR)
            .map(|segment| {
                let name = segment
                    .split_once(FIELD_DELIMITER)
                    .map_or(segment, |(name, _)| name);
                if name == self.field {
                    replaced = true;
                    self.segment(&encoded)
                } else {
                    segment.to_string()
                }
            })
            .collect();
        let mut next = rebuilt.join(SEGMENT_SEPARATOR);
        if !replaced {
            if !next.is_empty() {
                next.push_str(SEGMENT_SEPARATOR);
            }
            next.push_str(&self.segment(&encoded));
        }
        self.fragment.write(next);
        Ok(())
    }
}

/// [`KeyValueStorage`] that treats the entire [`Fragment`] as a single
/// base64 payload, with no field names.
///
/// This is the one-editor format: shorter links, but only one document per
/// fragment. Do not mix it with [`FragmentField`] on the same fragment; the
/// two formats are mutually unreadable.
pub struct RawFragment {
    fragment: Fragment,
}

impl RawFragment {
    pub fn new(fragment: Fragment) -> Self {
        Self { fragment }
    }
}

impl KeyValueStorage for RawFragment {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        let hash = self.fragment.read();
        if hash.is_empty() {
            return Ok(None);
        }
        decode_payload(&hash).map(Some)
    }

    fn set_item(&self, _key: &str, value: &str) -> Result<(), StorageError> {
        self.fragment
            .write(base64::engine::general_purpose::STANDARD.encode(value.as_bytes()));
        Ok(())
    }
}

fn decode_payload(encoded: &str) -> Result<String, StorageError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StorageError::InvalidBase64)?;
    String::from_utf8(bytes).map_err(|_| StorageError::InvalidUtf8)
}
