//! Reference resolution: from a `$ref` string to the schema node it names.
//!
//! Resolution happens in three steps:
//! 1. the reference is resolved against the scope of the referring node
//!    (RFC 3986), yielding a full URL;
//! 2. the non-fragment part selects a document: the user's own root, or one
//!    of the bundled meta-schemas;
//! 3. the fragment is walked as an RFC 6901 JSON Pointer over schema-tree
//!    edges.
//!
//! Outcomes, including failures, are memoized on the referring document,
//! keyed by the full URL. The cache mutex is only held for the lookup and
//! the insert, never across the walk.

use tracing::{debug, trace};
use url::Url;

use crate::errors::Error;
use crate::registry;
use crate::schema::{Additional, Document, ItemSpec, SchemaId};

/// A memoized resolution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    /// A node of the referring document itself.
    Local(SchemaId),
    /// A node of one of the bundled meta-schemas.
    Meta(registry::MetaSchema, SchemaId),
}

impl Document {
    /// Resolve `reference` relative to the scope of `from`.
    ///
    /// Returns the document the reference lands in (either `self` or a
    /// bundled meta-schema) together with the node it names.
    pub fn resolve(
        &self,
        from: SchemaId,
        reference: &str,
    ) -> Result<(&Document, SchemaId), Error> {
        let url = self.resolve_url(from, reference)?;

        let cached = self
            .resolved
            .lock()
            .expect("resolver cache poisoned")
            .get(&url)
            .cloned();
        if let Some(outcome) = cached {
            trace!(url, "reference cache hit");
            return self.unpack(outcome);
        }

        debug!(reference, url, "resolving schema reference");
        let outcome = self.locate(&url);
        self.resolved
            .lock()
            .expect("resolver cache poisoned")
            .insert(url, outcome.clone());
        self.unpack(outcome)
    }

    fn unpack(&self, outcome: Result<Target, Error>) -> Result<(&Document, SchemaId), Error> {
        match outcome? {
            Target::Local(id) => Ok((self, id)),
            Target::Meta(meta, id) => Ok((meta.document(), id)),
        }
    }

    /// RFC 3986 resolution of `reference` against the nearest enclosing `id`.
    /// With no scope (or an unparseable one) the reference stands alone.
    fn resolve_url(&self, from: SchemaId, reference: &str) -> Result<String, Error> {
        let scope = self.scope(from);
        if scope.is_empty() {
            return Ok(reference.to_string());
        }
        match Url::parse(scope) {
            Ok(base) => match base.join(reference) {
                Ok(u) => Ok(u.to_string()),
                Err(e) => Err(Error::InvalidReference {
                    reference: reference.to_string(),
                    message: format!("cannot resolve against base '{scope}': {e}"),
                }),
            },
            Err(_) => Ok(reference.to_string()),
        }
    }

    /// Select the target document for a fully resolved URL and walk its
    /// fragment.
    fn locate(&self, url: &str) -> Result<Target, Error> {
        let (base, fragment) = match url.split_once('#') {
            Some((base, fragment)) => (base, fragment),
            None => (url, ""),
        };

        let own_id = self.root().id.trim_end_matches('#');
        if base.is_empty() || (!own_id.is_empty() && own_id == base) {
            return walk_pointer(self, url, fragment).map(Target::Local);
        }
        if let Some(meta) = registry::lookup(base) {
            return walk_pointer(meta.document(), url, fragment).map(|id| Target::Meta(meta, id));
        }
        Err(Error::SchemaNotFound {
            id: base.to_string(),
        })
    }
}

// ------------------------------ Pointer walk ------------------------------ //

/// Walk a JSON Pointer fragment over the schema tree. Pointer tokens may
/// address `definitions`, `properties`, `patternProperties` entries (by the
/// regex source text), `items` (directly in single-schema mode, by index in
/// tuple mode), the schema arms of `additionalItems`/`additionalProperties`,
/// `not`, and indices into `allOf`/`anyOf`/`oneOf`.
fn walk_pointer(doc: &Document, url: &str, fragment: &str) -> Result<SchemaId, Error> {
    if fragment.is_empty() {
        return Ok(doc.root_id());
    }
    let Some(path) = fragment.strip_prefix('/') else {
        return Err(walk_error(url, "fragment is not a JSON pointer"));
    };
    let tokens: Vec<String> = path.split('/').map(unescape_token).collect();

    let mut cur = doc.root_id();
    let mut i = 0;
    while i < tokens.len() {
        let node = doc.node(cur);
        let tok = tokens[i].as_str();
        match tok {
            "definitions" | "properties" => {
                let key = key_token(url, &tokens, i, tok)?;
                let map = if tok == "definitions" {
                    &node.definitions
                } else {
                    &node.properties
                };
                cur = *map.get(key).ok_or_else(|| {
                    walk_error(url, &format!("no entry '{key}' under '{tok}'"))
                })?;
                i += 2;
            }
            "patternProperties" => {
                let key = key_token(url, &tokens, i, tok)?;
                cur = node
                    .pattern_properties
                    .iter()
                    .find(|(rx, _)| rx.as_str() == key)
                    .map(|(_, id)| *id)
                    .ok_or_else(|| {
                        walk_error(url, &format!("no pattern '{key}' under 'patternProperties'"))
                    })?;
                i += 2;
            }
            "items" => match &node.items {
                Some(ItemSpec::Single(id)) => {
                    cur = *id;
                    i += 1;
                }
                Some(ItemSpec::Tuple(ids)) => {
                    let idx = index_token(url, &tokens, i, tok, ids.len())?;
                    cur = ids[idx];
                    i += 2;
                }
                None => return Err(walk_error(url, "schema has no 'items'")),
            },
            "additionalItems" | "additionalProperties" => {
                let state = if tok == "additionalItems" {
                    node.additional_items
                } else {
                    node.additional_properties
                };
                match state {
                    Additional::Schema(id) => {
                        cur = id;
                        i += 1;
                    }
                    _ => return Err(walk_error(url, &format!("'{tok}' holds no schema"))),
                }
            }
            "not" => {
                cur = node
                    .not
                    .ok_or_else(|| walk_error(url, "schema has no 'not'"))?;
                i += 1;
            }
            "allOf" | "anyOf" | "oneOf" => {
                let list = match tok {
                    "allOf" => &node.all_of,
                    "anyOf" => &node.any_of,
                    _ => &node.one_of,
                };
                let idx = index_token(url, &tokens, i, tok, list.len())?;
                cur = list[idx];
                i += 2;
            }
            other => {
                return Err(walk_error(
                    url,
                    &format!("'{other}' does not address a schema"),
                ))
            }
        }
    }
    Ok(cur)
}

fn key_token<'a>(
    url: &str,
    tokens: &'a [String],
    i: usize,
    keyword: &str,
) -> Result<&'a str, Error> {
    tokens
        .get(i + 1)
        .map(|s| s.as_str())
        .ok_or_else(|| walk_error(url, &format!("pointer ends inside '{keyword}'")))
}

fn index_token(
    url: &str,
    tokens: &[String],
    i: usize,
    keyword: &str,
    len: usize,
) -> Result<usize, Error> {
    let raw = key_token(url, tokens, i, keyword)?;
    let idx: usize = raw
        .parse()
        .map_err(|_| walk_error(url, &format!("'{raw}' is not an index into '{keyword}'")))?;
    if idx >= len {
        return Err(walk_error(
            url,
            &format!("index {idx} out of range for '{keyword}'"),
        ));
    }
    Ok(idx)
}

fn walk_error(url: &str, message: &str) -> Error {
    Error::InvalidReference {
        reference: url.to_string(),
        message: message.to_string(),
    }
}

/// Undo percent-encoding, then the JSON Pointer escapes (`~1` before `~0`
/// would double-decode, so `~0` last).
fn unescape_token(tok: &str) -> String {
    percent_decode(tok).replace("~1", "/").replace("~0", "~")
}

fn percent_decode(s: &str) -> String {
    fn hex_val(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}
