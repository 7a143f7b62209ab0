//! Decoding of bracket-nested request parameters.
//!
//! Grid widgets send their state as flat keys such as `columns[0][data]` or
//! `order[1][dir]`. [`decode`] folds those pairs into a [`ParamValue`] tree where
//! every bracket segment becomes one level of nesting. Digit segments stay string
//! keys; callers that treat them as ordinal ids go through [`ParamValue::indexed`]
//! (ids kept) or [`ParamValue::into_list`] (ids collapsed to positions).

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    Map(BTreeMap<String, ParamValue>),
    List(Vec<ParamValue>),
}

impl Default for ParamValue {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl ParamValue {
    /// Looks up a child. Lists accept the decimal index as key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(children) => children.get(key),
            Self::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            Self::Scalar(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Shorthand for `get(key).and_then(as_str)`.
    #[must_use]
    pub fn str_at(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Self::as_str)
    }

    /// Children addressed by ordinal id, in ascending numeric order.
    ///
    /// Map keys that are not made of ASCII digits only are skipped.
    #[must_use]
    pub fn indexed(&self) -> Vec<(usize, &Self)> {
        match self {
            Self::Map(children) => {
                let mut entries: Vec<(usize, &Self)> =
                    children.iter().filter_map(|(key, value)| ordinal(key).map(|i| (i, value))).collect();
                entries.sort_by_key(|(i, _)| *i);
                entries
            }
            Self::List(items) => items.iter().enumerate().collect(),
            Self::Scalar(_) => Vec::new(),
        }
    }

    /// Turns a digit-keyed map into a dense list ordered by ordinal id.
    ///
    /// Gaps in the ids collapse; non-ordinal keys are dropped. Scalars and lists are returned as is.
    #[must_use]
    pub fn into_list(self) -> Self {
        match self {
            Self::Map(children) => {
                let mut entries: Vec<(usize, Self)> =
                    children.into_iter().filter_map(|(key, value)| ordinal(&key).map(|i| (i, value))).collect();
                entries.sort_by_key(|(i, _)| *i);
                Self::List(entries.into_iter().map(|(_, value)| value).collect())
            }
            other => other,
        }
    }

    /// Items of a list, or nothing for any other shape.
    #[must_use]
    pub fn items(&self) -> &[Self] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }
}

fn ordinal(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Decodes flat `(key, value)` pairs into a nested map.
///
/// Pairs are applied in iteration order, so a repeated key keeps its last value.
/// When a key needs to descend through a slot that already holds a scalar, that
/// pair is dropped.
pub fn decode<I, K, V>(pairs: I) -> ParamValue
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut root = BTreeMap::new();
    for (key, value) in pairs {
        let segments = split_segments(key.as_ref());
        assign(&mut root, &segments, value.into());
    }
    ParamValue::Map(root)
}

/// `a[b][]` -> `["a", "b", ""]`. Text between a `]` and the next `[` is glued onto the previous segment.
fn split_segments(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_owned()];
    };

    let mut segments = vec![key[..open].to_owned()];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix('[') {
            let (token, tail) = inner.split_once(']').unwrap_or((inner, ""));
            segments.push(token.to_owned());
            rest = tail;
        } else {
            let cut = rest.find('[').unwrap_or(rest.len());
            if let Some(last) = segments.last_mut() {
                last.push_str(&rest[..cut]);
            }
            rest = &rest[cut..];
        }
    }
    segments
}

fn assign(root: &mut BTreeMap<String, ParamValue>, segments: &[String], value: String) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        let slot = node.entry(segment.clone()).or_default();
        match slot {
            ParamValue::Map(children) => node = children,
            ParamValue::Scalar(_) | ParamValue::List(_) => return,
        }
    }
    node.insert(last.clone(), ParamValue::Scalar(value));
}
