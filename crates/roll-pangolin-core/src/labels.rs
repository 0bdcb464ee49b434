// ── Label compiler ──
//
// Turns flat, namespaced container labels into a typed tree:
//
//   roll-pangolin.auth.password      = "x"   →  { auth: { password: "x" } }
//   roll-pangolin.rules[0].path      = "/a"  →  { rules: [ { path: "/a" } ] }
//   roll-pangolin.tags[1]            = "b"   →  { tags: [ null, "b" ] }
//
// Keys are split on `.`, `[` and `]`; each segment is camel-cased
// (`exposed-path` → `exposedPath`). A numeric segment directly after a field
// selects a slot in that field's sequence; indices above `MAX_INDEX` are
// rejected.
//
// Keys are applied in lexicographic order. The first key to reach a path
// fixes its kind (leaf, branch or sequence); a later key that disagrees is
// rejected with `LabelError::Conflict` and the rest of the set still
// compiles. Two keys naming the same leaf overwrite, last one wins.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Largest sequence index a label may name.
pub const MAX_INDEX: usize = 1024;

/// A label that could not be placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label '{key}' names no field below the namespace")]
    EmptyPath { key: String },

    #[error("label '{key}': index '{index}' does not follow a field")]
    OrphanIndex { key: String, index: String },

    #[error("label '{key}': index '{index}' is above the limit of {MAX_INDEX}")]
    IndexOutOfRange { key: String, index: String },

    #[error("label '{key}' conflicts with an earlier label at '{path}'")]
    Conflict { key: String, path: String },
}

/// Compiled label configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LabelTree {
    Leaf(String),
    Branch(IndexMap<String, LabelTree>),
    /// Sparse slots stay `None` (serialized as `null`).
    Sequence(Vec<Option<LabelTree>>),
}

impl LabelTree {
    fn empty_branch() -> Self {
        Self::Branch(IndexMap::new())
    }

    /// Child field of a branch.
    pub fn get(&self, field: &str) -> Option<&LabelTree> {
        match self {
            Self::Branch(map) => map.get(field),
            _ => None,
        }
    }

    /// Walk a field path from this node.
    pub fn at(&self, path: &[&str]) -> Option<&LabelTree> {
        path.iter().try_fold(self, |node, field| node.get(field))
    }

    /// Leaf value, if this node is a leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// Leaf value at a field path, if present and a leaf.
    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.at(path).and_then(Self::as_str)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "value",
            Self::Branch(_) => "object",
            Self::Sequence(_) => "list",
        }
    }
}

/// Result of compiling one container's labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    /// Tree rooted at the namespace; `None` if no label was placed.
    pub config: Option<LabelTree>,
    /// Labels under the namespace that were rejected.
    pub rejected: Vec<LabelError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Field(String),
    Index(usize),
}

/// Compiles flat labels under one namespace prefix.
#[derive(Debug, Clone)]
pub struct LabelCompiler {
    namespace: String,
}

impl LabelCompiler {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Text after the namespace, if `key` is `ns`, `ns.…` or `ns[…`.
    fn remainder<'k>(&self, key: &'k str) -> Option<&'k str> {
        let rest = key.strip_prefix(self.namespace.as_str())?;
        (rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')).then_some(rest)
    }

    /// Compile every label of `labels` that falls under the namespace.
    pub fn compile<'a, I>(&self, labels: I) -> Compilation
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let ordered: BTreeMap<&str, &str> = labels
            .into_iter()
            .filter_map(|(k, v)| self.remainder(k).map(|_| (k.as_str(), v.as_str())))
            .collect();

        let mut root = LabelTree::empty_branch();
        let mut placed = false;
        let mut rejected = Vec::new();

        for (key, value) in ordered {
            let outcome = self
                .path_of(key)
                .and_then(|steps| insert(&mut root, &steps, value, key, &mut String::new()));
            match outcome {
                Ok(()) => placed = true,
                Err(err) => rejected.push(err),
            }
        }

        Compilation {
            config: placed.then_some(root),
            rejected,
        }
    }

    fn path_of(&self, key: &str) -> Result<Vec<Step>, LabelError> {
        let rest = self.remainder(key).unwrap_or_default();
        let mut steps: Vec<Step> = Vec::new();

        for raw in rest.split(['.', '[', ']']).filter(|s| !s.is_empty()) {
            if !raw.bytes().all(|b| b.is_ascii_digit()) {
                steps.push(Step::Field(camel_case(raw)));
                continue;
            }
            if !matches!(steps.last(), Some(Step::Field(_))) {
                return Err(LabelError::OrphanIndex {
                    key: key.to_owned(),
                    index: raw.to_owned(),
                });
            }
            match raw.parse::<usize>() {
                Ok(i) if i <= MAX_INDEX => steps.push(Step::Index(i)),
                _ => {
                    return Err(LabelError::IndexOutOfRange {
                        key: key.to_owned(),
                        index: raw.to_owned(),
                    });
                }
            }
        }

        if steps.is_empty() {
            return Err(LabelError::EmptyPath {
                key: key.to_owned(),
            });
        }
        Ok(steps)
    }
}

/// `exposed-path` → `exposedPath`, `sso_enabled` → `ssoEnabled`.
///
/// A separator is dropped and the character after it upper-cased; a
/// trailing separator is kept.
fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        if matches!(c, '-' | '_') {
            if let Some(next) = chars.next() {
                out.extend(next.to_uppercase());
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn conflict(key: &str, path: &str) -> LabelError {
    LabelError::Conflict {
        key: key.to_owned(),
        path: if path.is_empty() { "<root>".into() } else { path.to_owned() },
    }
}

/// Place `value` at `steps` below `node`. `at` tracks the path walked so far
/// for error messages.
fn insert(
    node: &mut LabelTree,
    steps: &[Step],
    value: &str,
    key: &str,
    at: &mut String,
) -> Result<(), LabelError> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(());
    };

    let child = match (step, &mut *node) {
        (Step::Field(name), LabelTree::Branch(map)) => {
            if !at.is_empty() {
                at.push('.');
            }
            at.push_str(name);
            map.entry(name.clone())
                .or_insert_with(|| empty_for(rest, value))
        }
        (Step::Index(i), LabelTree::Sequence(items)) => {
            at.push_str(&format!("[{i}]"));
            let len = i.checked_add(1).ok_or_else(|| conflict(key, at))?;
            if items.len() < len {
                items.resize(len, None);
            }
            match items.get_mut(*i) {
                Some(slot) => slot.get_or_insert_with(|| empty_for(rest, value)),
                None => return Err(conflict(key, at)),
            }
        }
        _ => return Err(conflict(key, at)),
    };

    if rest.is_empty() {
        // Final segment: leaf write, never over a branch or sequence.
        return match child {
            LabelTree::Leaf(existing) => {
                value.clone_into(existing);
                Ok(())
            }
            other => Err(LabelError::Conflict {
                key: key.to_owned(),
                path: format!("{at} ({})", other.kind()),
            }),
        };
    }

    insert(child, rest, value, key, at)
}

/// Node kind a fresh path position must take, given what follows it.
fn empty_for(rest: &[Step], value: &str) -> LabelTree {
    match rest.first() {
        None => LabelTree::Leaf(value.to_owned()),
        Some(Step::Index(_)) => LabelTree::Sequence(Vec::new()),
        Some(Step::Field(_)) => LabelTree::empty_branch(),
    }
}
