use serde::ser::{Serialize, SerializeMap, Serializer};

/// Build the environment variable name for a declaration path.
///
/// Segments are joined with `_`, an `_` is inserted before every uppercase
/// ASCII letter, and the result is uppercased:
/// `["database", "maxPool"]` → `DATABASE_MAX_POOL`.
pub fn environment_name<I, S>(path: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = path
        .into_iter()
        .map(|segment| segment.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("_");

    let mut out = String::with_capacity(joined.len() + 4);
    for c in joined.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c);
    }
    out.to_uppercase()
}

/// Resolved variables, in the order they were visited.
///
/// Inserting a name that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    entries: Vec<(String, String)>,
}

impl ResolvedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for ResolvedEnvironment {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut env = Self::new();
        for (name, value) in iter {
            env.insert(name, value);
        }
        env
    }
}

impl Serialize for ResolvedEnvironment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
