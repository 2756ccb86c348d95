use indexmap::IndexMap;

use crate::ir::Ty;

/// Ordered `(field, type)` list of one record type.
pub type Fields = IndexMap<String, Ty>;

/// Record type definitions discovered during one inference pass.
///
/// Entries keep the position of their first reservation. Their field lists are
/// replaced wholesale when another origin defines the same name.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: IndexMap<String, Entry>,
    collisions: Vec<Collision>,
}

#[derive(Clone, Debug, Default)]
struct Entry {
    fields: Fields,
    origin: Option<String>, // hint path of the last definition
}

/// Two structurally different positions derived the same type name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collision {
    pub type_name: String,
    pub previous: String,
    pub replacement: String,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a slot for `name` before its fields are known.
    pub(super) fn reserve(&mut self, name: &str) {
        if !self.types.contains_key(name) {
            self.types.insert(name.to_string(), Entry::default());
        }
    }

    /// Set the field list of `name`. A different origin overwrites it and the
    /// collision is returned; the same origin again (a later array element)
    /// leaves the first layout in place.
    pub(super) fn define(&mut self, name: &str, origin: &str, fields: Fields) -> Option<Collision> {
        let entry = self.types.entry(name.to_string()).or_default();
        let collision = match entry.origin.as_deref() {
            Some(previous) if previous == origin => return None,
            Some(previous) => Some(Collision {
                type_name: name.to_string(),
                previous: previous.to_string(),
                replacement: origin.to_string(),
            }),
            None => None,
        };
        entry.fields = fields;
        entry.origin = Some(origin.to_string());
        if let Some(c) = &collision {
            self.collisions.push(c.clone());
        }
        collision
    }

    pub fn get(&self, name: &str) -> Option<&Fields> {
        self.types.get(name).map(|e| &e.fields)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fields)> {
        self.types.iter().map(|(name, e)| (name.as_str(), &e.fields))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }
}
