//! Entity models: places, persons and religions that suggestions point at.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of entity a suggestion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Place,
    Person,
    Religion,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::Person => "person",
            Self::Religion => "religion",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "place" => Some(Self::Place),
            "person" => Some(Self::Person),
            "religion" => Some(Self::Religion),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping key for matches: one entity of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub entity_id: i32,
}

impl EntityKey {
    pub fn new(kind: EntityKind, entity_id: i32) -> Self {
        Self { kind, entity_id }
    }
}

/// A place with its primary name and every alternate spelling or transliteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub id: i32,
    pub name: String,
    pub alternate_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    /// Free-form lifetime or activity range, e.g. "1820-1891".
    pub time_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Religion {
    pub id: i32,
    pub name: String,
}

/// Small identifying record carried by candidate terms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
}

impl From<&Place> for EntityRef {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id,
            name: place.name.clone(),
            time_range: None,
        }
    }
}

impl From<&Person> for EntityRef {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
            time_range: person.time_range.clone(),
        }
    }
}

impl From<&Religion> for EntityRef {
    fn from(religion: &Religion) -> Self {
        Self {
            id: religion.id,
            name: religion.name.clone(),
            time_range: None,
        }
    }
}

/// Every entity known to storage, loaded once per refresh run.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    pub places: Vec<Place>,
    pub persons: Vec<Person>,
    pub religions: Vec<Religion>,
    index: HashMap<EntityKey, usize>,
}

impl EntityCatalog {
    pub fn new(places: Vec<Place>, persons: Vec<Person>, religions: Vec<Religion>) -> Self {
        let mut index = HashMap::with_capacity(places.len() + persons.len() + religions.len());
        for (i, p) in places.iter().enumerate() {
            index.insert(EntityKey::new(EntityKind::Place, p.id), i);
        }
        for (i, p) in persons.iter().enumerate() {
            index.insert(EntityKey::new(EntityKind::Person, p.id), i);
        }
        for (i, r) in religions.iter().enumerate() {
            index.insert(EntityKey::new(EntityKind::Religion, r.id), i);
        }
        Self {
            places,
            persons,
            religions,
            index,
        }
    }

    /// Resolve an entity to its identifying record.
    pub fn lookup(&self, key: EntityKey) -> Option<EntityRef> {
        let i = *self.index.get(&key)?;
        Some(match key.kind {
            EntityKind::Place => EntityRef::from(&self.places[i]),
            EntityKind::Person => EntityRef::from(&self.persons[i]),
            EntityKind::Religion => EntityRef::from(&self.religions[i]),
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
