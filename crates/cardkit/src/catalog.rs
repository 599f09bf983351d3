//! The immutable, ordered list of card variants.

use crate::{color::Rgba, error::ViewerError};
use serde::{Deserialize, Deserializer};
use std::{fmt, io::Read, path::Path, sync::Arc};

/// Opaque identifier handed to the resource loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Arc<str>);

impl ResourceId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(String::deserialize(deserializer)?))
    }
}

/// Mastery level, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    pub const MAX: Level = Level(100);

    pub fn new(value: u32) -> Result<Self, ViewerError> {
        if value > 100 {
            return Err(ViewerError::InvalidLevel(value));
        }
        Ok(Self(value as u8))
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Level as a fraction in `[0, 1]`.
    #[inline]
    pub fn fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u32::deserialize(deserializer)?;
        Level::new(raw).map_err(serde::de::Error::custom)
    }
}

/// One displayable variant of the card.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    pub name: String,
    pub level: Level,
    pub tint: Rgba,
    /// Art shown on the front panel.
    pub art: ResourceId,
    /// Texture of the glow plane behind the panel.
    pub background: ResourceId,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        level: Level,
        tint: Rgba,
        art: impl Into<ResourceId>,
        background: impl Into<ResourceId>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            tint,
            art: art.into(),
            background: background.into(),
        }
    }
}

/// Ordered, non-empty item list. Insertion order is the cycle order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Result<Self, ViewerError> {
        if items.is_empty() {
            return Err(ViewerError::InvalidCatalog);
        }
        Ok(Self { items })
    }

    /// Parses a JSON array of items.
    pub fn from_json_str(json: &str) -> Result<Self, ViewerError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ViewerError> {
        Self::new(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ViewerError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `false`: a catalog holds at least one item.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Every distinct resource referenced by the catalog, in first-use order.
    pub fn resource_ids(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = Vec::with_capacity(self.items.len() * 2);
        for item in &self.items {
            for id in [&item.art, &item.background] {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }
}
