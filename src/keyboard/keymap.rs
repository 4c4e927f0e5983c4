//! Character to scancode translation
//!
//! A [`KeymapRegistry`] maps layout names to [`Layout`] tables, each of which maps
//! a `char` to the [`KeyEntry`] that types it. Registries are validated while they
//! are built and are read-only afterwards, so they can be shared behind an `Arc`.

use super::layouts;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// The scancode and modifier byte that produce one character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyEntry {
    /// USB HID usage code
    pub scancode: u8,
    /// Modifier bitfield held together with the key
    pub modifier: u8,
}

impl KeyEntry {
    pub const fn new(scancode: u8, modifier: u8) -> Self {
        Self { scancode, modifier }
    }
}

/// Errors raised while building or querying a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("unknown layout '{0}'")]
    UnknownLayout(String),
    #[error("layout '{layout}' maps {character:?} more than once")]
    DuplicateCharacter { layout: String, character: char },
    #[error("layout '{0}' has no entries")]
    EmptyLayout(String),
    #[error("layout '{0}' is defined more than once")]
    DuplicateLayout(String),
    #[error("no layouts defined")]
    NoLayouts,
}

/// One named keymap
#[derive(Debug, Clone)]
pub struct Layout {
    name: String,
    keys: HashMap<char, KeyEntry>,
}

impl Layout {
    /// Build a layout from `(character, scancode, modifier)` rows.
    ///
    /// Fails if a character appears twice or the table is empty.
    pub fn from_table(name: &str, table: &[(char, u8, u8)]) -> Result<Self, KeymapError> {
        if table.is_empty() {
            return Err(KeymapError::EmptyLayout(name.to_string()));
        }

        let mut keys = HashMap::with_capacity(table.len());
        for &(character, scancode, modifier) in table {
            if keys.insert(character, KeyEntry::new(scancode, modifier)).is_some() {
                return Err(KeymapError::DuplicateCharacter {
                    layout: name.to_string(),
                    character,
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            keys,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a character, `None` if this layout cannot type it
    pub fn resolve(&self, character: char) -> Option<KeyEntry> {
        self.keys.get(&character).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All mapped characters, in no particular order
    pub fn characters(&self) -> impl Iterator<Item = char> + '_ {
        self.keys.keys().copied()
    }
}

/// Immutable set of layouts with one designated default
#[derive(Debug, Clone)]
pub struct KeymapRegistry {
    layouts: BTreeMap<String, Layout>,
    default_layout: String,
}

impl KeymapRegistry {
    /// The layouts shipped with the gateway. The default is `thec64-mini-uk`.
    pub fn builtin() -> Result<Self, KeymapError> {
        Self::builder()
            .layout(layouts::THEC64_MINI_UK, layouts::THEC64_MINI_UK_TABLE)
            .layout(layouts::THEC64, layouts::THEC64_TABLE)
            .default_layout(layouts::THEC64_MINI_UK)
            .build()
    }

    pub fn builder() -> KeymapRegistryBuilder {
        KeymapRegistryBuilder::default()
    }

    /// Get a layout by name
    pub fn layout(&self, name: &str) -> Result<&Layout, KeymapError> {
        self.layouts
            .get(name)
            .ok_or_else(|| KeymapError::UnknownLayout(name.to_string()))
    }

    /// Resolve a character in the named layout.
    ///
    /// `Ok(None)` means the layout exists but has no entry for the character.
    pub fn resolve(&self, layout: &str, character: char) -> Result<Option<KeyEntry>, KeymapError> {
        Ok(self.layout(layout)?.resolve(character))
    }

    pub fn default_layout(&self) -> &str {
        &self.default_layout
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    /// Layout names in sorted order
    pub fn layout_names(&self) -> Vec<&str> {
        self.layouts.keys().map(String::as_str).collect()
    }
}

/// Collects layout tables and validates them in [`build`](Self::build)
#[derive(Debug, Default)]
pub struct KeymapRegistryBuilder {
    tables: Vec<(String, Vec<(char, u8, u8)>)>,
    default_layout: Option<String>,
}

impl KeymapRegistryBuilder {
    pub fn layout(mut self, name: impl Into<String>, table: &[(char, u8, u8)]) -> Self {
        self.tables.push((name.into(), table.to_vec()));
        self
    }

    /// Designate the default. Falls back to the first layout added.
    pub fn default_layout(mut self, name: impl Into<String>) -> Self {
        self.default_layout = Some(name.into());
        self
    }

    pub fn build(self) -> Result<KeymapRegistry, KeymapError> {
        let first = self
            .tables
            .first()
            .map(|(name, _)| name.clone())
            .ok_or(KeymapError::NoLayouts)?;

        let mut layouts = BTreeMap::new();
        for (name, table) in &self.tables {
            let layout = Layout::from_table(name, table)?;
            if layouts.insert(name.clone(), layout).is_some() {
                return Err(KeymapError::DuplicateLayout(name.clone()));
            }
        }

        let default_layout = self.default_layout.unwrap_or(first);
        if !layouts.contains_key(&default_layout) {
            return Err(KeymapError::UnknownLayout(default_layout));
        }

        Ok(KeymapRegistry {
            layouts,
            default_layout,
        })
    }
}
