//! Named color combinations, loaded once from a JSON file.
//!
//! The file is an array of `{"id": 1, "name": "...", "colors": ["#RRGGBB",
//! ...]}` entries. Combinations are immutable after load and looked up by id.

use std::{collections::BTreeMap, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    color::Rgb,
    error::{CardError, CardResult},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ColorCombination {
    pub id: u32,
    pub name: String,
    pub colors: Vec<Rgb>,
}

pub struct Palette {
    combinations: BTreeMap<u32, ColorCombination>,
}

impl Palette {
    pub fn load(path: &Path) -> CardResult<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open palette '{}'", path.display()))?;
        let entries: Vec<ColorCombination> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse palette '{}'", path.display()))?;
        Self::from_combinations(entries)
    }

    /// A combination with fewer than two colors can never form a gradient,
    /// so it is rejected at load time rather than at request time.
    pub fn from_combinations(entries: Vec<ColorCombination>) -> CardResult<Self> {
        let mut combinations = BTreeMap::new();
        for entry in entries {
            if entry.colors.len() < 2 {
                return Err(CardError::InsufficientColors(entry.colors.len()));
            }
            combinations.insert(entry.id, entry);
        }
        Ok(Self { combinations })
    }

    pub fn lookup(&self, id: u32) -> CardResult<&ColorCombination> {
        self.combinations
            .get(&id)
            .ok_or(CardError::CombinationNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}
