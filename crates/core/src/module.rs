//! Circuit modules and the catalog that owns them.

use crate::expression::Partition;
use crate::{Error, Result};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular block with fixed dimensions and a mutable placement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Module {
    name: String,
    area: f64,
    aspect_ratio: f64,
    width: f64,
    height: f64,
    /// Lower-left corner, written by the layout pass.
    x: f64,
    y: f64,
}

impl Module {
    /// Creates a module from its area and aspect ratio (`width / height`).
    ///
    /// `height = sqrt(area / aspect_ratio)` and `width = sqrt(area * aspect_ratio)`.
    pub fn from_area(name: impl Into<String>, area: f64, aspect_ratio: f64) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidModule("module name is empty".into()));
        }
        if name.parse::<Partition>().is_ok() {
            return Err(Error::InvalidModule(format!(
                "{} is reserved for partitions",
                name
            )));
        }
        if !area.is_finite() || area <= 0.0 {
            return Err(Error::InvalidModule(format!(
                "{}: area must be positive, got {}",
                name, area
            )));
        }
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(Error::InvalidModule(format!(
                "{}: aspect ratio must be positive, got {}",
                name, aspect_ratio
            )));
        }

        Ok(Self {
            height: (area / aspect_ratio).sqrt(),
            width: (area * aspect_ratio).sqrt(),
            name,
            area,
            aspect_ratio,
            x: 0.0,
            y: 0.0,
        })
    }

    /// Returns the module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the module area as given in the input.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Returns the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Returns the width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the placement of the lower-left corner.
    pub fn placement(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub(crate) fn set_placement(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}

/// Fixed set of modules, indexed by insertion order and by name.
///
/// The catalog is never restructured once a search starts; the layout pass
/// only annotates placements.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl ModuleCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from modules, rejecting duplicate names.
    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> Result<Self> {
        let mut catalog = Self::new();
        for module in modules {
            catalog.add(module)?;
        }
        Ok(catalog)
    }

    /// Adds a module and returns its index.
    pub fn add(&mut self, module: Module) -> Result<usize> {
        if self.index.contains_key(module.name()) {
            return Err(Error::DuplicateModule(module.name().to_string()));
        }
        let idx = self.modules.len();
        self.index.insert(module.name().to_string(), idx);
        self.modules.push(module);
        Ok(idx)
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if the catalog holds no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module at `idx`. Panics on an out-of-range index.
    pub fn get(&self, idx: usize) -> &Module {
        &self.modules[idx]
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut Module {
        &mut self.modules[idx]
    }

    /// Looks up a module index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Looks up a module by name.
    pub fn by_name(&self, name: &str) -> Option<&Module> {
        self.index_of(name).map(|idx| &self.modules[idx])
    }

    /// Iterates modules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Sum of module areas; a lower bound for any floorplan.
    pub fn total_module_area(&self) -> f64 {
        self.modules.iter().map(|m| m.width * m.height).sum()
    }

    /// Moves every module back to the origin.
    pub fn reset_placements(&mut self) {
        for module in &mut self.modules {
            module.set_placement(0.0, 0.0);
        }
    }
}
