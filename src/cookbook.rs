//! A named registry of recipes.

use crate::error::{LeavenError, Result};
use crate::recipe::Recipe;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Cookbook {
    recipes: BTreeMap<String, Recipe>,
}

impl Cookbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `recipe` under `name`.
    ///
    /// # Errors
    ///
    /// Cookbook error if the name is empty or already taken.
    pub fn add(&mut self, name: impl Into<String>, recipe: Recipe) -> Result<&mut Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LeavenError::Cookbook(
                "Recipe name should be a non empty string".to_owned(),
            ));
        }
        if self.recipes.contains_key(&name) {
            return Err(LeavenError::Cookbook(format!(
                "Recipe \"{name}\" already registered."
            )));
        }
        debug!(recipe = %name, steps = recipe.len(), "Recipe registered");
        self.recipes.insert(name, recipe);
        Ok(self)
    }

    /// # Errors
    ///
    /// Cookbook error if no recipe is registered under `name`.
    pub fn get(&self, name: &str) -> Result<&Recipe> {
        self.recipes.get(name).ok_or_else(|| not_found(name))
    }

    /// # Errors
    ///
    /// Cookbook error if no recipe is registered under `name`.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Recipe> {
        self.recipes.get_mut(name).ok_or_else(|| not_found(name))
    }

    /// # Errors
    ///
    /// Cookbook error if no recipe is registered under `name`.
    pub fn remove(&mut self, name: &str) -> Result<Recipe> {
        self.recipes.remove(name).ok_or_else(|| not_found(name))
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.recipes.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

fn not_found(name: &str) -> LeavenError {
    LeavenError::Cookbook(format!("Recipe \"{name}\" not found on this Cookbook."))
}
