use std::collections::HashMap;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::inventory::NewItem;
use crate::rules::Rules;

pub fn builtin_catalogs() -> HashMap<&'static str, &'static str> {
    HashMap::from([("starter", include_str!("../content/items/starter.json"))])
}

pub fn builtin_rules() -> Result<Rules> {
    serde_yaml::from_str(include_str!("../content/rules.yaml"))
        .context("failed to parse built-in rules")
}

/// Named item templates, in catalog order.
pub fn catalog(id: &str) -> Result<IndexMap<String, NewItem>> {
    let catalogs = builtin_catalogs();
    let text = catalogs
        .get(id)
        .with_context(|| format!("no built-in catalog '{}'", id))?;
    parse_catalog(text).with_context(|| format!("failed to parse catalog '{}'", id))
}

pub fn parse_catalog(text: &str) -> Result<IndexMap<String, NewItem>> {
    let items: Vec<NewItem> = serde_json::from_str(text)?;
    Ok(items
        .into_iter()
        .map(|item| (item.name.to_lowercase(), item))
        .collect())
}
