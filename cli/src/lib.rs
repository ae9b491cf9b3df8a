//! File helpers shared by the `sheet` and `simulate` binaries.

use anyhow::Context;
use encoding_rs::Encoding;
use sheet_engine::rules::load_rules;
use sheet_engine::{Character, Rules};
use std::{fs, path::Path, sync::Arc};

/// Read a text file, honouring a UTF-8 or UTF-16 byte order mark.
pub fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

/// The balance file at `path`, or the built-in rules.
pub fn rules_or_default(path: Option<&Path>) -> anyhow::Result<Arc<Rules>> {
    Ok(Arc::new(match path {
        Some(path) => load_rules(path)?,
        None => Rules::default(),
    }))
}

pub fn load_sheet(path: &Path, rules: &Arc<Rules>) -> anyhow::Result<Character> {
    let text =
        read_text_auto(path).with_context(|| format!("failed to read {}", path.display()))?;
    Character::from_json(&text, Arc::clone(rules))
        .with_context(|| format!("failed to load sheet {}", path.display()))
}
