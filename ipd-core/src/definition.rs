//! Strategy definitions - named strategies from JSON files and a built-in
//! registry of classic iterated-dilemma players.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bits::Bits;
use crate::error::GenomeError;
use crate::genome::Genome;
use crate::strategy::Strategy;

/// A strategy as written in a definitions file.
///
/// ```json
/// { "name": "tit-for-tat", "decisions": "10", "start": "1", "count": 500 }
/// ```
///
/// `start` may be omitted, in which case the strategy starts out assuming
/// its opponent always cooperated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDef {
    pub name: String,
    pub decisions: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

impl StrategyDef {
    pub fn to_strategy(&self) -> Result<Strategy, GenomeError> {
        let decisions: Bits = self.decisions.parse()?;
        if decisions.is_empty() {
            return Err(GenomeError::EmptyDecisions);
        }
        let start = match &self.start {
            Some(text) => text.parse()?,
            None => Bits::ones(decisions.len() - 1),
        };
        Ok(Strategy::new(self.name.clone(), Genome::new(start, decisions)?))
    }
}

/// Read a JSON array of [`StrategyDef`]s.
pub fn load_definitions(path: &Path) -> anyhow::Result<Vec<StrategyDef>> {
    let content = std::fs::read_to_string(path)?;
    let defs: Vec<StrategyDef> = serde_json::from_str(&content)?;
    for def in &defs {
        def.to_strategy()
            .map_err(|e| anyhow::anyhow!("strategy {:?}: {}", def.name, e))?;
    }
    Ok(defs)
}

/// (name, start state, decision list)
const BUILTINS: [(&str, &str, &str); 7] = [
    ("always-defect", "", "0"),
    ("always-cooperate", "", "1"),
    ("tit-for-tat", "1", "10"),
    ("suspicious-tit-for-tat", "0", "10"),
    ("tit-for-two-tats", "11", "110"),
    ("grudger-2", "11", "100"),
    ("majority", "110", "1100"),
];

/// Names accepted by [`builtin`]
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _, _)| *name)
}

/// Look up a built-in strategy by name.
pub fn builtin(name: &str) -> Result<Strategy, GenomeError> {
    let (name, start, decisions) = BUILTINS
        .iter()
        .find(|(n, _, _)| *n == name)
        .ok_or_else(|| GenomeError::UnknownStrategy(name.to_string()))?;
    Strategy::parse(*name, start, decisions)
}
