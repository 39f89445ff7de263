//! Resolving strategies named on the command line
//!
//! Level 4 - Utilities

use anyhow::{bail, Context, Result};

use ipd_core::{builtin, builtin_names, Strategy, StrategyId};

/// Resolve a builtin strategy name or a numeric strategy ID.
pub fn parse_player(name_or_id: &str) -> Result<Strategy> {
    if let Ok(id) = name_or_id.parse::<StrategyId>() {
        return Strategy::try_from_id(id, format!("strategy-{}", id))
            .with_context(|| format!("Invalid strategy ID: {}", id));
    }
    builtin(name_or_id).with_context(|| {
        format!(
            "Unknown strategy '{}' (builtins: {})",
            name_or_id,
            builtin_names().collect::<Vec<_>>().join(", ")
        )
    })
}

/// Parse a `NAME=COUNT` population entry. A bare `NAME` means one copy.
pub fn parse_population_entry(entry: &str) -> Result<(Strategy, usize)> {
    let (name_or_id, count) = match entry.split_once('=') {
        Some((name_or_id, count)) => {
            let count: usize = count
                .trim()
                .parse()
                .with_context(|| format!("Invalid count in '{}'", entry))?;
            (name_or_id.trim(), count)
        }
        None => (entry.trim(), 1),
    };
    if name_or_id.is_empty() {
        bail!("Missing strategy name in '{}'", entry);
    }
    Ok((parse_player(name_or_id)?, count))
}
