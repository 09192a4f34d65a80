use serde::Deserialize;
use std::collections::HashMap;

pub const UNKNOWN_ROLE: &str = "Unknown Role";

const CHAMPION_DATASET: &str = include_str!("../data/champions.json");

#[derive(Debug, Deserialize)]
struct ChampionEntry {
    name: String,
    role: String,
    #[serde(default)]
    aliases: Vec<String>,
}

lazy_static::lazy_static! {
    static ref ROLE_TABLE: HashMap<String, String> = build_role_table(CHAMPION_DATASET);
}

fn build_role_table(raw_dataset: &str) -> HashMap<String, String> {
    let entries = match serde_json::from_str::<Vec<ChampionEntry>>(raw_dataset) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::error!(dataset_error = %error, "Embedded champion dataset is unreadable");
            return HashMap::new();
        }
    };

    let mut table = HashMap::with_capacity(entries.len());
    for entry in entries {
        for alias in &entry.aliases {
            table.insert(normalize_champion_name(alias), entry.role.clone());
        }
        table.insert(normalize_champion_name(&entry.name), entry.role);
    }

    table
}

/// Lowercases and drops spaces, apostrophes and periods: `"Kai'Sa"` → `"kaisa"`.
pub fn normalize_champion_name(name: &str) -> String {
    name.chars()
        .filter(|character| !matches!(character, ' ' | '\'' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn role_for_champion(champion_name: &str) -> &'static str {
    ROLE_TABLE
        .get(&normalize_champion_name(champion_name))
        .map(String::as_str)
        .unwrap_or(UNKNOWN_ROLE)
}

pub fn known_champion_count() -> usize {
    ROLE_TABLE.len()
}
