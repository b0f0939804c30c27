//! Read-only reward catalog.
//!
//! Built in, or loaded from a JSON array of rewards at startup.

use std::collections::HashSet;
use std::path::Path;

use crate::errors::AppError;
use crate::models::{Reward, RewardCategory};

#[derive(Debug, Clone)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    /// Validate and order rewards by ascending cost.
    pub fn new(mut rewards: Vec<Reward>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for reward in &rewards {
            if !seen.insert(reward.id.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate reward id '{}' in catalog",
                    reward.id
                )));
            }
            if reward.cost < 0 {
                return Err(AppError::Config(format!(
                    "Reward '{}' has a negative cost",
                    reward.id
                )));
            }
        }

        rewards.sort_by_key(|r| r.cost);
        Ok(Self { rewards })
    }

    pub fn builtin() -> Self {
        let reward = |id: &str, name: &str, cost, icon: &str, description: &str, category| Reward {
            id: id.to_string(),
            name: name.to_string(),
            cost,
            icon: icon.to_string(),
            description: description.to_string(),
            category,
        };

        Self {
            rewards: vec![
                reward("1", "Cafè Prèmium", 100, "coffee", "Vàlid a qualsevol màquina de la planta.", RewardCategory::Food),
                reward("2", "Entrepà Menjador", 250, "sandwich", "Entrepà a elecció (Fred o Calent).", RewardCategory::Food),
                reward("3", "Val 15€ ALDI", 1500, "shopping-bag", "Targeta regal per a supermercats.", RewardCategory::Food),
                reward("4", "Pack Cinema (2 Entrades)", 1800, "clapperboard", "Vàlid per a Cinesa o Yelmo.", RewardCategory::Leisure),
                reward("5", "Xec 20€ Amazon", 2000, "gift", "Codi digital per a compres online.", RewardCategory::Merch),
                reward("6", "Targeta Repsol 20€", 2000, "car", "Per a combustible o botiga.", RewardCategory::Merch),
                reward("7", "Entrada Port Aventura", 5000, "ticket", "Entrada d'1 dia per a adult.", RewardCategory::Leisure),
                reward("8", "Dia Lliure Extra", 10000, "calendar", "Subjecte a aprovació de RRHH.", RewardCategory::Leisure),
            ],
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read catalog {}: {}", path.display(), e))
        })?;
        let rewards: Vec<Reward> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid catalog {}: {}", path.display(), e))
        })?;
        Self::new(rewards)
    }

    /// The file at `path` if given, otherwise the built-in catalog.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Rewards, cheapest first.
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn find(&self, id: &str) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_builtin_is_sorted_by_cost() {
        let catalog = RewardCatalog::builtin();
        let costs: Vec<i64> = catalog.rewards().iter().map(|r| r.cost).collect();
        let mut sorted = costs.clone();
        sorted.sort();
        assert_eq!(costs, sorted);
        assert_eq!(catalog.find("2").unwrap().cost, 250);
        assert!(catalog.find("99").is_none());
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "b", "name": "Samarreta", "cost": 800, "category": "MERCH"}},
                {{"id": "a", "name": "Cafè", "cost": 50, "icon": "coffee", "category": "FOOD"}}
            ]"#
        )
        .unwrap();

        let catalog = RewardCatalog::load(Some(file.path())).unwrap();
        let ids: Vec<&str> = catalog.rewards().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(catalog.find("b").unwrap().icon, "");
    }

    #[test]
    fn test_rejects_duplicates_and_negative_costs() {
        let reward = |id: &str, cost| Reward {
            id: id.to_string(),
            name: id.to_string(),
            cost,
            icon: String::new(),
            description: String::new(),
            category: RewardCategory::Food,
        };

        assert!(matches!(
            RewardCatalog::new(vec![reward("a", 1), reward("a", 2)]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            RewardCatalog::new(vec![reward("a", -1)]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert!(matches!(
            RewardCatalog::load(Some(Path::new("/nonexistent/catalog.json"))),
            Err(AppError::Config(_))
        ));
    }
}
