use crate::config::AppConfig;
use crate::errors::{PricingError, PricingResult};
use crate::models::binomial::BinomialTree;
use crate::models::black_scholes::BlackScholes;
use crate::models::monte_carlo::MonteCarlo;
use crate::models::PricingModel;
use std::collections::HashMap;
use std::sync::Arc;

/// Model id used when a request names none.
pub const DEFAULT_MODEL: &str = "black-scholes";

/// Maps model identifiers (canonical ids and aliases) to strategy objects.
/// Built once at startup, read-only afterwards. No fallback on a miss.
pub struct ModelRegistry {
    by_id: HashMap<String, Arc<dyn PricingModel>>,
    /// Canonical ids in registration order
    order: Vec<&'static str>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register the models listed in config. Unknown names are a config error.
    pub fn from_config(cfg: &AppConfig) -> PricingResult<Self> {
        let mut registry = Self::new();
        for name in &cfg.pricing_models {
            let model: Arc<dyn PricingModel> = match normalize_id(name).as_str() {
                "black-scholes" | "closed-form" | "bs" => Arc::new(BlackScholes::new()),
                "monte-carlo" | "simulation" | "mc" => {
                    Arc::new(MonteCarlo::new(cfg.mc_paths, cfg.mc_seed))
                }
                "binomial" | "lattice" | "crr" => Arc::new(BinomialTree::new(cfg.binomial_steps)),
                other => {
                    return Err(PricingError::Config(format!(
                        "PRICING_MODELS: unknown model '{other}'"
                    )))
                }
            };
            registry.register(model);
        }
        Ok(registry)
    }

    /// Register under the model's id and every alias. Re-registering an id replaces it.
    pub fn register(&mut self, model: Arc<dyn PricingModel>) {
        let id = model.id();
        if !self.order.contains(&id) {
            self.order.push(id);
        }
        for alias in model.aliases() {
            self.by_id.insert(normalize_id(alias), Arc::clone(&model));
        }
        self.by_id.insert(normalize_id(id), model);
        tracing::debug!(model = id, "pricing model registered");
    }

    pub fn resolve(&self, identifier: &str) -> PricingResult<&dyn PricingModel> {
        self.by_id
            .get(&normalize_id(identifier))
            .map(|m| m.as_ref())
            .ok_or_else(|| PricingError::InvalidModel(identifier.to_string()))
    }

    pub fn ids(&self) -> &[&'static str] {
        &self.order
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase, trimmed, spaces and underscores as hyphens: "Monte Carlo" -> "monte-carlo".
pub fn normalize_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_registry() -> ModelRegistry {
        ModelRegistry::from_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_wire_names_resolve() {
        let registry = full_registry();
        assert_eq!(registry.resolve("Black-Scholes").unwrap().id(), "black-scholes");
        assert_eq!(registry.resolve("Monte Carlo").unwrap().id(), "monte-carlo");
        assert_eq!(registry.resolve("Binomial").unwrap().id(), "binomial");
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = full_registry();
        assert_eq!(registry.resolve("closed-form").unwrap().id(), "black-scholes");
        assert_eq!(registry.resolve("simulation").unwrap().id(), "monte-carlo");
        assert_eq!(registry.resolve("LATTICE").unwrap().id(), "binomial");
    }

    #[test]
    fn test_unknown_is_invalid_model() {
        let registry = full_registry();
        match registry.resolve("Heston") {
            Err(PricingError::InvalidModel(id)) => assert_eq!(id, "Heston"),
            other => panic!("expected InvalidModel, got {:?}", other.map(|m| m.id())),
        }
    }

    #[test]
    fn test_unregistered_model_not_resolved() {
        let cfg = AppConfig {
            pricing_models: vec!["black-scholes".into()],
            ..AppConfig::default()
        };
        let registry = ModelRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.ids(), ["black-scholes"]);
        assert!(matches!(registry.resolve("binomial"), Err(PricingError::InvalidModel(_))));
    }

    #[test]
    fn test_unknown_config_entry_rejected() {
        let cfg = AppConfig {
            pricing_models: vec!["black-scholes".into(), "heston".into()],
            ..AppConfig::default()
        };
        assert!(matches!(ModelRegistry::from_config(&cfg), Err(PricingError::Config(_))));
    }

    #[test]
    fn test_ids_in_config_order() {
        assert_eq!(full_registry().ids(), ["black-scholes", "monte-carlo", "binomial"]);
    }
}
