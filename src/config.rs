use crate::errors::{PricingError, PricingResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    /// Model ids registered at startup, in display order.
    pub pricing_models: Vec<String>,
    pub mc_paths: usize,
    pub mc_seed: u64,
    pub binomial_steps: usize,
    pub max_grid_cells: usize,
    /// 0 = let rayon pick
    pub grid_threads: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 5000,
            pricing_models: vec![
                "black-scholes".to_string(),
                "monte-carlo".to_string(),
                "binomial".to_string(),
            ],
            mc_paths: 20_000,
            mc_seed: 42,
            binomial_steps: 500,
            max_grid_cells: 2_500,
            grid_threads: 0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> PricingResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let server_port = parse_env("SERVER_PORT", defaults.server_port)?;
        let mc_paths = parse_env("MC_PATHS", defaults.mc_paths)?;
        let mc_seed = parse_env("MC_SEED", defaults.mc_seed)?;
        let binomial_steps = parse_env("BINOMIAL_STEPS", defaults.binomial_steps)?;
        let max_grid_cells = parse_env("MAX_GRID_CELLS", defaults.max_grid_cells)?;
        let grid_threads = parse_env("GRID_THREADS", defaults.grid_threads)?;

        let pricing_models = match std::env::var("PRICING_MODELS") {
            Ok(list) => split_list(&list),
            Err(_) => defaults.pricing_models,
        };

        let cfg = Self {
            server_port,
            pricing_models,
            mc_paths,
            mc_seed,
            binomial_steps,
            max_grid_cells,
            grid_threads,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> PricingResult<()> {
        if self.pricing_models.is_empty() {
            return Err(PricingError::Config("PRICING_MODELS: no models listed".into()));
        }
        if self.mc_paths < 2 {
            return Err(PricingError::Config(format!(
                "MC_PATHS: need at least 2 draws, got {}",
                self.mc_paths
            )));
        }
        if self.binomial_steps == 0 {
            return Err(PricingError::Config("BINOMIAL_STEPS: must be >= 1".into()));
        }
        if self.max_grid_cells == 0 {
            return Err(PricingError::Config("MAX_GRID_CELLS: must be >= 1".into()));
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> PricingResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| PricingError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
