//! Game configuration.
//!
//! One immutable value carries every tunable the board and the cascade
//! controller need. Nothing in the core reads globals.

use crate::scoring::ScoreTable;
use crate::types::{
    ConfigError, CELL_SIZE, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TOKEN_KINDS, FALL_STEP,
    MAX_BOARD_DIM, MAX_TOKEN_KINDS, MIN_BOARD_DIM, MIN_TOKEN_KINDS, ROUND_MS, SWAP_STEP,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: u8,
    pub columns: u8,
    /// Number of ordinary gem kinds (`K`)
    pub token_kinds: u8,
    /// Presentation units per cell
    pub cell_size: u32,
    /// Presentation units per tick during a swap
    pub swap_step: u32,
    /// Presentation units per tick during a fall
    pub fall_step: u32,
    /// Presentation units per tick while a new board drops in; 0 skips it
    pub intro_step: u32,
    /// Round length in milliseconds
    pub round_ms: u32,
    pub seed: u32,
    pub scores: ScoreTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            token_kinds: DEFAULT_TOKEN_KINDS,
            cell_size: CELL_SIZE,
            swap_step: SWAP_STEP,
            fall_step: FALL_STEP,
            intro_step: 0,
            round_ms: ROUND_MS,
            seed: 1,
            scores: ScoreTable::default(),
        }
    }
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_size(mut self, rows: u8, columns: u8) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    pub fn with_token_kinds(mut self, token_kinds: u8) -> Self {
        self.token_kinds = token_kinds;
        self
    }

    pub fn with_intro(mut self, intro_step: u32) -> Self {
        self.intro_step = intro_step;
        self
    }

    /// Create from environment variables, falling back to defaults.
    ///
    /// - `JEWELS_ROWS`, `JEWELS_COLUMNS`: board size
    /// - `JEWELS_KINDS`: number of gem kinds
    /// - `JEWELS_SEED`: RNG seed
    /// - `JEWELS_ROUND_MS`: round length
    pub fn from_env() -> Self {
        Self::from_env_reporting().0
    }

    /// Like [`from_env`](Self::from_env), also returning every variable that
    /// was set but could not be parsed.
    pub fn from_env_reporting() -> (Self, Vec<EnvFallback>) {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset variables keep the
    /// default silently; unparsable ones keep it and are reported.
    pub fn from_vars<F>(get: F) -> (Self, Vec<EnvFallback>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut fallbacks = Vec::new();
        let mut c = Self::default();
        read_var(&get, "JEWELS_ROWS", &mut c.rows, &mut fallbacks);
        read_var(&get, "JEWELS_COLUMNS", &mut c.columns, &mut fallbacks);
        read_var(&get, "JEWELS_KINDS", &mut c.token_kinds, &mut fallbacks);
        read_var(&get, "JEWELS_SEED", &mut c.seed, &mut fallbacks);
        read_var(&get, "JEWELS_ROUND_MS", &mut c.round_ms, &mut fallbacks);
        (c, fallbacks)
    }

    /// Check the startup preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dim_ok = |d: u8| (MIN_BOARD_DIM..=MAX_BOARD_DIM).contains(&d);
        if !dim_ok(self.rows) || !dim_ok(self.columns) {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.token_kinds < MIN_TOKEN_KINDS {
            return Err(ConfigError::TooFewTokenKinds(self.token_kinds));
        }
        if self.token_kinds > MAX_TOKEN_KINDS {
            return Err(ConfigError::TooManyTokenKinds(self.token_kinds));
        }
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroStep("cell_size"));
        }
        if self.swap_step == 0 {
            return Err(ConfigError::ZeroStep("swap_step"));
        }
        if self.fall_step == 0 {
            return Err(ConfigError::ZeroStep("fall_step"));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

fn read_var<T, F>(get: &F, key: &'static str, slot: &mut T, fallbacks: &mut Vec<EnvFallback>)
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = get(key) else {
        return;
    };
    let parsed: Result<T, _> = value.trim().parse();
    match parsed {
        Ok(v) => *slot = v,
        Err(_) => fallbacks.push(EnvFallback { key, value }),
    }
}

/// An environment variable that was set but ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFallback {
    pub key: &'static str,
    pub value: String,
}

impl std::fmt::Display for EnvFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={:?} unparsable, using default", self.key, self.value)
    }
}
