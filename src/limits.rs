use serde::{Deserialize, Serialize};

/// Process-wide parsing limits.
///
/// Built once at start-up and only ever read afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub max_file_size_bytes: u64,
    pub max_rows_per_unit: usize,
    pub max_columns_per_unit: usize,
    pub max_units_per_document: usize,
}

pub const ENV_MAX_FILE_SIZE: &str = "PARSER_MAX_FILE_SIZE_BYTES";
pub const ENV_MAX_ROWS: &str = "PARSER_MAX_ROWS_PER_UNIT";
pub const ENV_MAX_COLUMNS: &str = "PARSER_MAX_COLUMNS_PER_UNIT";
pub const ENV_MAX_UNITS: &str = "PARSER_MAX_UNITS_PER_DOCUMENT";

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024, // 10 MiB
            max_rows_per_unit: 5_000,
            max_columns_per_unit: 50,
            max_units_per_document: 20,
        }
    }
}

impl Limits {
    /// Read limits from the `PARSER_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build limits from an arbitrary key lookup.
    ///
    /// Missing values keep their default. Unparsable or zero values are
    /// logged and replaced by the default as well.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_file_size_bytes: read_positive(&lookup, ENV_MAX_FILE_SIZE, defaults.max_file_size_bytes),
            max_rows_per_unit: read_positive(&lookup, ENV_MAX_ROWS, defaults.max_rows_per_unit),
            max_columns_per_unit: read_positive(&lookup, ENV_MAX_COLUMNS, defaults.max_columns_per_unit),
            max_units_per_document: read_positive(&lookup, ENV_MAX_UNITS, defaults.max_units_per_document),
        }
    }
}

fn read_positive<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default + std::fmt::Display + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            log::warn!("Ignoring invalid value {:?} for {}, using {}", raw, key, default);
            default
        }
    }
}
