//! Carga de configuración desde variables de entorno (opcionalmente `.env`).
//!
//! Todas las claves llevan prefijo `ETL_` salvo las de base de datos, que
//! siguen la convención `DATABASE_URL` / `DATABASE_{MIN,MAX}_CONNECTIONS`.
//! Las credenciales sólo se leen de aquí; nunca hay literales en el código.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use etl_core::constants::LEDGER_FILE_NAME;
use once_cell::sync::Lazy;

use crate::error::ConfigError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

pub const UPSTREAM_OVERRIDE_PREFIX: &str = "ETL_STAGE_UPSTREAM_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    /// Endpoint propio (MinIO). `None` = AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Local { root: PathBuf },
    S3(S3Settings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub store: StoreBackend,
    pub bucket: String,
    pub staging_folder: String,
    pub source_path: Option<PathBuf>,
    pub ledger_file: String,
    pub notify_recipient: String,
    pub database: Option<DbConfig>,
    /// Aristas de gating sobreescritas, por nombre de stage (minúsculas).
    pub upstream_overrides: HashMap<String, Vec<String>>,
}

/// Vista de variables sobre la que se parsea la configuración.
struct Vars(HashMap<String, String>);

impl Vars {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    fn parse_or(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key: key.to_string(),
                                                                     value: v.to_string() }),
        }
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        Self::from_vars(&Vars(env::vars().collect()))?.ok_or_else(|| ConfigError::Missing("DATABASE_URL".into()))
    }

    fn from_vars(vars: &Vars) -> Result<Option<Self>, ConfigError> {
        let Some(url) = vars.get("DATABASE_URL") else {
            return Ok(None);
        };
        Ok(Some(Self { url: url.to_string(),
                       min_connections: vars.parse_or("DATABASE_MIN_CONNECTIONS", 2)?,
                       max_connections: vars.parse_or("DATABASE_MAX_CONNECTIONS", 16)? }))
    }
}

impl EtlConfig {
    /// Lee el entorno del proceso (tras cargar `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        Self::from_vars(env::vars())
    }

    /// Parsea un conjunto explícito de variables (tests, embedding).
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<String>
    {
        let vars = Vars(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());

        let store = match vars.or("ETL_STORE", "local").to_ascii_lowercase().as_str() {
            "local" => StoreBackend::Local { root: PathBuf::from(vars.or("ETL_LOCAL_ROOT", "./data")) },
            "s3" | "minio" => StoreBackend::S3(S3Settings { endpoint: vars.get("ETL_S3_ENDPOINT").map(str::to_string),
                                                            region: vars.or("ETL_S3_REGION", "us-east-1"),
                                                            access_key: vars.get("ETL_S3_ACCESS_KEY").map(str::to_string),
                                                            secret_key: vars.get("ETL_S3_SECRET_KEY").map(str::to_string) }),
            other => {
                return Err(ConfigError::Invalid { key: "ETL_STORE".into(),
                                                  value: other.to_string() })
            }
        };

        let upstream_overrides = vars.0
                                     .iter()
                                     .filter_map(|(k, v)| {
                                         let stage = k.strip_prefix(UPSTREAM_OVERRIDE_PREFIX)?;
                                         let edges = v.split(',')
                                                      .map(str::trim)
                                                      .filter(|s| !s.is_empty())
                                                      .map(str::to_string)
                                                      .collect();
                                         Some((stage.to_ascii_lowercase(), edges))
                                     })
                                     .collect();

        Ok(Self { store,
                  bucket: vars.require("ETL_BUCKET")?,
                  staging_folder: vars.or("ETL_STAGING_FOLDER", "staging"),
                  source_path: vars.get("ETL_SOURCE_PATH").map(PathBuf::from),
                  ledger_file: vars.or("ETL_LEDGER_FILE", LEDGER_FILE_NAME),
                  notify_recipient: vars.or("ETL_NOTIFY_RECIPIENT", ""),
                  database: DbConfig::from_vars(&vars)?,
                  upstream_overrides })
    }
}
