pub mod app_config;
pub mod config;
pub mod domain;
pub mod intel;
pub mod scan;

pub use app_config::{AppConfig, ConfigError, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use domain::{normalize_domain, NormalizeError};
pub use intel::{
    Alert, AlertDraft, AlertKind, AlertStatus, Entity, Gap, GapKind, Provenance, ScanRecord,
    Severity, TenantLink,
};
pub use scan::{ExtractedSignals, ScanObservation, ScanType, TtlPolicy};
