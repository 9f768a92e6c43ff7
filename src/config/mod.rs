//! Application configuration.
//!
//! Loaded from YAML files and `INVOICING__*` environment variables.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::handler::{INVOICE_VIEW_ROUTE, RECURRING_INVOICE_VIEW_ROUTE};
use crate::money::{Currency, MoneyError, MoneyFormatter};
use crate::routing::{RouteTable, RoutingError};
use crate::workflow::{DefinitionError, StateMachine, WorkflowDefinition};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "INVOICING_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "INVOICING";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "INVOICING_LOG";

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid money settings: {0}")]
    Money(#[from] MoneyError),

    #[error("Invalid workflow: {0}")]
    Workflow(#[from] DefinitionError),

    #[error("Invalid routes: {0}")]
    Routing(#[from] RoutingError),
}

/// Paths to workflow graph files. Unset paths use the shipped graphs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub invoice: Option<String>,
    pub recurring_invoice: Option<String>,
}

impl WorkflowConfig {
    pub fn invoice_state_machine(&self) -> Result<StateMachine, ConfigError> {
        let definition = match &self.invoice {
            Some(path) => WorkflowDefinition::from_file(path)?,
            None => WorkflowDefinition::invoice()?,
        };
        Ok(StateMachine::new(definition)?)
    }

    pub fn recurring_invoice_state_machine(&self) -> Result<StateMachine, ConfigError> {
        let definition = match &self.recurring_invoice {
            Some(path) => WorkflowDefinition::from_file(path)?,
            None => WorkflowDefinition::recurring_invoice()?,
        };
        Ok(StateMachine::new(definition)?)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ISO 4217 code used for money discounts.
    pub currency: String,
    /// Locale for money display, e.g. `en_US` or `de`.
    pub locale: String,
    /// Route name to path pattern. Merged over the built-in view routes.
    pub routes: BTreeMap<String, String>,
    pub workflows: WorkflowConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            routes: BTreeMap::new(),
            workflows: WorkflowConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix, `__` separated
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn currency(&self) -> Result<Currency, ConfigError> {
        Ok(Currency::new(&self.currency)?)
    }

    pub fn formatter(&self) -> Result<MoneyFormatter, ConfigError> {
        Ok(MoneyFormatter::new(&self.locale, self.currency()?)?)
    }

    /// Built-in view routes with configured routes layered on top.
    pub fn route_table(&self) -> RouteTable {
        [
            (INVOICE_VIEW_ROUTE, "/invoices/view/{id}"),
            (RECURRING_INVOICE_VIEW_ROUTE, "/invoices/recurring/view/{id}"),
        ]
        .into_iter()
        .map(|(name, pattern)| (name.to_string(), pattern.to_string()))
        .chain(self.routes.clone())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteParams, UrlGenerator};
    use serial_test::serial;
    use std::io::Write;

    fn id_params(id: &str) -> RouteParams {
        RouteParams::from([("id".to_string(), id.to_string())])
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.currency().unwrap().code(), "USD");
        assert_eq!(config.formatter().unwrap().currency_symbol(), "$");

        let routes = config.route_table();
        assert_eq!(
            routes.generate(RECURRING_INVOICE_VIEW_ROUTE, &id_params("4")).unwrap(),
            "/invoices/recurring/view/4"
        );
    }

    #[test]
    fn test_configured_routes_override_defaults() {
        let mut config = AppConfig::default();
        config
            .routes
            .insert(INVOICE_VIEW_ROUTE.to_string(), "/billing/{id}".to_string());

        let routes = config.route_table();
        assert_eq!(
            routes.generate(INVOICE_VIEW_ROUTE, &id_params("4")).unwrap(),
            "/billing/4"
        );
        assert!(routes.pattern(RECURRING_INVOICE_VIEW_ROUTE).is_some());
    }

    #[test]
    fn test_invalid_currency() {
        let config = AppConfig {
            currency: "dollars".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.currency(), Err(ConfigError::Money(_))));
    }

    #[test]
    fn test_shipped_state_machines() {
        let workflows = WorkflowConfig::default();
        assert_eq!(workflows.invoice_state_machine().unwrap().name(), "invoice");
        assert_eq!(
            workflows.recurring_invoice_state_machine().unwrap().name(),
            "recurring_invoice"
        );
    }

    #[test]
    fn test_missing_workflow_file() {
        let workflows = WorkflowConfig {
            invoice: Some("/nonexistent/invoice.yaml".to_string()),
            recurring_invoice: None,
        };
        assert!(matches!(
            workflows.invoice_state_machine(),
            Err(ConfigError::Workflow(DefinitionError::FileRead(..)))
        ));
    }

    #[test]
    #[serial]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "currency: EUR\nlocale: de\nroutes:\n  _invoices_view: /rechnungen/{{id}}"
        )
        .unwrap();

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.locale, "de");
        assert_eq!(
            config.routes.get(INVOICE_VIEW_ROUTE).map(String::as_str),
            Some("/rechnungen/{id}")
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "currency: EUR").unwrap();

        std::env::set_var("INVOICING__CURRENCY", "GBP");
        let config = AppConfig::load(file.path().to_str());
        std::env::remove_var("INVOICING__CURRENCY");

        assert_eq!(config.unwrap().currency, "GBP");
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file() {
        assert!(matches!(
            AppConfig::load(Some("/nonexistent/invoicing.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
