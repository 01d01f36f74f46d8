/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value loaded from environment variable
    EnvVar(String),
    /// Default value used
    Default(String),
    /// Value provided programmatically (tests, CLI flags)
    Programmatic,
}

impl ConfigSource {
    /// Get source description
    pub fn description(&self) -> String {
        match self {
            ConfigSource::EnvVar(var) => format!("Environment variable: {}", var),
            ConfigSource::Default(value) => format!("Default value: {}", value),
            ConfigSource::Programmatic => "Programmatically set".to_string(),
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
