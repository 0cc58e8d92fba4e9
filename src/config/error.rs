pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to build the 'Enviroment' from the provided string.")]
    StringToEnvironmentFail,
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("figment extraction error: {0}")]
    Figment(#[from] figment::Error),
}
