/// Errors that can occur during registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("provider already exists: {0}")]
    DuplicateProvider(String),

    #[error("provider not found: {0}")]
    ProviderNotFound(String),
}
