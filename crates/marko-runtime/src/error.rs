use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// No registered factory, legacy loader, or path loader produced a
    /// definition for the requested type. Fatal for this creation attempt
    /// only; other components are unaffected.
    #[error("Component not found: {0}")]
    ComponentNotFound(String),
}
