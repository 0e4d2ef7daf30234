// Application state module
// Startup-validated configuration shared by every connection

use super::types::Config;
use crate::error::ConfigError;
use crate::handler::resolver::StaticResolver;

/// Application state, built once at startup and shared through `Arc`
pub struct AppState {
    pub config: Config,
    pub resolver: StaticResolver,
}

impl AppState {
    /// Validate the site root and build the resolver.
    ///
    /// Fails when the root or its fallback document is missing; the server
    /// must not start in that case.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let resolver = StaticResolver::new(&config.site.root, &config.site.index_file)?;
        Ok(Self { config, resolver })
    }
}
