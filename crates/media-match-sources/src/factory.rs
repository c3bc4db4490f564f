//! PVR factory pattern for creating backends from configuration
//!
//! Each factory knows one backend kind, the configured instances of that
//! kind, and the single library type it can reconcile.

use media_match_config::{Config, PvrInstanceConfig};
use media_match_models::LibraryType;
use tracing::debug;

use crate::pvr::{RadarrClient, SonarrClient};
use crate::{Pvr, SourceError};

pub trait PvrFactory: Send + Sync {
    /// Backend kind, e.g. "sonarr"
    fn kind(&self) -> &str;

    fn library_type(&self) -> LibraryType;

    fn instances<'a>(&self, config: &'a Config) -> &'a [PvrInstanceConfig];

    fn create(&self, instance: &PvrInstanceConfig) -> Result<Box<dyn Pvr>, SourceError>;
}

/// Registry of PVR factories, searched in registration order
pub struct PvrFactoryRegistry {
    factories: Vec<Box<dyn PvrFactory>>,
}

impl PvrFactoryRegistry {
    /// Create a new registry with the built-in backends registered
    pub fn new() -> Self {
        let mut registry = Self { factories: Vec::new() };
        registry.register(Box::new(RadarrFactory));
        registry.register(Box::new(SonarrFactory));
        registry
    }

    pub fn register(&mut self, factory: Box<dyn PvrFactory>) {
        self.factories.push(factory);
    }

    /// Create the PVR configured under `name` (case-insensitive)
    ///
    /// Fails when no PVR has that name, or when any requested library is of
    /// a type the backend can't manage.
    pub fn create_by_name(
        &self,
        name: &str,
        config: &Config,
        library_types: &[LibraryType],
    ) -> Result<Box<dyn Pvr>, SourceError> {
        let wanted = name.to_lowercase();
        for factory in &self.factories {
            let Some(instance) = factory
                .instances(config)
                .iter()
                .find(|instance| instance.name.to_lowercase() == wanted)
            else {
                continue;
            };

            if let Some(wrong) = library_types.iter().find(|t| **t != factory.library_type()) {
                return Err(SourceError::Config(format!(
                    "{} only supports {} libraries, {:?} was requested with a {} library",
                    factory.kind(),
                    factory.library_type(),
                    instance.name,
                    wrong
                )));
            }

            debug!(pvr = %instance.name, kind = factory.kind(), "Initialising pvr");
            return factory.create(instance);
        }

        Err(SourceError::Config(format!("pvr not found: {}", name)))
    }

    /// Create every named PVR, in the order given
    pub fn create_all(
        &self,
        names: &[String],
        config: &Config,
        library_types: &[LibraryType],
    ) -> Result<Vec<Box<dyn Pvr>>, SourceError> {
        if names.is_empty() {
            return Err(SourceError::Config("at least one pvr is required".to_string()));
        }

        names
            .iter()
            .map(|name| self.create_by_name(name, config, library_types))
            .collect()
    }

    pub fn registered_kinds(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.kind()).collect()
    }
}

impl Default for PvrFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct RadarrFactory;

impl PvrFactory for RadarrFactory {
    fn kind(&self) -> &str {
        "radarr"
    }

    fn library_type(&self) -> LibraryType {
        LibraryType::Movie
    }

    fn instances<'a>(&self, config: &'a Config) -> &'a [PvrInstanceConfig] {
        &config.pvr.radarr
    }

    fn create(&self, instance: &PvrInstanceConfig) -> Result<Box<dyn Pvr>, SourceError> {
        Ok(Box::new(RadarrClient::new(instance)?))
    }
}

struct SonarrFactory;

impl PvrFactory for SonarrFactory {
    fn kind(&self) -> &str {
        "sonarr"
    }

    fn library_type(&self) -> LibraryType {
        LibraryType::Tv
    }

    fn instances<'a>(&self, config: &'a Config) -> &'a [PvrInstanceConfig] {
        &config.pvr.sonarr
    }

    fn create(&self, instance: &PvrInstanceConfig) -> Result<Box<dyn Pvr>, SourceError> {
        Ok(Box::new(SonarrClient::new(instance)?))
    }
}
