use std::sync::Arc;

use async_trait::async_trait;
use rzls_tag_helpers::provider::discover_tag_helpers;
use rzls_tag_helpers::provider::DiscoveryOptions;
use rzls_tag_helpers::provider::TagHelperDescriptorProvider;
use rzls_tag_helpers::TagHelperCollection;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::project::HostProject;
use crate::snapshot::ProjectSnapshot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("tag helper resolution was cancelled")]
    Cancelled,
    #[error("tag helper discovery failed: {0}")]
    Join(String),
}

/// Fetches the tag helper catalog for a project.
#[async_trait]
pub trait TagHelperResolver: Send + Sync {
    async fn resolve(
        &self,
        project: &ProjectSnapshot,
        cancel: &CancellationToken,
    ) -> Result<TagHelperCollection, ResolveError>;
}

type CompilationFactory<C> = dyn Fn(&HostProject) -> Option<C> + Send + Sync;

/// Runs descriptor providers against a compilation built for each project.
///
/// Discovery is CPU-bound and runs on the blocking pool.
pub struct ProviderTagHelperResolver<C> {
    compilation: Arc<CompilationFactory<C>>,
    providers: Arc<[Arc<dyn TagHelperDescriptorProvider<C>>]>,
    options: DiscoveryOptions,
}

impl<C> ProviderTagHelperResolver<C> {
    pub fn new(
        compilation: impl Fn(&HostProject) -> Option<C> + Send + Sync + 'static,
        providers: Vec<Arc<dyn TagHelperDescriptorProvider<C>>>,
        options: DiscoveryOptions,
    ) -> Self {
        Self {
            compilation: Arc::new(compilation),
            providers: providers.into(),
            options,
        }
    }
}

#[async_trait]
impl<C> TagHelperResolver for ProviderTagHelperResolver<C>
where
    C: Send + 'static,
{
    #[tracing::instrument(skip_all, fields(project = %project.key()))]
    async fn resolve(
        &self,
        project: &ProjectSnapshot,
        cancel: &CancellationToken,
    ) -> Result<TagHelperCollection, ResolveError> {
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        let Some(compilation) = (self.compilation)(project.host_project()) else {
            tracing::debug!("No compilation for project");
            return Ok(TagHelperCollection::empty());
        };

        let providers = Arc::clone(&self.providers);
        let options = self.options.clone();
        let task = tokio::task::spawn_blocking(move || discover_tag_helpers(&compilation, &providers, &options));

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ResolveError::Cancelled),
            joined = task => joined.map_err(|err| ResolveError::Join(err.to_string())),
        }
    }
}
