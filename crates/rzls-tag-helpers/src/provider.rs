//! Descriptor discovery.
//!
//! A host compiler exposes its types through some compilation value `C`.
//! Providers inspect it and add descriptors to the shared results; the core
//! never looks at `C` itself.

use std::sync::Arc;

use crate::collection::TagHelperCollection;
use crate::collection::TagHelperCollectionBuilder;
use crate::descriptors::TagHelperDescriptor;

pub trait TagHelperDescriptorProvider<C>: Send + Sync {
    /// Providers run in ascending order; ties keep registration order.
    fn order(&self) -> i32 {
        0
    }

    fn execute(&self, context: &mut TagHelperDescriptorProviderContext<'_, C>);
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub exclude_hidden: bool,
    pub include_documentation: bool,
    /// Restrict discovery to types from one assembly.
    pub target_assembly: Option<String>,
}

pub struct TagHelperDescriptorProviderContext<'a, C> {
    compilation: &'a C,
    options: &'a DiscoveryOptions,
    results: TagHelperCollectionBuilder,
}

impl<'a, C> TagHelperDescriptorProviderContext<'a, C> {
    #[must_use]
    pub fn compilation(&self) -> &'a C {
        self.compilation
    }

    #[must_use]
    pub fn exclude_hidden(&self) -> bool {
        self.options.exclude_hidden
    }

    #[must_use]
    pub fn include_documentation(&self) -> bool {
        self.options.include_documentation
    }

    #[must_use]
    pub fn target_assembly(&self) -> Option<&str> {
        self.options.target_assembly.as_deref()
    }

    /// Whether a type from `assembly_name` passes the target assembly filter.
    #[must_use]
    pub fn includes_assembly(&self, assembly_name: &str) -> bool {
        self.target_assembly()
            .is_none_or(|target| target == assembly_name)
    }

    /// Add a descriptor to the results; duplicates by value are dropped.
    pub fn add(&mut self, descriptor: impl Into<Arc<TagHelperDescriptor>>) -> bool {
        self.results.add(descriptor)
    }

    #[must_use]
    pub fn results(&self) -> &TagHelperCollectionBuilder {
        &self.results
    }
}

/// Run every provider against `compilation` and collect the descriptors they emit.
#[tracing::instrument(skip_all, fields(providers = providers.len()))]
pub fn discover_tag_helpers<C>(
    compilation: &C,
    providers: &[Arc<dyn TagHelperDescriptorProvider<C>>],
    options: &DiscoveryOptions,
) -> TagHelperCollection {
    let mut ordered: Vec<_> = providers.iter().collect();
    ordered.sort_by_key(|provider| provider.order());

    let mut context = TagHelperDescriptorProviderContext {
        compilation,
        options,
        results: TagHelperCollectionBuilder::new(),
    };
    for provider in ordered {
        provider.execute(&mut context);
    }

    let collection = context.results.build();
    tracing::debug!(count = collection.len(), "Discovered tag helpers");
    collection
}
