//! Tag helper descriptors and the rules that bind them to markup.
//!
//! The crate is layered bottom-up:
//!
//! - [`descriptors`] and [`MetadataCollection`]: immutable, checksummed values.
//! - [`conventions`]: pure matching functions for tag names, parents and attributes.
//! - [`TagHelperBinder`] / [`TagHelperDocumentContext`]: per-document lookups.
//! - [`provider`]: discovery of descriptors from a host compilation.

mod binder;
mod checksum;
mod collection;
pub mod conventions;
mod context;
pub mod descriptors;
mod diagnostics;
mod metadata;
pub mod metadata_keys;
pub mod provider;

pub use binder::TagHelperBinder;
pub use binder::TagHelperBinding;
pub use checksum::Checksum;
pub use collection::TagHelperCollection;
pub use collection::TagHelperCollectionBuilder;
pub use context::DocumentContextCache;
pub use context::TagHelperDocumentContext;
pub use descriptors::TagHelperDescriptor;
pub use descriptors::TagHelperDescriptorBuilder;
pub use descriptors::TagHelperKind;
pub use diagnostics::codes;
pub use diagnostics::DiagnosticSeverity;
pub use diagnostics::RazorDiagnostic;
pub use metadata::MetadataCollection;
pub use metadata::MetadataError;
