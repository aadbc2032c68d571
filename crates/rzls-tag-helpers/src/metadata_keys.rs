//! Well-known metadata keys.

/// Name of the runtime that executes the tag helper.
pub const RUNTIME_NAME: &str = "Runtime.Name";

/// Set to `"True"` on bound attributes that declare a generic type parameter.
pub const TYPE_PARAMETER: &str = "Components.TypeParameter";

/// Set on bound attributes whose type parameter is constrained.
pub const TYPE_PARAMETER_CONSTRAINTS: &str = "Components.TypeParameterConstraints";

/// Marks component descriptors generated for framework features (`@bind`, `@ref`, ...).
pub const SPECIAL_KIND: &str = "Components.IsSpecialKind";

/// Name of the parameter exposed to child content (defaults to `context`).
pub const CHILD_CONTENT_PARAMETER_NAME: &str = "Components.ChildContentParameterName";
