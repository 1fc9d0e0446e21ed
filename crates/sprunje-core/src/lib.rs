pub mod context;
pub mod error;
pub mod loader;
pub mod query;
pub mod types;
pub mod validation;

pub use context::{filter_for_context, parse_contexts, ContextField, FilteredSchema, ViewContext};
pub use error::SchemaError;
pub use loader::{discover_models, LoaderError, SchemaLoader};
pub use query::{
    parse_raw_params, resolve_sprunje_params, MatchMode, RawSprunjeParams, ResolvedSprunjeParams,
    SortOrder, SprunjePage,
};
pub use types::{
    ActionSpec, ActionType, BooleanStyle, DetailSpec, DynamicValue, FieldName, FieldSpec,
    FieldType, ModelName, ModelSchema, RelationResolution, RelationshipKind, RelationshipSpec,
    ShowIn, StandardAction, ThroughStep, ValidationRule,
};
pub use validation::{validate_and_transform, ValidationOutcome};
