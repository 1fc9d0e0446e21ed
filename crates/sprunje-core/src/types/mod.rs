pub mod action_spec;
pub mod detail_spec;
pub mod dynamic_value;
pub mod field_name;
pub mod field_spec;
pub mod field_type;
pub mod model_name;
pub mod relationship_spec;
pub mod schema;
pub mod validation_rule;

pub use action_spec::{ActionSpec, ActionType};
pub use detail_spec::DetailSpec;
pub use dynamic_value::DynamicValue;
pub use field_name::FieldName;
pub use field_spec::{FieldSpec, ShowIn};
pub use field_type::{BooleanStyle, FieldType};
pub use model_name::ModelName;
pub use relationship_spec::{RelationshipKind, RelationshipSpec, ThroughStep};
pub use schema::{ModelSchema, RelationResolution, StandardAction};
pub use validation_rule::ValidationRule;
