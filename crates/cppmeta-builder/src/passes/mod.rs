//! Builder passes, in the order [`MetaBuilder`](crate::MetaBuilder) runs them.
//!
//! - [`registration`]: build the class graph from the input declarations
//! - [`inheritance`]: resolve base classes and flatten hidden template bases
//! - [`function_templates`]: instantiate member function templates
//! - [`enum_values`]: evaluate enum value expressions to a fixpoint
//! - [`default_args`]: translate default argument expressions
//! - [`capabilities`]: derive equality, comparison, clone and iteration support
//!
//! Class templates named by typedefs are instantiated between registration
//! and inheritance, see [`crate::template`].

pub mod capabilities;
pub mod default_args;
pub mod enum_values;
pub mod function_templates;
pub mod inheritance;
pub mod registration;

pub use capabilities::{CapabilitiesOutput, CapabilitiesPass};
pub use default_args::{DefaultArgsOutput, DefaultArgsPass};
pub use enum_values::{EnumValuesOutput, EnumValuesPass};
pub use function_templates::{FunctionTemplatesOutput, FunctionTemplatesPass};
pub use inheritance::{InheritanceOutput, InheritancePass};
pub use registration::{RegistrationOutput, RegistrationPass};
