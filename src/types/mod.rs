//! Shared value types: type tags, decoded values and bind values.

mod bind;
mod type_tag;
mod value;

pub use bind::{BindValue, NotBytes};
pub use type_tag::TypeTag;
pub use value::Value;
