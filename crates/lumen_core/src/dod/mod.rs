//! Data-oriented component storage.
//!
//! Each component kind lives in its own [`ComponentManager`]: a fixed
//! number of slots, one contiguous [`Column`] per attribute, addressed by
//! generation-checked [`Ref`] handles. Managers also provide descriptor
//! conversion ([`ComponentDescriptor`]) and parallel ordering of ref lists
//! by a column key ([`ComponentManager::sort_refs_by_key`]).
//!
//! This is not a general ECS: there are no queries across
//! component kinds and no system scheduling.

mod column;
pub mod descriptor;
mod entity;
mod error;
mod handle;
mod macros;
mod manager;
mod slots;
mod sort;

pub use column::{Column, ColumnSet};
pub use descriptor::{ComponentDescriptor, Properties, PropertyReader, PropertyWriter};
pub use entity::EntityRef;
pub use error::{DescriptorError, FieldError, StoreError};
pub use handle::Ref;
pub use manager::{ComponentManager, DEFAULT_PARALLEL_SORT_THRESHOLD};
