use thiserror::Error;

/// Errors reported by a component manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{component} store is full ({capacity} slots)")]
    CapacityExceeded {
        component: &'static str,
        capacity: usize,
    },

    #[error("stale {component} ref: slot {index} generation {generation}, now {current}")]
    StaleHandle {
        component: &'static str,
        index: u32,
        generation: u32,
        current: u32,
    },

    #[error("invalid {component} ref: slot {index} is outside the store")]
    InvalidHandle { component: &'static str, index: u32 },
}

/// A descriptor field that was present but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}': expected {expected}, {detail}")]
pub struct FieldError {
    pub field: String,
    pub expected: &'static str,
    pub detail: String,
}

/// Errors reported while applying a descriptor to a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Every well-formed field was still applied.
    #[error("{} malformed descriptor field(s): {}", .0.len(), join_fields(.0))]
    MalformedFields(Vec<FieldError>),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
