//! Descriptor codec: component columns to and from named JSON properties.
//!
//! A descriptor is a flat map of field name to value, the form components
//! take in scene files and editor payloads. Codecs build and consume owned
//! [`Properties`] maps; merging several components into one document is
//! the caller's job.
//!
//! Two output shapes exist:
//! - **snapshot** (`generate_desc == false`): each field is the bare live
//!   value, e.g. `"radius": 12.5`.
//! - **schema** (`generate_desc == true`): each field is a property
//!   descriptor carrying the editor type and the type default rather than
//!   the live value:
//!
//! ```text
//! "radius": { "cat": "IrradianceProbe", "editor": "float", "value": 20.0,
//!             "readOnly": false, "internal": false }
//! ```
//!
//! Readers accept either shape for every field.
//!
//! JSON numbers cannot hold NaN or infinities, so those are written as the
//! strings `"NaN"`, `"inf"` and `"-inf"`. NaN comes back as the canonical
//! `f32::NAN`; every other value round-trips bit for bit.

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::dod::{ColumnSet, DescriptorError, FieldError, Ref, StoreError};
use crate::math::ShCoeffs;

/// Field name to value map for one component record.
pub type Properties = Map<String, Value>;

/// Editor type names written into schema output.
pub mod editor {
    pub const FLOAT: &str = "float";
    pub const SH: &str = "sh";
}

/// Conversion between one component kind's records and descriptors.
pub trait ComponentDescriptor {
    type Data: ColumnSet;

    /// Emit every field of `r`, as live values or as schema entries.
    fn compile_descriptor(
        &self,
        r: Ref<Self::Data>,
        generate_desc: bool,
    ) -> Result<Properties, StoreError>;

    /// Apply every recognised field present in `properties` to `r`.
    ///
    /// Absent fields keep their current value and unknown fields are
    /// ignored. A malformed field is skipped without stopping the others;
    /// all of them are reported together once the rest have been applied.
    fn init_from_descriptor(
        &mut self,
        r: Ref<Self::Data>,
        properties: &Properties,
    ) -> Result<(), DescriptorError>;
}

/// Builds one component's [`Properties`].
pub struct PropertyWriter {
    category: &'static str,
    generate_desc: bool,
    properties: Properties,
}

impl PropertyWriter {
    pub fn new(category: &'static str, generate_desc: bool) -> Self {
        Self {
            category,
            generate_desc,
            properties: Properties::new(),
        }
    }

    /// Write a float-edited field. `default` is used for schema output.
    pub fn float(&mut self, name: &str, live: f32, default: f32) -> &mut Self {
        let value = if self.generate_desc { default } else { live };
        self.insert(name, editor::FLOAT, encode_f32(value))
    }

    /// Write a spherical-harmonics block as nine `[r, g, b]` triples.
    pub fn sh(&mut self, name: &str, live: &ShCoeffs, default: &ShCoeffs) -> &mut Self {
        let coeffs = if self.generate_desc { default } else { live };
        let value = Value::Array(
            coeffs
                .to_arrays()
                .iter()
                .map(|rgb| Value::Array(rgb.iter().map(|&c| encode_f32(c)).collect()))
                .collect(),
        );
        self.insert(name, editor::SH, value)
    }

    pub fn finish(self) -> Properties {
        self.properties
    }

    fn insert(&mut self, name: &str, editor: &str, value: Value) -> &mut Self {
        let entry = if self.generate_desc {
            json!({
                "cat": self.category,
                "editor": editor,
                "value": value,
                "readOnly": false,
                "internal": false
            })
        } else {
            value
        };
        self.properties.insert(name.to_owned(), entry);
        self
    }
}

/// Reads fields out of a descriptor, collecting malformed ones.
pub struct PropertyReader<'a> {
    category: &'static str,
    properties: &'a Properties,
    errors: Vec<FieldError>,
}

impl<'a> PropertyReader<'a> {
    pub fn new(category: &'static str, properties: &'a Properties) -> Self {
        Self {
            category,
            properties,
            errors: Vec::new(),
        }
    }

    /// `None` when the field is absent or malformed.
    pub fn float(&mut self, name: &str) -> Option<f32> {
        let value = self.field(name)?;
        match WireF32::deserialize(value) {
            Ok(WireF32(v)) => Some(v),
            Err(err) => self.reject(name, "a number", err.to_string()),
        }
    }

    pub fn sh(&mut self, name: &str) -> Option<ShCoeffs> {
        let value = self.field(name)?;
        match <[[WireF32; 3]; 9]>::deserialize(value) {
            Ok(rows) => Some(ShCoeffs::from_arrays(rows.map(|rgb| rgb.map(|c| c.0)))),
            Err(err) => self.reject(name, "9 [r, g, b] coefficient triples", err.to_string()),
        }
    }

    /// Report every malformed field seen so far.
    pub fn finish(self) -> Result<(), DescriptorError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DescriptorError::MalformedFields(self.errors))
        }
    }

    /// Present value of `name`, unwrapped from a property descriptor.
    fn field(&self, name: &str) -> Option<&'a Value> {
        let value = self.properties.get(name)?;
        match value {
            Value::Object(desc) => Some(desc.get("value").unwrap_or(value)),
            _ => Some(value),
        }
    }

    fn reject<T>(&mut self, name: &str, expected: &'static str, detail: String) -> Option<T> {
        tracing::warn!(
            component = self.category,
            field = name,
            %detail,
            "malformed descriptor field"
        );
        self.errors.push(FieldError {
            field: name.to_owned(),
            expected,
            detail,
        });
        None
    }
}

const NAN: &str = "NaN";
const INFINITY: &str = "inf";
const NEG_INFINITY: &str = "-inf";

fn encode_f32(v: f32) -> Value {
    if v.is_nan() {
        Value::from(NAN)
    } else if v == f32::INFINITY {
        Value::from(INFINITY)
    } else if v == f32::NEG_INFINITY {
        Value::from(NEG_INFINITY)
    } else {
        Value::from(v)
    }
}

/// An f32 as stored in descriptors: a JSON number or a non-finite name.
struct WireF32(f32);

impl<'de> Deserialize<'de> for WireF32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WireF32Visitor;

        impl<'v> Visitor<'v> for WireF32Visitor {
            type Value = WireF32;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a number or one of \"{NAN}\", \"{INFINITY}\", \"{NEG_INFINITY}\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<WireF32, E> {
                Ok(WireF32(v as f32))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WireF32, E> {
                Ok(WireF32(v as f32))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WireF32, E> {
                Ok(WireF32(v as f32))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WireF32, E> {
                match v {
                    NAN => Ok(WireF32(f32::NAN)),
                    INFINITY => Ok(WireF32(f32::INFINITY)),
                    NEG_INFINITY => Ok(WireF32(f32::NEG_INFINITY)),
                    _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(WireF32Visitor)
    }
}
