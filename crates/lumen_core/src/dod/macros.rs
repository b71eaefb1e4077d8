// macros.rs - Column set generation
//
// Writing a component's SoA struct by hand means repeating every field in
// the struct, the allocation and the reset. `soa_columns!` derives all three
// from one field list.

/// Declare a component's SoA column set.
///
/// Each field becomes a public [`Column`](crate::dod::Column) sized to the
/// manager's capacity. The `= default` expression is written into the
/// column at allocation and whenever a slot is reset.
///
/// # Example
/// ```ignore
/// soa_columns! {
///     /// Spot light columns.
///     pub struct SpotLightData: "SpotLight" {
///         range: f32 = 10.0,
///         cone_angle: f32 = 0.5,
///         shadow_caster: bool = false,
///     }
/// }
///
/// let mut lights = ComponentManager::<SpotLightData>::new(64);
/// ```
#[macro_export]
macro_rules! soa_columns {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident : $kind:literal {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty = $default:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $Name {
            $(
                $(#[$field_meta])*
                pub $field: $crate::dod::Column<$ty>,
            )+
        }

        impl $crate::dod::ColumnSet for $Name {
            const NAME: &'static str = $kind;

            fn with_capacity(capacity: usize) -> Self {
                Self {
                    $(
                        $field: $crate::dod::Column::filled(capacity, $default),
                    )+
                }
            }

            fn reset_slot(&mut self, index: usize) {
                $(
                    self.$field.fill_at(index, $default);
                )+
            }
        }
    };
}
