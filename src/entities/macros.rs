//! Macros for reducing boilerplate when defining entities
//!
//! Stored entities only differ by their payload fields, so the struct,
//! its `Entity` implementation and its constructors are generated.

/// Complete macro to create an entity with automatic trait implementations
///
/// The generated struct gets an `id: Option<$id_type>` field ahead of the
/// payload fields. It starts out transient (`None`) and is assigned by the
/// store on first save.
///
/// # Example
///
/// ```rust,ignore
/// use order_store::prelude::*;
///
/// impl_entity!(
///     Shipment,
///     i64,
///     "shipment",
///     "shipments",
///     {
///         /// Carrier tracking code
///         tracking_code: String,
///         weight_grams: u32,
///     }
/// );
///
/// // Usage
/// let shipment = Shipment::new("1Z999".to_string(), 1200);
/// assert!(shipment.is_transient());
/// let fixed = Shipment::new("1Z998".to_string(), 800).with_id(7);
/// ```
#[macro_export]
macro_rules! impl_entity {
    (
        $type:ident,
        $id_type:ty,
        $singular:expr,
        $plural:expr,
        {
            $( $(#[$field_meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Identifier, `None` until the entity is first saved
            pub id: Option<$id_type>,
            $( $(#[$field_meta])* pub $field : $field_type ),*
        }

        impl $crate::core::entity::Entity for $type {
            type Id = $id_type;

            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> Option<$id_type> {
                self.id
            }

            fn set_id(&mut self, id: $id_type) {
                self.id = Some(id);
            }
        }

        impl $type {
            /// Create a new transient instance of this entity
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: $field_type ),*) -> Self {
                Self {
                    id: None,
                    $( $field ),*
                }
            }

            /// Give this instance an explicit identifier
            pub fn with_id(mut self, id: $id_type) -> Self {
                self.id = Some(id);
                self
            }
        }
    };
}
