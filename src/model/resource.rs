//! Statically declared resource types and the `resource!` macro that writes them.

use crate::error::StoreError;
use crate::model::{FieldDescriptor, FieldType, FieldValue};
use serde::{de::DeserializeOwned, Serialize};

/// A record type exposed as a REST resource. Every field is optional; the first field is the identity.
pub trait Resource:
    Clone + Default + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: FieldType + Send + Sync;

    /// Type name, also used as the table name.
    const NAME: &'static str;

    /// Ordered field descriptors; identity first.
    fn fields() -> Vec<FieldDescriptor>;

    fn identity(&self) -> Option<&Self::Id>;

    fn set_identity(&mut self, id: Option<Self::Id>);

    /// Field values in descriptor order, `None` for unset.
    fn to_values(&self) -> Vec<Option<FieldValue>>;

    fn from_values(values: Vec<Option<FieldValue>>) -> Result<Self, StoreError>;
}

/// Pull the next column value off a decoded row and convert it to the field's Rust type.
pub fn take_field<T: FieldType>(
    values: &mut impl Iterator<Item = Option<FieldValue>>,
    column: &str,
) -> Result<Option<T>, StoreError> {
    match values.next() {
        None => Err(StoreError::MissingColumn(column.to_string())),
        Some(None) => Ok(None),
        Some(Some(v)) => T::from_value(v)
            .map(Some)
            .ok_or_else(|| StoreError::UnexpectedValue {
                column: column.to_string(),
                expected: T::KIND,
            }),
    }
}

/// Declare a resource record type.
///
/// The first field is the identity. Each field becomes `Option<T>` and is
/// serialized under its column name.
///
/// ```rust,ignore
/// resource! {
///     pub struct Token in "Token" {
///         id: i64 => "ID",
///         user_id: i64 => "UserID",
///     }
/// }
/// ```
#[macro_export]
macro_rules! resource {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal {
            $id_field:ident : $id_ty:ty => $id_col:literal
            $(, $field:ident : $ty:ty => $col:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        $vis struct $name {
            #[serde(rename = $id_col, default)]
            pub $id_field: Option<$id_ty>,
            $(
                #[serde(rename = $col, default)]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::model::Resource for $name {
            type Id = $id_ty;

            const NAME: &'static str = $table;

            fn fields() -> Vec<$crate::model::FieldDescriptor> {
                vec![
                    $crate::model::FieldDescriptor::new(
                        $id_col,
                        <$id_ty as $crate::model::FieldType>::KIND,
                    ),
                    $(
                        $crate::model::FieldDescriptor::new(
                            $col,
                            <$ty as $crate::model::FieldType>::KIND,
                        ),
                    )*
                ]
            }

            fn identity(&self) -> Option<&$id_ty> {
                self.$id_field.as_ref()
            }

            fn set_identity(&mut self, id: Option<$id_ty>) {
                self.$id_field = id;
            }

            fn to_values(&self) -> Vec<Option<$crate::model::FieldValue>> {
                vec![
                    self.$id_field.clone().map($crate::model::FieldType::into_value),
                    $( self.$field.clone().map($crate::model::FieldType::into_value), )*
                ]
            }

            fn from_values(
                values: Vec<Option<$crate::model::FieldValue>>,
            ) -> Result<Self, $crate::error::StoreError> {
                let mut values = values.into_iter();
                Ok(Self {
                    $id_field: $crate::model::take_field(&mut values, $id_col)?,
                    $( $field: $crate::model::take_field(&mut values, $col)?, )*
                })
            }
        }
    };
}
