//! `define_port_error!`: driven-port error enums with snake_case constructors.
//!
//! Each variant becomes a `thiserror` variant plus a constructor named after
//! it; struct-variant fields are taken as `impl Into<T>`, so
//! `ProductRepositoryError::query("timeout")` works without `.to_owned()`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant [] [] $( $field : $ty, )*);
    };

    // Accumulate `field: impl Into<T>` parameters and `field.into()` inits.
    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::ProductId;
    use rstest::rstest;

    define_port_error! {
        /// Shaped like the storefront repository errors.
        pub enum StockPortError {
            Offline => "stock store offline",
            Query { message: String } => "stock query failed: {message}",
            Short { product_id: ProductId, available: u32 } => "product {product_id} has {available} left",
        }
    }

    #[rstest]
    fn unit_variants_get_constructors() {
        assert_eq!(StockPortError::offline(), StockPortError::Offline);
        assert_eq!(StockPortError::offline().to_string(), "stock store offline");
    }

    #[rstest]
    fn string_fields_accept_str() {
        let err = StockPortError::query("deadlock detected");
        assert_eq!(err.to_string(), "stock query failed: deadlock detected");
    }

    #[rstest]
    fn constructors_keep_field_order() {
        let id = ProductId::random();
        let err = StockPortError::short(id, 2_u32);
        assert_eq!(
            err,
            StockPortError::Short {
                product_id: id,
                available: 2
            }
        );
    }
}
