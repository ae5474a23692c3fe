//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Currency
//! columns hold integer minor units.

diesel::table! {
    /// Catalogue products.
    products (id) {
        id -> Uuid,
        sku -> Varchar,
        name -> Varchar,
        brand -> Varchar,
        condition -> Varchar,
        price_minor -> Int8,
        /// Never negative; guarded by a CHECK constraint and conditional updates.
        quantity_on_hand -> Int4,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user cart lines keyed by `(user_id, product_id)`.
    cart_lines (user_id, product_id) {
        user_id -> Uuid,
        product_id -> Uuid,
        quantity -> Int4,
        price_at_add_minor -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Placed orders.
    orders (id) {
        id -> Uuid,
        user_id -> Uuid,
        total_amount_minor -> Int8,
        status -> Varchar,
        payment_method -> Varchar,
        payment_status -> Varchar,
        shipping_address -> Text,
        shipping_city -> Varchar,
        shipping_province -> Varchar,
        shipping_postal_code -> Varchar,
        payment_proof -> Nullable<Text>,
        tracking_number -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        /// Compare-and-set counter.
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable order lines, ordered by `position`.
    order_lines (order_id, position) {
        order_id -> Uuid,
        position -> Int4,
        product_id -> Uuid,
        quantity -> Int4,
        price_per_unit_minor -> Int8,
        subtotal_minor -> Int8,
    }
}

diesel::table! {
    /// Payment ledger.
    payments (id) {
        id -> Uuid,
        order_id -> Uuid,
        amount_minor -> Int8,
        method -> Varchar,
        status -> Varchar,
        external_reference -> Nullable<Varchar>,
        paid_at -> Nullable<Timestamptz>,
        metadata -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(cart_lines -> products (product_id));
diesel::joinable!(order_lines -> orders (order_id));
diesel::joinable!(payments -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(cart_lines, order_lines, orders, payments, products);
