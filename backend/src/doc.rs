//! OpenAPI documentation for the storefront API.
//!
//! [`ApiDoc`] backs Swagger UI in debug builds and the `openapi-dump` binary.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::envelope::ErrorEnvelope;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("HS256 token carrying `sub`, `role` and `exp`."))
            .build();
        components.add_security_scheme("BearerToken", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        description = "Catalogue, cart, order lifecycle and payment reconciliation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::list_brands,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::get_product_by_sku,
        crate::inbound::http::cart::view_cart,
        crate::inbound::http::cart::add_item,
        crate::inbound::http::cart::clear_cart,
        crate::inbound::http::cart::set_quantity,
        crate::inbound::http::cart::remove_item,
        crate::inbound::http::orders::checkout,
        crate::inbound::http::orders::place_direct_order,
        crate::inbound::http::orders::list_my_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::payments::payment_status,
        crate::inbound::http::payments::payment_notification,
        crate::inbound::http::admin::list_orders,
        crate::inbound::http::admin::update_status,
        crate::inbound::http::admin::update_tracking,
        crate::inbound::http::admin::verify_payment,
        crate::inbound::http::admin::create_product,
        crate::inbound::http::admin::update_product,
        crate::inbound::http::admin::delete_product,
        crate::inbound::http::admin::adjust_stock,
        crate::inbound::http::admin::set_active,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, ErrorEnvelope)),
    tags(
        (name = "products", description = "Public catalogue"),
        (name = "cart", description = "The caller's cart"),
        (name = "orders", description = "Placing and tracking orders"),
        (name = "payments", description = "Payment status and gateway notifications"),
        (name = "admin", description = "Operator fulfilment and catalogue tools"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
