//! Route table for the storefront API.

use actix_web::web;

use super::auth::TokenVerifier;
use super::error::{json_config, path_config, query_config};
use super::health::HealthState;
use super::signature::WebhookVerifier;
use super::state::HttpState;
use super::{admin, cart, health, orders, payments, products};

/// Shared data every storefront app registers.
#[derive(Clone)]
pub struct AppData {
    pub state: web::Data<HttpState>,
    pub tokens: web::Data<TokenVerifier>,
    pub webhooks: web::Data<WebhookVerifier>,
    pub health: web::Data<HealthState>,
}

impl AppData {
    /// Register the shared data and mount every route.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.state.clone())
            .app_data(self.tokens.clone())
            .app_data(self.webhooks.clone())
            .app_data(self.health.clone());
        configure(cfg);
    }
}

/// Mount `/api/v1` and the health probes.
///
/// The handlers expect the values in [`AppData`] as app data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use storefront::inbound::http::routes::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    let api = web::scope("/api/v1")
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        // Literal segments before `{product_id}`.
        .service(products::list_brands)
        .service(products::get_product_by_sku)
        .service(products::list_products)
        .service(products::get_product)
        .service(cart::view_cart)
        .service(cart::add_item)
        .service(cart::clear_cart)
        .service(cart::set_quantity)
        .service(cart::remove_item)
        .service(orders::checkout)
        .service(orders::place_direct_order)
        .service(orders::list_my_orders)
        .service(orders::get_order)
        .service(orders::cancel_order)
        .service(payments::payment_notification)
        .service(payments::payment_status)
        .service(admin::list_orders)
        .service(admin::update_status)
        .service(admin::update_tracking)
        .service(admin::verify_payment)
        .service(admin::create_product)
        .service(admin::update_product)
        .service(admin::delete_product)
        .service(admin::adjust_stock)
        .service(admin::set_active);

    cfg.service(api)
        .service(health::ready)
        .service(health::live);
}
