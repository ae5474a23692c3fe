//! Checkout and direct order placement.

use std::collections::HashMap;

use serde_json::json;
use tracing::info;

use super::{OrderService, note_text};
use crate::domain::ports::{
    CartRepository, CheckoutRequest, DirectOrderRequest, OrderPlacement, OrderRepository,
    PaymentRepository, ProductRepository,
};
use crate::domain::service_support::{
    insufficient_stock, map_cart_error, map_order_error, map_product_error, map_validation_error,
};
use crate::domain::{
    Actor, Error, Order, OrderDraft, OrderLine, PaymentMethod, PaymentRecord, Product, ProductId,
    Quantity, ShippingAddress,
};

/// Buyer-supplied fields shared by both placement flows.
struct PlacementInput {
    shipping: ShippingAddress,
    payment_method: PaymentMethod,
    payment_proof: Option<String>,
    notes: Option<String>,
}

fn ensure_orderable(
    product: Option<&Product>,
    product_id: ProductId,
    quantity: Quantity,
) -> Result<(), Error> {
    let product = product.ok_or_else(|| {
        Error::not_found(format!("product {product_id} not found"))
            .with_details(json!({ "productId": product_id }))
    })?;
    if !product.is_active {
        return Err(
            Error::conflict(format!("product {product_id} is not available"))
                .with_details(json!({ "productId": product_id })),
        );
    }
    if !product.can_supply(quantity) {
        return Err(insufficient_stock(
            &product_id.to_string(),
            quantity.get(),
            product.quantity_on_hand,
        ));
    }
    Ok(())
}

impl<O, P, C, Y> OrderService<O, P, C, Y>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
    Y: PaymentRepository,
{
    pub(super) async fn place_from_cart(
        &self,
        actor: &Actor,
        request: CheckoutRequest,
    ) -> Result<Order, Error> {
        let user_id = *actor.user_id();
        let cart_lines = self
            .carts
            .lines_for_user(&user_id)
            .await
            .map_err(map_cart_error)?;
        if cart_lines.is_empty() {
            return Err(Error::invalid_request("cart is empty")
                .with_details(json!({ "field": "items" })));
        }

        let ids: Vec<ProductId> = cart_lines.iter().map(|line| line.product_id).collect();
        let products: HashMap<ProductId, Product> = self
            .products
            .find_by_ids(&ids)
            .await
            .map_err(map_product_error)?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let mut lines = Vec::with_capacity(cart_lines.len());
        for cart_line in &cart_lines {
            ensure_orderable(
                products.get(&cart_line.product_id),
                cart_line.product_id,
                cart_line.quantity,
            )?;
            lines.push(
                OrderLine::new(
                    cart_line.product_id,
                    cart_line.quantity,
                    cart_line.price_at_add,
                )
                .map_err(map_validation_error)?,
            );
        }

        let input = PlacementInput {
            shipping: request.shipping,
            payment_method: request.payment_method,
            payment_proof: request.payment_proof,
            notes: request.notes,
        };
        self.place(actor, lines, input, ids).await
    }

    pub(super) async fn place_single(
        &self,
        actor: &Actor,
        request: DirectOrderRequest,
    ) -> Result<Order, Error> {
        let product = self
            .products
            .find_by_id(&request.product_id)
            .await
            .map_err(map_product_error)?;
        ensure_orderable(product.as_ref(), request.product_id, request.quantity)?;
        let price = product
            .map(|product| product.price)
            .ok_or_else(|| Error::internal("product vanished during validation"))?;
        let line = OrderLine::new(request.product_id, request.quantity, price)
            .map_err(map_validation_error)?;

        let input = PlacementInput {
            shipping: request.shipping,
            payment_method: request.payment_method,
            payment_proof: request.payment_proof,
            notes: request.notes,
        };
        self.place(actor, vec![line], input, Vec::new()).await
    }

    async fn place(
        &self,
        actor: &Actor,
        lines: Vec<OrderLine>,
        input: PlacementInput,
        cart_products: Vec<ProductId>,
    ) -> Result<Order, Error> {
        let from_cart = !cart_products.is_empty();
        let now = self.clock.utc();
        let notes = note_text(input.notes.as_deref(), "notes")?;
        let order = Order::place(
            OrderDraft {
                user_id: *actor.user_id(),
                lines,
                payment_method: input.payment_method,
                shipping: input.shipping,
                payment_proof: input.payment_proof,
                notes,
            },
            now,
        )
        .map_err(map_validation_error)?;

        let payment = order
            .payment_method
            .requires_manual_proof()
            .then(|| order.payment_proof.as_deref())
            .flatten()
            .map(|proof| PaymentRecord::for_manual_proof(&order, proof, now));

        let placement = OrderPlacement {
            order,
            payment,
            cart_products,
        };
        self.orders
            .place(&placement)
            .await
            .map_err(map_order_error)?;

        let order = placement.order;
        info!(
            order_id = %order.id,
            order_number = %order.order_number(),
            user_id = %order.user_id,
            total = %order.total_amount,
            lines = order.lines.len(),
            payment_method = %order.payment_method,
            from_cart,
            "order placed"
        );
        Ok(order)
    }
}
