use chrono::Utc;
use uuid::Uuid;

use akeshya_auth_types::identity::Identity;
use akeshya_domain::order::{OrderStatus, order_number_from_millis};

use crate::domain::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::domain::types::{NewOrder, NewOrderItem, Order, OrderTracking};
use crate::error::StoreError;
use crate::usecase::require_admin;

/// Description of the tracking row written when an order is created.
pub const ORDER_PLACED: &str = "Order placed successfully";

/// Inserts tried before a taken order number is reported as an internal error.
pub const ORDER_NUMBER_ATTEMPTS: u32 = 5;

// ── CreateOrder ──────────────────────────────────────────────────────────────

pub struct OrderLineInput {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

pub struct CreateOrderInput {
    /// Owner of the order. Defaults to the caller.
    pub user_id: Option<Uuid>,
    pub items: Vec<OrderLineInput>,
    pub special_instructions: Option<String>,
}

pub struct CreateOrderUseCase<O, U, P>
where
    O: OrderRepository,
    U: UserRepository,
    P: ProductRepository,
{
    pub orders: O,
    pub users: U,
    pub products: P,
}

impl<O, U, P> CreateOrderUseCase<O, U, P>
where
    O: OrderRepository,
    U: UserRepository,
    P: ProductRepository,
{
    /// Price every line, snapshot the owner's contact data and persist the order
    /// with its initial tracking row. Nothing is written if any line is rejected.
    pub async fn execute(
        &self,
        identity: &Identity,
        input: CreateOrderInput,
    ) -> Result<Order, StoreError> {
        let user_id = input.user_id.unwrap_or(identity.user_id);
        if !identity.can_act_for(user_id) {
            return Err(StoreError::Forbidden);
        }
        if input.items.is_empty() {
            return Err(StoreError::InvalidRequest(
                "Order must contain at least one item".into(),
            ));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::UserNotFound)?;

        let mut items = Vec::with_capacity(input.items.len());
        for line in input.items {
            let product = self
                .products
                .find_by_id(line.product_id)
                .await?
                .ok_or(StoreError::ProductNotFound(line.product_id))?;
            if !product.is_published {
                return Err(StoreError::ProductNotAvailable(product.name));
            }
            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                item_total: line.unit_price * f64::from(line.quantity),
                selected_size: line.selected_size,
                selected_color: line.selected_color,
            });
        }
        let total_amount = items.iter().map(|i| i.item_total).sum();

        let mut millis = Utc::now().timestamp_millis();
        let mut new_order = NewOrder {
            order_number: order_number_from_millis(millis),
            user_id,
            total_amount,
            shipping_address: user.shipping_address,
            contact_person_name: user.contact_person_name,
            contact_number: user.contact_number,
            special_instructions: input.special_instructions,
            items,
            initial_tracking: ORDER_PLACED.to_owned(),
        };
        let mut attempt = 1;
        let order = loop {
            match self.orders.create(&new_order).await {
                Err(StoreError::OrderNumberTaken(number)) if attempt < ORDER_NUMBER_ATTEMPTS => {
                    tracing::warn!(order_number = %number, attempt, "order number taken, retrying");
                    attempt += 1;
                    millis = (millis + 1).max(Utc::now().timestamp_millis());
                    new_order.order_number = order_number_from_millis(millis);
                }
                result => break result?,
            }
        };
        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            %user_id,
            total_amount = order.total_amount,
            "order placed"
        );
        Ok(order)
    }
}

// ── UpdateOrderStatus ────────────────────────────────────────────────────────

pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
    pub note: Option<String>,
}

pub struct UpdateOrderStatusUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> UpdateOrderStatusUseCase<O> {
    /// Any status may follow any other. One tracking row is appended per call.
    pub async fn execute(
        &self,
        identity: &Identity,
        order_id: i64,
        input: UpdateOrderStatusInput,
    ) -> Result<Order, StoreError> {
        require_admin(identity)?;
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(StoreError::OrderNotFound)?;

        let description = match input.note {
            Some(note) => note,
            None => format!("Status updated to {}", input.status),
        };
        let updated = self
            .orders
            .append_status(order.id, input.status, &description)
            .await?;
        tracing::info!(
            order_id,
            from = %order.status,
            to = %input.status,
            "order status updated"
        );
        Ok(updated)
    }
}

// ── CancelOrder ──────────────────────────────────────────────────────────────

pub struct CancelOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> CancelOrderUseCase<O> {
    pub async fn execute(
        &self,
        identity: &Identity,
        order_id: i64,
        reason: Option<String>,
    ) -> Result<Order, StoreError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(StoreError::OrderNotFound)?;
        if !identity.can_act_for(order.user_id) {
            return Err(StoreError::Forbidden);
        }
        match order.status {
            OrderStatus::Cancelled => return Err(StoreError::OrderAlreadyCancelled),
            OrderStatus::Delivered => return Err(StoreError::CannotCancelDelivered),
            _ => {}
        }

        let description = match reason {
            Some(reason) => format!("Order cancelled: {reason}"),
            None => "Order cancelled".to_owned(),
        };
        let cancelled = self
            .orders
            .append_status(order.id, OrderStatus::Cancelled, &description)
            .await?;
        tracing::info!(order_id, from = %order.status, "order cancelled");
        Ok(cancelled)
    }
}

// ── GetOrder ─────────────────────────────────────────────────────────────────

pub enum OrderLookup {
    Id(i64),
    Number(String),
}

pub struct GetOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    pub async fn execute(
        &self,
        identity: &Identity,
        lookup: OrderLookup,
    ) -> Result<Order, StoreError> {
        let order = match lookup {
            OrderLookup::Id(id) => self.orders.find_by_id(id).await?,
            OrderLookup::Number(number) => self.orders.find_by_number(&number).await?,
        }
        .ok_or(StoreError::OrderNotFound)?;
        if !identity.can_act_for(order.user_id) {
            return Err(StoreError::Forbidden);
        }
        Ok(order)
    }
}

// ── ListOrders ───────────────────────────────────────────────────────────────

pub struct ListUserOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListUserOrdersUseCase<O> {
    pub async fn execute(
        &self,
        identity: &Identity,
        user_id: Uuid,
    ) -> Result<Vec<Order>, StoreError> {
        if !identity.can_act_for(user_id) {
            return Err(StoreError::Forbidden);
        }
        self.orders.list_by_user(user_id).await
    }
}

pub struct ListAllOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListAllOrdersUseCase<O> {
    pub async fn execute(&self, identity: &Identity) -> Result<Vec<Order>, StoreError> {
        require_admin(identity)?;
        self.orders.list_all().await
    }
}

// ── GetOrderTracking ─────────────────────────────────────────────────────────

pub struct GetOrderTrackingUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderTrackingUseCase<O> {
    /// Tracking history of an order, oldest first.
    pub async fn execute(
        &self,
        identity: &Identity,
        order_id: i64,
    ) -> Result<Vec<OrderTracking>, StoreError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(StoreError::OrderNotFound)?;
        if !identity.can_act_for(order.user_id) {
            return Err(StoreError::Forbidden);
        }
        self.orders.tracking(order.id).await
    }
}
