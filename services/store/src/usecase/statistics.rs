use uuid::Uuid;

use akeshya_auth_types::identity::Identity;
use akeshya_domain::order::OrderStatus;

use crate::domain::repository::OrderRepository;
use crate::domain::types::{CategoryQuantity, StatusTotal};
use crate::error::StoreError;
use crate::usecase::require_admin;

/// Order counts and revenue across all customers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub confirmed_orders: u64,
    pub processing_orders: u64,
    pub shipped_orders: u64,
    pub delivered_orders: u64,
    pub cancelled_orders: u64,
    pub refunded_orders: u64,
    /// Every order except cancelled and refunded ones.
    pub total_revenue: f64,
    /// Orders placed but not yet delivered.
    pub pending_revenue: f64,
    pub completed_revenue: f64,
}

/// Order counts and spending of one customer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserOrderStatistics {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub confirmed_orders: u64,
    pub processing_orders: u64,
    pub shipped_orders: u64,
    pub delivered_orders: u64,
    pub cancelled_orders: u64,
    pub total_spent: f64,
    pub total_products_ordered: i64,
    /// Category with the highest ordered quantity.
    pub favorite_category: Option<i64>,
}

fn count_of(totals: &[StatusTotal], status: OrderStatus) -> u64 {
    totals
        .iter()
        .filter(|t| t.status == status)
        .map(|t| t.count)
        .sum()
}

fn amount_where(totals: &[StatusTotal], pred: impl Fn(OrderStatus) -> bool) -> f64 {
    totals
        .iter()
        .filter(|t| pred(t.status))
        .map(|t| t.amount)
        .sum()
}

pub fn summarize(totals: &[StatusTotal]) -> OrderStatistics {
    OrderStatistics {
        total_orders: totals.iter().map(|t| t.count).sum(),
        pending_orders: count_of(totals, OrderStatus::Pending),
        confirmed_orders: count_of(totals, OrderStatus::Confirmed),
        processing_orders: count_of(totals, OrderStatus::Processing),
        shipped_orders: count_of(totals, OrderStatus::Shipped),
        delivered_orders: count_of(totals, OrderStatus::Delivered),
        cancelled_orders: count_of(totals, OrderStatus::Cancelled),
        refunded_orders: count_of(totals, OrderStatus::Refunded),
        total_revenue: amount_where(totals, OrderStatus::is_billable),
        pending_revenue: amount_where(totals, OrderStatus::is_in_flight),
        completed_revenue: amount_where(totals, |s| s == OrderStatus::Delivered),
    }
}

/// Ties on quantity go to the lowest category id.
pub fn summarize_user(
    totals: &[StatusTotal],
    quantities: &[CategoryQuantity],
) -> UserOrderStatistics {
    let favorite_category = quantities
        .iter()
        .filter_map(|q| q.category_id.map(|id| (id, q.quantity)))
        .filter(|&(_, quantity)| quantity > 0)
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(id, _)| id);

    UserOrderStatistics {
        total_orders: totals.iter().map(|t| t.count).sum(),
        pending_orders: count_of(totals, OrderStatus::Pending),
        confirmed_orders: count_of(totals, OrderStatus::Confirmed),
        processing_orders: count_of(totals, OrderStatus::Processing),
        shipped_orders: count_of(totals, OrderStatus::Shipped),
        delivered_orders: count_of(totals, OrderStatus::Delivered),
        cancelled_orders: count_of(totals, OrderStatus::Cancelled),
        total_spent: amount_where(totals, OrderStatus::is_billable),
        total_products_ordered: quantities.iter().map(|q| q.quantity).sum(),
        favorite_category,
    }
}

// ── GetOrderStatistics ───────────────────────────────────────────────────────

pub struct GetOrderStatisticsUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderStatisticsUseCase<O> {
    pub async fn execute(&self, identity: &Identity) -> Result<OrderStatistics, StoreError> {
        require_admin(identity)?;
        let totals = self.orders.status_totals(None).await?;
        Ok(summarize(&totals))
    }
}

// ── GetUserOrderStatistics ───────────────────────────────────────────────────

pub struct GetUserOrderStatisticsUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetUserOrderStatisticsUseCase<O> {
    pub async fn execute(
        &self,
        identity: &Identity,
        user_id: Uuid,
    ) -> Result<UserOrderStatistics, StoreError> {
        if !identity.can_act_for(user_id) {
            return Err(StoreError::Forbidden);
        }
        let totals = self.orders.status_totals(Some(user_id)).await?;
        let quantities = self.orders.ordered_quantities(user_id).await?;
        Ok(summarize_user(&totals, &quantities))
    }
}
