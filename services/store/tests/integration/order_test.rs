use std::sync::atomic::Ordering;

use akeshya_domain::order::{ORDER_NUMBER_PREFIX, OrderStatus};
use akeshya_store::error::StoreError;
use akeshya_store::usecase::order::{
    CancelOrderUseCase, CreateOrderInput, CreateOrderUseCase, GetOrderTrackingUseCase,
    GetOrderUseCase, ListAllOrdersUseCase, ListUserOrdersUseCase, ORDER_NUMBER_ATTEMPTS,
    ORDER_PLACED, OrderLineInput, OrderLookup, UpdateOrderStatusInput, UpdateOrderStatusUseCase,
};
use akeshya_store::usecase::statistics::{
    GetOrderStatisticsUseCase, GetUserOrderStatisticsUseCase,
};

use crate::helpers::{
    InMemoryCatalog, InMemoryOrders, InMemoryUsers, admin_identity, customer, identity_of,
};

fn line(product_id: i64, quantity: i32, unit_price: f64) -> OrderLineInput {
    OrderLineInput {
        product_id,
        quantity,
        unit_price,
        selected_size: Some("2.4".into()),
        selected_color: Some("Gold".into()),
    }
}

struct Shop {
    users: InMemoryUsers,
    catalog: InMemoryCatalog,
    orders: InMemoryOrders,
}

impl Shop {
    fn place_order(&self) -> CreateOrderUseCase<InMemoryOrders, InMemoryUsers, InMemoryCatalog> {
        CreateOrderUseCase {
            orders: self.orders.clone(),
            users: self.users.clone(),
            products: self.catalog.clone(),
        }
    }
}

fn shop() -> (Shop, akeshya_store::domain::types::User, i64, i64) {
    let buyer = customer("9876543210", Some("buyer@sri-gems.in"));
    let catalog = InMemoryCatalog::new();
    let bangles = catalog.add_category("Bangles");
    let rings = catalog.add_category("Rings");
    let kada = catalog.add_product("Temple Kada", &bangles, true);
    let band = catalog.add_product("Plain Band", &rings, true);
    let orders = InMemoryOrders::with_product_categories(&[
        (kada.id, bangles.id),
        (band.id, rings.id),
    ]);
    let shop = Shop {
        users: InMemoryUsers::new(vec![buyer.clone()]),
        catalog,
        orders,
    };
    (shop, buyer, kada.id, band.id)
}

// ── CreateOrder ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_place_order_with_snapshot_of_customer_contact() {
    let (shop, buyer, kada, band) = shop();

    let order = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 2, 1500.0), line(band, 1, 800.0)],
                special_instructions: Some("Deliver before Diwali".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, buyer.id);
    assert_eq!(order.total_amount, 3800.0);
    assert_eq!(order.items[0].item_total, 3000.0);
    assert_eq!(order.items[0].product_name, "Temple Kada");
    assert_eq!(order.shipping_address, buyer.shipping_address);
    assert_eq!(order.contact_number, buyer.contact_number);
    assert!(order.order_number.starts_with("ORD"));
    assert_eq!(order.tracking.len(), 1);
    assert_eq!(order.tracking[0].status, OrderStatus::Pending);
    assert_eq!(order.tracking[0].description, ORDER_PLACED);
}

#[tokio::test]
async fn should_reject_unpublished_product_without_writing() {
    let (shop, buyer, kada, _) = shop();
    let draft_category = shop.catalog.add_category("Drafts");
    let hidden = shop.catalog.add_product("Sample Choker", &draft_category, false);

    let result = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0), line(hidden.id, 1, 900.0)],
                special_instructions: None,
            },
        )
        .await;

    assert!(
        matches!(&result, Err(StoreError::ProductNotAvailable(name)) if name == "Sample Choker"),
        "expected ProductNotAvailable, got {result:?}"
    );
    assert!(shop.orders.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_unknown_product() {
    let (shop, buyer, _, _) = shop();

    let result = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(999, 1, 10.0)],
                special_instructions: None,
            },
        )
        .await;

    assert!(matches!(result, Err(StoreError::ProductNotFound(999))));
}

#[tokio::test]
async fn should_forbid_ordering_for_another_customer() {
    let (shop, buyer, kada, _) = shop();
    let other = customer("9123456780", None);
    shop.users.users.lock().unwrap().push(other.clone());

    let result = shop
        .place_order()
        .execute(
            &identity_of(&other),
            CreateOrderInput {
                user_id: Some(buyer.id),
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await;

    assert!(matches!(result, Err(StoreError::Forbidden)));
}

#[tokio::test]
async fn should_let_admin_order_on_behalf_of_customer() {
    let (shop, buyer, kada, _) = shop();

    let order = shop
        .place_order()
        .execute(
            &admin_identity(),
            CreateOrderInput {
                user_id: Some(buyer.id),
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(order.user_id, buyer.id);
}

fn number_millis(order_number: &str) -> i64 {
    order_number.strip_prefix(ORDER_NUMBER_PREFIX).unwrap().parse().unwrap()
}

#[tokio::test]
async fn should_retry_with_later_number_when_number_is_taken() {
    let (shop, buyer, kada, _) = shop();
    shop.orders.collisions.store(2, Ordering::SeqCst);

    let order = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();

    let attempted = shop.orders.attempted_numbers.lock().unwrap().clone();
    assert_eq!(attempted.len(), 3);
    let millis: Vec<i64> = attempted.iter().map(|n| number_millis(n)).collect();
    assert!(millis.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(&order.order_number, attempted.last().unwrap());
    assert_eq!(shop.orders.orders.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_give_up_after_repeated_number_collisions() {
    let (shop, buyer, kada, _) = shop();
    shop.orders.collisions.store(ORDER_NUMBER_ATTEMPTS + 1, Ordering::SeqCst);

    let result = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await;

    assert!(matches!(result, Err(StoreError::OrderNumberTaken(_))));
    assert_eq!(
        shop.orders.attempted_numbers.lock().unwrap().len(),
        ORDER_NUMBER_ATTEMPTS as usize
    );
    assert!(shop.orders.orders.lock().unwrap().is_empty());
}

// ── Status update / cancel ───────────────────────────────────────────────────

#[tokio::test]
async fn should_append_tracking_row_per_status_update() {
    let (shop, buyer, kada, _) = shop();
    let order = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();

    let update = UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    };
    update
        .execute(
            &admin_identity(),
            order.id,
            UpdateOrderStatusInput {
                status: OrderStatus::Confirmed,
                note: None,
            },
        )
        .await
        .unwrap();
    let shipped = update
        .execute(
            &admin_identity(),
            order.id,
            UpdateOrderStatusInput {
                status: OrderStatus::Shipped,
                note: Some("Dispatched via BlueDart".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(shipped.status, OrderStatus::Shipped);
    let descriptions: Vec<&str> = shipped
        .tracking
        .iter()
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            ORDER_PLACED,
            "Status updated to CONFIRMED",
            "Dispatched via BlueDart"
        ]
    );
}

#[tokio::test]
async fn should_require_admin_for_status_update() {
    let (shop, buyer, kada, _) = shop();
    let order = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();

    let result = UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    }
    .execute(
        &identity_of(&buyer),
        order.id,
        UpdateOrderStatusInput {
            status: OrderStatus::Delivered,
            note: None,
        },
    )
    .await;

    assert!(matches!(result, Err(StoreError::Forbidden)));
}

#[tokio::test]
async fn should_cancel_shipped_order_once() {
    let (shop, buyer, kada, _) = shop();
    let order = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();
    UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    }
    .execute(
        &admin_identity(),
        order.id,
        UpdateOrderStatusInput {
            status: OrderStatus::Shipped,
            note: None,
        },
    )
    .await
    .unwrap();

    let cancel = CancelOrderUseCase {
        orders: shop.orders.clone(),
    };
    let cancelled = cancel
        .execute(&identity_of(&buyer), order.id, Some("customer request".into()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(
        cancelled.tracking.last().unwrap().description,
        "Order cancelled: customer request"
    );

    let again = cancel.execute(&identity_of(&buyer), order.id, None).await;
    assert!(matches!(again, Err(StoreError::OrderAlreadyCancelled)));
}

#[tokio::test]
async fn should_refuse_to_cancel_delivered_order() {
    let (shop, buyer, kada, _) = shop();
    let order = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();
    UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    }
    .execute(
        &admin_identity(),
        order.id,
        UpdateOrderStatusInput {
            status: OrderStatus::Delivered,
            note: None,
        },
    )
    .await
    .unwrap();

    let result = CancelOrderUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer), order.id, None)
    .await;

    assert!(matches!(result, Err(StoreError::CannotCancelDelivered)));
    let tracking = GetOrderTrackingUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer), order.id)
    .await
    .unwrap();
    assert_eq!(tracking.len(), 2);
}

async fn place_single(
    shop: &Shop,
    buyer: &akeshya_store::domain::types::User,
    product: i64,
) -> i64 {
    shop.place_order()
        .execute(
            &identity_of(buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(product, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap()
        .id
}

fn set_status(status: OrderStatus) -> UpdateOrderStatusInput {
    UpdateOrderStatusInput { status, note: None }
}

#[tokio::test]
async fn should_move_cancelled_and_delivered_orders_to_any_status() {
    let (shop, buyer, kada, band) = shop();
    let update = UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    };

    let cancelled = place_single(&shop, &buyer, kada).await;
    CancelOrderUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer), cancelled, None)
    .await
    .unwrap();
    let reshipped = update
        .execute(&admin_identity(), cancelled, set_status(OrderStatus::Shipped))
        .await
        .unwrap();
    assert_eq!(reshipped.status, OrderStatus::Shipped);
    assert_eq!(reshipped.tracking.len(), 3);
    assert_eq!(
        reshipped.tracking.last().unwrap().description,
        "Status updated to SHIPPED"
    );

    let delivered = place_single(&shop, &buyer, band).await;
    update
        .execute(&admin_identity(), delivered, set_status(OrderStatus::Delivered))
        .await
        .unwrap();
    let reopened = update
        .execute(&admin_identity(), delivered, set_status(OrderStatus::Pending))
        .await
        .unwrap();
    assert_eq!(reopened.status, OrderStatus::Pending);
    assert_eq!(reopened.tracking.len(), 3);
}

#[tokio::test]
async fn should_return_tracking_in_chronological_order() {
    let (shop, buyer, kada, _) = shop();
    let order = place_single(&shop, &buyer, kada).await;
    let update = UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    };
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        update
            .execute(&admin_identity(), order, set_status(status))
            .await
            .unwrap();
    }

    let tracking = GetOrderTrackingUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer), order)
    .await
    .unwrap();

    assert_eq!(tracking.len(), 5);
    assert!(tracking.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    assert_eq!(tracking[0].status, OrderStatus::Pending);
    assert_eq!(tracking[4].status, OrderStatus::Delivered);
}

#[tokio::test]
async fn should_record_note_and_reason_as_given() {
    let (shop, buyer, kada, _) = shop();
    let order = place_single(&shop, &buyer, kada).await;

    let packed = UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    }
    .execute(
        &admin_identity(),
        order,
        UpdateOrderStatusInput {
            status: OrderStatus::Processing,
            note: Some("  packed with care ".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        packed.tracking.last().unwrap().description,
        "  packed with care "
    );

    let cancelled = CancelOrderUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer), order, Some(" ".into()))
    .await
    .unwrap();
    assert_eq!(
        cancelled.tracking.last().unwrap().description,
        "Order cancelled:  "
    );
}

// ── Reads ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_orders_from_other_customers() {
    let (shop, buyer, kada, _) = shop();
    let order = shop
        .place_order()
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 1, 1500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();
    let stranger = customer("9000000001", None);

    let get = GetOrderUseCase {
        orders: shop.orders.clone(),
    };
    let by_number = get
        .execute(&identity_of(&buyer), OrderLookup::Number(order.order_number.clone()))
        .await
        .unwrap();
    assert_eq!(by_number.id, order.id);

    let denied = get
        .execute(&identity_of(&stranger), OrderLookup::Id(order.id))
        .await;
    assert!(matches!(denied, Err(StoreError::Forbidden)));

    let listed = ListUserOrdersUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&stranger), buyer.id)
    .await;
    assert!(matches!(listed, Err(StoreError::Forbidden)));

    let all = ListAllOrdersUseCase {
        orders: shop.orders.clone(),
    };
    assert!(matches!(
        all.execute(&identity_of(&buyer)).await,
        Err(StoreError::Forbidden)
    ));
    assert_eq!(all.execute(&admin_identity()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_report_missing_order() {
    let (shop, buyer, _, _) = shop();
    let result = GetOrderUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer), OrderLookup::Id(42))
    .await;
    assert!(matches!(result, Err(StoreError::OrderNotFound)));
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_summarize_orders_for_admin_and_customer() {
    let (shop, buyer, kada, band) = shop();
    let place = shop.place_order();
    let first = place
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(kada, 3, 1000.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();
    place
        .execute(
            &identity_of(&buyer),
            CreateOrderInput {
                user_id: None,
                items: vec![line(band, 1, 500.0)],
                special_instructions: None,
            },
        )
        .await
        .unwrap();
    UpdateOrderStatusUseCase {
        orders: shop.orders.clone(),
    }
    .execute(
        &admin_identity(),
        first.id,
        UpdateOrderStatusInput {
            status: OrderStatus::Delivered,
            note: None,
        },
    )
    .await
    .unwrap();

    let stats = GetOrderStatisticsUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&admin_identity())
    .await
    .unwrap();
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.delivered_orders, 1);
    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.total_revenue, 3500.0);
    assert_eq!(stats.completed_revenue, 3000.0);
    assert_eq!(stats.pending_revenue, 500.0);

    let mine = GetUserOrderStatisticsUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer), buyer.id)
    .await
    .unwrap();
    assert_eq!(mine.total_orders, 2);
    assert_eq!(mine.total_spent, 3500.0);
    assert_eq!(mine.total_products_ordered, 4);
    let bangles = shop.orders.product_categories.lock().unwrap()[&kada];
    assert_eq!(mine.favorite_category, Some(bangles));
}

#[tokio::test]
async fn should_forbid_statistics_to_customers() {
    let (shop, buyer, _, _) = shop();
    let result = GetOrderStatisticsUseCase {
        orders: shop.orders.clone(),
    }
    .execute(&identity_of(&buyer))
    .await;
    assert!(matches!(result, Err(StoreError::Forbidden)));
}
