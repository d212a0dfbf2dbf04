use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use akeshya_core::health::{healthz, readyz};
use akeshya_core::middleware::{error_context, request_id_layer};

use crate::handlers::{admin, auth, category, customer, order, product};
use crate::infra::storage::{MAX_FILE_SIZE, PUBLIC_PREFIX};
use crate::state::AppState;

/// Request body cap. Product forms carry several images of up to
/// [`MAX_FILE_SIZE`] each.
pub const MAX_BODY_SIZE: usize = 10 * MAX_FILE_SIZE;

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.storage.root());

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<AppState>))
        // Auth
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        // Customer self-service
        .route(
            "/api/customer/profile",
            get(customer::get_profile)
                .put(customer::update_profile)
                .delete(customer::delete_profile),
        )
        .route("/api/customer/all-users", get(customer::list_non_admin_users))
        .route("/api/customer/{id}", get(customer::get_customer))
        // Admin customers
        .route("/api/admin/customers", get(admin::list_customers))
        .route(
            "/api/admin/customers/{id}",
            get(admin::get_customer).delete(admin::delete_customer),
        )
        .route(
            "/api/admin/customers/{id}/status/{status}",
            put(admin::update_customer_status),
        )
        // Categories
        .route(
            "/api/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(category::get_category)
                .put(category::update_category)
                .delete(category::delete_category),
        )
        .route(
            "/api/categories/{id}/status",
            patch(category::set_category_status),
        )
        // Products
        .route(
            "/api/products",
            get(product::list_products).post(product::create_product),
        )
        .route("/api/products/published", get(product::list_published_products))
        .route("/api/products/search", get(product::search_products))
        .route("/api/products/stats", get(product::get_product_stats))
        .route(
            "/api/products/categories",
            get(product::list_product_category_names),
        )
        .route(
            "/api/products/category/{category}",
            get(product::list_products_by_category_name),
        )
        .route(
            "/api/products/category/{category}/products",
            get(product::get_category_products),
        )
        .route(
            "/api/products/{id}",
            get(product::get_product)
                .put(product::update_product)
                .delete(product::delete_product),
        )
        .route(
            "/api/products/{id}/publish/{published}",
            patch(product::set_product_published),
        )
        .route("/api/products/{id}/images", post(product::add_product_images))
        .route(
            "/api/products/{id}/images/{image_id}",
            delete(product::remove_product_image),
        )
        // Orders
        .route(
            "/api/orders",
            get(order::list_orders).post(order::create_order),
        )
        .route("/api/orders/statistics", get(order::get_order_statistics))
        .route(
            "/api/orders/number/{order_number}",
            get(order::get_order_by_number),
        )
        .route("/api/orders/user/{user_id}", get(order::list_user_orders))
        .route(
            "/api/orders/user/{user_id}/statistics",
            get(order::get_user_order_statistics),
        )
        .route("/api/orders/{id}", get(order::get_order))
        .route("/api/orders/{id}/status", patch(order::update_order_status))
        .route("/api/orders/{id}/cancel", patch(order::cancel_order))
        .route("/api/orders/{id}/tracking", get(order::get_order_tracking))
        // Uploaded images
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(axum::middleware::from_fn(error_context))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(request_id_layer())
        .with_state(state)
}
