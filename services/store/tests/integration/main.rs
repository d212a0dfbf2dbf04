mod account_test;
mod auth_test;
mod helpers;
mod order_test;
mod router_test;
