pub mod root;
pub mod auth;
pub mod products;
pub mod cart;
pub mod coupons;
pub mod shipping;
pub mod checkout;
pub mod orders;
pub mod payments;
