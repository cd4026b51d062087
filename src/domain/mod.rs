pub mod user;
pub mod product;
pub mod cart;
pub mod coupon;
pub mod shipping;
pub mod order;
pub mod payment;

pub use user::*;
pub use product::*;
pub use cart::*;
pub use coupon::*;
pub use shipping::*;
pub use order::*;
pub use payment::*;
