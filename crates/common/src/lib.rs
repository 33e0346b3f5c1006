//! Shared types for the order fulfillment engine.
//!
//! Identifier newtypes, the authenticated [`Actor`] pair, fixed-point
//! [`Money`], and the [`OrderStatus`] lifecycle enum. Everything here is
//! plain data; behavior lives in the `order-store` and `domain` crates.

mod actor;
mod ids;
mod money;
mod status;

pub use actor::{Actor, ParseRoleError, Role};
pub use ids::{ActorId, OrderId, OrderNumber, ProductId};
pub use money::Money;
pub use status::{OrderStatus, ParseOrderStatusError};
