//! Write-side logic for the order fulfillment engine.
//!
//! The [`CheckoutCoordinator`] materializes a cart into an order through the
//! store's all-or-nothing checkout transaction; the [`StatusService`] drives
//! orders through the actor-scoped status state machine. Both take the store
//! handle as an explicit constructor dependency — there is no ambient
//! database reference anywhere.

mod checkout;
mod error;
mod status;
mod transition;

pub use checkout::{CartItem, CheckoutCoordinator, CheckoutRequest, DEFAULT_DELIVERY_FEE};
pub use error::FulfillmentError;
pub use status::StatusService;
pub use transition::{rule_for_target, OwnershipRule, TransitionRule, TRANSITIONS};
