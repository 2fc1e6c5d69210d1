//! Business logic services.
//!
//! - [`pricing`] - Pure monetary computation (no I/O)
//! - [`checkout`] - The order placement workflow
//! - [`auth`] - Registration, login, and password hashing

pub mod auth;
pub mod checkout;
pub mod pricing;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutError, CheckoutService, PlaceOrderRequest};
pub use pricing::{PricingError, Totals};
