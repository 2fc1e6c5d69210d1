//! Domain models for the Aurelia store.
//!
//! These are validated domain objects, separate from the database row types
//! that live next to the queries in [`crate::db`].

pub mod cart;
pub mod order;
pub mod product;
pub mod settings;
pub mod user;

pub use cart::{CartItem, WishlistItem};
pub use order::{Order, OrderItem, OrderReceipt, ShippingAddress};
pub use product::{Category, Product};
pub use settings::{PublicSettings, Settings};
pub use user::{Admin, User};
