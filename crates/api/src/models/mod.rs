//! Stored document shapes and their API views.
//!
//! Serde casing follows the wire format of the original seed data: books use
//! `snake_case` fields, while users, carts, and orders use `camelCase`.

pub mod book;
pub mod cart;
pub mod order;
pub mod user;

pub use book::Book;
pub use cart::{Cart, CartItem, CartItemView, CartView};
pub use order::{Order, OrderItem, OrderItemView, OrderView};
pub use user::{User, UserRecord};
