//! Data models for the ordering backend.
//!
//! Records use the column names of the hosted tables; the local mirror stores the same shape.

mod cart;
mod connection;
mod menu_item;
mod order;
mod session;

pub use cart::*;
pub use connection::*;
pub use menu_item::*;
pub use order::*;
pub use session::*;
