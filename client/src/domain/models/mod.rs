//! Marketplace records exchanged with the backend.
//!
//! The backend contract is loose: money arrives as numbers or decimal
//! strings, related records arrive as bare ids or embedded objects, and
//! collections arrive as arrays or paginated envelopes. The types here accept
//! every observed shape so endpoint groups can stay thin.

mod amount;
mod cart;
mod chat;
mod delivery;
mod entity_ref;
mod location;
mod notification;
mod order;
mod page;
mod payment;
mod product;
mod review;
mod user;

pub use cart::{Cart, CartItem};
pub use chat::{ChatMessage, Conversation};
pub use delivery::{DeliveryStats, LocationUpdate};
pub use entity_ref::{EmbeddedEntity, EntityRef};
pub use location::GeocodeResult;
pub use notification::Notification;
pub use order::{NewOrder, Order, OrderItem, OrderLine, OrderStatus};
pub use page::{ListPayload, Page};
pub use payment::{PaymentConfirmation, PaymentIntent};
pub use product::{Category, Product, ProductDraft, ProductQuery};
pub use review::{NewReview, Review};
pub use user::{ProfileUpdate, User, UserRole};
