//! Database Models
//!
//! FromRow entities plus Create/Update payloads, one file per resource.

pub mod customer;
pub mod gift_card;
pub mod order;
pub mod reminder;
pub mod segment;
pub mod stock_unit;
pub mod tenant;

pub use customer::{Customer, CustomerCreate, CustomerUpdate};
pub use gift_card::{GiftCard, GiftCardCreate};
pub use order::{
    Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput, OrderStatus, OrderUpdate,
    PaymentStatus,
};
pub use reminder::{InvoiceReminder, ReminderSettings, ReminderSettingsUpdate, ReminderType};
pub use segment::{Segment, SegmentCreate, SegmentUpdate};
pub use stock_unit::{StockUnit, StockUnitCreate};
pub use tenant::{Tenant, TenantCreate};
