//! Back office server - multi-tenant commerce engine
//!
//! # Architecture
//!
//! - **Order aggregate** (`orders`): transactional create/update/delete with
//!   stock reservation and gift-card redemption
//! - **Customer statistics** (`customers`): derived aggregates, full recompute
//! - **Segmentation** (`segmentation`): rule criteria and first-match-wins
//!   assignment
//! - **Reminders** (`reminders`): overdue invoice escalation and delivery seam
//! - **HTTP API** (`api`): tenant-scoped RESTful interface
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/          # config, state, server, background tasks
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # pool, migrations, models, repositories
//! ├── orders/        # order aggregate and money math
//! ├── customers/     # statistics recalculator
//! ├── segmentation/  # criteria interpreter and assignment engine
//! ├── reminders/     # scheduler, templates, sender seam
//! ├── plan/          # plan tiers and feature gates
//! └── utils/         # errors, logging, time/id helpers
//! ```

pub mod api;
pub mod core;
pub mod customers;
pub mod db;
pub mod orders;
pub mod plan;
pub mod reminders;
pub mod segmentation;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use db::DbService;
pub use orders::OrderError;
pub use plan::{Feature, PlanTier};
pub use reminders::{LogSender, NotificationSender, TenantReminderReport};
pub use segmentation::SegmentCriteria;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
