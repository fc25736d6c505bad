//! Data models
//!
//! Entity structs mapped to the Postgres schema plus request types used by
//! the repositories.

pub mod account;
pub mod coach;
pub mod interaction;
pub mod payment;
pub mod task;
pub mod user;

pub use account::PaymentAccount;
pub use coach::{Coach, DEFAULT_COACH_NAME};
pub use interaction::InteractionLogEntry;
pub use payment::{Coupon, CreatePaymentRequest, Payment, PaymentState};
pub use task::{Completion, CreateTaskRequest, Task, TaskType};
pub use user::{CreateUserRequest, Package, PaymentStatus, RegistrationDetails, User};
