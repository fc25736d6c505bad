//! Database repositories
//!
//! One repository per ledger entity.

pub mod account;
pub mod coach;
pub mod interaction;
pub mod payment;
pub mod task;
pub mod user;

pub use account::AccountRepository;
pub use coach::CoachRepository;
pub use interaction::InteractionRepository;
pub use payment::PaymentRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
