//! Off-thread enemy AI
//!
//! Nothing here touches simulation state. Requests carry copies of the
//! positions they need and results are keyed by tick and enemy ID.

pub mod intents;
pub mod pool;

pub use intents::{
    EnemyIntent, EnemyRole, EnemySnapshot, IntentMode, IntentRequest, IntentResult,
    compute_intents,
};
pub use pool::{DEFAULT_QUEUE_DEPTH, IntentPool, default_worker_count};
