mod alerts;
mod classifier;
mod coach;
mod error;
mod simulator;
mod types;

pub use alerts::{demo_signals, generate_alerts, survival_alert};
pub use classifier::{
    COMFORT_RATIO_CEILING, DEFAULT_AVERAGE_INCOME, ExpensePolicy, SURVIVAL_RATIO_CEILING,
    buffer_status, classify, classify_with_policy, essential_expenses,
};
pub use coach::{
    CoachBook, CoachReply, MENTORS, Mentor, QUICK_SUGGESTIONS, find_mentor, mentor_reply,
};
pub use error::CoreError;
pub use simulator::{
    AuthoredOutcomes, OutcomeSource, REFERENCE_BUFFER, simulate, simulate_from_buffer,
    simulate_with,
};
pub use types::{
    Alert, AlertKind, BufferStatus, Classification, GigType, IncomeRange, Outcome,
    Profile, PurchaseTiming, RiskLevel, RiskRating, ScenarioConfig, ScenarioKind, Tier, TierInfo,
    TimelineEntry,
};
