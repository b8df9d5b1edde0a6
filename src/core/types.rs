use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IncomeRange {
    pub min: u64,
    pub max: u64,
}

impl IncomeRange {
    pub fn average(self) -> f64 {
        self.min as f64 / 2.0 + self.max as f64 / 2.0
    }
}

/// Self-reported snapshot of a worker's monthly finances, in whole rupees.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub primary_income: String,
    pub monthly_income_range: Option<IncomeRange>,
    pub rent: u64,
    pub emi: u64,
    pub loans: u64,
    pub emergency_buffer_amount: Option<u64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Tier {
    Survival,
    Comfort,
    Growth,
}

impl Tier {
    pub fn level(self) -> u8 {
        match self {
            Tier::Survival => 0,
            Tier::Comfort => 1,
            Tier::Growth => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Survival => "Survival",
            Tier::Comfort => "Comfort",
            Tier::Growth => "Growth",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tier::Survival => "Income covers essential expenses only. Focus on increasing earnings.",
            Tier::Comfort => {
                "Income covers essentials and some discretionary spending. Build buffer."
            }
            Tier::Growth => "Income exceeds needs. Focus on savings and investments.",
        }
    }

    /// Monthly income that marks the step out of this tier. `gap_to_next_tier` measures to it.
    pub fn target_income(self) -> u64 {
        match self {
            Tier::Survival => 45_000,
            Tier::Comfort => 55_000,
            Tier::Growth => 65_000,
        }
    }

    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Survival => Some(Tier::Comfort),
            Tier::Comfort => Some(Tier::Growth),
            Tier::Growth => None,
        }
    }
}

impl From<Tier> for u8 {
    fn from(value: Tier) -> Self {
        value.level()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub level: u8,
    pub label: &'static str,
    pub target: u64,
    pub description: &'static str,
}

impl From<Tier> for TierInfo {
    fn from(value: Tier) -> Self {
        TierInfo {
            level: value.level(),
            label: value.label(),
            target: value.target_income(),
            description: value.description(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub tier: Tier,
    pub ratio: f64,
    pub gap_to_next_tier: Option<f64>,
    pub avg_income: f64,
    pub essentials: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferStatus {
    pub current: u64,
    pub target: u64,
    pub days_covered: f64,
    pub shortfall: u64,
    pub progress: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RiskRating {
    Risky,
    Medium,
    Good,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub period_label: String,
    pub event_text: String,
    pub buffer_after: u64,
    pub risk_level: RiskLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub label: String,
    pub summary: String,
    pub risk_rating: RiskRating,
    pub timeline: Vec<TimelineEntry>,
    pub suggestion: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    #[serde(alias = "bigPurchase", alias = "big-purchase")]
    Purchase,
    #[serde(alias = "weekOff", alias = "week_off")]
    WeekOff,
    #[serde(alias = "incomeDrop", alias = "income_drop")]
    IncomeDrop,
    #[serde(alias = "newGig", alias = "new_gig")]
    NewGig,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Purchase,
        ScenarioKind::WeekOff,
        ScenarioKind::IncomeDrop,
        ScenarioKind::NewGig,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScenarioKind::Purchase => "Big Purchase",
            ScenarioKind::WeekOff => "Take Week Off",
            ScenarioKind::IncomeDrop => "Income Drop",
            ScenarioKind::NewGig => "Add New Gig",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PurchaseTiming {
    #[serde(rename = "immediate")]
    Immediate,
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "2weeks")]
    TwoWeeks,
    #[serde(rename = "1month")]
    OneMonth,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GigType {
    Rideshare,
    Freelance,
    Delivery,
    Tutoring,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScenarioConfig {
    Purchase { amount: u64, timing: PurchaseTiming },
    WeekOff { weeks: u32 },
    IncomeDrop { drop_percent: u32, months: u32 },
    NewGig { gig_type: GigType, hours: u32 },
}

impl ScenarioConfig {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioConfig::Purchase { .. } => ScenarioKind::Purchase,
            ScenarioConfig::WeekOff { .. } => ScenarioKind::WeekOff,
            ScenarioConfig::IncomeDrop { .. } => ScenarioKind::IncomeDrop,
            ScenarioConfig::NewGig { .. } => ScenarioKind::NewGig,
        }
    }

    pub fn default_for(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Purchase => ScenarioConfig::Purchase {
                amount: 30_000,
                timing: PurchaseTiming::Immediate,
            },
            ScenarioKind::WeekOff => ScenarioConfig::WeekOff { weeks: 1 },
            ScenarioKind::IncomeDrop => ScenarioConfig::IncomeDrop {
                drop_percent: 20,
                months: 2,
            },
            ScenarioKind::NewGig => ScenarioConfig::NewGig {
                gig_type: GigType::Rideshare,
                hours: 20,
            },
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Risk,
    Opportunity,
    Info,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub action: String,
}
