use super::error::CoreError;
use super::types::{
    Outcome, RiskLevel, RiskRating, ScenarioConfig, ScenarioKind, TimelineEntry,
};

/// Buffer the authored timelines start from.
pub const REFERENCE_BUFFER: u64 = 45_000;

pub const PURCHASE_AMOUNT_MAX: u64 = 10_000_000;
pub const WEEKS_OFF_RANGE: (u32, u32) = (1, 4);
pub const GIG_HOURS_RANGE: (u32, u32) = (5, 40);
pub const DROP_PERCENT_RANGE: (u32, u32) = (1, 100);
pub const DROP_MONTHS_RANGE: (u32, u32) = (1, 12);

const LADDER: [RiskRating; 3] = [RiskRating::Risky, RiskRating::Medium, RiskRating::Good];

/// Produces the three ranked outcomes for a validated scenario config.
///
/// Implementations may use the config to shape narrative text. The order must
/// follow the risk ladder: act-now (Risky), partial (Medium), deferred or
/// combined (Good).
pub trait OutcomeSource {
    fn outcomes(&self, config: &ScenarioConfig) -> [Outcome; 3];
}

/// Pre-written narratives keyed only by scenario kind.
#[derive(Copy, Clone, Debug, Default)]
pub struct AuthoredOutcomes;

impl OutcomeSource for AuthoredOutcomes {
    fn outcomes(&self, config: &ScenarioConfig) -> [Outcome; 3] {
        authored_outcomes(config.kind())
    }
}

pub fn validate_config(kind: ScenarioKind, config: &ScenarioConfig) -> Result<(), CoreError> {
    if config.kind() != kind {
        return Err(CoreError::InvalidConfig(format!(
            "config for {:?} cannot drive a {:?} scenario",
            config.kind(),
            kind
        )));
    }

    match *config {
        ScenarioConfig::Purchase { amount, .. } => {
            if amount == 0 || amount > PURCHASE_AMOUNT_MAX {
                return Err(CoreError::InvalidConfig(format!(
                    "amount must be between 1 and {PURCHASE_AMOUNT_MAX}"
                )));
            }
        }
        ScenarioConfig::WeekOff { weeks } => check_range("weeks", weeks, WEEKS_OFF_RANGE)?,
        ScenarioConfig::IncomeDrop {
            drop_percent,
            months,
        } => {
            check_range("dropPercent", drop_percent, DROP_PERCENT_RANGE)?;
            check_range("months", months, DROP_MONTHS_RANGE)?;
        }
        ScenarioConfig::NewGig { hours, .. } => check_range("hours", hours, GIG_HOURS_RANGE)?,
    }
    Ok(())
}

fn check_range(name: &str, value: u32, (lo, hi): (u32, u32)) -> Result<(), CoreError> {
    if !(lo..=hi).contains(&value) {
        return Err(CoreError::InvalidConfig(format!(
            "{name} must be between {lo} and {hi}"
        )));
    }
    Ok(())
}

pub fn simulate(kind: ScenarioKind, config: &ScenarioConfig) -> Result<[Outcome; 3], CoreError> {
    simulate_with(&AuthoredOutcomes, kind, config)
}

pub fn simulate_with<S: OutcomeSource + ?Sized>(
    source: &S,
    kind: ScenarioKind,
    config: &ScenarioConfig,
) -> Result<[Outcome; 3], CoreError> {
    validate_config(kind, config)?;
    let outcomes = source.outcomes(config);
    let ratings = [
        outcomes[0].risk_rating,
        outcomes[1].risk_rating,
        outcomes[2].risk_rating,
    ];
    if ratings != LADDER {
        return Err(CoreError::BrokenLadder { kind });
    }
    Ok(outcomes)
}

/// Like [`simulate`], but re-bases every timeline buffer on the caller's actual buffer.
pub fn simulate_from_buffer(
    kind: ScenarioKind,
    config: &ScenarioConfig,
    starting_buffer: u64,
) -> Result<[Outcome; 3], CoreError> {
    let mut outcomes = simulate(kind, config)?;
    rebase_buffers(&mut outcomes, starting_buffer);
    Ok(outcomes)
}

fn rebase_buffers(outcomes: &mut [Outcome], starting_buffer: u64) {
    let delta = starting_buffer as i128 - REFERENCE_BUFFER as i128;
    for entry in outcomes.iter_mut().flat_map(|o| o.timeline.iter_mut()) {
        let shifted = (entry.buffer_after as i128 + delta).max(0);
        entry.buffer_after = u64::try_from(shifted).unwrap_or(u64::MAX);
    }
}

fn step(period: &str, event: &str, buffer_after: u64, risk_level: RiskLevel) -> TimelineEntry {
    TimelineEntry {
        period_label: period.to_string(),
        event_text: event.to_string(),
        buffer_after,
        risk_level,
    }
}

fn outcome(
    label: &str,
    summary: &str,
    risk_rating: RiskRating,
    timeline: [TimelineEntry; 3],
    suggestion: &str,
) -> Outcome {
    Outcome {
        label: label.to_string(),
        summary: summary.to_string(),
        risk_rating,
        timeline: timeline.into(),
        suggestion: suggestion.to_string(),
    }
}

pub fn authored_outcomes(kind: ScenarioKind) -> [Outcome; 3] {
    use RiskLevel::{High, Low, Medium};

    match kind {
        ScenarioKind::Purchase => [
            outcome(
                "Do it fully",
                "Purchase ₹30,000 immediately",
                RiskRating::Risky,
                [
                    step("Day 1", "Purchase made. Buffer drops to ₹15,000", 15_000, High),
                    step("Week 1", "Income ₹12,000. Buffer recovers to ₹27,000", 27_000, Medium),
                    step(
                        "Month 1",
                        "Buffer rebuilt to ₹40,000. Manageable but stretched.",
                        40_000,
                        Medium,
                    ),
                ],
                "Not ideal. Your buffer will be critically low immediately.",
            ),
            outcome(
                "Wait & partial",
                "Wait 2 weeks, purchase ₹20,000",
                RiskRating::Medium,
                [
                    step("Week 1-2", "Save extra ₹5,000. Buffer grows to ₹50,000", 50_000, Low),
                    step("Week 3", "Purchase ₹20,000. Buffer at ₹30,000", 30_000, Medium),
                    step("Month 1", "Steady recovery. Buffer at ₹42,000", 42_000, Low),
                ],
                "Good balance. You save extra and keep a comfortable buffer.",
            ),
            outcome(
                "Safe compromise",
                "Save ₹5,000/month for 6 months",
                RiskRating::Good,
                [
                    step("Month 1-3", "Save ₹5,000 each month. Buffer grows.", 60_000, Low),
                    step("Month 4-6", "Continue saving. Buffer reaches ₹75,000", 75_000, Low),
                    step(
                        "Month 7",
                        "Purchase ₹30,000 from buffer. Still have ₹45,000",
                        45_000,
                        Low,
                    ),
                ],
                "Excellent! No risk. Build your buffer first, then purchase worry-free.",
            ),
        ],
        ScenarioKind::WeekOff => [
            outcome(
                "Do it immediately",
                "Take a week off next week",
                RiskRating::Risky,
                [
                    step(
                        "Week 1 (Off)",
                        "No income. Buffer drops ₹8,500 (daily expenses)",
                        36_500,
                        Medium,
                    ),
                    step("Week 2", "Return to work. Income ₹12,000. Recovered.", 48_500, Low),
                    step("Week 3-4", "Buffer stabilizes. Recovered fully.", 50_000, Low),
                ],
                "Affordable, but it sets back your long-term buffer goals.",
            ),
            outcome(
                "Wait for high-earning week",
                "Take off after festival surge",
                RiskRating::Medium,
                [
                    step(
                        "Week 1-2",
                        "Work during festival. Income +40% = ₹16,800/week",
                        62_000,
                        Low,
                    ),
                    step(
                        "Week 3 (Off)",
                        "Rest after hard work. Buffer still strong at ₹53,500",
                        53_500,
                        Low,
                    ),
                    step("Week 4+", "Buffer remains healthy. Fresh & stable.", 55_000, Low),
                ],
                "Earn extra first, then take a guilt-free break. Depends on the surge arriving.",
            ),
            outcome(
                "Combine with income growth",
                "Add part-time gig, then take off",
                RiskRating::Good,
                [
                    step("Week 1-4", "Add weekend freelance. Extra ₹4,000/week", 66_000, Low),
                    step("Week 5 (Off)", "Take break with higher baseline income", 57_500, Low),
                    step("Week 6+", "Return energized with diversified income", 61_500, Low),
                ],
                "Best option. Build backup income while boosting buffer.",
            ),
        ],
        ScenarioKind::IncomeDrop => [
            outcome(
                "Ride it out",
                "Income falls to ₹8,000/month with no changes",
                RiskRating::Risky,
                [
                    step(
                        "Month 1",
                        "Income drops to ₹8,000. Expenses ₹25,000. Deficit ₹17,000",
                        28_000,
                        High,
                    ),
                    step("Month 2", "Buffer depleted to ₹11,000. Critical situation.", 11_000, High),
                    step("Month 3", "Recovery begins. Income back to normal.", 23_000, Medium),
                ],
                "Very risky without buffer. You would need immediate action.",
            ),
            outcome(
                "Adapt spending + diversify",
                "Reduce expenses by 20%, add secondary income",
                RiskRating::Medium,
                [
                    step(
                        "Month 1",
                        "Cut costs to ₹20,000. Start side gig earning ₹5,000.",
                        30_000,
                        Low,
                    ),
                    step(
                        "Month 2",
                        "Side gig stabilizes. Total income ₹13,000. Buffer stable.",
                        31_000,
                        Low,
                    ),
                    step(
                        "Month 3+",
                        "New income stream secure. Buffer growing again.",
                        37_000,
                        Low,
                    ),
                ],
                "Builds resilience through diversification, at the cost of a tighter budget.",
            ),
            outcome(
                "Full income recovery plan",
                "Use buffer strategically, then recover",
                RiskRating::Good,
                [
                    step(
                        "Week 1-2",
                        "Analyze what caused drop. Implement fixes immediately.",
                        40_000,
                        Medium,
                    ),
                    step(
                        "Week 3-4",
                        "Changes working. Income recovering. ₹10,000/month",
                        38_000,
                        Low,
                    ),
                    step("Month 2+", "Fully recovered. Income back to ₹12,000.", 45_000, Low),
                ],
                "Strategic approach. Identify root cause and fix it quickly.",
            ),
        ],
        ScenarioKind::NewGig => [
            outcome(
                "Replace primary with new gig",
                "Shift to full-time remote work at ₹15,000/month",
                RiskRating::Risky,
                [
                    step(
                        "Month 1",
                        "Transition period. Only ₹7,500 income from new gig.",
                        32_500,
                        High,
                    ),
                    step("Month 2", "New gig stabilizes but still ramping up.", 30_000, High),
                    step(
                        "Month 3+",
                        "Income reaches ₹15,000. Stable but not higher than before.",
                        35_000,
                        Medium,
                    ),
                ],
                "Risky transition. Keep primary income while growing new one.",
            ),
            outcome(
                "Add 20 hrs/week of freelance work",
                "Earn additional ₹4,000/month",
                RiskRating::Medium,
                [
                    step("Week 1-2", "Start freelance work. Getting established.", 45_000, Low),
                    step(
                        "Week 3-4",
                        "First income received. ₹4,000 added to buffer.",
                        49_000,
                        Low,
                    ),
                    step(
                        "Month 2+",
                        "Total income now ₹16,000/month. Buffer growth accelerates.",
                        57_000,
                        Low,
                    ),
                ],
                "Faster buffer growth, but watch for burnout from the extra hours.",
            ),
            outcome(
                "Parallel setup: maintain + add",
                "Keep primary job, build new income slowly",
                RiskRating::Good,
                [
                    step("Month 1", "Spend 10 hrs/week on new gig. Earn ₹2,000.", 47_000, Low),
                    step(
                        "Month 2-3",
                        "Increase to 20 hrs/week. New income now ₹4,000/month.",
                        53_000,
                        Low,
                    ),
                    step(
                        "Month 4+",
                        "Total income ₹16,000. Buffer growing. Diversified & secure.",
                        61_000,
                        Low,
                    ),
                ],
                "Best approach. Low risk, builds both buffer and backup income.",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GigType, PurchaseTiming};

    fn ratings(outcomes: &[Outcome; 3]) -> Vec<RiskRating> {
        outcomes.iter().map(|o| o.risk_rating).collect()
    }

    #[test]
    fn purchase_returns_risk_ladder() {
        let config = ScenarioConfig::Purchase {
            amount: 30_000,
            timing: PurchaseTiming::Immediate,
        };
        let outcomes = simulate(ScenarioKind::Purchase, &config).expect("valid config");
        assert_eq!(
            ratings(&outcomes),
            vec![RiskRating::Risky, RiskRating::Medium, RiskRating::Good]
        );
        assert_eq!(outcomes[0].label, "Do it fully");
    }

    #[test]
    fn every_scenario_follows_the_ladder_with_defaults() {
        for kind in ScenarioKind::ALL {
            let outcomes =
                simulate(kind, &ScenarioConfig::default_for(kind)).expect("defaults are valid");
            assert_eq!(ratings(&outcomes), LADDER.to_vec(), "{kind:?}");
            for o in &outcomes {
                assert_eq!(o.timeline.len(), 3);
            }
        }
    }

    #[test]
    fn five_weeks_off_is_invalid() {
        let err = simulate(ScenarioKind::WeekOff, &ScenarioConfig::WeekOff { weeks: 5 })
            .expect_err("weeks out of range");
        assert!(matches!(err, CoreError::InvalidConfig(msg) if msg.contains("weeks")));
    }

    #[test]
    fn gig_hours_bounds_are_inclusive() {
        for hours in [5, 40] {
            let config = ScenarioConfig::NewGig {
                gig_type: GigType::Tutoring,
                hours,
            };
            assert!(simulate(ScenarioKind::NewGig, &config).is_ok());
        }
        for hours in [4, 41] {
            let config = ScenarioConfig::NewGig {
                gig_type: GigType::Tutoring,
                hours,
            };
            assert!(simulate(ScenarioKind::NewGig, &config).is_err());
        }
    }

    #[test]
    fn zero_purchase_amount_is_invalid() {
        let config = ScenarioConfig::Purchase {
            amount: 0,
            timing: PurchaseTiming::OneMonth,
        };
        assert!(matches!(
            simulate(ScenarioKind::Purchase, &config),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn income_drop_months_are_bounded() {
        let config = ScenarioConfig::IncomeDrop {
            drop_percent: 20,
            months: 13,
        };
        assert!(matches!(
            simulate(ScenarioKind::IncomeDrop, &config),
            Err(CoreError::InvalidConfig(msg)) if msg.contains("months")
        ));
    }

    #[test]
    fn mismatched_config_is_invalid() {
        let err = simulate(ScenarioKind::Purchase, &ScenarioConfig::WeekOff { weeks: 2 })
            .expect_err("kind mismatch");
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn simulate_is_idempotent() {
        let config = ScenarioConfig::default_for(ScenarioKind::IncomeDrop);
        let a = simulate(ScenarioKind::IncomeDrop, &config).expect("valid config");
        let b = simulate(ScenarioKind::IncomeDrop, &config).expect("valid config");
        assert_eq!(a, b);
    }

    #[test]
    fn rebasing_shifts_buffers_and_saturates_at_zero() {
        let config = ScenarioConfig::default_for(ScenarioKind::Purchase);
        let richer = simulate_from_buffer(ScenarioKind::Purchase, &config, 55_000)
            .expect("valid config");
        assert_eq!(richer[0].timeline[0].buffer_after, 25_000);

        let broke =
            simulate_from_buffer(ScenarioKind::Purchase, &config, 0).expect("valid config");
        assert_eq!(broke[0].timeline[0].buffer_after, 0);
        assert_eq!(broke[2].timeline[1].buffer_after, 30_000);
        assert_eq!(broke[0].timeline[0].event_text, richer[0].timeline[0].event_text);
    }

    struct Reversed;

    impl OutcomeSource for Reversed {
        fn outcomes(&self, config: &ScenarioConfig) -> [Outcome; 3] {
            let mut outcomes = authored_outcomes(config.kind());
            outcomes.reverse();
            outcomes
        }
    }

    #[test]
    fn custom_source_must_keep_the_ladder() {
        let config = ScenarioConfig::default_for(ScenarioKind::NewGig);
        let err = simulate_with(&Reversed, ScenarioKind::NewGig, &config)
            .expect_err("reversed ladder");
        assert_eq!(
            err,
            CoreError::BrokenLadder {
                kind: ScenarioKind::NewGig
            }
        );
    }

    struct Templated;

    impl OutcomeSource for Templated {
        fn outcomes(&self, config: &ScenarioConfig) -> [Outcome; 3] {
            let mut outcomes = authored_outcomes(config.kind());
            if let ScenarioConfig::Purchase { amount, .. } = config {
                outcomes[0].summary = format!("Purchase ₹{amount} immediately");
            }
            outcomes
        }
    }

    #[test]
    fn custom_source_can_template_from_config() {
        let config = ScenarioConfig::Purchase {
            amount: 12_345,
            timing: PurchaseTiming::Immediate,
        };
        let outcomes =
            simulate_with(&Templated, ScenarioKind::Purchase, &config).expect("valid config");
        assert_eq!(outcomes[0].summary, "Purchase ₹12345 immediately");
    }
}
