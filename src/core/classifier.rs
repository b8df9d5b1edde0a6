use super::error::CoreError;
use super::types::{BufferStatus, Classification, Profile, Tier};

/// Midpoint of the 15,000-30,000 onboarding bracket, used when no income range is reported.
pub const DEFAULT_AVERAGE_INCOME: f64 = 22_500.0;

/// Income/essentials ratio below which a profile is in survival mode.
pub const SURVIVAL_RATIO_CEILING: f64 = 1.05;
/// Income/essentials ratio below which a profile is in comfort mode.
pub const COMFORT_RATIO_CEILING: f64 = 1.30;

pub const DEFAULT_FOOD_ESTIMATE: u64 = 8_000;
pub const DEFAULT_TRANSPORT_ESTIMATE: u64 = 3_000;
pub const DEFAULT_OTHER_ESTIMATE: u64 = 4_000;

pub const BUFFER_GOAL_DAYS: u64 = 60;
const DAYS_PER_MONTH: f64 = 30.0;

/// Monthly spend the profile does not report but every household carries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExpensePolicy {
    pub food: u64,
    pub transport: u64,
    pub other: u64,
}

impl Default for ExpensePolicy {
    fn default() -> Self {
        Self {
            food: DEFAULT_FOOD_ESTIMATE,
            transport: DEFAULT_TRANSPORT_ESTIMATE,
            other: DEFAULT_OTHER_ESTIMATE,
        }
    }
}

impl ExpensePolicy {
    fn total(self) -> Option<u64> {
        self.food
            .checked_add(self.transport)?
            .checked_add(self.other)
    }
}

pub fn validate_profile(profile: &Profile) -> Result<(), CoreError> {
    if let Some(range) = profile.monthly_income_range {
        if range.min > range.max {
            return Err(CoreError::InvalidProfile(
                "monthlyIncomeRange.min must be <= monthlyIncomeRange.max".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn average_income(profile: &Profile) -> f64 {
    profile
        .monthly_income_range
        .map(|range| range.average())
        .unwrap_or(DEFAULT_AVERAGE_INCOME)
}

pub fn essential_expenses(profile: &Profile, policy: ExpensePolicy) -> Result<u64, CoreError> {
    let overflow = || CoreError::InvalidProfile("monthly expenses overflow".to_string());
    let estimates = policy.total().ok_or_else(overflow)?;
    profile
        .rent
        .checked_add(profile.emi)
        .and_then(|v| v.checked_add(profile.loans))
        .and_then(|v| v.checked_add(estimates))
        .ok_or_else(overflow)
}

pub fn tier_for_ratio(ratio: f64) -> Tier {
    if ratio < SURVIVAL_RATIO_CEILING {
        Tier::Survival
    } else if ratio < COMFORT_RATIO_CEILING {
        Tier::Comfort
    } else {
        Tier::Growth
    }
}

pub fn classify(profile: &Profile) -> Result<Classification, CoreError> {
    classify_with_policy(profile, ExpensePolicy::default())
}

pub fn classify_with_policy(
    profile: &Profile,
    policy: ExpensePolicy,
) -> Result<Classification, CoreError> {
    validate_profile(profile)?;
    let avg_income = average_income(profile);
    let essentials = essential_expenses(profile, policy)?;
    if essentials == 0 {
        return Err(CoreError::DivisionByZero);
    }

    let ratio = avg_income / essentials as f64;
    let tier = tier_for_ratio(ratio);
    // Gap is measured against an absolute income target, not re-derived from the ratio.
    let gap_to_next_tier = tier
        .next()
        .map(|_| (tier.target_income() as f64 - avg_income).max(0.0));

    Ok(Classification {
        tier,
        ratio,
        gap_to_next_tier,
        avg_income,
        essentials,
    })
}

pub fn buffer_status(profile: &Profile, classification: &Classification) -> BufferStatus {
    let current = profile.emergency_buffer_amount.unwrap_or(0);
    let essentials = classification.essentials;
    let target = essentials.saturating_mul(BUFFER_GOAL_DAYS) / DAYS_PER_MONTH as u64;
    let daily_spend = essentials as f64 / DAYS_PER_MONTH;
    let days_covered = if daily_spend > 0.0 {
        current as f64 / daily_spend
    } else {
        0.0
    };
    let progress = if target > 0 {
        current as f64 / target as f64
    } else {
        0.0
    };

    BufferStatus {
        current,
        target,
        days_covered,
        shortfall: target.saturating_sub(current),
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IncomeRange;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_profile() -> Profile {
        Profile {
            primary_income: "rideshare".to_string(),
            monthly_income_range: Some(IncomeRange {
                min: 15_000,
                max: 30_000,
            }),
            rent: 12_000,
            emi: 8_000,
            loans: 3_000,
            emergency_buffer_amount: Some(45_000),
        }
    }

    fn flat_income_profile(income: u64, rent: u64) -> Profile {
        Profile {
            monthly_income_range: Some(IncomeRange {
                min: income,
                max: income,
            }),
            rent,
            emi: 0,
            loans: 0,
            ..sample_profile()
        }
    }

    #[test]
    fn classify_reference_profile_is_survival_tier() {
        let result = classify(&sample_profile()).expect("valid profile");
        assert_approx(result.avg_income, 22_500.0);
        assert_eq!(result.essentials, 38_000);
        assert!((result.ratio - 0.592).abs() < 1e-3);
        assert_eq!(result.tier, Tier::Survival);
        assert_eq!(result.gap_to_next_tier, Some(22_500.0));
    }

    #[test]
    fn ratio_at_survival_ceiling_is_comfort() {
        // 21,000 / (5,000 + 15,000 estimates) == 1.05
        let result = classify(&flat_income_profile(21_000, 5_000)).expect("valid profile");
        assert_eq!(result.ratio, 1.05);
        assert_eq!(result.tier, Tier::Comfort);
    }

    #[test]
    fn ratio_at_comfort_ceiling_is_growth() {
        let result = classify(&flat_income_profile(26_000, 5_000)).expect("valid profile");
        assert_eq!(result.ratio, 1.30);
        assert_eq!(result.tier, Tier::Growth);
        assert_eq!(result.gap_to_next_tier, None);
    }

    #[test]
    fn comfort_gap_targets_comfort_exit_income() {
        let result = classify(&flat_income_profile(24_000, 5_000)).expect("valid profile");
        assert_eq!(result.tier, Tier::Comfort);
        assert_eq!(result.gap_to_next_tier, Some(31_000.0));
    }

    #[test]
    fn gap_never_goes_negative() {
        // Huge expenses keep the tier at survival even with income above every target.
        let result = classify(&flat_income_profile(100_000, 200_000)).expect("valid profile");
        assert_eq!(result.tier, Tier::Survival);
        assert_eq!(result.gap_to_next_tier, Some(0.0));
    }

    #[test]
    fn missing_income_range_uses_default_average() {
        let mut profile = sample_profile();
        profile.monthly_income_range = None;
        let result = classify(&profile).expect("valid profile");
        assert_approx(result.avg_income, DEFAULT_AVERAGE_INCOME);
    }

    #[test]
    fn extreme_income_range_does_not_overflow() {
        let profile = flat_income_profile(u64::MAX, 5_000);
        let result = classify(&profile).expect("valid profile");
        assert_approx(result.avg_income, u64::MAX as f64);
        assert_eq!(result.tier, Tier::Growth);
        assert_eq!(result.gap_to_next_tier, None);
    }

    #[test]
    fn inverted_income_range_is_rejected() {
        let mut profile = sample_profile();
        profile.monthly_income_range = Some(IncomeRange {
            min: 30_000,
            max: 15_000,
        });
        let err = classify(&profile).expect_err("must reject inverted range");
        assert!(matches!(err, CoreError::InvalidProfile(msg) if msg.contains("min")));
    }

    #[test]
    fn zero_essentials_is_division_by_zero() {
        let profile = flat_income_profile(20_000, 0);
        let policy = ExpensePolicy {
            food: 0,
            transport: 0,
            other: 0,
        };
        let err = classify_with_policy(&profile, policy).expect_err("must guard zero essentials");
        assert_eq!(err, CoreError::DivisionByZero);
    }

    #[test]
    fn overflowing_expenses_are_rejected() {
        let mut profile = sample_profile();
        profile.rent = u64::MAX;
        let err = classify(&profile).expect_err("must reject overflow");
        assert!(matches!(err, CoreError::InvalidProfile(_)));
    }

    #[test]
    fn buffer_status_measures_against_sixty_days_of_essentials() {
        let profile = sample_profile();
        let classification = classify(&profile).expect("valid profile");
        let buffer = buffer_status(&profile, &classification);
        assert_eq!(buffer.target, 76_000);
        assert_eq!(buffer.shortfall, 31_000);
        assert!((buffer.days_covered - 45_000.0 / (38_000.0 / 30.0)).abs() < 1e-9);
        assert!((buffer.progress - 45_000.0 / 76_000.0).abs() < 1e-9);
    }

    #[test]
    fn buffer_status_without_buffer_reports_full_shortfall() {
        let mut profile = sample_profile();
        profile.emergency_buffer_amount = None;
        let classification = classify(&profile).expect("valid profile");
        let buffer = buffer_status(&profile, &classification);
        assert_eq!(buffer.current, 0);
        assert_eq!(buffer.shortfall, buffer.target);
        assert_approx(buffer.days_covered, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_classify_ratio_and_gap_invariants(
            min in 0u64..200_000,
            spread in 0u64..100_000,
            rent in 0u64..80_000,
            emi in 0u64..40_000,
            loans in 0u64..40_000
        ) {
            let profile = Profile {
                primary_income: "delivery".to_string(),
                monthly_income_range: Some(IncomeRange { min, max: min + spread }),
                rent,
                emi,
                loans,
                emergency_buffer_amount: None,
            };

            let first = classify(&profile).expect("valid profile");
            let second = classify(&profile).expect("valid profile");
            prop_assert_eq!(&first, &second);

            let essentials = essential_expenses(&profile, ExpensePolicy::default()).expect("no overflow");
            prop_assert_eq!(first.ratio, first.avg_income / essentials as f64);
            prop_assert!(first.tier.level() <= 2);

            match first.gap_to_next_tier {
                None => prop_assert_eq!(first.tier, Tier::Growth),
                Some(gap) => {
                    prop_assert!(first.tier != Tier::Growth);
                    prop_assert!(gap >= 0.0);
                }
            }
        }
    }
}
