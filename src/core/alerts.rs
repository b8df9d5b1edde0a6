use super::types::{Alert, AlertKind, Tier};

pub fn survival_alert() -> Alert {
    Alert {
        kind: AlertKind::Risk,
        title: "Tier 0: Income Below Survival Level".to_string(),
        description: "Your income only covers essential expenses. Optimize your schedule to \
                      increase earnings and reach Tier 1."
            .to_string(),
        action: "Optimize Income".to_string(),
    }
}

/// Dashboard alerts: the tier alert (survival only) followed by the caller's signals, in order.
pub fn generate_alerts(tier: Tier, signals: &[Alert]) -> Vec<Alert> {
    let mut alerts = Vec::with_capacity(signals.len() + 1);
    if tier == Tier::Survival {
        alerts.push(survival_alert());
    }
    alerts.extend_from_slice(signals);
    alerts
}

/// Placeholder platform signals shown until live feeds exist.
pub fn demo_signals() -> Vec<Alert> {
    vec![
        Alert {
            kind: AlertKind::Risk,
            title: "Acceptance Rate Dropped".to_string(),
            description: "Your acceptance rate fell to 82%. This could affect your income. \
                          Focus on longer trips to boost it."
                .to_string(),
            action: "View Tips".to_string(),
        },
        Alert {
            kind: AlertKind::Opportunity,
            title: "Weekend Surge Coming".to_string(),
            description: "Festival weekend shows 35% higher earnings. Plan to work extra \
                          shifts for maximum income."
                .to_string(),
            action: "View Mentorship".to_string(),
        },
        Alert {
            kind: AlertKind::Info,
            title: "New Course Available".to_string(),
            description: "EMI Planning 101 is now available in your learning path.".to_string(),
            action: "Start Course".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survival_tier_prepends_critical_alert() {
        let signals = demo_signals();
        let alerts = generate_alerts(Tier::Survival, &signals);
        assert_eq!(alerts.len(), signals.len() + 1);
        assert_eq!(alerts[0], survival_alert());
        assert_eq!(&alerts[1..], signals.as_slice());
    }

    #[test]
    fn other_tiers_pass_signals_through() {
        let signals = demo_signals();
        for tier in [Tier::Comfort, Tier::Growth] {
            assert_eq!(generate_alerts(tier, &signals), signals);
        }
    }

    #[test]
    fn no_signals_yields_only_tier_alert() {
        assert_eq!(generate_alerts(Tier::Survival, &[]), vec![survival_alert()]);
        assert!(generate_alerts(Tier::Growth, &[]).is_empty());
    }
}
