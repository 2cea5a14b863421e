use super::BurstSettings;

/// Outcome of settling one period's usage against the credit balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Usage reported for the period that just ended.
    pub used: u64,
    /// Credit before this settlement.
    pub credit_before: u64,
    /// Credit after this settlement.
    pub credit: u64,
    /// Credit granted to the upcoming period, `min(credit, burst_cap)`.
    pub burst: u64,
    /// Effective quota for the upcoming period.
    pub quota: u64,
}

impl Settlement {
    /// Credit charged by this settlement. Zero when the period earned credit.
    pub fn charged(&self) -> u64 {
        self.credit_before.saturating_sub(self.credit)
    }

    /// Credit banked by this settlement. Zero when the period drew on credit.
    pub fn earned(&self) -> u64 {
        self.credit.saturating_sub(self.credit_before)
    }
}

/// Saturating credit accumulator for a single quota stream.
///
/// The balance always stays within `[0, credit_ceiling]`. How much of it may be spent in one
/// period is clamped separately to `burst_cap`.
#[derive(Clone, Debug)]
pub struct CreditLedger {
    base_quota: u64,
    burst_cap: u64,
    ceiling: u64,
    credit: u64,
}

impl CreditLedger {
    pub fn new(settings: &BurstSettings) -> Self {
        Self {
            base_quota: settings.base_quota(),
            burst_cap: settings.burst_cap(),
            ceiling: settings.credit_ceiling(),
            credit: 0,
        }
    }

    pub fn credit(&self) -> u64 {
        self.credit
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Credit the current balance would grant to the next period.
    pub fn burst(&self) -> u64 {
        self.credit.min(self.burst_cap)
    }

    /// Quota the current balance would grant to the next period.
    pub fn quota(&self) -> u64 {
        self.base_quota.saturating_add(self.burst())
    }

    /// Applies the usage of the period that just ended and returns the quota for the next one.
    pub fn settle(&mut self, used: u64) -> Settlement {
        let credit_before = self.credit;

        self.credit = if used > self.base_quota {
            // Anything past burst_cap was enforcement slack, not spent credit.
            let overrun = (used - self.base_quota).min(self.burst_cap);
            credit_before.saturating_sub(overrun)
        } else {
            credit_before
                .saturating_add(self.base_quota - used)
                .min(self.ceiling)
        };

        Settlement {
            used,
            credit_before,
            credit: self.credit,
            burst: self.burst(),
            quota: self.quota(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::Rng;

    use super::*;

    fn ledger(base_quota: u64, burst_cap: u64) -> CreditLedger {
        CreditLedger::new(
            &BurstSettings::builder()
                .period(Duration::from_millis(10))
                .base_quota(base_quota)
                .burst_cap(burst_cap)
                .build(),
        )
    }

    #[test]
    fn starts_empty_with_base_quota() {
        let ledger = ledger(5, 3);
        assert_eq!(ledger.credit(), 0);
        assert_eq!(ledger.quota(), 5);
    }

    #[test]
    fn scenario_earn_hold_spend() {
        let mut ledger = ledger(1, 2);

        let s = ledger.settle(0);
        assert_eq!((s.credit, s.quota), (1, 2));

        // exactly at quota, nothing earned or spent
        let s = ledger.settle(1);
        assert_eq!((s.credit, s.quota), (1, 2));
        assert_eq!(s.earned(), 0);
        assert_eq!(s.charged(), 0);

        let s = ledger.settle(2);
        assert_eq!((s.credit, s.quota), (0, 1));
    }

    #[test]
    fn burst_is_capped_but_credit_keeps_growing() {
        let mut ledger = ledger(1, 2);
        for _ in 0..3 {
            ledger.settle(0);
        }

        assert_eq!(ledger.credit(), 3);
        assert_eq!(ledger.burst(), 2);
        assert_eq!(ledger.quota(), 3);
    }

    #[test]
    fn overrun_past_cap_is_only_charged_the_cap() {
        let mut ledger = ledger(1, 2);
        for _ in 0..5 {
            ledger.settle(0);
        }

        let s = ledger.settle(10);
        assert_eq!(s.charged(), 2);
        assert_eq!(s.credit, 3);
    }

    #[test]
    fn overrun_never_goes_below_zero() {
        let mut ledger = ledger(4, 10);
        ledger.settle(3);

        let s = ledger.settle(12);
        assert_eq!(s.credit, 0);
        assert_eq!(s.quota, 4);
    }

    #[test]
    fn idle_periods_saturate_at_ceiling() {
        let mut ledger = ledger(u64::MAX / 2, 1);
        let ceiling = ledger.ceiling();

        let mut previous = ledger.credit();
        for _ in 0..4 {
            let s = ledger.settle(0);
            if previous < ceiling {
                assert!(s.credit > previous);
            }
            assert!(s.credit <= ceiling);
            previous = s.credit;
        }

        assert_eq!(ledger.credit(), ceiling);
        assert_eq!(ledger.settle(0).credit, ceiling);
    }

    #[test]
    fn idle_periods_earn_base_quota_each() {
        let mut ledger = ledger(3, 1);
        for tick in 1..=10u64 {
            assert_eq!(ledger.settle(0).credit, tick * 3);
        }
    }

    #[test]
    fn max_base_quota_has_no_room_for_credit() {
        let mut ledger = ledger(u64::MAX, 5);

        let s = ledger.settle(0);
        assert_eq!(s.credit, 0);
        assert_eq!(s.quota, u64::MAX);
    }

    #[test]
    fn quota_saturates_with_huge_burst_cap() {
        let mut small = ledger(10, u64::MAX);
        for _ in 0..3 {
            small.settle(0);
        }
        assert_eq!(small.quota(), 40);

        let mut large = ledger(u64::MAX - 1, u64::MAX);
        large.settle(0);
        assert_eq!(large.credit(), 1);
        assert_eq!(large.quota(), u64::MAX);
    }

    #[test]
    fn random_usage_respects_invariants() {
        let mut rng = rand::rng();
        let (base_quota, burst_cap) = (8, 5);
        let mut ledger = ledger(base_quota, burst_cap);

        for _ in 0..10_000 {
            let used = rng.random_range(0..=3 * base_quota);
            let s = ledger.settle(used);

            assert!(s.credit <= ledger.ceiling());
            assert_eq!(s.quota, base_quota + s.credit.min(burst_cap));
            assert!(s.charged() <= burst_cap);
            if used == base_quota {
                assert_eq!(s.credit, s.credit_before);
            } else if used < base_quota {
                assert_eq!(s.earned(), base_quota - used);
            }
        }
    }
}
