use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uk_finance_core::mortgage::schedule::INTERNAL_DP;
use uk_finance_core::mortgage::{simulate_amortization, LoanSchedule, LoanTerms};
use uk_finance_core::UkFinanceError;

fn terms(principal: Decimal, rate: Decimal, years: u32, overpayment: Decimal) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate: rate,
        term_years: years,
        monthly_overpayment: overpayment,
        interest_only: false,
    }
}

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_reference_scenario_with_and_without_overpayment() {
    let base = simulate_amortization(&terms(dec!(225_000), dec!(4.5), 25, dec!(0))).unwrap();
    assert!((base.result.summary.monthly_payment - dec!(1251.04)).abs() < dec!(1));
    assert_eq!(base.result.yearly_snapshots.len(), 25);

    let over = simulate_amortization(&terms(dec!(225_000), dec!(4.5), 25, dec!(100))).unwrap();
    let s = &over.result.summary;
    assert!(s.months_reduced > 0);
    assert!(s.interest_saved > Decimal::ZERO);
    assert_eq!(s.interest_without_overpayment, base.result.summary.total_interest);
    assert_eq!(s.monthly_payment, base.result.summary.monthly_payment);
}

#[test]
fn test_identical_inputs_reproduce_identical_output() {
    let t = terms(dec!(180_000), dec!(5.25), 30, dec!(75));
    let a = serde_json::to_value(simulate_amortization(&t).unwrap().result).unwrap();
    let b = serde_json::to_value(simulate_amortization(&t).unwrap().result).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_zero_rate_payment_is_principal_over_months() {
    let out = simulate_amortization(&terms(dec!(120_000), dec!(0), 10, dec!(0))).unwrap();
    assert_eq!(out.result.summary.monthly_payment, dec!(1_000));
    assert_eq!(out.result.summary.total_interest, Decimal::ZERO);
}

#[test]
fn test_error_taxonomy() {
    let err = simulate_amortization(&terms(dec!(-5), dec!(4), 25, dec!(0))).unwrap_err();
    assert!(matches!(err, UkFinanceError::InvalidLoan { .. }));
    let err = simulate_amortization(&terms(dec!(100_000), dec!(4), 0, dec!(0))).unwrap_err();
    assert!(matches!(err, UkFinanceError::InvalidLoan { .. }));
    let err = simulate_amortization(&terms(dec!(100_000), dec!(-1), 25, dec!(0))).unwrap_err();
    assert!(matches!(err, UkFinanceError::InvalidRate { .. }));
}

#[test]
fn test_rate_too_high_to_compound_is_an_error() {
    let err = simulate_amortization(&terms(dec!(200_000), dec!(1000), 40, dec!(0))).unwrap_err();
    match err {
        UkFinanceError::InvalidRate { field, .. } => assert_eq!(field, "annual_rate"),
        other => panic!("expected InvalidRate, got {other}"),
    }
}

#[test]
fn test_term_beyond_a_century_rejected() {
    let err = simulate_amortization(&terms(dec!(200_000), dec!(4), 101, dec!(0))).unwrap_err();
    assert!(matches!(err, UkFinanceError::InvalidLoan { .. }));
    let err = simulate_amortization(&terms(dec!(200_000), dec!(4), u32::MAX, dec!(0))).unwrap_err();
    assert!(matches!(err, UkFinanceError::InvalidLoan { .. }));
}

#[test]
fn test_terms_deserialize_with_defaults() {
    let t: LoanTerms =
        serde_json::from_str(r#"{"principal":"200000","annual_rate":"3.9","term_years":30}"#)
            .unwrap();
    assert_eq!(t.monthly_overpayment, Decimal::ZERO);
    assert!(!t.interest_only);
}

// ===========================================================================
// Properties
// ===========================================================================

fn loan_strategy() -> impl Strategy<Value = LoanTerms> {
    (1_000u32..1_000_000, 0u32..1_500, 1u32..=40, 0u32..2_000, any::<bool>()).prop_map(
        |(principal, rate_bp, years, overpayment, interest_only)| LoanTerms {
            principal: Decimal::from(principal),
            annual_rate: Decimal::new(rate_bp as i64, 2),
            term_years: years,
            monthly_overpayment: Decimal::from(overpayment),
            interest_only,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_principal_is_conserved_every_month(t in loan_strategy()) {
        let schedule = LoanSchedule::new(&t).unwrap();
        let mut previous = t.principal;
        for month in schedule.months() {
            prop_assert_eq!(month.cumulative_principal + month.closing_balance, t.principal);
            prop_assert!(month.closing_balance >= Decimal::ZERO);
            prop_assert!(month.closing_balance <= previous);
            previous = month.closing_balance;
        }
    }

    #[test]
    fn prop_fixed_length_yearly_table(t in loan_strategy()) {
        let out = simulate_amortization(&t).unwrap().result;
        prop_assert_eq!(out.yearly_snapshots.len() as u32, t.term_years);
        for (i, snap) in out.yearly_snapshots.iter().enumerate() {
            prop_assert_eq!(snap.year, i as u32 + 1);
            prop_assert!(snap.remaining_balance >= Decimal::ZERO);
        }
    }

    #[test]
    fn prop_more_overpayment_never_lengthens_or_costs_more(
        t in loan_strategy(),
        extra in 0u32..2_000,
    ) {
        let more = LoanTerms {
            monthly_overpayment: t.monthly_overpayment + Decimal::from(extra),
            ..t.clone()
        };
        let a = simulate_amortization(&t).unwrap().result.summary;
        let b = simulate_amortization(&more).unwrap().result.summary;
        prop_assert!(b.actual_months <= a.actual_months);
        prop_assert!(b.months_reduced >= a.months_reduced);
        prop_assert!(b.total_interest <= a.total_interest);
    }

    #[test]
    fn prop_zero_rate_has_no_interest(principal in 1_000u32..1_000_000, years in 1u32..=40) {
        let t = terms(Decimal::from(principal), Decimal::ZERO, years, Decimal::ZERO);
        let out = simulate_amortization(&t).unwrap().result.summary;
        let expected = (Decimal::from(principal) / Decimal::from(years * 12)).round_dp(INTERNAL_DP);
        prop_assert_eq!(out.monthly_payment, expected);
        prop_assert_eq!(out.total_interest, Decimal::ZERO);
        prop_assert_eq!(out.total_paid, Decimal::from(principal));
    }

    #[test]
    fn prop_any_rate_either_simulates_or_errors(
        principal in 1_000u32..2_000_000,
        rate_bp in 0u32..200_000,
        years in 1u32..=40,
    ) {
        let t = terms(Decimal::from(principal), Decimal::new(rate_bp as i64, 2), years, Decimal::ZERO);
        match simulate_amortization(&t) {
            Ok(out) => prop_assert_eq!(out.result.yearly_snapshots.len() as u32, years),
            Err(err) => prop_assert!(matches!(err, UkFinanceError::InvalidRate { .. }), "unexpected error: {:?}", err),
        }
    }
}
