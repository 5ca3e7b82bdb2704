use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uk_finance_core::bands::schedules::{BuyerStatus, PropertyRegion, StudentLoanPlan, TaxRegion};
use uk_finance_core::child_benefit::hicbc::{calculate_child_benefit, ChildBenefitInput};
use uk_finance_core::property_tax::stamp_duty::{calculate_property_tax, PropertyTaxInput};
use uk_finance_core::take_home::salary::{calculate_take_home, TakeHomeInput};

// ===========================================================================
// Property tax
// ===========================================================================

#[test]
fn test_sdlt_per_band_amounts() {
    let out = calculate_property_tax(&PropertyTaxInput {
        price: dec!(1_000_000),
        region: PropertyRegion::England,
        buyer_status: BuyerStatus::Standard,
    })
    .unwrap()
    .result;
    assert_eq!(
        out.breakdown.per_band_amounts(),
        vec![
            dec!(125_000),
            dec!(125_000),
            dec!(675_000),
            dec!(75_000),
            dec!(0)
        ]
    );
    // 2,500 + 33,750 + 7,500
    assert_eq!(out.total_tax, dec!(43_750));
}

#[test]
fn test_lbtt_first_time_buyer() {
    let out = calculate_property_tax(&PropertyTaxInput {
        price: dec!(200_000),
        region: PropertyRegion::Scotland,
        buyer_status: BuyerStatus::FirstTimeBuyer,
    })
    .unwrap()
    .result;
    assert_eq!(out.tax_name, "LBTT");
    assert_eq!(out.total_tax, dec!(500));
    assert_eq!(out.first_time_buyer_saving, dec!(600));
}

// ===========================================================================
// Child benefit
// ===========================================================================

#[test]
fn test_child_benefit_from_json() {
    let input: ChildBenefitInput =
        serde_json::from_str(r#"{"adjusted_net_income":"65000","number_of_children":3}"#).unwrap();
    let out = calculate_child_benefit(&input).unwrap().result;
    // 26.05 + 2 * 17.25 = 60.55 per week
    assert_eq!(out.weekly_benefit, dec!(60.55));
    assert_eq!(out.annual_benefit, dec!(3_148.60));
    assert_eq!(out.charge_percentage, dec!(25));
    assert_eq!(out.high_income_charge, dec!(787));
}

// ===========================================================================
// Take home
// ===========================================================================

#[test]
fn test_scottish_take_home_with_plan_2() {
    let out = calculate_take_home(&TakeHomeInput {
        gross_salary: dec!(40_000),
        region: TaxRegion::Scotland,
        pension: None,
        student_loans: vec![StudentLoanPlan::Plan2],
    })
    .unwrap()
    .result;
    // 2,827 at 19% + 12,094 at 20% + 12,509 at 21%
    assert_eq!(out.income_tax, dec!(5_582.82));
    assert_eq!(out.national_insurance, dec!(2_194.40));
    assert_eq!(out.student_loan_repayments[0].repayment, dec!(1_037));
    assert_eq!(
        out.take_home_annual,
        dec!(40_000) - dec!(5_582.82) - dec!(2_194.40) - dec!(1_037)
    );
}

#[test]
fn test_zero_salary() {
    let out = calculate_take_home(&TakeHomeInput {
        gross_salary: Decimal::ZERO,
        region: TaxRegion::RestOfUk,
        pension: None,
        student_loans: vec![],
    })
    .unwrap()
    .result;
    assert_eq!(out.take_home_annual, Decimal::ZERO);
    assert_eq!(out.income_tax, Decimal::ZERO);
}
