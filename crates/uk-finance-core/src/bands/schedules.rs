//! Statutory 2025/26 schedules for the threshold calculators.
//!
//! Each function maps an amount plus its selectors onto a `BandedSchedule`;
//! the schedule itself is the only thing the calculators then consume.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::schedule::{Band, BandedSchedule};
use crate::types::Money;
use crate::UkFinanceResult;

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Income tax jurisdiction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxRegion {
    #[default]
    RestOfUk,
    Scotland,
}

/// Land transaction tax jurisdiction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyRegion {
    #[default]
    England,
    NorthernIreland,
    Scotland,
    Wales,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuyerStatus {
    #[default]
    Standard,
    FirstTimeBuyer,
    AdditionalProperty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentLoanPlan {
    Plan1,
    Plan2,
    Plan4,
    Plan5,
    Postgraduate,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const PERSONAL_ALLOWANCE: Money = dec!(12_570);
/// Income above which the personal allowance is withdrawn at £1 per £2.
pub const ALLOWANCE_TAPER_THRESHOLD: Money = dec!(100_000);
pub const ADDITIONAL_RATE_THRESHOLD: Money = dec!(125_140);
const BASIC_RATE_BAND_WIDTH: Money = dec!(37_700);

pub const NI_PRIMARY_THRESHOLD: Money = dec!(12_570);
pub const NI_UPPER_EARNINGS_LIMIT: Money = dec!(50_270);

pub const HICBC_THRESHOLD: Money = dec!(60_000);
pub const HICBC_FULL_CHARGE_INCOME: Money = dec!(80_000);

/// Additional dwellings below this price never attract the surcharge.
pub const SURCHARGE_MIN_PRICE: Money = dec!(40_000);
/// SDLT first-time buyer relief is lost entirely above this price.
pub const SDLT_FTB_PRICE_CAP: Money = dec!(500_000);

const SDLT_SURCHARGE: Decimal = dec!(0.05);
const LBTT_ADS: Decimal = dec!(0.08);

// ---------------------------------------------------------------------------
// Income tax and NI
// ---------------------------------------------------------------------------

/// Personal allowance after the £1-per-£2 taper above £100,000.
pub fn personal_allowance(adjusted_net_income: Money) -> Money {
    if adjusted_net_income <= ALLOWANCE_TAPER_THRESHOLD {
        return PERSONAL_ALLOWANCE;
    }
    let reduction = ((adjusted_net_income - ALLOWANCE_TAPER_THRESHOLD) / dec!(2)).floor();
    (PERSONAL_ALLOWANCE - reduction).max(Decimal::ZERO)
}

/// Income tax bands over gross income, with the personal allowance already
/// tapered for `income`.
pub fn income_tax_schedule(income: Money, region: TaxRegion) -> UkFinanceResult<BandedSchedule> {
    let allowance = personal_allowance(income);
    let mut bands = Vec::new();
    if allowance > Decimal::ZERO {
        bands.push(Band::bounded(allowance, Decimal::ZERO));
    }

    match region {
        TaxRegion::RestOfUk => {
            bands.push(Band::bounded(allowance + BASIC_RATE_BAND_WIDTH, dec!(0.20)));
            bands.push(Band::bounded(ADDITIONAL_RATE_THRESHOLD, dec!(0.40)));
            bands.push(Band::unbounded(dec!(0.45)));
        }
        TaxRegion::Scotland => {
            let starter = allowance + dec!(2_827);
            let basic = starter + dec!(12_094);
            let intermediate = basic + dec!(16_171);
            let higher = intermediate + dec!(31_338);
            bands.push(Band::bounded(starter, dec!(0.19)));
            bands.push(Band::bounded(basic, dec!(0.20)));
            bands.push(Band::bounded(intermediate, dec!(0.21)));
            bands.push(Band::bounded(higher, dec!(0.42)));
            bands.push(Band::bounded(ADDITIONAL_RATE_THRESHOLD, dec!(0.45)));
            bands.push(Band::unbounded(dec!(0.48)));
        }
    }

    BandedSchedule::new(bands)
}

/// Employee Class 1 National Insurance on annual earnings.
pub fn national_insurance_schedule() -> UkFinanceResult<BandedSchedule> {
    BandedSchedule::new(vec![
        Band::bounded(NI_PRIMARY_THRESHOLD, Decimal::ZERO),
        Band::bounded(NI_UPPER_EARNINGS_LIMIT, dec!(0.08)),
        Band::unbounded(dec!(0.02)),
    ])
}

pub fn student_loan_schedule(plan: StudentLoanPlan) -> UkFinanceResult<BandedSchedule> {
    let (threshold, rate) = match plan {
        StudentLoanPlan::Plan1 => (dec!(26_065), dec!(0.09)),
        StudentLoanPlan::Plan2 => (dec!(28_470), dec!(0.09)),
        StudentLoanPlan::Plan4 => (dec!(32_745), dec!(0.09)),
        StudentLoanPlan::Plan5 => (dec!(25_000), dec!(0.09)),
        StudentLoanPlan::Postgraduate => (dec!(21_000), dec!(0.06)),
    };
    BandedSchedule::new(vec![
        Band::bounded(threshold, Decimal::ZERO),
        Band::unbounded(rate),
    ])
}

/// High Income Child Benefit Charge taper, in percentage points of benefit:
/// 1 point per £200 between £60,000 and £80,000.
pub fn child_benefit_taper_schedule() -> UkFinanceResult<BandedSchedule> {
    BandedSchedule::new(vec![
        Band::bounded(HICBC_THRESHOLD, Decimal::ZERO),
        Band::bounded(HICBC_FULL_CHARGE_INCOME, dec!(0.005)),
        Band::unbounded(Decimal::ZERO),
    ])
}

// ---------------------------------------------------------------------------
// Property transaction taxes
// ---------------------------------------------------------------------------

/// Name of the land transaction tax levied in `region`.
pub fn property_tax_name(region: PropertyRegion) -> &'static str {
    match region {
        PropertyRegion::England | PropertyRegion::NorthernIreland => "SDLT",
        PropertyRegion::Scotland => "LBTT",
        PropertyRegion::Wales => "LTT",
    }
}

/// Whether `buyer` actually receives relief at `price` in `region`.
pub fn first_time_buyer_relief_applies(
    price: Money,
    region: PropertyRegion,
    buyer: BuyerStatus,
) -> bool {
    if buyer != BuyerStatus::FirstTimeBuyer {
        return false;
    }
    match region {
        PropertyRegion::England | PropertyRegion::NorthernIreland => price <= SDLT_FTB_PRICE_CAP,
        PropertyRegion::Scotland => true,
        PropertyRegion::Wales => false,
    }
}

/// Whether the additional-dwelling surcharge applies.
pub fn surcharge_applies(price: Money, buyer: BuyerStatus) -> bool {
    buyer == BuyerStatus::AdditionalProperty && price >= SURCHARGE_MIN_PRICE
}

/// Residential schedule for a purchase at `price`. Surcharges are folded
/// into each band's rate, which equals a flat surcharge on the whole price.
pub fn property_tax_schedule(
    price: Money,
    region: PropertyRegion,
    buyer: BuyerStatus,
) -> UkFinanceResult<BandedSchedule> {
    let ftb = first_time_buyer_relief_applies(price, region, buyer);
    let surcharge = surcharge_applies(price, buyer);

    let table: Vec<(Option<Money>, Decimal)> = match region {
        PropertyRegion::England | PropertyRegion::NorthernIreland => {
            if ftb {
                vec![
                    (Some(dec!(300_000)), dec!(0)),
                    (Some(dec!(500_000)), dec!(0.05)),
                    (None, dec!(0.05)),
                ]
            } else {
                vec![
                    (Some(dec!(125_000)), dec!(0)),
                    (Some(dec!(250_000)), dec!(0.02)),
                    (Some(dec!(925_000)), dec!(0.05)),
                    (Some(dec!(1_500_000)), dec!(0.10)),
                    (None, dec!(0.12)),
                ]
            }
        }
        PropertyRegion::Scotland => {
            let nil_band = if ftb { dec!(175_000) } else { dec!(145_000) };
            vec![
                (Some(nil_band), dec!(0)),
                (Some(dec!(250_000)), dec!(0.02)),
                (Some(dec!(325_000)), dec!(0.05)),
                (Some(dec!(750_000)), dec!(0.10)),
                (None, dec!(0.12)),
            ]
        }
        PropertyRegion::Wales => {
            if surcharge {
                vec![
                    (Some(dec!(180_000)), dec!(0.05)),
                    (Some(dec!(250_000)), dec!(0.085)),
                    (Some(dec!(400_000)), dec!(0.10)),
                    (Some(dec!(750_000)), dec!(0.125)),
                    (Some(dec!(1_500_000)), dec!(0.15)),
                    (None, dec!(0.17)),
                ]
            } else {
                vec![
                    (Some(dec!(225_000)), dec!(0)),
                    (Some(dec!(400_000)), dec!(0.06)),
                    (Some(dec!(750_000)), dec!(0.075)),
                    (Some(dec!(1_500_000)), dec!(0.10)),
                    (None, dec!(0.12)),
                ]
            }
        }
    };

    // Wales publishes a separate higher-rates table instead of a flat add-on.
    let add_on = match region {
        _ if !surcharge => Decimal::ZERO,
        PropertyRegion::England | PropertyRegion::NorthernIreland => SDLT_SURCHARGE,
        PropertyRegion::Scotland => LBTT_ADS,
        PropertyRegion::Wales => Decimal::ZERO,
    };

    let bands = table
        .into_iter()
        .map(|(upper_bound, rate)| Band {
            upper_bound,
            rate: rate + add_on,
        })
        .collect();
    BandedSchedule::new(bands)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_allowance_taper() {
        assert_eq!(personal_allowance(dec!(50_000)), dec!(12_570));
        assert_eq!(personal_allowance(dec!(110_000)), dec!(7_570));
        assert_eq!(personal_allowance(dec!(125_140)), Decimal::ZERO);
        assert_eq!(personal_allowance(dec!(200_000)), Decimal::ZERO);
    }

    #[test]
    fn test_income_tax_basic_rate_payer() {
        let tax = income_tax_schedule(dec!(35_000), TaxRegion::RestOfUk)
            .unwrap()
            .apply(dec!(35_000));
        // (35,000 - 12,570) * 20%
        assert_eq!(tax.total_tax, dec!(4_486));
    }

    #[test]
    fn test_income_tax_higher_rate_payer() {
        let tax = income_tax_schedule(dec!(60_000), TaxRegion::RestOfUk)
            .unwrap()
            .apply(dec!(60_000));
        // 37,700 * 20% + 9,730 * 40%
        assert_eq!(tax.total_tax, dec!(11_432));
    }

    #[test]
    fn test_income_tax_without_allowance_drops_nil_band() {
        let schedule = income_tax_schedule(dec!(150_000), TaxRegion::RestOfUk).unwrap();
        assert_eq!(schedule.bands().len(), 3);
        assert_eq!(schedule.bands()[0].upper_bound, Some(dec!(37_700)));
    }

    #[test]
    fn test_scottish_band_edges() {
        let schedule = income_tax_schedule(dec!(40_000), TaxRegion::Scotland).unwrap();
        let uppers: Vec<Option<Money>> = schedule.bands().iter().map(|b| b.upper_bound).collect();
        assert_eq!(
            uppers,
            vec![
                Some(dec!(12_570)),
                Some(dec!(15_397)),
                Some(dec!(27_491)),
                Some(dec!(43_662)),
                Some(dec!(75_000)),
                Some(dec!(125_140)),
                None
            ]
        );
    }

    #[test]
    fn test_national_insurance() {
        let ni = national_insurance_schedule().unwrap().apply(dec!(60_000));
        // 37,700 * 8% + 9,730 * 2%
        assert_eq!(ni.total_tax, dec!(3_210.60));
    }

    #[test]
    fn test_student_loan_plan2() {
        let sl = student_loan_schedule(StudentLoanPlan::Plan2)
            .unwrap()
            .apply(dec!(38_470));
        assert_eq!(sl.total_tax, dec!(900));
    }

    #[test]
    fn test_child_benefit_taper_points() {
        let schedule = child_benefit_taper_schedule().unwrap();
        assert_eq!(schedule.apply(dec!(70_000)).total_tax, dec!(50));
        assert_eq!(schedule.apply(dec!(95_000)).total_tax, dec!(100));
        assert_eq!(schedule.apply(dec!(59_999)).total_tax, Decimal::ZERO);
    }

    #[test]
    fn test_sdlt_standard_300k() {
        let tax = property_tax_schedule(dec!(300_000), PropertyRegion::England, BuyerStatus::Standard)
            .unwrap()
            .apply(dec!(300_000));
        // 125k at 2% + 50k at 5%
        assert_eq!(tax.total_tax, dec!(5_000));
    }

    #[test]
    fn test_sdlt_first_time_buyer_cap() {
        assert!(first_time_buyer_relief_applies(
            dec!(500_000),
            PropertyRegion::England,
            BuyerStatus::FirstTimeBuyer
        ));
        assert!(!first_time_buyer_relief_applies(
            dec!(500_001),
            PropertyRegion::England,
            BuyerStatus::FirstTimeBuyer
        ));
        assert!(!first_time_buyer_relief_applies(
            dec!(200_000),
            PropertyRegion::Wales,
            BuyerStatus::FirstTimeBuyer
        ));
    }

    #[test]
    fn test_sdlt_additional_property_surcharge() {
        let tax = property_tax_schedule(
            dec!(300_000),
            PropertyRegion::England,
            BuyerStatus::AdditionalProperty,
        )
        .unwrap()
        .apply(dec!(300_000));
        // Standard 5,000 + 5% of 300,000
        assert_eq!(tax.total_tax, dec!(20_000));
    }

    #[test]
    fn test_surcharge_threshold() {
        assert!(!surcharge_applies(dec!(39_999), BuyerStatus::AdditionalProperty));
        assert!(surcharge_applies(dec!(40_000), BuyerStatus::AdditionalProperty));
        assert!(!surcharge_applies(dec!(400_000), BuyerStatus::Standard));
    }

    #[test]
    fn test_lbtt_ads_is_flat_eight_percent() {
        let standard = property_tax_schedule(dec!(200_000), PropertyRegion::Scotland, BuyerStatus::Standard)
            .unwrap()
            .apply(dec!(200_000));
        let additional = property_tax_schedule(
            dec!(200_000),
            PropertyRegion::Scotland,
            BuyerStatus::AdditionalProperty,
        )
        .unwrap()
        .apply(dec!(200_000));
        assert_eq!(standard.total_tax, dec!(1_100));
        assert_eq!(additional.total_tax - standard.total_tax, dec!(16_000));
    }

    #[test]
    fn test_ltt_main_rates() {
        let tax = property_tax_schedule(dec!(300_000), PropertyRegion::Wales, BuyerStatus::Standard)
            .unwrap()
            .apply(dec!(300_000));
        // 75k at 6%
        assert_eq!(tax.total_tax, dec!(4_500));
    }

    #[test]
    fn test_property_tax_names() {
        assert_eq!(property_tax_name(PropertyRegion::England), "SDLT");
        assert_eq!(property_tax_name(PropertyRegion::NorthernIreland), "SDLT");
        assert_eq!(property_tax_name(PropertyRegion::Scotland), "LBTT");
        assert_eq!(property_tax_name(PropertyRegion::Wales), "LTT");
    }
}
