use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Pension
// ---------------------------------------------------------------------------

#[napi]
pub fn project_pension(input_json: String) -> NapiResult<String> {
    let input: uk_finance_core::pension::projection::PensionProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        uk_finance_core::pension::projection::project_pension(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn resolve_contribution(
    earnings: String,
    declaration_json: String,
    band_json: Option<String>,
) -> NapiResult<String> {
    let earnings: Decimal = earnings.parse().map_err(to_napi_error)?;
    let declaration: uk_finance_core::contributions::ContributionDeclaration =
        serde_json::from_str(&declaration_json).map_err(to_napi_error)?;
    let band: Option<uk_finance_core::contributions::QualifyingEarningsBand> = band_json
        .map(|b| serde_json::from_str(&b))
        .transpose()
        .map_err(to_napi_error)?;
    let amount =
        uk_finance_core::contributions::resolve(earnings, &declaration, band.as_ref())
            .map_err(to_napi_error)?;
    Ok(amount.to_string())
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_amortization(input_json: String) -> NapiResult<String> {
    let input: uk_finance_core::mortgage::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        uk_finance_core::mortgage::simulate_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_months(input_json: String) -> NapiResult<String> {
    let input: uk_finance_core::mortgage::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = uk_finance_core::mortgage::LoanSchedule::new(&input).map_err(to_napi_error)?;
    let months: Vec<_> = schedule.months().collect();
    serde_json::to_string(&months).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Banded taxes
// ---------------------------------------------------------------------------

#[napi]
pub fn apply_bands(amount: String, bands_json: String) -> NapiResult<String> {
    let amount: Decimal = amount.parse().map_err(to_napi_error)?;
    let bands: Vec<uk_finance_core::bands::Band> =
        serde_json::from_str(&bands_json).map_err(to_napi_error)?;
    let output = uk_finance_core::bands::apply(amount, &bands).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_property_tax(input_json: String) -> NapiResult<String> {
    let input: uk_finance_core::property_tax::stamp_duty::PropertyTaxInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = uk_finance_core::property_tax::stamp_duty::calculate_property_tax(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_child_benefit(input_json: String) -> NapiResult<String> {
    let input: uk_finance_core::child_benefit::hicbc::ChildBenefitInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = uk_finance_core::child_benefit::hicbc::calculate_child_benefit(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_take_home(input_json: String) -> NapiResult<String> {
    let input: uk_finance_core::take_home::salary::TakeHomeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = uk_finance_core::take_home::salary::calculate_take_home(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
