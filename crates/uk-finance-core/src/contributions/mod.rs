pub mod resolver;

pub use resolver::{
    annual_contribution, resolve, ContributionDeclaration, EarningsBasis, Frequency,
    QualifyingEarningsBand, ValueType,
};
