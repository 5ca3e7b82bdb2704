pub mod bands;
pub mod child_benefit;
pub mod mortgage;
pub mod pension;
pub mod property_tax;
pub mod take_home;
