// Business domains

pub mod places;
