pub mod dashboard;
pub mod icons;
