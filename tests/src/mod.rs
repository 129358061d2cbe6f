#[cfg(test)]
pub mod drop_zone_tests;
#[cfg(test)]
pub mod upload_stage_tests;
#[cfg(test)]
pub mod utils;
