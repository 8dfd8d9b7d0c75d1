// Post-erase evidence
//
// Integrity samples taken before and after an erase show whether the
// sampled region changed.

pub mod sample;

pub use sample::{sample_device, IntegritySample, SUGGESTED_SAMPLE_BYTES};
