mod pacing;
pub mod run;
