// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the signal engine
// runs over a close-price series. Warm-up bars are reported as `None`, never
// as zero — a zero would read as a real indicator value downstream.

pub mod ema;
pub mod macd;
pub mod rsi;
