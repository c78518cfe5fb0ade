pub mod bls;
pub mod damodaran;
pub mod fred;
pub mod util;
pub mod yahoo_chart;
pub mod yahoo_quote;
