pub mod check;
pub mod cli;
pub mod normalize;
pub mod run;
