mod fit;
mod ols;
mod report;

pub use fit::fit_distance_model;
pub use ols::{OlsFit, normal_p_value, ols_hc1};
pub use report::{RegressionReport, Term};
