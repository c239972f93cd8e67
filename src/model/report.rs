use std::fmt;

/// Estimates for one regressor.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub name: String,
    pub coef: f64,
    /// HC1 robust standard error.
    pub std_err: f64,
    pub z: f64,
    /// Two-sided p-value under the normal approximation.
    pub p_value: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

/// Result of regressing vote share on distance to the nearest facility.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionReport {
    pub dependent: String,
    pub terms: Vec<Term>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Complete cases used in the fit.
    pub n: usize,
    /// Districts left out for a missing share or distance.
    pub dropped: usize,
}

impl RegressionReport {
    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.name == name)
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhs = self.terms.iter()
            .map(|t| if t.name == "const" { "1" } else { t.name.as_str() })
            .collect::<Vec<_>>()
            .join(" + ");
        let rule = "=".repeat(86);

        writeln!(f, "OLS regression: {} ~ {}", self.dependent, rhs)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<24}{:>14}", "Observations:", self.n)?;
        writeln!(f, "{:<24}{:>14}", "Dropped (incomplete):", self.dropped)?;
        writeln!(f, "{:<24}{:>14.4}", "R-squared:", self.r_squared)?;
        writeln!(f, "{:<24}{:>14.4}", "Adj. R-squared:", self.adj_r_squared)?;
        writeln!(f, "{:<24}{:>14}", "Covariance type:", "HC1")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<20}{:>11}{:>11}{:>9}{:>9}{:>13}{:>13}",
            "", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]")?;
        writeln!(f, "{}", "-".repeat(86))?;
        for t in &self.terms {
            writeln!(f, "{:<20}{:>11.4}{:>11.4}{:>9.3}{:>9.3}{:>13.4}{:>13.4}",
                t.name, t.coef, t.std_err, t.z, t.p_value, t.ci_low, t.ci_high)?;
        }
        write!(f, "{rule}")
    }
}
