use anyhow::Result;
use ndarray::{Array1, Array2, Axis};

use crate::Error;

/// Two-sided 95% normal critical value.
const Z_975: f64 = 1.959_963_984_540_054;

/// Least-squares estimates with HC1 heteroskedasticity-robust covariance.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coef: Array1<f64>,
    pub cov: Array2<f64>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub n: usize,
}

impl OlsFit {
    /// Robust standard errors, the square roots of the covariance diagonal.
    pub fn std_errors(&self) -> Array1<f64> {
        self.cov.diag().mapv(f64::sqrt)
    }

    /// `(lower, upper)` 95% confidence bounds for coefficient `j`.
    pub fn conf_int(&self, j: usize) -> (f64, f64) {
        let half = Z_975 * self.cov[[j, j]].sqrt();
        (self.coef[j] - half, self.coef[j] + half)
    }
}

/// Invert a small square matrix by Gauss-Jordan elimination with partial pivoting.
pub(crate) fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let k = matrix.nrows();
    if matrix.ncols() != k { return None }

    let scale = matrix.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);
    let mut a = matrix.clone();
    let mut inv = Array2::<f64>::eye(k);

    for col in 0..k {
        let pivot = (col..k)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() <= 1e-12 * scale { return None }

        for c in 0..k {
            a.swap([col, c], [pivot, c]);
            inv.swap([col, c], [pivot, c]);
        }

        let p = a[[col, col]];
        a.row_mut(col).mapv_inplace(|v| v / p);
        inv.row_mut(col).mapv_inplace(|v| v / p);

        for row in (0..k).filter(|&r| r != col) {
            let factor = a[[row, col]];
            if factor == 0.0 { continue }
            for c in 0..k {
                a[[row, c]] -= factor * a[[col, c]];
                inv[[row, c]] -= factor * inv[[col, c]];
            }
        }
    }

    Some(inv)
}

/// Fit `y = X b + e` by ordinary least squares.
///
/// The covariance is HC1: `n/(n-k) (X'X)^-1 X' diag(e^2) X (X'X)^-1`.
pub fn ols_hc1(x: &Array2<f64>, y: &Array1<f64>) -> Result<OlsFit> {
    let (n, k) = x.dim();
    if y.len() != n {
        return Err(Error::Model(format!("{} observations but {} design rows", y.len(), n)).into());
    }
    if n <= k {
        return Err(Error::Model(format!("{n} observations for {k} parameters")).into());
    }

    let xtx_inv = invert(&x.t().dot(x))
        .ok_or_else(|| Error::Model("design matrix is singular".into()))?;
    let coef = xtx_inv.dot(&x.t().dot(y));
    let resid = y - &x.dot(&coef);

    let weighted = x * &resid.mapv(|e| e * e).insert_axis(Axis(1));
    let meat = weighted.t().dot(x);
    let cov = xtx_inv.dot(&meat).dot(&xtx_inv) * (n as f64 / (n - k) as f64);

    let mean = y.mean().unwrap_or(0.0);
    let ssr = resid.mapv(|e| e * e).sum();
    let sst = y.mapv(|v| (v - mean).powi(2)).sum();
    let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { f64::NAN };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / (n - k) as f64;

    Ok(OlsFit { coef, cov, r_squared, adj_r_squared, n })
}

/// Complementary error function, fractional error below 1.2e-7.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23 + t * (1.000_023_68 + t * (0.374_091_96 + t * (0.096_784_18
        + t * (-0.186_288_06 + t * (0.278_868_07 + t * (-1.135_203_98 + t * (1.488_515_87
        + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}

/// Two-sided p-value of a standard normal statistic.
pub fn normal_p_value(z: f64) -> f64 {
    if z.is_nan() { return f64::NAN }
    erfc(z.abs() / std::f64::consts::SQRT_2).min(1.0)
}
