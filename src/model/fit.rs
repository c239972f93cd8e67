use anyhow::Result;
use ndarray::{Array1, Array2};
use tracing::info;

use crate::{
    Error,
    district::DistrictLayer,
    model::{RegressionReport, Term, ols::{normal_p_value, ols_hc1}},
};

const MIN_CASES: usize = 3;

/// Regress vote share on distance to the nearest facility with HC1 standard errors.
///
/// Only districts with both values present are used; the layer is not modified.
pub fn fit_distance_model(layer: &DistrictLayer) -> Result<RegressionReport> {
    let cases = layer.districts().iter()
        .filter_map(|d| Some((d.vote_share?, d.dist_to_mine_km?)))
        .filter(|(y, x)| y.is_finite() && x.is_finite())
        .collect::<Vec<_>>();

    let n = cases.len();
    let dropped = layer.len() - n;
    if n < MIN_CASES {
        return Err(Error::Model(format!("{n} complete cases; at least {MIN_CASES} are required")).into());
    }

    let first = cases[0].1;
    if cases.iter().all(|&(_, x)| x == first) {
        return Err(Error::Model("dist_to_mine_km is constant across complete cases".into()).into());
    }

    let mut x = Array2::<f64>::ones((n, 2));
    for (i, &(_, dist)) in cases.iter().enumerate() {
        x[[i, 1]] = dist;
    }
    let y = Array1::from_iter(cases.iter().map(|&(share, _)| share));

    let fit = ols_hc1(&x, &y)?;
    let se = fit.std_errors();

    let terms = ["const", "dist_to_mine_km"].iter().enumerate()
        .map(|(j, name)| {
            let z = fit.coef[j] / se[j];
            let (ci_low, ci_high) = fit.conf_int(j);
            Term {
                name: name.to_string(),
                coef: fit.coef[j],
                std_err: se[j],
                z,
                p_value: normal_p_value(z),
                ci_low,
                ci_high,
            }
        })
        .collect();

    info!("[model] fitted on {n} districts ({dropped} incomplete), R^2 = {:.4}", fit.r_squared);

    Ok(RegressionReport {
        dependent: "vote_share".into(),
        terms,
        r_squared: fit.r_squared,
        adj_r_squared: fit.adj_r_squared,
        n,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;

    use super::*;
    use crate::{district::District, geom::Geometries};

    fn layer(rows: &[(Option<f64>, Option<f64>)]) -> DistrictLayer {
        let districts = rows.iter().enumerate()
            .map(|(i, &(share, dist))| {
                let mut d = District::new(i.to_string(), None, "Sachsen");
                d.vote_share = share;
                d.dist_to_mine_km = dist;
                d
            })
            .collect();
        DistrictLayer::new(districts, Geometries::new(vec![MultiPolygon(vec![]); rows.len()], 4326)).unwrap()
    }

    #[test]
    fn complete_cases_only() {
        let layer = layer(&[
            (Some(0.0), Some(0.0)),
            (Some(1.0), Some(1.0)),
            (None, Some(5.0)),
            (Some(3.0), Some(2.0)),
            (Some(2.0), None),
        ]);
        let report = fit_distance_model(&layer).unwrap();

        assert_eq!(report.n, 3);
        assert_eq!(report.dropped, 2);
        let slope = report.term("dist_to_mine_km").unwrap();
        assert!((slope.coef - 1.5).abs() < 1e-12);
        assert!((slope.std_err - (1.0_f64 / 24.0).sqrt()).abs() < 1e-12);
        assert!((slope.z - 1.5 / (1.0_f64 / 24.0).sqrt()).abs() < 1e-9);
        assert!(slope.ci_low < slope.coef && slope.coef < slope.ci_high);
        assert!(slope.p_value > 0.0 && slope.p_value < 1.0);
        // Input layer is untouched.
        assert_eq!(layer.vote_shares()[2], None);
    }

    #[test]
    fn fewer_than_three_cases_is_model_error() {
        let err = fit_distance_model(&layer(&[(Some(0.1), Some(1.0)), (Some(0.2), Some(2.0)), (None, None)]))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Model(_))));
    }

    #[test]
    fn constant_distance_is_model_error() {
        let err = fit_distance_model(&layer(&[(Some(0.1), Some(4.0)), (Some(0.2), Some(4.0)), (Some(0.3), Some(4.0))]))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Model(_))));
    }
}
