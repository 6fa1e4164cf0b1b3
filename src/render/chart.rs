use serde::Serialize;

use crate::report::FinancialYearRecord;

/// One x-axis point of the financial trajectory chart (INR crore).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub revenue: f64,
    pub debt: f64,
    pub ebitda: f64,
    /// Plotted on the secondary (percentage) axis.
    pub ebitda_margin: f64,
}

/// Chart points in series order, which is already oldest to newest.
pub fn chart_points(series: &[FinancialYearRecord]) -> Vec<ChartPoint> {
    series
        .iter()
        .map(|r| ChartPoint {
            name: r.year.clone(),
            revenue: r.revenue,
            debt: r.debt,
            ebitda: r.ebitda,
            ebitda_margin: r.ebitda_margin,
        })
        .collect()
}
