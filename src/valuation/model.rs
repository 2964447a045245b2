// src/valuation/model.rs
//
// Hedonic price model: ordinary least squares on ln(price) over clean sale
// listings. The normal equations are solved by Gaussian elimination with
// partial pivoting and a small ridge term; the feature count is small
// enough that hand-rolled linear algebra is the simplest correct tool.

use crate::db::segments::SegmentRow;
use crate::valuation::Subject;

pub const FEATURE_COUNT: usize = 6;
/// Refuse to fit with fewer than this many usable rows.
pub const MIN_ROWS: usize = 4 * FEATURE_COUNT;
const RIDGE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct HedonicFit {
    /// `[intercept, ln(net_m2), rooms_total, building_age, floor, furnished]`
    pub coefficients: [f64; FEATURE_COUNT],
    pub r_squared: f64,
    pub n: usize,
}

/// Fits ln(price_tl) over the given clean sale rows. Rows without a usable
/// net area are skipped; unknown age and floor default to 0, unknown
/// furnishing to false.
pub fn fit_hedonic(rows: &[SegmentRow]) -> Option<HedonicFit> {
    let samples: Vec<([f64; FEATURE_COUNT], f64)> = rows
        .iter()
        .filter(|r| r.price_tl > 0)
        .filter_map(|r| {
            let net = r.net_m2.filter(|v| *v > 0.0)?;
            let x = feature_vector(
                net,
                r.rooms_total().unwrap_or(0) as f64,
                r.building_age.unwrap_or(0) as f64,
                r.floor.unwrap_or(0) as f64,
                r.furnished.unwrap_or(false),
            );
            Some((x, (r.price_tl as f64).ln()))
        })
        .collect();

    if samples.len() < MIN_ROWS {
        return None;
    }

    // Normal equations: (X'X + ridge·I) b = X'y, intercept unregularized.
    let mut xtx = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
    let mut xty = [0.0; FEATURE_COUNT];
    for (x, y) in &samples {
        for i in 0..FEATURE_COUNT {
            xty[i] += x[i] * y;
            for j in 0..FEATURE_COUNT {
                xtx[i][j] += x[i] * x[j];
            }
        }
    }
    for (i, row) in xtx.iter_mut().enumerate().skip(1) {
        row[i] += RIDGE;
    }

    let coefficients = solve(xtx, xty)?;

    // R² on the training sample, in log space.
    let mean_y: f64 = samples.iter().map(|(_, y)| y).sum::<f64>() / samples.len() as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in &samples {
        let pred: f64 = (0..FEATURE_COUNT).map(|i| coefficients[i] * x[i]).sum();
        ss_res += (y - pred).powi(2);
        ss_tot += (y - mean_y).powi(2);
    }
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    Some(HedonicFit {
        coefficients,
        r_squared,
        n: samples.len(),
    })
}

/// Price estimate in TL for a subject dwelling.
pub fn predict_price(fit: &HedonicFit, subject: &Subject) -> f64 {
    let x = feature_vector(
        subject.net_m2,
        subject.rooms_total() as f64,
        subject.building_age.unwrap_or(0) as f64,
        subject.floor.unwrap_or(0) as f64,
        subject.furnished,
    );
    let log_price: f64 = (0..FEATURE_COUNT).map(|i| fit.coefficients[i] * x[i]).sum();
    log_price.exp()
}

fn feature_vector(
    net_m2: f64,
    rooms_total: f64,
    building_age: f64,
    floor: f64,
    furnished: bool,
) -> [f64; FEATURE_COUNT] {
    [
        1.0,
        net_m2.ln(),
        rooms_total,
        building_age,
        floor,
        if furnished { 1.0 } else { 0.0 },
    ]
}

/// Gaussian elimination with partial pivoting; None for a singular system.
fn solve(
    mut a: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
    mut b: [f64; FEATURE_COUNT],
) -> Option<[f64; FEATURE_COUNT]> {
    let n = FEATURE_COUNT;

    for col in 0..n {
        let pivot = (col..n).max_by(|i, j| a[*i][col].abs().total_cmp(&a[*j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; FEATURE_COUNT];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in row + 1..n {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}
