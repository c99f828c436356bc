//! Aggregations behind the chart battery. Everything here is a single pass
//! over plain slices; nothing is cached.

use std::collections::{BTreeMap, HashMap};

use super::{Bin, ChartError, Trend};

/// Equal-width histogram over `[min, max]` of the finite values.
///
/// The last bin is closed on the right so the maximum lands inside it. When
/// every value is equal a single unit-wide bin centred on it is returned.
pub fn histogram(values: &[f64], nbins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some((min, max)) = min_max(&finite) else {
        return Vec::new();
    };
    if nbins == 0 {
        return Vec::new();
    }
    if max == min {
        return vec![Bin {
            lo: min - 0.5,
            hi: min + 0.5,
            count: finite.len(),
        }];
    }

    let edges = bin_edges(min, max, nbins);
    let mut counts = vec![0usize; nbins];
    for v in &finite {
        counts[bin_index(*v, min, max, nbins)] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lo: edges[i],
            hi: edges[i + 1],
            count,
        })
        .collect()
}

/// Occurrence counts, most frequent first. Ties keep first-appearance order.
pub fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        let count = counts.entry(v).or_insert_with(|| {
            order.push(v);
            0
        });
        *count += 1;
    }
    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|v| (v.to_string(), counts[v]))
        .collect();
    // stable sort keeps first-appearance order among ties
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Sum `value` per key, keys ascending.
pub fn group_sum<K: Ord>(pairs: impl Iterator<Item = (K, f64)>) -> BTreeMap<K, f64> {
    let mut sums = BTreeMap::new();
    for (key, value) in pairs {
        *sums.entry(key).or_insert(0.0) += value;
    }
    sums
}

/// Mean of `value` per key, keys ascending.
pub fn group_mean<K: Ord>(pairs: impl Iterator<Item = (K, f64)>) -> BTreeMap<K, f64> {
    let mut acc: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for (key, value) in pairs {
        let slot = acc.entry(key).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }
    acc.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Pearson correlation coefficient. NaN when either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let (Some(mx), Some(my)) = (mean(x), mean(y)) else {
        return f64::NAN;
    };
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Symmetric Pearson matrix over equally long columns.
///
/// The diagonal is exactly 1.0 for any column with non-zero variance and NaN
/// for a constant column.
pub fn correlation_matrix(columns: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ChartError> {
    let rows = columns.first().map_or(0, Vec::len);
    if rows < 2 {
        return Err(ChartError::InsufficientData {
            needed: 2,
            got: rows,
        });
    }

    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                if pearson(&columns[i], &columns[i]).is_nan() {
                    f64::NAN
                } else {
                    1.0
                }
            } else {
                pearson(&columns[i], &columns[j])
            };
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Ok(matrix)
}

/// Ordinary least squares fit of `y = intercept + slope * x`.
pub fn ols(x: &[f64], y: &[f64], x_name: &'static str) -> Result<Trend, ChartError> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(ChartError::InsufficientData { needed: 2, got: n });
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = mean(x).unwrap_or_default();
    let my = mean(y).unwrap_or_default();

    let sxx: f64 = x.iter().map(|xi| (xi - mx).powi(2)).sum();
    if sxx == 0.0 {
        return Err(ChartError::DegenerateRegression(x_name));
    }
    let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| (xi - mx) * (yi - my)).sum();
    let slope = sxy / sxx;
    let intercept = my - slope * mx;

    let ss_tot: f64 = y.iter().map(|yi| (yi - my).powi(2)).sum();
    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - (intercept + slope * xi)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

    Ok(Trend {
        slope,
        intercept,
        r_squared,
    })
}

/// 2-D histogram. `counts[yi][xi]` counts points in the cell spanned by
/// `x_edges[xi..=xi+1]` × `y_edges[yi..=yi+1]`.
pub fn density(
    x: &[f64],
    y: &[f64],
    nx: usize,
    ny: usize,
) -> (Vec<f64>, Vec<f64>, Vec<Vec<usize>>) {
    let points: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .map(|(a, b)| (*a, *b))
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect();
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (Some((x_min, x_max)), Some((y_min, y_max))) = (min_max(&xs), min_max(&ys)) else {
        return (Vec::new(), Vec::new(), Vec::new());
    };

    let (x_min, x_max, nx) = widen(x_min, x_max, nx);
    let (y_min, y_max, ny) = widen(y_min, y_max, ny);

    let mut counts = vec![vec![0usize; nx]; ny];
    for (a, b) in points {
        counts[bin_index(b, y_min, y_max, ny)][bin_index(a, x_min, x_max, nx)] += 1;
    }
    (
        bin_edges(x_min, x_max, nx),
        bin_edges(y_min, y_max, ny),
        counts,
    )
}

/// A constant axis collapses to one unit-wide cell.
fn widen(min: f64, max: f64, n: usize) -> (f64, f64, usize) {
    if max == min {
        (min - 0.5, max + 0.5, 1)
    } else {
        (min, max, n.max(1))
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut it = values.iter().copied();
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

fn bin_edges(min: f64, max: f64, nbins: usize) -> Vec<f64> {
    let width = (max - min) / nbins as f64;
    (0..=nbins)
        .map(|i| if i == nbins { max } else { min + i as f64 * width })
        .collect()
}

fn bin_index(v: f64, min: f64, max: f64, nbins: usize) -> usize {
    let width = (max - min) / nbins as f64;
    (((v - min) / width).floor() as usize).min(nbins - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_sum_to_rows() {
        let values: Vec<f64> = (0..97).map(|i| (i * 7 % 50) as f64 + 0.25).collect();
        let bins = histogram(&values, 30);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 97);
        assert_eq!(bins[0].lo, 0.25);
        assert_eq!(bins[29].hi, 49.25);
        assert!(bins.windows(2).all(|w| w[0].hi == w[1].lo));
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(histogram(&[], 20).is_empty());
        let single = histogram(&[4.0, 4.0, 4.0], 20);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 3);
    }

    #[test]
    fn value_counts_orders_by_count_then_first_seen() {
        let counts = value_counts(["b", "a", "c", "a", "c", "d"].into_iter());
        assert_eq!(
            counts,
            vec![
                ("a".to_string(), 2),
                ("c".to_string(), 2),
                ("b".to_string(), 1),
                ("d".to_string(), 1)
            ]
        );
    }

    #[test]
    fn grouped_sum_and_mean() {
        let pairs = [("x", 1.0), ("y", 4.0), ("x", 3.0)];
        let sums = group_sum(pairs.into_iter());
        assert_eq!(sums["x"], 4.0);
        let means = group_mean(pairs.into_iter());
        assert_eq!(means["x"], 2.0);
        assert_eq!(means["y"], 4.0);
        assert_eq!(means.keys().copied().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![2.0, 4.1, 5.9, 8.2, 9.9];
        let c = vec![5.0, 3.0, 4.0, 1.0, 2.0];
        let m = correlation_matrix(&[a, b, c]).unwrap();
        for i in 0..3 {
            assert_eq!(m[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
        assert!(m[0][1] > 0.99);
        assert!(m[0][2] < 0.0);
    }

    #[test]
    fn correlation_needs_two_rows_and_flags_constant_columns() {
        assert_eq!(
            correlation_matrix(&[vec![1.0], vec![2.0]]),
            Err(ChartError::InsufficientData { needed: 2, got: 1 })
        );
        let m = correlation_matrix(&[vec![1.0, 2.0, 3.0], vec![7.0, 7.0, 7.0]]).unwrap();
        assert!(m[1][1].is_nan());
        assert!(m[0][1].is_nan());
        assert_eq!(m[0][0], 1.0);
    }

    #[test]
    fn ols_recovers_exact_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 + 2.0 * v).collect();
        let trend = ols(&x, &y, "x").unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-12);
        assert!((trend.intercept - 3.0).abs() < 1e-12);
        assert!((trend.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ols_degenerate_inputs() {
        assert_eq!(
            ols(&[1.0], &[2.0], "x"),
            Err(ChartError::InsufficientData { needed: 2, got: 1 })
        );
        assert_eq!(
            ols(&[2.0, 2.0], &[1.0, 5.0], "x"),
            Err(ChartError::DegenerateRegression("x"))
        );
    }

    #[test]
    fn density_places_every_point() {
        let x = [0.0, 1.0, 2.0, 10.0];
        let y = [5.0, 5.0, 6.0, 9.0];
        let (x_edges, y_edges, counts) = density(&x, &y, 5, 4);
        assert_eq!(x_edges.len(), 6);
        assert_eq!(y_edges.len(), 5);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.iter().flatten().sum::<usize>(), 4);
        assert_eq!(counts[3][4], 1);
        assert_eq!(counts[0][0], 2);
    }

    #[test]
    fn density_of_nothing_is_empty() {
        let (x_edges, y_edges, counts) = density(&[], &[], 20, 20);
        assert!(x_edges.is_empty() && y_edges.is_empty() && counts.is_empty());
    }
}
