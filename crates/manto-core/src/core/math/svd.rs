//! Singular values of a dense matrix via the Golub-Kahan-Reinsch algorithm:
//! Householder bidiagonalization followed by implicit-shift QR iteration with
//! deflation. Only the singular values are accumulated; the engine consumes
//! them for rank, the 2-norm, and condition estimates, never the factors.

use super::matrix::Matrix;

const EPS: f64 = 2.220_446_049_250_313e-16; // 2^-52
const TINY: f64 = 1.602_743_410_650_062e-291; // 2^-966
const MAX_QR_ITERATIONS: usize = 500;

/// Singular values of `matrix`, sorted descending. Empty for an empty matrix.
pub(crate) fn singular_values(matrix: &Matrix) -> Vec<f64> {
    let m = matrix.rows();
    let n = matrix.cols();
    if m == 0 || n == 0 {
        return Vec::new();
    }

    let mut a: Vec<Vec<f64>> = (0..m).map(|i| matrix.row(i).to_vec()).collect();
    let mut s = vec![0.0f64; (m + 1).min(n)];
    let mut e = vec![0.0f64; n];
    let mut work = vec![0.0f64; m];

    // Bidiagonalization: reduce A to bidiagonal form, placing the diagonal in
    // s and the superdiagonal in e.
    let nct = (m - 1).min(n);
    let nrt = (n as isize - 2).clamp(0, m as isize) as usize;

    for k in 0..nct.max(nrt) {
        if k < nct {
            s[k] = 0.0;
            for row in a.iter().skip(k) {
                s[k] = s[k].hypot(row[k]);
            }
            if s[k] != 0.0 {
                if a[k][k] < 0.0 {
                    s[k] = -s[k];
                }
                for row in a.iter_mut().skip(k) {
                    row[k] /= s[k];
                }
                a[k][k] += 1.0;
            }
            s[k] = -s[k];
        }

        for j in (k + 1)..n {
            if k < nct && s[k] != 0.0 {
                let mut t = 0.0;
                for row in a.iter().skip(k) {
                    t += row[k] * row[j];
                }
                t = -t / a[k][k];
                for row in a.iter_mut().skip(k) {
                    let delta = t * row[k];
                    row[j] += delta;
                }
            }
            e[j] = a[k][j];
        }

        if k < nrt {
            e[k] = 0.0;
            for i in (k + 1)..n {
                e[k] = e[k].hypot(e[i]);
            }
            if e[k] != 0.0 {
                if e[k + 1] < 0.0 {
                    e[k] = -e[k];
                }
                for i in (k + 1)..n {
                    e[i] /= e[k];
                }
                e[k + 1] += 1.0;
            }
            e[k] = -e[k];

            if k + 1 < m && e[k] != 0.0 {
                for item in work.iter_mut().skip(k + 1) {
                    *item = 0.0;
                }
                for j in (k + 1)..n {
                    for i in (k + 1)..m {
                        work[i] += e[j] * a[i][j];
                    }
                }
                for j in (k + 1)..n {
                    let t = -e[j] / e[k + 1];
                    for i in (k + 1)..m {
                        a[i][j] += t * work[i];
                    }
                }
            }
        }
    }

    let mut p = n.min(m + 1);
    if nct < n {
        s[nct] = a[nct][nct];
    }
    if m < p {
        s[p - 1] = 0.0;
    }
    if nrt + 1 < p {
        e[nrt] = a[nrt][p - 1];
    }
    e[p - 1] = 0.0;

    // Implicit-shift QR iteration with deflation.
    let pp = p - 1;
    let mut iter = 0usize;

    while p > 0 {
        if iter > MAX_QR_ITERATIONS {
            break;
        }

        let mut k: isize = p as isize - 2;
        while k >= 0 {
            let ku = k as usize;
            if e[ku].abs() <= TINY + EPS * (s[ku].abs() + s[ku + 1].abs()) {
                e[ku] = 0.0;
                break;
            }
            k -= 1;
        }

        let kase;
        if k == p as isize - 2 {
            kase = 4;
        } else {
            let mut ks: isize = p as isize - 1;
            while ks > k {
                let ksu = ks as usize;
                let t = if ks != p as isize { e[ksu].abs() } else { 0.0 }
                    + if ks != k + 1 { e[ksu - 1].abs() } else { 0.0 };
                if s[ksu].abs() <= TINY + EPS * t {
                    s[ksu] = 0.0;
                    break;
                }
                ks -= 1;
            }
            if ks == k {
                kase = 3;
            } else if ks == p as isize - 1 {
                kase = 1;
            } else {
                kase = 2;
                k = ks;
            }
        }
        let k = (k + 1) as usize;

        match kase {
            // Deflate negligible s[p-1].
            1 => {
                let mut f = e[p - 2];
                e[p - 2] = 0.0;
                for j in (k..=(p - 2)).rev() {
                    let t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    if j != k {
                        f = -sn * e[j - 1];
                        e[j - 1] *= cs;
                    }
                }
            }

            // Split at negligible s[k].
            2 => {
                let mut f = e[k - 1];
                e[k - 1] = 0.0;
                for j in k..p {
                    let t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    f = -sn * e[j];
                    e[j] *= cs;
                }
            }

            // One QR step.
            3 => {
                let scale = s[p - 1]
                    .abs()
                    .max(s[p - 2].abs())
                    .max(e[p - 2].abs())
                    .max(s[k].abs())
                    .max(e[k].abs());
                let sp = s[p - 1] / scale;
                let spm1 = s[p - 2] / scale;
                let epm1 = e[p - 2] / scale;
                let sk = s[k] / scale;
                let ek = e[k] / scale;
                let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / 2.0;
                let c = (sp * epm1) * (sp * epm1);
                let mut shift = 0.0;
                if b != 0.0 || c != 0.0 {
                    shift = (b * b + c).sqrt();
                    if b < 0.0 {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }
                let mut f = (sk + sp) * (sk - sp) + shift;
                let mut g = sk * ek;

                for j in k..(p - 1) {
                    let mut t = f.hypot(g);
                    let mut cs = f / t;
                    let mut sn = g / t;
                    if j != k {
                        e[j - 1] = t;
                    }
                    f = cs * s[j] + sn * e[j];
                    e[j] = cs * e[j] - sn * s[j];
                    g = sn * s[j + 1];
                    s[j + 1] *= cs;

                    t = f.hypot(g);
                    cs = f / t;
                    sn = g / t;
                    s[j] = t;
                    f = cs * e[j] + sn * s[j + 1];
                    s[j + 1] = -sn * e[j] + cs * s[j + 1];
                    g = sn * e[j + 1];
                    e[j + 1] *= cs;
                }
                e[p - 2] = f;
                iter += 1;
            }

            // Convergence: make s[k] non-negative, restore descending order,
            // shrink the active block.
            _ => {
                if s[k] <= 0.0 {
                    s[k] = if s[k] < 0.0 { -s[k] } else { 0.0 };
                }
                let mut k = k;
                while k < pp {
                    if s[k] >= s[k + 1] {
                        break;
                    }
                    s.swap(k, k + 1);
                    k += 1;
                }
                iter = 0;
                p -= 1;
            }
        }
    }

    s.truncate(m.min(n));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn diagonal_matrix_yields_sorted_absolute_diagonal() {
        let m = Matrix::from_rows(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, -3.0, 0.0],
            vec![0.0, 0.0, 2.0],
        ]);
        let s = singular_values(&m);
        assert_eq!(s.len(), 3);
        assert_relative_eq!(s[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(s[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(s[2], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn known_two_by_two_singular_values() {
        // [[3, 0], [4, 5]] has singular values sqrt(45) and sqrt(5).
        let m = Matrix::from_rows(&[vec![3.0, 0.0], vec![4.0, 5.0]]);
        let s = singular_values(&m);
        assert_relative_eq!(s[0], 45.0f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(s[1], 5.0f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn rank_deficient_matrix_has_a_zero_singular_value() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]);
        let s = singular_values(&m);
        assert!(s[1].abs() < 1e-12, "expected near-zero, got {}", s[1]);
    }

    #[test]
    fn rectangular_matrices_are_supported_both_ways() {
        let tall = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]]);
        let s = singular_values(&tall);
        assert_eq!(s.len(), 2);
        assert_relative_eq!(s[0], 1.0, epsilon = 1e-10);

        let wide = tall.transpose();
        let s = singular_values(&wide);
        assert_eq!(s.len(), 2);
        assert_relative_eq!(s[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn squared_singular_values_sum_to_squared_frobenius_norm() {
        let m = Matrix::from_rows(&[
            vec![1.0, 2.0, 0.5],
            vec![-1.0, 0.25, 3.0],
            vec![2.0, -2.0, 1.0],
            vec![0.0, 1.0, -1.0],
        ]);
        let s = singular_values(&m);
        let sum_sq: f64 = s.iter().map(|v| v * v).sum();
        let frob = m.norm_frobenius();
        assert_relative_eq!(sum_sq, frob * frob, epsilon = 1e-9);
    }

    #[test]
    fn empty_matrix_has_no_singular_values() {
        assert!(singular_values(&Matrix::zeros(0, 3)).is_empty());
        assert!(singular_values(&Matrix::zeros(3, 0)).is_empty());
    }
}
