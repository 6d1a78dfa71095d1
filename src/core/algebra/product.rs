//! 절단 텐서 곱과 그 수반(adjoint)

use super::layout::TensorAlgebraLayout;

/// out = a ⊗ b, 깊이 D 에서 절단. 세 버퍼 모두 full 원소.
pub fn mult(layout: &TensorAlgebraLayout, a: &[f64], b: &[f64], out: &mut [f64]) {
    out.fill(0.0);
    for k in 0..=layout.depth() {
        let out_k = &mut out[layout.level_range(k)];
        for i in 0..=k {
            let j = k - i;
            let a_i = &a[layout.level_range(i)];
            let b_j = &b[layout.level_range(j)];
            let width = b_j.len();
            for (u, &au) in a_i.iter().enumerate() {
                if au == 0.0 {
                    continue;
                }
                let row = &mut out_k[u * width..(u + 1) * width];
                for (o, &bv) in row.iter_mut().zip(b_j) {
                    *o += au * bv;
                }
            }
        }
    }
}

/// `mult` 의 전치. grad_out = dL/d(a⊗b) 를 grad_a, grad_b 에 누적한다.
pub fn mult_backward(
    layout: &TensorAlgebraLayout,
    grad_out: &[f64],
    a: &[f64],
    b: &[f64],
    mut grad_a: Option<&mut [f64]>,
    mut grad_b: Option<&mut [f64]>,
) {
    for k in 0..=layout.depth() {
        let g_k = &grad_out[layout.level_range(k)];
        for i in 0..=k {
            let j = k - i;
            let width = layout.level_size(j);

            if let Some(ga) = grad_a.as_deref_mut() {
                let b_j = &b[layout.level_range(j)];
                let ga_i = &mut ga[layout.level_range(i)];
                for (u, gau) in ga_i.iter_mut().enumerate() {
                    let row = &g_k[u * width..(u + 1) * width];
                    *gau += row.iter().zip(b_j).map(|(g, bv)| g * bv).sum::<f64>();
                }
            }

            if let Some(gb) = grad_b.as_deref_mut() {
                let a_i = &a[layout.level_range(i)];
                let gb_j = &mut gb[layout.level_range(j)];
                for (u, &au) in a_i.iter().enumerate() {
                    if au == 0.0 {
                        continue;
                    }
                    let row = &g_k[u * width..(u + 1) * width];
                    for (gbv, &g) in gb_j.iter_mut().zip(row) {
                        *gbv += au * g;
                    }
                }
            }
        }
    }
}
