//! Property tests comparing backward against direct evaluation and central
//! finite differences.

use proptest::prelude::*;
use scalargrad::engine::*;
use scalargrad::error::Result;

const EPS: ValueType = 1e-6;

fn expression(x: &Value, y: &Value) -> Result<Value> {
    let a = x * y + x.tanh();
    let b = (y * y + 1.0).pow(0.5)?;
    let c = (a / b)?;
    let d = (x - y).exp() * 0.1;

    Ok(c.sigmoid() + d - x.leaky_relu(0.2))
}

fn eval(x: ValueType, y: ValueType) -> ValueType {
    expression(&Value::new(x), &Value::new(y))
        .expect("expression is defined everywhere")
        .data()
}

fn close(analytic: ValueType, numeric: ValueType) -> bool {
    (analytic - numeric).abs() <= 1e-5 * (1. + numeric.abs())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_forward_matches_f64(
        a in -10.0f64..10.0,
        b in -10.0f64..10.0,
        c in -10.0f64..10.0,
        d in -10.0f64..10.0,
    ) {
        prop_assume!(d.abs() > 1e-3);

        let (va, vb, vc, vd) = (Value::new(a), Value::new(b), Value::new(c), Value::new(d));
        let r = ((&va + &vb) * vc.clone() - (&va / &vd).unwrap()) * -&vb;

        let expected = ((a + b) * c - a * d.powf(-1.)) * -b;
        prop_assert!((r.data() - expected).abs() <= 1e-9 * (1. + expected.abs()));
    }

    #[test]
    fn prop_gradient_matches_finite_difference(
        x in -2.0f64..2.0,
        y in -2.0f64..2.0,
    ) {
        // Stay clear of the leaky ReLU kink.
        prop_assume!(x.abs() > 1e-3);

        let (vx, vy) = (Value::new(x), Value::new(y));
        let r = expression(&vx, &vy).unwrap();
        r.backward();

        let dx = (eval(x + EPS, y) - eval(x - EPS, y)) / (2. * EPS);
        let dy = (eval(x, y + EPS) - eval(x, y - EPS)) / (2. * EPS);

        prop_assert!(close(vx.grad(), dx), "d/dx: {} vs {}", vx.grad(), dx);
        prop_assert!(close(vy.grad(), dy), "d/dy: {} vs {}", vy.grad(), dy);
    }

    #[test]
    fn prop_powv_gradient_matches_finite_difference(
        base in 0.1f64..3.0,
        exp in -2.0f64..2.0,
    ) {
        let (vb, ve) = (Value::new(base), Value::new(exp));
        let r = vb.powv(&ve).unwrap().ln().unwrap() * ve.clone();
        r.backward();

        let f = |b: ValueType, e: ValueType| b.powf(e).ln() * e;
        let db = (f(base + EPS, exp) - f(base - EPS, exp)) / (2. * EPS);
        let de = (f(base, exp + EPS) - f(base, exp - EPS)) / (2. * EPS);

        prop_assert!(close(vb.grad(), db), "d/dbase: {} vs {}", vb.grad(), db);
        prop_assert!(close(ve.grad(), de), "d/dexp: {} vs {}", ve.grad(), de);
    }

    #[test]
    fn prop_repeated_backward_accumulates(x in -3.0f64..3.0) {
        let vx = Value::new(x);
        let r = (&vx * &vx).tanh() + &vx * &Value::new(3.0);

        r.backward();
        let once = vx.grad();
        r.backward();
        prop_assert!((vx.grad() - 2. * once).abs() <= 1e-12 * (1. + once.abs()));

        r.zero_grad();
        r.backward();
        prop_assert!((vx.grad() - once).abs() <= 1e-12 * (1. + once.abs()));
    }
}
