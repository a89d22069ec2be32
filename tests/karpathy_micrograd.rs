extern crate scalargrad;

use float_eq::*;
use scalargrad::engine::*;
use scalargrad::error::Result;

#[test]
fn karpathy_test_sanity_check2() {
    let x = Value::new(-4.0);
    let z = 2. * x.clone() + 2. + x.clone();
    let q = z.relu() + &z * &x;
    let h = (&z * &z).relu();
    let y = h + q.clone() + &q * &x;
    y.backward();
    let (xmg, ymg) = (x, y);

    // forward pass went well
    assert_float_eq!(ymg.data(), -20.0, abs <= 1e-10);
    // backward pass went well
    assert_float_eq!(xmg.grad(), 46.0, abs <= 1e-10);
}

#[test]
fn karpathy_test_more_ops2() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let a = Value::new(-4.0);
    let b = Value::new(2.0);
    let mut c = &a + &b;
    let mut d = &a * &b + b.pow(3.)?;
    c = c.clone() + c.clone() + 1.;
    c = c.clone() + 1. + c + -&a;
    d = d.clone() + d.clone() * 2. + (&b + &a).relu();
    d = d.clone() + 3. * d + (&b - &a).relu();
    let e = c - d;
    let f = e.pow(2.)?;
    let mut g = (f.clone() / 2.0)?;
    g = g + (10.0 / f)?;
    g.backward();
    let (amg, bmg, gmg) = (a, b, g);

    let tol = 1e-6;
    // forward pass went well
    assert_float_eq!(gmg.data(), 24.70408163265306, abs <= tol);
    // backward pass went well
    assert_float_eq!(amg.grad(), 138.83381924198252, abs <= tol);
    assert_float_eq!(bmg.grad(), 645.5772594752186, abs <= tol);

    Ok(())
}

#[test]
fn playground_scenario() {
    let v1 = Value::new(2.5);
    let v2 = Value::new(3.7);
    let v3 = Value::new(-3.0);
    let v4 = Value::new(1.7);

    let v1_2 = &v1 + &v2;
    let v1_2_3 = &v1_2 * &v3;
    let result = &v1_2_3 + &v4;

    assert_float_eq!(result.data(), (2.5 + 3.7) * -3.0 + 1.7, abs <= 1e-12);
    assert_float_eq!(result.data(), -16.9, abs <= 1e-10);

    result.backward();

    assert_float_eq!(v1.grad(), -3.0, abs <= 1e-10);
    assert_float_eq!(v2.grad(), -3.0, abs <= 1e-10);
    assert_float_eq!(v3.grad(), 6.2, abs <= 1e-10);
    assert_float_eq!(v4.grad(), 1.0, abs <= 1e-10);
    assert_float_eq!(v1_2.grad(), -3.0, abs <= 1e-10);
    assert_float_eq!(v1_2_3.grad(), 1.0, abs <= 1e-10);
}

#[test]
fn fan_in_same_operand() {
    let a = Value::new(1.75);
    let b = &a * &a;
    b.backward();

    assert_float_eq!(a.grad(), 2. * a.data(), abs <= 1e-10);
}

#[test]
fn diamond_dependency() {
    let x = Value::new(0.4);
    let y = &x + &Value::new(1.0);
    let z = &x * &Value::new(2.0);
    let w = &y + &z;
    w.backward();

    assert_float_eq!(x.grad(), 3.0, abs <= 1e-10);
    assert_float_eq!(y.grad(), 1.0, abs <= 1e-10);
    assert_float_eq!(z.grad(), 1.0, abs <= 1e-10);
}

#[test]
fn backward_leaves_forward_values_alone() -> Result<()> {
    let x = Value::new(0.9);
    let y = Value::new(-1.3);
    let nodes = vec![
        x.clone(),
        y.clone(),
        (&x * &y).tanh(),
        x.powv(&Value::new(2.5))?,
        (&x / &y)?.sigmoid(),
    ];
    let root = nodes
        .iter()
        .skip(2)
        .fold(Value::new(0.0), |acc, n| acc + n.clone());
    let before = nodes.iter().map(Value::data).collect::<Vec<_>>();

    root.backward();
    root.backward();

    let after = nodes.iter().map(Value::data).collect::<Vec<_>>();
    assert_eq!(before, after);

    Ok(())
}

#[test]
fn errors_surface_at_construction() {
    let x = Value::new(3.0);
    let zero = &x - &x;

    assert!(matches!(
        &x / &zero,
        Err(scalargrad::Error::DivisionByZero { .. })
    ));
    assert!(matches!(
        zero.pow(-0.5),
        Err(scalargrad::Error::DomainError { op: "pow", .. })
    ));
    assert!(matches!(
        x.unary("softmax"),
        Err(scalargrad::Error::UnsupportedOperation(_))
    ));
}
