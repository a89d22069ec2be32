extern crate scalargrad;

use scalargrad::engine::*;
use scalargrad::viz::render_dot;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let a = Value::new(-4.0);
    let b = Value::new(2.0);
    let mut c = &a + &b;
    let mut d = &a * &b + b.pow(3.)?;
    c = c.clone() + (c + 1.);
    c = c.clone() + (1. + c + -&a);
    d = d.clone() + (d * 2. + (&b + &a).relu());
    d = d.clone() + (3. * d + (&b - &a).relu());
    let e = c - d;
    let f = e.pow(2.)?;
    let mut g = (f.clone() / 2.0)?;
    g = g + (10.0 / f)?;
    g.backward();

    eprintln!("{:#}", g);
    println!("{}", render_dot(&g));

    Ok(())
}
