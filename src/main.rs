use color_eyre::eyre::bail;
use log::info;
use scalargrad::engine::Value;
use scalargrad::viz::render_dot;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let dot = match std::env::args().nth(1).as_deref() {
        None => false,
        Some("dot") => true,
        Some(other) => bail!("unknown argument `{}`, expected `dot`", other),
    };

    let v1 = Value::new(2.5);
    let v2 = Value::new(3.7);
    let v3 = Value::new(-3.0);
    let v4 = Value::new(1.7);

    let v1_2 = &v1 + &v2;
    let v1_2_3 = &v1_2 * &v3;
    let result = &v1_2_3 + &v4;

    println!("{}", result);
    result.backward();
    info!("backward done for value {}", result.id());

    if dot {
        println!("{}", render_dot(&result));
        return Ok(());
    }

    for v in [&v1, &v2, &v3, &v4] {
        println!("grad({}): {:.06}", v, v.grad());
    }

    Ok(())
}
