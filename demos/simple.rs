use stirling_rs::config::EngineConfig;
use stirling_rs::engine::Engine;
use stirling_rs::estimate::{estimate_parameters, Observation};
use stirling_rs::types::{Method, Params};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let engine = Engine::new(Params::lah(), EngineConfig::default());
    println!("engine = {:?}", engine);

    for (name, params) in [
        ("first kind", Params::first_kind()),
        ("second kind", Params::second_kind()),
        ("Lah", Params::lah()),
    ] {
        let engine = Engine::new(params, EngineConfig::default());
        println!("{:>12}: S(5,3) = {}", name, engine.compute(5, 3)?);
    }

    let table = engine.generate_triangle(6, false)?;
    for row in table.to_dense() {
        println!("{:?}", row);
    }

    for method in Method::STRATEGIES {
        match engine.compute_with(8, 1, method) {
            Ok(value) => println!("{:>12}: S(8,1) = {}", method, value),
            Err(e) => println!("{:>12}: {}", method, e),
        }
    }

    let huge = engine.compute_value(1000, 10, Method::Auto)?;
    println!("S(1000,10) = {}", huge);

    let observations: Vec<Observation> = [(5, 2), (8, 3), (12, 6), (15, 4)]
        .into_iter()
        .map(|(n, k)| Ok(Observation::new(n, k, engine.stirling_measure(n, k)?)))
        .collect::<color_eyre::Result<_>>()?;
    let fit = estimate_parameters(&observations)?;
    println!(
        "estimated alpha = {:.6}, beta = {:.6}, r^2 = {:.6}",
        fit.alpha, fit.beta, fit.r_squared
    );

    println!("{}", engine.stats());

    Ok(())
}
