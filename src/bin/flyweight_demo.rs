// Flyweight demo: a police database sharing car model data between entries.

use design_patterns::logging::init_tracing;
use design_patterns::{
    add_car_to_police_database, BoundedRegistry, Console, DemoConfig, FlyweightRegistry, Result,
    SharedState, Sink,
};
use std::path::PathBuf;
use std::process::ExitCode;

fn police_database_example(config: &DemoConfig, sink: &dyn Sink) -> FlyweightRegistry {
    let mut registry = config.flyweight.registry();
    registry.list_flyweights(sink);

    add_car_to_police_database(
        &mut registry,
        sink,
        "CL234IR",
        "James Doe",
        "BMW",
        "M5",
        "red",
    );

    add_car_to_police_database(
        &mut registry,
        sink,
        "CL234IR",
        "James Doe",
        "BMW",
        "X1",
        "red",
    );

    registry.list_flyweights(sink);
    registry
}

fn bounded_registry_example(config: &DemoConfig, sink: &dyn Sink) -> Result<()> {
    let capacity = config
        .flyweight
        .capacity
        .unwrap_or(config.flyweight.preload.len() + 1);
    let mut bounded = BoundedRegistry::new(config.flyweight.registry(), capacity)?;
    sink.line(&format!("Registry capacity: {}", bounded.capacity()));

    let requests = [
        SharedState::new("BMW", "M5", "red"),
        SharedState::new("Audi", "A4", "grey"),
        SharedState::new("Tesla", "Model 3", "blue"),
    ];

    for state in &requests {
        match bounded.try_intern(state) {
            Ok(interned) => sink.line(interned.lookup.message()),
            Err(err) => sink.line(&format!("FlyweightFactory: {err}")),
        }
    }

    sink.line(&format!(
        "FlyweightFactory: holding {} of {} flyweights",
        bounded.registry().count(),
        bounded.capacity()
    ));
    Ok(())
}

fn run() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = DemoConfig::load(path.as_deref())?;
    init_tracing(&config.logging.filter);

    let console = Console::new(config.output.color);

    println!("Flyweight Pattern");
    println!("=================");

    println!("\n=== Police Database ===");
    police_database_example(&config, &console);
    println!();

    println!("=== Bounded Registry ===");
    bounded_registry_example(&config, &console)?;

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
