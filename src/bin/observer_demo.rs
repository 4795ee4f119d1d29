// Observer demo: observers come and go while a subject keeps publishing.

use design_patterns::logging::init_tracing;
use design_patterns::{Console, DemoConfig, MessageObserver, Result, Sink, Subject};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

fn client_code(config: &DemoConfig, sink: Rc<dyn Sink>) -> Result<()> {
    let sequence = config.observer.sequence();
    let subject = Subject::new(sink);

    let observer1 = MessageObserver::new(&subject, &sequence)?;
    let observer2 = MessageObserver::new(&subject, &sequence)?;
    let observer3 = MessageObserver::new(&subject, &sequence)?;

    subject.create_message("Hello World! :D");
    observer3.remove_me_from_the_list();

    subject.create_message("The weather is hot today! :P");
    let observer4 = MessageObserver::new(&subject, &sequence)?;

    observer2.remove_me_from_the_list();
    let observer5 = MessageObserver::new(&subject, &sequence)?;

    subject.create_message("My new car is great! ;)");
    observer5.remove_me_from_the_list();

    observer4.remove_me_from_the_list();
    observer1.remove_me_from_the_list();

    drop(observer5);
    drop(observer4);
    drop(observer3);
    drop(observer2);
    drop(observer1);
    Ok(())
}

fn business_logic_example(config: &DemoConfig, sink: Rc<dyn Sink>) -> Result<()> {
    let sequence = config.observer.sequence();
    let subject = Subject::new(sink);
    let observer = MessageObserver::new(&subject, &sequence)?;

    subject.create_message(config.observer.default_message.clone());
    subject.some_business_logic();
    observer.remove_me_from_the_list();
    Ok(())
}

fn run() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = DemoConfig::load(path.as_deref())?;
    init_tracing(&config.logging.filter);

    let console: Rc<dyn Sink> = Rc::new(Console::new(config.output.color));

    println!("Observer Pattern");
    println!("================");

    println!("\n=== Subscribers Joining and Leaving ===");
    client_code(&config, Rc::clone(&console))?;
    println!();

    println!("=== Business Logic Triggering Notifications ===");
    business_logic_example(&config, console)
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
