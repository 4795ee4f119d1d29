// Design Patterns: Flyweight and Observer
// Two small mechanisms where sharing and mutation actually matter.

pub mod config;
pub mod error;
pub mod flyweight;
pub mod logging;
pub mod observer;
pub mod output;
pub mod sequence;

pub use config::DemoConfig;
pub use error::{PatternError, Result};
pub use flyweight::{
    add_car_to_police_database, BoundedRegistry, Flyweight, FlyweightRegistry, Interned, Lookup,
    SharedState, UniqueState,
};
pub use observer::{MessageObserver, Observer, Subject};
pub use output::{Console, Sink, Transcript};
pub use sequence::ObserverSequence;

pub mod examples {
    //! # Flyweight and Observer
    //!
    //! ## Flyweight
    //! - Interning shared car data by a composite key
    //! - Pre-populated registry, create vs reuse
    //! - Capacity-bounded registry with explicit errors
    //!
    //! ## Observer
    //! - Subject owning its subscribers, observers holding a `Weak` back
    //! - Snapshot notification, safe self-detach from `update`
    //! - Injectable observer numbering
    //!
    //! Run individual examples with:
    //! ```bash
    //! cargo run --bin flyweight_demo
    //! cargo run --bin observer_demo
    //! cargo run --bin observer_demo -- demo.toml
    //! ```
}
