//! # Lineage Core
//!
//! Core implementation of the `lineage` dynamic class system, including:
//! - Dynamic member values and callable methods
//! - The member copier with override-aware combination
//! - Class descriptors with single inheritance and ancestry queries
//! - Instances with composed members and explicit parent-method calls
//! - A registry of named classes
//!
//! Classes are defined from a parent (or none, making the built-in root
//! class the parent) and a member structure: either a plain [`Members`]
//! table shared as a template, or a producer run freshly per
//! instantiation so each instance gets its own private state record.
//! An overriding method reaches the implementation it shadowed through
//! [`Call::parent`], one level up, at any chain depth.
//!
//! ```
//! use lineage_core::{Class, Members, Value};
//!
//! let animal = Class::builder()
//!     .name("Animal")
//!     .members(
//!         Members::new()
//!             .with_data("legs", 4i64)
//!             .with_method("speak", |_call| Ok(Value::from("..."))),
//!     )
//!     .build();
//!
//! let dog = Class::builder()
//!     .name("Dog")
//!     .parent(&animal)
//!     .members(Members::new().with_method("speak", |mut call| {
//!         let quiet = call.parent(&[])?;
//!         Ok(Value::from(format!("woof (not {quiet})")))
//!     }))
//!     .build();
//!
//! let mut rex = dog.instantiate(&[]).unwrap();
//! assert_eq!(rex.get("legs"), Some(&Value::Integer(4)));
//! assert_eq!(rex.call("speak", &[]).unwrap(), Value::from("woof (not ...)"));
//! assert!(rex.instance_of(&animal));
//! ```

#![warn(clippy::all)]

pub mod call;
pub mod class;
pub mod instance;
pub mod members;
pub mod registry;
pub mod state;
pub mod value;

// Re-export commonly used types
pub use call::Call;
pub use class::{Ancestry, Blueprint, Class, ClassBuilder, ClassId, Structure, CONSTRUCTOR};
pub use instance::Instance;
pub use members::{copy_members, inherit, Combiner, Members};
pub use registry::Registry;
pub use state::StateCell;
pub use value::{Method, Value};

/// Lineage version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for lineage components
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lineage_core=info".parse().unwrap()),
        )
        .init();
}

/// Error types for class definition, composition, and dispatch
#[derive(thiserror::Error, Debug)]
pub enum ClassError {
    /// Member lookup failed on an instance
    #[error("Member '{member}' not found on instance of {class}")]
    UnknownMember { member: String, class: String },

    /// A non-method member was dispatched as a method
    #[error("Member '{member}' on {class} is not callable (got {actual})")]
    NotCallable {
        member: String,
        class: String,
        actual: &'static str,
    },

    /// `Call::parent` was used where no ancestor level defines the method
    #[error("Method '{method}' has no inherited implementation to call")]
    NoParentMethod { method: String },

    /// A method asked for private state but its level declared none
    #[error("Method '{method}' has no private state")]
    MissingState { method: String },

    /// Private state was accessed as the wrong record type
    #[error("Private state is not a '{expected}'")]
    StateType { expected: &'static str },

    /// A structure producer failed while realizing a class level
    #[error("Structure error: {0}")]
    Structure(#[from] anyhow::Error),
}

/// Result type for lineage operations
pub type Result<T> = std::result::Result<T, ClassError>;
