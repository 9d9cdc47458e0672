//! Errors raised while assembling a model.
//!
//! These are returned wrapped in [`anyhow::Error`] like every other error in the program, but are
//! kept as a distinct type so that callers (and tests) can tell what went wrong with
//! [`anyhow::Error::downcast_ref`]. Components are named by plain strings so that the error is
//! `Send` and `Sync`, as `anyhow` requires.
/// An error in the construction of the optimisation problem
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum ModelError {
    /// A mandatory set or parameter has no value for a required index
    #[display("Missing data for {name}: no value for {index}")]
    MissingData {
        /// The name of the set or parameter
        name: String,
        /// The index which has no value
        index: String,
    },
    /// A component was registered after the registration phase had ended
    #[display("Cannot register {component} with {list}: the list has been frozen")]
    RegistrationAfterFreeze {
        /// The list the component was to be registered with
        list: &'static str,
        /// The component
        component: String,
    },
    /// A component was registered twice with the same list
    #[display("{component} has already been registered with {list}")]
    DuplicateRegistration {
        /// The list the component was registered with
        list: &'static str,
        /// The component
        component: String,
    },
    /// Two quantities were defined with the same name
    #[display("A quantity called {_0} has already been defined")]
    DuplicateQuantity(String),
    /// A registered component does not refer to any defined quantity
    #[display("{component} is registered with {list} but no such quantity has been defined")]
    UndefinedComponent {
        /// The list the component was registered with
        list: &'static str,
        /// The component
        component: String,
    },
    /// A registry was read before the registration phase ended
    #[display("{_0} cannot be read until registration has finished")]
    RegistryNotFrozen(&'static str),
    /// A module requires the distributed bus, but the model was built without one
    #[display("{_0} requires a distributed bus, but the model does not have one")]
    NoDistributedBus(String),
}

impl std::error::Error for ModelError {}

impl ModelError {
    /// Convenience constructor for [`ModelError::MissingData`]
    pub fn missing_data(name: impl Into<String>, index: impl std::fmt::Display) -> Self {
        Self::MissingData {
            name: name.into(),
            index: index.to_string(),
        }
    }
}
