//! Observability subsystem for aeromodel
//!
//! Structured JSON logging of lifecycle events. Logging is read-only:
//! it never changes the outcome of the operation being observed.
//!
//! ```ignore
//! use aeromodel::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ModelMade, &[("model", "User")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Verifies no panic
        log_event(Event::SchemasLoaded);
        log_event_with_fields(Event::ModelMade, &[("model", "User")]);
    }
}
