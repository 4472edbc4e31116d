//! Process-wide generators and validators per field kind
//!
//! Installed once during startup and read by every field of the kind. A
//! field's own generator takes precedence over the global one; global
//! validators run before the field's own.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{FieldKind, Generator, Validator};

#[derive(Default)]
struct GlobalRegistry {
    generators: HashMap<FieldKind, Generator>,
    validators: HashMap<FieldKind, Vec<Validator>>,
}

static GLOBALS: LazyLock<RwLock<GlobalRegistry>> =
    LazyLock::new(|| RwLock::new(GlobalRegistry::default()));

pub(crate) fn set_generator(kind: FieldKind, generator: Generator) {
    let kind_name = kind.to_string();
    GLOBALS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .generators
        .insert(kind, generator);
    log_event_with_fields(Event::GlobalGeneratorSet, &[("kind", &kind_name)]);
}

pub(crate) fn add_validator(kind: FieldKind, validator: Validator) {
    let kind_name = kind.to_string();
    let validator_name = validator.name().to_string();
    GLOBALS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .validators
        .entry(kind)
        .or_default()
        .push(validator);
    log_event_with_fields(
        Event::GlobalValidatorSet,
        &[("kind", &kind_name), ("validator", &validator_name)],
    );
}

pub(crate) fn generator(kind: &FieldKind) -> Option<Generator> {
    GLOBALS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .generators
        .get(kind)
        .cloned()
}

pub(crate) fn validators(kind: &FieldKind) -> Vec<Validator> {
    GLOBALS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .validators
        .get(kind)
        .cloned()
        .unwrap_or_default()
}

pub(crate) fn reset() {
    *GLOBALS.write().unwrap_or_else(|e| e.into_inner()) = GlobalRegistry::default();
}
