// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory tracing layer for the integration scenarios.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use fixedpoint::alert::ALERT_TARGET;

#[derive(Clone, Debug)]
pub struct Captured {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub sn: Option<u64>,
}

#[derive(Default)]
struct Fields {
    message: String,
    sn: Option<u64>,
}

impl Visit for Fields {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "sn" {
            self.sn = Some(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<Captured>>>);

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let meta = event.metadata();
        self.0.lock().unwrap().push(Captured {
            level: *meta.level(),
            target: meta.target().to_owned(),
            message: fields.message,
            sn: fields.sn,
        });
    }
}

/// Run `f` with a capturing subscriber; returns its result and every event.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<Captured>) {
    let layer = Capture::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let ret = tracing::subscriber::with_default(subscriber, f);
    let events = layer.0.lock().unwrap().clone();
    (ret, events)
}

/// Messages of the warnings emitted on the alert target, in order.
pub fn warnings(events: &[Captured]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.target == ALERT_TARGET && e.level == Level::WARN)
        .map(|e| e.message.clone())
        .collect()
}
