// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Queue Management for RabbitMQ
//!
//! This module provides the queue entity used by the declaration protocol.
//! A queue keeps two names: the name the application requested at
//! construction time and the name the broker currently knows the queue by.
//! For a server-named queue (empty requested name) the two diverge after the
//! first declaration, and the current name is re-resolved on every reconnect.

use lapin::types::{AMQPValue, ShortString};
use std::{collections::BTreeMap, sync::Mutex};

/// An AMQP queue with its configuration parameters.
///
/// This struct implements the builder pattern to create and configure queues.
/// An empty name asks the broker to assign one on declaration. Queues are
/// meant to be shared (`Arc<Queue>`) between their declaration, any bindings
/// that reference them, and consumer startup code.
#[derive(Debug, Default)]
pub struct Queue {
    pub(crate) requested_name: String,
    // Written only by a successful non-passive declaration.
    pub(crate) current_name: Mutex<String>,
    pub(crate) durable: bool,
    pub(crate) auto_delete: bool,
    pub(crate) exclusive: bool,
    pub(crate) args: BTreeMap<ShortString, AMQPValue>,
}

impl Queue {
    /// Creates a new queue with the given name.
    ///
    /// By default, the queue is created with standard settings (non-durable,
    /// non-exclusive, etc.)
    ///
    /// # Parameters
    /// * `name` - The name of the queue; empty to let the broker assign one
    ///
    /// # Returns
    /// A new queue with default settings
    pub fn new(name: &str) -> Queue {
        Queue {
            requested_name: name.to_owned(),
            current_name: Mutex::new(name.to_owned()),
            durable: false,
            auto_delete: false,
            exclusive: false,
            args: BTreeMap::default(),
        }
    }

    /// Makes the queue durable, persisting across broker restarts.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn durable(mut self) -> Self {
        self.durable = true;
        self
    }

    /// Sets the queue to auto-delete when no longer used.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn auto_delete(mut self) -> Self {
        self.auto_delete = true;
        self
    }

    /// Makes the queue exclusive to the connection.
    ///
    /// Exclusive queues are deleted when the connection closes.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Sets the queue arguments.
    ///
    /// Arguments are forwarded to the broker as-is.
    ///
    /// # Parameters
    /// * `args` - A map of queue arguments
    ///
    /// # Returns
    /// Self for method chaining
    pub fn arguments(mut self, args: BTreeMap<ShortString, AMQPValue>) -> Self {
        self.args = args;
        self
    }

    /// Adds a single argument to the queue.
    ///
    /// # Parameters
    /// * `key` - The argument name
    /// * `value` - The argument value
    ///
    /// # Returns
    /// Self for method chaining
    pub fn argument(mut self, key: ShortString, value: AMQPValue) -> Self {
        self.args.insert(key, value);
        self
    }

    /// The name the application asked for at construction time.
    ///
    /// Empty for server-named queues.
    pub fn requested_name(&self) -> &str {
        &self.requested_name
    }

    /// The name the broker currently knows this queue by.
    ///
    /// Equals the requested name until the first successful declaration
    /// resolves it. Bindings and consumers must use this name.
    pub fn name(&self) -> String {
        self.current_name
            .lock()
            .expect("queue name mutex poisoned")
            .clone()
    }

    pub(crate) fn update_name(&self, name: String) {
        *self
            .current_name
            .lock()
            .expect("queue name mutex poisoned") = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn name_equals_requested_name_before_any_declaration() {
        let queue = Queue::new("orders").durable().exclusive();

        assert_eq!(queue.requested_name(), "orders");
        assert_eq!(queue.name(), "orders");
    }

    #[test]
    fn concurrent_readers_never_observe_a_torn_name() {
        let queue = Arc::new(Queue::new(""));
        queue.update_name("amq.gen-initial".to_owned());

        let writer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                for i in 0..1_000 {
                    queue.update_name(format!("amq.gen-{i}"));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let name = queue.name();
                        assert!(name.starts_with("amq.gen-"));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
