// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Queue-to-Exchange Bindings
//!
//! A binding is a routing rule associating a queue with an exchange under a
//! routing key. Bindings hold shared references to their queue and exchange
//! so that declaration always resolves the queue's current name, which for a
//! server-named queue is only known once the queue itself has been declared
//! in the same connection epoch.

use crate::{exchange::Exchange, queue::Queue};
use lapin::types::{AMQPValue, ShortString};
use std::{collections::BTreeMap, sync::Arc};

/// A routing rule between a queue and an exchange.
///
/// This struct implements the builder pattern to create and configure
/// bindings. The queue and exchange must be declared before the binding in
/// the same connection epoch.
#[derive(Debug, Clone)]
pub struct Binding {
    pub(crate) queue: Arc<Queue>,
    pub(crate) exchange: Arc<Exchange>,
    pub(crate) routing_key: String,
    pub(crate) args: BTreeMap<ShortString, AMQPValue>,
}

impl Binding {
    /// Creates a new binding between the given queue and exchange.
    ///
    /// By default, the routing key is empty and should be set with the
    /// `routing_key` method for exchange types that route by key.
    ///
    /// # Parameters
    /// * `queue` - The queue to bind
    /// * `exchange` - The exchange to bind it to
    ///
    /// # Returns
    /// A new binding with default settings
    pub fn new(queue: Arc<Queue>, exchange: Arc<Exchange>) -> Binding {
        Binding {
            queue,
            exchange,
            routing_key: String::new(),
            args: BTreeMap::default(),
        }
    }

    /// Sets the routing key for the binding.
    ///
    /// # Parameters
    /// * `key` - The routing key
    ///
    /// # Returns
    /// Self for method chaining
    pub fn routing_key(mut self, key: &str) -> Self {
        self.routing_key = key.to_owned();
        self
    }

    /// Sets the binding arguments.
    ///
    /// Arguments are forwarded to the broker as-is.
    ///
    /// # Parameters
    /// * `args` - A map of binding arguments
    ///
    /// # Returns
    /// Self for method chaining
    pub fn arguments(mut self, args: BTreeMap<ShortString, AMQPValue>) -> Self {
        self.args = args;
        self
    }
}
