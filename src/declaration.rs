// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Idempotent Topology Declarations
//!
//! This module provides the declaration protocol used to (re)establish AMQP
//! topology against a connection that may be torn down and reconnected at
//! any time. A [`Declaration`] is a reusable unit of deferred work built
//! from a queue, exchange, or binding; applying it performs one topology
//! operation against a [`Declarer`].
//!
//! Declarations are built once, before any connection exists, and applied
//! once per connection epoch, typically by a reconnect loop. Queues and
//! exchanges must be applied before the bindings that reference them.

use crate::{
    binding::Binding,
    errors::AmqpError,
    exchange::{Exchange, ExchangeKind},
    queue::Queue,
};
use async_trait::async_trait;
use lapin::types::FieldTable;
use std::sync::Arc;

/// The set of broker operations the declaration protocol needs.
///
/// The production implementation adapts `lapin::Channel`; tests substitute a
/// stub. Every operation is a single blocking round trip to the broker with
/// no internal timeout or retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Declarer: Send + Sync {
    /// Declares a queue, creating it if absent.
    ///
    /// An empty name asks the broker to assign one. The returned name is
    /// authoritative, whether assigned or echoed back.
    async fn declare_queue(
        &self,
        name: &str,
        durable: bool,
        auto_delete: bool,
        exclusive: bool,
        args: FieldTable,
    ) -> Result<String, AmqpError>;

    /// Declares an exchange, creating it if absent.
    async fn declare_exchange(
        &self,
        name: &str,
        kind: ExchangeKind,
        durable: bool,
        auto_delete: bool,
        args: FieldTable,
    ) -> Result<(), AmqpError>;

    /// Binds a queue to an exchange under a routing key.
    async fn bind_queue(
        &self,
        queue_name: &str,
        routing_key: &str,
        exchange_name: &str,
        args: FieldTable,
    ) -> Result<(), AmqpError>;

    /// Checks that a queue already exists, without asserting its properties.
    async fn declare_queue_passive(
        &self,
        name: &str,
        durable: bool,
        auto_delete: bool,
        exclusive: bool,
        args: FieldTable,
    ) -> Result<String, AmqpError>;

    /// Checks that an exchange already exists, without asserting its
    /// properties.
    async fn declare_exchange_passive(
        &self,
        name: &str,
        kind: ExchangeKind,
        durable: bool,
        auto_delete: bool,
        args: FieldTable,
    ) -> Result<(), AmqpError>;
}

enum Op {
    Queue {
        queue: Arc<Queue>,
        // Pinned at build time; every application re-sends this name, never
        // the one the broker generated on a previous connection.
        requested_name: String,
    },
    QueuePassive {
        queue: Arc<Queue>,
    },
    Exchange {
        exchange: Arc<Exchange>,
    },
    ExchangePassive {
        exchange: Arc<Exchange>,
    },
    Binding {
        binding: Binding,
    },
}

/// A reusable unit of topology declaration work.
///
/// Built from an entity by one of the declaration functions in this module
/// and applied by the orchestrator once per connection epoch. Applying a
/// declaration any number of times re-asserts the same logical request; all
/// state lives in the entity it was built from.
pub struct Declaration {
    op: Op,
}

impl Declaration {
    /// Performs the declaration against the given declarer.
    ///
    /// Errors from the declarer are returned verbatim and leave the entity
    /// state unchanged; retry policy belongs to the caller.
    pub async fn apply(&self, declarer: &dyn Declarer) -> Result<(), AmqpError> {
        match &self.op {
            Op::Queue {
                queue,
                requested_name,
            } => {
                let resolved = declarer
                    .declare_queue(
                        requested_name,
                        queue.durable,
                        queue.auto_delete,
                        queue.exclusive,
                        FieldTable::from(queue.args.clone()),
                    )
                    .await?;
                queue.update_name(resolved);
                Ok(())
            }
            Op::QueuePassive { queue } => {
                // Existence check only: the name the broker echoes back is
                // not applied to the queue.
                let name = queue.name();
                declarer
                    .declare_queue_passive(
                        &name,
                        queue.durable,
                        queue.auto_delete,
                        queue.exclusive,
                        FieldTable::from(queue.args.clone()),
                    )
                    .await?;
                Ok(())
            }
            Op::Exchange { exchange } => {
                declarer
                    .declare_exchange(
                        &exchange.name,
                        exchange.kind,
                        exchange.durable,
                        exchange.auto_delete,
                        FieldTable::from(exchange.args.clone()),
                    )
                    .await
            }
            Op::ExchangePassive { exchange } => {
                declarer
                    .declare_exchange_passive(
                        &exchange.name,
                        exchange.kind,
                        exchange.durable,
                        exchange.auto_delete,
                        FieldTable::from(exchange.args.clone()),
                    )
                    .await
            }
            Op::Binding { binding } => {
                // Resolved at application time: the queue may have been
                // renamed by its own declaration earlier in the same batch.
                let queue_name = binding.queue.name();
                declarer
                    .bind_queue(
                        &queue_name,
                        &binding.routing_key,
                        &binding.exchange.name,
                        FieldTable::from(binding.args.clone()),
                    )
                    .await
            }
        }
    }
}

/// Builds the declaration for a queue.
///
/// The requested name is captured here, at build time. A successful
/// application updates the queue's current name from the broker reply.
pub fn queue_declaration(queue: Arc<Queue>) -> Declaration {
    let requested_name = queue.requested_name.clone();
    Declaration {
        op: Op::Queue {
            queue,
            requested_name,
        },
    }
}

/// Builds the declaration for an exchange.
pub fn exchange_declaration(exchange: Arc<Exchange>) -> Declaration {
    Declaration {
        op: Op::Exchange { exchange },
    }
}

/// Builds the declaration for a queue-to-exchange binding.
///
/// The binding resolves the queue's current name each time it is applied.
pub fn binding_declaration(binding: Binding) -> Declaration {
    Declaration {
        op: Op::Binding { binding },
    }
}

/// Builds the passive declaration for a queue.
///
/// Applying it only checks that a queue with the current name exists; it
/// never updates the queue's name.
pub fn queue_passive_declaration(queue: Arc<Queue>) -> Declaration {
    Declaration {
        op: Op::QueuePassive { queue },
    }
}

/// Builds the passive declaration for an exchange.
pub fn exchange_passive_declaration(exchange: Arc<Exchange>) -> Declaration {
    Declaration {
        op: Op::ExchangePassive { exchange },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queue_declaration_requests_the_same_fixed_name_on_every_call() {
        let queue = Arc::new(Queue::new("orders"));

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_queue()
            .withf(|name, _, _, _, _| name == "orders")
            .times(2)
            .returning(|name, _, _, _, _| Ok(name.to_owned()));

        let declaration = queue_declaration(Arc::clone(&queue));

        declaration.apply(&declarer).await.unwrap();
        assert_eq!(queue.name(), "orders");

        declaration.apply(&declarer).await.unwrap();
        assert_eq!(queue.name(), "orders");
    }

    #[tokio::test]
    async fn server_named_queue_asks_for_a_fresh_name_after_reconnect() {
        let queue = Arc::new(Queue::new(""));

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_queue()
            .withf(|name, _, _, _, _| name.is_empty())
            .times(2)
            .returning(|_, _, _, _, _| Ok("amq.gen-JzTY20BRgKO-HjmUJj0wLg".to_owned()));

        let declaration = queue_declaration(Arc::clone(&queue));

        declaration.apply(&declarer).await.unwrap();
        assert_eq!(queue.name(), "amq.gen-JzTY20BRgKO-HjmUJj0wLg");

        // reconnect: the request must carry the empty name again, not the
        // name the broker generated for the previous connection
        declaration.apply(&declarer).await.unwrap();
        assert_eq!(queue.name(), "amq.gen-JzTY20BRgKO-HjmUJj0wLg");
    }

    #[tokio::test]
    async fn queue_declaration_forwards_the_queue_properties() {
        let queue = Arc::new(Queue::new("jobs").durable().exclusive());

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_queue()
            .withf(|name, durable, auto_delete, exclusive, _| {
                name == "jobs" && *durable && !*auto_delete && *exclusive
            })
            .times(1)
            .returning(|name, _, _, _, _| Ok(name.to_owned()));

        queue_declaration(queue).apply(&declarer).await.unwrap();
    }

    #[tokio::test]
    async fn binding_resolves_the_queue_name_current_at_each_application() {
        let queue = Arc::new(Queue::new(""));
        let exchange = Arc::new(Exchange::new("events").fanout());
        let binding = Binding::new(Arc::clone(&queue), Arc::clone(&exchange));

        let mut declarer = MockDeclarer::new();
        let mut epoch = 0;
        declarer
            .expect_declare_queue()
            .times(2)
            .returning(move |_, _, _, _, _| {
                epoch += 1;
                Ok(format!("amq.gen-{epoch}"))
            });
        declarer
            .expect_bind_queue()
            .withf(|queue_name, _, exchange_name, _| {
                queue_name == "amq.gen-1" && exchange_name == "events"
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        declarer
            .expect_bind_queue()
            .withf(|queue_name, _, _, _| queue_name == "amq.gen-2")
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let declare_queue = queue_declaration(Arc::clone(&queue));
        let declare_binding = binding_declaration(binding);

        declare_queue.apply(&declarer).await.unwrap();
        declare_binding.apply(&declarer).await.unwrap();

        declare_queue.apply(&declarer).await.unwrap();
        declare_binding.apply(&declarer).await.unwrap();
    }

    #[tokio::test]
    async fn passive_queue_declaration_checks_the_current_name() {
        let queue = Arc::new(Queue::new(""));
        queue.update_name("amq.gen-existing".to_owned());

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_queue_passive()
            .withf(|name, _, _, _, _| name == "amq.gen-existing")
            .times(1)
            .returning(|name, _, _, _, _| Ok(name.to_owned()));

        queue_passive_declaration(queue)
            .apply(&declarer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn passive_queue_declaration_never_updates_the_name() {
        let queue = Arc::new(Queue::new("orders"));

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_queue_passive()
            .times(1)
            .returning(|_, _, _, _, _| Ok("something-entirely-different".to_owned()));

        queue_passive_declaration(Arc::clone(&queue))
            .apply(&declarer)
            .await
            .unwrap();

        assert_eq!(queue.name(), "orders");
    }

    #[tokio::test]
    async fn declarer_errors_propagate_and_leave_the_queue_untouched() {
        let queue = Arc::new(Queue::new(""));
        queue.update_name("amq.gen-previous".to_owned());

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_queue()
            .times(1)
            .returning(|name, _, _, _, _| {
                Err(AmqpError::DeclareQueueError {
                    name: name.to_owned(),
                    source: lapin::Error::ChannelsLimitReached,
                })
            });

        let declaration = queue_declaration(Arc::clone(&queue));
        let err = declaration.apply(&declarer).await.unwrap_err();

        assert!(matches!(
            err,
            AmqpError::DeclareQueueError { ref name, .. } if name.is_empty()
        ));
        assert_eq!(queue.name(), "amq.gen-previous");
    }

    #[tokio::test]
    async fn exchange_declaration_forwards_the_exchange_definition() {
        let exchange = Arc::new(Exchange::new("events").topic().durable());

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_exchange()
            .withf(|name, kind, durable, auto_delete, _| {
                name == "events" && *kind == ExchangeKind::Topic && *durable && !*auto_delete
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));

        exchange_declaration(exchange)
            .apply(&declarer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn passive_exchange_declaration_checks_existence_only() {
        let exchange = Arc::new(Exchange::new("upstream"));

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_declare_exchange_passive()
            .withf(|name, _, _, _, _| name == "upstream")
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));

        exchange_passive_declaration(exchange)
            .apply(&declarer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bind_errors_propagate_verbatim() {
        let queue = Arc::new(Queue::new("orders"));
        let exchange = Arc::new(Exchange::new("events"));
        let binding = Binding::new(queue, exchange).routing_key("orders.created");

        let mut declarer = MockDeclarer::new();
        declarer
            .expect_bind_queue()
            .times(1)
            .returning(|queue_name, _, exchange_name, _| {
                Err(AmqpError::BindQueueError {
                    queue: queue_name.to_owned(),
                    exchange: exchange_name.to_owned(),
                    source: lapin::Error::ChannelsLimitReached,
                })
            });

        let err = binding_declaration(binding)
            .apply(&declarer)
            .await
            .unwrap_err();

        assert!(matches!(err, AmqpError::BindQueueError { .. }));
    }
}
