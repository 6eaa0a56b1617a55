// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Error Types for the Declaration Protocol
//!
//! This module provides the error types for AMQP topology operations.
//! The `AmqpError` enum covers connection and channel setup as well as
//! queue, exchange, and binding declarations. Declaration variants carry the
//! underlying transport error unmodified, so callers can inspect the broker
//! failure that caused them.

use thiserror::Error;

/// Represents errors that can occur during AMQP topology operations.
///
/// Passive declarations surface entity absence through the same declare
/// variants as any other broker rejection; the protocol does not distinguish
/// "not found" from other causes.
#[derive(Error, Debug)]
pub enum AmqpError {
    /// Error establishing a connection to the RabbitMQ server
    #[error("failure to connect")]
    ConnectionError(#[source] lapin::Error),

    /// Error creating a channel from an established connection
    #[error("failure to create a channel")]
    ChannelError(#[source] lapin::Error),

    /// Error declaring a queue with the given name
    #[error("failure to declare a queue `{name}`")]
    DeclareQueueError {
        name: String,
        #[source]
        source: lapin::Error,
    },

    /// Error declaring an exchange with the given name
    #[error("failure to declare an exchange `{name}`")]
    DeclareExchangeError {
        name: String,
        #[source]
        source: lapin::Error,
    },

    /// Error binding a queue to an exchange
    #[error("failure to bind queue `{queue}` to exchange `{exchange}`")]
    BindQueueError {
        queue: String,
        exchange: String,
        #[source]
        source: lapin::Error,
    },
}
