// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

pub mod binding;
pub mod channel;
pub mod declaration;
pub mod errors;
pub mod exchange;
pub mod queue;
