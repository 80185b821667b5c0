// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Subnet partitioning and tier chain ordering, checked over generated
//! address blocks and layouts.

mod parameter_registry;
mod subnet_partition;
mod tier_chain;
