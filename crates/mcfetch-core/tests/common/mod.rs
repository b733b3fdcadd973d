//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod rancher_server;
