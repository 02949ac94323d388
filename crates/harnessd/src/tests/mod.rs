//! Test suites for the harness server.

mod socket_behaviour;
mod support;
