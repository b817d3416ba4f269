//! Tests for the consensus module.
//!
//! - `engine_tests`: `ConsensusEngine` reduction and report bookkeeping
//! - Unit tests for the reducers are in their respective modules
