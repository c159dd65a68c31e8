//! Property-based tests for the coalescer building blocks.

mod sequence_props;
mod throttle_props;
