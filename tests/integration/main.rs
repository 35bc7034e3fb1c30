//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one layer of the
//! dispatcher against mock adapters.  Nothing here needs a robot.

mod fake_robot;
mod session_tests;
