//! Places each child directly under the target node, without wrappers.

use super::Strategy;

#[derive(Debug, Default, Clone, Copy)]
pub struct Minimal;

impl Strategy for Minimal {
    fn name(&self) -> &'static str {
        "minimal"
    }
}
