use std::fmt;

/// A weighted link to a later neuron in a
/// network's evaluation order.
#[derive(Clone, Copy, PartialEq)]
pub struct Connection {
    pub target: usize,
    pub weight: f32,
}

impl Connection {
    /// Creates a new Connection with the specified
    /// target position and weight.
    pub fn new(target: usize, weight: f32) -> Connection {
        Connection { target, weight }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "->{} {:.6}", self.target, self.weight)
    }
}
