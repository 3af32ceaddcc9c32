mod inconsistency;
mod random;

pub use inconsistency::*;
pub use random::Random;
#[cfg(test)]
pub(crate) use random::tests::TestRandom;
