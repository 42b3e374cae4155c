// Text processing — reference dictionary and token normalization.

pub mod dictionary;
pub mod normalizer;

pub use dictionary::Dictionary;
pub use normalizer::TextNormalizer;
