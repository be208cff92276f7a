pub mod canonicalize;
pub mod hash;
pub mod hash_attach;
pub mod num;
