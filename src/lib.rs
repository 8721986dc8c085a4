pub mod ast;
pub mod dynamic;
pub mod error;
pub mod format;
pub mod functions;
pub mod key_lookup;
pub mod literal;
pub mod typed;

#[cfg(test)]
pub mod tests;
