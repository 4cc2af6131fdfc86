pub mod fs;

pub use fs::{is_dynamic_library, is_private_name, sorted_entries};

#[cfg(test)]
mod tests;
