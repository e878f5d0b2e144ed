// # Parcel Store Implementations
//
// This module provides implementations of the ParcelStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileParcelStore;
pub use memory::MemoryParcelStore;
