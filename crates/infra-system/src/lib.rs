// Locus Infrastructure - System Adapters
// Implements: ProcessRunner, ProcessTable, ProgramLocator, ImageCatalog

pub mod image_catalog_impl;
pub mod path_locator;
pub mod process_table_impl;
pub mod subprocess_runner;

pub use image_catalog_impl::FsImageCatalog;
pub use path_locator::PathLocator;
pub use process_table_impl::SysinfoProcessTable;
pub use subprocess_runner::SubprocessRunner;
