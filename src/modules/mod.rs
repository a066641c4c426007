pub mod books;

use bookshelf_db::Store;
use bookshelf_kernel::{settings::Settings, ModuleRegistry};

/// Register all resource modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: &Store, settings: &Settings) {
    registry.register_custom(books::create_module(store, settings));
}
