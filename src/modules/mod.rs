pub mod books;

use bookstore_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, books_store: books::SharedStore) {
    registry.register(books::create_module(books_store));
}
