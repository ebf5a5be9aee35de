mod event;
mod handler;
mod store;

pub use event::StorageHelper;
pub use handler::StorageHandle;
