/// Browser-side bindings to the host page
pub mod page;
pub mod waiter;

pub use page::BrowserPage;
