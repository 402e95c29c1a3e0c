pub mod mock;
pub mod poll_adapter;

pub use mock::MockAdapter;
pub use poll_adapter::PollAdapter;
