pub mod common;
pub mod completions;
pub mod draft;
pub mod enqueue;
pub mod history;
pub mod pet_status;
pub mod queue;
pub mod sheet_id;
pub mod status;
pub mod sync;
pub mod watch;
