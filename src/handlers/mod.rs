pub mod body;
pub mod events;

pub use body::EventBody;
pub use events::{create_event, delete_event, list_events, missing_event_id, update_event};
