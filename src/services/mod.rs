pub mod credentials;
pub mod firestore;
pub mod firestore_value;

pub use firestore::FirestoreClient;
