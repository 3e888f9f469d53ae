pub mod auth;
pub mod codec;
pub mod firestore;

pub use auth::FirebaseAuthClient;
pub use firestore::FirestoreClient;
