//! インメモリ実装

pub mod connection;
pub mod room;

pub use connection::InMemoryConnectionRegistry;
pub use room::InMemoryRoomRepository;
