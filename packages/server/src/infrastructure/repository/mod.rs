//! Repository 実装
//!
//! - `inmemory`: プロセス内の HashMap を使った実装
//! - 永続化はしない（プロセス再起動でルームは消える）

pub mod inmemory;

pub use inmemory::{InMemoryConnectionRegistry, InMemoryRoomRepository};
