//! 本地存储模块
//!
//! 提供客户端本地键值存储，对应浏览器端的 localStorage：
//! - 访问令牌 / 刷新令牌的持久化
//! - 按用户保存的班级偏好（颜色、排序）
//!
//! 两种实现：
//! - [`SqliteStore`]：基于 SQLite 的持久化存储
//! - [`MemoryStore`]：进程内存储（测试、临时会话）

// ============================================================
// 子模块声明
// ============================================================

pub mod memory;
pub mod sqlite;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("锁获取失败: {0}")]
    LockError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// LocalStore - 键值存储接口
// ============================================================

/// 本地键值存储
///
/// 所有值都以字符串形式保存，结构化数据由调用方负责 JSON 编解码。
pub trait LocalStore: Send + Sync {
    /// 读取键对应的值，不存在时返回 `None`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入（覆盖）键值
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 删除键，键不存在时不报错
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// 读取并反序列化 JSON 值
    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// 序列化为 JSON 后写入
    fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        Self: Sized,
    {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.set(key, &raw)
    }
}

impl<S: LocalStore + ?Sized> LocalStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
