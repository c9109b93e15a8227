//! 班级偏好存储
//!
//! 按用户保存班级的显示颜色与排序，对应前端的 localStorage 键
//! `classroomPreferences_{userId}`。偏好只影响本地显示，与服务端无关。
//!
//! 状态机：`未初始化 -> 已加载(用户)`，切换用户时重新从存储加载。
//! 每次修改都会同步持久化整个偏好对象；存储或解析失败只记录日志，不向上传播。

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::storage::LocalStore;

const STORAGE_KEY_PREFIX: &str = "classroomPreferences_";

/// 生成用户偏好的存储键
pub fn storage_key(user_id: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{user_id}")
}

// ============================================================
// 数据结构
// ============================================================

/// 持久化的偏好对象
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomPreference {
    /// 班级 ID -> 颜色（十六进制）
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// 班级 ID 排序，元素始终为字符串
    #[serde(default, deserialize_with = "deserialize_order")]
    pub order: Vec<String>,
}

/// 兼容旧数据：排序数组中可能存在数字 ID 或对象
fn deserialize_order<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    Ok(raw.iter().filter_map(ClassroomKey::classroom_id).collect())
}

/// 可以提取班级 ID 的值
///
/// 既支持原始 ID（数字、字符串），也支持带 `id` 字段的班级对象。
pub trait ClassroomKey {
    fn classroom_id(&self) -> Option<String>;
}

impl ClassroomKey for i64 {
    fn classroom_id(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ClassroomKey for str {
    fn classroom_id(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ClassroomKey for String {
    fn classroom_id(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl ClassroomKey for serde_json::Value {
    fn classroom_id(&self) -> Option<String> {
        match self {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Object(map) => map.get("id").and_then(|id| id.classroom_id()),
            _ => None,
        }
    }
}

impl<T: ClassroomKey + ?Sized> ClassroomKey for &T {
    fn classroom_id(&self) -> Option<String> {
        (**self).classroom_id()
    }
}

// ============================================================
// ClassroomPreferences - 偏好服务
// ============================================================

#[derive(Debug, Default)]
struct LoadedState {
    user_id: Option<String>,
    preference: ClassroomPreference,
}

/// 班级偏好服务
pub struct ClassroomPreferences {
    store: Arc<dyn LocalStore>,
    state: RwLock<LoadedState>,
}

impl ClassroomPreferences {
    /// 创建未初始化的偏好服务
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            state: RwLock::new(LoadedState::default()),
        }
    }

    /// 当前加载的用户
    pub fn current_user(&self) -> Option<String> {
        self.state.read().user_id.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().user_id.is_some()
    }

    /// 为指定用户加载偏好
    ///
    /// 用户未变化时不重复加载。存储中的数据损坏时重置为空偏好。
    pub fn load_for_user(&self, user_id: &str) {
        if self.state.read().user_id.as_deref() == Some(user_id) {
            return;
        }

        let preference = self.read_from_store(user_id);
        let mut state = self.state.write();
        state.user_id = Some(user_id.to_string());
        state.preference = preference;
    }

    /// 回到未初始化状态（用户登出）
    pub fn clear_user(&self) {
        let mut state = self.state.write();
        state.user_id = None;
        state.preference = ClassroomPreference::default();
    }

    /// 当前偏好的快照
    pub fn snapshot(&self) -> ClassroomPreference {
        self.state.read().preference.clone()
    }

    // ========== 颜色 ==========

    pub fn set_classroom_color(&self, classroom_id: impl ClassroomKey, color: &str) {
        let Some(id) = classroom_id.classroom_id() else {
            return;
        };
        self.mutate(|pref| {
            pref.colors.insert(id, color.to_string());
        });
    }

    pub fn classroom_color(&self, classroom_id: impl ClassroomKey) -> Option<String> {
        let id = classroom_id.classroom_id()?;
        self.state.read().preference.colors.get(&id).cloned()
    }

    // ========== 排序 ==========

    /// 更新排序
    ///
    /// 输入可以是班级对象或原始 ID，统一转换为字符串 ID 数组；无法识别的元素被忽略。
    pub fn update_order<T: ClassroomKey>(&self, classrooms: &[T]) {
        let order: Vec<String> = classrooms
            .iter()
            .filter_map(ClassroomKey::classroom_id)
            .collect();
        self.mutate(|pref| pref.order = order);
    }

    pub fn classroom_order(&self) -> Vec<String> {
        self.state.read().preference.order.clone()
    }

    /// 按保存的顺序排列班级
    ///
    /// 已知 ID 按保存位置排序；未知 ID 排在所有已知 ID 之后，并保持原有相对顺序。
    pub fn sort_classrooms<T: ClassroomKey + Clone>(&self, classrooms: &[T]) -> Vec<T> {
        let state = self.state.read();
        sort_by_order(&state.preference.order, classrooms)
    }

    // ========== 内部方法 ==========

    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut ClassroomPreference),
    {
        let mut state = self.state.write();
        let Some(user_id) = state.user_id.clone() else {
            tracing::warn!("classroom preferences changed before a user was loaded, ignoring");
            return;
        };

        f(&mut state.preference);

        if let Err(e) = self
            .store
            .set_json(&storage_key(&user_id), &state.preference)
        {
            tracing::error!(user_id = %user_id, error = %e, "failed to persist classroom preferences");
        }
    }

    fn read_from_store(&self, user_id: &str) -> ClassroomPreference {
        match self.store.get_json::<ClassroomPreference>(&storage_key(user_id)) {
            Ok(Some(preference)) => preference,
            Ok(None) => ClassroomPreference::default(),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "stored classroom preferences unreadable, using defaults");
                ClassroomPreference::default()
            }
        }
    }
}

/// 稳定排序：已知 ID 按位置，未知 ID 置后
pub fn sort_by_order<T: ClassroomKey + Clone>(order: &[String], classrooms: &[T]) -> Vec<T> {
    // 重复 ID 以首次出现的位置为准
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    for (i, id) in order.iter().enumerate() {
        position.entry(id.as_str()).or_insert(i);
    }

    let mut keyed: Vec<(usize, &T)> = classrooms
        .iter()
        .map(|c| {
            let rank = c
                .classroom_id()
                .and_then(|id| position.get(id.as_str()).copied())
                .unwrap_or(usize::MAX);
            (rank, c)
        })
        .collect();

    // sort_by_key 为稳定排序，未知 ID 之间保持输入顺序
    keyed.sort_by_key(|(rank, _)| *rank);
    keyed.into_iter().map(|(_, c)| c.clone()).collect()
}
