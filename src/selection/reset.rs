//! # 字段重置广播
//!
//! ## 设计思路
//!
//! 宿主表单的“恢复保存值”按钮会广播一个带字段标识的事件，所有字段组件都会收到。
//! 这里提供显式订阅：订阅时登记字段标识作为过滤条件，只有标识匹配的处理器会被调用。
//!
//! ## 实现思路
//!
//! - 订阅返回 `ResetSubscription` 守卫，`Drop` 时自动退订（组件销毁即退订）。
//! - 订阅表用 `Arc<Mutex<..>>` 共享，守卫只持有弱引用，广播对象先销毁也不会出错。
//! - 广播时先取出匹配的处理器再调用，处理器内部可以安全地再订阅/退订。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

type ResetHandler = Arc<dyn Fn() + Send + Sync>;

struct Subscriber {
    field_id: String,
    handler: ResetHandler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<u64, Subscriber>,
}

/// 字段重置事件的广播中心。
#[derive(Clone, Default)]
pub struct ResetBroadcast {
    registry: Arc<Mutex<Registry>>,
}

impl ResetBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅指定字段的重置事件。
    ///
    /// # 示例
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use imageplus_input::selection::ResetBroadcast;
    ///
    /// let bus = ResetBroadcast::new();
    /// let hits = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&hits);
    /// let _subscription = bus.subscribe("12", move || {
    ///     counter.fetch_add(1, Ordering::SeqCst);
    /// });
    ///
    /// bus.broadcast("12");
    /// bus.broadcast("13");
    /// assert_eq!(hits.load(Ordering::SeqCst), 1);
    /// ```
    pub fn subscribe<F>(&self, field_id: impl Into<String>, handler: F) -> ResetSubscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let field_id = field_id.into();
        let mut registry = match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        registry.next_id += 1;
        let id = registry.next_id;
        log::debug!("🔔 订阅字段重置事件 - 字段: {} 订阅号: {}", field_id, id);
        registry.subscribers.insert(
            id,
            Subscriber {
                field_id,
                handler: Arc::new(handler),
            },
        );

        ResetSubscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// 广播重置事件，返回被调用的处理器数量。
    pub fn broadcast(&self, field_id: &str) -> usize {
        let handlers: Vec<ResetHandler> = {
            let registry = match self.registry.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            registry
                .subscribers
                .values()
                .filter(|s| s.field_id == field_id)
                .map(|s| Arc::clone(&s.handler))
                .collect()
        };

        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        match self.registry.lock() {
            Ok(guard) => guard.subscribers.len(),
            Err(poisoned) => poisoned.into_inner().subscribers.len(),
        }
    }
}

/// 订阅守卫，离开作用域时自动退订。
pub struct ResetSubscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl ResetSubscription {
    /// 显式退订，等价于 `drop`。
    pub fn unsubscribe(self) {}
}

impl Drop for ResetSubscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = match registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if registry.subscribers.remove(&self.id).is_some() {
            log::debug!("🔕 已退订字段重置事件 - 订阅号: {}", self.id);
        }
    }
}
