//! # 选图核心模块（selection）
//!
//! ## 设计思路
//!
//! 该模块把“浏览器选图 → 尺寸校验 → 初始裁剪 → 编辑器确认 → 字段持久化”
//! 按职责拆分为多个子模块，界面相关的部分全部收敛到 `HostPanel` 接口之后。
//!
//! - `model`：源图、裁剪框、选择状态与回滚快照
//! - `validator`：最小目标尺寸校验（纯函数）
//! - `crop`：按目标宽高比计算初始裁剪框（纯函数）
//! - `codec`：字段值的结构化编解码、旧版纯路径兼容、变更判定
//! - `controller`：状态机，编排以上各部分并触发宿主副作用
//! - `resolver`：异步拉取图片真实尺寸
//! - `editor/thumbnail/reset/host`：编辑器布局、预览地址、重置广播、宿主接口
//!
//! ## 新同事快速上手
//!
//! ```text
//! 宿主事件（选图 / 裁剪确认 / 重置 / 清空 / alt 修改）
//!    ↓
//! controller.rs（状态机）
//!    ├─ validator.rs（尺寸不足 → 回滚 + 提示）
//!    ├─ crop.rs（新图片 → 初始裁剪框）
//!    ├─ codec.rs（规范化比较后写回字段）
//!    └─ DimensionRequest ──▶ 宿主异步调用 resolver.rs ──▶ apply_resolved_dimensions
//! ```

mod codec;
mod controller;
mod crop;
mod editor;
mod error;
mod host;
mod model;
mod reset;
mod resolver;
mod thumbnail;
pub mod validator;

pub use codec::ValueCodec;
pub use controller::{SelectOutcome, SelectionController, SelectionState};
pub use crop::initial_crop;
pub use editor::{EditorRequest, Viewport, display_ratio};
pub use error::SelectionError;
pub use host::{BrowserRequest, HostPanel};
pub use model::{
    CropRect, ImageSelection, PROBABLY_TRUNCATED_HEIGHT, PROBABLY_TRUNCATED_WIDTH, SelectedItem,
    SelectionSnapshot, SourceImage, TargetConstraints,
};
pub use reset::{ResetBroadcast, ResetSubscription};
pub use resolver::{DimensionRequest, DimensionResolver, DimensionTicket, ResolverConfig};
pub use thumbnail::thumbnail_url;
