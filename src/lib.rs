//! # 图片选择与裁剪字段 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │               宿主 CMS 表单（面板 / 浏览器 / 编辑器）        │
//! │                                                          │
//! │  媒体浏览器选中 ── 裁剪编辑器确认 ── 重置广播 ── alt 输入    │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ HostPanel（读写隐藏字段 / 提示 / 标脏 / 预览 / 编辑器）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                            │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  ├─ config ───── 字段配置 + 管理端配置 (JSON)              │
//! │  └─ selection ── 选图状态机                               │
//! │      ├─ validator / crop   尺寸校验 · 初始裁剪             │
//! │      ├─ codec              字段值编解码 · 变更判定          │
//! │      ├─ resolver           真实尺寸异步拉取                │
//! │      └─ reset              字段重置广播                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`config`] | 字段实例配置与管理端配置的加载 |
//! | [`selection`] | 选图/裁剪状态机、校验、编解码、尺寸拉取、重置广播 |

pub mod config;
pub mod error;
pub mod selection;

mod lenient;
