//! # 真实尺寸拉取模块
//!
//! ## 设计思路
//!
//! 媒体浏览器在大图（≥ 800x600）上返回的宽高可能不准确，控制器会为此发出一个
//! `DimensionRequest`。宿主在异步环境里调用 `DimensionResolver::resolve` 拉取图片，
//! 完成后把结果连同请求时的 `DimensionTicket` 交回控制器；票据不再匹配当前选择的结果直接丢弃。
//!
//! ## 实现思路
//!
//! - http(s) 地址：`reqwest` 流式读取，每收到一块就尝试只解析图片头，拿到尺寸立即停止下载。
//! - 其他地址：按本地路径读取。
//! - 首包 / 分块读取都有超时，总字节数有上限，避免异常资源拖住界面。
//! - 网络错误统一映射到 `SelectionError`，由宿主记录日志后按“无变化”处理。

use std::io::Cursor;
use std::time::Duration;

use super::SelectionError;

const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

/// 尺寸拉取配置。
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// 单张图片最多读取的字节数。
    pub max_probe_bytes: u64,
    /// 整体请求超时时间（秒）。
    pub request_timeout: u64,
    /// 建立连接超时时间（秒）。
    pub connect_timeout: u64,
    /// 分块读取超时时间（毫秒）。
    pub chunk_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_probe_bytes: 32 * 1024 * 1024,
            request_timeout: 30,
            connect_timeout: 8,
            chunk_timeout_ms: 15_000,
        }
    }
}

/// 请求时刻的选择身份：图片路径 + 控制器内部代次。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionTicket {
    pub(crate) path: String,
    pub(crate) generation: u64,
}

impl DimensionTicket {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// 控制器发出的尺寸拉取请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRequest {
    pub ticket: DimensionTicket,
    /// 图片完整地址（媒体源根地址 + 相对路径）或本地路径。
    pub location: String,
}

/// 真实尺寸拉取器，内部复用一个 HTTP 客户端。
pub struct DimensionResolver {
    client: reqwest::Client,
    config: ResolverConfig,
}

impl DimensionResolver {
    pub fn new(config: ResolverConfig) -> Result<Self, SelectionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .build()
            .map_err(|e| SelectionError::Network(format!("创建 HTTP 客户端失败：{}", e)))?;

        Ok(Self { client, config })
    }

    /// 拉取图片并返回真实 `(宽, 高)`。
    pub async fn resolve(&self, location: &str) -> Result<(u32, u32), SelectionError> {
        let dimensions = if is_remote(location) {
            self.fetch_remote(location).await?
        } else {
            self.read_local(location).await?
        };

        log::info!(
            "📐 已获取真实尺寸 - {}: {}x{}",
            location,
            dimensions.0,
            dimensions.1
        );
        Ok(dimensions)
    }

    async fn fetch_remote(&self, url: &str) -> Result<(u32, u32), SelectionError> {
        log::debug!("🌐 开始拉取图片尺寸 - URL: {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SelectionError::Network(format!("HTTP 状态异常：{}", status)));
        }

        let mut buffer = Vec::with_capacity(BUFFER_INITIAL_CAPACITY);
        let chunk_timeout = Duration::from_millis(self.config.chunk_timeout_ms);

        loop {
            let next_chunk = tokio::time::timeout(chunk_timeout, response.chunk())
                .await
                .map_err(|_| SelectionError::Timeout("图片数据流读取超时".to_string()))?
                .map_err(|e| self.map_reqwest_error(e))?;

            let Some(chunk) = next_chunk else {
                break;
            };

            buffer.extend_from_slice(&chunk);
            if buffer.len() as u64 > self.config.max_probe_bytes {
                return Err(SelectionError::ResourceLimit(format!(
                    "图片超过读取上限：{:.2} MB",
                    self.config.max_probe_bytes as f64 / 1024.0 / 1024.0
                )));
            }

            if let Some(dimensions) = probe_dimensions(&buffer) {
                log::debug!("✅ 读取 {} 字节后得到图片尺寸", buffer.len());
                return Ok(dimensions);
            }
        }

        dimensions_from_bytes(&buffer)
    }

    async fn read_local(&self, path: &str) -> Result<(u32, u32), SelectionError> {
        log::debug!("📁 读取本地图片尺寸 - 路径: {}", path);

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| SelectionError::FileSystem(format!("无法读取文件信息：{}", e)))?;
        if metadata.len() > self.config.max_probe_bytes {
            return Err(SelectionError::ResourceLimit(format!(
                "文件过大：{:.2} MB",
                metadata.len() as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SelectionError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        dimensions_from_bytes(&bytes)
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> SelectionError {
        if e.is_timeout() {
            SelectionError::Timeout(format!("请求超时（{}秒）", self.config.request_timeout))
        } else if e.is_connect() {
            SelectionError::Network(format!("无法连接：{}", e))
        } else {
            SelectionError::Network(format!("请求失败：{}", e))
        }
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// 仅凭已到达的字节尝试读取图片头；数据不足或格式未知时返回 `None`。
pub(crate) fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    reader.format()?;
    reader.into_dimensions().ok()
}

fn dimensions_from_bytes(bytes: &[u8]) -> Result<(u32, u32), SelectionError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SelectionError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;
    if reader.format().is_none() {
        return Err(SelectionError::InvalidFormat("不支持的图片格式".to_string()));
    }
    reader
        .into_dimensions()
        .map_err(|e| SelectionError::Decode(format!("无法读取图片尺寸：{}", e)))
}
