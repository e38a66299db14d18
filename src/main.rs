//! # 字段值调试工具 — 命令行入口
//!
//! 本文件仅负责参数解析与日志初始化，逻辑全部复用库中的 `selection` 模块。
//! 用于排查宿主数据库里保存的字段值（旧版路径、格式漂移、预览地址、真实尺寸）。

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use imageplus_input::config::WidgetConfig;
use imageplus_input::error::AppError;
use imageplus_input::selection::{
    DimensionResolver, ResolverConfig, ValueCodec, thumbnail_url, validator,
};

#[derive(Parser)]
#[command(name = "imageplus-field", version, about = "图片字段值调试工具")]
struct Cli {
    /// 字段配置文件（JSON，包含 options / manager）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 解析字段值并输出摘要；传 `-` 从标准输入读取
    Inspect { value: String },
    /// 输出规范化后的字段值
    Normalize { value: String },
    /// 输出预览缩略图地址
    Thumb { value: String },
    /// 拉取图片真实尺寸（URL 或本地路径）
    Probe { location: String },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()).await {
        log::error!("执行失败: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => WidgetConfig::load_from_path(path)?,
        None => WidgetConfig::default(),
    };
    let codec = ValueCodec::new(&config.options);

    match cli.command {
        Command::Inspect { value } => {
            let raw = read_value(value)?;
            let selection = codec.decode(&raw);
            match &selection.source {
                Some(source) => {
                    let accepted = validator::accepts(source, &config.options.constraints());
                    println!("图片: {} (媒体源 {})", source.path, source.source_id);
                    println!("尺寸: {}x{}", source.width, source.height);
                    println!("裁剪: {:?}", selection.crop);
                    println!("满足目标尺寸: {}", if accepted { "是" } else { "否" });
                }
                None => println!("空值"),
            }
            println!("alt: {}", selection.alt_text);
        }
        Command::Normalize { value } => {
            let raw = read_value(value)?;
            println!("{}", codec.encode(&codec.decode(&raw)));
        }
        Command::Thumb { value } => {
            let raw = read_value(value)?;
            let selection = codec.decode(&raw);
            match thumbnail_url(&selection, &config.options, &config.manager)? {
                Some(url) => println!("{url}"),
                None => println!("（无预览）"),
            }
        }
        Command::Probe { location } => {
            let resolver = DimensionResolver::new(ResolverConfig::default())?;
            let (width, height) = resolver.resolve(&location).await?;
            println!("{width}x{height}");
        }
    }

    Ok(())
}

fn read_value(value: String) -> Result<String, AppError> {
    if value != "-" {
        return Ok(value);
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
