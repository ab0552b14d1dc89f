//! Sonora CLI 客户端（测试版）
//!
//! 非交互式 CLI：登录、启动在线心跳，打印好友与后台概况，运行指定时长后退出

use anyhow::{Context, Result};
use clap::Parser;
use futures_util::future::join3;
use sonora_sdk_rust::sdk::friend::FriendListener;
use sonora_sdk_rust::sdk::session::SessionListener;
use sonora_sdk_rust::sdk::toast::{Toast, ToastId, ToastListener};
use sonora_sdk_rust::{ClientConfig, SonoraClient};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

/// Sonora CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "sonora-cli")]
#[command(about = "Sonora CLI 客户端 - 用于测试 REST API 与在线心跳", long_about = None)]
struct Args {
    /// 配置文件路径（可选，SONORA_* 环境变量优先）
    #[arg(short, long)]
    config: Option<String>,

    /// 覆盖配置中的 API 地址
    #[arg(long)]
    api_base_url: Option<String>,

    /// 登录邮箱
    #[arg(short, long)]
    email: String,

    /// 登录密码
    #[arg(short, long)]
    password: String,

    /// 运行时长（秒），0 表示运行到 Ctrl+C
    #[arg(short, long, default_value = "0")]
    duration: u64,

    /// 日志级别（默认: info,sonora_sdk_rust=debug）
    #[arg(long, default_value = "info,sonora_sdk_rust=debug")]
    log_level: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // RUST_LOG 优先于命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("sonora-cli.log")
        .context("无法创建日志文件 sonora-cli.log")?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 文件不需要颜色
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: sonora-cli.log");
    Ok(())
}

struct CliSessionListener;

#[async_trait::async_trait]
impl SessionListener for CliSessionListener {
    async fn on_unauthorized(&self) {
        error!("[CLI/Session] ⚠️ 会话已失效，需要重新登录");
    }
}

struct CliToastListener;

#[async_trait::async_trait]
impl ToastListener for CliToastListener {
    async fn on_show(&self, toast: Toast) {
        info!("[CLI/Toast] 💬 [{}] {}", toast.kind, toast.message);
    }

    async fn on_close(&self, id: ToastId) {
        info!("[CLI/Toast] toast #{} 已关闭", id);
    }
}

struct CliFriendListener;

#[async_trait::async_trait]
impl FriendListener for CliFriendListener {
    async fn on_friend_list_changed(&self, friends_json: String) {
        info!("[CLI/Friend] 👥 好友列表变更: {}", friends_json);
    }

    async fn on_black_list_changed(&self, blocked_json: String) {
        info!("[CLI/Friend] 🚫 黑名单变更: {}", blocked_json);
    }

    async fn on_friend_request_list_changed(&self, requests_json: String) {
        info!("[CLI/Friend] 📝 好友申请变更: {}", requests_json);
    }
}

/// 打印好友、好友申请与后台统计概况；非管理员拿不到统计时只记录警告
async fn print_summary(client: &SonoraClient) {
    let friends = client.friend_screen(Some(Arc::new(CliFriendListener)));
    let dashboard = client.dashboard_screen();

    let (friends_res, requests_res, dashboard_res) = join3(
        friends.load_friends(),
        friends.load_requests(),
        dashboard.refresh(),
    )
    .await;

    if friends_res.is_ok() {
        let list = friends.friends().items();
        let online = list.iter().filter(|f| f.is_online).count();
        info!("[CLI] 👥 好友 {} 个，在线 {} 个", list.len(), online);
        for friend in list.iter().take(5) {
            info!(
                "[CLI]   - {} {}",
                friend.user.label(),
                if friend.is_online { "🟢" } else { "⚪" }
            );
        }
    }
    if requests_res.is_ok() {
        info!("[CLI] 📝 待处理好友申请 {} 个", friends.requests().items().len());
    }
    match (dashboard_res, dashboard.state().stats) {
        (Ok(()), Some(stats)) => info!(
            "[CLI] 📊 用户 {}（暂停 {}），待处理举报 {}（紧急 {}）",
            stats.total_usuarios,
            stats.usuarios_suspendidos,
            stats.reportes_pendientes,
            stats.reportes_urgentes
        ),
        _ => warn!("[CLI] 后台统计不可用（可能不是管理员账号）"),
    }
    friends.close();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level)?;

    info!("[CLI] 🚀 Sonora CLI 客户端（测试模式）");
    info!("[CLI] 📧 邮箱: {}", args.email);
    info!("[CLI] ⏱️  运行时长: {} 秒（0=持续运行）", args.duration);

    let mut config = match (&args.api_base_url, &args.config) {
        (Some(url), None) => ClientConfig::new(url.clone()),
        _ => ClientConfig::load(args.config.as_deref())?,
    };
    if let Some(url) = &args.api_base_url {
        config.api_base_url = ClientConfig::new(url.clone()).api_base_url;
    }

    let client = SonoraClient::new(config)
        .await
        .context("创建客户端失败")?
        .with_toast_listener(Arc::new(CliToastListener));
    client.set_session_listener(Arc::new(CliSessionListener));

    let login = client
        .login(&args.email, &args.password)
        .await
        .map_err(|e| anyhow::anyhow!("登录失败: {}", e.user_message()))?;
    info!(
        "[CLI] ✅ 登录成功！用户: {}",
        login.user.as_ref().map(|u| u.label()).unwrap_or(args.email.as_str())
    );

    client.start_presence();
    info!(
        "[CLI] 💓 在线心跳已启动，间隔 {} 秒",
        client.config().heartbeat_interval.as_secs()
    );

    print_summary(&client).await;

    if args.duration > 0 {
        info!("[CLI] ⏰ {} 秒后自动退出", args.duration);
        sleep(Duration::from_secs(args.duration)).await;
    } else {
        info!("[CLI] ⏰ 持续运行中，按 Ctrl+C 退出");
        tokio::signal::ctrl_c().await.context("监听 Ctrl+C 失败")?;
    }

    client.stop_presence();
    info!("[CLI] 👋 程序退出");
    Ok(())
}
