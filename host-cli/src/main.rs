//! novel-cli - 终端播放器
//!
//! ## 用法
//!
//! ```bash
//! novel-cli play assets/demo_novel.json
//! novel-cli play assets/demo_novel.json --saves-dir saves --inputs playthrough.txt
//! novel-cli check assets/demo_novel.json
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use novel_cli::{FileSaveStore, Player, PlayerConfig, PlayerOptions, TracingAudioEngine};
use novel_runtime::{DiagnosticLevel, DiagnosticResult, Novel, analyze_novel};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "novel-cli")]
#[command(about = "分支叙事作品的终端播放器")]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 播放作品
    Play {
        /// 作品 JSON 文件
        novel: PathBuf,

        /// 存档目录（覆盖配置文件）
        #[arg(long)]
        saves_dir: Option<PathBuf>,

        /// 从文件读取输入（每行一条），默认读取标准输入
        #[arg(long)]
        inputs: Option<PathBuf>,
    },

    /// 检查作品内容
    Check {
        /// 作品 JSON 文件
        novel: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 日志级别来自配置文件：先静默读取一次，初始化日志后再正式加载
    let log_level = PlayerConfig::read(&cli.config)
        .ok()
        .flatten()
        .map_or_else(|| PlayerConfig::default().debug.log_level, |c| c.debug.log_level);
    init_tracing(&log_level);
    let config = PlayerConfig::load(&cli.config);

    let result = match cli.command {
        Commands::Play {
            novel,
            saves_dir,
            inputs,
        } => play(config, novel, saves_dir, inputs),
        Commands::Check { novel } => check(&novel),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn play(
    mut config: PlayerConfig,
    novel_path: PathBuf,
    saves_dir: Option<PathBuf>,
    inputs: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    if let Some(saves_dir) = saves_dir {
        config.saves_dir = saves_dir;
    }

    let novel = novel_cli::load_novel(&novel_path)?;
    if config.debug.novel_check {
        report(&novel, &analyze_novel(&novel));
    }

    let engine = TracingAudioEngine::for_novel(&novel);
    let store = FileSaveStore::new(&config.saves_dir);
    let mut player = Player::start(novel, &PlayerOptions::from(&config), engine, store)
        .context("无法开始播放")?;
    if player.has_save() {
        info!(saves_dir = ?config.saves_dir, "发现存档，输入 :load 读取");
    }

    let mut stdout = io::stdout().lock();
    match inputs {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("无法打开输入文件 {path:?}"))?;
            novel_cli::run(&mut player, BufReader::new(file), &mut stdout)?;
        }
        None => novel_cli::run(&mut player, io::stdin().lock(), &mut stdout)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn check(novel_path: &Path) -> anyhow::Result<ExitCode> {
    let novel = novel_cli::load_novel(novel_path)?;
    let result = analyze_novel(&novel);

    for diagnostic in &result.diagnostics {
        println!("{diagnostic}");
    }
    println!(
        "{}: {} 个错误, {} 个警告",
        novel.title,
        result.error_count(),
        result.warn_count()
    );

    Ok(if result.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// 以日志形式输出诊断（不阻塞启动）
fn report(novel: &Novel, result: &DiagnosticResult) {
    for diagnostic in result.filter_by_level(DiagnosticLevel::Warn) {
        match diagnostic.level {
            DiagnosticLevel::Error => error!(novel = %novel.id, "{diagnostic}"),
            _ => warn!(novel = %novel.id, "{diagnostic}"),
        }
    }
    if result.is_empty() {
        info!(novel = %novel.id, "作品检查通过");
    }
}
