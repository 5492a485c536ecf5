//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与作品检查命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 novel-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `novel-check`: 检查作品文件（结构、引用、资源文件）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use novel_runtime::{AssetResolver, DiagnosticResult, Novel, analyze_novel};
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let status = Command::new("cargo").args(["llvm-cov", "--version"]).status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "novel-runtime", "--html"]);
            run("cargo llvm-cov -p novel-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // xtask 不计入覆盖率
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "novel-check" => {
            let path = args.next();
            novel_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 novel-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  novel-check     检查作品文件

NOVEL-CHECK:
  cargo xtask novel-check [path]

  不带参数：检查 host-cli/assets/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - 作品 JSON 格式
    - 起始场景、重复 id、空场景
    - 未定义的跳转目标与资源引用
    - 入场跳转环、不可达场景
    - 资源文件是否存在（相对作品文件所在目录）

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo cov-workspace -> cargo xtask cov-workspace
  cargo novel-check   -> cargo xtask novel-check
"#
    );
}

//=============================================================================
// novel-check 命令实现
//=============================================================================

const DEFAULT_NOVEL_DIR: &str = "host-cli/assets";

#[derive(Default)]
struct NovelCheckResult {
    novels_checked: usize,
    parse_errors: usize,
    diagnostics: DiagnosticResult,
    missing_files: Vec<MissingFile>,
}

struct MissingFile {
    novel_file: String,
    kind: &'static str,
    path: String,
}

fn novel_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or(DEFAULT_NOVEL_DIR));
    let files = if root.is_file() {
        vec![root]
    } else if root.is_dir() {
        collect_novel_files(&root)?
    } else if path.is_none() {
        anyhow::bail!(
            "默认作品目录不存在: {}\n请在 workspace 根目录运行，或指定作品路径",
            root.display()
        );
    } else {
        anyhow::bail!("路径不存在: {}", root.display());
    };

    if files.is_empty() {
        eprintln!("未找到作品文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个作品文件...\n", files.len());

    let mut result = NovelCheckResult::default();
    for file in &files {
        check_novel_file(file, &mut result);
    }

    print_check_result(&result);

    if result.parse_errors > 0 || result.diagnostics.has_errors() {
        anyhow::bail!("作品检查发现错误");
    }
    Ok(())
}

fn collect_novel_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn check_novel_file(file: &Path, result: &mut NovelCheckResult) {
    let novel_file = file.display().to_string();
    result.novels_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] {}: 无法读取文件 - {}", novel_file, e);
            result.parse_errors += 1;
            return;
        }
    };

    let novel = match Novel::from_json(&content) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("[ERROR] {}: {}", novel_file, e);
            result.parse_errors += 1;
            return;
        }
    };

    result.diagnostics.merge(analyze_novel(&novel));

    let base = file.parent().unwrap_or(Path::new("."));
    for (kind, url) in referenced_files(&novel) {
        if is_remote(url) {
            continue;
        }
        if !base.join(url).exists() {
            result.missing_files.push(MissingFile {
                novel_file: novel_file.clone(),
                kind,
                path: url.to_string(),
            });
        }
    }
}

/// 作品声明的所有本地资源地址
fn referenced_files(novel: &Novel) -> Vec<(&'static str, &str)> {
    let mut files = Vec::new();
    for bg in &novel.backgrounds {
        if let Some(url) = novel.background_url(&bg.id) {
            files.push(("背景", url));
        }
    }
    for character in &novel.characters {
        for sprite in &character.sprites {
            if !sprite.image_url.is_empty() {
                files.push(("立绘", sprite.image_url.as_str()));
            }
        }
    }
    for audio in &novel.audio {
        if let Some(url) = novel.audio_url(&audio.id) {
            files.push(("音频", url));
        }
    }
    files
}

fn is_remote(url: &str) -> bool {
    ["http://", "https://", "data:"]
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

fn print_check_result(result: &NovelCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个作品", result.novels_checked);
    eprintln!();

    for diag in &result.diagnostics.diagnostics {
        eprintln!("{}", diag);
    }

    for mf in &result.missing_files {
        eprintln!("[WARN] {}: 资源文件不存在 [{}] {}", mf.novel_file, mf.kind, mf.path);
    }

    let error_count = result.parse_errors + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count() + result.missing_files.len();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
