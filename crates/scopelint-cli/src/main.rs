use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use scopelint_core::{scan_and_write, ExitScan, Language, OutputFormat, ScanOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(
    name = "scopelint",
    version,
    about = "Lexical bug-pattern scanner: non-exiting Swift guard blocks and unscoped JDBC handles"
)]
struct Cli {
    /// 待扫描的文件或目录；不存在时不输出任何内容并正常退出
    path: Option<PathBuf>,

    /// 只扫描某一种语言：swift | java（大小写不敏感，默认全部）
    #[arg(long, value_parser = parse_lang)]
    lang: Option<Language>,

    /// 规则文件路径（TOML），缺省使用内置规则
    #[arg(long)]
    rules: Option<PathBuf>,

    /// 线程数（"auto"=CPU 核心数，1=串行）
    #[arg(long, default_value = "auto")]
    threads: String,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// 只在 else 块的代码部分查找退出关键字（忽略块内字符串与注释）
    #[arg(long)]
    strict_exit: bool,

    /// 最大扫描文件大小（字节）
    #[arg(long)]
    max_file_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let Some(path) = cli.path else {
        let usage = Cli::command().render_usage();
        eprintln!("{usage}");
        return Ok(ExitCode::from(1));
    };

    let opts = ScanOptions {
        language: cli.lang,
        rules_path: cli.rules,
        threads: parse_threads(&cli.threads),
        format: match cli.format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        },
        exit_scan: cli.strict_exit.then_some(ExitScan::Code),
        max_file_size: cli.max_file_size,
    };
    info!(?path, "starting scan");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let stats = scan_and_write(&path, &mut out, &opts).context("scan failed")?;
    out.flush().context("flush output")?;

    info!(
        files_scanned = stats.files_scanned,
        issues_written = stats.issues_written,
        "scan finished"
    );
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只输出扫描结果
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn parse_lang(s: &str) -> Result<Language, String> {
    Language::from_name(s).ok_or_else(|| {
        let known: Vec<&str> = Language::ALL.iter().map(|l| l.name()).collect();
        format!("unknown language '{s}' (expected one of: {})", known.join(", "))
    })
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
