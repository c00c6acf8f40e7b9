//! 扫描主流程与并行调度
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::lang::Language;
use crate::options::{OutputFormat, ScanOptions, ScanStats};
use crate::rules::{load_rule_config, RuleConfig};
use crate::source::read_source;
use crate::types::{Issue, OutputItem};
use crate::Analyzer;

/// 单个文件的扫描结果；None 表示读取失败或被跳过
type FileResult = Option<Vec<Issue>>;

/// 扫描文件或目录并把问题逐行写入 `out`
/// 稳定性保证：
/// - 文件级：先收集文件并按路径排序，并行时由 writer 按下标重排
/// - 文件内：问题按源码偏移升序
///
/// 根路径不存在不是错误：不输出任何内容，返回空统计。
pub fn scan_and_write(root: &Path, out: &mut dyn Write, opts: &ScanOptions) -> Result<ScanStats> {
    let mut stats = ScanStats::default();
    if !root.exists() {
        debug!(?root, "scan root does not exist; nothing to do");
        return Ok(stats);
    }

    let mut config = match &opts.rules_path {
        Some(path) => load_rule_config(path).context("load rule file")?,
        None => RuleConfig::default(),
    };
    if let Some(scan) = opts.exit_scan {
        config = config.with_exit_scan(scan);
    }
    let analyzer = Arc::new(Analyzer::new(&config).context("build detectors")?);

    let languages: Vec<Language> = match opts.language {
        Some(lang) => vec![lang],
        None => Language::ALL.to_vec(),
    };
    let files = collect_files(root, &languages, &config);
    info!(files = files.len(), ?root, "starting scan");

    // 决策：线程数>1 且文件数>1 时走并行调度；否则串行
    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    let mut writer = IssueWriter { out, format: opts.format };
    if threads > 1 && files.len() > 1 {
        scan_parallel(files, &analyzer, opts.max_file_size, threads, &mut writer, &mut stats)?;
    } else {
        for (path, lang) in files {
            let result = scan_file(&analyzer, &path, lang, opts.max_file_size);
            writer.write_file(&path, result, &mut stats)?;
        }
    }

    info!(
        files_scanned = stats.files_scanned,
        files_skipped = stats.files_skipped,
        issues_written = stats.issues_written,
        "scan finished"
    );
    Ok(stats)
}

/// 收集待扫描文件（按路径排序）
/// - 单个文件：扩展名匹配且路径中不含排除目录时才扫描
/// - 目录：递归遍历，排除各语言的版本控制 / 构建产物 / 依赖目录
pub fn collect_files(root: &Path, languages: &[Language], config: &RuleConfig) -> Vec<(PathBuf, Language)> {
    let skip_sets: Vec<(Language, Vec<String>)> =
        languages.iter().map(|&l| (l, config.skip_dirs(l))).collect();
    let skipped_for = |lang: Language, dir: &str| {
        skip_sets.iter().any(|(l, dirs)| *l == lang && dirs.iter().any(|d| d == dir))
    };
    // 所有语言都排除的目录可以直接剪枝
    let skipped_for_all =
        |dir: &str| !skip_sets.is_empty() && languages.iter().all(|&l| skipped_for(l, dir));

    let language_of = |path: &Path| {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
            .filter(|l| languages.contains(l))
    };

    if root.is_file() {
        let Some(lang) = language_of(root) else { return Vec::new() };
        let excluded = root
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .any(|c| skipped_for(lang, c));
        return if excluded { Vec::new() } else { vec![(root.to_path_buf(), lang)] };
    }

    let mut files: Vec<(PathBuf, Language)> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !e.file_name().to_str().map_or(false, |n| skipped_for_all(n))
        })
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!(%err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let lang = language_of(e.path())?;
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            let excluded = rel
                .parent()
                .into_iter()
                .flat_map(|p| p.components())
                .filter_map(|c| c.as_os_str().to_str())
                .any(|c| skipped_for(lang, c));
            (!excluded).then(|| (e.into_path(), lang))
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn scan_file(analyzer: &Analyzer, path: &Path, lang: Language, max_file_size: Option<u64>) -> FileResult {
    match read_source(path, max_file_size) {
        Ok(Some(text)) => Some(analyzer.analyze(lang, &text)),
        Ok(None) => {
            debug!(?path, "skipping binary or oversized file");
            None
        }
        Err(err) => {
            debug!(?path, %err, "skipping unreadable file");
            None
        }
    }
}

/// 并行调度：
/// - 后台线程内建 Rayon 线程池并行扫描
/// - 当前线程作为唯一 writer，按下标重排后输出，保证稳定顺序
fn scan_parallel(
    files: Vec<(PathBuf, Language)>,
    analyzer: &Arc<Analyzer>,
    max_file_size: Option<u64>,
    threads: usize,
    writer: &mut IssueWriter<'_>,
    stats: &mut ScanStats,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    type Msg = (usize /*idx*/, FileResult);
    let (tx, rx) = channel::bounded::<Msg>(256);

    let analyzer = Arc::clone(analyzer);
    let indexed: Vec<(usize, PathBuf, Language)> =
        files.iter().enumerate().map(|(i, (p, l))| (i, p.clone(), *l)).collect();

    let scan_thread = std::thread::spawn(move || {
        let work = |(idx, path, lang): &(usize, PathBuf, Language)| {
            let _ = tx.send((*idx, scan_file(&analyzer, path, *lang, max_file_size)));
        };
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| indexed.par_iter().for_each(work)),
            Err(err) => {
                warn!(%err, "failed to build thread pool; scanning serially");
                indexed.iter().for_each(work);
            }
        }
        // 结束后 Sender 被丢弃，Receiver 将收到关闭信号
    });

    let mut reorder = Reorder::default();
    while let Ok((idx, result)) = rx.recv() {
        reorder.push(idx, result, &files, writer, stats)?;
    }

    let panicked = scan_thread.join().is_err();
    let lost = reorder.finish(&files, writer, stats)?;
    if panicked || lost > 0 {
        warn!(lost, "scan worker stopped early; some files were not scanned");
    }
    Ok(())
}

/// 按文件下标重排结果，保证输出顺序与串行一致
#[derive(Default)]
struct Reorder {
    next_idx: usize,
    buffer: BTreeMap<usize, FileResult>,
}

impl Reorder {
    fn push(
        &mut self,
        idx: usize,
        result: FileResult,
        files: &[(PathBuf, Language)],
        writer: &mut IssueWriter<'_>,
        stats: &mut ScanStats,
    ) -> Result<()> {
        self.buffer.insert(idx, result);
        while let Some(result) = self.buffer.remove(&self.next_idx) {
            writer.write_file(&files[self.next_idx].0, result, stats)?;
            self.next_idx += 1;
        }
        Ok(())
    }

    /// 通道关闭后冲刷残余：缺口处的文件计为跳过，其后已到达的结果仍按下标写出。
    /// 返回没有收到结果的文件数
    fn finish(
        mut self,
        files: &[(PathBuf, Language)],
        writer: &mut IssueWriter<'_>,
        stats: &mut ScanStats,
    ) -> Result<usize> {
        let mut lost = 0usize;
        for (idx, (path, _)) in files.iter().enumerate().skip(self.next_idx) {
            match self.buffer.remove(&idx) {
                Some(result) => writer.write_file(path, result, stats)?,
                None => {
                    lost += 1;
                    stats.files_skipped += 1;
                }
            }
        }
        Ok(lost)
    }
}

/// 唯一的输出端；并行时也只在 writer 线程使用
struct IssueWriter<'a> {
    out: &'a mut dyn Write,
    format: OutputFormat,
}

impl IssueWriter<'_> {
    fn write_file(&mut self, path: &Path, result: FileResult, stats: &mut ScanStats) -> Result<()> {
        let Some(issues) = result else {
            stats.files_skipped += 1;
            return Ok(());
        };
        stats.files_scanned += 1;
        let shown = path.display().to_string();
        for issue in &issues {
            match self.format {
                OutputFormat::Text => writeln!(
                    self.out,
                    "{}:{}:{}\t{}",
                    shown,
                    issue.line,
                    issue.column,
                    issue.rendered_message()
                )?,
                OutputFormat::Json => {
                    let item = OutputItem {
                        path: &shown,
                        line: issue.line,
                        column: issue.column,
                        kind: &issue.kind,
                        message: &issue.message,
                    };
                    serde_json::to_writer(&mut *self.out, &item)?;
                    writeln!(self.out)?;
                }
            }
            stats.issues_written += 1;
        }
        Ok(())
    }
}
