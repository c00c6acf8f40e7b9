//! 源文件读取：整读 + 宽松解码
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// 读取单个文件为文本
/// - 非法 UTF-8 以 `from_utf8_lossy` 替换，绝不因解码失败报错
/// - 明显是二进制的文件返回 `Ok(None)`，由调用方计为跳过
pub(crate) fn read_source(path: &Path, max_file_size: Option<u64>) -> std::io::Result<Option<String>> {
    if let Some(max) = max_file_size {
        if std::fs::metadata(path)?.len() > max {
            return Ok(None);
        }
    }
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;

    if is_probably_binary(&buf) {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// 判定缓冲区是否“明显是二进制”
/// - 包含 NUL 字节即认为二进制；
/// - 否则前 8KiB 中可打印字符（含 tab/CR/LF 与非 ASCII）比例低于 25% 也认为二进制。
fn is_probably_binary(buf: &[u8]) -> bool {
    if buf.is_empty() {
        return false;
    }
    if buf.contains(&0) {
        return true;
    }
    let sample = &buf[..buf.len().min(8192)];
    let printable = sample
        .iter()
        .filter(|&&b| matches!(b, 0x09 | 0x0A | 0x0D) || (0x20..=0x7E).contains(&b) || b >= 0x80)
        .count();
    (printable as f32 / sample.len() as f32) < 0.25
}
