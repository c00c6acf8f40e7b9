//! 花括号（或任意成对分隔符）区块提取：纯深度计数

/// 一对匹配的分隔符。`open` 指向开分隔符，`close` 指向与之平衡的闭分隔符。
/// 未闭合时 `close` 为最后一个有效偏移，`terminated` 为 false。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub open: usize,
    pub close: usize,
    pub terminated: bool,
}

impl Block {
    /// 区块内容范围（不含两侧分隔符）；未闭合时延伸到文件末尾
    pub fn body(&self, len: usize) -> std::ops::Range<usize> {
        let start = (self.open + 1).min(len);
        let end = if self.terminated { self.close } else { len };
        start..end.max(start)
    }
}

/// 从 `after_open`（紧跟 `{` 之后的偏移）开始寻找与之匹配的 `}`
pub fn find_block_end(bytes: &[u8], after_open: usize) -> Block {
    find_matching(bytes, after_open, b'{', b'}')
}

/// 通用版本：深度从 1 开始，遇到 `open` 加一、`close` 减一，归零即返回
pub fn find_matching(bytes: &[u8], after_open: usize, open: u8, close: u8) -> Block {
    let open_at = after_open.saturating_sub(1);
    let mut depth = 1usize;
    for (idx, &b) in bytes.iter().enumerate().skip(after_open) {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Block { open: open_at, close: idx, terminated: true };
            }
        }
    }
    Block { open: open_at, close: bytes.len().saturating_sub(1), terminated: false }
}
