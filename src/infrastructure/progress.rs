//! 上传进度跟踪

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// 上传进度回调，参数为 0–100 的整数百分比
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// 单次上传的进度跟踪器
///
/// 同一次调用内上报的百分比单调不减，成功时以 100 结束
pub struct ProgressTracker {
    total: u64,
    sent: AtomicU64,
    last: AtomicU8,
    started: AtomicBool,
    callback: ProgressCallback,
}

impl ProgressTracker {
    pub fn new(total: u64, callback: ProgressCallback) -> Arc<Self> {
        Arc::new(Self {
            total,
            sent: AtomicU64::new(0),
            last: AtomicU8::new(0),
            started: AtomicBool::new(false),
            callback,
        })
    }

    /// 上传开始，上报 0
    pub fn start(&self) {
        if !self.started.swap(true, Ordering::SeqCst) {
            (self.callback)(0);
        }
    }

    /// 记录又有 `bytes` 字节交给了传输层
    ///
    /// 最多上报 99，100 只由 `finish` 给出
    pub fn advance(&self, bytes: u64) {
        let sent = self.sent.fetch_add(bytes, Ordering::SeqCst) + bytes;
        self.report(percent(sent, self.total).min(99));
    }

    /// 上传成功，保证最后一次上报为 100
    pub fn finish(&self) {
        self.start();
        self.report(100);
    }

    /// 最近一次上报的百分比
    pub fn last(&self) -> u8 {
        self.last.load(Ordering::SeqCst)
    }

    fn report(&self, pct: u8) {
        let prev = self.last.fetch_max(pct, Ordering::SeqCst);
        if pct > prev {
            (self.callback)(pct);
        }
    }
}

fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let sent = sent.min(total) as u128;
    let total = total as u128;
    (sent * 100 / total) as u8
}
