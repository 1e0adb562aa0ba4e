//! 朗读时长估算
//!
//! 基于固定的每分钟词数（WPM）估算一段文本的朗读时长

/// 默认每分钟词数（语速 1.0 时）
pub const BASE_WPM: f64 = 155.0;

/// 时长估算器
#[derive(Debug, Clone, Copy)]
pub struct DurationEstimator {
    base_wpm: f64,
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self { base_wpm: BASE_WPM }
    }
}

impl DurationEstimator {
    pub fn new(base_wpm: f64) -> Self {
        Self { base_wpm }
    }

    pub fn base_wpm(&self) -> f64 {
        self.base_wpm
    }

    /// 估算朗读秒数
    ///
    /// 按空白切分后统计非空词数，有效 WPM = base_wpm × rate。
    /// 空文本返回 0；rate 非正或非有限时同样返回 0，避免除零。
    pub fn estimate(&self, text: &str, rate: f64) -> f64 {
        let words = word_count(text);
        if words == 0 {
            return 0.0;
        }
        let effective_wpm = self.base_wpm * rate;
        if !effective_wpm.is_finite() || effective_wpm <= 0.0 {
            return 0.0;
        }
        words as f64 / effective_wpm * 60.0
    }
}

/// 使用默认 WPM 估算
pub fn estimate_duration(text: &str, rate: f64) -> f64 {
    DurationEstimator::default().estimate(text, rate)
}

/// 非空词数
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 格式化为 `m:ss`
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_world_estimate() {
        let secs = estimate_duration("Hello world", 1.0);
        assert!((secs - 2.0 / 155.0 * 60.0).abs() < 1e-9);
        assert!((secs - 0.774).abs() < 0.001);
    }

    #[test]
    fn test_whitespace_only_is_zero() {
        for text in ["", " ", "\n\t  \r\n"] {
            for rate in [0.5, 1.0, 2.0] {
                assert_eq!(estimate_duration(text, rate), 0.0);
            }
        }
    }

    #[test]
    fn test_monotonic_in_rate() {
        let text = "The quick brown fox jumps over the lazy dog";
        let rates = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];
        for pair in rates.windows(2) {
            assert!(estimate_duration(text, pair[1]) <= estimate_duration(text, pair[0]));
        }
    }

    #[test]
    fn test_non_positive_rate_does_not_divide_by_zero() {
        assert_eq!(estimate_duration("one two", 0.0), 0.0);
        assert_eq!(estimate_duration("one two", -1.0), 0.0);
    }

    #[test]
    fn test_custom_wpm() {
        let estimator = DurationEstimator::new(60.0);
        assert!((estimator.estimate("a b c", 1.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(0.774), "0:00");
        assert_eq!(format_clock(65.9), "1:05");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }
}
