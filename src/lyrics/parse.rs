use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `[mm:ss.xx]` or `[mm:ss.xxx]`.
static TIME_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{2}):(\d{2})\.(\d{2,3})\]").expect("time tag pattern is valid")
});

/// One timed lyric line. `time` is seconds from the start of the track.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    pub time: f64,
    pub text: String,
}

impl LyricLine {
    /// The single line shown when a track has no lyrics.
    pub fn placeholder(text: &str) -> Self {
        Self {
            time: 0.0,
            text: text.to_string(),
        }
    }
}

fn tag_seconds(caps: &Captures<'_>) -> Option<f64> {
    let minutes: u32 = caps[1].parse().ok()?;
    let seconds: u32 = caps[2].parse().ok()?;
    // Two-digit fractions are hundredths: right-pad to milliseconds.
    let millis: u32 = format!("{:0<3}", &caps[3]).parse().ok()?;
    Some(f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(millis) / 1000.0)
}

/// Parse LRC text into lines sorted by time.
///
/// A physical line with several time tags yields one entry per tag, all
/// sharing the tag-stripped, trimmed text. Lines without a tag (metadata
/// such as `[ar:...]`, plain prose) are dropped. Equal times keep input order.
pub fn parse(text: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw in text.lines() {
        let times: Vec<f64> = TIME_TAG
            .captures_iter(raw)
            .filter_map(|caps| tag_seconds(&caps))
            .collect();
        if times.is_empty() {
            continue;
        }

        let body = TIME_TAG.replace_all(raw, "").trim().to_string();
        for time in times {
            lines.push(LyricLine {
                time,
                text: body.clone(),
            });
        }
    }

    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}

/// Index of the last line whose time is `<= t`, or `None` before the first line.
pub fn active_index(lines: &[LyricLine], t: f64) -> Option<usize> {
    lines.partition_point(|line| line.time <= t).checked_sub(1)
}
